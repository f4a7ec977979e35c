use std::sync::{Arc, RwLock};

use crate::config::OcsConfig;
use crate::errors::OcsError;
use crate::sdk::{ClientConfiguration, GatewayConfiguration, SdkFactory, SdkLogLevel, TelephonySdk, Work};

#[derive(Default)]
struct AdapterState {
    sdk: Option<Arc<dyn TelephonySdk>>,
    gateway: Option<GatewayConfiguration>,
    last_token: Option<String>,
}

/// Owns the SDK handle and the most recent authorization token.
///
/// Only the adapter mutates them; the session controller reads a snapshot
/// when a call starts.
pub struct SdkAdapter {
    factory: Arc<dyn SdkFactory>,
    log_level: SdkLogLevel,
    state: RwLock<AdapterState>,
}

impl SdkAdapter {
    /// Build the adapter with an unconfigured SDK handle, so version and
    /// work queries succeed before the gateway is known.
    pub fn new(factory: Arc<dyn SdkFactory>, log_level: SdkLogLevel) -> Self {
        let sdk = match factory.create(&ClientConfiguration::default()) {
            Ok(sdk) => Some(sdk),
            Err(e) => {
                tracing::warn!("default sdk construction failed: {e}");
                None
            }
        };
        Self {
            factory,
            log_level,
            state: RwLock::new(AdapterState {
                sdk,
                ..Default::default()
            }),
        }
    }

    /// Parse a `setOcsConfig` document and rebuild the SDK handle with it.
    ///
    /// Nothing is replaced unless parsing and construction both succeed.
    pub fn configure(&self, json: &str) -> Result<GatewayConfiguration, OcsError> {
        let config = OcsConfig::from_json(json)?;
        let client_config = ClientConfiguration {
            web_gateway: Some(config.gateway.clone()),
        };

        let sdk = self
            .factory
            .create(&client_config)
            .map_err(|e| OcsError::Config(e.to_string()))?;
        sdk.register_logger(self.log_level);

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if state.sdk.is_some() && state.gateway.is_some() {
            tracing::info!("replacing previously configured sdk handle");
        }
        state.sdk = Some(sdk);
        state.gateway = Some(config.gateway.clone());
        state.last_token = Some(config.token);

        tracing::info!(
            "sdk configured for gateway {}:{}",
            config.gateway.address,
            config.gateway.port
        );
        Ok(config.gateway)
    }

    /// Drop the SDK handle, gateway and token.
    pub fn clear(&self) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = AdapterState::default();
        tracing::info!("sdk adapter cleared");
    }

    pub fn version(&self) -> Result<String, OcsError> {
        self.sdk()?
            .version_number()
            .map_err(|e| OcsError::Sdk(e.to_string()))
    }

    pub fn create_work(&self) -> Result<Arc<dyn Work>, OcsError> {
        self.sdk()?
            .create_work()
            .map_err(|e| OcsError::Sdk(e.to_string()))
    }

    pub fn gateway(&self) -> Option<GatewayConfiguration> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).gateway.clone()
    }

    pub fn last_token(&self) -> Option<String> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).last_token.clone()
    }

    /// SDK handle and token needed to start a call.
    ///
    /// Fails with `Setup` unless a gateway configuration has been applied
    /// and a token is known.
    pub fn call_credentials(&self) -> Result<(Arc<dyn TelephonySdk>, String), OcsError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        match (&state.sdk, &state.gateway, &state.last_token) {
            (Some(sdk), Some(_), Some(token)) => Ok((sdk.clone(), token.clone())),
            _ => Err(OcsError::Setup(
                "SDK not initialized or no token; call setOcsConfig first".into(),
            )),
        }
    }

    fn sdk(&self) -> Result<Arc<dyn TelephonySdk>, OcsError> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .sdk
            .clone()
            .ok_or_else(|| OcsError::Sdk("SDK not initialized".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimSdkFactory;

    const VALID: &str = r#"{"aawg_server":"gw.example","aawg_port":"443","token":"T"}"#;

    #[test]
    fn default_handle_answers_version_before_configuration() {
        let factory = Arc::new(SimSdkFactory::new());
        let adapter = SdkAdapter::new(factory.clone(), SdkLogLevel::Info);

        assert_eq!(adapter.version().unwrap(), crate::sim::SIM_VERSION);
        assert!(adapter.create_work().is_ok());
        assert_eq!(factory.configs(), vec![ClientConfiguration::default()]);
        assert!(adapter.call_credentials().is_err());
    }

    #[test]
    fn configure_rebuilds_sdk_and_stores_token() {
        let factory = Arc::new(SimSdkFactory::new());
        let adapter = SdkAdapter::new(factory.clone(), SdkLogLevel::Info);

        let gateway = adapter.configure(VALID).unwrap();
        assert_eq!(gateway.address, "gw.example");
        assert_eq!(gateway.port, 443);
        assert!(gateway.secure);
        assert_eq!(adapter.last_token().as_deref(), Some("T"));

        let configs = factory.configs();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[1].web_gateway.as_ref(), Some(&gateway));
        assert_eq!(factory.last_sdk().unwrap().logger_level(), Some(SdkLogLevel::Info));

        let (_, token) = adapter.call_credentials().unwrap();
        assert_eq!(token, "T");
    }

    #[test]
    fn reconfigure_overwrites_token() {
        let adapter = SdkAdapter::new(Arc::new(SimSdkFactory::new()), SdkLogLevel::Fine);
        adapter.configure(VALID).unwrap();
        adapter
            .configure(r#"{"aawg_server":"gw2","aawg_port":"8443","token":"U"}"#)
            .unwrap();
        assert_eq!(adapter.last_token().as_deref(), Some("U"));
        assert_eq!(adapter.gateway().unwrap().port, 8443);
    }

    #[test]
    fn bad_config_leaves_state_untouched() {
        let factory = Arc::new(SimSdkFactory::new());
        let adapter = SdkAdapter::new(factory.clone(), SdkLogLevel::Info);

        let err = adapter
            .configure(r#"{"aawg_server":"gw","aawg_port":"notanumber","token":"T"}"#)
            .unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIG_ERROR");
        assert_eq!(factory.configs().len(), 1);
        assert!(adapter.last_token().is_none());
        assert!(matches!(adapter.call_credentials(), Err(OcsError::Setup(_))));
    }

    #[test]
    fn factory_failure_is_config_error() {
        let factory = Arc::new(SimSdkFactory::new());
        let adapter = SdkAdapter::new(factory.clone(), SdkLogLevel::Info);
        factory.fail_next_create();

        let err = adapter.configure(VALID).unwrap_err();
        assert!(matches!(err, OcsError::Config(_)));
        assert!(adapter.gateway().is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let adapter = SdkAdapter::new(Arc::new(SimSdkFactory::new()), SdkLogLevel::Info);
        adapter.configure(VALID).unwrap();
        adapter.clear();

        assert!(adapter.last_token().is_none());
        assert!(adapter.gateway().is_none());
        assert!(matches!(adapter.version(), Err(OcsError::Sdk(_))));
        assert!(matches!(adapter.call_credentials(), Err(OcsError::Setup(_))));
    }
}
