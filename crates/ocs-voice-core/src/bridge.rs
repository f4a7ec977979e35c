use std::sync::{Arc, RwLock};

use crate::adapter::SdkAdapter;
use crate::dispatch::UiDispatcher;
use crate::errors::OcsError;
use crate::events::{CallStatus, EventRelay, HostEventListener};
use crate::promise::{BridgeValue, Completion};
use crate::sdk::{AudioRoute, SdkFactory};
use crate::session::CallSessionController;
use crate::settings::Settings;
use crate::token::{TokenClient, TokenRequest, TokenResponse};

impl From<TokenResponse> for BridgeValue {
    fn from(resp: TokenResponse) -> Self {
        match resp {
            TokenResponse::Fields(map) => Self::Map(map),
            TokenResponse::Raw(body) => Self::Text(body),
        }
    }
}

/// Request/response surface exposed to the host runtime.
///
/// Every operation takes a [`Completion`] and settles it exactly once.
/// Operations that suspend (token I/O, the DTMF hop to the UI thread) are
/// spawned on `runtime` so the calling bridge thread never blocks.
pub struct OcsBridge {
    adapter: Arc<SdkAdapter>,
    controller: Arc<CallSessionController>,
    token_client: RwLock<TokenClient>,
    runtime: tokio::runtime::Handle,
}

impl OcsBridge {
    pub fn new(
        factory: Arc<dyn SdkFactory>,
        audio_route: Arc<dyn AudioRoute>,
        ui: Arc<dyn UiDispatcher>,
        settings: &Settings,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let adapter = Arc::new(SdkAdapter::new(factory, settings.sdk_log_level));
        let controller = Arc::new(CallSessionController::new(
            adapter.clone(),
            EventRelay::new(),
            ui,
            audio_route,
            &runtime,
        ));
        Self {
            adapter,
            controller,
            token_client: RwLock::new(TokenClient::new(settings.token_endpoint.clone())),
            runtime,
        }
    }

    /// Register a host event sink for status and video events.
    pub fn add_event_listener(&self, listener: Arc<dyn HostEventListener>) {
        self.controller.relay().add_listener(listener);
    }

    pub fn set_token_endpoint(&self, endpoint: &str) {
        *self.token_client.write().unwrap_or_else(|e| e.into_inner()) = TokenClient::new(endpoint);
    }

    pub fn call_status(&self) -> CallStatus {
        self.controller.status()
    }

    pub fn has_active_call(&self) -> bool {
        self.controller.has_active_call()
    }

    pub fn get_version_number(&self, completion: Completion) {
        completion.settle(self.adapter.version());
    }

    pub fn create_work(&self, completion: Completion) {
        completion.settle(
            self.adapter
                .create_work()
                .map(|_| "Work created successfully".to_string()),
        );
    }

    /// Apply a gateway configuration. Refused while a call is active.
    pub fn set_ocs_config(&self, json_config: &str, completion: Completion) {
        let result = if self.controller.has_active_call() {
            Err(OcsError::Config(
                "cannot reconfigure while a call is active".into(),
            ))
        } else {
            self.adapter
                .configure(json_config)
                .map(|_| "OCS configuration applied".to_string())
        };
        completion.settle(result);
    }

    pub fn request_token_from_server(&self, request: TokenRequest, completion: Completion) {
        let client = self
            .token_client
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        self.runtime.spawn(async move {
            completion.settle(client.request_token(&request).await);
        });
    }

    pub fn start_audio_call(&self, destination: &str, completion: Completion) {
        completion.settle(self.controller.start_audio_call(destination));
    }

    pub fn end_call(&self, completion: Completion) {
        completion.settle(self.controller.end_call());
    }

    pub fn toggle_mute(&self, should_mute: bool, completion: Completion) {
        completion.settle(self.controller.toggle_mute(should_mute));
    }

    pub fn toggle_speaker(&self, speaker_on: bool, completion: Completion) {
        completion.settle(self.controller.toggle_speaker(speaker_on));
    }

    pub fn send_dtmf(&self, digit: &str, completion: Completion) {
        let controller = self.controller.clone();
        let digit = digit.to_string();
        self.runtime.spawn(async move {
            completion.settle(controller.send_dtmf(&digit).await);
        });
    }

    /// End any active call and drop the SDK handle and token.
    pub fn reset(&self, completion: Completion) {
        let result = self.controller.end_call().map(|_| {
            self.adapter.clear();
            "Reset complete".to_string()
        });
        completion.settle(result);
    }

    /// Host event-emitter bookkeeping; subscriptions live on the host side.
    pub fn add_listener(&self, event_name: &str) {
        tracing::debug!("host subscribed to {event_name}");
    }

    pub fn remove_listeners(&self, count: u32) {
        tracing::debug!("host removed {count} listeners");
    }
}
