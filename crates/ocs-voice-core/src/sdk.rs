//! Seam to the vendor telephony SDK.
//!
//! The SDK is an opaque interaction factory: native shells implement these
//! traits over the platform library, tests use an in-process simulator.

use std::sync::Arc;

use crate::dtmf::DtmfTone;
use crate::errors::SdkError;

/// Web gateway endpoint the SDK connects through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfiguration {
    pub address: String,
    pub port: u16,
    pub secure: bool,
}

/// Configuration handed to the SDK on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfiguration {
    pub web_gateway: Option<GatewayConfiguration>,
}

/// Platform type reported to the contact center. Only one is deployed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlatformType {
    #[default]
    Elite,
}

impl PlatformType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Elite => "ELITE",
        }
    }
}

/// Verbosity of the SDK's own logger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdkLogLevel {
    Severe,
    Warning,
    #[default]
    Info,
    Fine,
    Finest,
}

impl SdkLogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Severe => "SEVERE",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Fine => "FINE",
            Self::Finest => "FINEST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    Bad,
    Unknown,
}

/// Builds SDK handles. Each call yields an independent handle.
pub trait SdkFactory: Send + Sync {
    fn create(&self, config: &ClientConfiguration) -> Result<Arc<dyn TelephonySdk>, SdkError>;
}

pub trait TelephonySdk: Send + Sync {
    fn version_number(&self) -> Result<String, SdkError>;
    fn create_work(&self) -> Result<Arc<dyn Work>, SdkError>;
    fn register_logger(&self, level: SdkLogLevel);
}

/// SDK-level container that produces interactions.
pub trait Work: Send + Sync {
    fn create_audio_interaction(
        &self,
        device_listener: Arc<dyn AudioDeviceListener>,
    ) -> Result<Arc<dyn AudioInteraction>, SdkError>;
}

/// A single audio call instance.
pub trait AudioInteraction: Send + Sync {
    fn set_platform_type(&self, platform: PlatformType) -> Result<(), SdkError>;
    fn set_authorization_token(&self, token: &str) -> Result<(), SdkError>;
    fn set_destination_address(&self, destination: &str) -> Result<(), SdkError>;
    fn register_listener(&self, listener: Arc<dyn AudioInteractionListener>) -> Result<(), SdkError>;
    fn start(&self) -> Result<(), SdkError>;
    fn end(&self) -> Result<(), SdkError>;
    fn mute_audio(&self, mute: bool) -> Result<(), SdkError>;
    fn send_dtmf(&self, tone: DtmfTone) -> Result<(), SdkError>;
}

/// Lifecycle callbacks, invoked on SDK-owned threads.
pub trait AudioInteractionListener: Send + Sync {
    fn on_interaction_initiating(&self);
    fn on_interaction_remote_alerting(&self);
    fn on_interaction_active(&self);
    fn on_interaction_ended(&self);
    fn on_interaction_failed(&self, error: String);
    fn on_interaction_audio_mute_status_changed(&self, _muted: bool) {}
    fn on_interaction_held(&self) {}
    fn on_interaction_unheld(&self) {}
    fn on_interaction_held_remotely(&self) {}
    fn on_interaction_unheld_remotely(&self) {}
    fn on_interaction_quality_changed(&self, _quality: CallQuality) {}
    fn on_discard_complete(&self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioDeviceType {
    Handset,
    Speaker,
    WiredHeadset,
    Bluetooth,
}

pub trait AudioDeviceListener: Send + Sync {
    fn on_audio_device_list_changed(&self, devices: Vec<AudioDeviceType>);
    fn on_audio_device_changed(&self, device: AudioDeviceType);
    fn on_audio_device_error(&self, error: String);
}

/// Audio routing is left to platform defaults.
pub struct IgnoreAudioDevices;

impl AudioDeviceListener for IgnoreAudioDevices {
    fn on_audio_device_list_changed(&self, _devices: Vec<AudioDeviceType>) {}
    fn on_audio_device_changed(&self, _device: AudioDeviceType) {}
    fn on_audio_device_error(&self, _error: String) {}
}

/// Platform audio manager.
pub trait AudioRoute: Send + Sync {
    fn is_speakerphone_on(&self) -> Result<bool, SdkError>;
}
