//! UniFFI bindings for ocs-voice-core.
//!
//! Provides an OcsVoiceClient object that wraps the bridge facade into a
//! single FFI-safe interface. The vendor SDK, promises, the event emitter,
//! the audio manager and the main-thread dispatcher are implemented by the host.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ocs_voice_core::{
    dispatch::{UiDispatcher, UiTask as CoreUiTask},
    errors::{ErrorCode, SdkError},
    events::{CallStatus as CoreCallStatus, HostEvent, HostEventListener},
    promise::{BridgeValue, Completion, PromiseSink},
    sdk::{
        AudioDeviceListener, AudioInteraction, AudioInteractionListener, AudioRoute, CallQuality,
        ClientConfiguration, GatewayConfiguration, PlatformType, SdkFactory, SdkLogLevel,
        TelephonySdk, Work,
    },
    DtmfTone, OcsBridge, SettingsStore, TokenRequest,
};

uniffi::include_scaffolding!("ocs_voice");

// ── Namespace functions ──────────────────────────────────────────────

/// Initialize tracing/logging. Call once from the host before using OcsVoiceClient.
/// On Android, stderr goes to logcat for debuggable builds.
fn init_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ocs_voice_core=debug,ocs_voice_ffi=debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .init();
    });
}

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum SdkFailure {
    #[error("{message}")]
    Failed { message: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for SdkFailure {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Failed { message: e.reason }
    }
}

impl From<SdkFailure> for SdkError {
    fn from(e: SdkFailure) -> Self {
        SdkError::new(e.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OcsVoiceError {
    #[error("Config error: {msg}")]
    Config { msg: String },
    #[error("Runtime error: {msg}")]
    Runtime { msg: String },
}

impl From<ocs_voice_core::OcsError> for OcsVoiceError {
    fn from(e: ocs_voice_core::OcsError) -> Self {
        tracing::error!("OcsError: {e}");
        let msg = e.to_string();
        match e.code() {
            ErrorCode::Config => Self::Config { msg },
            _ => Self::Runtime { msg },
        }
    }
}

// ── FFI-safe type conversions ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    Idle,
    Initiating,
    Ringing,
    Connected,
    Ended,
    Error,
}

impl From<CoreCallStatus> for CallStatus {
    fn from(s: CoreCallStatus) -> Self {
        match s {
            CoreCallStatus::Idle => Self::Idle,
            CoreCallStatus::Initiating => Self::Initiating,
            CoreCallStatus::Ringing => Self::Ringing,
            CoreCallStatus::Connected => Self::Connected,
            CoreCallStatus::Ended => Self::Ended,
            CoreCallStatus::Error => Self::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub address: String,
    pub port: u16,
    pub secure: bool,
}

impl From<GatewayConfiguration> for GatewaySettings {
    fn from(g: GatewayConfiguration) -> Self {
        Self {
            address: g.address,
            port: g.port,
            secure: g.secure,
        }
    }
}

fn parse_quality(quality: &str) -> CallQuality {
    match quality.to_ascii_uppercase().as_str() {
        "EXCELLENT" => CallQuality::Excellent,
        "GOOD" => CallQuality::Good,
        "FAIR" => CallQuality::Fair,
        "POOR" => CallQuality::Poor,
        "BAD" => CallQuality::Bad,
        _ => CallQuality::Unknown,
    }
}

// ── Host-implemented interfaces ───────────────────────────────────────

pub trait HostPromise: Send + Sync {
    fn resolve_text(&self, value: String);
    fn resolve_bool(&self, value: bool);
    fn resolve_map(&self, value: HashMap<String, String>);
    fn reject(&self, code: String, message: String);
}

pub trait HostEventSink: Send + Sync {
    fn emit(&self, channel: String, payload: HashMap<String, String>);
}

pub trait HostAudioRoute: Send + Sync {
    fn is_speakerphone_on(&self) -> Result<bool, SdkFailure>;
}

/// Runs posted tasks on the platform main/UI thread, in posting order.
pub trait HostUiDispatcher: Send + Sync {
    fn post(&self, task: Arc<UiTask>);
}

/// Unit of work handed to [`HostUiDispatcher::post`]. Runs at most once.
pub struct UiTask {
    task: Mutex<Option<CoreUiTask>>,
}

impl UiTask {
    pub fn run(&self) {
        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        match task {
            Some(task) => task(),
            None => tracing::warn!("ui task already ran"),
        }
    }
}

pub trait HostSdkFactory: Send + Sync {
    fn create(&self, gateway: Option<GatewaySettings>) -> Result<Arc<dyn HostSdk>, SdkFailure>;
}

pub trait HostSdk: Send + Sync {
    fn version_number(&self) -> Result<String, SdkFailure>;
    fn create_work(&self) -> Result<Arc<dyn HostWork>, SdkFailure>;
    fn register_logger(&self, level: String);
}

pub trait HostWork: Send + Sync {
    fn create_audio_interaction(&self) -> Result<Arc<dyn HostAudioInteraction>, SdkFailure>;
}

pub trait HostAudioInteraction: Send + Sync {
    fn set_platform_type(&self, platform: String) -> Result<(), SdkFailure>;
    fn set_authorization_token(&self, token: String) -> Result<(), SdkFailure>;
    fn set_destination_address(&self, destination: String) -> Result<(), SdkFailure>;
    fn register_listener(&self, listener: Arc<InteractionCallbacks>) -> Result<(), SdkFailure>;
    fn start(&self) -> Result<(), SdkFailure>;
    fn end(&self) -> Result<(), SdkFailure>;
    fn mute_audio(&self, mute: bool) -> Result<(), SdkFailure>;
    fn send_dtmf(&self, tone: String) -> Result<(), SdkFailure>;
}

// ── Bridges: host object → core trait ─────────────────────────────────

struct BridgePromise {
    host: Box<dyn HostPromise>,
}

impl PromiseSink for BridgePromise {
    fn resolve(&self, value: BridgeValue) {
        match value {
            BridgeValue::Text(s) => self.host.resolve_text(s),
            BridgeValue::Bool(b) => self.host.resolve_bool(b),
            BridgeValue::Map(map) => self.host.resolve_map(map.into_iter().collect()),
        }
    }

    fn reject(&self, code: ErrorCode, message: String) {
        self.host.reject(code.as_str().to_string(), message);
    }
}

fn completion(operation: &'static str, promise: Box<dyn HostPromise>) -> Completion {
    Completion::new(operation, Box::new(BridgePromise { host: promise }))
}

struct BridgeEventSink {
    host: Box<dyn HostEventSink>,
}

impl HostEventListener for BridgeEventSink {
    fn on_event(&self, event: HostEvent) {
        self.host
            .emit(event.channel().to_string(), event.payload().into_iter().collect());
    }
}

struct BridgeAudioRoute {
    host: Box<dyn HostAudioRoute>,
}

impl AudioRoute for BridgeAudioRoute {
    fn is_speakerphone_on(&self) -> Result<bool, SdkError> {
        Ok(self.host.is_speakerphone_on()?)
    }
}

struct BridgeUiDispatcher {
    host: Box<dyn HostUiDispatcher>,
}

impl UiDispatcher for BridgeUiDispatcher {
    fn post(&self, task: CoreUiTask) {
        self.host.post(Arc::new(UiTask {
            task: Mutex::new(Some(task)),
        }));
    }
}

struct BridgeSdkFactory {
    host: Arc<dyn HostSdkFactory>,
}

impl SdkFactory for BridgeSdkFactory {
    fn create(&self, config: &ClientConfiguration) -> Result<Arc<dyn TelephonySdk>, SdkError> {
        let gateway = config.web_gateway.clone().map(GatewaySettings::from);
        let sdk = self.host.create(gateway)?;
        Ok(Arc::new(BridgeSdk { host: sdk }))
    }
}

struct BridgeSdk {
    host: Arc<dyn HostSdk>,
}

impl TelephonySdk for BridgeSdk {
    fn version_number(&self) -> Result<String, SdkError> {
        Ok(self.host.version_number()?)
    }

    fn create_work(&self) -> Result<Arc<dyn Work>, SdkError> {
        let work = self.host.create_work()?;
        Ok(Arc::new(BridgeWork { host: work }))
    }

    fn register_logger(&self, level: SdkLogLevel) {
        self.host.register_logger(level.as_str().to_string());
    }
}

struct BridgeWork {
    host: Arc<dyn HostWork>,
}

impl Work for BridgeWork {
    // Audio device changes stay with the platform; the host attaches its own no-op listener.
    fn create_audio_interaction(
        &self,
        _device_listener: Arc<dyn AudioDeviceListener>,
    ) -> Result<Arc<dyn AudioInteraction>, SdkError> {
        let interaction = self.host.create_audio_interaction()?;
        Ok(Arc::new(BridgeAudioInteraction { host: interaction }))
    }
}

struct BridgeAudioInteraction {
    host: Arc<dyn HostAudioInteraction>,
}

impl AudioInteraction for BridgeAudioInteraction {
    fn set_platform_type(&self, platform: PlatformType) -> Result<(), SdkError> {
        Ok(self.host.set_platform_type(platform.as_str().to_string())?)
    }

    fn set_authorization_token(&self, token: &str) -> Result<(), SdkError> {
        Ok(self.host.set_authorization_token(token.to_string())?)
    }

    fn set_destination_address(&self, destination: &str) -> Result<(), SdkError> {
        Ok(self.host.set_destination_address(destination.to_string())?)
    }

    fn register_listener(&self, listener: Arc<dyn AudioInteractionListener>) -> Result<(), SdkError> {
        Ok(self
            .host
            .register_listener(Arc::new(InteractionCallbacks { listener }))?)
    }

    fn start(&self) -> Result<(), SdkError> {
        Ok(self.host.start()?)
    }

    fn end(&self) -> Result<(), SdkError> {
        Ok(self.host.end()?)
    }

    fn mute_audio(&self, mute: bool) -> Result<(), SdkError> {
        Ok(self.host.mute_audio(mute)?)
    }

    fn send_dtmf(&self, tone: DtmfTone) -> Result<(), SdkError> {
        Ok(self.host.send_dtmf(tone.as_str().to_string())?)
    }
}

/// Lifecycle listener handed to the host SDK; forwards into the core.
pub struct InteractionCallbacks {
    listener: Arc<dyn AudioInteractionListener>,
}

impl InteractionCallbacks {
    pub fn on_interaction_initiating(&self) {
        self.listener.on_interaction_initiating();
    }

    pub fn on_interaction_remote_alerting(&self) {
        self.listener.on_interaction_remote_alerting();
    }

    pub fn on_interaction_active(&self) {
        self.listener.on_interaction_active();
    }

    pub fn on_interaction_ended(&self) {
        self.listener.on_interaction_ended();
    }

    pub fn on_interaction_failed(&self, error: String) {
        self.listener.on_interaction_failed(error);
    }

    pub fn on_interaction_audio_mute_status_changed(&self, muted: bool) {
        self.listener.on_interaction_audio_mute_status_changed(muted);
    }

    pub fn on_interaction_held(&self) {
        self.listener.on_interaction_held();
    }

    pub fn on_interaction_unheld(&self) {
        self.listener.on_interaction_unheld();
    }

    pub fn on_interaction_held_remotely(&self) {
        self.listener.on_interaction_held_remotely();
    }

    pub fn on_interaction_unheld_remotely(&self) {
        self.listener.on_interaction_unheld_remotely();
    }

    pub fn on_interaction_quality_changed(&self, quality: String) {
        self.listener.on_interaction_quality_changed(parse_quality(&quality));
    }

    pub fn on_discard_complete(&self) {
        self.listener.on_discard_complete();
    }
}

// ── OcsVoiceClient: main FFI object ───────────────────────────────────

pub struct OcsVoiceClient {
    bridge: OcsBridge,
    settings: SettingsStore,
    // Declared last: dropped after the bridge whose tasks run on it.
    _rt: tokio::runtime::Runtime,
}

impl OcsVoiceClient {
    pub fn new(
        sdk_factory: Arc<dyn HostSdkFactory>,
        audio_route: Box<dyn HostAudioRoute>,
        events: Box<dyn HostEventSink>,
        ui: Box<dyn HostUiDispatcher>,
        data_dir: String,
    ) -> Result<Self, OcsVoiceError> {
        tracing::info!("OcsVoiceClient::new() data_dir={data_dir}");
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| OcsVoiceError::Runtime { msg: e.to_string() })?;
        let settings = SettingsStore::new(&data_dir);

        let bridge = OcsBridge::new(
            Arc::new(BridgeSdkFactory { host: sdk_factory }),
            Arc::new(BridgeAudioRoute { host: audio_route }),
            Arc::new(BridgeUiDispatcher { host: ui }),
            &settings.get(),
            rt.handle().clone(),
        );
        bridge.add_event_listener(Arc::new(BridgeEventSink { host: events }));

        Ok(Self {
            bridge,
            settings,
            _rt: rt,
        })
    }

    pub fn get_version_number(&self, promise: Box<dyn HostPromise>) {
        self.bridge
            .get_version_number(completion("getVersionNumber", promise));
    }

    pub fn create_work(&self, promise: Box<dyn HostPromise>) {
        self.bridge.create_work(completion("createWork", promise));
    }

    pub fn set_ocs_config(&self, json_config: String, promise: Box<dyn HostPromise>) {
        self.bridge
            .set_ocs_config(&json_config, completion("setOcsConfig", promise));
    }

    pub fn request_token_from_server(
        &self,
        use_case: String,
        called_number: String,
        calling_number: String,
        display_name: String,
        expiration: String,
        promise: Box<dyn HostPromise>,
    ) {
        let request = TokenRequest {
            use_case,
            called_number,
            calling_number,
            display_name,
            expiration,
        };
        self.bridge
            .request_token_from_server(request, completion("requestTokenFromServer", promise));
    }

    pub fn start_audio_call(&self, destination: String, promise: Box<dyn HostPromise>) {
        self.bridge
            .start_audio_call(&destination, completion("startAudioCall", promise));
    }

    pub fn end_call(&self, promise: Box<dyn HostPromise>) {
        self.bridge.end_call(completion("endCall", promise));
    }

    pub fn toggle_mute(&self, should_mute: bool, promise: Box<dyn HostPromise>) {
        self.bridge
            .toggle_mute(should_mute, completion("toggleMute", promise));
    }

    pub fn toggle_speaker(&self, speaker_on: bool, promise: Box<dyn HostPromise>) {
        self.bridge
            .toggle_speaker(speaker_on, completion("toggleSpeaker", promise));
    }

    pub fn send_dtmf(&self, digit: String, promise: Box<dyn HostPromise>) {
        self.bridge.send_dtmf(&digit, completion("sendDtmf", promise));
    }

    pub fn reset(&self, promise: Box<dyn HostPromise>) {
        self.bridge.reset(completion("reset", promise));
    }

    pub fn add_listener(&self, event_name: String) {
        self.bridge.add_listener(&event_name);
    }

    pub fn remove_listeners(&self, count: u32) {
        self.bridge.remove_listeners(count);
    }

    pub fn call_status(&self) -> CallStatus {
        self.bridge.call_status().into()
    }

    pub fn has_active_call(&self) -> bool {
        self.bridge.has_active_call()
    }

    pub fn get_token_endpoint(&self) -> String {
        self.settings.get().token_endpoint
    }

    pub fn set_token_endpoint(&self, endpoint: String) -> Result<(), OcsVoiceError> {
        self.settings.set_token_endpoint(&endpoint)?;
        self.bridge.set_token_endpoint(&endpoint);
        Ok(())
    }
}
