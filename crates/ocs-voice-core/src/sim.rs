//! In-process stand-in for the vendor SDK, used by tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::dtmf::DtmfTone;
use crate::errors::SdkError;
use crate::sdk::{
    AudioDeviceListener, AudioInteraction, AudioInteractionListener, AudioRoute, ClientConfiguration,
    PlatformType, SdkFactory, SdkLogLevel, TelephonySdk, Work,
};

pub const SIM_VERSION: &str = "3.9.1-sim";

type Registry = Arc<Mutex<Vec<Arc<SimInteraction>>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCall {
    PlatformType(PlatformType),
    Token(String),
    Destination(String),
    RegisterListener,
    Start,
    End,
    Mute(bool),
    Dtmf(DtmfTone, Option<String>),
}

pub struct SimSdkFactory {
    configs: Mutex<Vec<ClientConfiguration>>,
    sdks: Mutex<Vec<Arc<SimSdk>>>,
    interactions: Registry,
    fail_next_create: AtomicBool,
    fail_start: Arc<AtomicBool>,
}

impl SimSdkFactory {
    pub fn new() -> Self {
        Self {
            configs: Mutex::new(Vec::new()),
            sdks: Mutex::new(Vec::new()),
            interactions: Arc::new(Mutex::new(Vec::new())),
            fail_next_create: AtomicBool::new(false),
            fail_start: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn configs(&self) -> Vec<ClientConfiguration> {
        self.configs.lock().unwrap().clone()
    }

    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    /// Make every interaction created from now on fail in `start()`.
    pub fn fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn last_sdk(&self) -> Option<Arc<SimSdk>> {
        self.sdks.lock().unwrap().last().cloned()
    }

    pub fn interactions(&self) -> Vec<Arc<SimInteraction>> {
        self.interactions.lock().unwrap().clone()
    }

    pub fn last_interaction(&self) -> Option<Arc<SimInteraction>> {
        self.interactions.lock().unwrap().last().cloned()
    }
}

impl SdkFactory for SimSdkFactory {
    fn create(&self, config: &ClientConfiguration) -> Result<Arc<dyn TelephonySdk>, SdkError> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(SdkError::new("simulated construction failure"));
        }
        self.configs.lock().unwrap().push(config.clone());
        let sdk = Arc::new(SimSdk {
            logger: Mutex::new(None),
            interactions: self.interactions.clone(),
            fail_start: self.fail_start.clone(),
        });
        self.sdks.lock().unwrap().push(sdk.clone());
        Ok(sdk)
    }
}

pub struct SimSdk {
    logger: Mutex<Option<SdkLogLevel>>,
    interactions: Registry,
    fail_start: Arc<AtomicBool>,
}

impl SimSdk {
    pub fn logger_level(&self) -> Option<SdkLogLevel> {
        *self.logger.lock().unwrap()
    }
}

impl TelephonySdk for SimSdk {
    fn version_number(&self) -> Result<String, SdkError> {
        Ok(SIM_VERSION.to_string())
    }

    fn create_work(&self) -> Result<Arc<dyn Work>, SdkError> {
        Ok(Arc::new(SimWork {
            interactions: self.interactions.clone(),
            fail_start: self.fail_start.clone(),
        }))
    }

    fn register_logger(&self, level: SdkLogLevel) {
        *self.logger.lock().unwrap() = Some(level);
    }
}

struct SimWork {
    interactions: Registry,
    fail_start: Arc<AtomicBool>,
}

impl Work for SimWork {
    fn create_audio_interaction(
        &self,
        _device_listener: Arc<dyn AudioDeviceListener>,
    ) -> Result<Arc<dyn AudioInteraction>, SdkError> {
        let interaction = Arc::new(SimInteraction {
            calls: Mutex::new(Vec::new()),
            listener: Mutex::new(None),
            fail_start: self.fail_start.load(Ordering::SeqCst),
            fail_end: AtomicBool::new(false),
            report_end_on_failure: AtomicBool::new(false),
            fail_mute: AtomicBool::new(false),
            fail_dtmf: AtomicBool::new(false),
        });
        self.interactions.lock().unwrap().push(interaction.clone());
        Ok(interaction)
    }
}

pub struct SimInteraction {
    calls: Mutex<Vec<SimCall>>,
    listener: Mutex<Option<Arc<dyn AudioInteractionListener>>>,
    fail_start: bool,
    fail_end: AtomicBool,
    report_end_on_failure: AtomicBool,
    fail_mute: AtomicBool,
    fail_dtmf: AtomicBool,
}

impl SimInteraction {
    pub fn calls(&self) -> Vec<SimCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_end(&self) {
        self.fail_end.store(true, Ordering::SeqCst);
    }

    /// `end()` reports the interaction ended, lets the controller observe it,
    /// then fails anyway.
    pub fn fail_end_after_reporting(&self) {
        self.report_end_on_failure.store(true, Ordering::SeqCst);
        self.fail_end();
    }

    pub fn fail_mute(&self) {
        self.fail_mute.store(true, Ordering::SeqCst);
    }

    pub fn fail_dtmf(&self) {
        self.fail_dtmf.store(true, Ordering::SeqCst);
    }

    /// Registered lifecycle listener, for driving callbacks.
    pub fn listener(&self) -> Arc<dyn AudioInteractionListener> {
        self.listener
            .lock()
            .unwrap()
            .clone()
            .expect("no listener registered")
    }

    fn record(&self, call: SimCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AudioInteraction for SimInteraction {
    fn set_platform_type(&self, platform: PlatformType) -> Result<(), SdkError> {
        self.record(SimCall::PlatformType(platform));
        Ok(())
    }

    fn set_authorization_token(&self, token: &str) -> Result<(), SdkError> {
        self.record(SimCall::Token(token.to_string()));
        Ok(())
    }

    fn set_destination_address(&self, destination: &str) -> Result<(), SdkError> {
        self.record(SimCall::Destination(destination.to_string()));
        Ok(())
    }

    fn register_listener(&self, listener: Arc<dyn AudioInteractionListener>) -> Result<(), SdkError> {
        self.record(SimCall::RegisterListener);
        *self.listener.lock().unwrap() = Some(listener);
        Ok(())
    }

    fn start(&self) -> Result<(), SdkError> {
        if self.fail_start {
            return Err(SdkError::new("simulated start failure"));
        }
        self.record(SimCall::Start);
        Ok(())
    }

    fn end(&self) -> Result<(), SdkError> {
        if self.fail_end.load(Ordering::SeqCst) {
            if self.report_end_on_failure.load(Ordering::SeqCst) {
                self.listener().on_interaction_ended();
                std::thread::sleep(std::time::Duration::from_millis(200));
            }
            return Err(SdkError::new("simulated end failure"));
        }
        self.record(SimCall::End);
        let listener = self.listener.lock().unwrap().clone();
        if let Some(listener) = listener {
            listener.on_interaction_ended();
        }
        Ok(())
    }

    fn mute_audio(&self, mute: bool) -> Result<(), SdkError> {
        if self.fail_mute.load(Ordering::SeqCst) {
            return Err(SdkError::new("simulated mute failure"));
        }
        self.record(SimCall::Mute(mute));
        Ok(())
    }

    fn send_dtmf(&self, tone: DtmfTone) -> Result<(), SdkError> {
        if self.fail_dtmf.load(Ordering::SeqCst) {
            return Err(SdkError::new("simulated dtmf failure"));
        }
        let thread = std::thread::current().name().map(str::to_string);
        self.record(SimCall::Dtmf(tone, thread));
        Ok(())
    }
}

pub struct SimAudioRoute {
    pub speaker_on: bool,
    pub fail: bool,
}

impl AudioRoute for SimAudioRoute {
    fn is_speakerphone_on(&self) -> Result<bool, SdkError> {
        if self.fail {
            return Err(SdkError::new("audio manager unavailable"));
        }
        Ok(self.speaker_on)
    }
}
