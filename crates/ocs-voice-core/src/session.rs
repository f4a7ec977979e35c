use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::adapter::SdkAdapter;
use crate::dtmf::DtmfTone;
use crate::errors::{OcsError, SdkError};
use crate::events::{CallStatus, EventRelay};
use crate::dispatch::UiDispatcher;
use crate::sdk::{
    AudioInteraction, AudioInteractionListener, AudioRoute, CallQuality, IgnoreAudioDevices,
    PlatformType,
};

/// SDK lifecycle callback, as posted to the controller's event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionCallback {
    Initiating,
    RemoteAlerting,
    Active,
    Ended,
    Failed(String),
    AudioMuteStatusChanged(bool),
    Held,
    Unheld,
    HeldRemotely,
    UnheldRemotely,
    QualityChanged(CallQuality),
    DiscardComplete,
}

impl InteractionCallback {
    /// Status tag reported to the host, `None` for callbacks that are only observed.
    pub fn status(&self) -> Option<CallStatus> {
        match self {
            Self::Initiating => Some(CallStatus::Initiating),
            Self::RemoteAlerting => Some(CallStatus::Ringing),
            Self::Active => Some(CallStatus::Connected),
            Self::Ended => Some(CallStatus::Ended),
            Self::Failed(_) => Some(CallStatus::Error),
            _ => None,
        }
    }
}

struct SessionCallback {
    session: Uuid,
    callback: InteractionCallback,
}

/// Listener registered on each interaction. Runs on SDK threads and only posts.
struct SessionListener {
    session: Uuid,
    tx: mpsc::UnboundedSender<SessionCallback>,
}

impl SessionListener {
    fn post(&self, callback: InteractionCallback) {
        let session = self.session;
        if self.tx.send(SessionCallback { session, callback }).is_err() {
            tracing::warn!("session {session}: controller gone, callback dropped");
        }
    }
}

impl AudioInteractionListener for SessionListener {
    fn on_interaction_initiating(&self) {
        self.post(InteractionCallback::Initiating);
    }

    fn on_interaction_remote_alerting(&self) {
        self.post(InteractionCallback::RemoteAlerting);
    }

    fn on_interaction_active(&self) {
        self.post(InteractionCallback::Active);
    }

    fn on_interaction_ended(&self) {
        self.post(InteractionCallback::Ended);
    }

    fn on_interaction_failed(&self, error: String) {
        self.post(InteractionCallback::Failed(error));
    }

    fn on_interaction_audio_mute_status_changed(&self, muted: bool) {
        self.post(InteractionCallback::AudioMuteStatusChanged(muted));
    }

    fn on_interaction_held(&self) {
        self.post(InteractionCallback::Held);
    }

    fn on_interaction_unheld(&self) {
        self.post(InteractionCallback::Unheld);
    }

    fn on_interaction_held_remotely(&self) {
        self.post(InteractionCallback::HeldRemotely);
    }

    fn on_interaction_unheld_remotely(&self) {
        self.post(InteractionCallback::UnheldRemotely);
    }

    fn on_interaction_quality_changed(&self, quality: CallQuality) {
        self.post(InteractionCallback::QualityChanged(quality));
    }

    fn on_discard_complete(&self) {
        self.post(InteractionCallback::DiscardComplete);
    }
}

struct ActiveCall {
    session: Uuid,
    destination: String,
    interaction: Arc<dyn AudioInteraction>,
}

/// Status label per known session.
///
/// A session is known from just before its interaction starts until the next
/// call is placed after it finished. Callbacks from unknown sessions are dropped.
#[derive(Default)]
struct SessionState {
    latest: Option<Uuid>,
    statuses: HashMap<Uuid, CallStatus>,
}

impl SessionState {
    fn status(&self) -> CallStatus {
        self.latest
            .and_then(|s| self.statuses.get(&s).copied())
            .unwrap_or(CallStatus::Idle)
    }

    fn is_finished(&self, session: Uuid) -> bool {
        self.statuses.get(&session).is_none_or(|s| s.is_terminal())
    }

    /// Register a new session, forgetting older sessions that already finished.
    fn begin(&mut self, session: Uuid) -> Option<Uuid> {
        let latest = self.latest;
        self.statuses
            .retain(|id, status| !status.is_terminal() || Some(*id) == latest);
        self.statuses.insert(session, CallStatus::Idle);
        self.latest.replace(session)
    }

    fn abandon(&mut self, session: Uuid, previous: Option<Uuid>) {
        self.statuses.remove(&session);
        if self.latest == Some(session) {
            self.latest = previous;
        }
    }
}

/// Owns at most one in-flight audio interaction.
///
/// Bridge operations act on the current interaction directly; SDK callbacks
/// are funnelled through a single event loop that updates the status label,
/// clears finished interactions and relays status events in arrival order.
pub struct CallSessionController {
    adapter: Arc<SdkAdapter>,
    relay: EventRelay,
    ui: Arc<dyn UiDispatcher>,
    audio_route: Arc<dyn AudioRoute>,
    current: Arc<Mutex<Option<ActiveCall>>>,
    state: Arc<Mutex<SessionState>>,
    callbacks: mpsc::UnboundedSender<SessionCallback>,
}

impl CallSessionController {
    /// Create the controller and spawn its callback event loop on `runtime`.
    pub fn new(
        adapter: Arc<SdkAdapter>,
        relay: EventRelay,
        ui: Arc<dyn UiDispatcher>,
        audio_route: Arc<dyn AudioRoute>,
        runtime: &tokio::runtime::Handle,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let current = Arc::new(Mutex::new(None));
        let state = Arc::new(Mutex::new(SessionState::default()));

        runtime.spawn(Self::event_loop(rx, relay.clone(), current.clone(), state.clone()));

        Self {
            adapter,
            relay,
            ui,
            audio_route,
            current,
            state,
            callbacks: tx,
        }
    }

    pub fn relay(&self) -> &EventRelay {
        &self.relay
    }

    /// Status label of the latest session (`Idle` before any call).
    pub fn status(&self) -> CallStatus {
        lock(&self.state).status()
    }

    pub fn has_active_call(&self) -> bool {
        lock(&self.current).is_some()
    }

    pub fn active_destination(&self) -> Option<String> {
        lock(&self.current).as_ref().map(|c| c.destination.clone())
    }

    /// Place an audio call to `destination`.
    ///
    /// Returns once the SDK accepted `start()`; progress is reported via
    /// status events.
    pub fn start_audio_call(&self, destination: &str) -> Result<String, OcsError> {
        let (sdk, token) = self.adapter.call_credentials()?;

        let mut current = lock(&self.current);
        if current.is_some() {
            return Err(OcsError::Call("a call is already in progress".into()));
        }

        let session = Uuid::new_v4();
        let previous = lock(&self.state).begin(session);

        tracing::info!("session {session}: starting audio call to {destination}");
        let listener = Arc::new(SessionListener {
            session,
            tx: self.callbacks.clone(),
        });

        let started = (|| -> Result<Arc<dyn AudioInteraction>, SdkError> {
            let work = sdk.create_work()?;
            let interaction = work.create_audio_interaction(Arc::new(IgnoreAudioDevices))?;
            interaction.set_platform_type(PlatformType::Elite)?;
            interaction.set_authorization_token(&token)?;
            interaction.set_destination_address(destination)?;
            interaction.register_listener(listener)?;
            interaction.start()?;
            Ok(interaction)
        })();

        match started {
            Ok(interaction) => {
                *current = Some(ActiveCall {
                    session,
                    destination: destination.to_string(),
                    interaction,
                });
                Ok(format!("Audio call started to: {destination}"))
            }
            Err(e) => {
                tracing::error!("session {session}: failed to start audio call: {e}");
                lock(&self.state).abandon(session, previous);
                Err(OcsError::Call(format!("failed to start audio call: {e}")))
            }
        }
    }

    /// End the current call. Without one this is a benign no-op.
    pub fn end_call(&self) -> Result<String, OcsError> {
        let Some(active) = lock(&self.current).take() else {
            tracing::info!("end call requested with no active call");
            return Ok("No active call".to_string());
        };

        tracing::info!("session {}: ending call", active.session);
        if let Err(e) = active.interaction.end() {
            tracing::error!("session {}: end failed: {e}", active.session);
            let mut current = lock(&self.current);
            if current.is_none() && !lock(&self.state).is_finished(active.session) {
                *current = Some(active);
            }
            return Err(OcsError::EndCall(e.to_string()));
        }
        Ok("Call ended".to_string())
    }

    /// Forward a mute request to the current call, if any.
    pub fn toggle_mute(&self, should_mute: bool) -> Result<bool, OcsError> {
        let interaction = lock(&self.current).as_ref().map(|c| c.interaction.clone());
        match interaction {
            Some(interaction) => {
                interaction
                    .mute_audio(should_mute)
                    .map_err(|e| OcsError::Mute(e.to_string()))?;
                tracing::info!("audio muted: {should_mute}");
            }
            None => tracing::debug!("mute requested with no active call"),
        }
        Ok(true)
    }

    /// Speaker routing stays with the platform; the route is only queried.
    // TODO: call a setter on AudioRoute once hosts expose one.
    pub fn toggle_speaker(&self, speaker_on: bool) -> Result<bool, OcsError> {
        let current = self
            .audio_route
            .is_speakerphone_on()
            .map_err(|e| OcsError::Speaker(e.to_string()))?;
        tracing::info!("speaker requested={speaker_on} current={current}");
        Ok(true)
    }

    /// Send one DTMF digit on the current call.
    ///
    /// The SDK call is made on the UI dispatcher; the future completes once
    /// it has returned.
    pub async fn send_dtmf(&self, digit: &str) -> Result<String, OcsError> {
        let Some(tone) = DtmfTone::from_digit(digit) else {
            return Err(OcsError::Dtmf(format!("invalid digit: {digit}")));
        };
        if !self.has_active_call() {
            return Err(OcsError::Dtmf("no active call".into()));
        }

        let (tx, rx) = oneshot::channel();
        let current = self.current.clone();
        let digit = digit.to_string();
        self.ui.post(Box::new(move || {
            let interaction = lock(&current).as_ref().map(|c| c.interaction.clone());
            let result = match interaction {
                Some(interaction) => {
                    tracing::debug!("sending dtmf {}", tone.as_str());
                    interaction
                        .send_dtmf(tone)
                        .map(|_| format!("DTMF sent: {digit}"))
                        .map_err(|e| OcsError::Dtmf(format!("failed to send DTMF: {e}")))
                }
                None => Err(OcsError::Dtmf("no active call".into())),
            };
            let _ = tx.send(result);
        }));

        rx.await
            .map_err(|_| OcsError::Dtmf("ui dispatcher dropped the request".into()))?
    }

    async fn event_loop(
        mut rx: mpsc::UnboundedReceiver<SessionCallback>,
        relay: EventRelay,
        current: Arc<Mutex<Option<ActiveCall>>>,
        state: Arc<Mutex<SessionState>>,
    ) {
        while let Some(SessionCallback { session, callback }) = rx.recv().await {
            let Some(status) = callback.status() else {
                tracing::debug!("session {session}: observed {callback:?}");
                continue;
            };
            if let InteractionCallback::Failed(reason) = &callback {
                tracing::error!("session {session}: interaction failed: {reason}");
            }

            {
                let mut state = lock(&state);
                let Some(previous) = state.statuses.get_mut(&session) else {
                    tracing::debug!("session {session}: unknown, {callback:?} dropped");
                    continue;
                };
                if *previous == status || previous.is_terminal() {
                    tracing::debug!("session {session}: {status} ignored in {previous}");
                    continue;
                }
                *previous = status;
                if state.latest != Some(session) {
                    tracing::debug!("session {session}: relaying {status} of a replaced call");
                }
            }

            if status.is_terminal() {
                let mut current = lock(&current);
                if current.as_ref().is_some_and(|c| c.session == session) {
                    *current = None;
                }
            }

            relay.emit_status(status);
        }
        tracing::debug!("session event loop stopped");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
