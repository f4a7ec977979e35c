use std::collections::BTreeMap;
use std::sync::Arc;

/// Host event channel carrying call status updates.
pub const CALL_STATE_CHANNEL: &str = "onCallStateChanged";
/// Host event channel reserved for video signalling.
pub const VIDEO_EVENT_CHANNEL: &str = "onVideoEvent";

/// Normalized call status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Idle,
    Initiating,
    Ringing,
    Connected,
    Ended,
    Error,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initiating => "initiating",
            Self::Ringing => "ringing",
            Self::Connected => "connected",
            Self::Ended => "ended",
            Self::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended | Self::Error)
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events relayed to the host runtime's event bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    CallStateChanged { status: CallStatus },
    VideoEvent { event: String },
}

impl HostEvent {
    pub fn channel(&self) -> &'static str {
        match self {
            Self::CallStateChanged { .. } => CALL_STATE_CHANNEL,
            Self::VideoEvent { .. } => VIDEO_EVENT_CHANNEL,
        }
    }

    /// Flat string payload as the host bridge marshals it.
    pub fn payload(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        match self {
            Self::CallStateChanged { status } => {
                map.insert("status".to_string(), status.as_str().to_string());
            }
            Self::VideoEvent { event } => {
                map.insert("event".to_string(), event.clone());
            }
        }
        map
    }
}

/// Trait for receiving events from the core.
/// Implementations must be Send + Sync (called from the controller's event loop).
pub trait HostEventListener: Send + Sync {
    fn on_event(&self, event: HostEvent);
}

/// Fire-and-forget relay to registered host listeners. No buffering, no replay.
#[derive(Clone)]
pub struct EventRelay {
    listeners: Arc<std::sync::RwLock<Vec<Arc<dyn HostEventListener>>>>,
}

impl EventRelay {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(std::sync::RwLock::new(Vec::new())),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn HostEventListener>) {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }

    pub fn emit(&self, event: HostEvent) {
        // Snapshot so no lock is held while the host handles the event.
        let listeners: Vec<_> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if listeners.is_empty() {
            tracing::debug!("no host listener for {}", event.channel());
        }
        for listener in listeners.iter() {
            listener.on_event(event.clone());
        }
    }

    pub fn emit_status(&self, status: CallStatus) {
        tracing::info!("call state changed: {status}");
        self.emit(HostEvent::CallStateChanged { status });
    }
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new()
    }
}
