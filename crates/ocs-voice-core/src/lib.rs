//! Contact-center voice bridge core.
//!
//! Pure Rust crate with no platform dependencies. Owns the single active
//! audio interaction of the vendor telephony SDK and relays its lifecycle
//! to the host runtime. Consumed by native shells via UniFFI bindings.

pub mod adapter;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod dtmf;
pub mod errors;
pub mod events;
pub mod promise;
pub mod sdk;
pub mod session;
pub mod settings;
pub mod token;

#[cfg(test)]
pub(crate) mod sim;

pub use adapter::SdkAdapter;
pub use bridge::OcsBridge;
pub use config::OcsConfig;
pub use dispatch::{LooperDispatcher, UiDispatcher};
pub use dtmf::DtmfTone;
pub use errors::{ErrorCode, OcsError, SdkError};
pub use events::{CallStatus, EventRelay, HostEvent, HostEventListener};
pub use promise::{BridgeValue, Completion, PromiseSink};
pub use session::CallSessionController;
pub use settings::{Settings, SettingsStore};
pub use token::{TokenClient, TokenRequest, TokenResponse};
