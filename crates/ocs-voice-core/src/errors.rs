use thiserror::Error;

/// Stable machine-readable rejection codes surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Config,
    Token,
    Setup,
    Call,
    EndCall,
    Mute,
    Speaker,
    Dtmf,
    Generic,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "CONFIG_ERROR",
            Self::Token => "TOKEN_ERROR",
            Self::Setup => "SETUP_ERROR",
            Self::Call => "CALL_ERROR",
            Self::EndCall => "END_CALL_ERROR",
            Self::Mute => "MUTE_ERROR",
            Self::Speaker => "SPEAKER_ERROR",
            Self::Dtmf => "DTMF_ERROR",
            Self::Generic => "Error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum OcsError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("token request failed: {0}")]
    Token(String),
    #[error("not ready: {0}")]
    Setup(String),
    #[error("call failed: {0}")]
    Call(String),
    #[error("end call failed: {0}")]
    EndCall(String),
    #[error("mute failed: {0}")]
    Mute(String),
    #[error("speaker toggle failed: {0}")]
    Speaker(String),
    #[error("dtmf failed: {0}")]
    Dtmf(String),
    #[error("{0}")]
    Sdk(String),
}

impl OcsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Config(_) => ErrorCode::Config,
            Self::Token(_) => ErrorCode::Token,
            Self::Setup(_) => ErrorCode::Setup,
            Self::Call(_) => ErrorCode::Call,
            Self::EndCall(_) => ErrorCode::EndCall,
            Self::Mute(_) => ErrorCode::Mute,
            Self::Speaker(_) => ErrorCode::Speaker,
            Self::Dtmf(_) => ErrorCode::Dtmf,
            Self::Sdk(_) => ErrorCode::Generic,
        }
    }
}

/// Failure reported by a vendor SDK implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("sdk error: {0}")]
pub struct SdkError(pub String);

impl SdkError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
