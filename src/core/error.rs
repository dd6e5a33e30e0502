use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Switch not found: {0}")]
    SwitchNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Failure talking to an NPC's decision service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    #[error("decision service timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("decision service returned status {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("no decision endpoint configured")]
    NotConfigured,

    #[error("could not encode request: {0}")]
    Encode(String),
}

impl DecisionError {
    /// Visible label shown on the entity after this failure
    pub fn category(&self) -> ErrorLabel {
        match self {
            DecisionError::Timeout => ErrorLabel::Timeout,
            DecisionError::Connection(_) | DecisionError::Status(_) | DecisionError::Encode(_) => {
                ErrorLabel::ConnectionError
            }
            DecisionError::InvalidResponse(_) => ErrorLabel::InvalidResponse,
            DecisionError::NotConfigured => ErrorLabel::NotConfigured,
        }
    }

    /// Client errors (4xx), malformed bodies and missing endpoints are final
    pub fn is_retryable(&self) -> bool {
        match self {
            DecisionError::Timeout | DecisionError::Connection(_) => true,
            DecisionError::Status(code) => !(400..500).contains(code),
            DecisionError::InvalidResponse(_)
            | DecisionError::NotConfigured
            | DecisionError::Encode(_) => false,
        }
    }
}

/// Last communication failure, shown above the entity until the next success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorLabel {
    Timeout,
    ConnectionError,
    InvalidResponse,
    NotConfigured,
}

impl fmt::Display for ErrorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorLabel::Timeout => "Timeout",
            ErrorLabel::ConnectionError => "ConnectionError",
            ErrorLabel::InvalidResponse => "InvalidResponse",
            ErrorLabel::NotConfigured => "NotConfigured",
        };
        f.write_str(s)
    }
}
