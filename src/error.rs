use std::fmt;

use crate::driver::Listener;

/// Errors surfaced to the host.
///
/// Nothing in steady-state play produces one of these. Storage errors are
/// swallowed by the session; the rest abort initialization.
#[derive(Debug)]
pub enum GameError {
    StorageUnavailable { reason: String },
    StorageCorrupt { reason: String },
    ListenerRegistration { listener: Listener, reason: String },
    InvalidTuning { field: &'static str, reason: String },
    Io(std::io::Error),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageUnavailable { reason } => write!(f, "storage unavailable: {reason}"),
            Self::StorageCorrupt { reason } => write!(f, "stored high score is corrupt: {reason}"),
            Self::ListenerRegistration { listener, reason } => {
                write!(f, "failed to register {listener:?} listener: {reason}")
            }
            Self::InvalidTuning { field, reason } => {
                write!(f, "invalid tuning value for `{field}`: {reason}")
            }
            Self::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GameError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_field() {
        let err = GameError::InvalidTuning {
            field: "reference_width",
            reason: "must be positive".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid tuning value for `reference_width`: must be positive"
        );
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error;
        let err = GameError::from(std::io::Error::other("disk on fire"));
        assert!(err.source().is_some());
    }
}
