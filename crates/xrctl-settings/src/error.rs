//! Errors returned by the binding layer.
//!
//! Store access failures are reported through the
//! [`Notifier`](crate::notify::Notifier) before they are returned as
//! [`FormError::Store`]; callers may ignore them.

use thiserror::Error;
use xrctl_store::StoreError;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("form '{form}' has no control named '{id}'")]
    UnknownControl { form: &'static str, id: String },

    #[error("control '{0}' is disabled")]
    Disabled(&'static str),

    #[error("invalid value '{value}' for '{id}': {reason}")]
    InvalidValue {
        id: &'static str,
        value: String,
        reason: String,
    },

    #[error("form '{form}' has no group named '{group}'")]
    UnknownGroup { form: &'static str, group: String },

    #[error("unknown form '{0}'")]
    UnknownForm(String),

    #[error("{0} is not installed")]
    RuntimeNotFound(&'static str),

    #[error("store access failed: {0}")]
    Store(#[from] StoreError),
}

pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_error_display() {
        let err = FormError::UnknownControl {
            form: "advanced",
            id: "bogus".to_string(),
        };
        assert_eq!(err.to_string(), "form 'advanced' has no control named 'bogus'");

        let err = FormError::Disabled("player_height");
        assert_eq!(err.to_string(), "control 'player_height' is disabled");

        let err = FormError::InvalidValue {
            id: "guardian",
            value: "maybe".to_string(),
            reason: "expected on or off".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value 'maybe' for 'guardian': expected on or off"
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let err: FormError = StoreError::AccessDenied {
            path: "SOFTWARE\\PimaxXR".to_string(),
        }
        .into();
        assert!(matches!(err, FormError::Store(_)));
    }
}
