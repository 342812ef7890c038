//! Session controller errors

use crate::forms::FormErrors;
use portal_core::CoreError;
use portal_http::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Field-level errors for the sign-in or sign-up form
    #[error("{0}")]
    Form(FormErrors),

    /// A failure reported through a notification rather than a form
    #[error("{0}")]
    Notification(String),

    /// Another sign-in is still waiting for the server
    #[error("An authentication request is already in progress")]
    InFlight,

    /// The request was superseded by `cancel` or `logout`; its result was discarded
    #[error("Authentication request was cancelled")]
    Cancelled,

    /// No stored credentials to act on
    #[error("Not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Api(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] CoreError),
}

impl SessionError {
    /// Form errors, if this failure belongs on a form
    pub const fn form_errors(&self) -> Option<&FormErrors> {
        match self {
            Self::Form(errors) => Some(errors),
            _ => None,
        }
    }
}
