//! Client-side session lifecycle
//!
//! [`SessionController`] drives sign-in, sign-up, social sign-in, token refresh
//! and logout. It is the single writer of the shared session state and the
//! token store; navigation and user notifications are delegated to the
//! [`Navigator`] and [`Notifier`] collaborators once a transition is complete.

pub mod api;
pub mod controller;
pub mod error;
pub mod forms;
pub mod navigation;
pub mod notify;

pub use api::AuthApi;
pub use controller::{AuthPhase, SessionController, SessionControllerBuilder};
pub use error::SessionError;
pub use forms::{FieldError, FieldErrorKind, FormErrors, LoginForm, RegisterForm};
pub use navigation::{LogNavigator, Navigator};
pub use notify::{LogNotifier, Notification, Notifier};
