//! Session controller
//!
//! State machine over [`AuthPhase`]:
//!
//! * `Anonymous | Authenticated -> Authenticating` when a sign-in, sign-up or
//!   social sign-in starts. Only one may be pending; a second one is rejected
//!   with [`SessionError::InFlight`].
//! * `Authenticating -> Authenticated` on success. Tokens and the session
//!   snapshot are persisted and the shared session replaced before the
//!   navigator and notifier are told.
//! * `Authenticating -> previous phase` on failure. Nothing is written.
//! * `* -> Anonymous` on logout, after the server has been told (best-effort).
//!
//! Every pending request carries an epoch. `cancel`, `logout` and dropping the
//! pending future advance or release it, and a response whose epoch is no
//! longer current is discarded. A refresh is instead tied to the session
//! generation, which only moves when a session is established, restored or
//! cleared.

use crate::api::AuthApi;
use crate::error::SessionError;
use crate::forms::{FormErrors, LoginForm, RegisterForm};
use crate::navigation::{LogNavigator, Navigator};
use crate::notify::{LogNotifier, Notification, Notifier};
use portal_core::config::RouteConfig;
use portal_core::{
    KeyValueStorage, PermissionSet, SessionHandle, SessionSnapshotStore, SessionState,
    SessionWriter, TokenPair, TokenStore, UserSession,
};
use portal_http::{AuthResponse, ClientError, SocialProvider};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Where the session lifecycle currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

#[derive(Debug)]
struct PhaseState {
    phase: AuthPhase,
    /// Phase to fall back to when the pending request fails or is cancelled
    resume: AuthPhase,
    /// Identifies the pending authentication
    epoch: u64,
    /// Advanced whenever the signed-in session is replaced or cleared
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
enum Flow {
    Login,
    Register,
    Social(SocialProvider),
}

impl Flow {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Social(provider) => provider.as_str(),
        }
    }
}

/// Orchestrates sign-in, sign-up, refresh and logout
pub struct SessionController {
    api: Arc<dyn AuthApi>,
    tokens: TokenStore,
    snapshot: SessionSnapshotStore,
    session: SessionWriter,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    routes: RouteConfig,
    state: Mutex<PhaseState>,
}

/// Marks one pending authentication; releases it if dropped unsettled
struct PendingGuard<'a> {
    controller: &'a SessionController,
    epoch: u64,
    settled: bool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.controller.lock_state();
        if state.epoch == self.epoch && state.phase == AuthPhase::Authenticating {
            state.phase = state.resume;
            debug!("Pending authentication abandoned");
        }
    }
}

impl SessionController {
    /// Start building a controller over the given backend and storage
    pub fn builder(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> SessionControllerBuilder {
        SessionControllerBuilder {
            api,
            storage,
            routes: RouteConfig::default(),
            navigator: Arc::new(LogNavigator),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Current phase
    pub fn phase(&self) -> AuthPhase {
        self.lock_state().phase
    }

    /// Read-only handle on the shared session
    pub fn session(&self) -> SessionHandle {
        self.session.handle()
    }

    /// Token store this controller writes to
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub const fn routes(&self) -> &RouteConfig {
        &self.routes
    }

    /// Sign in with email and password
    ///
    /// # Errors
    ///
    /// * [`SessionError::Form`] for empty fields (no request is sent) or when
    ///   the server refuses; the server message is attached to `email`
    /// * [`SessionError::InFlight`] while another authentication is pending
    /// * [`SessionError::Cancelled`] when the request was cancelled meanwhile
    pub async fn login(&self, form: LoginForm) -> Result<UserSession, SessionError> {
        let request = form.validate().map_err(SessionError::Form)?;
        let guard = self.begin()?;
        info!(email = %request.email, "Signing in");
        let result = self.api.login(&request).await;
        self.finish(guard, Flow::Login, result)
    }

    /// Create an account and sign in with it
    ///
    /// # Errors
    ///
    /// * [`SessionError::Form`] for empty fields or unaccepted terms (no
    ///   request is sent), or with the server's field errors
    /// * [`SessionError::InFlight`] while another authentication is pending
    /// * [`SessionError::Cancelled`] when the request was cancelled meanwhile
    pub async fn register(&self, form: RegisterForm) -> Result<UserSession, SessionError> {
        let request = form.validate().map_err(SessionError::Form)?;
        let guard = self.begin()?;
        info!(email = %request.email, username = %request.username, "Registering");
        let result = self.api.register(&request).await;
        self.finish(guard, Flow::Register, result)
    }

    /// Sign in with a token handed over by an identity provider SDK
    ///
    /// # Errors
    ///
    /// * [`SessionError::Notification`] when the exchange fails; the same
    ///   message is sent to the notifier
    /// * [`SessionError::InFlight`] while another authentication is pending
    /// * [`SessionError::Cancelled`] when the request was cancelled meanwhile
    pub async fn social_login(
        &self,
        provider: SocialProvider,
        provider_token: &str,
    ) -> Result<UserSession, SessionError> {
        if provider_token.is_empty() {
            let message = format!("{provider} sign-in did not return a token");
            self.notifier.notify(&Notification::Error(message.clone()));
            return Err(SessionError::Notification(message));
        }
        let guard = self.begin()?;
        info!(%provider, "Signing in with provider");
        let result = self
            .api
            .exchange_provider_token(provider, provider_token)
            .await;
        self.finish(guard, Flow::Social(provider), result)
    }

    /// Discard the pending authentication, if any
    ///
    /// Its response will not be applied. Returns whether something was pending.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock_state();
        if state.phase != AuthPhase::Authenticating {
            return false;
        }
        state.epoch = state.epoch.wrapping_add(1);
        state.phase = state.resume;
        info!("Cancelled pending authentication");
        true
    }

    /// End the session
    ///
    /// The server is told first; its failure is logged and ignored. Local
    /// tokens, snapshot and shared session are then cleared together before
    /// navigating to the login route. Safe to call when already signed out.
    pub async fn logout(&self) {
        self.cancel();

        let access_token = match self.tokens.read() {
            Ok(tokens) => tokens.access_token,
            Err(e) => {
                warn!("Could not read stored tokens during logout: {e}");
                None
            }
        }
        .or_else(|| self.session.current_session().map(|s| s.access_token));

        if let Some(token) = access_token {
            if let Err(e) = self.api.logout(&token).await {
                warn!("Server logout failed, clearing local session anyway: {e}");
            }
        }

        {
            let mut state = self.lock_state();
            // Supersede anything that started while the server was notified
            state.epoch = state.epoch.wrapping_add(1);
            if let Err(e) = self.tokens.clear() {
                error!("Failed to clear stored tokens: {e}");
            }
            if let Err(e) = self.snapshot.clear() {
                error!("Failed to clear session snapshot: {e}");
            }
            self.session.clear_session();
            state.generation = state.generation.wrapping_add(1);
            state.phase = AuthPhase::Anonymous;
            state.resume = AuthPhase::Anonymous;
        }

        info!("Signed out");
        self.navigator.navigate(&self.routes.login);
    }

    /// Obtain a new access token with the stored refresh token
    ///
    /// # Errors
    ///
    /// * [`SessionError::NotAuthenticated`] when no refresh token is stored
    /// * [`SessionError::Api`] with `TokenInvalid` when the server refuses it
    /// * [`SessionError::Cancelled`] when a logout or new sign-in happened meanwhile
    pub async fn refresh(&self) -> Result<String, SessionError> {
        let refresh_token = self
            .tokens
            .read()?
            .refresh_token
            .ok_or(SessionError::NotAuthenticated)?;
        let generation = self.lock_state().generation;

        debug!("Refreshing access token");
        let refreshed = match self.api.refresh(&refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(err) => {
                warn!("Token refresh failed: {err}");
                return Err(err.into());
            }
        };

        let state = self.lock_state();
        if state.generation != generation {
            debug!("Discarding refresh result after session change");
            return Err(SessionError::Cancelled);
        }

        let saved = match &refreshed.refresh_token {
            Some(rotated) => self
                .tokens
                .save(&TokenPair::new(&refreshed.access_token, rotated)),
            None => self.tokens.replace_access_token(&refreshed.access_token),
        };
        if let Err(e) = saved {
            error!("Failed to persist refreshed token: {e}");
        }

        if self.session.update_access_token(&refreshed.access_token) {
            self.save_snapshot();
        }
        drop(state);

        info!("Access token refreshed");
        Ok(refreshed.access_token)
    }

    /// Rebuild the session from storage after a restart
    ///
    /// Needs both a stored access token and a readable snapshot; otherwise
    /// stays anonymous and returns `None`.
    pub fn restore(&self) -> Option<UserSession> {
        let mut state = self.lock_state();
        if state.phase != AuthPhase::Anonymous {
            return self.session.current_session();
        }

        let access_token = match self.tokens.read() {
            Ok(tokens) => tokens.access_token?,
            Err(e) => {
                warn!("Could not read stored tokens: {e}");
                return None;
            }
        };
        let snapshot = match self.snapshot.load() {
            Ok(snapshot) => snapshot?,
            Err(e) => {
                warn!("Could not read session snapshot: {e}");
                return None;
            }
        };

        let session = UserSession {
            access_token,
            ..snapshot
        };
        self.session.set_session(session.clone());
        state.generation = state.generation.wrapping_add(1);
        state.phase = AuthPhase::Authenticated;
        state.resume = AuthPhase::Authenticated;
        info!(user_id = %session.user_id, "Restored session from storage");
        Some(session)
    }

    /// Replace the permission set of the signed-in user
    ///
    /// Returns `false` when nobody is signed in.
    pub fn update_permissions(&self, permissions: PermissionSet) -> bool {
        let _state = self.lock_state();
        let updated = self.session.update_permissions(permissions);
        if updated {
            self.save_snapshot();
        }
        updated
    }

    fn lock_state(&self) -> MutexGuard<'_, PhaseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Result<PendingGuard<'_>, SessionError> {
        let mut state = self.lock_state();
        if state.phase == AuthPhase::Authenticating {
            warn!("Rejecting authentication while another one is pending");
            return Err(SessionError::InFlight);
        }
        state.epoch = state.epoch.wrapping_add(1);
        state.resume = state.phase;
        state.phase = AuthPhase::Authenticating;
        Ok(PendingGuard {
            controller: self,
            epoch: state.epoch,
            settled: false,
        })
    }

    fn finish(
        &self,
        guard: PendingGuard<'_>,
        flow: Flow,
        result: Result<AuthResponse, ClientError>,
    ) -> Result<UserSession, SessionError> {
        match result {
            Ok(response) => self.establish(guard, flow, response),
            Err(err) => {
                if !self.settle_failure(guard) {
                    debug!(flow = flow.as_str(), "Ignoring failure of cancelled authentication");
                    return Err(SessionError::Cancelled);
                }
                warn!(flow = flow.as_str(), "Authentication failed: {err}");
                Err(match flow {
                    Flow::Login | Flow::Register => {
                        SessionError::Form(FormErrors::from_client_error(&err, "email"))
                    }
                    Flow::Social(_) => {
                        let message = err.user_message();
                        self.notifier.notify(&Notification::Error(message.clone()));
                        SessionError::Notification(message)
                    }
                })
            }
        }
    }

    /// Return to the pre-request phase; `false` if the request was superseded
    fn settle_failure(&self, mut guard: PendingGuard<'_>) -> bool {
        let mut state = self.lock_state();
        guard.settled = true;
        if state.epoch != guard.epoch {
            return false;
        }
        state.phase = state.resume;
        true
    }

    fn establish(
        &self,
        mut guard: PendingGuard<'_>,
        flow: Flow,
        response: AuthResponse,
    ) -> Result<UserSession, SessionError> {
        let session = UserSession::from_profile(&response.user, response.access_token.clone());

        {
            let mut state = self.lock_state();
            guard.settled = true;
            if state.epoch != guard.epoch {
                debug!(flow = flow.as_str(), "Discarding response of cancelled authentication");
                return Err(SessionError::Cancelled);
            }
            self.persist(&response, &session);
            self.session.set_session(session.clone());
            state.generation = state.generation.wrapping_add(1);
            state.phase = AuthPhase::Authenticated;
        }

        let route = match flow {
            Flow::Register => self.routes.after_register.as_str(),
            Flow::Login | Flow::Social(_) => self.routes.home_for_role(session.role.as_deref()),
        };
        info!(
            flow = flow.as_str(),
            user_id = %session.user_id,
            role = session.role.as_deref().unwrap_or_default(),
            route,
            "Signed in"
        );

        self.navigator.navigate(route);
        self.notifier.notify(&Notification::SignedIn {
            name: session.display_name.clone(),
            role: session.role.clone().unwrap_or_else(|| "admin".to_string()),
        });

        Ok(session)
    }

    fn persist(&self, response: &AuthResponse, session: &UserSession) {
        let saved = match &response.refresh_token {
            Some(refresh_token) => self
                .tokens
                .save(&TokenPair::new(&response.access_token, refresh_token)),
            // Never leave a previous user's refresh token next to a new access token
            None => self
                .tokens
                .clear()
                .and_then(|()| self.tokens.replace_access_token(&response.access_token)),
        };
        if let Err(e) = saved {
            error!("Failed to persist tokens: {e}");
        }
        if let Err(e) = self.snapshot.save(session) {
            error!("Failed to persist session snapshot: {e}");
        }
    }

    fn save_snapshot(&self) {
        if let Some(current) = self.session.current_session() {
            if let Err(e) = self.snapshot.save(&current) {
                error!("Failed to persist session snapshot: {e}");
            }
        }
    }
}

/// Builder for [`SessionController`]
pub struct SessionControllerBuilder {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn KeyValueStorage>,
    routes: RouteConfig,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl SessionControllerBuilder {
    /// Navigation targets (defaults to [`RouteConfig::default`])
    #[must_use]
    pub fn routes(mut self, routes: RouteConfig) -> Self {
        self.routes = routes;
        self
    }

    /// Navigation collaborator (defaults to [`LogNavigator`])
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Notification collaborator (defaults to [`LogNotifier`])
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn build(self) -> SessionController {
        let (session, _reader) = SessionState::new();
        SessionController {
            api: self.api,
            tokens: TokenStore::new(self.storage.clone()),
            snapshot: SessionSnapshotStore::new(self.storage),
            session,
            navigator: self.navigator,
            notifier: self.notifier,
            routes: self.routes,
            state: Mutex::new(PhaseState {
                phase: AuthPhase::Anonymous,
                resume: AuthPhase::Anonymous,
                epoch: 0,
                generation: 0,
            }),
        }
    }
}
