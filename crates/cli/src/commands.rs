//! CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;
use portal_core::{FileStorage, PortalConfig, StateDir};
use portal_http::{PublicPortalClient, SocialProvider};
use portal_session::{LoginForm, RegisterForm, SessionController, SessionError};
use std::sync::Arc;
use tracing::info;

use crate::config;
use crate::terminal::{TerminalNavigator, TerminalNotifier};

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in with it
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,

        /// Accept the privacy policy and terms
        #[arg(long)]
        accept_terms: bool,
    },

    /// Sign in with a token obtained from an identity provider
    ///
    /// Requires the provider's client id in `social.google_client_id` or
    /// `social.facebook_app_id`.
    Social {
        /// `google` or `facebook`
        provider: SocialProvider,

        #[arg(long, env = "PORTAL_PROVIDER_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Exchange the stored refresh token for a new access token
    Refresh,

    /// End the current session
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Also GET this API path with the session's credentials
        #[arg(long)]
        fetch: Option<String>,
    },

    /// Print the effective configuration
    Config,
}

impl Commands {
    pub async fn execute(self, config: PortalConfig, state_dir: &StateDir) -> Result<()> {
        match self {
            Self::Login { email, password } => {
                let (controller, _) = open_session(&config, state_dir)?;
                let session = controller
                    .login(LoginForm::new(email, password))
                    .await
                    .map_err(describe)?;
                info!(user_id = %session.user_id, "Signed in");
            }
            Self::Register {
                username,
                email,
                password,
                accept_terms,
            } => {
                let (controller, _) = open_session(&config, state_dir)?;
                let form = RegisterForm {
                    username,
                    email,
                    password,
                    terms: accept_terms,
                };
                controller.register(form).await.map_err(describe)?;
            }
            Self::Social { provider, token } => {
                let key = match provider {
                    SocialProvider::Google => "social.google_client_id",
                    SocialProvider::Facebook => "social.facebook_app_id",
                };
                let client_id = config
                    .social
                    .client_id(provider.as_str())
                    .with_context(|| format!("{provider} sign-in is not configured (set {key})"))?;
                info!(%provider, client_id, "Using configured provider app");
                let (controller, _) = open_session(&config, state_dir)?;
                controller
                    .social_login(provider, &token)
                    .await
                    .map_err(describe)?;
            }
            Self::Refresh => {
                let (controller, _) = open_session(&config, state_dir)?;
                controller.refresh().await.map_err(describe)?;
                println!("Access token refreshed");
            }
            Self::Logout => {
                let (controller, _) = open_session(&config, state_dir)?;
                controller.logout().await;
            }
            Self::Whoami { fetch } => {
                let (controller, client) = open_session(&config, state_dir)?;
                let Some(session) = controller.session().current_session() else {
                    println!("Not signed in");
                    return Ok(());
                };
                println!("{} ({})", session.display_name, session.user_id);
                if let Some(role) = &session.role {
                    println!("  Role: {role}");
                }
                if let Some(email) = &session.email {
                    println!("  Email: {email}");
                }
                for rule in session.permissions.rules() {
                    println!("  Can {} {}", rule.action, rule.subject);
                }

                if let Some(path) = fetch {
                    let body: serde_json::Value = client
                        .authenticate(session.access_token)
                        .get_json(&path)
                        .await
                        .with_context(|| format!("GET {path} failed"))?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
            }
            Self::Config => println!("{}", config::render_config(&config)?),
        }

        Ok(())
    }
}

/// Open persistent storage and build a controller, restoring any saved session
fn open_session(
    config: &PortalConfig,
    state_dir: &StateDir,
) -> Result<(SessionController, PublicPortalClient)> {
    state_dir.create_directories()?;
    let storage = FileStorage::open(state_dir.storage_path())?;
    info!("Using storage at: {}", storage.path().display());

    let client = PublicPortalClient::from_config(config)?;
    let controller = SessionController::builder(Arc::new(client.clone()), Arc::new(storage))
        .routes(config.routes.clone())
        .navigator(Arc::new(TerminalNavigator))
        .notifier(Arc::new(TerminalNotifier))
        .build();
    controller.restore();
    Ok((controller, client))
}

/// Turn form errors into one readable line per field
fn describe(err: SessionError) -> anyhow::Error {
    match err.form_errors() {
        Some(errors) => {
            let lines = errors
                .iter()
                .map(|(field, error)| format!("  {field}: {}", error.describe()))
                .collect::<Vec<_>>()
                .join("\n");
            anyhow::anyhow!("Please correct the following:\n{lines}")
        }
        None => err.into(),
    }
}
