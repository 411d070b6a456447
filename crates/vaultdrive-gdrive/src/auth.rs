//! Token refresh exchange
//!
//! [`AuthTokenManager`] implements the token-manager port: it hands back
//! the stored access token while it is fresh, and performs the OAuth
//! `grant_type=refresh_token` exchange when it is expired or about to
//! expire. Rotated credentials are persisted through the settings store
//! before the token is returned, and each successful refresh publishes
//! the new expiry instant on a watch channel the host may subscribe to.
//! No global event is fired.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, info};

use vaultdrive_core::config::SettingsStore;
use vaultdrive_core::domain::credentials::Credentials;
use vaultdrive_core::domain::sync_error::SyncError;
use vaultdrive_core::ports::remote_store::AccessToken;
use vaultdrive_core::ports::token_manager::ITokenManager;

/// Default endpoint for the refresh exchange
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Safety margin treating tokens about to expire as already expired
///
/// A token valid for less than this is refreshed up front so it cannot
/// go stale between the session's first and last remote call.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Fallback access-token lifetime when the response omits `expires_in`
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Response body of the refresh exchange
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

/// Token manager backed by the settings blob and an OAuth token endpoint
pub struct AuthTokenManager {
    /// Owner of the persisted credentials
    settings: Arc<SettingsStore>,
    /// HTTP client for the refresh exchange
    http: reqwest::Client,
    /// The token endpoint refreshes are sent to
    token_url: String,
    /// Publishes the latest access-token expiry after each refresh
    expiry_tx: watch::Sender<Option<DateTime<Utc>>>,
}

impl AuthTokenManager {
    /// Creates a manager against the default token endpoint
    #[must_use]
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self::with_token_url(settings, DEFAULT_TOKEN_URL)
    }

    /// Creates a manager against a custom token endpoint (useful for testing)
    #[must_use]
    pub fn with_token_url(settings: Arc<SettingsStore>, token_url: impl Into<String>) -> Self {
        let (expiry_tx, _) = watch::channel(None);
        Self {
            settings,
            http: reqwest::Client::new(),
            token_url: token_url.into(),
            expiry_tx,
        }
    }

    /// Subscribes to access-token expiry updates
    ///
    /// The channel carries the expiry instant of the most recently
    /// refreshed access token, or `None` before the first refresh.
    pub fn subscribe_expiry(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.expiry_tx.subscribe()
    }

    /// Performs the refresh exchange for the given credentials
    ///
    /// # Errors
    /// Any transport failure, non-success status, or a response missing
    /// an access token maps to [`SyncError::Auth`].
    async fn refresh(&self, credentials: &Credentials) -> Result<Credentials, SyncError> {
        debug!(user = %credentials.user_id, "Refreshing access token");

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", credentials.refresh_token.as_str()),
                ("user_id", credentials.user_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SyncError::Auth {
                reason: format!("refresh request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Auth {
                reason: format!("refresh rejected with {status}: {body}"),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| SyncError::Auth {
            reason: format!("unreadable refresh response: {e}"),
        })?;

        let access_token = token.access_token.ok_or_else(|| SyncError::Auth {
            reason: "refresh response carried no access token".to_string(),
        })?;

        let expires_in = token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        Ok(Credentials {
            user_id: credentials.user_id.clone(),
            access_token,
            // The endpoint may rotate the refresh token; keep the previous
            // one when the response omits it
            refresh_token: token
                .refresh_token
                .unwrap_or_else(|| credentials.refresh_token.clone()),
            access_expiry: Utc::now() + Duration::seconds(expires_in),
        })
    }
}

#[async_trait::async_trait]
impl ITokenManager for AuthTokenManager {
    async fn ensure_valid(&self) -> Result<AccessToken, SyncError> {
        let credentials = self
            .settings
            .credentials()
            .map_err(|e| SyncError::Auth {
                reason: format!("failed to read credentials: {e}"),
            })?
            .ok_or_else(|| SyncError::Auth {
                reason: "no stored credentials".to_string(),
            })?;

        if !credentials.expires_within(Duration::seconds(EXPIRY_SKEW_SECS)) {
            debug!("Access token still fresh, no refresh needed");
            return Ok(AccessToken::new(credentials.access_token));
        }

        let refreshed = self.refresh(&credentials).await?;

        // Persist the rotated credentials before handing the token out
        self.settings
            .update_credentials(refreshed.clone())
            .map_err(|e| SyncError::Auth {
                reason: format!("failed to persist refreshed credentials: {e}"),
            })?;

        self.expiry_tx.send_replace(Some(refreshed.access_expiry));
        info!(expiry = %refreshed.access_expiry, "Access token refreshed");

        Ok(AccessToken::new(refreshed.access_token))
    }
}
