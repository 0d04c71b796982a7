//! Sign-in bootstrap and sign-out.
//!
//! A [`Session`] restores sign-in data from cookies, keeps a copy in local
//! storage so other tabs notice sign-in changes, refreshes the login token a
//! day before it expires, fetches the user's roles and flags, and finally
//! resolves the page mode into a [`SessionAction`].

use crate::api::{StreetsApi, UserDetails};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::flags::{apply_overrides, generate_overrides, session_overrides, FlagOverride, Flags};
use crate::mode::{resolve, Mode, SessionAction, Settings, StreetIdMetadata};
use crate::storage::{
    SessionStorage, LOCAL_FLAGS_KEY, LOCAL_SIGN_IN_KEY, LOGIN_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
    USER_ID_COOKIE,
};
use crate::token::needs_refresh;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Messages surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    SignIn401,
    SignInServerFailure,
    /// Signed out automatically after the token stopped working.
    AuthExpired,
    CannotCreateNewStreetOnPhone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInData {
    pub token: String,
    pub refresh_token: Option<String>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<UserDetails>,
}

pub struct Session<S: SessionStorage> {
    config: ClientConfig,
    storage: S,
    api: StreetsApi,
    sign_in: Option<SignInData>,
    pub mode: Mode,
    /// Last-street settings; the embedder loads and persists them.
    pub settings: Settings,
    pub street: StreetIdMetadata,
    pub flags: Flags,
    pub promote_street: bool,
    notices: Vec<Notice>,
}

impl<S: SessionStorage> Session<S> {
    pub fn new(config: ClientConfig, storage: S, mode: Mode) -> Self {
        let api = StreetsApi::new(&config);
        Self {
            config,
            storage,
            api,
            sign_in: None,
            mode,
            settings: Settings::default(),
            street: StreetIdMetadata::default(),
            flags: Flags::new(),
            promote_street: false,
            notices: Vec::new(),
        }
    }

    pub fn api(&self) -> &StreetsApi {
        &self.api
    }

    pub fn sign_in_data(&self) -> Option<&SignInData> {
        self.sign_in.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.sign_in.is_some()
    }

    pub fn login_token(&self) -> Option<&str> {
        self.sign_in.as_ref().map(|s| s.token.as_str())
    }

    /// Notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub async fn load_sign_in(&mut self) -> SessionAction {
        let token = self.storage.cookie(LOGIN_TOKEN_COOKIE);
        let user_id = self.storage.cookie(USER_ID_COOKIE);

        match (token, user_id) {
            (Some(token), Some(user_id)) => {
                self.sign_in = Some(SignInData {
                    token,
                    refresh_token: self.storage.cookie(REFRESH_TOKEN_COOKIE),
                    user_id,
                    details: None,
                });
                self.save_sign_in_locally();
            }
            _ if self.storage.local(LOCAL_SIGN_IN_KEY).is_some() => {
                // Signed in elsewhere, but the cookies we need are gone.
                self.mode = Mode::ForceReloadSignIn;
                return SessionAction::ForceReload(self.mode);
            }
            _ => {}
        }

        let session_layer = session_overrides(self.storage.local(LOCAL_FLAGS_KEY).as_deref());

        let mut layers: Vec<Vec<FlagOverride>> = Vec::new();
        if let Some(sign_in) = self.sign_in.clone() {
            let due = needs_refresh(&sign_in.token, Utc::now()).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Login token unreadable, refreshing");
                true
            });
            if due {
                self.fetch_fresh_tokens(sign_in.refresh_token.as_deref()).await;
            }
            if let Some(sign_in) = self.sign_in.clone() {
                layers = self.fetch_sign_in_details(&sign_in).await;
            }
        } else {
            self.sign_in = None;
        }
        layers.push(session_layer);

        apply_overrides(&mut self.flags, layers.iter().map(Vec::as_slice));

        self.sign_in_loaded()
    }

    async fn fetch_fresh_tokens(&mut self, refresh_token: Option<&str>) {
        match self.api.refresh_login_token(refresh_token).await {
            Ok(token) => {
                if let Some(sign_in) = self.sign_in.as_mut() {
                    sign_in.token = token;
                }
                self.save_sign_in_locally();
                tracing::debug!("Login token refreshed");
            }
            Err(ClientError::Unauthorized) => {
                tracing::warn!(event = "ERROR_RM1R", "Refresh token rejected");
                self.sign_out(true).await;
                self.notices.push(Notice::SignIn401);
            }
            Err(ClientError::ServiceUnavailable) => {
                tracing::warn!(event = "ERROR_15AR", "Token refresh unavailable");
                self.notices.push(Notice::SignInServerFailure);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Token refresh failed");
                self.sign_in = None;
            }
        }
    }

    /// Role layers, one per role in order, then the user's own layer.
    async fn fetch_sign_in_details(&mut self, sign_in: &SignInData) -> Vec<Vec<FlagOverride>> {
        match self.api.fetch_user(&sign_in.user_id, Some(&sign_in.token)).await {
            Ok(details) => {
                let mut layers: Vec<Vec<FlagOverride>> = details
                    .roles
                    .iter()
                    .filter_map(|role| match self.config.role_flags.get(role) {
                        Some(flags) => Some(generate_overrides(flags, &format!("role:{}", role))),
                        None => {
                            tracing::warn!(%role, "Unknown user role");
                            None
                        }
                    })
                    .collect();
                layers.push(generate_overrides(&details.flags, "user"));

                if let Some(sign_in) = self.sign_in.as_mut() {
                    sign_in.details = Some(details);
                }
                self.save_sign_in_locally();
                layers
            }
            Err(ClientError::Unauthorized) => {
                tracing::warn!(event = "ERROR_RM1", "Login token rejected");
                self.sign_out(true).await;
                self.notices.push(Notice::AuthExpired);
                Vec::new()
            }
            Err(ClientError::ServiceUnavailable) => {
                tracing::warn!(event = "ERROR_15A", "Sign-in details unavailable");
                self.notices.push(Notice::SignInServerFailure);
                Vec::new()
            }
            Err(e) => {
                tracing::debug!(error = %e, "Fetching sign-in details failed");
                self.sign_in = None;
                Vec::new()
            }
        }
    }

    fn sign_in_loaded(&mut self) -> SessionAction {
        let resolution = resolve(self.mode, &self.settings, &self.street, self.config.read_only);

        self.mode = resolution.mode;
        self.street = resolution.street;
        if resolution.promote_street {
            self.promote_street = true;
        }
        if let SessionAction::Notice(notice) = resolution.action {
            self.notices.push(notice);
        }
        resolution.action
    }

    /// Forget the local session and revoke the token on the server. A
    /// non-quiet sign-out moves the page to [`Mode::SignOut`] whatever the
    /// server answers.
    pub async fn sign_out(&mut self, quiet: bool) {
        self.settings.clear_last_street();

        for cookie in [LOGIN_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, USER_ID_COOKIE] {
            self.storage.remove_cookie(cookie);
        }
        self.storage.remove_local(LOCAL_SIGN_IN_KEY);

        if let Some(sign_in) = self.sign_in.take() {
            if let Err(e) = self
                .api
                .delete_login_token(&sign_in.user_id, Some(&sign_in.token))
                .await
            {
                tracing::debug!(error = %e, user_id = %sign_in.user_id, "Sign-out not confirmed");
            }
        }

        if !quiet {
            self.mode = Mode::SignOut;
        }
    }

    /// React to local storage being changed by another tab.
    pub fn on_storage_change(&mut self) -> Option<Mode> {
        let stored = self.storage.local(LOCAL_SIGN_IN_KEY).is_some();
        let mode = match (self.is_signed_in(), stored) {
            (true, false) => Mode::ForceReloadSignOut,
            (false, true) => Mode::ForceReloadSignIn,
            _ => return None,
        };
        self.mode = mode;
        Some(mode)
    }

    fn save_sign_in_locally(&self) {
        let Some(sign_in) = &self.sign_in else {
            self.storage.remove_local(LOCAL_SIGN_IN_KEY);
            return;
        };
        match serde_json::to_string(sign_in) {
            Ok(json) => self.storage.set_local(LOCAL_SIGN_IN_KEY, &json),
            Err(e) => tracing::error!(error = %e, "Failed to serialize sign-in data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn session(storage: &MemoryStorage) -> Session<MemoryStorage> {
        // Nothing listens here; these tests never reach the network.
        Session::new(
            ClientConfig::new("http://127.0.0.1:9"),
            storage.clone(),
            Mode::NewStreet,
        )
    }

    #[tokio::test]
    async fn stale_local_sign_in_forces_reload() {
        let storage = MemoryStorage::new();
        storage.set_local(LOCAL_SIGN_IN_KEY, r#"{"token":"t","userId":"alice"}"#);

        let mut session = session(&storage);
        let action = session.load_sign_in().await;

        assert_eq!(action, SessionAction::ForceReload(Mode::ForceReloadSignIn));
        assert_eq!(session.mode, Mode::ForceReloadSignIn);
    }

    #[tokio::test]
    async fn anonymous_load_applies_session_flags_and_creates_street() {
        let storage = MemoryStorage::new();
        storage.set_local(LOCAL_FLAGS_KEY, r#"{"GALLERY":true}"#);

        let mut session = session(&storage);
        let action = session.load_sign_in().await;

        assert_eq!(action, SessionAction::CreateStreet);
        assert!(!session.is_signed_in());
        assert_eq!(session.flags["GALLERY"].source, "session");
    }

    #[test]
    fn storage_changes_in_other_tabs_force_reload() {
        let storage = MemoryStorage::new();
        let mut session = session(&storage);
        assert_eq!(session.on_storage_change(), None);

        storage.set_local(LOCAL_SIGN_IN_KEY, "{}");
        assert_eq!(session.on_storage_change(), Some(Mode::ForceReloadSignIn));

        session.sign_in = Some(SignInData {
            token: "t".into(),
            refresh_token: None,
            user_id: "alice".into(),
            details: None,
        });
        assert_eq!(session.on_storage_change(), None);

        storage.remove_local(LOCAL_SIGN_IN_KEY);
        assert_eq!(session.on_storage_change(), Some(Mode::ForceReloadSignOut));
    }
}
