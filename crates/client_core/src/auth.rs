use std::sync::Arc;

use shared::protocol::LoginResult;
use tracing::{error, info, warn};

use crate::{
    api::StoryApi,
    observable::Subscription,
    session::SessionStore,
    state::{RequestState, RequestTracker},
};

/// Drives register/login and writes the session on a successful login.
pub struct AuthController {
    api: Arc<dyn StoryApi>,
    session: Arc<SessionStore>,
    state: RequestTracker,
}

impl AuthController {
    pub fn new(api: Arc<dyn StoryApi>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            state: RequestTracker::default(),
        }
    }

    pub fn state(&self) -> RequestState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> Subscription<RequestState> {
        self.state.subscribe()
    }

    pub async fn is_authenticated(&self) -> bool {
        match self.session.auth_token().await {
            Ok(token) => token.is_some(),
            Err(err) => {
                error!(error = %err, "auth: failed to read session token");
                false
            }
        }
    }

    pub async fn register_new_user(&self, name: &str, email: &str, password: &str) {
        self.state.begin();
        match self.api.register(name, email, password).await {
            Ok(response) => {
                info!(email, "auth: registered");
                self.state.succeed(response.message);
            }
            Err(err) => {
                warn!(email, error = %err, "auth: register failed");
                self.state.fail(err.user_message());
            }
        }
    }

    /// A success without `loginResult` still reports success and leaves the
    /// stored session as it was.
    pub async fn login_user(&self, email: &str, password: &str) {
        self.state.begin();
        let response = match self.api.login(email, password).await {
            Ok(response) => response,
            Err(err) => {
                warn!(email, error = %err, "auth: login failed");
                self.state.fail(err.user_message());
                return;
            }
        };

        let Some(result) = response.login_result else {
            warn!(email, "auth: login succeeded without a login result");
            self.state.succeed(response.message);
            return;
        };

        match self.persist_login(&result, email).await {
            Ok(()) => {
                info!(user_id = %result.user_id, "auth: logged in");
                self.state.succeed(response.message);
            }
            Err(err) => {
                error!(error = %err, "auth: failed to persist session");
                self.state.fail(format!("failed to save session: {err}"));
            }
        }
    }

    async fn persist_login(&self, result: &LoginResult, email: &str) -> anyhow::Result<()> {
        self.session.save_login(result).await?;
        self.session.set_user_email(email).await
    }

    pub async fn logout(&self) {
        match self.session.clear().await {
            Ok(()) => self.state.notify("Logged out"),
            Err(err) => {
                error!(error = %err, "auth: failed to clear session");
                self.state.fail(format!("failed to clear session: {err}"));
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
