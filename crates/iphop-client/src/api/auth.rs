//! Auth API.

use crate::client::DashboardClient;
use crate::error::Result;
use crate::interceptor::PROBE_PATH;
use crate::types::{MessageResponse, SetupRequest, Token, User};

/// Special characters accepted by the setup password rule.
pub const SETUP_PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Check a prospective admin password against the server's complexity rule:
/// at least 8 characters, one uppercase letter, one special character from
/// [`SETUP_PASSWORD_SPECIALS`] and two digits.
pub fn validate_setup_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| SETUP_PASSWORD_SPECIALS.contains(c))
        && password.chars().filter(|c| c.is_ascii_digit()).count() >= 2
}

/// Auth API client.
pub struct AuthApi {
    client: DashboardClient,
}

impl AuthApi {
    pub(crate) fn new(client: DashboardClient) -> Self {
        Self { client }
    }

    /// Check whether the current session is valid.
    ///
    /// Only success matters; the body is not decoded. A 401 here is never
    /// treated as an expired session.
    pub async fn probe(&self) -> Result<()> {
        self.client.get_status(PROBE_PATH).await
    }

    /// Get the user behind the current session.
    pub async fn me(&self) -> Result<User> {
        self.client.get(PROBE_PATH).await
    }

    /// Exchange credentials for a session.
    ///
    /// The server answers with a session cookie that the client keeps and
    /// sends on every later call.
    pub async fn login(&self, username: &str, password: &str) -> Result<Token> {
        self.client
            .post_form("auth/token", &[("username", username), ("password", password)])
            .await
    }

    /// Invalidate the session server-side and clear the cookie.
    pub async fn logout(&self) -> Result<MessageResponse> {
        self.client.post_empty("auth/logout").await
    }

    /// Create the first admin user. Fails once any user exists.
    pub async fn setup(&self, request: &SetupRequest) -> Result<User> {
        self.client.post("auth/setup", request).await
    }
}
