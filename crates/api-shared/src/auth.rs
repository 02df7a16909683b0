//! Single shared-credential verification.
//!
//! The depot is gated by one HTTP Basic credential pair, resolved from the
//! environment at startup. There are no per-user accounts or ACLs.

/// Fixed body sent on a failed challenge.
pub const UNAUTHORIZED_BODY: &str = "Unauthorized Access";

/// `WWW-Authenticate` value for the Basic challenge.
pub const CHALLENGE: &str = "Basic realm=\"depot\"";

/// The single credential pair the whole depot is gated behind.
#[derive(Clone)]
pub struct BasicCredentials {
    username: String,
    password: String,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Validates a provided username/password pair against the configured
    /// credentials.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for BasicCredentials {
    /// Never prints the password.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
