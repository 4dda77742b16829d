//! Session authentication settings.

use serde::{Deserialize, Serialize};

/// Two weeks.
const fn default_session_ttl_hours() -> u32 {
    24 * 14
}

fn default_cookie_name() -> String {
    "forum_session".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// How long a login session stays valid.
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,

    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            cookie_name: default_cookie_name(),
        }
    }
}

impl AuthConfig {
    /// Session lifetime in seconds, for the cookie `Max-Age`.
    #[must_use]
    pub fn session_ttl_secs(&self) -> u64 {
        u64::from(self.session_ttl_hours) * 3600
    }
}
