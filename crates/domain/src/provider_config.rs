use serde::{Deserialize, Serialize};

/// Credentials the broker uses to reach the provider's admin APIs.
///
/// The zero value is useful: without static keys the ambient credential
/// chain of the process is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAccessConfig {
    /// Access key id.
    #[serde(default)]
    pub aws_access_key_id: String,
    /// Secret access key.
    #[serde(default)]
    pub aws_secret_access_key: String,
    /// Optional session token for temporary keys.
    #[serde(default)]
    pub aws_session_token: String,
}

impl ProviderAccessConfig {
    /// Returns true when both halves of a static key pair are present.
    #[must_use]
    pub fn has_static_credentials(&self) -> bool {
        !self.aws_access_key_id.is_empty() && !self.aws_secret_access_key.is_empty()
    }

    /// Returns the session token, if any.
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        (!self.aws_session_token.is_empty()).then_some(self.aws_session_token.as_str())
    }
}
