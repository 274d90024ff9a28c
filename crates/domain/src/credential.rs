use serde::{Deserialize, Serialize};

/// Bearer token returned by a delegated grant exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    /// Bearer token.
    pub access_token: String,
    /// Provider-side lifetime in seconds.
    pub expires_in: i64,
    /// Token type, usually `Bearer`.
    pub token_type: String,
}

/// Login credential and session tokens for a freshly provisioned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralUser {
    /// Synthesized username.
    pub username: String,
    /// Generated password.
    pub password: String,
    /// Access token from the completed login.
    pub access_token: String,
    /// Identity token from the completed login.
    pub id_token: String,
    /// Refresh token from the completed login.
    pub refresh_token: String,
    /// Provider-side token lifetime in seconds.
    pub expires_in: i64,
    /// Token type, usually `Bearer`.
    pub token_type: String,
}

/// Credential issued for a role, shaped by its credential strategy.
///
/// Serializes to the bare field set of the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CredentialResult {
    /// Result of a delegated grant exchange.
    DelegatedToken(TokenGrant),
    /// Result of provisioning an ephemeral identity.
    EphemeralUser(EphemeralUser),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{CredentialResult, TokenGrant};

    #[test]
    fn delegated_token_serializes_without_tag() {
        let result = CredentialResult::DelegatedToken(TokenGrant {
            access_token: "abc".to_owned(),
            expires_in: 3600,
            token_type: "Bearer".to_owned(),
        });

        assert_eq!(
            serde_json::to_value(&result).unwrap_or_default(),
            json!({"access_token": "abc", "expires_in": 3600, "token_type": "Bearer"})
        );
    }
}
