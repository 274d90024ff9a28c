use async_trait::async_trait;
use broker_core::ProviderError;

/// Tokens returned once the forced credential reset challenge is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationTokens {
    /// Access token.
    pub access_token: String,
    /// Identity token.
    pub id_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// Token type.
    pub token_type: String,
}

/// Admin operations on one region's user pools.
///
/// Each method is one remote call and reports failures with the variant of
/// its own step.
#[async_trait]
pub trait IdentityPoolAdmin: Send + Sync {
    /// Creates a user with a temporary password and a verified email.
    async fn create_user(
        &self,
        user_pool_id: &str,
        username: &str,
        temporary_password: &str,
    ) -> Result<(), ProviderError>;

    /// Adds a user to a group.
    async fn add_user_to_group(
        &self,
        user_pool_id: &str,
        username: &str,
        group_name: &str,
    ) -> Result<(), ProviderError>;

    /// Starts an admin password login and returns the challenge session.
    async fn initiate_auth(
        &self,
        user_pool_id: &str,
        client_id: &str,
        username: &str,
        password: &str,
    ) -> Result<String, ProviderError>;

    /// Answers the new-password challenge and returns the issued tokens.
    async fn respond_to_new_password_challenge(
        &self,
        user_pool_id: &str,
        client_id: &str,
        username: &str,
        new_password: &str,
        session: &str,
    ) -> Result<AuthenticationTokens, ProviderError>;

    /// Deletes a user.
    async fn delete_user(&self, user_pool_id: &str, username: &str) -> Result<(), ProviderError>;
}
