use thiserror::Error;

/// Failure of one remote identity provider step.
///
/// Every variant carries the provider's own message so the host can decide
/// whether a retry makes sense.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Provider client could not be constructed.
    #[error("client initialization failed: {0}")]
    ClientInit(String),

    /// Token endpoint request failed at transport or HTTP level.
    #[error("token request failed: {0}")]
    RequestFailed(String),

    /// Token endpoint answered with an empty body.
    #[error("token response was empty")]
    EmptyBody,

    /// Token endpoint body was not a valid token document.
    #[error("token response decoding failed: {0}")]
    DecodeFailed(String),

    /// Identity creation failed.
    #[error("create identity failed: {0}")]
    CreateFailed(String),

    /// Adding the identity to its group failed.
    #[error("add to group failed: {0}")]
    GroupAssignFailed(String),

    /// Starting the admin authentication flow failed.
    #[error("auth init failed: {0}")]
    AuthInitFailed(String),

    /// Answering the forced credential reset challenge failed.
    #[error("auth challenge failed: {0}")]
    ChallengeFailed(String),

    /// Identity deletion failed.
    #[error("delete identity failed: {0}")]
    DeleteFailed(String),
}

impl ProviderError {
    /// Returns a stable name for the failed step.
    #[must_use]
    pub fn step(&self) -> &'static str {
        match self {
            Self::ClientInit(_) => "client_init",
            Self::RequestFailed(_) => "token_request",
            Self::EmptyBody => "token_response",
            Self::DecodeFailed(_) => "token_decode",
            Self::CreateFailed(_) => "create_identity",
            Self::GroupAssignFailed(_) => "add_to_group",
            Self::AuthInitFailed(_) => "init_auth",
            Self::ChallengeFailed(_) => "respond_to_challenge",
            Self::DeleteFailed(_) => "delete_identity",
        }
    }
}
