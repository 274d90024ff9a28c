//! Four-step ephemeral identity provisioning.
//!
//! create user -> add to group -> admin login -> answer the forced
//! new-password challenge. When a step after creation fails, the created
//! user is deleted before the original failure is returned.

mod credential_material;


use broker_core::ProviderError;
use broker_domain::EphemeralUser;
use tracing::{info, warn};

use crate::{EphemeralIdentityRequest, IdentityPoolAdmin};

use credential_material::{generate_password, generate_username};

/// Runs the provisioning sequence against one region's pool admin.
pub async fn provision_ephemeral_identity(
    admin: &dyn IdentityPoolAdmin,
    request: &EphemeralIdentityRequest,
) -> Result<EphemeralUser, ProviderError> {
    let username = generate_username(request.dummy_email_domain.as_str());
    let password = generate_password();
    let user_pool_id = request.user_pool_id.as_str();

    admin
        .create_user(user_pool_id, username.as_str(), password.as_str())
        .await?;

    match complete_login(admin, request, username.as_str(), password.as_str()).await {
        Ok(tokens) => {
            info!(
                user_pool_id = %user_pool_id,
                username = %username,
                "provisioned ephemeral identity"
            );

            Ok(EphemeralUser {
                username,
                password,
                access_token: tokens.access_token,
                id_token: tokens.id_token,
                refresh_token: tokens.refresh_token,
                expires_in: tokens.expires_in,
                token_type: tokens.token_type,
            })
        }
        Err(error) => {
            warn!(
                user_pool_id = %user_pool_id,
                username = %username,
                step = error.step(),
                error = %error,
                "ephemeral identity provisioning failed, deleting partially provisioned identity"
            );

            if let Err(cleanup_error) = admin.delete_user(user_pool_id, username.as_str()).await {
                warn!(
                    user_pool_id = %user_pool_id,
                    username = %username,
                    error = %cleanup_error,
                    "failed to delete partially provisioned identity"
                );
            }

            Err(error)
        }
    }
}

async fn complete_login(
    admin: &dyn IdentityPoolAdmin,
    request: &EphemeralIdentityRequest,
    username: &str,
    password: &str,
) -> Result<crate::AuthenticationTokens, ProviderError> {
    let user_pool_id = request.user_pool_id.as_str();
    let client_id = request.application_client_id.as_str();

    admin
        .add_user_to_group(user_pool_id, username, request.group_name.as_str())
        .await?;

    let session = admin
        .initiate_auth(user_pool_id, client_id, username, password)
        .await?;

    admin
        .respond_to_new_password_challenge(
            user_pool_id,
            client_id,
            username,
            password,
            session.as_str(),
        )
        .await
}
