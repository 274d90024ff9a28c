use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cognitoidentityprovider::Client;
use aws_sdk_cognitoidentityprovider::config::{Builder, Region};
use aws_sdk_cognitoidentityprovider::error::DisplayErrorContext;
use aws_sdk_cognitoidentityprovider::types::{
    AttributeType, AuthFlowType, AuthenticationResultType, ChallengeNameType, MessageActionType,
};
use broker_application::{AuthenticationTokens, IdentityPoolAdmin};
use broker_core::ProviderError;

/// User pool admin calls for one region.
pub(crate) struct CognitoPoolAdmin {
    client: Client,
}

impl CognitoPoolAdmin {
    /// Creates an admin client pinned to `region`.
    #[must_use]
    pub(crate) fn new(sdk_config: &SdkConfig, region: &str) -> Self {
        let config = Builder::from(sdk_config)
            .region(Region::new(region.to_owned()))
            .build();

        Self {
            client: Client::from_conf(config),
        }
    }
}

fn attribute(name: &str, value: &str) -> Result<AttributeType, ProviderError> {
    AttributeType::builder()
        .name(name)
        .value(value)
        .build()
        .map_err(|error| ProviderError::CreateFailed(error.to_string()))
}

fn authentication_tokens(
    result: &AuthenticationResultType,
) -> Result<AuthenticationTokens, ProviderError> {
    let Some(access_token) = result.access_token().filter(|token| !token.is_empty()) else {
        return Err(ProviderError::ChallengeFailed(
            "challenge response carried no access token".to_owned(),
        ));
    };

    Ok(AuthenticationTokens {
        access_token: access_token.to_owned(),
        id_token: result.id_token().unwrap_or_default().to_owned(),
        refresh_token: result.refresh_token().unwrap_or_default().to_owned(),
        expires_in: i64::from(result.expires_in()),
        token_type: result.token_type().unwrap_or_default().to_owned(),
    })
}

#[async_trait]
impl IdentityPoolAdmin for CognitoPoolAdmin {
    async fn create_user(
        &self,
        user_pool_id: &str,
        username: &str,
        temporary_password: &str,
    ) -> Result<(), ProviderError> {
        self.client
            .admin_create_user()
            .user_pool_id(user_pool_id)
            .username(username)
            .temporary_password(temporary_password)
            .message_action(MessageActionType::Suppress)
            .user_attributes(attribute("email", username)?)
            .user_attributes(attribute("email_verified", "true")?)
            .send()
            .await
            .map_err(|error| ProviderError::CreateFailed(DisplayErrorContext(&error).to_string()))?;

        Ok(())
    }

    async fn add_user_to_group(
        &self,
        user_pool_id: &str,
        username: &str,
        group_name: &str,
    ) -> Result<(), ProviderError> {
        self.client
            .admin_add_user_to_group()
            .user_pool_id(user_pool_id)
            .username(username)
            .group_name(group_name)
            .send()
            .await
            .map_err(|error| {
                ProviderError::GroupAssignFailed(DisplayErrorContext(&error).to_string())
            })?;

        Ok(())
    }

    async fn initiate_auth(
        &self,
        user_pool_id: &str,
        client_id: &str,
        username: &str,
        password: &str,
    ) -> Result<String, ProviderError> {
        let output = self
            .client
            .admin_initiate_auth()
            .user_pool_id(user_pool_id)
            .client_id(client_id)
            .auth_flow(AuthFlowType::AdminNoSrpAuth)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", password)
            .send()
            .await
            .map_err(|error| {
                ProviderError::AuthInitFailed(DisplayErrorContext(&error).to_string())
            })?;

        output.session().map(str::to_owned).ok_or_else(|| {
            ProviderError::AuthInitFailed("auth response carried no challenge session".to_owned())
        })
    }

    async fn respond_to_new_password_challenge(
        &self,
        user_pool_id: &str,
        client_id: &str,
        username: &str,
        new_password: &str,
        session: &str,
    ) -> Result<AuthenticationTokens, ProviderError> {
        let output = self
            .client
            .admin_respond_to_auth_challenge()
            .user_pool_id(user_pool_id)
            .client_id(client_id)
            .challenge_name(ChallengeNameType::NewPasswordRequired)
            .challenge_responses("USERNAME", username)
            .challenge_responses("NEW_PASSWORD", new_password)
            .session(session)
            .send()
            .await
            .map_err(|error| {
                ProviderError::ChallengeFailed(DisplayErrorContext(&error).to_string())
            })?;

        let Some(result) = output.authentication_result() else {
            return Err(ProviderError::ChallengeFailed(
                "challenge response carried no authentication result".to_owned(),
            ));
        };

        authentication_tokens(result)
    }

    async fn delete_user(&self, user_pool_id: &str, username: &str) -> Result<(), ProviderError> {
        self.client
            .admin_delete_user()
            .user_pool_id(user_pool_id)
            .username(username)
            .send()
            .await
            .map_err(|error| ProviderError::DeleteFailed(DisplayErrorContext(&error).to_string()))?;

        Ok(())
    }
}
