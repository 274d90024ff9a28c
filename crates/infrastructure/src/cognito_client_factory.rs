use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::config::Credentials;
use broker_application::{IdentityProviderClient, IdentityProviderClientFactory};
use broker_core::ProviderError;
use broker_domain::ProviderAccessConfig;
use tracing::info;

use crate::CognitoIdentityProviderClient;

const CREDENTIALS_PROVIDER_NAME: &str = "credential-broker-config";

/// Builds Cognito clients from the stored remote-access configuration.
///
/// Without static keys the SDK's default credential chain is used.
pub struct CognitoClientFactory {
    http_client: reqwest::Client,
}

impl CognitoClientFactory {
    /// Creates a factory sharing one HTTP client across built clients.
    #[must_use]
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl IdentityProviderClientFactory for CognitoClientFactory {
    async fn build_client(
        &self,
        access: Option<&ProviderAccessConfig>,
    ) -> Result<Arc<dyn IdentityProviderClient>, ProviderError> {
        let mut loader = aws_config::from_env();

        let static_access = access.filter(|config| config.has_static_credentials());
        if let Some(config) = static_access {
            loader = loader.credentials_provider(Credentials::new(
                config.aws_access_key_id.as_str(),
                config.aws_secret_access_key.as_str(),
                config.session_token().map(str::to_owned),
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }

        let sdk_config = loader.load().await;

        info!(
            static_credentials = static_access.is_some(),
            "loaded identity provider sdk configuration"
        );

        Ok(Arc::new(CognitoIdentityProviderClient::new(
            self.http_client.clone(),
            sdk_config,
        )))
    }
}
