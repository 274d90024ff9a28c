use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use broker_application::DelegatedGrantRequest;
use broker_core::ProviderError;
use broker_domain::TokenGrant;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

const TOKEN_PATH: &str = "/oauth2/token";
const GRANT_BODY: &str = "grant_type=client_credentials";

/// Posts one client-credentials grant request. No retries.
pub(super) async fn exchange(
    http_client: &reqwest::Client,
    request: &DelegatedGrantRequest,
) -> Result<TokenGrant, ProviderError> {
    let response = http_client
        .post(token_endpoint(request.pool_domain_or_url.as_str()))
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(AUTHORIZATION, authorization_header(request))
        .body(GRANT_BODY)
        .send()
        .await
        .map_err(|error| ProviderError::RequestFailed(error.to_string()))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|error| ProviderError::RequestFailed(error.to_string()))?;

    if !status.is_success() {
        return Err(ProviderError::RequestFailed(format!(
            "token endpoint returned status {status}: {}",
            String::from_utf8_lossy(&body)
        )));
    }

    decode_token_response(&body)
}

fn token_endpoint(pool_domain_or_url: &str) -> String {
    let trimmed = pool_domain_or_url.trim();
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        return trimmed.to_owned();
    }

    let host_or_path = trimmed.trim_end_matches('/');
    if host_or_path.contains('/') {
        return format!("https://{host_or_path}");
    }

    format!("https://{host_or_path}{TOKEN_PATH}")
}

fn authorization_header(request: &DelegatedGrantRequest) -> String {
    match request.application_client_id.as_deref() {
        Some(client_id) => {
            let credentials = format!("{client_id}:{}", request.application_client_secret);
            format!("Basic {}", STANDARD.encode(credentials))
        }
        None => request.application_client_secret.clone(),
    }
}

fn decode_token_response(body: &[u8]) -> Result<TokenGrant, ProviderError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ProviderError::EmptyBody);
    }

    serde_json::from_slice(body).map_err(|error| ProviderError::DecodeFailed(error.to_string()))
}
