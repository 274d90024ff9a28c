use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::require_api_token;
use crate::state::AppState;

pub fn build_router(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/v1/config",
            get(handlers::config::read_config_handler)
                .put(handlers::config::write_config_handler)
                .post(handlers::config::write_config_handler)
                .delete(handlers::config::delete_config_handler),
        )
        .route("/v1/roles", get(handlers::roles::list_roles_handler))
        .route(
            "/v1/roles/{name}",
            get(handlers::roles::read_role_handler)
                .post(handlers::roles::create_role_handler)
                .put(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/v1/creds/{role}",
            get(handlers::creds::issue_credential_handler),
        )
        .route(
            "/v1/leases/{lease_id}/renew",
            post(handlers::leases::renew_lease_handler),
        )
        .route(
            "/v1/leases/{lease_id}/revoke",
            post(handlers::leases::revoke_lease_handler),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_api_token));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use broker_application::{
        ClientCache, ConfigStore, CredentialBroker, DelegatedGrantRequest,
        EphemeralIdentityRequest, IdentityProviderClient, IdentityProviderClientFactory,
        RoleStore,
    };
    use broker_core::ProviderError;
    use broker_domain::{EphemeralUser, ProviderAccessConfig, TokenGrant};
    use broker_infrastructure::InMemorySecretStorage;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::build_router;
    use crate::lease_ledger::{LeaseLedger, LeasePolicy};
    use crate::state::AppState;

    const TOKEN: &str = "0123456789abcdef";

    struct StaticClient;

    #[async_trait]
    impl IdentityProviderClient for StaticClient {
        async fn exchange_grant(
            &self,
            _request: &DelegatedGrantRequest,
        ) -> Result<TokenGrant, ProviderError> {
            Ok(TokenGrant {
                access_token: "AAAA".to_owned(),
                expires_in: 3600,
                token_type: "Bearer".to_owned(),
            })
        }

        async fn create_ephemeral_identity(
            &self,
            request: &EphemeralIdentityRequest,
        ) -> Result<EphemeralUser, ProviderError> {
            Ok(EphemeralUser {
                username: format!("vaultabc@{}", request.dummy_email_domain),
                password: "1!password".to_owned(),
                access_token: "access".to_owned(),
                id_token: "id".to_owned(),
                refresh_token: "refresh".to_owned(),
                expires_in: 3600,
                token_type: "Bearer".to_owned(),
            })
        }

        async fn delete_identity(
            &self,
            _region: &str,
            _user_pool_id: &str,
            _username: &str,
        ) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    struct StaticFactory;

    #[async_trait]
    impl IdentityProviderClientFactory for StaticFactory {
        async fn build_client(
            &self,
            _access: Option<&ProviderAccessConfig>,
        ) -> Result<Arc<dyn IdentityProviderClient>, ProviderError> {
            Ok(Arc::new(StaticClient))
        }
    }

    fn app() -> Router {
        let storage = Arc::new(InMemorySecretStorage::new());
        let clients = Arc::new(ClientCache::new(Arc::new(StaticFactory)));
        let role_store = RoleStore::new(storage.clone());
        let config_store = ConfigStore::new(storage.clone(), clients.clone());
        let credential_broker =
            CredentialBroker::new(role_store.clone(), config_store.clone(), clients);
        let lease_ledger = LeaseLedger::new(
            storage,
            credential_broker.clone(),
            LeasePolicy {
                default_ttl: Duration::from_secs(3600),
                max_ttl: Duration::from_secs(86_400),
            },
        );

        build_router(AppState {
            role_store,
            config_store,
            credential_broker,
            lease_ledger,
            api_token: Arc::from(TOKEN),
        })
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .header(header::CONTENT_TYPE, "application/json");
        let body = body.map_or_else(Body::empty, |value| Body::from(value.to_string()));

        builder.body(body).unwrap_or_else(|_| unreachable!())
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|_| unreachable!());
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn health_is_public_and_routes_need_a_token() {
        let app = app();

        let health = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap_or_else(|_| unreachable!());
        let roles = Request::builder()
            .uri("/v1/roles")
            .body(Body::empty())
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(send(&app, health).await.0, StatusCode::OK);
        assert_eq!(send(&app, roles).await.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn delegated_role_issues_unleased_token() {
        let app = app();

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/v1/roles/Role1",
                Some(json!({"pool_domain_or_url": "u", "application_client_secret": "s"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, request("GET", "/v1/creds/role1", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "lease_duration": 0,
                "renewable": false,
                "data": {"access_token": "AAAA", "expires_in": 3600, "token_type": "Bearer"},
            })
        );
    }

    #[tokio::test]
    async fn ephemeral_lease_can_be_renewed_and_revoked() {
        let app = app();
        let (status, _) = send(
            &app,
            request(
                "POST",
                "/v1/roles/role2",
                Some(json!({
                    "credential_strategy": "ephemeral_identity",
                    "region": "eu-west-1",
                    "user_pool_id": "pool",
                    "dummy_email_domain": "example.test",
                    "ttl": 20,
                    "max_ttl": 30,
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, request("GET", "/v1/creds/role2", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lease_duration"], json!(20));
        assert_eq!(body["data"]["username"], json!("vaultabc@example.test"));
        let lease_id = body["lease_id"].as_str().unwrap_or_default().to_owned();

        let (status, _) = send(
            &app,
            request("POST", &format!("/v1/leases/{lease_id}/renew"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let revoke_uri = format!("/v1/leases/{lease_id}/revoke");
        let (status, _) = send(&app, request("POST", &revoke_uri, None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, request("POST", &revoke_uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn role_errors_map_to_client_statuses() {
        let app = app();

        let (missing, _) = send(&app, request("GET", "/v1/roles/ghost", None)).await;
        let (bad_ttl, _) = send(
            &app,
            request(
                "POST",
                "/v1/roles/role3",
                Some(json!({"ttl": 40, "max_ttl": 30})),
            ),
        )
        .await;
        let (deleted, _) = send(&app, request("DELETE", "/v1/roles/ghost", None)).await;

        assert_eq!(missing, StatusCode::NOT_FOUND);
        assert_eq!(bad_ttl, StatusCode::BAD_REQUEST);
        assert_eq!(deleted, StatusCode::NO_CONTENT);
    }
}
