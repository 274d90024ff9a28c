use axum::Json;
use axum::extract::{Path, State};
use broker_domain::RoleName;
use chrono::Utc;
use tracing::warn;

use crate::dto::CredentialResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn issue_credential_handler(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> ApiResult<Json<CredentialResponse>> {
    let name = RoleName::new(role)?;
    let issued = state.credential_broker.issue(&name).await?;

    let response = match issued.lease {
        Some(terms) => {
            let record = match state.lease_ledger.open(&terms, Utc::now()).await {
                Ok(record) => record,
                Err(error) => {
                    // An untracked identity would never be revoked.
                    if let Err(revoke_error) =
                        state.credential_broker.revoke(&terms.metadata).await
                    {
                        warn!(
                            role = %name,
                            error = %revoke_error,
                            "failed to revoke credential after lease tracking failed"
                        );
                    }
                    return Err(error.into());
                }
            };

            CredentialResponse {
                lease_id: Some(record.lease_id),
                lease_duration: record.ttl_seconds,
                renewable: true,
                data: issued.data,
            }
        }
        None => CredentialResponse {
            lease_id: None,
            lease_duration: 0,
            renewable: false,
            data: issued.data,
        },
    };

    Ok(Json(response))
}
