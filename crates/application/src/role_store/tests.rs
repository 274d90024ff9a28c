use std::sync::Arc;
use std::time::Duration;

use broker_core::AppError;
use broker_domain::{CredentialStrategy, RoleName, RoleUpdate};
use serde_json::{Value, json};

use super::{RoleStore, WriteMode};
use crate::test_support::FakeStorage;

fn role_name(value: &str) -> RoleName {
    RoleName::new(value).unwrap_or_else(|_| unreachable!())
}

fn store() -> (Arc<FakeStorage>, RoleStore) {
    let storage = Arc::new(FakeStorage::default());
    (storage.clone(), RoleStore::new(storage))
}

fn ephemeral_update() -> RoleUpdate {
    RoleUpdate {
        credential_strategy: Some(CredentialStrategy::EphemeralIdentity),
        region: Some("eu-west-1".to_owned()),
        application_client_id: Some("client-1".to_owned()),
        user_pool_id: Some("eu-west-1_pool".to_owned()),
        group_name: Some("adviser".to_owned()),
        dummy_email_domain: Some("example.test".to_owned()),
        ..RoleUpdate::default()
    }
}

#[tokio::test]
async fn write_then_read_returns_merged_fields_with_zero_defaults() {
    let (_, store) = store();
    let name = role_name("role2");

    let written = store
        .write(&name, WriteMode::Create, ephemeral_update())
        .await;
    assert!(written.is_ok());

    let read = store.read(&name).await.unwrap_or_default();
    let Some(role) = read else {
        panic!("role should exist after create");
    };
    assert_eq!(role.credential_strategy(), CredentialStrategy::EphemeralIdentity);
    assert_eq!(role.region(), "eu-west-1");
    assert_eq!(role.application_client_id(), Some("client-1"));
    assert_eq!(role.group_name(), "adviser");
    assert_eq!(role.pool_domain_or_url(), "");
    assert_eq!(role.application_client_secret(), "");
    assert_eq!(role.ttl(), Duration::ZERO);
    assert_eq!(role.max_ttl(), Duration::ZERO);
}

#[tokio::test]
async fn create_defaults_to_delegated_grant() {
    let (_, store) = store();
    let name = role_name("role1");

    let written = store
        .write(
            &name,
            WriteMode::Create,
            RoleUpdate {
                pool_domain_or_url: Some("u".to_owned()),
                application_client_secret: Some("s".to_owned()),
                ..RoleUpdate::default()
            },
        )
        .await;

    assert!(matches!(
        written.map(|role| role.credential_strategy()),
        Ok(CredentialStrategy::DelegatedGrant)
    ));
}

#[tokio::test]
async fn update_keeps_unsupplied_fields() {
    let (_, store) = store();
    let name = role_name("role2");
    assert!(
        store
            .write(&name, WriteMode::Create, ephemeral_update())
            .await
            .is_ok()
    );

    let updated = store
        .write(
            &name,
            WriteMode::Update,
            RoleUpdate {
                ttl: Some(Duration::from_secs(20)),
                max_ttl: Some(Duration::from_secs(30)),
                ..RoleUpdate::default()
            },
        )
        .await;
    assert!(updated.is_ok());

    let role = store
        .read(&name)
        .await
        .unwrap_or_default()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(role.region(), "eu-west-1");
    assert_eq!(role.ttl(), Duration::from_secs(20));
    assert_eq!(role.max_ttl(), Duration::from_secs(30));
}

#[tokio::test]
async fn ttl_above_max_is_rejected_and_stored_role_is_unchanged() {
    let (storage, store) = store();
    let name = role_name("role2");
    let mut update = ephemeral_update();
    update.ttl = Some(Duration::from_secs(10));
    update.max_ttl = Some(Duration::from_secs(30));
    assert!(store.write(&name, WriteMode::Create, update).await.is_ok());
    let before = storage.raw("roles/role2");

    let result = store
        .write(
            &name,
            WriteMode::Update,
            RoleUpdate {
                ttl: Some(Duration::from_secs(31)),
                ..RoleUpdate::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(storage.raw("roles/role2"), before);
}

#[tokio::test]
async fn invalid_create_persists_nothing() {
    let (storage, store) = store();
    let name = role_name("role3");
    let mut update = ephemeral_update();
    update.ttl = Some(Duration::from_secs(40));
    update.max_ttl = Some(Duration::from_secs(30));

    let result = store.write(&name, WriteMode::Create, update).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(storage.raw("roles/role3").is_none());
}

#[tokio::test]
async fn create_on_existing_and_update_on_missing_are_rejected() {
    let (_, store) = store();
    let name = role_name("role1");
    assert!(
        store
            .write(&name, WriteMode::Create, RoleUpdate::default())
            .await
            .is_ok()
    );

    let duplicate = store
        .write(&name, WriteMode::Create, RoleUpdate::default())
        .await;
    let missing = store
        .write(&role_name("ghost"), WriteMode::Update, RoleUpdate::default())
        .await;

    assert!(matches!(duplicate, Err(AppError::Validation(_))));
    assert!(matches!(missing, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn delete_of_absent_role_succeeds_twice() {
    let (_, store) = store();
    let name = role_name("ghost");

    assert!(store.delete(&name).await.is_ok());
    assert!(store.delete(&name).await.is_ok());
    assert!(matches!(store.read(&name).await, Ok(None)));
}

#[tokio::test]
async fn list_reflects_deletes() {
    let (_, store) = store();
    for name in ["r1", "r2", "r3"] {
        assert!(
            store
                .write(&role_name(name), WriteMode::Create, RoleUpdate::default())
                .await
                .is_ok()
        );
    }

    assert!(store.delete(&role_name("r2")).await.is_ok());

    let mut names = store.list().await.unwrap_or_default();
    names.sort();
    assert_eq!(names, vec!["r1".to_owned(), "r3".to_owned()]);
}

#[tokio::test]
async fn stored_document_carries_schema_version() {
    let (storage, store) = store();
    assert!(
        store
            .write(&role_name("role2"), WriteMode::Create, ephemeral_update())
            .await
            .is_ok()
    );

    let document: Value = storage
        .raw("roles/role2")
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default();

    assert_eq!(document["schema_version"], json!(1));
    assert_eq!(document["credential_strategy"], json!("ephemeral_identity"));
    assert_eq!(document["ttl_seconds"], json!(0));
}

#[tokio::test]
async fn unknown_schema_version_is_an_internal_error() {
    let (storage, store) = store();
    storage.insert_raw(
        "roles/legacy",
        br#"{"schema_version":2,"credential_strategy":"delegated_grant"}"#,
    );
    storage.insert_raw("roles/unversioned", br#"{"app_client_id":"x"}"#);

    assert!(matches!(
        store.read(&role_name("legacy")).await,
        Err(AppError::Internal(_))
    ));
    assert!(matches!(
        store.read(&role_name("unversioned")).await,
        Err(AppError::Internal(_))
    ));
}
