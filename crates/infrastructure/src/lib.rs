//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod cognito_client_factory;
mod cognito_identity_provider_client;
mod in_memory_secret_storage;
mod postgres_secret_storage;

use std::collections::BTreeSet;

pub use cognito_client_factory::CognitoClientFactory;
pub use cognito_identity_provider_client::CognitoIdentityProviderClient;
pub use in_memory_secret_storage::InMemorySecretStorage;
pub use postgres_secret_storage::PostgresSecretStorage;

/// Sorted, de-duplicated immediate child names of `prefix`.
fn child_names<'a>(prefix: &str, keys: impl Iterator<Item = &'a str>) -> Vec<String> {
    keys.filter_map(|key| key.strip_prefix(prefix))
        .filter_map(|rest| rest.split('/').next())
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::child_names;

    #[test]
    fn child_names_collapse_nested_keys() {
        let keys = ["roles/a", "roles/a-b", "roles/a/x", "roles/", "config"];

        assert_eq!(
            child_names("roles/", keys.into_iter()),
            vec!["a".to_owned(), "a-b".to_owned()]
        );
    }
}
