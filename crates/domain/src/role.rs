//! Role definitions and their write-time invariants.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use broker_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum accepted role name length.
pub const ROLE_NAME_MAX_LENGTH: usize = 128;

/// Case-normalized, validated role name.
///
/// Names are lower-cased and must start and end with an ASCII word character,
/// with ASCII word characters, `.` or `-` in between.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleName(String);

impl RoleName {
    /// Creates a normalized role name.
    pub fn new(value: impl AsRef<str>) -> AppResult<Self> {
        let normalized = value.as_ref().to_lowercase();

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "role name must not be empty".to_owned(),
            ));
        }

        if normalized.len() > ROLE_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "role name must not exceed {ROLE_NAME_MAX_LENGTH} characters"
            )));
        }

        let is_word = |character: char| character.is_ascii_alphanumeric() || character == '_';
        let starts_and_ends_with_word = normalized.chars().next().is_some_and(is_word)
            && normalized.chars().last().is_some_and(is_word);
        let has_only_allowed = normalized
            .chars()
            .all(|character| is_word(character) || character == '.' || character == '-');

        if !starts_and_ends_with_word || !has_only_allowed {
            return Err(AppError::Validation(format!(
                "role name '{normalized}' may only contain word characters, '.' and '-', and must start and end with a word character"
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RoleName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

/// How a role obtains credentials from the identity provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStrategy {
    /// Exchange an application id and secret for a short-lived bearer token.
    #[default]
    DelegatedGrant,
    /// Provision a fresh identity per issuance and delete it on revoke.
    EphemeralIdentity,
}

impl CredentialStrategy {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DelegatedGrant => "delegated_grant",
            Self::EphemeralIdentity => "ephemeral_identity",
        }
    }
}

impl FromStr for CredentialStrategy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "delegated_grant" => Ok(Self::DelegatedGrant),
            "ephemeral_identity" => Ok(Self::EphemeralIdentity),
            _ => Err(AppError::Validation(format!(
                "unknown credential strategy '{value}', expected 'delegated_grant' or 'ephemeral_identity'"
            ))),
        }
    }
}

/// Partial role fields supplied by a create or update request.
///
/// `None` means "not supplied": the stored value (or the zero value on
/// create) is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleUpdate {
    /// Credential strategy.
    pub credential_strategy: Option<CredentialStrategy>,
    /// Token endpoint domain or full URL for delegated grants.
    pub pool_domain_or_url: Option<String>,
    /// Application client identifier.
    pub application_client_id: Option<String>,
    /// Application client secret for delegated grants.
    pub application_client_secret: Option<String>,
    /// Provider region for ephemeral identities.
    pub region: Option<String>,
    /// User pool that ephemeral identities are created in.
    pub user_pool_id: Option<String>,
    /// Group every ephemeral identity joins.
    pub group_name: Option<String>,
    /// Email domain used to synthesize ephemeral usernames.
    pub dummy_email_domain: Option<String>,
    /// Default lease duration.
    pub ttl: Option<Duration>,
    /// Maximum lease duration.
    pub max_ttl: Option<Duration>,
}

/// Persisted role configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDefinition {
    credential_strategy: CredentialStrategy,
    pool_domain_or_url: String,
    application_client_id: String,
    application_client_secret: String,
    region: String,
    user_pool_id: String,
    group_name: String,
    dummy_email_domain: String,
    ttl: Duration,
    max_ttl: Duration,
}

impl RoleDefinition {
    /// Creates an empty role for the given strategy with zero-valued fields.
    #[must_use]
    pub fn new(credential_strategy: CredentialStrategy) -> Self {
        Self {
            credential_strategy,
            ..Self::default()
        }
    }

    /// Creates a role from already validated stored values.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn from_parts(
        credential_strategy: CredentialStrategy,
        pool_domain_or_url: String,
        application_client_id: String,
        application_client_secret: String,
        region: String,
        user_pool_id: String,
        group_name: String,
        dummy_email_domain: String,
        ttl: Duration,
        max_ttl: Duration,
    ) -> Self {
        Self {
            credential_strategy,
            pool_domain_or_url,
            application_client_id,
            application_client_secret,
            region,
            user_pool_id,
            group_name,
            dummy_email_domain,
            ttl,
            max_ttl,
        }
    }

    /// Merges supplied fields onto this role and re-checks invariants.
    ///
    /// On error `self` is left untouched.
    pub fn apply(&mut self, update: RoleUpdate) -> AppResult<()> {
        let mut merged = self.clone();

        if let Some(value) = update.credential_strategy {
            merged.credential_strategy = value;
        }
        if let Some(value) = update.pool_domain_or_url {
            merged.pool_domain_or_url = value;
        }
        if let Some(value) = update.application_client_id {
            merged.application_client_id = value;
        }
        if let Some(value) = update.application_client_secret {
            merged.application_client_secret = value;
        }
        if let Some(value) = update.region {
            merged.region = value;
        }
        if let Some(value) = update.user_pool_id {
            merged.user_pool_id = value;
        }
        if let Some(value) = update.group_name {
            merged.group_name = value;
        }
        if let Some(value) = update.dummy_email_domain {
            merged.dummy_email_domain = value;
        }
        if let Some(value) = update.ttl {
            merged.ttl = value;
        }
        if let Some(value) = update.max_ttl {
            merged.max_ttl = value;
        }

        merged.validate()?;
        *self = merged;
        Ok(())
    }

    fn validate(&self) -> AppResult<()> {
        if !self.max_ttl.is_zero() && self.ttl > self.max_ttl {
            return Err(AppError::Validation(
                "ttl cannot be greater than max_ttl".to_owned(),
            ));
        }

        Ok(())
    }

    /// Returns the credential strategy.
    #[must_use]
    pub fn credential_strategy(&self) -> CredentialStrategy {
        self.credential_strategy
    }

    /// Returns the token endpoint domain or URL.
    #[must_use]
    pub fn pool_domain_or_url(&self) -> &str {
        self.pool_domain_or_url.as_str()
    }

    /// Returns the application client id, if configured.
    #[must_use]
    pub fn application_client_id(&self) -> Option<&str> {
        non_empty(self.application_client_id.as_str())
    }

    /// Returns the application client secret.
    #[must_use]
    pub fn application_client_secret(&self) -> &str {
        self.application_client_secret.as_str()
    }

    /// Returns the provider region.
    #[must_use]
    pub fn region(&self) -> &str {
        self.region.as_str()
    }

    /// Returns the user pool id.
    #[must_use]
    pub fn user_pool_id(&self) -> &str {
        self.user_pool_id.as_str()
    }

    /// Returns the group ephemeral identities join.
    #[must_use]
    pub fn group_name(&self) -> &str {
        self.group_name.as_str()
    }

    /// Returns the email domain for synthesized usernames.
    #[must_use]
    pub fn dummy_email_domain(&self) -> &str {
        self.dummy_email_domain.as_str()
    }

    /// Returns the default lease duration, zero meaning host default.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the maximum lease duration, zero meaning host default.
    #[must_use]
    pub fn max_ttl(&self) -> Duration {
        self.max_ttl
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use proptest::prelude::*;

    use super::{CredentialStrategy, RoleDefinition, RoleName, RoleUpdate};

    #[test]
    fn role_name_is_lower_cased() {
        let name = RoleName::new("Ops-Team.Admin");
        assert!(name.is_ok());
        assert_eq!(
            name.unwrap_or_else(|_| unreachable!()).as_str(),
            "ops-team.admin"
        );
    }

    #[test]
    fn role_name_rejects_separator_edges() {
        assert!(RoleName::new("-ops").is_err());
        assert!(RoleName::new("ops.").is_err());
        assert!(RoleName::new("ops/admin").is_err());
        assert!(RoleName::new("").is_err());
    }

    #[test]
    fn role_name_accepts_only_ascii_without_padding() {
        assert!(RoleName::new("rôle").is_err());
        assert!(RoleName::new(" ops ").is_err());
        assert!(RoleName::new("ops_2").is_ok());
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!("user".parse::<CredentialStrategy>().is_err());
        assert!(matches!(
            "ephemeral_identity".parse::<CredentialStrategy>(),
            Ok(CredentialStrategy::EphemeralIdentity)
        ));
    }

    #[test]
    fn apply_rejects_ttl_above_max_and_keeps_previous_values() {
        let mut role = RoleDefinition::new(CredentialStrategy::EphemeralIdentity);
        let first = role.apply(RoleUpdate {
            region: Some("eu-west-1".to_owned()),
            ttl: Some(Duration::from_secs(5)),
            max_ttl: Some(Duration::from_secs(10)),
            ..RoleUpdate::default()
        });
        assert!(first.is_ok());

        let second = role.apply(RoleUpdate {
            region: Some("us-east-1".to_owned()),
            ttl: Some(Duration::from_secs(11)),
            ..RoleUpdate::default()
        });
        assert!(second.is_err());
        assert_eq!(role.region(), "eu-west-1");
        assert_eq!(role.ttl(), Duration::from_secs(5));
    }

    #[test]
    fn zero_max_ttl_leaves_ttl_unbounded() {
        let mut role = RoleDefinition::new(CredentialStrategy::EphemeralIdentity);
        let result = role.apply(RoleUpdate {
            ttl: Some(Duration::from_secs(101)),
            max_ttl: Some(Duration::ZERO),
            ..RoleUpdate::default()
        });
        assert!(result.is_ok());
    }

    #[test]
    fn empty_client_id_reads_as_absent() {
        let role = RoleDefinition::new(CredentialStrategy::DelegatedGrant);
        assert_eq!(role.application_client_id(), None);
    }

    proptest! {
        #[test]
        fn role_name_normalization_is_idempotent(name in "[A-Za-z0-9_]([A-Za-z0-9_.-]{0,30}[A-Za-z0-9_])?") {
            let first = RoleName::new(&name);
            prop_assert!(first.is_ok());
            let first = first.unwrap_or_else(|_| unreachable!());
            let second = RoleName::new(first.as_str());
            prop_assert_eq!(second.ok(), Some(first));
        }

        #[test]
        fn ttl_ordering_is_enforced(ttl in 0_u64..1_000, max_ttl in 1_u64..1_000) {
            let mut role = RoleDefinition::new(CredentialStrategy::EphemeralIdentity);
            let result = role.apply(RoleUpdate {
                ttl: Some(Duration::from_secs(ttl)),
                max_ttl: Some(Duration::from_secs(max_ttl)),
                ..RoleUpdate::default()
            });
            prop_assert_eq!(result.is_ok(), ttl <= max_ttl);
        }
    }
}
