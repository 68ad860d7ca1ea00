use std::{fmt, str::FromStr};

use uuid::Uuid;

use crate::{auth::AuthUser, error::ApiError, models::ADMIN_ROLE};

/// AccessPolicy
///
/// The rule a mutating route applies to its caller. Every such route has exactly one entry
/// in `RoutePolicies`, and the entry is evaluated on every request; there is no way to
/// switch a check off other than configuring `Public`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Anyone, including anonymous callers.
    Public,
    /// Any authenticated caller.
    Login,
    /// Authenticated callers with the 'admin' role.
    Admin,
    /// Authenticated callers that created the record, or admins.
    OwnerOrAdmin,
}

impl AccessPolicy {
    /// evaluate
    ///
    /// `owner` is the creator of the record being acted on, when there is one.
    pub fn evaluate(&self, caller: Option<&AuthUser>, owner: Option<Uuid>) -> Result<(), ApiError> {
        if *self == AccessPolicy::Public {
            return Ok(());
        }
        let caller = caller.ok_or(ApiError::Unauthenticated)?;
        let allowed = match self {
            AccessPolicy::Public | AccessPolicy::Login => true,
            AccessPolicy::Admin => caller.role == ADMIN_ROLE,
            AccessPolicy::OwnerOrAdmin => {
                caller.role == ADMIN_ROLE || owner.is_some_and(|id| id == caller.id)
            }
        };
        if allowed {
            Ok(())
        } else {
            tracing::warn!(user_id = %caller.id, role = %caller.role, policy = %self, "access denied");
            Err(ApiError::Forbidden)
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessPolicy::Public => "public",
            AccessPolicy::Login => "login",
            AccessPolicy::Admin => "admin",
            AccessPolicy::OwnerOrAdmin => "owner_or_admin",
        };
        f.write_str(name)
    }
}

impl FromStr for AccessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(AccessPolicy::Public),
            "login" => Ok(AccessPolicy::Login),
            "admin" => Ok(AccessPolicy::Admin),
            "owner_or_admin" => Ok(AccessPolicy::OwnerOrAdmin),
            other => Err(format!("unknown access policy '{}'", other)),
        }
    }
}

/// RoutePolicies
///
/// The access policy of every mutating route. Read-only routes are always public.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicies {
    pub survey_create: AccessPolicy,
    pub survey_update: AccessPolicy,
    pub survey_delete: AccessPolicy,
    pub location_create: AccessPolicy,
    pub location_update: AccessPolicy,
    pub location_delete: AccessPolicy,
}

impl Default for RoutePolicies {
    /// The deployed behaviour: location create and update are open, every other
    /// mutation needs a caller and, for update/delete, the admin role.
    fn default() -> Self {
        Self {
            survey_create: AccessPolicy::Login,
            survey_update: AccessPolicy::Admin,
            survey_delete: AccessPolicy::Admin,
            location_create: AccessPolicy::Public,
            location_update: AccessPolicy::Public,
            location_delete: AccessPolicy::Admin,
        }
    }
}

impl RoutePolicies {
    /// Applies overrides from `lookup` (usually `std::env::var`) on top of the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let apply = |key: &str, slot: &mut AccessPolicy| -> Result<(), String> {
            if let Some(raw) = lookup(key) {
                *slot = raw.parse().map_err(|e| format!("{}: {}", key, e))?;
            }
            Ok(())
        };

        let mut policies = Self::default();
        apply("POLICY_SURVEY_CREATE", &mut policies.survey_create)?;
        apply("POLICY_SURVEY_UPDATE", &mut policies.survey_update)?;
        apply("POLICY_SURVEY_DELETE", &mut policies.survey_delete)?;
        apply("POLICY_LOCATION_CREATE", &mut policies.location_create)?;
        apply("POLICY_LOCATION_UPDATE", &mut policies.location_update)?;
        apply("POLICY_LOCATION_DELETE", &mut policies.location_delete)?;
        Ok(policies)
    }
}
