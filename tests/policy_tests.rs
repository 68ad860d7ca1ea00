use std::collections::HashMap;
use survey_portal::{
    auth::AuthUser,
    error::ApiError,
    policy::{AccessPolicy, RoutePolicies},
};
use uuid::Uuid;

const OWNER_ID: Uuid = Uuid::from_u128(7);

fn caller(id: Uuid, role: &str) -> AuthUser {
    AuthUser {
        id,
        role: role.to_string(),
    }
}

#[test]
fn test_public_allows_everyone() {
    assert_eq!(AccessPolicy::Public.evaluate(None, None), Ok(()));
    assert_eq!(
        AccessPolicy::Public.evaluate(Some(&caller(OWNER_ID, "user")), None),
        Ok(())
    );
}

#[test]
fn test_login_requires_a_caller() {
    assert_eq!(AccessPolicy::Login.evaluate(None, None), Err(ApiError::Unauthenticated));
    assert_eq!(
        AccessPolicy::Login.evaluate(Some(&caller(OWNER_ID, "user")), None),
        Ok(())
    );
}

#[test]
fn test_admin_denies_non_admin_even_when_creator() {
    let creator = caller(OWNER_ID, "user");
    assert_eq!(
        AccessPolicy::Admin.evaluate(Some(&creator), Some(OWNER_ID)),
        Err(ApiError::Forbidden)
    );
    assert_eq!(
        AccessPolicy::Admin.evaluate(Some(&caller(Uuid::new_v4(), "admin")), Some(OWNER_ID)),
        Ok(())
    );
    assert_eq!(AccessPolicy::Admin.evaluate(None, Some(OWNER_ID)), Err(ApiError::Unauthenticated));
}

#[test]
fn test_owner_or_admin() {
    let policy = AccessPolicy::OwnerOrAdmin;
    assert_eq!(policy.evaluate(Some(&caller(OWNER_ID, "user")), Some(OWNER_ID)), Ok(()));
    assert_eq!(
        policy.evaluate(Some(&caller(Uuid::new_v4(), "user")), Some(OWNER_ID)),
        Err(ApiError::Forbidden)
    );
    // Anonymous records have no owner to match.
    assert_eq!(
        policy.evaluate(Some(&caller(OWNER_ID, "user")), None),
        Err(ApiError::Forbidden)
    );
    assert_eq!(policy.evaluate(Some(&caller(Uuid::new_v4(), "admin")), None), Ok(()));
}

#[test]
fn test_policy_names_round_trip_through_display() {
    for policy in [
        AccessPolicy::Public,
        AccessPolicy::Login,
        AccessPolicy::Admin,
        AccessPolicy::OwnerOrAdmin,
    ] {
        assert_eq!(policy.to_string().parse::<AccessPolicy>(), Ok(policy));
    }
    assert!("root".parse::<AccessPolicy>().is_err());
}

#[test]
fn test_default_route_policies() {
    let policies = RoutePolicies::default();
    assert_eq!(policies.survey_create, AccessPolicy::Login);
    assert_eq!(policies.survey_update, AccessPolicy::Admin);
    assert_eq!(policies.survey_delete, AccessPolicy::Admin);
    assert_eq!(policies.location_create, AccessPolicy::Public);
    assert_eq!(policies.location_update, AccessPolicy::Public);
    assert_eq!(policies.location_delete, AccessPolicy::Admin);
}

#[test]
fn test_from_lookup_reports_the_offending_key() {
    let overrides: HashMap<&str, &str> = [("POLICY_LOCATION_DELETE", "sometimes")].into();
    let err = RoutePolicies::from_lookup(|key| overrides.get(key).map(|v| v.to_string()))
        .unwrap_err();
    assert!(err.starts_with("POLICY_LOCATION_DELETE"));
}
