use axum::{http::StatusCode, response::IntoResponse};
use chrono::{TimeZone, Utc};
use serde_json::json;
use survey_portal::{
    error::{ApiError, FieldError, StoreError},
    models::{
        CreateSurveyRequest, Creator, Survey, SurveysByLocation, validate_location,
        validate_survey,
    },
};
use uuid::Uuid;

#[test]
fn test_survey_serializes_with_camel_case_keys() {
    let survey = Survey {
        id: Uuid::nil(),
        title: "T".to_string(),
        content: "C".to_string(),
        location_id: None,
        created_by: Creator::new(Uuid::nil(), "Grace", "Hopper"),
        created_on: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
    };

    let value = serde_json::to_value(&survey).unwrap();

    assert_eq!(value["createdBy"]["fullName"], "Grace Hopper");
    assert_eq!(value["createdBy"]["firstName"], "Grace");
    assert_eq!(value["createdOn"], "2024-01-02T03:04:05Z");
    assert!(value.get("locationId").is_some());
    assert!(value.get("created_by").is_none());
}

#[test]
fn test_full_name_is_trimmed_when_a_part_is_missing() {
    assert_eq!(Creator::new(Uuid::nil(), "Cher", "").full_name, "Cher");
    assert_eq!(Creator::unresolved(Uuid::nil()).full_name, "");
}

#[test]
fn test_create_request_drops_server_owned_fields() {
    let request: CreateSurveyRequest = serde_json::from_value(json!({
        "title": "T",
        "createdBy": Uuid::new_v4(),
        "createdOn": "2020-01-01T00:00:00Z"
    }))
    .unwrap();

    assert_eq!(request.title, "T");
    assert_eq!(request.content, "");
    assert_eq!(request.location_id, None);
}

#[test]
fn test_success_envelope_omits_message() {
    let envelope = SurveysByLocation::from_surveys(vec![Survey::default()]);
    let value = serde_json::to_value(&envelope).unwrap();

    assert_eq!(value["state"], "success");
    assert_eq!(value["surveys"].as_array().unwrap().len(), 1);
    assert!(value.get("message").is_none());
}

#[test]
fn test_schema_checks() {
    assert!(validate_survey("Title").is_ok());
    let errors = validate_survey("   ").unwrap_err();
    assert_eq!(errors[0].field, "title");
    assert_eq!(errors[0].message, "Title cannot be blank");

    assert!(validate_location("Hall").is_ok());
    assert_eq!(
        validate_location("").unwrap_err()[0].message,
        "Name cannot be blank"
    );
}

#[test]
fn test_store_error_mapping() {
    let first_message = ApiError::from(StoreError::Validation(vec![
        FieldError::new("title", "Title cannot be blank"),
        FieldError::new("content", "Content is too long"),
    ]));
    assert_eq!(first_message, ApiError::Validation("Title cannot be blank".to_string()));

    // No structured detail falls back to the generic message.
    let unstructured = ApiError::from(StoreError::Validation(vec![]));
    assert_eq!(unstructured, ApiError::UnknownServer);
    assert_eq!(unstructured.to_string(), "Unknown server error");

    let database = ApiError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
    assert_eq!(database, ApiError::UnknownServer);
    assert_eq!(database.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_api_error_statuses() {
    assert_eq!(
        ApiError::Validation("x".to_string()).into_response().status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(ApiError::Unauthenticated.into_response().status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ApiError::Forbidden.into_response().status(), StatusCode::FORBIDDEN);
    assert_eq!(
        ApiError::NotFound("Failed to load survey 1".to_string())
            .into_response()
            .status(),
        StatusCode::NOT_FOUND
    );
}
