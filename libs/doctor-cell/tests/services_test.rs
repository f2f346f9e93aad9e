use std::collections::HashMap;

use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::{
    DoctorError, DoctorSearchFilters, DoctorService, ReviewService, SpecialtyService,
};
use shared_models::account::NewIdentity;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn filters(pairs: &[(&str, &str)]) -> DoctorSearchFilters {
    let params: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    DoctorSearchFilters::from_query(&params).unwrap()
}

// ==============================================================================
// DIRECTORY SEARCH
// ==============================================================================

#[tokio::test]
async fn test_search_by_specialty_name_resolves_id() {
    let server = MockServer::start().await;
    let specialty_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .and(query_param("name", "eq.cardiology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::specialty_row(specialty_id, "cardiology")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("specialty", format!("eq.{}", specialty_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(doctor_id, "house@example.com", specialty_id)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .and(query_param("id", format!("in.({})", specialty_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::specialty_row(specialty_id, "cardiology")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let service = DoctorService::new(&TestConfig::with_store(&server.uri()).to_app_config());
    let doctors = service
        .search_doctors(filters(&[("specialty", "Cardiology")]))
        .await
        .unwrap();

    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].identity.id, doctor_id);
    assert_eq!(doctors[0].specialty.as_ref().map(|s| s.name.as_str()), Some("cardiology"));

    let body = serde_json::to_value(&doctors[0]).unwrap();
    assert!(body.get("password").is_none());
    assert_eq!(body["firstName"], "gregory");
}

#[tokio::test]
async fn test_search_by_unknown_specialty_name_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let service = DoctorService::new(&TestConfig::with_store(&server.uri()).to_app_config());
    let doctors = service
        .search_doctors(filters(&[("specialty", "astrology")]))
        .await
        .unwrap();

    assert!(doctors.is_empty());
}

#[tokio::test]
async fn test_search_keeps_doctor_with_deleted_specialty() {
    let server = MockServer::start().await;
    let missing_specialty = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("last_name", "eq.house"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(Uuid::new_v4(), "house@example.com", missing_specialty)
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let service = DoctorService::new(&TestConfig::with_store(&server.uri()).to_app_config());
    let doctors = service
        .search_doctors(filters(&[("lastName", "House")]))
        .await
        .unwrap();

    assert_eq!(doctors.len(), 1);
    assert!(doctors[0].specialty.is_none());
    assert_eq!(serde_json::to_value(&doctors[0]).unwrap()["specialty"], json!(null));
}

#[tokio::test]
async fn test_create_doctor_rejects_unknown_specialty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let service = DoctorService::new(&TestConfig::with_store(&server.uri()).to_app_config());
    let new = NewIdentity {
        email: "house@example.com".to_string(),
        password_hash: "$argon2id$v=19$hash".to_string(),
        first_name: "Gregory".to_string(),
        last_name: "House".to_string(),
    };

    assert_matches!(
        service.create_doctor(new, Uuid::new_v4()).await,
        Err(DoctorError::SpecialtyNotFound)
    );
}

#[tokio::test]
async fn test_create_doctor_lowercases_names() {
    let server = MockServer::start().await;
    let specialty_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::specialty_row(specialty_id, "nephrology")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .and(body_partial_json(json!({
            "email": "house@example.com",
            "first_name": "gregory",
            "last_name": "house",
            "specialty": specialty_id,
            "description": "this is my public profile"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::doctor_row(doctor_id, "house@example.com", specialty_id)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let service = DoctorService::new(&TestConfig::with_store(&server.uri()).to_app_config());
    let new = NewIdentity {
        email: "House@Example.com".to_string(),
        password_hash: "$argon2id$v=19$hash".to_string(),
        first_name: " Gregory".to_string(),
        last_name: "HOUSE".to_string(),
    };

    let doctor = service.create_doctor(new, specialty_id).await.unwrap();
    assert_eq!(doctor.id(), doctor_id);
}

// ==============================================================================
// REVIEWS
// ==============================================================================

#[tokio::test]
async fn test_add_review_links_doctor_and_patient() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();
    let specialty_id = Uuid::new_v4();

    let mut reviewed = MockSupabaseResponses::doctor_row(doctor_id, "house@example.com", specialty_id);
    reviewed["reviews"] = json!([Uuid::new_v4()]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(doctor_id, "house@example.com", specialty_id)
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/reviews"))
        .and(body_partial_json(json!({ "author": patient_id, "content": "Very thorough" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::review_row(Uuid::new_v4(), patient_id, "Very thorough")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/push_reference"))
        .and(body_partial_json(json!({ "target_table": "doctors", "target_column": "reviews" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reviewed))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/push_reference"))
        .and(body_partial_json(json!({
            "target_table": "patients",
            "target_id": patient_id,
            "target_column": "reviews"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSupabaseResponses::patient_row(patient_id, "jane@example.com"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let service = ReviewService::new(&TestConfig::with_store(&server.uri()).to_app_config());
    let doctor = service
        .add_review(doctor_id, patient_id, "  Very thorough ")
        .await
        .unwrap();

    assert_eq!(doctor.reviews.len(), 1);
}

#[tokio::test]
async fn test_add_review_rejects_empty_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let service = ReviewService::new(&TestConfig::with_store(&server.uri()).to_app_config());

    assert_matches!(
        service.add_review(Uuid::new_v4(), Uuid::new_v4(), "   ").await,
        Err(DoctorError::ValidationError(_))
    );
}

#[tokio::test]
async fn test_add_review_for_missing_doctor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/reviews"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let service = ReviewService::new(&TestConfig::with_store(&server.uri()).to_app_config());

    assert_matches!(
        service.add_review(Uuid::new_v4(), Uuid::new_v4(), "Great").await,
        Err(DoctorError::NotFound)
    );
}

#[tokio::test]
async fn test_delete_review_unlinks_but_keeps_record() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();
    let review_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/reviews"))
        .and(query_param("id", format!("eq.{}", review_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::review_row(review_id, patient_id, "Very thorough")
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let mut doctor = MockSupabaseResponses::doctor_row(doctor_id, "house@example.com", Uuid::new_v4());
    doctor["reviews"] = json!([review_id]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/pull_reference"))
        .and(body_partial_json(json!({
            "target_table": "patients",
            "target_id": patient_id,
            "reference": review_id
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSupabaseResponses::patient_row(patient_id, "jane@example.com"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/pull_reference"))
        .and(body_partial_json(json!({
            "target_table": "doctors",
            "target_id": doctor_id,
            "reference": review_id
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSupabaseResponses::doctor_row(doctor_id, "house@example.com", Uuid::new_v4()),
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = ReviewService::new(&TestConfig::with_store(&server.uri()).to_app_config());
    let removed = service.delete_review(doctor_id, review_id, patient_id).await.unwrap();
    assert_eq!(removed.id, review_id);

    let still_there = service.get_review(review_id).await.unwrap();
    assert_eq!(still_there.content, "Very thorough");
}

#[tokio::test]
async fn test_delete_review_requires_author_or_doctor() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let review_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::review_row(review_id, Uuid::new_v4(), "Very thorough")
        ])))
        .mount(&server)
        .await;

    let mut doctor = MockSupabaseResponses::doctor_row(doctor_id, "house@example.com", Uuid::new_v4());
    doctor["reviews"] = json!([review_id]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = ReviewService::new(&TestConfig::with_store(&server.uri()).to_app_config());

    assert_matches!(
        service.delete_review(doctor_id, review_id, Uuid::new_v4()).await,
        Err(DoctorError::UnauthorizedAccess(_))
    );
}

#[tokio::test]
async fn test_delete_review_rejects_doctor_not_reviewed() {
    let server = MockServer::start().await;
    let other_doctor = Uuid::new_v4();
    let patient_id = Uuid::new_v4();
    let review_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::review_row(review_id, patient_id, "Very thorough")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", other_doctor)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(other_doctor, "wilson@example.com", Uuid::new_v4())
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/pull_reference"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = ReviewService::new(&TestConfig::with_store(&server.uri()).to_app_config());

    assert_matches!(
        service.delete_review(other_doctor, review_id, other_doctor).await,
        Err(DoctorError::ReviewNotFound)
    );
}

#[tokio::test]
async fn test_delete_review_with_missing_author_still_unlinks_doctor() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();
    let review_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::review_row(review_id, patient_id, "Very thorough")
        ])))
        .mount(&server)
        .await;

    let mut doctor = MockSupabaseResponses::doctor_row(doctor_id, "house@example.com", Uuid::new_v4());
    doctor["reviews"] = json!([review_id]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor.clone()])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/pull_reference"))
        .and(body_partial_json(json!({ "target_table": "patients" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    doctor["reviews"] = json!([]);
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/pull_reference"))
        .and(body_partial_json(json!({ "target_table": "doctors" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(doctor))
        .expect(1)
        .mount(&server)
        .await;

    let service = ReviewService::new(&TestConfig::with_store(&server.uri()).to_app_config());
    let removed = service.delete_review(doctor_id, review_id, doctor_id).await.unwrap();

    assert_eq!(removed.author, patient_id);
}

// ==============================================================================
// SPECIALTIES
// ==============================================================================

#[tokio::test]
async fn test_create_specialty_lowercases_name() {
    let server = MockServer::start().await;
    let specialty_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .and(query_param("name", "eq.dermatology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/specialties"))
        .and(body_partial_json(json!({ "name": "dermatology" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::specialty_row(specialty_id, "dermatology")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let service = SpecialtyService::new(&TestConfig::with_store(&server.uri()).to_app_config());
    let specialty = service.create_specialty(" Dermatology ").await.unwrap();

    assert_eq!(specialty.id, specialty_id);
    assert_eq!(specialty.name, "dermatology");
}

#[tokio::test]
async fn test_create_specialty_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::specialty_row(Uuid::new_v4(), "dermatology")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let service = SpecialtyService::new(&TestConfig::with_store(&server.uri()).to_app_config());

    assert_matches!(
        service.create_specialty("DERMATOLOGY").await,
        Err(DoctorError::SpecialtyAlreadyExists { name }) if name == "dermatology"
    );
}

#[tokio::test]
async fn test_create_specialty_losing_insert_race_is_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(409).set_body_json(
            MockSupabaseResponses::error_response(
                "duplicate key value violates unique constraint \"specialties_name_key\"",
                "23505",
            ),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let service = SpecialtyService::new(&TestConfig::with_store(&server.uri()).to_app_config());

    assert_matches!(
        service.create_specialty("Dermatology").await,
        Err(DoctorError::SpecialtyAlreadyExists { name }) if name == "dermatology"
    );
}

#[tokio::test]
async fn test_update_specialty_allows_same_name_on_itself() {
    let server = MockServer::start().await;
    let specialty_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::specialty_row(specialty_id, "oncology")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/specialties"))
        .and(query_param("id", format!("eq.{}", specialty_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::specialty_row(specialty_id, "oncology")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let service = SpecialtyService::new(&TestConfig::with_store(&server.uri()).to_app_config());
    let specialty = service.update_specialty(specialty_id, "Oncology").await.unwrap();

    assert_eq!(specialty.name, "oncology");
}

#[tokio::test]
async fn test_delete_missing_specialty() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let service = SpecialtyService::new(&TestConfig::with_store(&server.uri()).to_app_config());

    assert_matches!(
        service.delete_specialty(Uuid::new_v4()).await,
        Err(DoctorError::SpecialtyNotFound)
    );
}
