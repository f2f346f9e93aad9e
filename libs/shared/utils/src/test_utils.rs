use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, DEFAULT_PORT};
use shared_models::auth::{Role, TokenClaims};

pub struct TestConfig {
    pub token_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub emailjs_base_url: String,
    pub emailjs_service_id: String,
    pub emailjs_user_id: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            token_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            emailjs_base_url: "http://localhost:54322".to_string(),
            emailjs_service_id: String::new(),
            emailjs_user_id: String::new(),
        }
    }
}

impl TestConfig {
    /// Point the document store at a mock server.
    pub fn with_store(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    /// Point the email gateway at a mock server and give it credentials.
    pub fn with_email(mut self, url: &str) -> Self {
        self.emailjs_base_url = url.to_string();
        self.emailjs_service_id = "service_test".to_string();
        self.emailjs_user_id = "user_test".to_string();
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            token_secret: self.token_secret.clone(),
            emailjs_base_url: self.emailjs_base_url.clone(),
            emailjs_service_id: self.emailjs_service_id.clone(),
            emailjs_feedback_template_id: "template_feedback".to_string(),
            emailjs_appointment_template_id: "template_appointment".to_string(),
            emailjs_user_id: self.emailjs_user_id.clone(),
            emailjs_access_token: "access_test".to_string(),
            cloudinary_name: String::new(),
            cloudinary_key: String::new(),
            cloudinary_secret: String::new(),
            port: DEFAULT_PORT,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            role: Role::Patient,
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role,
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, Role::Doctor)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, Role::Patient)
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn to_claims(&self, exp_hours: Option<i64>) -> TokenClaims {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(6));

        TokenClaims {
            id: self.id,
            email: self.email.clone(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role: self.role,
            profile_picture: "https://example.com/avatar.png".to_string(),
            specialty: (self.role == Role::Doctor).then(|| "general practice".to_string()),
            description: (self.role == Role::Doctor).then(|| "this is my public profile".to_string()),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &user.to_claims(exp_hours),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("HMAC can take key of any size")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(6))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Store rows in the snake_case shape PostgREST returns.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_row(id: Uuid, email: &str, specialty_id: Uuid) -> Value {
        json!({
            "id": id,
            "email": email,
            "password": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g",
            "first_name": "gregory",
            "last_name": "house",
            "specialty": specialty_id,
            "profile_picture": "https://example.com/doctor.png",
            "description": "this is my public profile",
            "appointments": [],
            "reviews": [],
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn patient_row(id: Uuid, email: &str) -> Value {
        json!({
            "id": id,
            "email": email,
            "password": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g",
            "first_name": "Jane",
            "last_name": "Doe",
            "profile_picture": "https://example.com/patient.png",
            "appointments": [],
            "reviews": [],
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn specialty_row(id: Uuid, name: &str) -> Value {
        json!({
            "id": id,
            "name": name
        })
    }

    pub fn appointment_row(id: Uuid, doctor_id: Uuid, patient_id: Uuid) -> Value {
        json!({
            "id": id,
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@example.com",
            "phone_number": "+353 1 234 5678",
            "gender": "female",
            "summary": "Recurring headaches",
            "scheduled_at": "2030-05-01T09:30:00Z",
            "doctor": doctor_id,
            "patient": patient_id,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn review_row(id: Uuid, author_id: Uuid, content: &str) -> Value {
        json!({
            "id": id,
            "author": author_id,
            "content": content,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
