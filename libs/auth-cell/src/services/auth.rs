use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use doctor_cell::{Doctor, DoctorError, DoctorService, SpecialtyService};
use patient_cell::{Patient, PatientError, PatientService};
use shared_config::AppConfig;
use shared_models::account::{NewIdentity, ProfileUpdate};
use shared_models::auth::{Role, TokenClaims};
use shared_utils::jwt::issue_token;

use crate::models::{Account, AuthError, LoginRequest, SignUpRequest};
use crate::services::password::{PasswordService, PASSWORD_RULES};

pub struct AuthService {
    doctors: DoctorService,
    patients: PatientService,
    specialties: SpecialtyService,
    token_secret: String,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            doctors: DoctorService::new(config),
            patients: PatientService::new(config),
            specialties: SpecialtyService::new(config),
            token_secret: config.token_secret.clone(),
        }
    }

    pub async fn signup(&self, request: SignUpRequest) -> Result<Account, AuthError> {
        let role = request.role();

        let (email, password, first_name, last_name) = match (
            non_empty(&request.email),
            non_empty(&request.password),
            non_empty(&request.first_name),
            non_empty(&request.last_name),
        ) {
            (Some(e), Some(p), Some(f), Some(l)) => (e, p, f, l),
            _ => {
                return Err(AuthError::ValidationError(
                    "Provide email, password and full name".to_string(),
                ))
            }
        };

        if !PasswordService::is_valid_email(email) {
            return Err(AuthError::ValidationError("Provide a valid email address.".to_string()));
        }

        // Passwords are checked untrimmed.
        let password = request.password.as_deref().unwrap_or(password);
        if !PasswordService::is_strong_enough(password) {
            return Err(AuthError::ValidationError(PASSWORD_RULES.to_string()));
        }

        let specialty_id = match role {
            Role::Doctor => Some(parse_specialty(&request.specialty)?),
            Role::Patient => None,
        };

        debug!("Signing up {} account for {}", role, email);

        let new = NewIdentity {
            email: email.to_string(),
            password_hash: PasswordService::hash_password(password)?,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };

        let account = match specialty_id {
            Some(specialty_id) => match self.doctors.create_doctor(new, specialty_id).await {
                Ok(doctor) => Account::Doctor(doctor),
                Err(DoctorError::EmailAlreadyExists { .. }) => return Err(AuthError::DoctorAlreadyExists),
                Err(DoctorError::SpecialtyNotFound) => return Err(invalid_specialty()),
                Err(e) => return Err(e.into()),
            },
            None => match self.patients.create_patient(new).await {
                Ok(patient) => Account::Patient(patient),
                Err(PatientError::EmailAlreadyExists { .. }) => return Err(AuthError::PatientAlreadyExists),
                Err(e) => return Err(e.into()),
            },
        };

        info!("{} account created: {}", role, account.identity().id);
        Ok(account)
    }

    /// Returns a signed bearer token for valid credentials.
    pub async fn login(&self, request: LoginRequest) -> Result<String, AuthError> {
        let (email, password) = match (non_empty(&request.email), request.password.as_deref()) {
            (Some(email), Some(password)) if !password.is_empty() => (email, password),
            _ => return Err(AuthError::ValidationError("Provide email and password.".to_string())),
        };

        let account = match request.role() {
            Role::Doctor => self.doctors.find_by_email(email).await?.map(Account::Doctor),
            Role::Patient => self.patients.find_by_email(email).await?.map(Account::Patient),
        }
        .ok_or(AuthError::UserNotFound)?;

        if !PasswordService::verify_password(password, &account.identity().password)? {
            debug!("Password mismatch for {}", account.identity().id);
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_for(&account).await
    }

    /// Applies a profile edit on behalf of the token subject and returns the
    /// refreshed account with a new token.
    pub async fn update_profile(
        &self,
        claims: &TokenClaims,
        account_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<(Account, String), AuthError> {
        if claims.id != account_id {
            return Err(AuthError::Unauthorized("You can only edit your own profile".to_string()));
        }

        if let Some(email) = update.email.as_deref() {
            if !PasswordService::is_valid_email(email.trim()) {
                return Err(AuthError::ValidationError("Provide a valid email address.".to_string()));
            }
        }

        let account = match claims.role {
            Role::Doctor => Account::Doctor(self.update_doctor(account_id, update).await?),
            Role::Patient => Account::Patient(self.update_patient(account_id, update).await?),
        };

        let token = self.issue_for(&account).await?;
        info!("Profile updated for {} {}", account.role(), account_id);

        Ok((account, token))
    }

    async fn update_doctor(&self, id: Uuid, update: &ProfileUpdate) -> Result<Doctor, AuthError> {
        match self.doctors.update_profile(id, update).await {
            Ok(doctor) => Ok(doctor),
            Err(DoctorError::EmailAlreadyExists { .. }) => Err(AuthError::DoctorAlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_patient(&self, id: Uuid, update: &ProfileUpdate) -> Result<Patient, AuthError> {
        match self.patients.update_profile(id, update).await {
            Ok(patient) => Ok(patient),
            Err(PatientError::EmailAlreadyExists { .. }) => Err(AuthError::PatientAlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    /// Doctor tokens carry the specialty name and the public description.
    pub async fn issue_for(&self, account: &Account) -> Result<String, AuthError> {
        let claims = TokenClaims::for_identity(account.identity(), account.role(), Utc::now());

        let claims = match account {
            Account::Doctor(doctor) => {
                let specialty = self
                    .specialties
                    .get_specialty(doctor.specialty)
                    .await?
                    .map(|s| s.name);
                claims.with_doctor_profile(specialty, doctor.description.clone())
            }
            Account::Patient(_) => claims,
        };

        issue_token(&claims, &self.token_secret).map_err(AuthError::Token)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_specialty(value: &Option<String>) -> Result<Uuid, AuthError> {
    non_empty(value)
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or_else(invalid_specialty)
}

fn invalid_specialty() -> AuthError {
    AuthError::ValidationError("Provide a valid specialty".to_string())
}
