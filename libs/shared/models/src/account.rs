use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity fields shared by doctor and patient records.
///
/// Store rows are snake_case; responses are camelCase. The password hash is
/// read from the store but never serialized back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: String,
}

impl Identity {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

pub const DEFAULT_PROFILE_PICTURE: &str =
    "https://directory.wkhs.com/sites/default/files/hg-features/hg-providers/default-neutral.jpg";

/// Lowercase and trim an email the way every account store expects it.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Fields accepted when creating an account, after validation and hashing.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Mutable profile fields. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub profile_picture: Option<String>,
    pub description: Option<String>,
}
