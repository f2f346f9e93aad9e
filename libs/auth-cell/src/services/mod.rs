pub mod auth;
pub mod password;
pub mod profile;

pub use auth::AuthService;
pub use password::PasswordService;
pub use profile::ProfileService;
