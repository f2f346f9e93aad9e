use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::debug;

use shared_models::auth::TokenClaims;

pub fn issue_token(claims: &TokenClaims, token_secret: &str) -> Result<String, String> {
    if token_secret.is_empty() {
        return Err("Token secret is not set".to_string());
    }

    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(token_secret.as_bytes()),
    )
    .map_err(|e| {
        debug!("Failed to sign token: {}", e);
        "Failed to sign token".to_string()
    })
}

pub fn validate_token(token: &str, token_secret: &str) -> Result<TokenClaims, String> {
    if token_secret.is_empty() {
        return Err("Token secret is not set".to_string());
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(token_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        debug!("Token rejected: {}", e);
        match e.kind() {
            ErrorKind::ExpiredSignature => "Token expired".to_string(),
            ErrorKind::InvalidSignature => "Invalid token signature".to_string(),
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                "Invalid token format".to_string()
            }
            _ => "Invalid token".to_string(),
        }
    })?;

    debug!("Token validated successfully for user: {}", data.claims.id);
    Ok(data.claims)
}
