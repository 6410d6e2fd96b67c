use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use validator::ValidationError;

/// Symbols the password policy accepts.
const PASSWORD_SYMBOLS: &str = "!@#$%^&*";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    pub username: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i32, username: String, email: String, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            username,
            email,
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
    HashFailure(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            AuthError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            AuthError::InvalidSecret => write!(f, "Invalid JWT secret"),
            AuthError::HashFailure(msg) => write!(f, "Password hash error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

pub fn generate_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Salted one-way hash for stored credentials. The plaintext never reaches
/// the database or the logs.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| AuthError::HashFailure(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Registration password policy: at least 8 characters with one digit, one
/// uppercase letter, one lowercase letter and one symbol from `!@#$%^&*`.
pub fn password_policy(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= 8;
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if long_enough && has_digit && has_upper && has_lower && has_symbol {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_policy");
        err.message = Some(
            "must be at least 8 characters with a digit, an uppercase letter, \
             a lowercase letter and a symbol"
                .into(),
        );
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trip_preserves_identity() {
        let claims = Claims::new(42, "jack_b".to_string(), "jbauer@24hours.com".to_string(), 1);
        let token = generate_token(&claims, SECRET).unwrap();

        let decoded = validate_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, 42);
        assert_eq!(decoded.username, "jack_b");
        assert_eq!(decoded.email, "jbauer@24hours.com");
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let claims = Claims::new(42, "jack_b".to_string(), "j@e.com".to_string(), 1);
        let token = generate_token(&claims, "other-secret").unwrap();
        assert!(validate_token(&token, SECRET).is_err());
    }

    #[test]
    fn rejects_empty_secret() {
        let claims = Claims::new(1, "u".to_string(), "u@e.com".to_string(), 1);
        assert!(matches!(
            generate_token(&claims, ""),
            Err(AuthError::InvalidSecret)
        ));
    }

    #[test]
    fn password_hash_verifies_and_hides_plaintext() {
        let hash = hash_password("Aw3s0m#01").unwrap();
        assert_ne!(hash, "Aw3s0m#01");
        assert!(verify_password("Aw3s0m#01", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn password_policy_requires_all_four_classes_and_length() {
        // Missing digit, lowercase, uppercase, symbol, length, in that order
        assert!(password_policy("Awesome#!").is_err());
        assert!(password_policy("aw3s0m#01").is_err());
        assert!(password_policy("AW3S0M#01").is_err());
        assert!(password_policy("Aw3s0m01x").is_err());
        assert!(password_policy("Aw3#a").is_err());

        assert!(password_policy("Aw3s0m#01").is_ok());
        assert!(password_policy("JK1234$eco").is_ok());
        assert!(password_policy("#24hoursRescuePresident").is_ok());
    }
}
