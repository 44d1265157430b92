//! Password hashing and credential validation.

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::AuthError;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("hardcoded email regex is invalid")
});

const PASSWORD_SPECIALS: &str = "!@#$%^&*()-_=+{};:,<.>";
const PASSWORD_MIN_CHARS: usize = 8;
const PASSWORD_MAX_CHARS: usize = 32;

/// Hash a password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(rand::thread_rng());

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("Failed to hash password: {e}")))
}

/// Check a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AuthError::Internal("Invalid password hash format".to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Basic shape check for an email address.
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Validate password strength.
/// Requirements:
/// - 8 to 32 characters
/// - At least one lowercase and one uppercase letter
/// - At least one digit
/// - At least one of `!@#$%^&*()-_=+{};:,<.>`
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    let length = password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&length) {
        return Err(format!(
            "Password must be between {PASSWORD_MIN_CHARS} and {PASSWORD_MAX_CHARS} characters"
        ));
    }

    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if has_lowercase && has_uppercase && has_digit && has_special {
        Ok(())
    } else {
        Err("Password must contain a lowercase letter, an uppercase letter, a digit and a special character".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "SecurePass123!";
        let hash = hash_password(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_wrong_password() {
        let hash = hash_password("SecurePass123!").unwrap();
        assert!(!verify_password("WrongPass123!", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("SecurePass123!").unwrap();
        let b = hash_password("SecurePass123!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash() {
        assert!(matches!(
            verify_password("SecurePass123!", "not-a-hash"),
            Err(AuthError::Internal(_))
        ));
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("SecurePass123!").is_ok());
        assert!(validate_password_strength("Aa1!aaaa").is_ok());
        assert!(validate_password_strength("Pass1!").is_err());
        assert!(validate_password_strength(&format!("Aa1!{}", "a".repeat(29))).is_err());
        assert!(validate_password_strength("securepass123!").is_err());
        assert!(validate_password_strength("SECUREPASS123!").is_err());
        assert!(validate_password_strength("SecurePass!!").is_err());
        assert!(validate_password_strength("SecurePass123").is_err());
        // '~' is not an accepted special character.
        assert!(validate_password_strength("SecurePass123~").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("first.last+tag@sub.example.org"));
        assert!(!validate_email(""));
        assert!(!validate_email("user@"));
        assert!(!validate_email("user@example"));
        assert!(!validate_email("user example.com"));
    }
}
