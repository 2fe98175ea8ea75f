/// Password Hashing and Verification
///
/// Handles password hashing with bcrypt and the registration password policy.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 10;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Hash a password using bcrypt
///
/// Policy checks happen before this is called; see [`password_policy_violations`].
///
/// # Errors
/// Returns error if bcrypt hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub(crate) fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// # Errors
/// Returns error if the stored hash is not a bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

/// Collect every way `password` breaks the policy
///
/// Requirements:
/// - Between 10 and 128 characters
/// - At least one lowercase letter, one uppercase letter, one digit
/// - At least one character that is not a letter or digit
pub fn password_policy_violations(password: &str) -> Vec<String> {
    let mut violations = Vec::new();
    let length = password.chars().count();

    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        violations.push(format!(
            "Password must be between {} and {} characters",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        ));
    }

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());

    if !has_digit || !has_lowercase || !has_uppercase || !has_special {
        violations.push(
            "Password must include at least one uppercase letter, one lowercase letter, one number, and one special character"
                .to_string(),
        );
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost keeps the suite fast
    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_password() {
        let password = "Password123!";
        let hash = hash_password_with_cost(password, TEST_COST).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password_with_cost("Password123!", TEST_COST).unwrap();

        assert!(verify_password("Password123!", &hash).unwrap());
        assert!(!verify_password("WrongPassword1!", &hash).unwrap());
    }

    #[test]
    fn test_verify_against_garbage_hash_errors() {
        assert!(verify_password("Password123!", "not-a-bcrypt-hash").is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(password_policy_violations("Password123!").is_empty());
    }

    #[test]
    fn test_too_short_password() {
        assert_eq!(password_policy_violations("Pass12!").len(), 1);
    }

    #[test]
    fn test_too_long_password() {
        let long_password = "a".repeat(MAX_PASSWORD_LENGTH) + "A1!";
        assert_eq!(password_policy_violations(&long_password).len(), 1);
    }

    #[test]
    fn test_missing_character_classes() {
        for password in ["password123!", "PASSWORD123!", "Passwordabc!", "Password1234"] {
            assert!(
                !password_policy_violations(password).is_empty(),
                "should reject {}",
                password
            );
        }
    }

    #[test]
    fn test_short_and_weak_reports_both() {
        assert_eq!(password_policy_violations("short").len(), 2);
    }
}
