/// Registration input validators
///
/// Every check reports into a [`FieldErrors`] collection so a rejected
/// registration lists all of its problems at once.

use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::password_policy_violations;
use crate::error::FieldErrors;

const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321

pub const DEFAULT_ROLE: &str = "User";
/// Roles seeded into every deployment
pub const KNOWN_ROLES: &[&str] = &["User", "Administrator"];

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    static ref USER_NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Require a value, trim it, and return it if present
pub fn required<'a>(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.add(field, format!("{} is required", label));
            None
        }
    }
}

/// First and last names: 2-50 characters, no control characters
pub fn check_person_name(errors: &mut FieldErrors, field: &str, label: &str, name: &str) {
    let length = name.chars().count();
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&length) {
        errors.add(
            field,
            format!(
                "{} must be between {} and {} characters",
                label, MIN_NAME_LENGTH, MAX_NAME_LENGTH
            ),
        );
    }

    if name.chars().any(|c| c.is_control()) {
        errors.add(field, format!("{} contains invalid characters", label));
    }
}

/// Usernames: 2-50 characters of letters, digits, underscores and hyphens
pub fn check_user_name(errors: &mut FieldErrors, user_name: &str) {
    let length = user_name.chars().count();
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&length) {
        errors.add(
            "userName",
            format!(
                "UserName must be between {} and {} characters",
                MIN_NAME_LENGTH, MAX_NAME_LENGTH
            ),
        );
    }

    if !USER_NAME_REGEX.is_match(user_name) {
        errors.add(
            "userName",
            "Username can only contain letters, numbers, underscores and hyphens",
        );
    }
}

pub fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.len() > MAX_EMAIL_LENGTH
        || email.contains('\0')
        || email.matches('@').count() != 1
        || !EMAIL_REGEX.is_match(email)
    {
        errors.add("email", "Invalid email format");
    }
}

pub fn check_password(errors: &mut FieldErrors, password: &str) {
    for violation in password_policy_violations(password) {
        errors.add("password", violation);
    }
}

/// Resolve requested roles, falling back to [`DEFAULT_ROLE`].
///
/// Unknown roles are reported; duplicates collapse to one entry.
pub fn resolve_roles(errors: &mut FieldErrors, requested: Option<&[String]>) -> Vec<String> {
    let requested = match requested {
        Some(roles) if !roles.is_empty() => roles,
        _ => return vec![DEFAULT_ROLE.to_string()],
    };

    let mut roles: Vec<String> = Vec::with_capacity(requested.len());
    for role in requested {
        match KNOWN_ROLES.iter().find(|known| known.eq_ignore_ascii_case(role.trim())) {
            Some(known) => {
                if !roles.iter().any(|r| r == known) {
                    roles.push(known.to_string());
                }
            }
            None => errors.add("roles", format!("Role '{}' does not exist", role)),
        }
    }
    roles
}
