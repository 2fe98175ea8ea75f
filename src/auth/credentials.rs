/// Credential Verification
///
/// Checks a username/password pair against the user store and hands back
/// the verified identity, which the caller passes on to token issuance.

use crate::auth::password::verify_password;
use crate::error::AppError;
use crate::store::{Identity, UserStore};

/// Verify `user_name`/`password` against the stored identity.
///
/// Returns `Ok(None)` for an unknown user and for a wrong password alike,
/// so callers cannot tell the two apart.
///
/// # Errors
/// Only store failures and unreadable password hashes are errors.
pub async fn verify_credentials(
    store: &dyn UserStore,
    user_name: &str,
    password: &str,
) -> Result<Option<Identity>, AppError> {
    let Some(identity) = store.find_by_user_name(user_name).await? else {
        tracing::warn!(user_name = %user_name, "Authentication failed: unknown user name");
        return Ok(None);
    };

    if !verify_password(password, &identity.password_hash)? {
        tracing::warn!(user_name = %user_name, "Authentication failed: wrong password");
        return Ok(None);
    }

    Ok(Some(identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password_with_cost;
    use crate::store::{InMemoryUserStore, NewIdentity};

    async fn store_with_user(user_name: &str, password: &str) -> InMemoryUserStore {
        let store = InMemoryUserStore::new();
        store
            .create(NewIdentity {
                user_name: user_name.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: "test@example.com".to_string(),
                password_hash: hash_password_with_cost(password, 4).unwrap(),
                roles: vec!["User".to_string()],
            })
            .await
            .expect("Failed to seed user");
        store
    }

    #[tokio::test]
    async fn test_correct_credentials_return_identity() {
        let store = store_with_user("testuser", "Password123!").await;

        let identity = verify_credentials(&store, "testuser", "Password123!")
            .await
            .unwrap()
            .expect("credentials should verify");
        assert_eq!(identity.user_name, "testuser");
    }

    #[tokio::test]
    async fn test_wrong_password_returns_none() {
        let store = store_with_user("testuser", "Password123!").await;

        let result = verify_credentials(&store, "testuser", "WrongPassword").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_user_returns_none() {
        let store = store_with_user("testuser", "Password123!").await;

        let result = verify_credentials(&store, "nonexistentuser", "Password123!")
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
