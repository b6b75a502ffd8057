/// Authorization guards
///
/// Two checks cover the whole permission model of the service:
///
/// 1. **Admin gate**: every moderation action requires the acting user's
///    *stored* role to be `admin`. The check goes to the database rather
///    than trusting the token's role claim, and it fails closed: a missing
///    user row (e.g. deleted account with a still-unexpired token) is a
///    denial, not an error path that lets the request through. Any account
///    with the admin role passes — admin identity is the role, not one
///    specific row.
/// 2. **Ownership gate**: users may only edit or withdraw their own
///    reviews.
///
/// # Example
///
/// ```no_run
/// use firmrate_shared::auth::authorization::require_admin;
/// use firmrate_shared::auth::middleware::AuthContext;
/// use sqlx::PgPool;
///
/// async fn moderate(pool: &PgPool, auth: &AuthContext) -> Result<(), Box<dyn std::error::Error>> {
///     require_admin(pool, auth).await?;
///     // ... queue operation
///     Ok(())
/// }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::User;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Acting user is not an administrator
    #[error("Administrator access required")]
    NotAdmin,

    /// User doesn't own the resource
    #[error("Not authorized to access this resource")]
    NotOwner,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Requires the acting user's stored role to be `admin`
///
/// # Errors
///
/// Returns `AuthzError::NotAdmin` when the user does not exist or their
/// stored role is anything but `admin`.
pub async fn require_admin(pool: &PgPool, auth: &AuthContext) -> Result<(), AuthzError> {
    let user = User::find_by_id(pool, auth.user_id).await?;

    match user {
        Some(user) if user.role.is_admin() => Ok(()),
        _ => Err(AuthzError::NotAdmin),
    }
}

/// Requires the resource's owner to be the acting user
pub fn require_ownership(auth: &AuthContext, resource_owner_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id != resource_owner_id {
        return Err(AuthzError::NotOwner);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    #[test]
    fn test_require_ownership_same_user() {
        let user_id = Uuid::new_v4();
        let auth = AuthContext {
            user_id,
            role: UserRole::User,
        };

        assert!(require_ownership(&auth, user_id).is_ok());
    }

    #[test]
    fn test_require_ownership_different_user() {
        let auth = AuthContext {
            user_id: Uuid::new_v4(),
            role: UserRole::User,
        };

        assert!(matches!(
            require_ownership(&auth, Uuid::new_v4()),
            Err(AuthzError::NotOwner)
        ));
    }

    #[test]
    fn test_authz_error_display() {
        assert!(AuthzError::NotAdmin.to_string().contains("Administrator"));
        assert!(AuthzError::NotOwner.to_string().contains("Not authorized"));
    }

    // require_admin's fail-closed behavior (deleted account, non-admin
    // roles) is covered by the integration tests in firmrate-api/tests/.
}
