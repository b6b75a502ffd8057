/// Database models
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, roles and authentication data
/// - `company`: Company profiles with the incremental aggregate rating
/// - `review`: Published reviews and the edit-window rule
/// - `pending_review`: Moderation staging table
///
/// # Example
///
/// ```no_run
/// use firmrate_shared::models::user::{CreateUser, User, UserRole};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         email: "user@example.com".to_string(),
///         name: None,
///         password_hash: "$argon2id$...".to_string(),
///         role: UserRole::User,
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod company;
pub mod pending_review;
pub mod review;
pub mod user;
