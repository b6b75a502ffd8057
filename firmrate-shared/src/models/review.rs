/// Published review model
///
/// A row in `reviews` is publicly visible. New submissions never land here
/// directly; they go through `pending_reviews` (see
/// [`crate::models::pending_review`]) and an administrator moves them over
/// on approval.
///
/// # Edit window
///
/// The owner may edit or withdraw a published review for [`EDIT_WINDOW`]
/// after its timestamp. Editing resets the timestamp to now, which re-arms
/// a fresh window.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE reviews (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id),
///     rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
///     body VARCHAR(1000) NOT NULL,
///     submitted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// How long after its timestamp a review stays editable by its owner
pub const EDIT_WINDOW_DAYS: i64 = 3;

/// Returns whether the edit window is still open for a review submitted at
/// `submitted_at`, evaluated at `now`
///
/// The boundary itself is inclusive: exactly `EDIT_WINDOW_DAYS` old still
/// passes, one second past it does not.
pub fn edit_window_open(submitted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - submitted_at <= Duration::days(EDIT_WINDOW_DAYS)
}

/// A published review
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,

    pub company_id: Uuid,

    /// Author; the reserved anonymous account after anonymization
    pub user_id: Uuid,

    /// Star rating, 1-5
    pub rating: i32,

    /// Free-text body, at most 1000 characters
    pub body: String,

    /// Submission time; reset on edit, which re-arms the edit window
    pub submitted_at: DateTime<Utc>,
}

/// A published review joined with its company and author for listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewWithContext {
    pub id: Uuid,
    pub rating: i32,
    pub body: String,
    pub submitted_at: DateTime<Utc>,
    pub company_name: String,
    pub company_type: String,
    /// Author display name; None when the account has no name set
    pub author_name: Option<String>,
}

/// A user's own review joined with the company name for the account page
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OwnReview {
    pub id: Uuid,
    pub rating: i32,
    pub body: String,
    pub submitted_at: DateTime<Utc>,
    pub company_name: String,
}

impl Review {
    /// Inserts a published row
    ///
    /// Only the moderation workflow calls this (approval copies a pending
    /// row over), so it takes any executor and participates in the
    /// approval transaction. A fresh id is always assigned.
    pub async fn insert(
        executor: impl sqlx::PgExecutor<'_>,
        company_id: Uuid,
        user_id: Uuid,
        rating: i32,
        body: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (company_id, user_id, rating, body, submitted_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, company_id, user_id, rating, body, submitted_at
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .bind(rating)
        .bind(body)
        .bind(submitted_at)
        .fetch_one(executor)
        .await?;

        Ok(review)
    }

    /// Finds a review by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, company_id, user_id, rating, body, submitted_at
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(review)
    }

    /// Overwrites body, rating and timestamp of a review
    ///
    /// The timestamp is reset to now. The company aggregate is deliberately
    /// left untouched: rating points are folded in at submission time only,
    /// so an edited rating does not move `current_score`. Known
    /// inconsistency, kept as documented behavior.
    pub async fn update_content(
        pool: &PgPool,
        id: Uuid,
        rating: i32,
        body: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET rating = $2, body = $3, submitted_at = NOW()
            WHERE id = $1
            RETURNING id, company_id, user_id, rating, body, submitted_at
            "#,
        )
        .bind(id)
        .bind(rating)
        .bind(body)
        .fetch_optional(pool)
        .await?;

        Ok(review)
    }

    /// Deletes a published review
    ///
    /// Takes any executor; withdrawal and retraction run this inside their
    /// transactions.
    pub async fn delete(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes all published reviews of one user, returning the count
    ///
    /// Part of the account-deletion transaction, after the snapshots have
    /// been staged.
    pub async fn delete_by_user(
        executor: impl sqlx::PgExecutor<'_>,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists all published reviews of one user, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, company_id, user_id, rating, body, submitted_at
            FROM reviews
            WHERE user_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }

    /// Lists a user's reviews with company names for the account page,
    /// newest first
    pub async fn list_own(pool: &PgPool, user_id: Uuid) -> Result<Vec<OwnReview>, sqlx::Error> {
        let reviews = sqlx::query_as::<_, OwnReview>(
            r#"
            SELECT r.id, r.rating, r.body, r.submitted_at, c.name AS company_name
            FROM reviews r
            JOIN companies c ON c.id = r.company_id
            WHERE r.user_id = $1
            ORDER BY r.submitted_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }

    /// Lists the published reviews of one company with author names,
    /// newest first
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<ReviewWithContext>, sqlx::Error> {
        let reviews = sqlx::query_as::<_, ReviewWithContext>(
            r#"
            SELECT r.id, r.rating, r.body, r.submitted_at,
                   c.name AS company_name, c.company_type, u.name AS author_name
            FROM reviews r
            JOIN companies c ON c.id = r.company_id
            JOIN users u ON u.id = r.user_id
            WHERE r.company_id = $1
            ORDER BY r.submitted_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }

    /// Lists the most recent published reviews across all companies
    ///
    /// Backs the public homepage feed.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<ReviewWithContext>, sqlx::Error> {
        let reviews = sqlx::query_as::<_, ReviewWithContext>(
            r#"
            SELECT r.id, r.rating, r.body, r.submitted_at,
                   c.name AS company_name, c.company_type, u.name AS author_name
            FROM reviews r
            JOIN companies c ON c.id = r.company_id
            JOIN users u ON u.id = r.user_id
            ORDER BY r.submitted_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_open_for_fresh_review() {
        let now = Utc::now();
        assert!(edit_window_open(now, now));
        assert!(edit_window_open(now - Duration::hours(1), now));
    }

    #[test]
    fn test_window_open_just_inside_boundary() {
        // 2 days 23:59:59 old must still be editable
        let now = Utc::now();
        let submitted = now - (Duration::days(3) - Duration::seconds(1));
        assert!(edit_window_open(submitted, now));
    }

    #[test]
    fn test_window_inclusive_at_exact_boundary() {
        let now = Utc::now();
        let submitted = now - Duration::days(3);
        assert!(edit_window_open(submitted, now));
    }

    #[test]
    fn test_window_closed_past_boundary() {
        let now = Utc::now();
        let submitted = now - Duration::days(3) - Duration::seconds(1);
        assert!(!edit_window_open(submitted, now));

        let submitted = now - Duration::days(30);
        assert!(!edit_window_open(submitted, now));
    }
}
