/// Pending review staging model
///
/// Same shape as a published review; presence in `pending_reviews` IS the
/// pending state. Rows are created by submission, by user withdrawal
/// (anonymized snapshot of a published row), and by account deletion, and
/// are consumed when an administrator approves or rejects them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A review awaiting moderation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PendingReview {
    pub id: Uuid,

    pub company_id: Uuid,

    /// Submitter, or the reserved anonymous account for anonymized snapshots
    pub user_id: Uuid,

    /// Star rating, 1-5
    pub rating: i32,

    /// Free-text body, at most 1000 characters
    pub body: String,

    /// Original submission time, carried through moderation unchanged
    pub submitted_at: DateTime<Utc>,
}

impl PendingReview {
    /// Inserts a staging row
    ///
    /// Takes any executor: submission, withdrawal and account deletion all
    /// run this inside a transaction together with their other statements.
    pub async fn insert(
        executor: impl sqlx::PgExecutor<'_>,
        company_id: Uuid,
        user_id: Uuid,
        rating: i32,
        body: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let pending = sqlx::query_as::<_, PendingReview>(
            r#"
            INSERT INTO pending_reviews (company_id, user_id, rating, body, submitted_at)
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

        Ok(pending)
    }

    /// Finds a staging row by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let pending = sqlx::query_as::<_, PendingReview>(
            r#"
            SELECT id, company_id, user_id, rating, body, submitted_at
            FROM pending_reviews
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(pending)
    }

    /// Lists the whole moderation queue, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let pending = sqlx::query_as::<_, PendingReview>(
            r#"
            SELECT id, company_id, user_id, rating, body, submitted_at
            FROM pending_reviews
            ORDER BY submitted_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(pending)
    }

    /// Deletes a staging row
    ///
    /// Approval and rejection both end with this; approval runs it in the
    /// same transaction as the published insert.
    pub async fn delete(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pending_reviews WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stages anonymized snapshots of ALL of a user's published reviews
    ///
    /// One set-based insert: account deletion is a batch operation over
    /// the user's entire review set, not a per-row loop. Returns the
    /// number of snapshots created.
    pub async fn stage_all_for_user(
        executor: impl sqlx::PgExecutor<'_>,
        user_id: Uuid,
        anonymous_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO pending_reviews (company_id, user_id, rating, body, submitted_at)
            SELECT company_id, $2, rating, body, submitted_at
            FROM reviews
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(anonymous_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Reassigns all of a user's staging rows to the anonymous account
    ///
    /// Account deletion calls this so rows still in the queue do not block
    /// removing the user row.
    pub async fn anonymize_by_user(
        executor: impl sqlx::PgExecutor<'_>,
        user_id: Uuid,
        anonymous_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE pending_reviews
            SET user_id = $2
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(anonymous_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

}

#[cfg(test)]
mod tests {
    // Staging behavior is exercised end-to-end (submit, approve, reject,
    // withdraw, account deletion) by the integration tests in
    // firmrate-api/tests/.
}
