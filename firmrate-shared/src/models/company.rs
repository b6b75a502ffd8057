/// Company model with its incrementally maintained aggregate rating
///
/// # Schema
///
/// ```sql
/// CREATE TABLE companies (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL UNIQUE,
///     company_type VARCHAR(100) NOT NULL,
///     location VARCHAR(100) NOT NULL,
///     website VARCHAR(100),
///     address VARCHAR(100),
///     points_total BIGINT NOT NULL DEFAULT 0,
///     number_of_reviews BIGINT NOT NULL DEFAULT 0,
///     current_score DOUBLE PRECISION NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Aggregate invariant
///
/// `current_score == points_total / number_of_reviews` whenever
/// `number_of_reviews > 0`. The three columns are written only by
/// [`Company::apply_rating`], which runs as a single UPDATE so concurrent
/// submissions serialize on the row and cannot lose an increment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Company profile and aggregate rating state
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    pub id: Uuid,

    /// Canonical company name, unique
    pub name: String,

    /// Free-form company type (e.g. "Stavebnictví")
    pub company_type: String,

    /// Region the company operates in
    pub location: String,

    pub website: Option<String>,

    pub address: Option<String>,

    /// Sum of all rating values ever contributed
    pub points_total: i64,

    /// Count of accepted ratings
    pub number_of_reviews: i64,

    /// Running average, points_total / number_of_reviews
    pub current_score: f64,

    pub created_at: DateTime<Utc>,
}

/// Input for registering a new company
#[derive(Debug, Clone)]
pub struct CreateCompany {
    pub name: String,
    pub company_type: String,
    pub location: String,
    pub website: Option<String>,
    pub address: Option<String>,
}

impl Company {
    /// Creates a new company with a zeroed aggregate
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken (unique constraint
    /// violation) or the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateCompany) -> Result<Self, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, company_type, location, website, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, company_type, location, website, address,
                      points_total, number_of_reviews, current_score, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.company_type)
        .bind(data.location)
        .bind(data.website)
        .bind(data.address)
        .fetch_one(pool)
        .await?;

        Ok(company)
    }

    /// Finds a company by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, company_type, location, website, address,
                   points_total, number_of_reviews, current_score, created_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(company)
    }

    /// Finds a company by its canonical name, case-sensitive exact match
    ///
    /// Review submission resolves the target company this way: a name that
    /// does not match exactly is "not found" and the caller is directed to
    /// the company creation flow instead.
    ///
    /// The column is VARCHAR (not CITEXT), so `=` is case-sensitive here.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, company_type, location, website, address,
                   points_total, number_of_reviews, current_score, created_at
            FROM companies
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(company)
    }

    /// Lists all company names
    ///
    /// Callers sort the result with the locale collator; Postgres' own
    /// ordering depends on the server locale and is not diacritic-correct
    /// for Czech, so ordering is done application-side.
    pub async fn list_names(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM companies")
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Case-insensitive substring search over company names
    ///
    /// `ILIKE` metacharacters in the needle are escaped so user input is
    /// always matched literally.
    pub async fn search_by_name(pool: &PgPool, needle: &str) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(needle));

        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, company_type, location, website, address,
                   points_total, number_of_reviews, current_score, created_at
            FROM companies
            WHERE name ILIKE $1
            "#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(companies)
    }

    /// Folds one accepted rating into the company aggregate
    ///
    /// Runs as a single UPDATE reading and writing the aggregate columns in
    /// place: `points_total += rating`, `number_of_reviews += 1`, and
    /// `current_score` recomputed from the new values. Row-level locking in
    /// Postgres serializes concurrent submissions to the same company, so
    /// no increment can be lost.
    ///
    /// Takes any executor because submission wraps the pending insert and
    /// this update in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::RowNotFound` if the company does not exist.
    pub async fn apply_rating(
        executor: impl sqlx::PgExecutor<'_>,
        id: Uuid,
        rating: i32,
    ) -> Result<Self, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET points_total = points_total + $2,
                number_of_reviews = number_of_reviews + 1,
                current_score = (points_total + $2)::double precision
                                / (number_of_reviews + 1)
            WHERE id = $1
            RETURNING id, name, company_type, location, website, address,
                      points_total, number_of_reviews, current_score, created_at
            "#,
        )
        .bind(id)
        .bind(rating as i64)
        .fetch_one(executor)
        .await?;

        Ok(company)
    }
}

/// Escapes `%`, `_` and the escape character itself for a LIKE/ILIKE pattern
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_passthrough() {
        assert_eq!(escape_like("Seznam"), "Seznam");
        assert_eq!(escape_like("ČEZ a.s."), "ČEZ a.s.");
    }

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    // apply_rating arithmetic and the no-lost-update property are covered
    // by the integration tests in firmrate-api/tests/.
}
