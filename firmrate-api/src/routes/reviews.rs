/// Review endpoints
///
/// # Endpoints
///
/// - `GET /v1/reviews/recent` - Public homepage feed
/// - `POST /v1/reviews` - Submit a review (lands in the moderation queue)
/// - `PUT /v1/reviews/:id` - Edit an own review within the window
/// - `DELETE /v1/reviews/:id` - Withdraw an own review (anonymize)
///
/// # Submission flow
///
/// A submission never hits the published table directly: the row goes to
/// staging and the company aggregate is bumped, both inside one
/// transaction. The aggregate bump is a single guarded UPDATE, so two
/// concurrent submissions to the same company serialize on the row and
/// neither increment is lost.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use firmrate_shared::{
    auth::{authorization::require_ownership, middleware::AuthContext},
    mail::{messages, send_best_effort},
    models::{
        company::Company,
        pending_review::PendingReview,
        review::{edit_window_open, Review, ReviewWithContext},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Submit review request
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    /// Canonical company name, case-sensitive exact match
    #[validate(length(min = 1, max = 100, message = "Neplatné jméno společnosti"))]
    pub company_name: String,

    /// Star rating
    #[validate(range(min = 1, max = 5, message = "Hodnocení musí být 1 až 5"))]
    pub rating: i32,

    /// Review text
    #[validate(length(min = 1, max = 1000, message = "Příliš dlouhý text"))]
    pub body: String,
}

/// Submit review response
#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    /// Staging row id
    pub pending_id: Uuid,

    /// Company aggregate after the submission
    pub company: Company,
}

/// Edit review request
#[derive(Debug, Deserialize, Validate)]
pub struct EditReviewRequest {
    /// New star rating
    #[validate(range(min = 1, max = 5, message = "Hodnocení musí být 1 až 5"))]
    pub rating: i32,

    /// New review text
    #[validate(length(min = 1, max = 1000, message = "Příliš dlouhý text"))]
    pub body: String,
}

/// Withdraw review request
#[derive(Debug, Deserialize)]
pub struct WithdrawReviewRequest {
    /// Explicit confirmation that anonymization is understood
    pub confirm: bool,
}

/// Recent feed query parameters
#[derive(Debug, Deserialize)]
pub struct RecentParams {
    /// Maximum number of reviews to return (default 50)
    pub limit: Option<i64>,
}

/// Recent feed response
#[derive(Debug, Serialize)]
pub struct RecentReviewsResponse {
    pub reviews: Vec<ReviewWithContext>,
}

/// Public feed of the most recent published reviews
pub async fn recent_reviews(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> ApiResult<Json<RecentReviewsResponse>> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let reviews = Review::list_recent(&state.db, limit).await?;

    Ok(Json(RecentReviewsResponse { reviews }))
}

/// Submits a review for moderation
///
/// The company is resolved by case-sensitive exact name; an unknown name
/// is a 404 directing the caller to the creation flow, and leaves both
/// the staging table and the aggregate untouched.
///
/// # Errors
///
/// - `404 Not Found`: no company with that exact name
/// - `422 Unprocessable Entity`: rating out of range, text over 1000 chars
pub async fn submit_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<SubmitReviewRequest>,
) -> ApiResult<Json<SubmitReviewResponse>> {
    req.validate()?;

    let company = Company::find_by_name(&state.db, &req.company_name)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(
                "Neplatné jméno společnosti. Nejdříve přidejte novou společnost.".to_string(),
            )
        })?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown account".to_string()))?;

    // Staging insert and aggregate bump commit or roll back together
    let mut tx = state.db.begin().await?;

    let pending = PendingReview::insert(
        &mut *tx,
        company.id,
        user.id,
        req.rating,
        &req.body,
        Utc::now(),
    )
    .await?;

    let company = Company::apply_rating(&mut *tx, company.id, req.rating).await?;

    tx.commit().await?;

    tracing::info!(
        pending_id = %pending.id,
        company_id = %company.id,
        user_id = %user.id,
        rating = req.rating,
        "Review submitted for moderation"
    );

    let (subject, body) = messages::review_submitted(&company.name, &req.body, req.rating);
    send_best_effort(state.mailer.clone(), vec![user.email], subject, body);

    Ok(Json(SubmitReviewResponse {
        pending_id: pending.id,
        company,
    }))
}

/// Edits an own published review within the edit window
///
/// The timestamp resets to now, which re-arms a fresh window. The company
/// aggregate is not adjusted for the rating delta: points are folded in
/// at submission time only. Known inconsistency, preserved as documented
/// behavior.
///
/// # Errors
///
/// - `403 Forbidden`: not the owner, or `edit_window_expired`
/// - `404 Not Found`: no such review
pub async fn edit_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(review_id): Path<Uuid>,
    Json(req): Json<EditReviewRequest>,
) -> ApiResult<Json<Review>> {
    req.validate()?;

    let review = Review::find_by_id(&state.db, review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Hodnocení neexistuje".to_string()))?;

    require_ownership(&auth, review.user_id)?;

    if !edit_window_open(review.submitted_at, Utc::now()) {
        return Err(ApiError::EditWindowExpired);
    }

    let updated = Review::update_content(&state.db, review_id, req.rating, &req.body)
        .await?
        .ok_or_else(|| ApiError::NotFound("Hodnocení neexistuje".to_string()))?;

    tracing::info!(review_id = %review_id, user_id = %auth.user_id, "Review edited");

    if let Some(user) = User::find_by_id(&state.db, auth.user_id).await? {
        let company_name = Company::find_by_id(&state.db, review.company_id)
            .await?
            .map(|c| c.name)
            .unwrap_or_default();
        let (subject, body) = messages::review_edited(&company_name, &req.body, req.rating);
        send_best_effort(state.mailer.clone(), vec![user.email], subject, body);
    }

    Ok(Json(updated))
}

/// Withdraws an own published review
///
/// The review text stays on the site: a snapshot is staged under the
/// reserved anonymous account for the moderators to re-publish or drop,
/// and the original attributed row is deleted. The owner's email is
/// resolved before the mutation, since the linkage is gone afterwards.
///
/// # Errors
///
/// - `400 Bad Request`: missing confirmation
/// - `403 Forbidden`: not the owner, or `edit_window_expired`
/// - `404 Not Found`: no such review
pub async fn withdraw_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(review_id): Path<Uuid>,
    Json(req): Json<WithdrawReviewRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if !req.confirm {
        return Err(ApiError::BadRequest("Neplatně zadané údaje".to_string()));
    }

    let review = Review::find_by_id(&state.db, review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Hodnocení neexistuje".to_string()))?;

    require_ownership(&auth, review.user_id)?;

    if !edit_window_open(review.submitted_at, Utc::now()) {
        return Err(ApiError::EditWindowExpired);
    }

    // Owner email and company name have to be read while the attributed
    // row still exists
    let owner_email = User::find_by_id(&state.db, review.user_id)
        .await?
        .map(|u| u.email);
    let company_name = Company::find_by_id(&state.db, review.company_id)
        .await?
        .map(|c| c.name)
        .unwrap_or_default();

    let anonymous_id = state.config.app.anonymous_user_id;

    let mut tx = state.db.begin().await?;

    PendingReview::insert(
        &mut *tx,
        review.company_id,
        anonymous_id,
        review.rating,
        &review.body,
        review.submitted_at,
    )
    .await?;

    Review::delete(&mut *tx, review_id).await?;

    tx.commit().await?;

    tracing::info!(review_id = %review_id, user_id = %auth.user_id, "Review withdrawn and anonymized");

    if let Some(email) = owner_email {
        let (subject, body) = messages::review_withdrawn(&company_name);
        send_best_effort(state.mailer.clone(), vec![email], subject, body);
    }

    Ok(Json(serde_json::json!({
        "withdrawn": true,
        "review_id": review_id,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_validation() {
        let valid = SubmitReviewRequest {
            company_name: "Alza".to_string(),
            rating: 4,
            body: "Rychlé dodání, dobré ceny.".to_string(),
        };
        assert!(valid.validate().is_ok());

        let rating_low = SubmitReviewRequest {
            company_name: "Alza".to_string(),
            rating: 0,
            body: "text".to_string(),
        };
        assert!(rating_low.validate().is_err());

        let rating_high = SubmitReviewRequest {
            company_name: "Alza".to_string(),
            rating: 6,
            body: "text".to_string(),
        };
        assert!(rating_high.validate().is_err());
    }

    #[test]
    fn test_submit_request_body_bounds() {
        let at_limit = SubmitReviewRequest {
            company_name: "Alza".to_string(),
            rating: 3,
            body: "x".repeat(1000),
        };
        assert!(at_limit.validate().is_ok());

        let over_limit = SubmitReviewRequest {
            company_name: "Alza".to_string(),
            rating: 3,
            body: "x".repeat(1001),
        };
        assert!(over_limit.validate().is_err());
    }

    #[test]
    fn test_edit_request_validation() {
        let valid = EditReviewRequest {
            rating: 5,
            body: "Po reklamaci vše v pořádku.".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_body = EditReviewRequest {
            rating: 5,
            body: "".to_string(),
        };
        assert!(empty_body.validate().is_err());
    }
}
