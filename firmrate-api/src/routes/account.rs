/// Account endpoints
///
/// # Endpoints
///
/// - `GET /v1/account` - Profile plus own reviews with edit-window state
/// - `POST /v1/account/email` - Change email address
/// - `POST /v1/account/password` - Change password
/// - `POST /v1/account/data-request` - Request a copy of stored data
/// - `DELETE /v1/account` - Delete the account, anonymizing all reviews

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use firmrate_shared::{
    auth::{middleware::AuthContext, password},
    email::normalize_email,
    mail::{messages, send_best_effort},
    models::{
        pending_review::PendingReview,
        review::{edit_window_open, OwnReview, Review},
        user::{User, UserRole},
    },
};
use serde::{Deserialize, Serialize};

/// Profile fields safe to return to the client
#[derive(Debug, Serialize)]
pub struct AccountProfile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for AccountProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// An own review with its edit-window state
#[derive(Debug, Serialize)]
pub struct AnnotatedReview {
    #[serde(flatten)]
    pub review: OwnReview,

    /// Whether the 3-day edit window is still open
    pub editable: bool,
}

/// Account overview response
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user: AccountProfile,
    pub reviews: Vec<AnnotatedReview>,
}

/// Change email request
///
/// Field names mirror the original form: the current address and password
/// re-authenticate the caller, the new address is entered twice.
#[derive(Debug, Deserialize)]
pub struct ChangeEmailRequest {
    pub current_email: String,
    pub password: String,
    pub new_email: String,
    pub new_email_again: String,
}

/// Change password request
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub email: String,
    pub password: String,
    pub new_password: String,
    pub new_password_again: String,
}

/// Delete account request
#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    /// Agreement with the deletion conditions
    pub confirm: bool,
}

/// Account deletion summary
#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    pub deleted: bool,

    /// How many published reviews were anonymized into staging
    pub reviews_anonymized: u64,
}

/// Account overview: profile and own reviews, newest first, each
/// annotated with whether it can still be edited
pub async fn account_overview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<AccountResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown account".to_string()))?;

    let now = Utc::now();
    let reviews = Review::list_own(&state.db, auth.user_id)
        .await?
        .into_iter()
        .map(|review| {
            let editable = edit_window_open(review.submitted_at, now);
            AnnotatedReview { review, editable }
        })
        .collect();

    Ok(Json(AccountResponse {
        user: user.into(),
        reviews,
    }))
}

/// Changes the account email address
///
/// Requires the current address and password so a hijacked session alone
/// cannot redirect the account. Confirmation goes to both the old and the
/// new address.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: missing fields, same address, mismatch,
///   invalid new address
/// - `401 Unauthorized`: wrong current email or password
/// - `409 Conflict`: new address already in use
pub async fn change_email(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangeEmailRequest>,
) -> ApiResult<Json<AccountProfile>> {
    if req.current_email.is_empty()
        || req.password.is_empty()
        || req.new_email.is_empty()
        || req.new_email_again.is_empty()
    {
        return Err(ApiError::BadRequest("Chybějící údaje".to_string()));
    }

    if req.current_email == req.new_email {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "new_email".to_string(),
            message: "Nový email nemůže být stejný jako ten původní".to_string(),
        }]));
    }

    if req.new_email != req.new_email_again {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "new_email_again".to_string(),
            message: "Zadané nové emaily se neshodují".to_string(),
        }]));
    }

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown account".to_string()))?;

    // The claimed current address must belong to the caller; without this
    // a password from one account could rewrite another's email
    if !user.email.eq_ignore_ascii_case(req.current_email.trim()) {
        return Err(ApiError::Unauthorized(
            "Současná emailová adresa je neplatná".to_string(),
        ));
    }

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Neplatný email nebo heslo".to_string(),
        ));
    }

    let new_email = normalize_email(&req.new_email)?;

    let updated = User::update_email(&state.db, auth.user_id, &new_email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown account".to_string()))?;

    tracing::info!(user_id = %auth.user_id, "Email address changed");

    let (subject, body) = messages::email_changed(&user.email, &new_email);
    send_best_effort(
        state.mailer.clone(),
        vec![new_email, user.email],
        subject,
        body,
    );

    Ok(Json(updated.into()))
}

/// Changes the account password
///
/// # Errors
///
/// - `422 Unprocessable Entity`: mismatch, weak or unchanged password
/// - `401 Unauthorized`: wrong email or current password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if req.email.is_empty()
        || req.password.is_empty()
        || req.new_password.is_empty()
        || req.new_password_again.is_empty()
    {
        return Err(ApiError::BadRequest("Chybějící údaje".to_string()));
    }

    if req.new_password != req.new_password_again {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "new_password_again".to_string(),
            message: "Nové heslo se neshoduje s jeho opakováním".to_string(),
        }]));
    }

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown account".to_string()))?;

    if !user.email.eq_ignore_ascii_case(req.email.trim()) {
        return Err(ApiError::Unauthorized("Neplatný email".to_string()));
    }

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Zadané heslo je neplatné".to_string(),
        ));
    }

    if password::verify_password(&req.new_password, &user.password_hash)? {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "new_password".to_string(),
            message: "Nové heslo se musí lišit od toho původního".to_string(),
        }]));
    }

    password::validate_password_strength(&req.new_password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "new_password".to_string(),
            message: e,
        }])
    })?;

    let new_hash = password::hash_password(&req.new_password, &state.config.hash_cost())?;
    User::update_password(&state.db, auth.user_id, &new_hash).await?;

    tracing::info!(user_id = %auth.user_id, "Password changed");

    let (subject, body) = messages::password_changed();
    send_best_effort(state.mailer.clone(), vec![user.email], subject, body);

    Ok(Json(serde_json::json!({ "changed": true })))
}

/// Requests a copy of the caller's stored data
///
/// Confirms to the user by mail and notifies every administrator account
/// that the request has to be fulfilled within 30 days. Fulfilment itself
/// is a manual process.
pub async fn request_data_copy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown account".to_string()))?;

    let (subject, body) = messages::data_request_confirmation();
    send_best_effort(state.mailer.clone(), vec![user.email.clone()], subject, body);

    let admins = User::admin_emails(&state.db).await?;
    let (subject, body) =
        messages::data_request_admin_notice(&user.email, &user.id.to_string());
    send_best_effort(state.mailer.clone(), admins, subject, body);

    tracing::info!(user_id = %auth.user_id, "Data copy requested");

    Ok(Json(serde_json::json!({ "requested": true })))
}

/// Deletes the account
///
/// In one transaction, over the caller's ENTIRE review set: anonymized
/// snapshots of all published reviews are staged under the reserved
/// anonymous account, the originals are deleted, any rows still waiting
/// in the moderation queue are reassigned to the anonymous account, and
/// the user row is removed. The confirmation address is resolved first,
/// since the account is gone afterwards.
///
/// # Errors
///
/// - `400 Bad Request`: deletion conditions not confirmed
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<DeleteAccountRequest>,
) -> ApiResult<Json<DeleteAccountResponse>> {
    if !req.confirm {
        return Err(ApiError::BadRequest(
            "Chybně zadaná data. Musíte souhlasit s podmínkami.".to_string(),
        ));
    }

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown account".to_string()))?;

    let anonymous_id = state.config.app.anonymous_user_id;
    if user.id == anonymous_id {
        return Err(ApiError::Forbidden(
            "The reserved account cannot be deleted".to_string(),
        ));
    }

    let mut tx = state.db.begin().await?;

    let staged = PendingReview::stage_all_for_user(&mut *tx, user.id, anonymous_id).await?;
    Review::delete_by_user(&mut *tx, user.id).await?;
    PendingReview::anonymize_by_user(&mut *tx, user.id, anonymous_id).await?;
    User::delete(&mut *tx, user.id).await?;

    tx.commit().await?;

    tracing::info!(
        user_id = %user.id,
        reviews_anonymized = staged,
        "Account deleted"
    );

    let (subject, body) = messages::account_deleted();
    send_best_effort(state.mailer.clone(), vec![user.email], subject, body);

    Ok(Json(DeleteAccountResponse {
        deleted: true,
        reviews_anonymized: staged,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_hides_password_hash() {
        let profile = AccountProfile {
            id: "id".to_string(),
            email: "user@example.com".to_string(),
            name: None,
            role: UserRole::User,
            created_at: Utc::now(),
            last_login_at: None,
        };

        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("user@example.com"));
    }

    #[test]
    fn test_annotated_review_flattens() {
        let annotated = AnnotatedReview {
            review: OwnReview {
                id: uuid::Uuid::new_v4(),
                rating: 4,
                body: "text".to_string(),
                submitted_at: Utc::now(),
                company_name: "Alza".to_string(),
            },
            editable: true,
        };

        let json = serde_json::to_value(&annotated).unwrap();
        assert_eq!(json["editable"], true);
        assert_eq!(json["company_name"], "Alza");
    }
}
