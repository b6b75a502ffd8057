/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user, send welcome mail
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Json};
use firmrate_shared::{
    auth::{jwt, password},
    email::normalize_email,
    mail::{messages, send_best_effort},
    models::user::{CreateUser, User, UserRole},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address (validated and normalized before storage)
    pub email: String,

    /// Password
    pub password: String,

    /// Password repeated, must match
    pub confirmation: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Jméno je příliš dlouhé"))]
    pub name: Option<String>,

    /// Whether the account represents a company
    #[serde(default)]
    pub register_company: bool,
}

/// Register / login response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// User ID
    pub user_id: String,

    /// Account role
    pub role: UserRole,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Password
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Register a new user
///
/// The email address is validated syntactically and normalized to its
/// canonical lowercase form before storage. The `register_company` flag
/// selects the `company` role; admin accounts are never created here.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: invalid email, weak password, mismatch
/// - `409 Conflict`: email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    if req.password != req.confirmation {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "confirmation".to_string(),
            message: "Heslo a opakování se neshodují".to_string(),
        }]));
    }

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let email = normalize_email(&req.email)?;

    let role = if req.register_company {
        UserRole::Company
    } else {
        UserRole::User
    };

    let password_hash = password::hash_password(&req.password, &state.config.hash_cost())?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: email.clone(),
            name: req.name,
            password_hash,
            role,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, role = role.as_str(), "User registered");

    let (subject, body) = messages::welcome();
    send_best_effort(state.mailer.clone(), vec![email], subject, body);

    let access_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        user_id: user.id.to_string(),
        role: user.role,
        access_token,
        refresh_token,
    }))
}

/// Login endpoint
///
/// The same message covers an unknown email and a wrong password, so the
/// response does not reveal which accounts exist.
///
/// # Errors
///
/// - `401 Unauthorized`: invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Musíte zadat emailovou adresu a heslo".to_string(),
        ));
    }

    // Stored addresses are normalized, so normalize the lookup key too
    let email = req.email.trim().to_lowercase();
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Neplatný email nebo heslo".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Neplatný email nebo heslo".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let access_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.role, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        user_id: user.id.to_string(),
        role: user.role,
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_name_length() {
        let valid = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "dlouheheslo".to_string(),
            confirmation: "dlouheheslo".to_string(),
            name: Some("Jana".to_string()),
            register_company: false,
        };
        assert!(valid.validate().is_ok());

        let invalid = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "dlouheheslo".to_string(),
            confirmation: "dlouheheslo".to_string(),
            name: Some("x".repeat(101)),
            register_company: false,
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_register_company_flag_default() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@b.cz","password":"dlouheheslo","confirmation":"dlouheheslo"}"#,
        )
        .unwrap();
        assert!(!req.register_company);
    }
}
