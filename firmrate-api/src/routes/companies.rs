/// Company endpoints
///
/// # Endpoints
///
/// - `POST /v1/companies` - Register a company (authenticated)
/// - `GET /v1/companies` - All names, collation-sorted
/// - `GET /v1/companies/search?q=` - Substring search with disambiguation

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use firmrate_shared::{
    auth::middleware::AuthContext,
    models::{
        company::{Company, CreateCompany},
        review::{Review, ReviewWithContext},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create company request
///
/// Field lengths mirror the column widths; website and address are
/// optional.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 100, message = "Neplatné jméno společnosti"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Neplatný typ společnosti"))]
    pub company_type: String,

    #[validate(length(min = 1, max = 100, message = "Neplatné umístění společnosti"))]
    pub location: String,

    #[validate(length(max = 100, message = "Příliš obsáhlý vstup"))]
    pub website: Option<String>,

    #[validate(length(max = 100, message = "Příliš obsáhlý vstup"))]
    pub address: Option<String>,
}

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Substring to match against company names, case-insensitive
    pub q: String,
}

/// Search outcome
///
/// A single match resolves to the full profile with its published
/// reviews; several matches return only the candidates so the caller can
/// disambiguate.
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SearchResponse {
    /// Exactly one company matched
    Single {
        company: Company,
        reviews: Vec<ReviewWithContext>,
    },

    /// Multiple companies matched; pick one and search again
    Multiple { companies: Vec<Company> },
}

/// Company names response
#[derive(Debug, Serialize)]
pub struct CompanyNamesResponse {
    pub names: Vec<String>,
}

/// Registers a new company
///
/// # Errors
///
/// - `422 Unprocessable Entity`: missing or oversized fields
/// - `409 Conflict`: company name already registered
pub async fn create_company(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCompanyRequest>,
) -> ApiResult<Json<Company>> {
    req.validate()?;

    let company = Company::create(
        &state.db,
        CreateCompany {
            name: req.name,
            company_type: req.company_type,
            location: req.location,
            website: req.website.filter(|w| !w.is_empty()),
            address: req.address.filter(|a| !a.is_empty()),
        },
    )
    .await?;

    tracing::info!(
        company_id = %company.id,
        company_name = %company.name,
        user_id = %auth.user_id,
        "Company registered"
    );

    Ok(Json(company))
}

/// Lists all company names, sorted with the locale collator
pub async fn list_companies(
    State(state): State<AppState>,
) -> ApiResult<Json<CompanyNamesResponse>> {
    let mut names = Company::list_names(&state.db).await?;
    state.collator.sort(&mut names);

    Ok(Json(CompanyNamesResponse { names }))
}

/// Case-insensitive substring search over company names
///
/// # Errors
///
/// - `400 Bad Request`: empty query
/// - `404 Not Found`: nothing matched — the caller is expected to offer
///   the company creation flow
pub async fn search_companies(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    if params.q.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Musíte vložit jméno společnosti".to_string(),
        ));
    }

    let mut matches = Company::search_by_name(&state.db, params.q.trim()).await?;

    match matches.len() {
        0 => Err(ApiError::NotFound(
            "Tato společnost zatím neexistuje. Přidejte ji.".to_string(),
        )),
        1 => {
            let company = matches.remove(0);
            let reviews = Review::list_by_company(&state.db, company.id).await?;
            Ok(Json(SearchResponse::Single { company, reviews }))
        }
        _ => {
            state.collator.sort_by_key(&mut matches, |c| &c.name);
            Ok(Json(SearchResponse::Multiple { companies: matches }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_company_request_validation() {
        let valid = CreateCompanyRequest {
            name: "Alza".to_string(),
            company_type: "E-commerce".to_string(),
            location: "Hlavní město Praha".to_string(),
            website: Some("https://alza.cz".to_string()),
            address: None,
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateCompanyRequest {
            name: "".to_string(),
            company_type: "E-commerce".to_string(),
            location: "Hlavní město Praha".to_string(),
            website: None,
            address: None,
        };
        assert!(empty_name.validate().is_err());

        let oversized = CreateCompanyRequest {
            name: "x".repeat(101),
            company_type: "E-commerce".to_string(),
            location: "Hlavní město Praha".to_string(),
            website: None,
            address: None,
        };
        assert!(oversized.validate().is_err());
    }

    #[test]
    fn test_search_response_tagging() {
        let response = SearchResponse::Multiple { companies: vec![] };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"result\":\"multiple\""));
    }
}
