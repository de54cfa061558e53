use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::company::{Company, SocialPlatform, TeamSizeBucket};
use crate::directory::{CompanyListing, Directory, IngestSummary};
use crate::query::{self, CategoryGroup, FilterState, QueryInput, SortKey};

pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub directory: Directory,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/companies", get(list_companies))
        .route("/api/companies/query", post(query_companies))
        .route("/api/facets", get(facets))
        .route("/admin/reload", post(admin_reload))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unavailable(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m),
        };
        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

async fn list_companies(State(state): State<AppState>) -> Json<CompanyListing> {
    Json(state.directory.list_companies())
}

/// Body of `POST /api/companies/query`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryRequest {
    pub search_term: String,
    pub industries: Vec<String>,
    pub locations: Vec<String>,
    pub team_sizes: Vec<String>,
    pub founded_years: Vec<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl QueryRequest {
    pub fn to_query(&self) -> Result<QueryInput, ApiError> {
        let sort = match self.sort.as_deref() {
            None | Some("") => SortKey::default(),
            Some(s) => SortKey::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown sort key '{s}'")))?,
        };
        let team_sizes = self
            .team_sizes
            .iter()
            .map(|t| {
                TeamSizeBucket::parse(t)
                    .ok_or_else(|| ApiError::BadRequest(format!("unknown team size bucket '{t}'")))
            })
            .collect::<Result<_, _>>()?;
        Ok(QueryInput {
            search_term: self.search_term.clone(),
            filters: FilterState {
                industries: self.industries.iter().cloned().collect(),
                locations: self.locations.iter().cloned().collect(),
                team_sizes,
                founded_years: self.founded_years.iter().cloned().collect(),
            },
            sort,
        })
    }
}

/// A company plus the derived fields a card needs.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompanyView<'a> {
    #[serde(flatten)]
    company: &'a Company,
    industry_tags: Vec<&'a str>,
    website_display: &'a str,
    social_platform: Option<SocialPlatform>,
}

impl<'a> From<&'a Company> for CompanyView<'a> {
    fn from(company: &'a Company) -> Self {
        Self {
            company,
            industry_tags: company.industry_tags().collect(),
            website_display: company.website_display(),
            social_platform: company.social_platform(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse<'a> {
    total: usize,
    page: usize,
    page_size: usize,
    has_more: bool,
    companies: Vec<CompanyView<'a>>,
}

async fn query_companies(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Response, ApiError> {
    let q = req.to_query()?;
    let page_size = req.page_size.unwrap_or(state.directory.page_size());
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ApiError::BadRequest(format!(
            "pageSize must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    let page = req.page.unwrap_or(1).max(1);
    counter!("directory_queries_total").increment(1);

    let listing = state.directory.list_companies();
    let matches = query::filter_and_sort(&listing.companies, &q);
    let window = query::page_window(&matches, page, page_size);

    let body = QueryResponse {
        total: matches.len(),
        page,
        page_size,
        has_more: matches.len() > window.len(),
        companies: window.iter().map(|c| CompanyView::from(*c)).collect(),
    };
    Ok(Json(body).into_response())
}

#[derive(Serialize)]
struct FacetGroupOut {
    options: Vec<String>,
    categories: Vec<CategoryGroup>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FacetsResponse {
    industries: FacetGroupOut,
    locations: FacetGroupOut,
    team_sizes: Vec<TeamSizeBucket>,
    founded_years: Vec<String>,
}

async fn facets(State(state): State<AppState>) -> Result<Json<FacetsResponse>, ApiError> {
    let snap = state
        .directory
        .snapshot()
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;
    let f = &snap.facets;
    Ok(Json(FacetsResponse {
        industries: FacetGroupOut {
            options: f.industries.clone(),
            categories: f.industry_groups(),
        },
        locations: FacetGroupOut {
            options: f.locations.clone(),
            categories: f.location_groups(),
        },
        team_sizes: f.team_sizes.clone(),
        founded_years: f.founded_years.clone(),
    }))
}

async fn admin_reload(State(state): State<AppState>) -> Result<Json<IngestSummary>, ApiError> {
    let summary = state
        .directory
        .reload()
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;
    tracing::info!(unique = summary.unique, "directory reloaded");
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_request_rejects_unknown_bucket() {
        let req = QueryRequest {
            team_sizes: vec!["1-10".into(), "500+".into()],
            ..Default::default()
        };
        assert!(matches!(req.to_query(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn query_request_defaults_to_latest() {
        let q = QueryRequest::default().to_query().unwrap();
        assert_eq!(q.sort, SortKey::Latest);
        assert!(q.filters.is_empty());
    }
}
