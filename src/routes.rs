use axum::Json;
use axum::extract::{Path, Query};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::dto::{CourseDetails, CourseListResponse};
use crate::services::filter::FilterCriteria;
use crate::services::query::{self, DetailRequest, ListRequest, PartnerContext, QueryService};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/courses", get(list_courses))
        .route("/api/courses/{sku}", get(course_details))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    institution: Option<String>,
    city: Option<String>,
    state: Option<String>,
    city_token: Option<String>,
    /// Comma-separated multi-selects.
    modality: Option<String>,
    shift: Option<String>,
    duration: Option<String>,
    price_min: Option<f64>,
    price_max: Option<f64>,
    level: Option<String>,
    course_name: Option<String>,
    location: Option<String>,
    enrollment_open: Option<bool>,
    lat: Option<f64>,
    lng: Option<f64>,
    radius_km: Option<f64>,
    page: Option<usize>,
    per_page: Option<usize>,
    include_filters: Option<bool>,
}

fn split_csv(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .map(|v| {
            v.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<CourseListResponse>, AppError> {
    let institution = params
        .institution
        .filter(|i| !i.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("institution is required".to_string()))?;

    if params.city.is_some() != params.state.is_some() {
        return Err(AppError::BadRequest(
            "city and state must be provided together".to_string(),
        ));
    }

    if let Some(token) = &params.city_token {
        if query::parse_city_token(token).is_none() {
            return Err(AppError::BadRequest(format!("Malformed city token: {}", token)));
        }
    }

    let coordinates = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => Some((lat, lng)),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "lat and lng must be provided together".to_string(),
            ));
        }
    };

    if params.radius_km.is_some() && coordinates.is_none() {
        return Err(AppError::BadRequest(
            "radiusKm requires lat and lng".to_string(),
        ));
    }
    if let Some(radius) = params.radius_km {
        if !radius.is_finite() || radius < 0.0 {
            return Err(AppError::BadRequest(format!("Invalid radiusKm: {}", radius)));
        }
    }

    let criteria = FilterCriteria {
        location: params.location,
        coordinates,
        radius_km: params.radius_km,
        modalities: split_csv(&params.modality),
        shifts: split_csv(&params.shift),
        duration_buckets: split_csv(&params.duration),
        price_min: params.price_min,
        price_max: params.price_max,
        level: params.level,
        course_name: params.course_name,
        enrollment_open: params.enrollment_open,
    };

    let request = ListRequest {
        institution,
        city: params.city,
        state: params.state,
        city_token: params.city_token,
        criteria,
        page: params.page.unwrap_or(1),
        per_page: params.per_page.unwrap_or(query::DEFAULT_PER_PAGE),
        include_filters: params.include_filters.unwrap_or(true),
    };

    let service = QueryService::new(state.catalog.clone(), state.cms.clone(), state.partner.clone());
    let response = service.list_courses(request).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailParams {
    institution: Option<String>,
    state: Option<String>,
    city: Option<String>,
    unit: Option<i64>,
    admission_form: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
}

async fn course_details(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    Query(params): Query<DetailParams>,
) -> Result<Json<CourseDetails>, AppError> {
    let sku = sku.trim().to_string();
    if sku.is_empty() {
        return Err(AppError::BadRequest("sku is required".to_string()));
    }

    // All four of institution/state/city/unit present triggers partner
    // enrichment; anything less means no partner context.
    let partner_ctx = match (params.institution, params.state, params.city, params.unit) {
        (Some(institution), Some(state), Some(city), Some(unit_id)) => Some(PartnerContext {
            institution,
            state,
            city,
            unit_id,
            admission_form: params.admission_form,
        }),
        _ => None,
    };

    let user_coords = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => Some((lat, lng)),
        _ => None,
    };

    let service = QueryService::new(state.catalog.clone(), state.cms.clone(), state.partner.clone());
    let details = service
        .course_details(DetailRequest { sku, partner_ctx, user_coords })
        .await?;
    Ok(Json(details))
}
