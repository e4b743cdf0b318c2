use std::collections::BTreeMap;

use serde::Serialize;

/// List-card course record returned by the list query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: i64,
    pub sku: String,
    pub slug: String,
    pub title: String,
    pub category: Option<String>,
    pub degree: String,
    pub duration: Option<String>,
    pub modalities: Vec<String>,
    pub price_from: Option<String>,
    pub campus: CampusRef,
    pub enrollment_open: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusRef {
    pub name: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListResponse {
    pub total: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub per_page: usize,
    pub courses: Vec<CourseSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<FacetCounts>,
}

/// Per-dimension result counts for the filter UI, computed over the
/// filtered set before pagination.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetCounts {
    pub modality: BTreeMap<String, usize>,
    pub shift: BTreeMap<String, usize>,
    pub duration: BTreeMap<String, usize>,
}

/// Full course record returned by the detail query. `id == 0` marks a
/// record synthesized from the partner payload alone, without a CMS hit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetails {
    pub id: i64,
    pub sku: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub degree: Option<String>,
    pub duration_years: Option<f64>,
    pub monthly_price: Option<f64>,
    pub price_formatted: Option<String>,
    pub modalities: Vec<String>,
    pub units: Vec<UnitDetail>,
    pub offerings: Vec<OfferingDetail>,
    pub coordinator: Option<StaffMember>,
    pub teachers: Vec<StaffMember>,
    pub related_courses: Vec<RelatedCourse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDetail {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    /// Nearest-unit marker; the UI uses it as the default selection.
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingDetail {
    pub unit_id: i64,
    pub modality: String,
    pub shift: Option<String>,
    pub price: Option<f64>,
    pub enrollment_open: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub name: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedCourse {
    pub sku: String,
    pub slug: String,
    pub title: String,
}
