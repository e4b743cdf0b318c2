use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::catalog::CatalogRepository;
use crate::cms::CmsClient;
use crate::error::AppError;
use crate::models::dto::{CourseDetails, CourseListResponse, UnitDetail};
use crate::partner::PartnerClient;
use crate::services::aggregator::{self, AggregatedCourse, UnitRef};
use crate::services::filter::{self, FilterCriteria};
use crate::services::geo;
use crate::services::merge::merge_by_key;
use crate::services::transform::{self, CmsCourseBundle};

/// Cap on concurrent per-unit course fetches during city-mode fan-out.
const FANOUT_LIMIT: usize = 8;
/// One deadline over the whole fan-out, independent of the unit count.
const FANOUT_DEADLINE: Duration = Duration::from_secs(12);

pub const DEFAULT_PER_PAGE: usize = 12;
pub const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub institution: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub city_token: Option<String>,
    pub criteria: FilterCriteria,
    pub page: usize,
    pub per_page: usize,
    pub include_filters: bool,
}

#[derive(Debug, Clone)]
pub struct PartnerContext {
    pub institution: String,
    pub state: String,
    pub city: String,
    pub unit_id: i64,
    pub admission_form: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DetailRequest {
    pub sku: String,
    pub partner_ctx: Option<PartnerContext>,
    pub user_coords: Option<(f64, f64)>,
}

/// Composition root for course discovery: picks catalog mode or city mode,
/// fans out to the partner system, and merges detail records by identity.
pub struct QueryService {
    catalog: Arc<CatalogRepository>,
    cms: Arc<dyn CmsClient>,
    partner: Arc<dyn PartnerClient>,
}

impl QueryService {
    pub fn new(
        catalog: Arc<CatalogRepository>,
        cms: Arc<dyn CmsClient>,
        partner: Arc<dyn PartnerClient>,
    ) -> Self {
        Self { catalog, cms, partner }
    }

    pub async fn list_courses(&self, req: ListRequest) -> Result<CourseListResponse, AppError> {
        let records = if let Some(token) = &req.city_token {
            let (city, state) = parse_city_token(token)
                .ok_or_else(|| AppError::BadRequest(format!("Malformed city token: {}", token)))?;
            self.city_mode(&req.institution, &city, &state).await?
        } else if let (Some(city), Some(state)) = (&req.city, &req.state) {
            self.city_mode(&req.institution, city, state).await?
        } else {
            self.catalog_mode(&req.institution)?
        };

        let (mut filtered, facets) = filter::apply(records, &req.criteria);

        // Upstream sources guarantee no order; sort for stable pagination.
        filtered.sort_by_key(|c| (c.course_id, c.unit.id));

        let total = filtered.len();
        let per_page = req.per_page.clamp(1, MAX_PER_PAGE);
        let page = req.page.max(1);
        let total_pages = total.div_ceil(per_page);

        // Beyond-range pages yield an empty list, never an error, and the
        // offset must not overflow for arbitrary caller-supplied pages.
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        let courses = filtered
            .iter()
            .skip(offset)
            .take(per_page)
            .map(transform::to_course_summary)
            .collect();

        Ok(CourseListResponse {
            total,
            current_page: page,
            total_pages,
            per_page,
            courses,
            filters: req.include_filters.then_some(facets),
        })
    }

    fn catalog_mode(&self, institution_slug: &str) -> Result<Vec<AggregatedCourse>, AppError> {
        let institution = self
            .catalog
            .institution_by_slug(institution_slug)
            .ok_or(AppError::NotFound)?;
        let joins = self.catalog.active_offerings(institution.id);
        Ok(transform::offerings_to_aggregates(&joins))
    }

    /// Fan out to the partner system per unit, joining results under one
    /// outer deadline. A failed or timed-out unit degrades to an empty
    /// list and is logged; it never fails the whole request.
    async fn city_mode(
        &self,
        institution: &str,
        city: &str,
        state: &str,
    ) -> Result<Vec<AggregatedCourse>, AppError> {
        let units = self.partner.units_by_city(institution, state, city).await?;
        info!(city, state, units = units.len(), "city mode fan-out");

        let semaphore = Arc::new(Semaphore::new(FANOUT_LIMIT));
        let deadline = tokio::time::Instant::now() + FANOUT_DEADLINE;
        // JoinSet aborts in-flight fetches when dropped, so a client
        // disconnect cancels the remaining fan-out.
        let mut set = JoinSet::new();

        for unit in units {
            let partner = self.partner.clone();
            let semaphore = semaphore.clone();
            let institution = institution.to_string();
            set.spawn(async move {
                // The semaphore lives as long as the tasks, but a closed
                // permit still degrades like any other failed unit.
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return (unit, Err(AppError::InternalServerError)),
                };
                let rows = partner.courses_by_unit(&institution, unit.id).await;
                (unit, rows)
            });
        }

        let mut records = Vec::new();
        loop {
            match tokio::time::timeout_at(deadline, set.join_next()).await {
                Ok(Some(Ok((unit, Ok(rows))))) => {
                    let unit_ref = UnitRef::from_partner(&unit);
                    records.extend(aggregator::aggregate(&rows, &unit_ref));
                }
                Ok(Some(Ok((unit, Err(e))))) => {
                    warn!(unit = unit.id, error = %e, "unit course fetch failed, skipping");
                }
                Ok(Some(Err(e))) => {
                    warn!(error = %e, "unit fetch task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    warn!("city fan-out deadline reached, returning partial results");
                    set.abort_all();
                    break;
                }
            }
        }

        Ok(records)
    }

    /// Resolve one course by SKU: CMS first, partner enrichment when the
    /// full partner context is supplied, partner-only synthesis when the
    /// CMS misses. Upstream failures surface only if no source produced
    /// usable data.
    pub async fn course_details(&self, req: DetailRequest) -> Result<CourseDetails, AppError> {
        let (course_res, coordinator_res, teachers_res) = tokio::join!(
            self.cms.course_by_sku(&req.sku),
            self.cms.coordinator_by_sku(&req.sku),
            self.cms.teachers_by_sku(&req.sku),
        );

        let mut upstream_error: Option<AppError> = None;

        let cms_course = match course_res {
            Ok(found) => found,
            Err(e) => {
                warn!(sku = %req.sku, error = %e, "CMS course lookup failed");
                upstream_error = Some(e);
                None
            }
        };
        let coordinator = coordinator_res.unwrap_or_else(|e| {
            warn!(sku = %req.sku, error = %e, "CMS coordinator lookup failed");
            None
        });
        let teachers = teachers_res.unwrap_or_else(|e| {
            warn!(sku = %req.sku, error = %e, "CMS teachers lookup failed");
            Vec::new()
        });

        let (partner_detail, context_unit) = match &req.partner_ctx {
            Some(ctx) => {
                let (detail_res, units_res) = tokio::join!(
                    self.partner.course_detail(
                        &ctx.institution,
                        &req.sku,
                        ctx.unit_id,
                        ctx.admission_form.as_deref(),
                    ),
                    self.partner.units_by_city(&ctx.institution, &ctx.state, &ctx.city),
                );
                let detail = match detail_res {
                    Ok(found) => found,
                    Err(e) => {
                        warn!(sku = %req.sku, error = %e, "partner detail lookup failed");
                        upstream_error.get_or_insert(e);
                        None
                    }
                };
                let unit = match units_res {
                    Ok(units) => units.into_iter().find(|u| u.id == ctx.unit_id),
                    Err(e) => {
                        warn!(unit = ctx.unit_id, error = %e, "partner unit lookup failed");
                        None
                    }
                };
                (detail, unit)
            }
            None => (None, None),
        };

        let mut details = if let Some(document) = cms_course {
            let bundle = CmsCourseBundle {
                id: document.id,
                course: document.attributes,
                coordinator,
                teachers,
            };
            transform::cms_to_details(&bundle, partner_detail.as_ref())
        } else if let Some(detail) = &partner_detail {
            transform::partner_to_details(&req.sku, detail)
        } else {
            return Err(upstream_error.unwrap_or(AppError::NotFound));
        };

        if let Some(unit) = context_unit {
            let extra = UnitDetail {
                id: unit.id,
                name: unit.name,
                city: unit.city,
                state: unit.state,
                address: None,
                latitude: None,
                longitude: None,
                distance_km: None,
                active: false,
            };
            details.units = merge_by_key(details.units, [extra], |u| u.id);
        }

        geo::mark_closest_unit(&mut details.units, req.user_coords);

        Ok(details)
    }
}

/// Encode a (city, state) pair as the opaque token `city:<slug>-state:<code>`.
pub fn format_city_token(city: &str, state: &str) -> String {
    format!("city:{}-state:{}", transform::slugify(city), state.trim().to_lowercase())
}

/// Decode a city token back into a display city ("sao-paulo" → "Sao Paulo")
/// and an uppercase state code. Returns `None` when the shape is wrong.
pub fn parse_city_token(token: &str) -> Option<(String, String)> {
    let rest = token.strip_prefix("city:")?;
    // The slug itself may contain '-', so anchor on the last "-state:".
    let at = rest.rfind("-state:")?;
    let (slug, state_part) = rest.split_at(at);
    let state = state_part.strip_prefix("-state:")?;
    if slug.is_empty() || state.is_empty() {
        return None;
    }

    let city = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");

    Some((city, state.to_uppercase()))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
