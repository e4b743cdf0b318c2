use std::sync::Arc;

use async_trait::async_trait;

use discovery::catalog::{CatalogData, CatalogRepository};
use discovery::cms::NoopCmsClient;
use discovery::error::AppError;
use discovery::models::catalog::{
    Category, Course, CourseOffering, Institution, ModalityRef, PeriodRef, Unit,
};
use discovery::partner::dto::{PartnerCourseDetail, PartnerRow, PartnerUnit};
use discovery::partner::PartnerClient;
use discovery::services::filter::FilterCriteria;
use discovery::services::query::{format_city_token, parse_city_token};
use discovery::services::transform::slugify;
use discovery::services::{ListRequest, QueryService};

fn empty_catalog() -> Arc<CatalogRepository> {
    Arc::new(CatalogRepository::new(CatalogData::default()).expect("empty catalog is valid"))
}

fn partner_unit(id: i64) -> PartnerUnit {
    PartnerUnit {
        id,
        name: format!("Unidade {}", id),
        state: "SP".to_string(),
        city: "Sao Paulo".to_string(),
    }
}

fn partner_row(course: i64, modality: &str, shift: &str) -> PartnerRow {
    PartnerRow {
        course_code: course,
        course_name: format!("Curso {}", course),
        level: Some("Graduação".to_string()),
        modality: Some(modality.to_string()),
        shift: Some(shift.to_string()),
        duration_months: Some(48),
        monthly_price: Some("499,00".to_string()),
        admission_form: Some("Vestibular".to_string()),
        payment_type: Some("Mensal".to_string()),
    }
}

/// Three units; unit 3's course fetch times out every time.
struct FlakyPartner;

#[async_trait]
impl PartnerClient for FlakyPartner {
    async fn units_by_city(
        &self,
        _institution: &str,
        state: &str,
        city: &str,
    ) -> Result<Vec<PartnerUnit>, AppError> {
        assert_eq!(state, "SP");
        assert_eq!(city, "Sao Paulo");
        Ok(vec![partner_unit(1), partner_unit(2), partner_unit(3)])
    }

    async fn courses_by_unit(
        &self,
        _institution: &str,
        unit_id: i64,
    ) -> Result<Vec<PartnerRow>, AppError> {
        match unit_id {
            1 => Ok(vec![
                partner_row(100, "EAD", "Virtual"),
                partner_row(101, "Presencial", "Noturno"),
            ]),
            2 => Ok(vec![
                partner_row(100, "EAD", "Virtual"),
                partner_row(102, "Semipresencial", "Noturno"),
            ]),
            _ => Err(AppError::UpstreamTimeout("partner request timed out".to_string())),
        }
    }

    async fn course_detail(
        &self,
        _institution: &str,
        _sku: &str,
        _unit_id: i64,
        _admission_form: Option<&str>,
    ) -> Result<Option<PartnerCourseDetail>, AppError> {
        Ok(None)
    }
}

/// One unit with `count` distinct single-row courses.
struct BulkPartner {
    count: i64,
}

#[async_trait]
impl PartnerClient for BulkPartner {
    async fn units_by_city(
        &self,
        _institution: &str,
        _state: &str,
        _city: &str,
    ) -> Result<Vec<PartnerUnit>, AppError> {
        Ok(vec![partner_unit(1)])
    }

    async fn courses_by_unit(
        &self,
        _institution: &str,
        _unit_id: i64,
    ) -> Result<Vec<PartnerRow>, AppError> {
        Ok((1..=self.count)
            .map(|i| partner_row(i, "Presencial", "Noturno"))
            .collect())
    }

    async fn course_detail(
        &self,
        _institution: &str,
        _sku: &str,
        _unit_id: i64,
        _admission_form: Option<&str>,
    ) -> Result<Option<PartnerCourseDetail>, AppError> {
        Ok(None)
    }
}

/// Two units; unit 2's course fetch hangs forever.
struct StalledPartner;

#[async_trait]
impl PartnerClient for StalledPartner {
    async fn units_by_city(
        &self,
        _institution: &str,
        _state: &str,
        _city: &str,
    ) -> Result<Vec<PartnerUnit>, AppError> {
        Ok(vec![partner_unit(1), partner_unit(2)])
    }

    async fn courses_by_unit(
        &self,
        _institution: &str,
        unit_id: i64,
    ) -> Result<Vec<PartnerRow>, AppError> {
        match unit_id {
            1 => Ok(vec![partner_row(100, "Presencial", "Noturno")]),
            _ => std::future::pending().await,
        }
    }

    async fn course_detail(
        &self,
        _institution: &str,
        _sku: &str,
        _unit_id: i64,
        _admission_form: Option<&str>,
    ) -> Result<Option<PartnerCourseDetail>, AppError> {
        Ok(None)
    }
}

fn list_request(city_token: &str) -> ListRequest {
    ListRequest {
        institution: "cruzeiro".to_string(),
        city: None,
        state: None,
        city_token: Some(city_token.to_string()),
        criteria: FilterCriteria::default(),
        page: 1,
        per_page: 12,
        include_filters: true,
    }
}

#[tokio::test]
async fn city_mode_absorbs_a_failing_unit_and_filters_by_modality() {
    let service = QueryService::new(empty_catalog(), Arc::new(NoopCmsClient), Arc::new(FlakyPartner));

    let mut request = list_request("city:sao-paulo-state:sp");
    request.criteria.modalities = vec!["ead".to_string()];

    let response = service.list_courses(request).await.expect("partial failure is absorbed");

    assert!(response.courses.len() <= 12);
    assert_eq!(response.total, 2, "course 100 appears once per surviving unit");
    for course in &response.courses {
        assert!(
            course.modalities.contains(&"online".to_string()),
            "course {} does not intersect the selected modality",
            course.id
        );
        assert_ne!(course.campus.name, "Unidade 3", "timed-out unit contributed courses");
    }
}

#[tokio::test]
async fn city_mode_orders_deterministically_by_course_then_unit() {
    let service = QueryService::new(empty_catalog(), Arc::new(NoopCmsClient), Arc::new(FlakyPartner));

    let response = service
        .list_courses(list_request("city:sao-paulo-state:sp"))
        .await
        .expect("list should succeed");

    let keys: Vec<(i64, String)> = response
        .courses
        .iter()
        .map(|c| (c.id, c.campus.name.clone()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted, "response order must be (courseId, unitId) ascending");
    assert_eq!(response.courses[0].id, 100);
}

#[tokio::test]
async fn pagination_boundaries() {
    let service = QueryService::new(
        empty_catalog(),
        Arc::new(NoopCmsClient),
        Arc::new(BulkPartner { count: 25 }),
    );

    let mut request = list_request("city:sao-paulo-state:sp");
    request.page = 3;
    let response = service.list_courses(request).await.expect("page 3");
    assert_eq!(response.total, 25);
    assert_eq!(response.total_pages, 3);
    assert_eq!(response.per_page, 12);
    assert_eq!(response.courses.len(), 1, "last page holds the remainder");

    let mut request = list_request("city:sao-paulo-state:sp");
    request.page = 4;
    let response = service.list_courses(request).await.expect("beyond-range page is not an error");
    assert!(response.courses.is_empty());
    assert_eq!(response.current_page, 4);
}

#[tokio::test(start_paused = true)]
async fn fan_out_deadline_returns_partial_results_when_a_unit_hangs() {
    let service =
        QueryService::new(empty_catalog(), Arc::new(NoopCmsClient), Arc::new(StalledPartner));

    let response = service
        .list_courses(list_request("city:sao-paulo-state:sp"))
        .await
        .expect("a hung unit must not hang the request");

    assert_eq!(response.total, 1, "only the responsive unit contributes");
    assert_eq!(response.courses[0].id, 100);
    assert_eq!(response.courses[0].campus.name, "Unidade 1");
}

#[tokio::test]
async fn huge_page_number_yields_an_empty_page() {
    let service = QueryService::new(
        empty_catalog(),
        Arc::new(NoopCmsClient),
        Arc::new(BulkPartner { count: 25 }),
    );

    let mut request = list_request("city:sao-paulo-state:sp");
    request.page = usize::MAX;
    let response = service
        .list_courses(request)
        .await
        .expect("an out-of-range page is still a valid request");
    assert!(response.courses.is_empty());
    assert_eq!(response.current_page, usize::MAX);
    assert_eq!(response.total, 25);
}

#[tokio::test]
async fn per_page_is_clamped() {
    let service = QueryService::new(
        empty_catalog(),
        Arc::new(NoopCmsClient),
        Arc::new(BulkPartner { count: 150 }),
    );

    let mut request = list_request("city:sao-paulo-state:sp");
    request.per_page = 1000;
    let response = service.list_courses(request).await.expect("list should succeed");
    assert_eq!(response.per_page, 100);
    assert_eq!(response.courses.len(), 100);

    let mut request = list_request("city:sao-paulo-state:sp");
    request.per_page = 0;
    let response = service.list_courses(request).await.expect("list should succeed");
    assert_eq!(response.per_page, 1);
}

#[tokio::test]
async fn malformed_city_token_is_rejected() {
    let service = QueryService::new(empty_catalog(), Arc::new(NoopCmsClient), Arc::new(FlakyPartner));

    let result = service.list_courses(list_request("sao-paulo")).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[test]
fn city_token_round_trip() {
    let token = format_city_token("São José dos Campos", "SP");
    assert_eq!(token, "city:sao-jose-dos-campos-state:sp");

    let (city, state) = parse_city_token(&token).expect("token parses");
    assert_eq!(state, "SP");
    assert_eq!(slugify(&city), slugify("São José dos Campos"));

    assert!(parse_city_token("city:-state:sp").is_none());
    assert!(parse_city_token("city:santos").is_none());
}

fn seeded_catalog() -> Arc<CatalogRepository> {
    let data = CatalogData {
        institutions: vec![Institution {
            id: 1,
            slug: "cruzeiro".to_string(),
            name: "Cruzeiro".to_string(),
        }],
        units: vec![Unit {
            id: 10,
            name: "Campus Centro".to_string(),
            address: "Rua A, 100".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            latitude: -23.5505,
            longitude: -46.6333,
            institution_id: 1,
        }],
        categories: vec![Category { id: 1, name: "Exatas".to_string(), slug: "exatas".to_string() }],
        modalities: vec![
            ModalityRef { id: 1, name: "Presencial".to_string(), slug: "presencial".to_string() },
            ModalityRef { id: 2, name: "EAD".to_string(), slug: "ead".to_string() },
        ],
        periods: vec![PeriodRef { id: 1, name: "Noturno".to_string(), slug: "noturno".to_string() }],
        courses: vec![Course {
            id: 100,
            name: "Engenharia Civil".to_string(),
            slug: "engenharia-civil".to_string(),
            category_id: 1,
            kind: "Bacharelado".to_string(),
            workload: Some("3600h".to_string()),
            description: None,
        }],
        offerings: vec![
            CourseOffering {
                id: 1,
                course_id: 100,
                unit_id: 10,
                modality_id: 1,
                period_id: 1,
                price: Some(1250.0),
                duration: Some("5 anos".to_string()),
                enrollment_open: true,
                active: true,
            },
            CourseOffering {
                id: 2,
                course_id: 100,
                unit_id: 10,
                modality_id: 2,
                period_id: 1,
                price: Some(780.0),
                duration: Some("5 anos".to_string()),
                enrollment_open: true,
                active: true,
            },
            // Inactive offerings never participate.
            CourseOffering {
                id: 3,
                course_id: 100,
                unit_id: 10,
                modality_id: 1,
                period_id: 1,
                price: Some(1.0),
                duration: None,
                enrollment_open: false,
                active: false,
            },
        ],
    };
    Arc::new(CatalogRepository::new(data).expect("seed catalog is valid"))
}

#[tokio::test]
async fn catalog_mode_groups_offerings_per_course_and_unit() {
    let service =
        QueryService::new(seeded_catalog(), Arc::new(NoopCmsClient), Arc::new(FlakyPartner));

    let request = ListRequest {
        institution: "cruzeiro".to_string(),
        page: 1,
        per_page: 12,
        include_filters: true,
        ..Default::default()
    };

    let response = service.list_courses(request).await.expect("catalog mode");
    assert_eq!(response.total, 1, "two active offerings collapse into one card");

    let card = &response.courses[0];
    assert_eq!(card.title, "Engenharia Civil");
    assert_eq!(card.price_from.as_deref(), Some("R$ 780,00"), "inactive price ignored");
    assert_eq!(card.modalities, vec!["in-person".to_string(), "online".to_string()]);
    assert_eq!(card.degree, "undergraduate");
    assert_eq!(card.campus.city, "São Paulo");
}

#[tokio::test]
async fn unknown_institution_is_not_found_in_catalog_mode() {
    let service =
        QueryService::new(seeded_catalog(), Arc::new(NoopCmsClient), Arc::new(FlakyPartner));

    let request = ListRequest {
        institution: "unknown".to_string(),
        page: 1,
        per_page: 12,
        ..Default::default()
    };

    let result = service.list_courses(request).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}
