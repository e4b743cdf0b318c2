use std::collections::HashMap;

use crate::catalog::OfferingJoin;
use crate::cms::dto::{CmsCourse, CmsStaff};
use crate::models::dto::{
    CampusRef, CourseDetails, CourseSummary, OfferingDetail, RelatedCourse, StaffMember,
    UnitDetail,
};
use crate::partner::dto::PartnerCourseDetail;
use crate::services::aggregator::{self, AggregatedCourse, Level, Modality, Shift, UnitRef};

/// Parse a Brazilian-formatted price string ("1.234,56", optionally with a
/// leading "R$") into a float. Anything unparseable is absent, not an error.
pub fn parse_brl(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a price as "R$ 1.234,56".
pub fn format_brl(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = (cents % 100).abs();

    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if whole < 0 { "-" } else { "" };
    format!("R$ {}{},{:02}", sign, grouped, frac)
}

/// Lowercase, accent-folded, hyphen-separated slug. Used for city tokens
/// and partner-derived course slugs.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_was_dash = true;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if let Some(folded) = fold_accent(c) {
            slug.push(folded);
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn fold_accent(c: char) -> Option<char> {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => Some('a'),
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => Some('e'),
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => Some('i'),
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => Some('o'),
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => Some('u'),
        'ç' | 'Ç' => Some('c'),
        'ñ' | 'Ñ' => Some('n'),
        _ => None,
    }
}

/// Group canonical catalog offering rows per (course, unit) with the same
/// union/min semantics the partner-row aggregator uses.
pub fn offerings_to_aggregates(joins: &[OfferingJoin]) -> Vec<AggregatedCourse> {
    let mut index: HashMap<(i64, i64), usize> = HashMap::new();
    let mut courses: Vec<AggregatedCourse> = Vec::new();

    for join in joins {
        let key = (join.course.id, join.unit.id);
        let modality = Modality::classify(&join.modality.name);
        let shift = Shift::classify(&join.period.name);

        match index.get(&key) {
            Some(&at) => {
                let course = &mut courses[at];
                course.modalities.insert(modality);
                course.shifts.insert(shift);
                course.min_price = aggregator::min_price(course.min_price, join.offering.price);
                if course.duration_text.is_none() {
                    course.duration_text = join.offering.duration.clone();
                }
                course.enrollment_open = course.enrollment_open || join.offering.enrollment_open;
            }
            None => {
                index.insert(key, courses.len());
                courses.push(AggregatedCourse {
                    course_id: join.course.id,
                    sku: join.course.id.to_string(),
                    name: join.course.name.clone(),
                    slug: join.course.slug.clone(),
                    category: Some(join.category.name.clone()),
                    level: Some(Level::classify(&join.course.kind)),
                    modalities: [modality].into_iter().collect(),
                    shifts: [shift].into_iter().collect(),
                    duration_months: None,
                    duration_text: join.offering.duration.clone(),
                    min_price: join.offering.price,
                    enrollment_open: join.offering.enrollment_open,
                    unit: UnitRef {
                        id: join.unit.id,
                        name: join.unit.name.clone(),
                        city: join.unit.city.clone(),
                        state: join.unit.state.clone(),
                        latitude: Some(join.unit.latitude),
                        longitude: Some(join.unit.longitude),
                    },
                });
            }
        }
    }

    courses
}

pub fn to_course_summary(course: &AggregatedCourse) -> CourseSummary {
    CourseSummary {
        id: course.course_id,
        sku: course.sku.clone(),
        slug: course.slug.clone(),
        title: course.name.clone(),
        category: course.category.clone(),
        degree: course
            .level
            .as_ref()
            .map(|l| l.label().to_string())
            .unwrap_or_default(),
        duration: duration_label(course),
        modalities: course.modalities.iter().map(|m| m.label().to_string()).collect(),
        price_from: course.min_price.map(format_brl),
        campus: CampusRef {
            name: course.unit.name.clone(),
            city: course.unit.city.clone(),
            state: course.unit.state.clone(),
        },
        enrollment_open: course.enrollment_open,
    }
}

fn duration_label(course: &AggregatedCourse) -> Option<String> {
    if let Some(text) = &course.duration_text {
        return Some(text.clone());
    }
    course.duration_months.map(|months| {
        if months % 12 == 0 {
            format!("{} anos", months / 12)
        } else {
            format!("{} meses", months)
        }
    })
}

/// Walk the partner detail payload's first available pricing chain:
/// shift → admission form → payment type → payment option → monthly price.
/// Any absent step yields `None`; partial payloads are expected.
pub fn partner_monthly_price(detail: &PartnerCourseDetail) -> Option<f64> {
    detail
        .shifts
        .first()
        .and_then(|shift| shift.admission_forms.first())
        .and_then(|form| form.payment_types.first())
        .and_then(|payment| payment.payment_options.first())
        .and_then(|option| option.monthly_price.as_deref())
        .and_then(parse_brl)
}

pub fn partner_duration_years(detail: &PartnerCourseDetail) -> Option<f64> {
    detail.duration_months.map(|months| f64::from(months) / 12.0)
}

/// CMS course record with its independently-fetched companions.
#[derive(Debug, Clone)]
pub struct CmsCourseBundle {
    pub id: i64,
    pub course: CmsCourse,
    pub coordinator: Option<CmsStaff>,
    pub teachers: Vec<CmsStaff>,
}

fn staff_member(staff: &CmsStaff) -> StaffMember {
    StaffMember {
        name: staff.name.clone(),
        title: staff.title.clone(),
        bio: staff.bio.clone(),
        photo_url: staff.photo_url.clone(),
    }
}

/// Build the canonical detail record from a CMS hit, optionally enriched
/// with partner pricing. CMS modalities win when non-empty; otherwise a
/// single modality is derived from the partner payload.
pub fn cms_to_details(bundle: &CmsCourseBundle, partner: Option<&PartnerCourseDetail>) -> CourseDetails {
    let course = &bundle.course;

    let monthly_price = partner
        .and_then(partner_monthly_price)
        .or_else(|| {
            course
                .offers
                .iter()
                .filter_map(|o| o.price)
                .fold(None, |acc, p| aggregator::min_price(acc, Some(p)))
        });

    let duration_years = course
        .duration_months
        .map(|months| f64::from(months) / 12.0)
        .or_else(|| partner.and_then(partner_duration_years));

    let mut modalities: Vec<String> = crate::services::merge::merge_by_key(
        course
            .modalities
            .iter()
            .map(|m| Modality::classify(m).label().to_string())
            .collect(),
        std::iter::empty(),
        |m| m.clone(),
    );
    if modalities.is_empty() {
        if let Some(label) = partner.and_then(|d| d.modality.as_deref()) {
            modalities.push(Modality::classify(label).label().to_string());
        }
    }

    CourseDetails {
        id: bundle.id,
        sku: course.sku.clone(),
        slug: course.slug.clone(),
        title: course.title.clone(),
        description: course.description.clone(),
        category: course.category.clone(),
        degree: course.degree.clone(),
        duration_years,
        monthly_price,
        price_formatted: monthly_price.map(format_brl),
        modalities,
        units: course
            .units
            .iter()
            .map(|u| UnitDetail {
                id: u.id,
                name: u.name.clone(),
                city: u.city.clone(),
                state: u.state.clone(),
                address: u.address.clone(),
                latitude: u.latitude,
                longitude: u.longitude,
                distance_km: None,
                active: false,
            })
            .collect(),
        offerings: course
            .offers
            .iter()
            .map(|o| OfferingDetail {
                unit_id: o.unit_id,
                modality: Modality::classify(&o.modality).label().to_string(),
                shift: o.shift.as_deref().map(|s| Shift::classify(s).label().to_string()),
                price: o.price,
                enrollment_open: o.enrollment_open,
            })
            .collect(),
        coordinator: bundle.coordinator.as_ref().map(staff_member),
        teachers: bundle.teachers.iter().map(staff_member).collect(),
        related_courses: course
            .related_courses
            .iter()
            .map(|r| RelatedCourse {
                sku: r.sku.clone(),
                slug: r.slug.clone(),
                title: r.title.clone(),
            })
            .collect(),
    }
}

/// Synthesize a detail record from the partner payload alone. `id == 0`
/// marks the absence of a CMS record; the slug is derived from the SKU.
pub fn partner_to_details(sku: &str, detail: &PartnerCourseDetail) -> CourseDetails {
    let monthly_price = partner_monthly_price(detail);
    let modalities = detail
        .modality
        .as_deref()
        .map(|m| vec![Modality::classify(m).label().to_string()])
        .unwrap_or_default();

    CourseDetails {
        id: 0,
        sku: sku.to_string(),
        slug: slugify(sku),
        title: detail.course_name.clone(),
        description: None,
        category: None,
        degree: detail.level.as_deref().map(|l| Level::classify(l).label().to_string()),
        duration_years: partner_duration_years(detail),
        monthly_price,
        price_formatted: monthly_price.map(format_brl),
        modalities,
        units: Vec::new(),
        offerings: Vec::new(),
        coordinator: None,
        teachers: Vec::new(),
        related_courses: Vec::new(),
    }
}
