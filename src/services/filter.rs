use crate::models::dto::FacetCounts;
use crate::services::aggregator::{AggregatedCourse, Level, Modality, Shift};
use crate::services::geo;

/// All filter dimensions of one list query. Active dimensions combine with
/// AND; multi-select values within one dimension combine with OR.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub location: Option<String>,
    pub coordinates: Option<(f64, f64)>,
    pub radius_km: Option<f64>,
    pub modalities: Vec<String>,
    pub shifts: Vec<String>,
    pub duration_buckets: Vec<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub level: Option<String>,
    pub course_name: Option<String>,
    pub enrollment_open: Option<bool>,
}

/// Filter the normalized set and count facet values over the filtered
/// result, before pagination.
pub fn apply(
    records: Vec<AggregatedCourse>,
    criteria: &FilterCriteria,
) -> (Vec<AggregatedCourse>, FacetCounts) {
    let filtered: Vec<AggregatedCourse> = records
        .into_iter()
        .filter(|record| matches(record, criteria))
        .collect();

    let facets = facet_counts(&filtered);
    (filtered, facets)
}

fn matches(record: &AggregatedCourse, criteria: &FilterCriteria) -> bool {
    if let Some(location) = &criteria.location {
        if !contains_ignore_case(&record.unit.city, location) {
            return false;
        }
    }

    if let (Some(center), Some(radius)) = (criteria.coordinates, criteria.radius_km) {
        match (record.unit.latitude, record.unit.longitude) {
            (Some(lat), Some(lon)) => {
                if !geo::within_radius((lat, lon), center, radius) {
                    return false;
                }
            }
            _ => return false,
        }
    }

    // Selections may come in either the source vocabulary ("ead") or the
    // canonical labels ("online"); classifying them makes both match.
    if !criteria.modalities.is_empty() {
        let hit = record.modalities.iter().any(|m| {
            criteria.modalities.iter().any(|sel| {
                Modality::classify(sel) == *m || m.label().eq_ignore_ascii_case(sel)
            })
        });
        if !hit {
            return false;
        }
    }

    if !criteria.shifts.is_empty() {
        let hit = record.shifts.iter().any(|s| {
            criteria.shifts.iter().any(|sel| {
                Shift::classify(sel) == *s || s.label().eq_ignore_ascii_case(sel)
            })
        });
        if !hit {
            return false;
        }
    }

    if !criteria.duration_buckets.is_empty() {
        let Some(bucket) = duration_bucket_for(record) else {
            return false;
        };
        if !criteria.duration_buckets.iter().any(|sel| sel.as_str() == bucket) {
            return false;
        }
    }

    if criteria.price_min.is_some() || criteria.price_max.is_some() {
        // A price range excludes courses without a known price.
        let Some(price) = record.min_price else {
            return false;
        };
        if let Some(min) = criteria.price_min {
            if price < min {
                return false;
            }
        }
        if let Some(max) = criteria.price_max {
            if price > max {
                return false;
            }
        }
    }

    if let Some(level) = &criteria.level {
        let hit = record.level.as_ref().is_some_and(|l| {
            Level::classify(level) == *l || l.label().eq_ignore_ascii_case(level)
        });
        if !hit {
            return false;
        }
    }

    if let Some(name) = &criteria.course_name {
        if !contains_ignore_case(&record.name, name) {
            return false;
        }
    }

    if let Some(open) = criteria.enrollment_open {
        if record.enrollment_open != open {
            return false;
        }
    }

    true
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// Duration in years: the "N anos" free text wins, falling back to the
/// partner's month count.
pub fn duration_years(record: &AggregatedCourse) -> Option<f64> {
    if let Some(text) = &record.duration_text {
        if let Some(years) = years_from_text(text) {
            return Some(years);
        }
    }
    record.duration_months.map(|months| f64::from(months) / 12.0)
}

fn years_from_text(text: &str) -> Option<f64> {
    let mut tokens = text.split_whitespace().peekable();
    while let Some(token) = tokens.next() {
        if let Ok(value) = token.replace(',', ".").parse::<f64>() {
            if tokens.peek().is_some_and(|next| next.to_lowercase().starts_with("ano")) {
                return Some(value);
            }
        }
    }
    None
}

/// Bucket boundaries: inclusive lower, exclusive upper, except the last
/// bucket which is open-ended. 1 ≤ y ≤ 2, 2 < y ≤ 3, 3 < y ≤ 4, y > 4.
pub fn duration_bucket(years: f64) -> Option<&'static str> {
    if years >= 1.0 && years <= 2.0 {
        Some("1-2")
    } else if years > 2.0 && years <= 3.0 {
        Some("2-3")
    } else if years > 3.0 && years <= 4.0 {
        Some("3-4")
    } else if years > 4.0 {
        Some("4+")
    } else {
        None
    }
}

fn duration_bucket_for(record: &AggregatedCourse) -> Option<&'static str> {
    duration_years(record).and_then(duration_bucket)
}

fn facet_counts(records: &[AggregatedCourse]) -> FacetCounts {
    let mut facets = FacetCounts::default();

    for record in records {
        for modality in &record.modalities {
            *facets.modality.entry(modality.label().to_string()).or_insert(0) += 1;
        }
        for shift in &record.shifts {
            *facets.shift.entry(shift.label().to_string()).or_insert(0) += 1;
        }
        if let Some(bucket) = duration_bucket_for(record) {
            *facets.duration.entry(bucket.to_string()).or_insert(0) += 1;
        }
    }

    facets
}
