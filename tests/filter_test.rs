use std::collections::BTreeSet;

use discovery::services::aggregator::{AggregatedCourse, Level, Modality, Shift, UnitRef};
use discovery::services::filter::{self, FilterCriteria};

fn course(
    id: i64,
    name: &str,
    modalities: &[Modality],
    shifts: &[Shift],
    duration_text: Option<&str>,
    min_price: Option<f64>,
) -> AggregatedCourse {
    AggregatedCourse {
        course_id: id,
        sku: id.to_string(),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        category: Some("Exatas".to_string()),
        level: Some(Level::Undergraduate),
        modalities: modalities.iter().cloned().collect::<BTreeSet<_>>(),
        shifts: shifts.iter().cloned().collect::<BTreeSet<_>>(),
        duration_months: None,
        duration_text: duration_text.map(|d| d.to_string()),
        min_price,
        enrollment_open: true,
        unit: UnitRef {
            id: 1,
            name: "Campus Centro".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            latitude: Some(-23.5505),
            longitude: Some(-46.6333),
        },
    }
}

fn sample_set() -> Vec<AggregatedCourse> {
    vec![
        course(
            1,
            "Direito",
            &[Modality::InPerson],
            &[Shift::Evening, Shift::Morning],
            Some("5 anos"),
            Some(1500.0),
        ),
        course(
            2,
            "Análise de Sistemas",
            &[Modality::Online],
            &[Shift::Virtual],
            Some("2 anos"),
            Some(399.9),
        ),
        course(
            3,
            "Engenharia Civil",
            &[Modality::InPerson, Modality::Hybrid],
            &[Shift::Evening],
            Some("3 anos"),
            None,
        ),
    ]
}

#[test]
fn unfiltered_set_passes_through_with_facets() {
    let (filtered, facets) = filter::apply(sample_set(), &FilterCriteria::default());
    assert_eq!(filtered.len(), 3);
    assert_eq!(facets.modality.get("in-person"), Some(&2));
    assert_eq!(facets.modality.get("online"), Some(&1));
    assert_eq!(facets.modality.get("hybrid"), Some(&1));
    assert_eq!(facets.shift.get("evening"), Some(&2));
    assert_eq!(facets.duration.get("1-2"), Some(&1));
    assert_eq!(facets.duration.get("2-3"), Some(&1));
    assert_eq!(facets.duration.get("4+"), Some(&1));
}

#[test]
fn filtering_never_grows_the_set_and_results_satisfy_predicates() {
    let input = sample_set();
    let input_len = input.len();
    let criteria = FilterCriteria {
        modalities: vec!["in-person".to_string()],
        shifts: vec!["evening".to_string()],
        ..Default::default()
    };

    let (filtered, _) = filter::apply(input, &criteria);
    assert!(filtered.len() <= input_len);
    for course in &filtered {
        assert!(course.modalities.contains(&Modality::InPerson));
        assert!(course.shifts.contains(&Shift::Evening));
    }
    assert_eq!(filtered.len(), 2);
}

#[test]
fn modality_filter_accepts_source_vocabulary() {
    // "ead" is the source label for the online modality.
    let criteria = FilterCriteria {
        modalities: vec!["ead".to_string()],
        ..Default::default()
    };
    let (filtered, _) = filter::apply(sample_set(), &criteria);
    assert_eq!(filtered.len(), 1);
    assert!(filtered[0].modalities.contains(&Modality::Online));
}

#[test]
fn multi_select_within_one_dimension_is_or() {
    let criteria = FilterCriteria {
        modalities: vec!["online".to_string(), "hybrid".to_string()],
        ..Default::default()
    };
    let (filtered, _) = filter::apply(sample_set(), &criteria);
    assert_eq!(filtered.len(), 2, "courses matching either modality are kept");
}

#[test]
fn duration_boundary_three_years_falls_in_2_3() {
    assert_eq!(filter::duration_bucket(3.0), Some("2-3"));
    assert_eq!(filter::duration_bucket(2.0), Some("1-2"));
    assert_eq!(filter::duration_bucket(4.0), Some("3-4"));
    assert_eq!(filter::duration_bucket(4.5), Some("4+"));
    assert_eq!(filter::duration_bucket(0.5), None);

    let criteria = FilterCriteria {
        duration_buckets: vec!["2-3".to_string()],
        ..Default::default()
    };
    let (filtered, _) = filter::apply(sample_set(), &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "Engenharia Civil", "\"3 anos\" belongs to 2-3");
}

#[test]
fn price_range_is_inclusive_and_excludes_unknown_prices() {
    let criteria = FilterCriteria {
        price_min: Some(399.9),
        price_max: Some(1500.0),
        ..Default::default()
    };
    let (filtered, _) = filter::apply(sample_set(), &criteria);

    // Both boundary prices kept, the course without a price dropped.
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|c| c.min_price.is_some()));
}

#[test]
fn course_name_and_location_match_substrings_case_insensitively() {
    let criteria = FilterCriteria {
        course_name: Some("sistemas".to_string()),
        location: Some("são paulo".to_string()),
        ..Default::default()
    };
    let (filtered, _) = filter::apply(sample_set(), &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "Análise de Sistemas");
}

#[test]
fn radius_filter_uses_unit_coordinates() {
    let near_sp = (-23.55, -46.63);
    let criteria = FilterCriteria {
        coordinates: Some(near_sp),
        radius_km: Some(10.0),
        ..Default::default()
    };
    let (filtered, _) = filter::apply(sample_set(), &criteria);
    assert_eq!(filtered.len(), 3, "all sample units sit in São Paulo");

    let rio = (-22.9068, -43.1729);
    let criteria = FilterCriteria {
        coordinates: Some(rio),
        radius_km: Some(10.0),
        ..Default::default()
    };
    let (filtered, _) = filter::apply(sample_set(), &criteria);
    assert!(filtered.is_empty());
}

#[test]
fn facets_reflect_the_filtered_set() {
    let criteria = FilterCriteria {
        modalities: vec!["in-person".to_string()],
        ..Default::default()
    };
    let (filtered, facets) = filter::apply(sample_set(), &criteria);
    assert_eq!(filtered.len(), 2);
    assert_eq!(facets.modality.get("in-person"), Some(&2));
    assert_eq!(facets.modality.get("online"), None, "dropped courses do not count");
}

#[test]
fn level_filter_is_exact() {
    let criteria = FilterCriteria {
        level: Some("undergraduate".to_string()),
        ..Default::default()
    };
    let (filtered, _) = filter::apply(sample_set(), &criteria);
    assert_eq!(filtered.len(), 3);

    let criteria = FilterCriteria {
        level: Some("graduate".to_string()),
        ..Default::default()
    };
    let (filtered, _) = filter::apply(sample_set(), &criteria);
    assert!(filtered.is_empty());
}
