use std::collections::{BTreeSet, HashMap};

use crate::partner::dto::{PartnerRow, PartnerUnit};
use crate::services::transform::parse_brl;

/// Canonical modality categories. Source labels outside the known
/// vocabulary are carried in `Unknown` with their original text, so
/// unmapped values stay visible instead of silently passing through.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modality {
    InPerson,
    Online,
    Hybrid,
    Unknown(String),
}

impl Modality {
    pub fn classify(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "presencial" | "in-person" => Modality::InPerson,
            "ead" | "online" | "a distância" | "a distancia" | "distância" | "distancia"
            | "educação a distância" | "educacao a distancia" => Modality::Online,
            "semipresencial" | "semi presencial" | "semi-presencial" | "híbrido" | "hibrido"
            | "hybrid" | "flex" => Modality::Hybrid,
            _ => Modality::Unknown(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Modality::InPerson => "in-person",
            Modality::Online => "online",
            Modality::Hybrid => "hybrid",
            Modality::Unknown(original) => original,
        }
    }
}

/// Canonical shift (time-of-day track) categories.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
    FullTime,
    Virtual,
    Unknown(String),
}

impl Shift {
    pub fn classify(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "matutino" | "manhã" | "manha" | "morning" => Shift::Morning,
            "vespertino" | "tarde" | "afternoon" => Shift::Afternoon,
            "noturno" | "noite" | "evening" => Shift::Evening,
            "integral" | "full-time" => Shift::FullTime,
            "virtual" | "virtual/ead" => Shift::Virtual,
            _ => Shift::Unknown(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Shift::Morning => "morning",
            Shift::Afternoon => "afternoon",
            Shift::Evening => "evening",
            Shift::FullTime => "full-time",
            Shift::Virtual => "virtual",
            Shift::Unknown(original) => original,
        }
    }
}

/// Degree level.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Undergraduate,
    Graduate,
    Unknown(String),
}

impl Level {
    pub fn classify(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "graduação" | "graduacao" | "bacharelado" | "licenciatura" | "tecnólogo"
            | "tecnologo" | "superior" | "undergraduate" => Level::Undergraduate,
            "pós-graduação" | "pos-graduacao" | "pós" | "pos" | "especialização"
            | "especializacao" | "mba" | "mestrado" | "graduate" => Level::Graduate,
            _ => Level::Unknown(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Level::Undergraduate => "undergraduate",
            Level::Graduate => "graduate",
            Level::Unknown(original) => original,
        }
    }
}

/// Unit identity attached to a normalized course record.
#[derive(Debug, Clone)]
pub struct UnitRef {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl UnitRef {
    pub fn from_partner(unit: &PartnerUnit) -> Self {
        Self {
            id: unit.id,
            name: unit.name.clone(),
            city: unit.city.clone(),
            state: unit.state.clone(),
            latitude: None,
            longitude: None,
        }
    }
}

/// Request-scoped normalized course record: one per distinct course within
/// one unit, with unioned modality/shift sets and the minimum price seen.
#[derive(Debug, Clone)]
pub struct AggregatedCourse {
    pub course_id: i64,
    pub sku: String,
    pub name: String,
    pub slug: String,
    pub category: Option<String>,
    pub level: Option<Level>,
    pub modalities: BTreeSet<Modality>,
    pub shifts: BTreeSet<Shift>,
    pub duration_months: Option<u32>,
    pub duration_text: Option<String>,
    pub min_price: Option<f64>,
    pub enrollment_open: bool,
    pub unit: UnitRef,
}

/// Keep the smaller of two optional prices; a present price always beats
/// an absent one.
pub fn min_price(current: Option<f64>, candidate: Option<f64>) -> Option<f64> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

/// Fold one unit's flat partner rows into one record per distinct course,
/// preserving the order of first appearance. The first row for a course
/// seeds singleton modality/shift sets and the starting price; later rows
/// union into the sets and lower the running minimum.
pub fn aggregate(rows: &[PartnerRow], unit: &UnitRef) -> Vec<AggregatedCourse> {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut courses: Vec<AggregatedCourse> = Vec::new();

    for row in rows {
        let price = row.monthly_price.as_deref().and_then(parse_brl);
        let modality = row.modality.as_deref().map(Modality::classify);
        let shift = row.shift.as_deref().map(Shift::classify);

        match index.get(&row.course_code) {
            Some(&at) => {
                let course = &mut courses[at];
                if let Some(m) = modality {
                    course.modalities.insert(m);
                }
                if let Some(s) = shift {
                    course.shifts.insert(s);
                }
                course.min_price = min_price(course.min_price, price);
                if course.duration_months.is_none() {
                    course.duration_months = row.duration_months;
                }
            }
            None => {
                index.insert(row.course_code, courses.len());
                courses.push(AggregatedCourse {
                    course_id: row.course_code,
                    sku: row.course_code.to_string(),
                    name: row.course_name.clone(),
                    slug: crate::services::transform::slugify(&row.course_name),
                    category: None,
                    level: row.level.as_deref().map(Level::classify),
                    modalities: modality.into_iter().collect(),
                    shifts: shift.into_iter().collect(),
                    duration_months: row.duration_months,
                    duration_text: None,
                    min_price: price,
                    enrollment_open: true,
                    unit: unit.clone(),
                });
            }
        }
    }

    courses
}
