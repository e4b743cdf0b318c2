use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Institution {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    pub institution_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Reference row for a teaching modality (e.g. "Presencial", "EAD").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalityRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Reference row for a period / shift (e.g. "Matutino", "Noturno").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub category_id: i64,
    pub kind: String,
    pub workload: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOffering {
    pub id: i64,
    pub course_id: i64,
    pub unit_id: i64,
    pub modality_id: i64,
    pub period_id: i64,
    pub price: Option<f64>,
    /// Free text, e.g. "5 anos".
    pub duration: Option<String>,
    pub enrollment_open: bool,
    pub active: bool,
}
