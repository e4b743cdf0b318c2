//! Envelope and attribute shapes of the CMS filter/populate protocol.
//! Only the documented field contract is modeled; everything else in the
//! payload is ignored.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct CmsResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<CmsDocument<T>>,
}

#[derive(Debug, Deserialize)]
pub struct CmsDocument<T> {
    pub id: i64,
    pub attributes: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsCourse {
    pub sku: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub duration_months: Option<u32>,
    #[serde(default)]
    pub modalities: Vec<String>,
    #[serde(default)]
    pub units: Vec<CmsUnit>,
    #[serde(default)]
    pub offers: Vec<CmsOffer>,
    #[serde(default)]
    pub related_courses: Vec<CmsRelatedCourse>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsUnit {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsOffer {
    pub unit_id: i64,
    pub modality: String,
    #[serde(default)]
    pub shift: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub enrollment_open: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsStaff {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsRelatedCourse {
    pub sku: String,
    pub slug: String,
    pub title: String,
}
