use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;
use crate::models::catalog::{
    Category, Course, CourseOffering, Institution, ModalityRef, PeriodRef, Unit,
};

/// Full canonical dataset, loaded once at startup. Immutable reference
/// data; the system of record when no external enrichment is requested.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub institutions: Vec<Institution>,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub modalities: Vec<ModalityRef>,
    #[serde(default)]
    pub periods: Vec<PeriodRef>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub offerings: Vec<CourseOffering>,
}

impl CatalogData {
    /// Every foreign key must resolve; a catalog with dangling references
    /// is rejected at load time.
    pub fn validate(&self) -> Result<(), AppError> {
        let institutions: HashSet<i64> = self.institutions.iter().map(|i| i.id).collect();
        let units: HashSet<i64> = self.units.iter().map(|u| u.id).collect();
        let categories: HashSet<i64> = self.categories.iter().map(|c| c.id).collect();
        let modalities: HashSet<i64> = self.modalities.iter().map(|m| m.id).collect();
        let periods: HashSet<i64> = self.periods.iter().map(|p| p.id).collect();
        let courses: HashSet<i64> = self.courses.iter().map(|c| c.id).collect();

        for unit in &self.units {
            if !institutions.contains(&unit.institution_id) {
                return Err(AppError::BadRequest(format!(
                    "Catalog: unit {} references missing institution {}",
                    unit.id, unit.institution_id
                )));
            }
        }

        for course in &self.courses {
            if !categories.contains(&course.category_id) {
                return Err(AppError::BadRequest(format!(
                    "Catalog: course {} references missing category {}",
                    course.id, course.category_id
                )));
            }
        }

        for offering in &self.offerings {
            if !courses.contains(&offering.course_id) {
                return Err(AppError::BadRequest(format!(
                    "Catalog: offering {} references missing course {}",
                    offering.id, offering.course_id
                )));
            }
            if !units.contains(&offering.unit_id) {
                return Err(AppError::BadRequest(format!(
                    "Catalog: offering {} references missing unit {}",
                    offering.id, offering.unit_id
                )));
            }
            if !modalities.contains(&offering.modality_id) {
                return Err(AppError::BadRequest(format!(
                    "Catalog: offering {} references missing modality {}",
                    offering.id, offering.modality_id
                )));
            }
            if !periods.contains(&offering.period_id) {
                return Err(AppError::BadRequest(format!(
                    "Catalog: offering {} references missing period {}",
                    offering.id, offering.period_id
                )));
            }
        }

        Ok(())
    }
}

/// One active offering joined with its reference rows.
#[derive(Debug, Clone)]
pub struct OfferingJoin {
    pub offering: CourseOffering,
    pub course: Course,
    pub unit: Unit,
    pub category: Category,
    pub modality: ModalityRef,
    pub period: PeriodRef,
}

pub struct CatalogRepository {
    data: CatalogData,
    units_by_id: HashMap<i64, usize>,
    courses_by_id: HashMap<i64, usize>,
    categories_by_id: HashMap<i64, usize>,
    modalities_by_id: HashMap<i64, usize>,
    periods_by_id: HashMap<i64, usize>,
}

impl CatalogRepository {
    pub fn new(data: CatalogData) -> Result<Self, AppError> {
        data.validate()?;
        let units_by_id = data.units.iter().enumerate().map(|(i, u)| (u.id, i)).collect();
        let courses_by_id = data.courses.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
        let categories_by_id = data.categories.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
        let modalities_by_id = data.modalities.iter().enumerate().map(|(i, m)| (m.id, i)).collect();
        let periods_by_id = data.periods.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        Ok(Self {
            data,
            units_by_id,
            courses_by_id,
            categories_by_id,
            modalities_by_id,
            periods_by_id,
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::BadRequest(format!("Failed to read catalog file {}: {}", path.display(), e))
        })?;
        let data: CatalogData = serde_json::from_str(&raw).map_err(|e| {
            AppError::BadRequest(format!("Failed to parse catalog file {}: {}", path.display(), e))
        })?;
        Self::new(data)
    }

    pub fn institution_by_slug(&self, slug: &str) -> Option<&Institution> {
        self.data
            .institutions
            .iter()
            .find(|i| i.slug.eq_ignore_ascii_case(slug))
    }

    pub fn unit_by_id(&self, id: i64) -> Option<&Unit> {
        self.units_by_id.get(&id).map(|&i| &self.data.units[i])
    }

    /// All active offerings of an institution's units, joined with their
    /// reference rows. Validation at load time guarantees the lookups.
    pub fn active_offerings(&self, institution_id: i64) -> Vec<OfferingJoin> {
        self.data
            .offerings
            .iter()
            .filter(|o| o.active)
            .filter_map(|offering| {
                let unit = self.unit_by_id(offering.unit_id)?;
                if unit.institution_id != institution_id {
                    return None;
                }
                let course = self.courses_by_id.get(&offering.course_id).map(|&i| &self.data.courses[i])?;
                let category = self.categories_by_id.get(&course.category_id).map(|&i| &self.data.categories[i])?;
                let modality = self.modalities_by_id.get(&offering.modality_id).map(|&i| &self.data.modalities[i])?;
                let period = self.periods_by_id.get(&offering.period_id).map(|&i| &self.data.periods[i])?;
                Some(OfferingJoin {
                    offering: offering.clone(),
                    course: course.clone(),
                    unit: unit.clone(),
                    category: category.clone(),
                    modality: modality.clone(),
                    period: period.clone(),
                })
            })
            .collect()
    }

    pub fn institution_count(&self) -> usize {
        self.data.institutions.len()
    }
}
