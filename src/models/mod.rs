pub mod catalog;
pub mod dto;

pub use catalog::{Category, Course, CourseOffering, Institution, ModalityRef, PeriodRef, Unit};
pub use dto::{
    CampusRef, CourseDetails, CourseListResponse, CourseSummary, FacetCounts, OfferingDetail,
    RelatedCourse, StaffMember, UnitDetail,
};
