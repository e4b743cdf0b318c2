pub mod aggregator;
pub mod filter;
pub mod geo;
pub mod merge;
pub mod query;
pub mod transform;

pub use query::{DetailRequest, ListRequest, PartnerContext, QueryService};
