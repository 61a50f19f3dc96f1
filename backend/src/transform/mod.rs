//! Record transformation.
//!
//! Stages, applied in order to each loaded row:
//! - Cleaner: required fields, defaults, control characters
//! - Mapper: target keys and nutrient codes
//! - Filter: identifier format
//! - Enricher: brand merge, weights, constants, boost
//! - Pipeline: orchestration from input file to chunk files

pub mod cleaner;
pub mod enricher;
pub mod filter;
pub mod mapper;
pub mod pipeline;

pub use cleaner::clean;
pub use enricher::enrich;
pub use filter::filter_record;
pub use mapper::map_record;
pub use pipeline::*;
