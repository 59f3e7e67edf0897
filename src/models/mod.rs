pub mod catalog;
mod results;

pub use catalog::{quote_ident, Catalog, IntegrityRule, RoutineSpec, TableSpec};
pub use results::{
    IntegrityResult, PipelineState, ProbeError, ProbeResult, RoutineCheckResult,
    TableCheckResult, WriteStatus,
};
