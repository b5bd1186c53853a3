//! Core library for sweep.
//!
//! Finds which subscribed regions still hold live, billable resources in a
//! compartment so the cleanup executor only has to visit those regions.

pub mod backend;
pub mod catalog;
pub mod compartment;
pub mod discovery;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod logging;
pub mod pipeline;
pub mod scan;

pub use backend::{
    CompartmentSummary, FixtureBackend, FixtureData, OciCliBackend, ResourceRecord, SearchBackend,
    SearchPage, SearchQuery, build_backend,
};
pub use catalog::{ResolvedCatalog, fetch_catalog};
pub use compartment::{lookup_compartment, resolve_compartment};
pub use discovery::{
    CleanupReason, DiscoveryOptions, DiscoveryReport, RegionVerdict, discover, plan_cleanup,
};
pub use errors::{SweepError, SweepResult};
pub use logging::init_logging;
pub use pipeline::{
    CleanupInvoker, CleanupOutcome, CleanupRequest, ProcessCleanupInvoker, StageOutput,
    invoke_cleanup, run_pre_clean,
};
pub use scan::{RegionFinding, ScanSettings, Tier, scan_region};
