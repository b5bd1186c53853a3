pub mod errors;
pub mod handler;
pub mod types;

// Public API exports
pub use errors::DiscoveryError;
pub use handler::{discover, plan_cleanup};
pub use types::{CleanupReason, DiscoveryOptions, DiscoveryReport, RegionVerdict};
