pub mod errors;
pub mod handler;
pub mod types;

pub use errors::ScanError;
pub use handler::scan_region;
pub use types::{QueryFailure, RegionFinding, ScanSettings, Tier};
