pub mod errors;
pub mod handler;

pub use errors::CompartmentError;
pub use handler::{lookup_compartment, resolve_compartment};
