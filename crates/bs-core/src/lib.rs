//! bs-core: stable foundation for bsim.
//!
//! Contains:
//! - ids (stable compact IDs for components in a project arena)
//! - numeric (Real + tolerances + float helpers)
//! - log (the message sink used by projects and readers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod log;
pub mod numeric;

pub use error::{BsError, BsResult};
pub use ids::*;
pub use log::{LogSink, MemorySink, TracingSink};
pub use numeric::*;
