//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod reconstruct;

// Re-export main command functions
pub use models::ReconstructArgs;
pub use reconstruct::{execute_reconstruct, reconstruct_file, validate_args};
