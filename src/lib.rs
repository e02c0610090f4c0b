pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod descendants;
pub mod error;
pub mod export;
pub mod fitch;
pub mod metadata;
pub mod tree;
pub mod utils;

// Re-export main API
pub use api::*;
pub use error::{Error, Result};
pub use fitch::{AmbiguityPolicy, Reconstruction, ReconstructionOptions, Reconstructor};
pub use metadata::{FieldSelection, FieldTable};
pub use tree::{parse_newick, read_newick, Tree};
