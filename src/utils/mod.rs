pub mod compression;
pub mod delimited;
pub(crate) mod progress_bar_builder;
pub mod threading;
