//! UEF File Loader Domain
//!
//! Handles file I/O for UEF captures, including the single transparent
//! gzip unwrap performed before giving up on a file.

pub mod loader;

pub use loader::{load_uef, UefFileLoader};
