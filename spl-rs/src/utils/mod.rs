//! Shared utilities for the spl-rs CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
