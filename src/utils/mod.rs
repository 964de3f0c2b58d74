//! Shared helpers.
//!
//! - [`id`]: path id parsing

pub mod id;
