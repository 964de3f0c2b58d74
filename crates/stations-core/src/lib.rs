//! # Stations Core
//!
//! Core types shared by every crate in the Stations API workspace:
//!
//! - [`errors`]: the application error taxonomy and its HTTP rendering
//! - [`password`]: bcrypt password hashing and verification
//! - [`patch`]: tri-state update fields for partial updates

pub mod errors;
pub mod password;
pub mod patch;

pub use errors::{AppError, ErrorResponse, FieldError, ShutdownRequested};
pub use password::{DEFAULT_COST, hash_password, hash_password_with_cost, verify_password};
pub use patch::Patch;
