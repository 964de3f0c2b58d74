//! # Stations Models
//!
//! Domain models and request DTOs:
//!
//! - [`account`]: accounts that can log in and own stations
//! - [`station_type`]: categories of station
//! - [`station`]: stations belonging to a station type

pub mod account;
pub mod station;
pub mod station_type;
