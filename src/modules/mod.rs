//! Feature modules. Each has a `controller`, `service`, `model` and `router`.

pub mod account;
pub mod health;
pub mod station_types;
pub mod stations;
