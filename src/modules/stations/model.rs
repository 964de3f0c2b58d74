pub use stations_models::station::{NewStation, Station, UpdateStation};
