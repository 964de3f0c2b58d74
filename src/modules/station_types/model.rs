pub use stations_models::station_type::{NewStationType, StationType, UpdateStationType};
