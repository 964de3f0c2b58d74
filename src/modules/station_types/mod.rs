pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::{init_station_types_admin_router, init_station_types_router};
pub use service::StationTypeService;
