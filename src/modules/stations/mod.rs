pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::{init_stations_admin_router, init_stations_router};
pub use service::StationService;
