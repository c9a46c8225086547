pub mod config;
pub mod errors;
pub mod geo;
pub mod geolocation;
pub mod logging;
pub mod map;
pub mod session;
pub mod store;
pub mod workout;
