pub mod app;
pub mod config;
pub mod geodata;
pub mod resolver;
pub mod rng;
pub mod web;

pub use app::{App, AppError, AppEvent, Effect};
pub use config::{AppConfig, ConfigLoader};
pub use geodata::{CountryCollection, GeoDataLoader, GeoPoint, LoadError};
pub use resolver::{DataNotReady, PointResolver};
