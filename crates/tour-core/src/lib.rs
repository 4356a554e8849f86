pub mod autostart;
pub mod cancel;
pub mod config;
pub mod controller;
pub mod error;
pub mod io;
pub mod kv;
pub mod localize;
pub mod paths;
pub mod persist;
pub mod progress;
pub mod registry;
pub mod runner;
pub mod state;
pub mod store;
pub mod types;

pub use error::{Result, TourError};
