use error::Error;

pub mod broadcast;
pub mod config;
pub mod controls;
pub mod cycle;
pub mod error;
pub mod fade;
pub mod models;
pub mod notification;
pub mod player;
pub mod simulated;
pub mod sink;
mod timer;
pub mod tracklist;

pub use tracklist::Status;

pub type Result<T, E = Error> = std::result::Result<T, E>;
