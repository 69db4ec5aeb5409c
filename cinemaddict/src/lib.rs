mod app;
pub mod board;
pub mod components;
pub mod context;
pub mod controllers;
pub mod dom;
mod error;
pub mod input;
pub mod logging;
pub mod models;
pub mod settings;
pub mod timers;
mod utils;

pub use app::{App, Page};
pub use error::Error;

// Always expose testing module (integration tests need it)
pub mod testing;
