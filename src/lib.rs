//! Client core of the tasks and groups mini-app: backend resolution, the
//! typed API gateway, session navigation and per-screen data controllers.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod host;
pub mod models;
pub mod navigation;
pub mod screens;
pub mod state;

pub use app::{App, AppOptions};
pub use error::AppError;
