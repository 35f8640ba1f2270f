mod animation;
mod app;
mod config;
mod effects;
mod logging;
mod page;
mod ui;

pub use app::run_app;
