pub mod app;
pub mod collector;
pub mod input;
pub mod logging;
pub mod settings;
