pub mod auth;
pub mod check;
pub mod completions;
pub mod config;
pub mod sync;
pub mod week;
