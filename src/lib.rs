pub mod app;
pub mod config;
pub mod constants;
pub mod convert;
pub mod format;
pub mod handlers;
pub mod server;
pub mod service;

pub use app::{AppState, Imgconvert, InitError};
pub use format::TargetFormat;
pub use service::{HandlerError, InvocationEvent, InvocationResponse};
