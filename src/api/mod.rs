//! Backend and device-service adapters behind the use case contracts.

pub mod chat;
pub mod http;
pub mod push;
pub mod telemetry;

/// Returns the api module name for smoke checks.
pub fn module_name() -> &'static str {
    "api"
}
