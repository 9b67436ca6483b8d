//! Domain layer: session model, flow classification and screen state.

pub mod deep_link;
pub mod login_flow;
pub mod password_policy;
pub mod session;
pub mod session_store;
pub mod view_state;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
