use std::sync::Mutex;

use crate::usecases::contracts::{Analytics, CrashReporter, CrashUser};

/// Analytics sink that writes events to the `analytics` tracing target.
#[derive(Debug, Default)]
pub struct TracingAnalytics {
    user_id: Mutex<Option<String>>,
}

impl TracingAnalytics {
    fn user(&self) -> Option<String> {
        self.user_id.lock().ok().and_then(|user| user.clone())
    }
}

impl Analytics for TracingAnalytics {
    fn set_user(&self, user_id: &str) {
        if let Ok(mut user) = self.user_id.lock() {
            *user = Some(user_id.to_owned());
        }
        tracing::info!(target: "analytics", user_id, "identify");
    }

    fn set_user_property(&self, key: &str, value: &str) {
        tracing::info!(target: "analytics", user_id = ?self.user(), key, value, "user property");
    }

    fn log_event(&self, name: &str, props: &[(&str, &str)]) {
        let props = props
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(",");
        tracing::info!(target: "analytics", user_id = ?self.user(), event = name, props = %props, "event");
    }

    fn track(&self, event: &str) {
        tracing::info!(target: "analytics", user_id = ?self.user(), event, "track");
    }

    fn flush(&self) {
        tracing::debug!(target: "analytics", "flush");
    }

    fn reset(&self) {
        if let Ok(mut user) = self.user_id.lock() {
            *user = None;
        }
        tracing::info!(target: "analytics", "reset");
    }
}

/// Crash reporter stand-in: user context is logged, nothing is uploaded.
#[derive(Debug, Default)]
pub struct TracingCrashReporter;

impl CrashReporter for TracingCrashReporter {
    fn set_user_context(&self, user: Option<CrashUser>) {
        match user {
            Some(user) => tracing::debug!(target: "crash", user_id = %user.id, "crash context set"),
            None => tracing::debug!(target: "crash", "crash context cleared"),
        }
    }
}
