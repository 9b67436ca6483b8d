use std::sync::{Arc, Mutex};

/// Pending in-app navigation target to resume once login completes.
#[derive(Clone, Debug, Default)]
pub struct DeepLinkSlot {
    inner: Arc<Mutex<Option<String>>>,
}

impl DeepLinkSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self, link: impl Into<String>) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = Some(link.into());
        }
    }

    /// Consumes the pending link, leaving the slot empty.
    pub fn take(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|mut slot| slot.take())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn peek(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|slot| slot.clone())
    }
}
