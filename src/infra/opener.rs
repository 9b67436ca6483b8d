use anyhow::{Context, Result};

use crate::infra::contracts::ExternalOpener;

/// Opens URLs with the desktop's default handler.
#[derive(Debug, Clone, Default)]
pub struct SystemOpener;

impl ExternalOpener for SystemOpener {
    fn open(&self, target: &str) -> Result<()> {
        open::that(target).with_context(|| format!("open {target}"))
    }
}
