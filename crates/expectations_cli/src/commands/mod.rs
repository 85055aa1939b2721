pub mod check;
pub mod init;
pub mod list;
pub mod save;
pub mod show;
pub mod validate;

use anyhow::{Context, Result};
use expectations_store::{StoreConfig, SuiteStore};
use std::path::Path;

/// Opens the local-directory suite store rooted at `root`.
pub(crate) fn open_store(root: &Path) -> Result<SuiteStore> {
    let store = StoreConfig::builder()
        .local(root)
        .build()
        .and_then(|config| config.open())
        .with_context(|| format!("Failed to open suite store: {}", root.display()))?;
    Ok(store)
}
