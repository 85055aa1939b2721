use anyhow::{Context, Result};
use std::path::Path;

use super::open_store;
use crate::output;

pub async fn execute(store_root: &Path, prefix: &str) -> Result<()> {
    let store = open_store(store_root)?;
    let keys = store
        .list(prefix)
        .await
        .with_context(|| format!("Failed to list keys under '{}'", prefix))?;

    if keys.is_empty() {
        output::print_info("No entries found");
        return Ok(());
    }

    for key in &keys {
        println!("{}", key);
    }

    Ok(())
}
