//! Paths command handler.

use anyhow::Result;

use potd_core::{data_root, database_path};

/// Print the resolved paths in `key = value` format.
pub fn execute() -> Result<()> {
    println!("data_root = {}", data_root()?.display());
    println!("database = {}", database_path()?.display());
    Ok(())
}
