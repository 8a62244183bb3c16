//! `replica init`: turn a directory into a template.

use crate::config::write_default_config;
use crate::error::Result;
use crate::logger::success;
use std::path::Path;

pub fn run(dir: &Path) -> Result<()> {
    let path = write_default_config(dir)?;
    success(format!("Initialized a new template in '{}' ({})", dir.display(), path.display()));
    Ok(())
}
