//! Output file naming.
//!
//! Artifact paths are relative to the report output directory, which is
//! also what the page's iframes load.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Directory (under the output directory) holding per-slice artifacts.
pub const CITYMAPS_DIR: &str = "citymaps";

/// File name of the interactive page.
pub const PAGE_FILE: &str = "map_visualization.html";

/// Makes a quarter label safe for file names.
#[must_use]
pub fn sanitize_quarter(quarter: &str) -> String {
    quarter.replace(' ', "_")
}

/// Makes a category label safe for file names.
#[must_use]
pub fn sanitize_category(category: &str) -> String {
    category.replace(' ', "_").replace('/', "-")
}

/// Relative artifact path for a (quarter, category, city index) triple.
#[must_use]
pub fn artifact_path(quarter: &str, category: &str, city_index: usize) -> String {
    format!(
        "{CITYMAPS_DIR}/map_q_{}_city_{city_index}_cat_{}.html",
        sanitize_quarter(quarter),
        sanitize_category(category)
    )
}

/// Reserves `path` in `used`, appending `_2`, `_3`, ... before the
/// extension when sanitizing made two labels map to the same file.
pub fn claim_unique(used: &mut BTreeSet<String>, path: String) -> String {
    if used.insert(path.clone()) {
        return path;
    }

    let (stem, ext) = path
        .rsplit_once('.')
        .unwrap_or((path.as_str(), ""));
    let mut n = 2_usize;
    loop {
        let candidate = if ext.is_empty() {
            format!("{stem}_{n}")
        } else {
            format!("{stem}_{n}.{ext}")
        };
        if used.insert(candidate.clone()) {
            log::warn!("Artifact name {path} already taken, using {candidate}");
            return candidate;
        }
        n += 1;
    }
}

/// Returns the interactive page path under `out_dir`.
#[must_use]
pub fn page_path(out_dir: &Path) -> PathBuf {
    out_dir.join(PAGE_FILE)
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
