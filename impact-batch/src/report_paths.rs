//! Report path policy
//!
//! A report title maps to a `(map, table)` PDF pair under a base directory:
//! `"Foo Bar"` under `/reports` becomes `/reports/Foo_Bar.pdf` and
//! `/reports/Foo_Bar_table.pdf`. The base directory may contain a `{date}`
//! placeholder, substituted with today's local date (`YYYY-MM-DD`) at call
//! time, so [`report_paths`] depends on the current date.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::types::ReportPaths;

const DATE_PLACEHOLDER: &str = "{date}";

/// Report paths for `title` under `base`, with `{date}` set to today.
pub fn report_paths(base: &str, title: &str) -> ReportPaths {
    report_paths_on(base, title, Local::now().date_naive())
}

/// Report paths for `title` under `base`, with `{date}` set to `date`.
pub fn report_paths_on(base: &str, title: &str, date: NaiveDate) -> ReportPaths {
    let base = expand_base(base, date);
    let file_name = format!("{}.pdf", title.replace(' ', "_"));
    let map = base.join(file_name);
    let table = table_path_for(&map);
    ReportPaths { map, table }
}

/// Substitute `{date}` in the report base directory.
pub fn expand_base(base: &str, date: NaiveDate) -> PathBuf {
    PathBuf::from(base.replace(DATE_PLACEHOLDER, &date.format("%Y-%m-%d").to_string()))
}

/// `dir/name.pdf` -> `dir/name_table.pdf`
fn table_path_for(map: &Path) -> PathBuf {
    let stem = map
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    map.with_file_name(format!("{stem}_table.pdf"))
}

/// Report files for `titles` under `base` that already exist on disk.
pub fn existing_reports<S: AsRef<str>>(base: &str, titles: &[S]) -> Vec<PathBuf> {
    titles
        .iter()
        .flat_map(|title| {
            let paths = report_paths(base, title.as_ref());
            [paths.map, paths.table]
        })
        .filter(|path| path.exists())
        .collect()
}
