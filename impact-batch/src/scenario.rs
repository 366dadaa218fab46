//! Scenario file reader and writer
//!
//! A scenario file is line-oriented text with optional `[section]` headers
//! followed by `key: value` lines:
//!
//! ```text
//! [jakarta_flood]
//! hazard: hazard/jakarta_flood_2007.shp
//! exposure: exposure/DKI_buildings.shp
//! function: Flood Building Impact Function
//! aggregation: boundaries/kelurahan.shp
//! extent: 106.7, -6.3, 106.9, -6.1
//! ```
//!
//! A file without any header is read as one section named after the file stem.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

/// Key/value options of one scenario section
pub type ScenarioRecord = BTreeMap<String, String>;

/// Scenario name -> options
pub type Scenarios = BTreeMap<String, ScenarioRecord>;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("layer path {} is not absolute", .0.display())]
    RelativeLayerPath(PathBuf),
    #[error("scenario title must not be empty")]
    EmptyTitle,
    #[error("failed to write scenario file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn section_header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[(.*)\]$").expect("valid regex"))
}

/// Read all scenarios from `path`.
///
/// A missing or unreadable file yields an empty mapping, and lines that are
/// neither headers nor `key: value` pairs are skipped.
pub fn read_scenarios(path: &Path) -> Scenarios {
    let mut scenarios = Scenarios::new();
    for (name, record) in read_scenarios_ordered(path) {
        scenarios.entry(name).or_default().extend(record);
    }
    scenarios
}

/// Like [`read_scenarios`], keeping sections in file order.
pub fn read_scenarios_ordered(path: &Path) -> Vec<(String, ScenarioRecord)> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read scenario file");
            return Vec::new();
        }
    };

    let sections = parse_scenarios(&content, &file_stem(path));
    debug!(
        path = %path.display(),
        sections = sections.len(),
        "parsed scenario file"
    );
    sections
}

/// Parse scenario text; `default_name` names the implicit section of a header-less file.
pub fn parse_scenarios(content: &str, default_name: &str) -> Vec<(String, ScenarioRecord)> {
    let header = section_header_regex();
    let has_header = content.lines().any(|line| header.is_match(line.trim_end()));

    let mut sections: Vec<(String, ScenarioRecord)> = Vec::new();
    let mut current: Option<(String, ScenarioRecord)> = if has_header {
        None
    } else {
        Some((default_name.to_string(), ScenarioRecord::new()))
    };

    for raw in content.lines() {
        let line = raw.trim_end();

        if let Some(caps) = header.captures(line) {
            if let Some(done) = current.take() {
                push_section(&mut sections, done);
            }
            current = Some((caps[1].trim().to_string(), ScenarioRecord::new()));
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        // Keys ahead of the first header have no section to land in
        if let Some((_, record)) = current.as_mut() {
            record.insert(key.to_string(), value.trim().to_string());
        }
    }

    if let Some(done) = current.take() {
        push_section(&mut sections, done);
    }
    sections
}

/// Repeated section names merge into the first occurrence.
fn push_section(sections: &mut Vec<(String, ScenarioRecord)>, section: (String, ScenarioRecord)) {
    let (name, record) = section;
    match sections.iter_mut().find(|(existing, _)| *existing == name) {
        Some((_, existing)) => existing.extend(record),
        None => sections.push((name, record)),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Scenario captured from a pair of absolute layer paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedScenario {
    pub title: String,
    pub root: PathBuf,
    pub hazard: String,
    pub exposure: String,
    pub function: String,
}

impl SavedScenario {
    /// Build a scenario whose `path` is the deepest directory shared by both layers.
    ///
    /// The title defaults to the hazard file stem.
    pub fn from_layers(
        title: Option<&str>,
        hazard: &Path,
        exposure: &Path,
        function: &str,
    ) -> Result<Self, ScenarioError> {
        for layer in [hazard, exposure] {
            if !layer.is_absolute() {
                return Err(ScenarioError::RelativeLayerPath(layer.to_path_buf()));
            }
        }

        let root = common_root(hazard, exposure);
        let relative = |p: &Path| -> String {
            p.strip_prefix(&root)
                .unwrap_or(p)
                .to_string_lossy()
                .to_string()
        };

        let title = match title {
            Some(t) => t.trim().to_string(),
            None => file_stem(hazard),
        };
        if title.is_empty() {
            return Err(ScenarioError::EmptyTitle);
        }

        Ok(Self {
            title,
            hazard: relative(hazard),
            exposure: relative(exposure),
            root,
            function: function.to_string(),
        })
    }

    pub fn render(&self) -> String {
        format!(
            "[{}]\npath: {}\nexposure: {}\nhazard: {}\nfunction: {}\n",
            self.title,
            self.root.display(),
            self.exposure,
            self.hazard,
            self.function
        )
    }
}

/// Write `scenario` as a single-section scenario file.
pub fn write_scenario(path: &Path, scenario: &SavedScenario) -> Result<(), ScenarioError> {
    let write_err = |source| ScenarioError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }
    fs::write(path, scenario.render()).map_err(write_err)?;
    debug!(path = %path.display(), title = %scenario.title, "saved scenario");
    Ok(())
}

/// Deepest directory containing both paths.
fn common_root(a: &Path, b: &Path) -> PathBuf {
    let a_dir = a.parent().unwrap_or(a);
    let b_dir = b.parent().unwrap_or(b);

    let mut root = PathBuf::new();
    for (x, y) in a_dir.components().zip(b_dir.components()) {
        if x != y {
            break;
        }
        match x {
            Component::CurDir => continue,
            other => root.push(other.as_os_str()),
        }
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MULTI_SECTION: &str = "\
[Merapi_volcano_osm_buildings]
exposure: Merapi/Data/bangunan.shp
hazard: Merapi/Data/merapi_krb.shp
function: Volcano Building Impact
extent: 110.13,-7.81,110.67,-7.50

[Merapi_volcano_population]
exposure: Merapi/Data/jawa2_popmap10_all.tif
hazard: Merapi/Data/merapi_krb.shp
function: Volcano Polygon Hazard Population
extent: 110.13,-7.81,110.67,-7.50
";

    #[test]
    fn test_read_multi_section_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test-scenario-input.txt");
        fs::write(&path, MULTI_SECTION).unwrap();

        let scenarios = read_scenarios(&path);
        assert_eq!(scenarios.len(), 2);

        let buildings = &scenarios["Merapi_volcano_osm_buildings"];
        assert_eq!(buildings["exposure"], "Merapi/Data/bangunan.shp");
        assert_eq!(buildings["hazard"], "Merapi/Data/merapi_krb.shp");
        assert_eq!(buildings["function"], "Volcano Building Impact");
        assert_eq!(buildings["extent"], "110.13,-7.81,110.67,-7.50");

        let population = &scenarios["Merapi_volcano_population"];
        assert_eq!(population["function"], "Volcano Polygon Hazard Population");
    }

    #[test]
    fn test_two_sections_keep_values_verbatim() {
        let content = "[a]\nhazard: h1.shp\nexposure: e1.tif\nfunction: 42\n[b]\nhazard: h2.shp\nexposure: e2.tif\nfunction: F two\n";
        let sections = parse_scenarios(content, "ignored");

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].0, "a");
        assert_eq!(sections[1].0, "b");
        assert_eq!(sections[0].1.len(), 3);
        assert_eq!(sections[0].1["function"], "42");
        assert_eq!(sections[1].1["function"], "F two");
    }

    #[test]
    fn test_headerless_file_uses_file_stem() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("foo.txt");
        fs::write(&path, "hazard: x\n").unwrap();

        let scenarios = read_scenarios(&path);
        let mut expected = Scenarios::new();
        expected.insert(
            "foo".to_string(),
            [("hazard".to_string(), "x".to_string())].into_iter().collect(),
        );
        assert_eq!(scenarios, expected);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let scenarios = read_scenarios(Path::new("/nonexistent/scenarios.txt"));
        assert!(scenarios.is_empty());
    }

    #[test]
    fn test_value_split_at_first_colon() {
        let sections = parse_scenarios("[s]\npath: C:\\data\\inasafe\n", "x");
        assert_eq!(sections[0].1["path"], "C:\\data\\inasafe");
    }

    #[test]
    fn test_malformed_and_blank_lines_are_skipped() {
        let content = "[s]\n\nthis line has no separator\n   \nhazard :  h.shp  \n# note: not a key\n";
        let sections = parse_scenarios(content, "x");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].1.len(), 1);
        assert_eq!(sections[0].1["hazard"], "h.shp");
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        let sections = parse_scenarios("[s]\nhazard: first\nhazard: second\n", "x");
        assert_eq!(sections[0].1["hazard"], "second");
    }

    #[test]
    fn test_keys_before_first_header_are_dropped() {
        let sections = parse_scenarios("orphan: value\n[s]\nhazard: h\n", "x");
        assert_eq!(sections.len(), 1);
        assert!(!sections[0].1.contains_key("orphan"));
    }

    #[test]
    fn test_repeated_section_merges() {
        let sections = parse_scenarios("[s]\nhazard: h\n[t]\nhazard: t\n[s]\nexposure: e\n", "x");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].0, "s");
        assert_eq!(sections[0].1["hazard"], "h");
        assert_eq!(sections[0].1["exposure"], "e");
    }

    #[test]
    fn test_saved_scenario_uses_common_root() {
        let saved = SavedScenario::from_layers(
            None,
            Path::new("/data/jakarta/hazard/flood_2007.shp"),
            Path::new("/data/jakarta/exposure/buildings.shp"),
            "Flood Building Impact Function",
        )
        .unwrap();

        assert_eq!(saved.title, "flood_2007");
        assert_eq!(saved.root, PathBuf::from("/data/jakarta"));
        assert_eq!(saved.hazard, "hazard/flood_2007.shp");
        assert_eq!(saved.exposure, "exposure/buildings.shp");
    }

    #[test]
    fn test_saved_scenario_rejects_relative_paths() {
        let err = SavedScenario::from_layers(
            Some("t"),
            Path::new("hazard.shp"),
            Path::new("/data/exposure.shp"),
            "f",
        )
        .unwrap_err();
        assert!(matches!(err, ScenarioError::RelativeLayerPath(_)));
    }

    #[test]
    fn test_write_scenario_reads_back() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("saved").join("jakarta.txt");
        let saved = SavedScenario::from_layers(
            Some("Jakarta flood"),
            Path::new("/data/hazard/flood.shp"),
            Path::new("/data/exposure/people.asc"),
            "Flood Evacuation Function",
        )
        .unwrap();

        write_scenario(&out, &saved).unwrap();

        let scenarios = read_scenarios(&out);
        let record = &scenarios["Jakarta flood"];
        assert_eq!(record["path"], "/data");
        assert_eq!(record["hazard"], "hazard/flood.shp");
        assert_eq!(record["exposure"], "exposure/people.asc");
        assert_eq!(record["function"], "Flood Evacuation Function");
    }
}
