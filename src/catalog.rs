//! Slide catalog: subject/unit resolution and the build ledger.
//!
//! Two kinds of YAML documents back the catalog:
//!
//! * `dirinfo.yaml` — the global index. Its `fsyear` key names the active
//!   year table, which carries the source root under `dir` plus one
//!   subject-code → subject-directory entry per subject.
//! * `slideinfo/slideinfo.yaml` — one ledger per subject directory, mapping
//!   unit names to their title, build count, and timestamps.
//!
//! The catalog is constructed once per invocation and passed by reference to
//! whatever needs a lookup; there is no ambient global.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Timestamp format recorded in the ledger.
const LEDGER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The year table selected by `fsyear`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct YearTable {
    /// Source root directory for this year.
    dir: String,
    /// Subject code → subject directory.
    #[serde(flatten)]
    subjects: BTreeMap<String, String>,
}

/// The parsed global index.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DirIndex {
    /// Which year table is active.
    fsyear: String,
    /// Year name → table.
    #[serde(flatten)]
    years: BTreeMap<String, YearTable>,
}

/// One unit's ledger entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Human-readable slide title.
    #[serde(default)]
    pub title: String,
    /// How many times this unit has been built.
    #[serde(default)]
    pub count: u32,
    /// When the unit was first built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// When the unit was last rebuilt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
    /// Any further keys an author keeps in the ledger, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// One subject's ledger: unit name → record.
pub type Ledger = BTreeMap<String, UnitRecord>;

/// Catalog handle over the on-disk index.
#[derive(Debug, Clone)]
pub struct Catalog {
    index_path: PathBuf,
    index: DirIndex,
}

impl Catalog {
    /// Load the global index from `dirinfo.yaml`.
    pub fn load(index_path: &Path) -> Result<Self> {
        if !index_path.exists() {
            return Err(Error::catalog(
                format!("index not found at {}", index_path.display()),
                "Create dirinfo/dirinfo.yaml or point SLIDEFLOW_DIRINFO at it",
            ));
        }
        let raw = fs_err::read_to_string(index_path)?;
        let index: DirIndex = serde_yaml::from_str(&raw)
            .map_err(|e| Error::parse(e.to_string(), index_path.to_path_buf()))?;
        Ok(Self { index_path: index_path.to_path_buf(), index })
    }

    /// The active year table.
    fn year(&self) -> Result<&YearTable> {
        self.index.years.get(&self.index.fsyear).ok_or_else(|| {
            Error::catalog(
                format!(
                    "year table {:?} missing from {}",
                    self.index.fsyear,
                    self.index_path.display()
                ),
                "fsyear must name a top-level table in dirinfo.yaml",
            )
        })
    }

    /// The source root for the active year, `~` expanded.
    pub fn source_root(&self) -> Result<PathBuf> {
        let year = self.year()?;
        Ok(PathBuf::from(shellexpand::tilde(&year.dir).to_string()))
    }

    /// The directory of one subject, relative to the source root.
    pub fn subject_dir(&self, subject: &str) -> Result<&str> {
        self.year()?.subjects.get(subject).map(String::as_str).ok_or_else(|| {
            Error::catalog(
                format!("subject {subject:?} not found in the active year table"),
                "Add the subject code to dirinfo.yaml",
            )
        })
    }

    /// The directory of one unit, relative to the source root.
    pub fn unit_dir(&self, subject: &str, unit: &str) -> Result<String> {
        Ok(format!("{}/{unit}", self.subject_dir(subject)?))
    }

    /// Path of the subject's ledger file.
    fn ledger_path(&self, subject: &str) -> Result<PathBuf> {
        Ok(self
            .source_root()?
            .join(self.subject_dir(subject)?)
            .join("slideinfo")
            .join("slideinfo.yaml"))
    }

    /// Read one subject's ledger.
    fn read_ledger(&self, subject: &str) -> Result<(PathBuf, Ledger)> {
        let path = self.ledger_path(subject)?;
        if !path.exists() {
            return Err(Error::catalog(
                format!("ledger not found at {}", path.display()),
                "Each subject directory needs slideinfo/slideinfo.yaml",
            ));
        }
        let raw = fs_err::read_to_string(&path)?;
        let ledger: Ledger = serde_yaml::from_str(&raw)
            .map_err(|e| Error::parse(e.to_string(), path.clone()))?;
        Ok((path, ledger))
    }

    /// The human-readable title of one unit.
    pub fn unit_title(&self, subject: &str, unit: &str) -> Result<String> {
        let (path, ledger) = self.read_ledger(subject)?;
        ledger.get(unit).map(|record| record.title.clone()).ok_or_else(|| {
            Error::catalog(
                format!("unit {unit:?} not found in {}", path.display()),
                "Add the unit to the subject ledger",
            )
        })
    }

    /// Record one build of a unit in the subject ledger.
    ///
    /// The first build stamps `created_at`; every later build stamps
    /// `update_at`. Returns the new build count. Unknown keys in the record
    /// are written back untouched.
    pub fn record_build(&self, subject: &str, unit: &str) -> Result<u32> {
        let (path, mut ledger) = self.read_ledger(subject)?;
        let record = ledger.get_mut(unit).ok_or_else(|| {
            Error::catalog(
                format!("unit {unit:?} not found in {}", path.display()),
                "Add the unit to the subject ledger",
            )
        })?;

        let stamp = chrono::Local::now().format(LEDGER_TIME_FORMAT).to_string();
        let never_built = record
            .created_at
            .as_deref()
            .map_or(true, |s| s.trim().is_empty());
        if never_built {
            record.created_at = Some(stamp);
        } else {
            record.update_at = Some(stamp);
        }
        record.count += 1;
        let count = record.count;

        let out = serde_yaml::to_string(&ledger)
            .map_err(|e| Error::parse(e.to_string(), path.clone()))?;
        fs_err::write(&path, out)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;

    const DIRINFO: &str = "\
fsyear: '2025'
'2025':
  dir: '%ROOT%'
  '1010401': 1010401.industry-general
  '1020701': 1020701.data-systems
";

    const LEDGER: &str = "\
'05':
  title: Structures
  count: 0
'06':
  title: Interfaces
  count: 3
  created_at: 2025-04-01 09:00:00
  room: B-204
";

    fn fixture() -> (tempfile::TempDir, Catalog) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("slides");
        let index_path = dir.path().join("dirinfo.yaml");
        fs_err::write(&index_path, DIRINFO.replace("%ROOT%", &root.to_string_lossy())).unwrap();

        let info_dir = root.join("1010401.industry-general").join("slideinfo");
        fs_err::create_dir_all(&info_dir).unwrap();
        fs_err::write(info_dir.join("slideinfo.yaml"), LEDGER).unwrap();

        let catalog = Catalog::load(&index_path).unwrap();
        (dir, catalog)
    }

    #[test]
    fn resolves_unit_dir() {
        let (_guard, catalog) = fixture();
        assert_eq!(
            catalog.unit_dir("1010401", "05").unwrap(),
            "1010401.industry-general/05"
        );
    }

    #[test]
    fn unknown_subject_is_a_catalog_error() {
        let (_guard, catalog) = fixture();
        assert!(matches!(
            catalog.unit_dir("9999999", "05"),
            Err(Error::Catalog { .. })
        ));
    }

    #[test]
    fn looks_up_titles() {
        let (_guard, catalog) = fixture();
        assert_eq!(catalog.unit_title("1010401", "05").unwrap(), "Structures");
    }

    #[test]
    fn unknown_unit_is_a_catalog_error() {
        let (_guard, catalog) = fixture();
        assert!(matches!(
            catalog.unit_title("1010401", "99"),
            Err(Error::Catalog { .. })
        ));
    }

    #[test]
    fn first_build_stamps_created_at() {
        let (_guard, catalog) = fixture();
        assert_eq!(catalog.record_build("1010401", "05").unwrap(), 1);

        let (_, ledger) = catalog.read_ledger("1010401").unwrap();
        let record = &ledger["05"];
        assert!(record.created_at.is_some());
        assert!(record.update_at.is_none());
    }

    #[test]
    fn later_builds_stamp_update_at() {
        let (_guard, catalog) = fixture();
        assert_eq!(catalog.record_build("1010401", "06").unwrap(), 4);

        let (_, ledger) = catalog.read_ledger("1010401").unwrap();
        let record = &ledger["06"];
        assert_eq!(record.created_at.as_deref(), Some("2025-04-01 09:00:00"));
        assert!(record.update_at.is_some());
    }

    #[test]
    fn unknown_ledger_keys_round_trip() {
        let (_guard, catalog) = fixture();
        catalog.record_build("1010401", "06").unwrap();

        let (_, ledger) = catalog.read_ledger("1010401").unwrap();
        assert_eq!(
            ledger["06"].extra.get("room").and_then(serde_yaml::Value::as_str),
            Some("B-204")
        );
    }

    #[test]
    fn missing_index_is_a_catalog_error() {
        let missing = Path::new("/nonexistent/dirinfo.yaml");
        assert!(matches!(Catalog::load(missing), Err(Error::Catalog { .. })));
    }
}
