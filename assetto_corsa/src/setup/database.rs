/*
 * Copyright (c):
 * 2026 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of setup-crane.
 *
 * setup-crane is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * setup-crane is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with setup-crane. If not, see <https://www.gnu.org/licenses/>.
 */

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utils::filesystem;
use crate::error::{Error, ErrorKind, Result};
use crate::ini_utils::Ini;
use crate::setup::{PathClassifier, SetupRecord, MANIFEST_FILENAME, SETUP_FILE_EXTENSION};

/// Summary of one car in `manifest.json`
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    pub count: usize,
    pub authors: Vec<String>
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExportSummary {
    pub export_dir: PathBuf,
    pub num_cars: usize,
    pub num_setups: usize
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ExportOutcome {
    /// Nothing was found so the export directory was left alone
    NoSetups,
    Exported(ExportSummary)
}

/// Setups grouped by car id. Cars keep the order they were first seen in and each car's
/// setups keep the order they were added in.
#[derive(Debug, Clone, Default)]
pub struct SetupDatabase {
    cars: IndexMap<String, Vec<SetupRecord>>
}

impl SetupDatabase {
    pub fn new() -> SetupDatabase {
        SetupDatabase { cars: IndexMap::new() }
    }

    /// Walk `setups_dir` and load every setup file that can be classified.
    ///
    /// Files at an unrecognised depth, or that can't be read, are skipped. Values that are
    /// missing or malformed inside a file are zeroed rather than rejecting the file.
    pub fn scan(setups_dir: &Path, classifier: &PathClassifier) -> Result<SetupDatabase> {
        if !setups_dir.is_dir() {
            return Err(Error::new(ErrorKind::MissingSetupsDir,
                                  format!("{} not found", setups_dir.display())));
        }
        let mut database = SetupDatabase::new();
        for path in filesystem::find_filetypes_in_tree(setups_dir, SETUP_FILE_EXTENSION)? {
            let origin = match filesystem::relative_segments(setups_dir, &path)
                .and_then(|segments| classifier.classify(&segments)) {
                Some(origin) => origin,
                None => {
                    debug!("Skipping {}. Unrecognised location", path.display());
                    continue;
                }
            };
            let ini_data = match Ini::load_from_file(&path) {
                Ok(ini) => ini,
                Err(e) => {
                    debug!("Skipping {}. {}", path.display(), e.to_string());
                    continue;
                }
            };
            info!("Adding {} | {} -> {}", &origin.author, &origin.car_id, &origin.file_name);
            database.add(SetupRecord::from_ini(&ini_data, &origin, classifier.fallback_author()));
        }
        Ok(database)
    }

    pub fn add(&mut self, setup: SetupRecord) {
        self.cars.entry(setup.car_id.clone()).or_insert_with(Vec::new).push(setup);
    }

    pub fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    pub fn num_cars(&self) -> usize {
        self.cars.len()
    }

    pub fn num_setups(&self) -> usize {
        self.cars.values().map(|setups| setups.len()).sum()
    }

    pub fn car_ids(&self) -> impl Iterator<Item=&str> {
        self.cars.keys().map(|id| id.as_str())
    }

    pub fn setups_for(&self, car_id: &str) -> Option<&[SetupRecord]> {
        self.cars.get(car_id).map(|setups| setups.as_slice())
    }

    /// One entry per car, derived entirely from the stored setups. Authors are
    /// de-duplicated and sorted so repeated exports produce identical files.
    pub fn manifest(&self) -> Vec<ManifestEntry> {
        self.cars.iter().map(|(car_id, setups)| {
            ManifestEntry {
                id: car_id.clone(),
                count: setups.len(),
                authors: unique_authors(setups)
            }
        }).collect()
    }

    /// Replace the contents of `export_dir` with one `<car_id>.json` per car plus
    /// `manifest.json`. An empty database doesn't touch the filesystem at all.
    pub fn export(&self, export_dir: &Path) -> Result<ExportOutcome> {
        if self.is_empty() {
            return Ok(ExportOutcome::NoSetups);
        }
        // Lowercased so that ids differing only in case can't overwrite each other on
        // case-insensitive filesystems
        let mut claimed_filenames: HashMap<String, &str> = HashMap::new();
        claimed_filenames.insert(MANIFEST_FILENAME.to_ascii_lowercase(), MANIFEST_FILENAME);
        let mut car_files = Vec::with_capacity(self.cars.len());
        for (car_id, setups) in &self.cars {
            let filename = filesystem::safe_filename(car_id, "json");
            if let Some(existing) = claimed_filenames.insert(filename.to_ascii_lowercase(), car_id) {
                return Err(Error::new(ErrorKind::InvalidExport,
                                      format!("car id '{}' clashes with '{}' as {}", car_id, existing, filename)));
            }
            car_files.push((filename, serde_json::to_string_pretty(setups)?));
        }
        let manifest = serde_json::to_string_pretty(&self.manifest())?;

        filesystem::recreate_dir(export_dir).map_err(|e| {
            Error::new(ErrorKind::ExportDirError,
                       format!("couldn't recreate {}. {}", export_dir.display(), e.to_string()))
        })?;
        for (filename, data) in car_files {
            fs::write(export_dir.join(&filename), data)?;
        }
        fs::write(export_dir.join(MANIFEST_FILENAME), manifest)?;
        info!("Exported {} setups for {} cars to {}", self.num_setups(), self.num_cars(), export_dir.display());
        Ok(ExportOutcome::Exported(ExportSummary {
            export_dir: export_dir.to_path_buf(),
            num_cars: self.num_cars(),
            num_setups: self.num_setups()
        }))
    }
}

pub(crate) fn unique_authors(setups: &[SetupRecord]) -> Vec<String> {
    setups.iter()
        .map(|setup| setup.author.clone())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Scan `setups_dir` and export the result to `export_dir`
pub fn export_setups(setups_dir: &Path,
                     export_dir: &Path,
                     classifier: &PathClassifier) -> Result<ExportOutcome> {
    SetupDatabase::scan(setups_dir, classifier)?.export(export_dir)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use crate::error::ErrorKind;
    use crate::ini_utils::Ini;
    use crate::setup::{export_setups, ExportOutcome, ManifestEntry, PathClassifier, SetupDatabase, SetupOrigin, SetupRecord};

    fn write_setup(root: &Path, rel_path: &str, contents: &str) {
        let path = root.join(rel_path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn populate(root: &Path) {
        write_setup(root, "AFN PRO/Formula1/Monza/setup1.ini", "[FUEL]\nVALUE=55\n");
        write_setup(root, "Someone/Formula1/Spa/wet.ini", "[FUEL]\nVALUE=70\n[FRONT_BIAS]\nVALUE=60\n");
        write_setup(root, "Formula1/Imola/race.ini", "[FUEL]\nVALUE=abc\n");
        write_setup(root, "ks_bmw_m3_e30/base.ini", "[WING_1]\nVALUE=3\n");
        write_setup(root, "loose.ini", "[FUEL]\nVALUE=1\n");
        write_setup(root, "a/b/c/d/too_deep.ini", "[FUEL]\nVALUE=1\n");
        write_setup(root, "ks_bmw_m3_e30/readme.txt", "not a setup");
    }

    #[test]
    fn scan_groups_setups_by_car() {
        let dir = TempDir::new().unwrap();
        populate(dir.path());
        let database = SetupDatabase::scan(dir.path(), &PathClassifier::default()).unwrap();

        assert_eq!(database.num_cars(), 2);
        assert_eq!(database.num_setups(), 4);
        assert_eq!(database.car_ids().collect::<Vec<_>>(), vec!["Formula1", "ks_bmw_m3_e30"]);

        let f1 = database.setups_for("Formula1").unwrap();
        let names: Vec<&str> = f1.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["setup1", "race", "wet"]);

        let monza = &f1[0];
        assert_eq!((monza.author.as_str(), monza.source.as_str(), monza.fuel), ("AFN PRO", "Monza", 55));
        assert_eq!(monza.credits, "Refined by AFN PRO | Inspired by community benchmarks");
        assert_eq!(f1[1].author, "AFN PRO");
        assert_eq!(f1[1].fuel, 0);
        assert_eq!(f1[2].credits, "Inspired by community benchmarks");
        assert_eq!(f1[2].brake_bias, 60);

        let generic = &database.setups_for("ks_bmw_m3_e30").unwrap()[0];
        assert_eq!(generic.source, "Generic");
        assert_eq!(generic.wing_1, 3);
    }

    #[test]
    fn manifest_summarises_each_car() {
        let dir = TempDir::new().unwrap();
        populate(dir.path());
        let database = SetupDatabase::scan(dir.path(), &PathClassifier::default()).unwrap();
        assert_eq!(database.manifest(), vec![
            ManifestEntry { id: "Formula1".to_string(), count: 3, authors: vec!["AFN PRO".to_string(), "Someone".to_string()] },
            ManifestEntry { id: "ks_bmw_m3_e30".to_string(), count: 1, authors: vec!["AFN PRO".to_string()] },
        ]);
    }

    #[test]
    fn export_writes_car_documents_and_manifest() {
        let setups = TempDir::new().unwrap();
        populate(setups.path());
        let out = TempDir::new().unwrap();
        let export_dir = out.path().join("github_export");
        fs::create_dir_all(&export_dir).unwrap();
        fs::write(export_dir.join("stale.json"), "[]").unwrap();

        let outcome = export_setups(setups.path(), &export_dir, &PathClassifier::default()).unwrap();
        match outcome {
            ExportOutcome::Exported(summary) => {
                assert_eq!(summary.num_cars, 2);
                assert_eq!(summary.num_setups, 4);
            }
            ExportOutcome::NoSetups => panic!("expected an export")
        }
        assert!(!export_dir.join("stale.json").exists());

        let f1: Vec<SetupRecord> = serde_json::from_str(
            &fs::read_to_string(export_dir.join("Formula1.json")).unwrap()).unwrap();
        assert_eq!(f1.len(), 3);
        let manifest: Vec<ManifestEntry> = serde_json::from_str(
            &fs::read_to_string(export_dir.join("manifest.json")).unwrap()).unwrap();
        assert_eq!(manifest.len(), 2);
        assert!(export_dir.join("ks_bmw_m3_e30.json").is_file());
    }

    #[test]
    fn repeated_exports_are_identical() {
        let setups = TempDir::new().unwrap();
        populate(setups.path());
        let out = TempDir::new().unwrap();
        let export_dir = out.path().join("export");

        let read_all = |dir: &Path| -> Vec<(String, String)> {
            let mut files: Vec<(String, String)> = fs::read_dir(dir).unwrap()
                .map(|e| e.unwrap().path())
                .map(|p| (p.file_name().unwrap().to_string_lossy().into_owned(), fs::read_to_string(&p).unwrap()))
                .collect();
            files.sort();
            files
        };

        export_setups(setups.path(), &export_dir, &PathClassifier::default()).unwrap();
        let first = read_all(&export_dir);
        export_setups(setups.path(), &export_dir, &PathClassifier::default()).unwrap();
        assert_eq!(first, read_all(&export_dir));
    }

    #[test]
    fn empty_tree_leaves_export_dir_alone() {
        let setups = TempDir::new().unwrap();
        write_setup(setups.path(), "notes/readme.txt", "nothing here");
        let out = TempDir::new().unwrap();
        let export_dir = out.path().join("export");

        let outcome = export_setups(setups.path(), &export_dir, &PathClassifier::default()).unwrap();
        assert_eq!(outcome, ExportOutcome::NoSetups);
        assert!(!export_dir.exists());
    }

    #[test]
    fn missing_setups_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = SetupDatabase::scan(&dir.path().join("server_setups"), &PathClassifier::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSetupsDir);
    }

    fn setup_for(author: &str, car_id: &str) -> SetupRecord {
        let origin = SetupOrigin {
            author: author.to_string(),
            car_id: car_id.to_string(),
            track: "monza".to_string(),
            file_name: "base.ini".to_string()
        };
        SetupRecord::from_ini(&Ini::load_from_string("[FUEL]\nVALUE=1\n"), &origin, "AFN PRO")
    }

    #[test]
    fn car_ids_sharing_a_filename_are_rejected_before_writing() {
        let out = TempDir::new().unwrap();
        let export_dir = out.path().join("export");

        let mut database = SetupDatabase::new();
        database.add(setup_for("Alice", "a?b"));
        database.add(setup_for("Bob", "ab"));
        let err = database.export(&export_dir).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidExport);
        assert!(!export_dir.exists());

        let mut database = SetupDatabase::new();
        database.add(setup_for("Alice", "Formula1"));
        database.add(setup_for("Bob", "formula1"));
        assert_eq!(database.export(&export_dir).unwrap_err().kind(), ErrorKind::InvalidExport);
        assert!(!export_dir.exists());
    }

    #[test]
    fn car_named_manifest_in_any_case_is_rejected() {
        let out = TempDir::new().unwrap();
        let export_dir = out.path().join("export");
        let mut database = SetupDatabase::new();
        database.add(setup_for("Alice", "Manifest"));
        assert_eq!(database.export(&export_dir).unwrap_err().kind(), ErrorKind::InvalidExport);
        assert!(!export_dir.exists());
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let setups = TempDir::new().unwrap();
        let path = setups.path().join("Formula1/Monza/bytes.ini");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"[FUEL]\nVALUE=5\n\xff\xfe\n[WING_1]\nVALUE=2\n").unwrap();

        let database = SetupDatabase::scan(setups.path(), &PathClassifier::default()).unwrap();
        let setup = &database.setups_for("Formula1").unwrap()[0];
        assert_eq!(setup.fuel, 5);
        assert_eq!(setup.wing_1, 2);
    }

    #[test]
    fn unreadable_entries_are_skipped() {
        let setups = TempDir::new().unwrap();
        write_setup(setups.path(), "Formula1/Monza/good.ini", "[FUEL]\nVALUE=42\n");
        fs::create_dir_all(setups.path().join("Formula1/Spa/folder.ini")).unwrap();
        fs::create_dir_all(setups.path().join("Formula1/Imola")).unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(setups.path().join("missing.ini"),
                                   setups.path().join("Formula1/Imola/dangling.ini")).unwrap();

        let database = SetupDatabase::scan(setups.path(), &PathClassifier::default()).unwrap();
        assert_eq!(database.num_setups(), 1);
        assert_eq!(database.setups_for("Formula1").unwrap()[0].fuel, 42);
    }

    #[test]
    fn car_named_manifest_is_rejected_before_writing() {
        let setups = TempDir::new().unwrap();
        write_setup(setups.path(), "manifest/base.ini", "[FUEL]\nVALUE=1\n");
        let out = TempDir::new().unwrap();
        let export_dir = out.path().join("export");
        let err = export_setups(setups.path(), &export_dir, &PathClassifier::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidExport);
        assert!(!export_dir.exists());
    }
}
