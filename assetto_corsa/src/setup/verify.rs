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

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use indexmap::IndexMap;
use utils::filesystem;
use crate::error::{Error, ErrorKind, Result};
use crate::setup::database::unique_authors;
use crate::setup::{ManifestEntry, SetupRecord, MANIFEST_FILENAME};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ExportProblem {
    MissingCarDocument(String),
    UnlistedCarDocument(String),
    DuplicateManifestEntry(String),
    CountMismatch { car_id: String, manifest_count: usize, actual_count: usize },
    AuthorMismatch { car_id: String, manifest_authors: Vec<String>, actual_authors: Vec<String> }
}

impl Display for ExportProblem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportProblem::MissingCarDocument(car_id) => {
                write!(f, "{} is in the manifest but has no document", car_id)
            }
            ExportProblem::UnlistedCarDocument(car_id) => {
                write!(f, "{} has a document but no manifest entry", car_id)
            }
            ExportProblem::DuplicateManifestEntry(car_id) => {
                write!(f, "{} is listed more than once in the manifest", car_id)
            }
            ExportProblem::CountMismatch { car_id, manifest_count, actual_count } => {
                write!(f, "{} manifest count is {} but the document has {} setups",
                       car_id, manifest_count, actual_count)
            }
            ExportProblem::AuthorMismatch { car_id, manifest_authors, actual_authors } => {
                write!(f, "{} manifest authors are [{}] but the document has [{}]",
                       car_id, manifest_authors.join(", "), actual_authors.join(", "))
            }
        }
    }
}

fn load_car_documents(export_dir: &Path) -> Result<IndexMap<String, Vec<SetupRecord>>> {
    let mut documents = IndexMap::new();
    for path in filesystem::get_filetypes_in_path(export_dir, "json")? {
        if path.file_name().map_or(false, |name| name == MANIFEST_FILENAME) {
            continue;
        }
        let car_id = match path.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => continue
        };
        let setups: Vec<SetupRecord> = serde_json::from_str(&fs::read_to_string(&path)?).map_err(|e| {
            Error::new(ErrorKind::InvalidExport, format!("{} is malformed. {}", path.display(), e.to_string()))
        })?;
        documents.insert(car_id, setups);
    }
    Ok(documents)
}

/// Check that `manifest.json` in `export_dir` agrees with the per-car documents next to it.
/// Returns every inconsistency found, an empty list means the export is sound.
pub fn verify_export(export_dir: &Path) -> Result<Vec<ExportProblem>> {
    let manifest_path = export_dir.join(MANIFEST_FILENAME);
    if !manifest_path.is_file() {
        return Err(Error::new(ErrorKind::InvalidExport,
                              format!("{} not found", manifest_path.display())));
    }
    let manifest: Vec<ManifestEntry> = serde_json::from_str(&fs::read_to_string(&manifest_path)?)
        .map_err(|e| {
            Error::new(ErrorKind::InvalidExport, format!("{} is malformed. {}", manifest_path.display(), e.to_string()))
        })?;
    let documents = load_car_documents(export_dir)?;

    let mut problems = Vec::new();
    let mut seen = HashSet::new();
    for entry in &manifest {
        if !seen.insert(entry.id.as_str()) {
            problems.push(ExportProblem::DuplicateManifestEntry(entry.id.clone()));
            continue;
        }
        let file_stem = filesystem::safe_filename(&entry.id, "json");
        let setups = match documents.get(file_stem.trim_end_matches(".json")) {
            Some(setups) => setups,
            None => {
                problems.push(ExportProblem::MissingCarDocument(entry.id.clone()));
                continue;
            }
        };
        if entry.count != setups.len() {
            problems.push(ExportProblem::CountMismatch {
                car_id: entry.id.clone(),
                manifest_count: entry.count,
                actual_count: setups.len()
            });
        }
        let mut manifest_authors = entry.authors.clone();
        manifest_authors.sort();
        manifest_authors.dedup();
        let actual_authors = unique_authors(setups);
        if manifest_authors != actual_authors {
            problems.push(ExportProblem::AuthorMismatch {
                car_id: entry.id.clone(),
                manifest_authors,
                actual_authors
            });
        }
    }
    let listed: HashSet<String> = manifest.iter()
        .map(|entry| filesystem::safe_filename(&entry.id, "json").trim_end_matches(".json").to_string())
        .collect();
    for car_id in documents.keys() {
        if !listed.contains(car_id) {
            problems.push(ExportProblem::UnlistedCarDocument(car_id.clone()));
        }
    }
    Ok(problems)
}
