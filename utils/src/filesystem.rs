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

use std::{fs, io};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub fn get_filetypes_in_path(path: &Path, file_type: &str) -> io::Result<Vec<PathBuf>> {
    let dir_entries = fs::read_dir(path)?;
    let mut files: Vec<PathBuf> = dir_entries.filter_map(|e| {
        match e {
            Ok(dir_entry) => {
                if dir_entry.path().is_file() {
                    match dir_entry.path().extension() {
                        Some(ext) => {
                            if ext.ne(file_type) {
                                return None
                            }
                        },
                        None => return None
                    }
                    Some(dir_entry.path())
                } else {
                    None
                }
            },
            _ => None
        }
    }).collect();
    files.sort();
    Ok(files)
}

/// Recursively collect every file under `path` whose name ends in `.<file_type>`.
///
/// Entries are visited in file name order so that the result is the same on every platform.
/// Symlinks to files are included. Entries that can't be read (permissions, broken links)
/// are skipped.
pub fn find_filetypes_in_tree(path: &Path, file_type: &str) -> io::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Err(io::Error::new(io::ErrorKind::NotFound,
                                  format!("{} is not a directory", path.display())));
    }
    let suffix = format!(".{}", file_type);
    Ok(WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| {
            match e {
                Ok(dir_entry) => {
                    if !dir_entry.path().is_file() {
                        return None;
                    }
                    if dir_entry.file_name().to_string_lossy().ends_with(&suffix) {
                        Some(dir_entry.into_path())
                    } else {
                        None
                    }
                },
                Err(e) => {
                    debug!("Skipping unreadable entry. {}", e.to_string());
                    None
                }
            }
        }).collect())
}

/// Split `path` relative to `root` into its individual segments.
/// Returns `None` if `path` doesn't live under `root`.
pub fn relative_segments(root: &Path, path: &Path) -> Option<Vec<String>> {
    let relative = path.strip_prefix(root).ok()?;
    Some(relative.components().filter_map(|component| {
        match component {
            std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None
        }
    }).collect())
}

/// Remove `path` if it exists and create it again as an empty directory
pub fn recreate_dir(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)
}

/// Takes a name and turns it into a filename that is safe to create in any directory.
/// Characters that would be illegal in a filesystem path are stripped. The result is
/// stable, so re-running an export overwrites the same file.
pub fn safe_filename(name: &str, extension: &str) -> String {
    let sanitized_name = sanitize_filename::sanitize(name);
    format!("{}.{}", sanitized_name, extension)
}
