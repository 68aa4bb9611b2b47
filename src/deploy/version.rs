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

use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::deploy::{DeployError, Result};

/// What the client polls to find out whether an update is available
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub url: String,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>
}

impl VersionInfo {
    pub const DEFAULT_NOTES: &'static str = "Update";

    pub fn new(version: &str, url: String, notes: &str, sha256: Option<String>) -> VersionInfo {
        let notes = notes.trim();
        VersionInfo {
            version: String::from(version),
            url,
            notes: if notes.is_empty() { String::from(VersionInfo::DEFAULT_NOTES) } else { String::from(notes) },
            sha256
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Read the package version out of a Cargo manifest. Workspace-inherited versions are
/// resolved from `[workspace.package]` in the same file.
pub fn read_version(cargo_toml: &Path) -> Result<String> {
    let version_error = |details: &str| {
        DeployError::VersionError(cargo_toml.display().to_string(), String::from(details))
    };
    let contents = fs::read_to_string(cargo_toml).map_err(|e| version_error(&e.to_string()))?;
    let manifest: toml::Table = contents.parse().map_err(|e: toml::de::Error| version_error(&e.to_string()))?;

    let package_version = manifest.get("package").and_then(|package| package.get("version"));
    let workspace_version = manifest.get("workspace")
        .and_then(|workspace| workspace.get("package"))
        .and_then(|package| package.get("version"));
    match package_version.and_then(|v| v.as_str()).or(workspace_version.and_then(|v| v.as_str())) {
        Some(version) => Ok(String::from(version)),
        None => Err(version_error("no version found"))
    }
}

/// `<binary_name>_v<version>` keeping the extension of the local build, e.g.
/// `ac_pro_engineer_v1.2.0.exe`
pub fn remote_binary_name(binary_name: &str, version: &str, local_binary: &Path) -> String {
    match local_binary.extension() {
        Some(ext) => format!("{}_v{}.{}", binary_name, version, ext.to_string_lossy()),
        None => format!("{}_v{}", binary_name, version)
    }
}

pub fn download_url(host: &str, http_port: u16, file_name: &str) -> String {
    format!("http://{}:{}/{}", host, http_port, file_name)
}
