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

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;
use crate::deploy::{DeployError, Result};

/// Produces the binary that gets shipped. Only success or failure is reported.
pub trait Builder {
    fn build(&self) -> Result<()>;
}

pub struct CargoReleaseBuilder {
    manifest_dir: PathBuf
}

impl CargoReleaseBuilder {
    /// Build the crate whose manifest is `cargo_toml`
    pub fn for_manifest(cargo_toml: &Path) -> CargoReleaseBuilder {
        let manifest_dir = match cargo_toml.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from(".")
        };
        CargoReleaseBuilder { manifest_dir }
    }
}

impl Builder for CargoReleaseBuilder {
    fn build(&self) -> Result<()> {
        info!("Building release binary in {}", self.manifest_dir.display());
        let status = Command::new("cargo")
            .args(["build", "--release"])
            .current_dir(&self.manifest_dir)
            .status()
            .map_err(|e| DeployError::BuildFailed(format!("couldn't run cargo. {}", e.to_string())))?;
        if !status.success() {
            return Err(DeployError::BuildFailed(format!("cargo exited with {}", status)));
        }
        info!("Build succeeded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use crate::deploy::cargo_build::CargoReleaseBuilder;

    #[test]
    fn manifest_dir_from_path() {
        assert_eq!(CargoReleaseBuilder::for_manifest(Path::new("Cargo.toml")).manifest_dir, PathBuf::from("."));
        assert_eq!(CargoReleaseBuilder::for_manifest(Path::new("app/Cargo.toml")).manifest_dir, PathBuf::from("app"));
    }
}
