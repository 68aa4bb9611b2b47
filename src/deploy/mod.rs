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

pub mod cargo_build;
pub mod nginx;
pub mod remote;
pub mod version;

use std::io;
use tracing::{info, warn};
use assetto_corsa::ErrorKind;
use assetto_corsa::setup::{export_setups, ExportOutcome};
use utils::hash::sha256_file_hex;
use crate::deploy::cargo_build::Builder;
use crate::deploy::nginx::NginxSite;
use crate::deploy::remote::{shell_quote, RemoteHost};
use crate::deploy::version::{download_url, read_version, remote_binary_name, VersionInfo};
use crate::settings::Settings;


#[derive(thiserror::Error, Debug)]
pub enum DeployError {
    #[error("io error. `{0}`")]
    IoError(#[from] io::Error),
    #[error("setup export error. `{0}`")]
    ExportError(#[from] assetto_corsa::Error),
    #[error("json encoding error. `{0}`")]
    JsonError(#[from] serde_json::Error),
    #[error("couldn't determine version from `{0}`. `{1}`")]
    VersionError(String, String),
    #[error("build failed. `{0}`")]
    BuildFailed(String),
    #[error("missing file `{0}`")]
    MissingFile(String),
    #[error("remote command `{0}` failed. `{1}`")]
    RemoteCommandFailed(String, String),
    #[error("failed to upload `{0}`. `{1}`")]
    UploadFailed(String, String),
    #[error("invalid configuration. `{0}`")]
    ConfigError(String)
}

pub type Result<T> = std::result::Result<T, DeployError>;

pub struct ReleaseReport {
    pub version_info: VersionInfo,
    /// `None` when there was no setups directory to export
    pub export: Option<ExportOutcome>
}

/// Upload the local build plus a fresh `version.json` to the update directory on the host.
///
/// With `configure_web_server` the nginx site serving that directory is (re)written first.
pub fn deploy(remote: &mut dyn RemoteHost,
              settings: &Settings,
              version: &str,
              notes: &str,
              configure_web_server: bool) -> Result<VersionInfo> {
    let binary_path = settings.binary_path();
    if !binary_path.is_file() {
        return Err(DeployError::MissingFile(binary_path.display().to_string()));
    }
    let remote_binary = remote_binary_name(&settings.binary_name, version, &binary_path);
    let version_info = VersionInfo::new(version,
                                        download_url(&settings.host, settings.http_port, &remote_binary),
                                        notes,
                                        Some(sha256_file_hex(&binary_path)?));
    let version_file = settings.version_file_path();
    version_info.write(&version_file)?;

    info!("Deploying {} to {}", &remote_binary, &settings.host);
    if configure_web_server {
        nginx::configure(remote, &NginxSite {
            name: settings.nginx_site.clone(),
            listen_port: settings.http_port,
            root: settings.remote_dir.clone()
        })?;
    }

    let remote_dir = settings.remote_dir.trim_end_matches('/');
    let remote_version_file = format!("{}/version.json", remote_dir);
    remote.exec(&format!("mkdir -p {}", shell_quote(remote_dir)))?;
    // stale manifests get cached by clients
    remote.exec(&format!("rm -f {}", shell_quote(&remote_version_file)))?;

    info!("Uploading {}", &remote_binary);
    remote.upload(&binary_path, &format!("{}/{}", remote_dir, remote_binary))?;
    info!("Uploading version.json");
    remote.upload(&version_file, &remote_version_file)?;

    remote.exec(&format!("chmod -R 755 {}", shell_quote(remote_dir)))?;
    info!("Upload finished. Download link: {}", &version_info.url);
    info!("Version manifest: {}", download_url(&settings.host, settings.http_port, "version.json"));
    Ok(version_info)
}

/// Build, read the version, refresh the setup export and deploy.
///
/// A missing setups directory only skips the export, any other export failure stops the
/// release before anything is uploaded.
pub fn release(builder: &dyn Builder,
               remote: &mut dyn RemoteHost,
               settings: &Settings,
               notes: &str,
               configure_web_server: bool) -> Result<ReleaseReport> {
    builder.build()?;
    let version = read_version(&settings.cargo_toml_path())?;
    info!("Version: {}", &version);

    let export = match export_setups(&settings.setups_path(),
                                     &settings.export_path(),
                                     &settings.path_classifier()) {
        Ok(outcome) => {
            if outcome == ExportOutcome::NoSetups {
                info!("No setups found in {}", &settings.setups_dir);
            }
            Some(outcome)
        }
        Err(e) if e.kind() == ErrorKind::MissingSetupsDir => {
            warn!("Setups directory {} not found. Skipping export", &settings.setups_dir);
            None
        }
        Err(e) => return Err(e.into())
    };

    let version_info = deploy(remote, settings, &version, notes, configure_web_server)?;
    Ok(ReleaseReport { version_info, export })
}
