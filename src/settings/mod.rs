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
use std::path::{Path, PathBuf};
use config::{Config, ConfigBuilder, ConfigError};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};
use tracing::warn;
use assetto_corsa::setup::{FALLBACK_AUTHOR, PathClassifier};

/// Everything the tool needs to know about the local workspace and the update server.
///
/// Loaded from built-in defaults, then `setup-crane-conf.toml`, then `SETUP_CRANE_*`
/// environment variables. There is no password field, ssh authentication goes through the
/// agent or `ssh_identity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub host: String,
    pub ssh_port: u16,
    pub ssh_user: String,
    #[serde(default)]
    pub ssh_identity: Option<String>,
    pub http_port: u16,
    pub remote_dir: String,
    pub nginx_site: String,
    pub setups_dir: String,
    pub export_dir: String,
    pub fallback_author: String,
    pub binary_path: String,
    pub binary_name: String,
    pub cargo_toml: String,
    pub version_file: String,
    pub echo_host: String,
    pub echo_port: u16
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: String::new(),
            ssh_port: 22,
            ssh_user: String::from("root"),
            ssh_identity: None,
            http_port: 5555,
            remote_dir: String::from("/var/www/avnpro_updates"),
            nginx_site: String::from("avnpro_updates"),
            setups_dir: String::from("server_setups"),
            export_dir: String::from("github_export"),
            fallback_author: String::from(FALLBACK_AUTHOR),
            binary_path: String::from("target/release/ac_pro_engineer.exe"),
            binary_name: String::from("ac_pro_engineer"),
            cargo_toml: String::from("Cargo.toml"),
            version_file: String::from("version.json"),
            echo_host: String::from("0.0.0.0"),
            echo_port: 6000
        }
    }
}

impl Settings {
    const HOST: &'static str = "host";
    const SSH_PORT: &'static str = "ssh_port";
    const SSH_USER: &'static str = "ssh_user";
    const HTTP_PORT: &'static str = "http_port";
    const REMOTE_DIR: &'static str = "remote_dir";
    const NGINX_SITE: &'static str = "nginx_site";
    const SETUPS_DIR: &'static str = "setups_dir";
    const EXPORT_DIR: &'static str = "export_dir";
    const FALLBACK_AUTHOR: &'static str = "fallback_author";
    const BINARY_PATH: &'static str = "binary_path";
    const BINARY_NAME: &'static str = "binary_name";
    const CARGO_TOML: &'static str = "cargo_toml";
    const VERSION_FILE: &'static str = "version_file";
    const ECHO_HOST: &'static str = "echo_host";
    const ECHO_PORT: &'static str = "echo_port";
    pub const CONFIG_FILENAME: &'static str = "setup-crane-conf";
    pub const ENV_PREFIX: &'static str = "SETUP_CRANE";

    fn default_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Settings::default();
        Config::builder()
            .set_default(Settings::HOST, defaults.host)?
            .set_default(Settings::SSH_PORT, i64::from(defaults.ssh_port))?
            .set_default(Settings::SSH_USER, defaults.ssh_user)?
            .set_default(Settings::HTTP_PORT, i64::from(defaults.http_port))?
            .set_default(Settings::REMOTE_DIR, defaults.remote_dir)?
            .set_default(Settings::NGINX_SITE, defaults.nginx_site)?
            .set_default(Settings::SETUPS_DIR, defaults.setups_dir)?
            .set_default(Settings::EXPORT_DIR, defaults.export_dir)?
            .set_default(Settings::FALLBACK_AUTHOR, defaults.fallback_author)?
            .set_default(Settings::BINARY_PATH, defaults.binary_path)?
            .set_default(Settings::BINARY_NAME, defaults.binary_name)?
            .set_default(Settings::CARGO_TOML, defaults.cargo_toml)?
            .set_default(Settings::VERSION_FILE, defaults.version_file)?
            .set_default(Settings::ECHO_HOST, defaults.echo_host)?
            .set_default(Settings::ECHO_PORT, i64::from(defaults.echo_port))
    }

    /// Load the layered settings. An explicitly requested file must exist and parse; the
    /// default file is optional and a broken one is reported and ignored.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Settings::default_builder()?
                .add_source(config::File::from(path).required(true))
                .add_source(config::Environment::with_prefix(Settings::ENV_PREFIX))
                .build()?
                .try_deserialize();
        }
        return match Settings::default_builder()?
            .add_source(config::File::with_name(Settings::CONFIG_FILENAME).required(false))
            .add_source(config::Environment::with_prefix(Settings::ENV_PREFIX))
            .build() {
            Ok(settings) => {
                settings.try_deserialize()
            }
            Err(e) => {
                warn!("Failed to load settings. {}", e.to_string());
                Settings::default_builder()?
                    .add_source(config::Environment::with_prefix(Settings::ENV_PREFIX))
                    .build()?
                    .try_deserialize()
            }
        }
    }

    pub fn setups_path(&self) -> PathBuf {
        PathBuf::from(&self.setups_dir)
    }

    pub fn export_path(&self) -> PathBuf {
        PathBuf::from(&self.export_dir)
    }

    pub fn binary_path(&self) -> PathBuf {
        PathBuf::from(&self.binary_path)
    }

    pub fn cargo_toml_path(&self) -> PathBuf {
        PathBuf::from(&self.cargo_toml)
    }

    pub fn version_file_path(&self) -> PathBuf {
        PathBuf::from(&self.version_file)
    }

    pub fn ssh_identity_path(&self) -> Option<PathBuf> {
        self.ssh_identity.as_ref().map(PathBuf::from)
    }

    pub fn path_classifier(&self) -> PathClassifier {
        PathClassifier::new(&self.fallback_author)
    }

    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, toml::to_string(&self).map_err(|_e|{
            std::io::Error::new(std::io::ErrorKind::Other, "Failed to encode settings to toml")
        })?)
    }
}
