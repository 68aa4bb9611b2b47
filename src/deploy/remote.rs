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
use std::process::{Command, Output};
use tracing::debug;
use crate::deploy::{DeployError, Result};
use crate::settings::Settings;

/// The two things a deploy needs from the update server
pub trait RemoteHost {
    /// Run a shell command on the host and return its stdout
    fn exec(&mut self, command: &str) -> Result<String>;
    fn upload(&mut self, local_path: &Path, remote_path: &str) -> Result<()>;
}

/// Talks to the host through the system `ssh` and `scp` binaries in batch mode, so
/// authentication is whatever the local ssh setup provides (agent, identity file, config).
#[derive(Debug, Clone)]
pub struct OpenSshHost {
    host: String,
    port: u16,
    user: String,
    identity: Option<PathBuf>
}

impl OpenSshHost {
    pub fn new(host: &str, port: u16, user: &str, identity: Option<PathBuf>) -> Result<OpenSshHost> {
        if host.trim().is_empty() {
            return Err(DeployError::ConfigError(String::from("no remote host configured")));
        }
        Ok(OpenSshHost {
            host: String::from(host.trim()),
            port,
            user: String::from(user),
            identity
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<OpenSshHost> {
        OpenSshHost::new(&settings.host,
                         settings.ssh_port,
                         &settings.ssh_user,
                         settings.ssh_identity_path())
    }

    fn destination(&self) -> String {
        if self.user.is_empty() {
            self.host.clone()
        } else {
            format!("{}@{}", self.user, self.host)
        }
    }

    /// `ssh` takes the port as `-p`, `scp` as `-P`
    fn common_args(&self, port_flag: &str) -> Vec<String> {
        let mut args = vec![
            String::from("-o"), String::from("BatchMode=yes"),
            String::from(port_flag), self.port.to_string()
        ];
        if let Some(identity) = &self.identity {
            args.push(String::from("-i"));
            args.push(identity.to_string_lossy().into_owned());
        }
        args
    }

    pub(crate) fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = self.common_args("-p");
        args.push(self.destination());
        args.push(String::from(command));
        args
    }

    pub(crate) fn scp_args(&self, local_path: &Path, remote_path: &str) -> Vec<String> {
        let mut args = self.common_args("-P");
        args.push(local_path.to_string_lossy().into_owned());
        args.push(format!("{}:{}", self.destination(), remote_path));
        args
    }
}

fn stderr_of(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        format!("exit status {}", output.status)
    } else {
        stderr
    }
}

impl RemoteHost for OpenSshHost {
    fn exec(&mut self, command: &str) -> Result<String> {
        debug!("ssh {}: {}", self.destination(), command);
        let output = Command::new("ssh").args(self.ssh_args(command)).output()?;
        if !output.status.success() {
            return Err(DeployError::RemoteCommandFailed(String::from(command), stderr_of(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn upload(&mut self, local_path: &Path, remote_path: &str) -> Result<()> {
        debug!("scp {} -> {}:{}", local_path.display(), self.destination(), remote_path);
        let output = Command::new("scp").args(self.scp_args(local_path, remote_path)).output()?;
        if !output.status.success() {
            return Err(DeployError::UploadFailed(local_path.display().to_string(), stderr_of(&output)));
        }
        Ok(())
    }
}

/// Quote `value` for a POSIX shell
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
