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

use tracing::info;
use crate::deploy::remote::{shell_quote, RemoteHost};
use crate::deploy::Result;

const SITES_AVAILABLE: &'static str = "/etc/nginx/sites-available";
const SITES_ENABLED: &'static str = "/etc/nginx/sites-enabled";
const HEREDOC_MARKER: &'static str = "SETUP_CRANE_EOF";

/// A standalone nginx site serving the update directory on its own port, so nothing else
/// running on the host is touched.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NginxSite {
    pub name: String,
    pub listen_port: u16,
    pub root: String
}

impl NginxSite {
    pub fn render(&self) -> String {
        format!("server {{
    listen {port};
    root {root};
    index index.html;
    server_name _;

    location / {{
        try_files $uri $uri/ =404;
        autoindex on;
        add_header Access-Control-Allow-Origin *;
        add_header Cache-Control \"no-cache\";
    }}
}}", port=self.listen_port, root=self.root)
    }

    pub fn available_path(&self) -> String {
        format!("{}/{}", SITES_AVAILABLE, self.name)
    }

    pub fn commands(&self) -> Vec<String> {
        vec![
            format!("cat > {} <<'{}'\n{}\n{}",
                    shell_quote(&self.available_path()), HEREDOC_MARKER, self.render(), HEREDOC_MARKER),
            format!("ln -s -f {} {}/", shell_quote(&self.available_path()), SITES_ENABLED),
            String::from("nginx -t"),
            String::from("systemctl reload nginx")
        ]
    }
}

pub fn configure(remote: &mut dyn RemoteHost, site: &NginxSite) -> Result<()> {
    info!("Configuring nginx site {} on port {}", &site.name, site.listen_port);
    for command in site.commands() {
        remote.exec(&command)?;
    }
    info!("nginx configured");
    Ok(())
}
