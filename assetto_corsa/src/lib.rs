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

pub mod error;
pub mod ini_utils;
pub mod setup;

pub use error::{Error, ErrorKind, Result};
pub use setup::{SetupDatabase, SetupRecord};
