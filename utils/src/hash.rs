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

use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;
use sha2::{Digest, Sha256};

pub fn create_sha256_hash_array(hasher: impl Digest) -> Option<[u8; 32]> {
    let hash: Vec<u8> = hasher.finalize().iter().map(|b| *b).collect();
    match <[u8; 32]>::try_from(hash) {
        Ok(hash_array) => Some(hash_array),
        Err(_) => {
            None
        }
    }
}

pub fn sha256_hex(hash: &[u8; 32]) -> String {
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Stream the file at `path` through SHA-256 and return the lowercase hex digest
pub fn sha256_file_hex(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 { break; }
        hasher.update(&buf[..n]);
    }
    match create_sha256_hash_array(hasher) {
        Some(hash) => Ok(sha256_hex(&hash)),
        None => Err(io::Error::new(io::ErrorKind::Other, "unexpected sha256 digest length"))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use crate::hash::sha256_file_hex;

    #[test]
    fn hashes_file_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payload.bin");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(sha256_file_hex(&path).unwrap(),
                   "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }
}
