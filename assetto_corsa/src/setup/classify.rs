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

use std::path::Path;
use crate::setup::{FALLBACK_AUTHOR, GENERIC_TRACK};

/// What a single directory level in the setups tree stands for
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PathRole {
    Author,
    Car,
    Track
}

/// Roles of the directories leading to a setup file, for one path depth.
/// The file name is always the last segment and isn't listed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DepthPattern {
    pub segments: usize,
    pub roles: &'static [PathRole]
}

const DEFAULT_PATTERNS: [DepthPattern; 3] = [
    DepthPattern { segments: 4, roles: &[PathRole::Author, PathRole::Car, PathRole::Track] },
    DepthPattern { segments: 3, roles: &[PathRole::Car, PathRole::Track] },
    DepthPattern { segments: 2, roles: &[PathRole::Car] },
];

/// Where a setup came from, as inferred from its location in the setups tree
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SetupOrigin {
    pub author: String,
    pub car_id: String,
    pub track: String,
    pub file_name: String
}

impl SetupOrigin {
    /// The file name without its extension
    pub fn setup_name(&self) -> String {
        match Path::new(&self.file_name).file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => self.file_name.clone()
        }
    }
}

/// Maps the path of a setup file, relative to the root of the setups tree, to an author,
/// car and track purely by how deep the file is.
///
/// ```text
/// <author>/<car>/<track>/<file>.ini
/// <car>/<track>/<file>.ini          author is the fallback author
/// <car>/<file>.ini                  author is the fallback author, track is "Generic"
/// ```
/// Paths of any other depth are not classified.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    fallback_author: String,
    generic_track: String,
    patterns: Vec<DepthPattern>
}

impl Default for PathClassifier {
    fn default() -> Self {
        PathClassifier::new(FALLBACK_AUTHOR)
    }
}

impl PathClassifier {
    pub fn new(fallback_author: &str) -> PathClassifier {
        PathClassifier {
            fallback_author: String::from(fallback_author),
            generic_track: String::from(GENERIC_TRACK),
            patterns: DEFAULT_PATTERNS.to_vec()
        }
    }

    pub fn fallback_author(&self) -> &str {
        &self.fallback_author
    }

    /// Replaces any existing pattern for the same depth
    pub fn with_pattern(mut self, pattern: DepthPattern) -> PathClassifier {
        self.patterns.retain(|existing| existing.segments != pattern.segments);
        self.patterns.push(pattern);
        self
    }

    pub fn classify(&self, segments: &[String]) -> Option<SetupOrigin> {
        let pattern = self.patterns.iter().find(|p| p.segments == segments.len())?;
        if pattern.roles.len() + 1 != segments.len() {
            return None;
        }
        let (file_name, dirs) = segments.split_last()?;
        let mut author = None;
        let mut car_id = None;
        let mut track = None;
        for (role, segment) in pattern.roles.iter().zip(dirs) {
            match role {
                PathRole::Author => author = Some(segment.clone()),
                PathRole::Car => car_id = Some(segment.clone()),
                PathRole::Track => track = Some(segment.clone())
            }
        }
        Some(SetupOrigin {
            author: author.unwrap_or_else(|| self.fallback_author.clone()),
            car_id: car_id?,
            track: track.unwrap_or_else(|| self.generic_track.clone()),
            file_name: file_name.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::setup::classify::{DepthPattern, PathClassifier, PathRole};

    fn segments(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn four_segments_take_everything_from_the_path() {
        let origin = PathClassifier::default()
            .classify(&segments(&["AFN PRO", "Formula1", "Monza", "setup1.ini"])).unwrap();
        assert_eq!(origin.author, "AFN PRO");
        assert_eq!(origin.car_id, "Formula1");
        assert_eq!(origin.track, "Monza");
        assert_eq!(origin.setup_name(), "setup1");
    }

    #[test]
    fn three_segments_use_the_fallback_author() {
        let origin = PathClassifier::default()
            .classify(&segments(&["ks_bmw_m3_e30", "spa", "quali.ini"])).unwrap();
        assert_eq!(origin.author, "AFN PRO");
        assert_eq!(origin.car_id, "ks_bmw_m3_e30");
        assert_eq!(origin.track, "spa");
        assert_eq!(origin.file_name, "quali.ini");
    }

    #[test]
    fn two_segments_are_generic() {
        let origin = PathClassifier::new("house")
            .classify(&segments(&["ks_bmw_m3_e30", "base.ini"])).unwrap();
        assert_eq!(origin.author, "house");
        assert_eq!(origin.car_id, "ks_bmw_m3_e30");
        assert_eq!(origin.track, "Generic");
    }

    #[test]
    fn other_depths_are_not_classified() {
        let classifier = PathClassifier::default();
        assert_eq!(classifier.classify(&segments(&["loose.ini"])), None);
        assert_eq!(classifier.classify(&segments(&["a", "b", "c", "d", "e.ini"])), None);
        assert_eq!(classifier.classify(&[]), None);
    }

    #[test]
    fn extra_depths_can_be_added() {
        let classifier = PathClassifier::default().with_pattern(DepthPattern {
            segments: 5,
            roles: &[PathRole::Author, PathRole::Car, PathRole::Track, PathRole::Track]
        });
        let origin = classifier.classify(&segments(&["me", "car", "group", "monza", "a.ini"])).unwrap();
        assert_eq!(origin.track, "monza");
        assert_eq!(origin.author, "me");
    }
}
