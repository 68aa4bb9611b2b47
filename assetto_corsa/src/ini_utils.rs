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
use std::collections::HashSet;
use std::path::Path;
use indexmap::IndexMap;

pub fn get_value<T: std::str::FromStr>(ini: &Ini,
                                       section: &str,
                                       key: &str) -> Option<T> {
    let item = ini.get_value(section, key)?;
    match item.parse::<T>() {
        Ok(val) => { Some(val) }
        Err(_) => { None }
    }
}

/// Read `section.key` as `T`, falling back to `T::default()` if the section or key
/// is missing or the value doesn't parse.
pub fn get_value_or_default<T: std::str::FromStr + Default>(ini: &Ini,
                                                            section: &str,
                                                            key: &str) -> T {
    get_value(ini, section, key).unwrap_or_default()
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Section {
    name: String,
    property_map: IndexMap<String, Property>
}

impl Section {
    pub fn new(name: String) -> Section {
        Section {
            name,
            property_map: IndexMap::new()
        }
    }

    pub fn from_line(line: &str) -> Result<Section, String> {
        return match line.find('[') {
            None => {
                Err(String::from("No opening '[' for section name found"))
            }
            Some(opening_bracket_pos) => {
                match line[opening_bracket_pos..].find(']') {
                    None => {
                        Err(String::from("No closing ']' for section name found"))
                    }
                    Some(closing_offset) => {
                        let name = line[opening_bracket_pos + 1..opening_bracket_pos + closing_offset].trim();
                        Ok(Section::new(String::from(name)))
                    }
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keys are matched ignoring ASCII case
    pub fn get_property(&self, property_key: &str) -> Option<&Property> {
        self.property_map.get(&property_key.to_ascii_lowercase())
    }

    pub fn contains_property(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }

    pub fn add_property(&mut self, property: Property) {
        self.property_map.insert(property.key.to_ascii_lowercase(), property);
    }

    pub fn num_properties(&self) -> usize {
        self.property_map.len()
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Property {
    key: String,
    value: String
}

impl Property {
    pub fn new(key: &str, value: &str) -> Property {
        Property { key: String::from(key), value: String::from(value) }
    }

    pub fn from_line(line: &str, comment_symbols: &HashSet<char>) -> Result<Property, String> {
        return match line.find("=") {
            None => { Err(String::from("Cannot find valid property value")) }
            Some(delimiter_pos) => {
                let key = line[..delimiter_pos].trim();
                if key.is_empty() {
                    return Err(String::from("Cannot find valid property name"));
                }
                let remaining = &line[delimiter_pos+1..];
                let value = match remaining.find(|c: char| comment_symbols.contains(&c)) {
                    None => remaining.trim(),
                    Some(comment_start_pos) => remaining[..comment_start_pos].trim()
                };
                Ok(Property::new(key, value))
            }
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get_value(&self) -> String {
        self.value.clone()
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub (crate) enum LineType {
    SectionName,
    KeyValue,
    Comment,
    Ignore
}

/// A read-only view of an INI document as written by the sim's setup screen.
///
/// Parsing is lenient: lines that can't be understood are dropped rather than failing the
/// whole document, and a repeated section or key keeps its last value.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Ini {
    sections: IndexMap<String, Section>,
    comment_symbols: HashSet<char>,
}

impl Ini {
    const TOP_LEVEL: &'static str = "topLevel";

    pub fn new() -> Ini {
        Ini {
            sections: IndexMap::new(),
            comment_symbols: HashSet::from([';', '#'])
        }
    }

    pub fn load_from_string(ini_data: &str) -> Ini {
        let mut ini = Ini::new();
        ini.parse(ini_data);
        ini
    }

    /// Invalid UTF-8 is replaced rather than rejected
    pub fn load_from_file(path: &Path) -> io::Result<Ini> {
        let data = fs::read(path)?;
        Ok(Ini::load_from_string(&String::from_utf8_lossy(&data)))
    }

    pub fn parse(&mut self, input: &str) {
        let mut current_section= Section::new(String::from(""));
        for line in input.lines() {
            match self.get_expected_line_type(line) {
                LineType::SectionName => {
                    match Section::from_line(line) {
                        Ok(section) => {
                            self.finish_section(current_section);
                            current_section = section;
                        }
                        Err(_) => {}
                    }
                }
                LineType::KeyValue => {
                    if let Ok(property) = Property::from_line(line, &self.comment_symbols) {
                        current_section.add_property(property);
                    }
                }
                LineType::Comment | LineType::Ignore => {}
            }
        }
        self.finish_section(current_section)
    }

    pub fn get_value(&self, section_name: &str, property_name: &str) -> Option<String> {
        Some(self.sections.get(section_name)?.get_property(property_name)?.get_value())
    }

    pub fn get_section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item=&str> {
        self.sections.keys().map(|key| key.as_str())
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn section_contains_property(&self, section_name: &str, property_name: &str) -> bool {
        match self.sections.get(section_name) {
            None => { false }
            Some(section) => { section.contains_property(property_name) }
        }
    }

    fn finish_section(&mut self, section: Section) {
        let key;
        if section.name.is_empty() {
            if section.num_properties() == 0 {
                return;
            }
            key = String::from(Ini::TOP_LEVEL);
        } else {
            key = section.name.clone();
        }
        match self.sections.get_mut(&key) {
            Some(existing) => {
                for (_, property) in section.property_map {
                    existing.add_property(property);
                }
            }
            None => { self.sections.insert(key, section); }
        }
    }

    /// Essentially "what delimiting character comes first?"
    fn get_expected_line_type(&self, line: &str) -> LineType {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineType::Ignore;
        } else if trimmed.starts_with('=') {
            return LineType::Ignore;
        }

        let comment_opt = self.find_comment_start(trimmed);
        if let Some(section_start_pos) = self.find_section_start(trimmed) {
            if let Some(kv_delimiter_pos) = self.find_key_value_delimiter(trimmed) {
                if kv_delimiter_pos < section_start_pos {
                    if let Some(comment_start_index) = comment_opt {
                        if comment_start_index < kv_delimiter_pos {
                            return LineType::Comment
                        }
                    }
                    return LineType::KeyValue
                }
            }
            if let Some(comment_start_pos) = comment_opt {
                if comment_start_pos < section_start_pos {
                    return LineType::Comment
                }
            }
            return LineType::SectionName
        }
        if let Some(kv_delimiter_pos) = self.find_key_value_delimiter(trimmed) {
            if let Some(comment_start_pos) = comment_opt {
                if comment_start_pos < kv_delimiter_pos {
                    return LineType::Comment
                }
            }
            return LineType::KeyValue
        }
        return match comment_opt {
            None => { LineType::Ignore }
            Some(_) => { LineType::Comment }
        };
    }

    fn find_comment_start(&self, line: &str) -> Option<usize> {
        line.find(|c: char| self.comment_symbols.contains(&c))
    }

    fn find_section_start(&self, line: &str) -> Option<usize> {
        line.find('[')
    }

    fn find_key_value_delimiter(&self, line: &str) -> Option<usize> {
        match line.find("=") {
            None => None,
            Some(idx) => {
                if idx == 0 {
                    // Can't have a empty Key so we didn't match
                    None
                } else {
                    Some(idx)
                }
            }
        }
    }
}
