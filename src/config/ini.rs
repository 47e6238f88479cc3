//! # INI Documents
//!
//! Minimal sectioned `key = value` format used for `~/.eden/config`.
//!
//! Compatible with files written by earlier eden releases:
//! - `[section]` headers, `key = value` or `key: value` pairs
//! - `#` and `;` full-line comments
//! - keys are case-insensitive (stored lowercase)
//! - indented lines continue the previous value
//! - values of the `DEFAULT` section are visible from every other section

use crate::constants::DEFAULT_SECTION;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IniError {
    #[error("line {line}: malformed section header")]
    MalformedHeader { line: usize },
    #[error("line {line}: key/value pair outside of any section")]
    OrphanValue { line: usize },
    #[error("line {line}: expected `key = value`")]
    MalformedEntry { line: usize },
    #[error(
        "invalid section name {name:?}: must be non-empty without surrounding whitespace, brackets or line breaks"
    )]
    InvalidSectionName { name: String },
    #[error("value of {key} must be a single line")]
    MultiLineValue { key: String },
}

/// Reject section names that would not read back as the same section
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn check_section_name(name: &str) -> Result<(), IniError> {
    let valid = !name.is_empty()
        && name.trim() == name
        && !name.contains(['[', ']', '\n', '\r']);
    if valid {
        Ok(())
    } else {
        Err(IniError::InvalidSectionName {
            name: name.to_string(),
        })
    }
}

type Section = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: BTreeMap<String, Section>,
}

impl IniDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub fn parse(input: &str) -> Result<Self, IniError> {
        let mut document = Self::new();
        let mut current: Option<String> = None;
        let mut last_key: Option<String> = None;

        for (index, raw) in input.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Continuation of the previous value
            if raw.starts_with([' ', '\t']) {
                if let (Some(section), Some(key)) = (&current, &last_key) {
                    if let Some(value) = document
                        .sections
                        .get_mut(section)
                        .and_then(|s| s.get_mut(key))
                    {
                        if !value.is_empty() {
                            value.push('\n');
                        }
                        value.push_str(trimmed);
                        continue;
                    }
                }
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or(IniError::MalformedHeader { line })?;
                document.sections.entry(name.to_string()).or_default();
                current = Some(name.to_string());
                last_key = None;
                continue;
            }

            let section = current.as_ref().ok_or(IniError::OrphanValue { line })?;
            let split_at = trimmed
                .find(['=', ':'])
                .ok_or(IniError::MalformedEntry { line })?;
            let key = trimmed[..split_at].trim().to_lowercase();
            if key.is_empty() {
                return Err(IniError::MalformedEntry { line });
            }
            let value = trimmed[split_at + 1..].trim().to_string();

            document
                .sections
                .entry(section.clone())
                .or_default()
                .insert(key.clone(), value);
            last_key = Some(key);
        }

        Ok(document)
    }

    /// Names of all sections, `DEFAULT` included when present
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Create a section if it does not exist yet
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub fn add_section(&mut self, name: &str) -> Result<(), IniError> {
        check_section_name(name)?;
        self.sections.entry(name.to_string()).or_default();
        Ok(())
    }

    /// Look up a key, falling back to the `DEFAULT` section
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .or_else(|| {
                self.sections
                    .get(DEFAULT_SECTION)
                    .and_then(|s| s.get(key))
            })
            .map(String::as_str)
    }

    /// Set a single-line value, creating the section when needed.
    ///
    /// Continuation lines are only produced by parsing existing files.
    #[allow(
        clippy::missing_errors_doc,
        reason = "Error documentation is provided in doc comments"
    )]
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> Result<(), IniError> {
        if value.contains(['\n', '\r']) {
            return Err(IniError::MultiLineValue {
                key: key.to_string(),
            });
        }
        self.add_section(section)?;
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_lowercase(), value.to_string());
        Ok(())
    }

    /// Keys visible from a section (own keys plus `DEFAULT` fallbacks)
    #[must_use]
    pub fn items(&self, section: &str) -> BTreeMap<&str, &str> {
        let mut items = BTreeMap::new();
        for name in [DEFAULT_SECTION, section] {
            if let Some(values) = self.sections.get(name) {
                items.extend(values.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            }
        }
        items
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let default = self
            .sections
            .get_key_value(DEFAULT_SECTION)
            .into_iter();
        let others = self
            .sections
            .iter()
            .filter(|(name, _)| name.as_str() != DEFAULT_SECTION);

        for (name, values) in default.chain(others) {
            writeln!(f, "[{name}]")?;
            for (key, value) in values {
                let mut lines = value.split('\n');
                writeln!(f, "{key} = {}", lines.next().unwrap_or_default())?;
                for continuation in lines {
                    writeln!(f, "\t{continuation}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
