//! The test case table
//!
//! Maps stimulus step identifiers to request descriptors. Loaded once at
//! startup, from the built-in Leshan table or a user-supplied YAML file,
//! and never mutated afterwards.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::common::{Error, Result};

use super::descriptor::RequestDescriptor;

/// Table shipped with the binary
const BUILTIN_TABLE: &str = include_str!("../../tables/leshan.yaml");

/// On-disk layout of a table file
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TableFile {
    /// Human-readable name of the table
    name: Option<String>,
    /// Entries keyed by test case identifier
    test_cases: BTreeMap<String, RequestDescriptor>,
}

impl From<TableFile> for TestCaseTable {
    fn from(file: TableFile) -> Self {
        Self {
            name: file.name.unwrap_or_else(|| "unnamed".to_string()),
            entries: file.test_cases,
        }
    }
}

/// Immutable map from test case identifier to request descriptor
#[derive(Debug, Clone)]
pub struct TestCaseTable {
    name: String,
    entries: BTreeMap<String, RequestDescriptor>,
}

impl TestCaseTable {
    /// Parse the built-in table
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_TABLE)
    }

    /// Load a table from a YAML file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let file: TableFile = serde_yaml::from_str(&content)
            .map_err(|e| Error::TableParse(format!("{}: {}", path.display(), e)))?;
        Ok(file.into())
    }

    /// Parse a table from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: TableFile =
            serde_yaml::from_str(content).map_err(|e| Error::TableParse(e.to_string()))?;
        Ok(file.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a test case
    pub fn get(&self, id: &str) -> Result<&RequestDescriptor> {
        self.entries
            .get(id)
            .ok_or_else(|| Error::UnknownTestCase(id.to_string()))
    }

    /// All identifiers, in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All entries, in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RequestDescriptor)> {
        self.entries.iter().map(|(id, d)| (id.as_str(), d))
    }

    /// Expand a test case and its `then` links into the steps to run
    ///
    /// Fails on an unknown identifier anywhere in the chain, and on cycles.
    pub fn chain<'a>(&'a self, id: &str) -> Result<Vec<(&'a str, &'a RequestDescriptor)>> {
        let mut steps = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(id.to_string());

        while let Some(current) = next.take() {
            let (key, descriptor) = self
                .entries
                .get_key_value(current.as_str())
                .ok_or_else(|| Error::UnknownTestCase(current.clone()))?;

            if !seen.insert(key.as_str()) {
                return Err(Error::invalid_descriptor(
                    id,
                    &format!("'then' chain loops back to {}", key),
                ));
            }

            steps.push((key.as_str(), descriptor));
            next = descriptor.then.clone();
        }

        Ok(steps)
    }

    /// Check every entry, collecting all problems
    pub fn validate(&self) -> Vec<Error> {
        let mut problems = Vec::new();

        for (id, descriptor) in &self.entries {
            if id.trim().is_empty() {
                problems.push(Error::invalid_descriptor(id, "identifier is empty"));
            }

            for problem in descriptor.problems() {
                problems.push(Error::invalid_descriptor(id, &problem));
            }

            if let Some(target) = &descriptor.then {
                if !self.entries.contains_key(target) {
                    problems.push(Error::invalid_descriptor(
                        id,
                        &format!("'then' refers to unknown test case {}", target),
                    ));
                    continue;
                }
                if let Err(e) = self.chain(id) {
                    problems.push(e);
                }
            }
        }

        problems
    }
}
