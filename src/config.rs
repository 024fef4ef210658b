//! Declarative pipeline profiles.
//!
//! A profile is a JSON document:
//!
//! ```json
//! {
//!   "name": "Chase checking",
//!   "description": "Monthly statement export",
//!   "properties": {"headers": true},
//!   "transforms": [
//!     {"type": "rename_columns", "columns": {"Posting Date": "date"}},
//!     {"type": "read_date", "columns": ["date"], "date_format": "%m/%d/%Y"}
//!   ]
//! }
//! ```
//!
//! Every top-level field is optional. Shape errors are reported when the document is parsed;
//! transform descriptions are only materialized by [`Configuration::transforms`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde_json::{Map, Value as Json};

use crate::error::{PipelineError, PipelineResult};
use crate::processing::{Transform, transform_from_description};

pub const DEFAULT_NAME: &str = "Unnamed Configuration";

const KIND: &str = "configuration";

/// Anything that can look up a saved profile document by name.
pub trait ProfileSource {
    /// Return the raw document saved under `name`, or `None` if there is none.
    fn read_profile(&self, name: &str) -> PipelineResult<Option<String>>;
}

impl ProfileSource for HashMap<String, String> {
    fn read_profile(&self, name: &str) -> PipelineResult<Option<String>> {
        Ok(self.get(name).cloned())
    }
}

impl ProfileSource for BTreeMap<String, String> {
    fn read_profile(&self, name: &str) -> PipelineResult<Option<String>> {
        Ok(self.get(name).cloned())
    }
}

/// A parsed profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub name: String,
    pub description: String,
    /// Whether input files carry a header row.
    pub headers: bool,
    transforms: Vec<Json>,
}

impl Configuration {
    /// Parse a profile document.
    pub fn from_json_str(document: &str) -> PipelineResult<Self> {
        let json: Json = serde_json::from_str(document)?;
        Self::from_json(&json)
    }

    /// Read and parse a profile document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let document = std::fs::read_to_string(path)?;
        Self::from_json_str(&document)
    }

    /// Look up a saved profile by name.
    pub fn load(name: &str, source: &impl ProfileSource) -> PipelineResult<Self> {
        let document = source
            .read_profile(name)?
            .ok_or_else(|| PipelineError::ProfileNotFound {
                name: name.to_string(),
            })?;
        Self::from_json_str(&document)
    }

    pub fn from_json(json: &Json) -> PipelineResult<Self> {
        let root = json
            .as_object()
            .ok_or_else(|| PipelineError::validation(KIND, "(document)", "must be an object"))?;

        let name = optional_string(root, "name")?.unwrap_or(DEFAULT_NAME).to_string();
        let description = optional_string(root, "description")?.unwrap_or_default().to_string();

        let headers = match root.get("properties") {
            None | Some(Json::Null) => true,
            Some(Json::Object(properties)) => match properties.get("headers") {
                None | Some(Json::Null) => true,
                Some(Json::Bool(headers)) => *headers,
                Some(_) => {
                    return Err(PipelineError::validation(
                        KIND,
                        "properties.headers",
                        "must be a boolean",
                    ));
                }
            },
            Some(_) => {
                return Err(PipelineError::validation(KIND, "properties", "must be an object"));
            }
        };

        let transforms = match root.get("transforms") {
            None | Some(Json::Null) => Vec::new(),
            Some(Json::Array(items)) => items.clone(),
            Some(_) => return Err(PipelineError::validation(KIND, "transforms", "must be a list")),
        };

        Ok(Self {
            name,
            description,
            headers,
            transforms,
        })
    }

    /// The unparsed transform descriptions, in order.
    pub fn transform_descriptions(&self) -> &[Json] {
        &self.transforms
    }

    /// Materialize every transform description, in order. Fails on the first invalid one.
    pub fn transforms(&self) -> PipelineResult<Vec<Transform>> {
        self.transforms.iter().map(transform_from_description).collect()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            description: String::new(),
            headers: true,
            transforms: Vec::new(),
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Config(name={}, description={})", self.name, self.description)
    }
}

fn optional_string<'a>(root: &'a Map<String, Json>, field: &str) -> PipelineResult<Option<&'a str>> {
    match root.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => Ok(Some(s)),
        Some(_) => Err(PipelineError::validation(KIND, field, "must be a string")),
    }
}
