//! Scoped string variables for stashing command results between steps.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VarError {
    #[error("store not found: {0}")]
    StoreNotFound(String),
    #[error("variable not found: {scope}.{name}")]
    VarNotFound { scope: String, name: String },
}

/// scope → (name → value). Scopes must be created before they are written.
#[derive(Debug, Default)]
pub struct VarStore {
    scopes: HashMap<String, BTreeMap<String, String>>,
}

impl VarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `scope` if it does not exist. Returns `true` if it was created.
    pub fn create_scope(&mut self, scope: &str) -> bool {
        if self.scopes.contains_key(scope) {
            return false;
        }
        self.scopes.insert(scope.to_string(), BTreeMap::new());
        true
    }

    pub fn set(&mut self, scope: &str, name: &str, value: String) -> Result<(), VarError> {
        let vars = self
            .scopes
            .get_mut(scope)
            .ok_or_else(|| VarError::StoreNotFound(scope.to_string()))?;
        vars.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, scope: &str, name: &str) -> Result<&str, VarError> {
        let vars = self
            .scopes
            .get(scope)
            .ok_or_else(|| VarError::StoreNotFound(scope.to_string()))?;
        vars.get(name)
            .map(String::as_str)
            .ok_or_else(|| VarError::VarNotFound {
                scope: scope.to_string(),
                name: name.to_string(),
            })
    }

    /// Variable names in `scope`, sorted.
    pub fn names(&self, scope: &str) -> Result<Vec<&str>, VarError> {
        self.scopes
            .get(scope)
            .map(|vars| vars.keys().map(String::as_str).collect())
            .ok_or_else(|| VarError::StoreNotFound(scope.to_string()))
    }
}
