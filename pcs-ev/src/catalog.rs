//! Field catalog
//!
//! Hand-authored JSON array of [`Field`] records. Ids must be unique.

use crate::error::{EvalError, Result};
use pcs_common::json_io::read_json;
use pcs_common::Field;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl FieldCatalog {
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.id.clone(), position).is_some() {
                return Err(EvalError::DuplicateField(field.id.clone()));
            }
        }
        Ok(Self { fields, index })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let fields: Vec<Field> = read_json(path)?;
        Self::new(fields)
    }

    /// Fields in catalog order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, id: &str) -> Option<&Field> {
        self.index.get(id).map(|&i| &self.fields[i])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The single field matching method and attribute (and dataset and
    /// axis, when known); `None` when zero or several match
    pub fn find_unique(
        &self,
        dataset: Option<&str>,
        axis: Option<&str>,
        method: &str,
        attribute: &str,
    ) -> Option<&Field> {
        let mut matches = self.fields.iter().filter(|f| {
            f.method == method
                && f.attribute == attribute
                && dataset.map_or(true, |d| f.dataset == d)
                && axis.map_or(true, |a| f.axis == a)
        });
        let first = matches.next()?;
        match matches.next() {
            Some(_) => None,
            None => Some(first),
        }
    }
}
