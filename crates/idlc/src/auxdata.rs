//! Positional auxiliary metadata schemas.
//!
//! IDL authors attach generator hints to types and fields with constructor
//! syntax such as `Num ("Volume", "Output level", 50, 0, 100, 1)`. A schema
//! names the slot each positional argument binds to; the bound pairs end up in
//! the target's auxdata map.

use std::collections::BTreeMap;

use crate::error::AuxDataError;
use crate::model::StorageKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuxSchema {
    pub constructor: String,
    pub storage: StorageKind,
    pub slots: Vec<String>,
}

impl AuxSchema {
    pub fn new(constructor: &str, storage: StorageKind, slots: &[&str]) -> Self {
        Self {
            constructor: constructor.to_string(),
            storage,
            slots: slots.iter().map(|slot| slot.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuxSchemas {
    schemas: BTreeMap<(String, StorageKind), AuxSchema>,
}

const NUMERIC_SLOTS: &[&str] = &["label", "blurb", "default", "min", "max", "step", "hints"];
const SCALAR_SLOTS: &[&str] = &["label", "blurb", "default", "hints"];
const AGGREGATE_SLOTS: &[&str] = &["label", "blurb", "hints"];

impl AuxSchemas {
    pub fn empty() -> Self {
        Self {
            schemas: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut out = Self::empty();
        out.register(AuxSchema::new("Bool", StorageKind::Bool, SCALAR_SLOTS));
        for storage in [StorageKind::Int, StorageKind::Float] {
            out.register(AuxSchema::new("Num", storage, NUMERIC_SLOTS));
            out.register(AuxSchema::new("Range", storage, NUMERIC_SLOTS));
        }
        out.register(AuxSchema::new("String", StorageKind::String, SCALAR_SLOTS));
        out.register(AuxSchema::new("Enum", StorageKind::Enum, SCALAR_SLOTS));
        out.register(AuxSchema::new("Record", StorageKind::Record, AGGREGATE_SLOTS));
        out.register(AuxSchema::new("Sequence", StorageKind::Sequence, AGGREGATE_SLOTS));
        out.register(AuxSchema::new("Interface", StorageKind::Interface, AGGREGATE_SLOTS));
        out
    }

    /// Adds or replaces the schema for its `(constructor, storage)` pair.
    pub fn register(&mut self, schema: AuxSchema) {
        let key = (schema.constructor.clone(), schema.storage);
        self.schemas.insert(key, schema);
    }

    pub fn get(&self, constructor: &str, storage: StorageKind) -> Option<&AuxSchema> {
        self.schemas.get(&(constructor.to_string(), storage))
    }

    /// Pairs `args` with slot names. Fewer arguments than slots is fine; the
    /// trailing slots stay unset.
    pub fn bind(
        &self,
        type_name: &str,
        constructor: &str,
        storage: StorageKind,
        args: &[String],
    ) -> Result<Vec<(String, String)>, AuxDataError> {
        let Some(schema) = self.get(constructor, storage) else {
            return Err(AuxDataError::NoSchema {
                type_name: type_name.to_string(),
                constructor: constructor.to_string(),
                storage,
            });
        };
        if args.len() > schema.slots.len() {
            return Err(AuxDataError::TooManyArguments {
                type_name: type_name.to_string(),
                constructor: constructor.to_string(),
                given: args.len(),
                slots: schema.slots.len(),
            });
        }
        Ok(schema
            .slots
            .iter()
            .zip(args)
            .map(|(slot, value)| (slot.clone(), value.clone()))
            .collect())
    }
}

impl Default for AuxSchemas {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn binds_positional_values_in_slot_order() {
        let schemas = AuxSchemas::builtin();
        let bound = schemas
            .bind("Volume", "Num", StorageKind::Float, &args(&["\"Volume\"", "\"\"", "50", "0"]))
            .expect("bind");
        assert_eq!(
            bound,
            vec![
                ("label".to_string(), "\"Volume\"".to_string()),
                ("blurb".to_string(), "\"\"".to_string()),
                ("default".to_string(), "50".to_string()),
                ("min".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_constructor_storage_pair_has_no_schema() {
        let schemas = AuxSchemas::builtin();
        let err = schemas
            .bind("Flag", "Num", StorageKind::Bool, &args(&["1"]))
            .unwrap_err();
        assert!(matches!(err, AuxDataError::NoSchema { .. }));
        assert_eq!(err.to_string(), "no auxiliary data schema `Num` for BOOL type `Flag`");
    }

    #[test]
    fn registered_schema_replaces_builtin() {
        let mut schemas = AuxSchemas::builtin();
        schemas.register(AuxSchema::new("Bool", StorageKind::Bool, &["label"]));
        let err = schemas
            .bind("Muted", "Bool", StorageKind::Bool, &args(&["a", "b"]))
            .unwrap_err();
        assert_eq!(
            err,
            AuxDataError::TooManyArguments {
                type_name: "Muted".to_string(),
                constructor: "Bool".to_string(),
                given: 2,
                slots: 1,
            }
        );
    }
}
