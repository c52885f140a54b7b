use thiserror::Error;

use crate::model::StorageKind;

/// Misuse of the declaration build API.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("`{op}` is not valid on {storage} type `{type_name}`")]
    InvalidStorageOperation {
        op: &'static str,
        type_name: String,
        storage: StorageKind,
    },
    #[error("duplicate type `{name}` in namespace `{namespace}`")]
    DuplicateType { namespace: String, name: String },
    #[error("duplicate constant `{name}` in namespace `{namespace}`")]
    DuplicateConstant { namespace: String, name: String },
    #[error("type `{type_name}` already belongs to namespace `{namespace}`")]
    AlreadyInNamespace { type_name: String, namespace: String },
    #[error("`{method}` is already registered on `{owner}`")]
    OwnerAlreadySet { method: String, owner: String },
    #[error("prerequisite `{prerequisite}` of `{type_name}` would create an inheritance cycle")]
    CyclicPrerequisite {
        type_name: String,
        prerequisite: String,
    },
    #[error("inheritance chain through `{type_name}` is {depth} levels deep, limit is {limit}")]
    InheritanceTooDeep {
        type_name: String,
        depth: usize,
        limit: usize,
    },
    #[error(transparent)]
    AuxData(#[from] AuxDataError),
}

/// Auxiliary metadata that does not fit a registered schema.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AuxDataError {
    #[error(
        "auxiliary data for `{type_name}` passes {given} arguments to `{constructor}`, which declares {slots} slots"
    )]
    TooManyArguments {
        type_name: String,
        constructor: String,
        given: usize,
        slots: usize,
    },
    #[error("no auxiliary data schema `{constructor}` for {storage} type `{type_name}`")]
    NoSchema {
        type_name: String,
        constructor: String,
        storage: StorageKind,
    },
    #[error("type `{type_name}` has no field `{field}`")]
    UnknownField { type_name: String, field: String },
}
