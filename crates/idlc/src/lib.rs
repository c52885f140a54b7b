pub mod ancestry;
pub mod auxdata;
pub mod config;
pub mod diag;
pub mod digest;
pub mod error;
pub mod model;
pub mod package;
pub mod registry;
pub mod validate;

use crate::diag::{Diag, Diagnostics};
use crate::digest::DigestEngine;
use crate::registry::DispatchTable;

pub use config::Config;
pub use digest::{CallKind, TypeHash};
pub use error::{AuxDataError, ModelError};
pub use model::{Model, NamespaceId, StorageKind, TypeId};

pub struct Analysis {
    pub tables: Vec<DispatchTable>,
    /// Set when any diagnostic is an error; backends must not emit tables
    /// from a failed analysis.
    pub failed: bool,
}

/// Validates a finished model and assembles its dispatch registry.
pub fn analyze_model(model: &Model) -> (Analysis, Vec<Diag>) {
    let mut diags = Diagnostics::default();
    validate::check_members(model, &mut diags);
    let mut engine = DigestEngine::new();
    let tables = registry::build_registry(model, &mut engine);
    validate::check_dispatch(model, &tables, &mut diags);
    let failed = diags.has_errors();
    (Analysis { tables, failed }, diags.into_vec())
}
