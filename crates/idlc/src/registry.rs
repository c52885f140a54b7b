//! Per-interface dispatch descriptors.
//!
//! A [`DispatchTable`] lists, in a fixed order, every wire identifier a server
//! stub for one interface must answer, plus the ancestry identities used for
//! remote "is this object an X" checks. Backends emit the lists verbatim as
//! static registration tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ancestry;
use crate::digest::{DigestEngine, TypeHash};
use crate::model::{Model, StorageKind, TypeId};

/// Appended to an interface's canonical string for the synthetic
/// "list implemented type identities" call.
pub const TYPELIST_SUFFIX: &str = "::__typelist__";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Member {
    TypeList,
    Getter { field: String, ty: TypeId },
    Setter { field: String, ty: TypeId },
    Method { name: String, func: TypeId },
    SignalConnect { name: String, signal: TypeId },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchEntry {
    pub hash: TypeHash,
    pub member: Member,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorEntry {
    pub ty: TypeId,
    pub name: String,
    pub hash: TypeHash,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchTable {
    pub interface: TypeId,
    pub name: String,
    pub hash: TypeHash,
    /// Reduced direct ancestors; empty means the backend's root handle type.
    pub bases: Vec<TypeId>,
    /// Every ancestor including the interface itself, most derived last.
    pub ancestry: Vec<AncestorEntry>,
    pub entries: Vec<DispatchEntry>,
}

impl DispatchTable {
    pub fn lookup(&self, hash: &TypeHash) -> Option<&Member> {
        self.entries
            .iter()
            .find(|entry| entry.hash == *hash)
            .map(|entry| &entry.member)
    }

    /// Identifiers claimed by more than one entry, in first-seen order.
    pub fn collisions(&self) -> Vec<(TypeHash, Vec<&Member>)> {
        let mut order = Vec::new();
        let mut groups: BTreeMap<TypeHash, Vec<&Member>> = BTreeMap::new();
        for entry in &self.entries {
            let group = groups.entry(entry.hash).or_default();
            if group.is_empty() {
                order.push(entry.hash);
            }
            group.push(&entry.member);
        }
        order
            .into_iter()
            .filter_map(|hash| {
                let members = groups.remove(&hash)?;
                (members.len() > 1).then_some((hash, members))
            })
            .collect()
    }
}

pub fn build_table(model: &Model, engine: &mut DigestEngine, id: TypeId) -> DispatchTable {
    let ty = model.ty(id);
    let mut entries = Vec::new();
    entries.push(DispatchEntry {
        hash: engine.twoway_hash(model, id, TYPELIST_SUFFIX),
        member: Member::TypeList,
    });
    for field in ty.fields() {
        entries.push(DispatchEntry {
            hash: engine.property_hash(model, id, field, false),
            member: Member::Getter {
                field: field.ident.clone(),
                ty: field.ty,
            },
        });
    }
    for field in ty.fields() {
        entries.push(DispatchEntry {
            hash: engine.property_hash(model, id, field, true),
            member: Member::Setter {
                field: field.ident.clone(),
                ty: field.ty,
            },
        });
    }
    for &func in ty.methods() {
        entries.push(DispatchEntry {
            hash: engine.type_hash(model, func),
            member: Member::Method {
                name: model.ty(func).name().to_string(),
                func,
            },
        });
    }
    for &signal in ty.signals() {
        entries.push(DispatchEntry {
            hash: engine.type_hash(model, signal),
            member: Member::SignalConnect {
                name: model.ty(signal).name().to_string(),
                signal,
            },
        });
    }

    let mut lineage = ancestry::deep_ancestors(model, id);
    lineage.reverse();
    let ancestry = lineage
        .into_iter()
        .map(|ancestor| AncestorEntry {
            ty: ancestor,
            name: model.full_name(ancestor),
            hash: engine.type_hash(model, ancestor),
        })
        .collect();

    DispatchTable {
        interface: id,
        name: model.full_name(id),
        hash: engine.type_hash(model, id),
        bases: ancestry::reduce_ancestors(model, id),
        ancestry,
        entries,
    }
}

/// Tables for every implemented, fully declared interface, in insertion
/// order.
pub fn build_registry(model: &Model, engine: &mut DigestEngine) -> Vec<DispatchTable> {
    let tables: Vec<DispatchTable> = model
        .registered()
        .iter()
        .copied()
        .filter(|&id| {
            let ty = model.ty(id);
            ty.storage() == StorageKind::Interface && ty.isimpl() && !ty.is_forward()
        })
        .map(|id| build_table(model, engine, id))
        .collect();
    info!(
        interfaces = tables.len(),
        entries = tables.iter().map(|t| t.entries.len()).sum::<usize>(),
        "assembled dispatch registry"
    );
    tables
}

/// Serializes tables for a backend running in another process.
pub fn encode_snapshot(tables: &[DispatchTable]) -> bincode::Result<Vec<u8>> {
    bincode::serialize(tables)
}

pub fn decode_snapshot(bytes: &[u8]) -> bincode::Result<Vec<DispatchTable>> {
    bincode::deserialize(bytes)
}
