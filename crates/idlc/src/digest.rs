//! Content-addressed wire identifiers.
//!
//! Every type, method, signal and property accessor is identified on the wire
//! by a 16-byte [`TypeHash`] derived from its canonical signature string. Client
//! and server stubs are generated by separate compiler runs, so the result may
//! only depend on names and type identities, never on declaration order or
//! anything process-local.
//!
//! The canonical string of a plain type is its full name. A callable uses
//! `Owner::member rtype+arg1+arg2`, where the return type always comes first
//! (`void` included). Argument identifiers are not part of it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::model::{Field, Model, StorageKind, TypeId};

/// Mixed into every digest so identifiers never coincide with plain SHA-256
/// values of the same strings.
pub const DIGEST_SALT: &str = "2f6c8a0e-93b4-4d1f-a7e5-5c09d3b81e64";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CallKind {
    Type,
    Oneway,
    Twoway,
    Setter,
    Getter,
    SignalConnect,
}

impl CallKind {
    pub fn tag(self) -> &'static str {
        match self {
            CallKind::Type => "type",
            CallKind::Oneway => "oneway",
            CallKind::Twoway => "twoway",
            CallKind::Setter => "setter",
            CallKind::Getter => "getter",
            CallKind::SignalConnect => "sigcon",
        }
    }

    /// High nibble stored in the last identifier byte.
    pub fn bits(self) -> u8 {
        match self {
            CallKind::Type => 0x00,
            CallKind::Oneway | CallKind::Setter => 0x20,
            CallKind::Twoway | CallKind::Getter => 0x30,
            CallKind::SignalConnect => 0x50,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeHash([u8; 16]);

impl TypeHash {
    pub const LEN: usize = 16;

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn kind_bits(&self) -> u8 {
        self.0[15] & 0xf0
    }

    /// Big-endian halves, convenient for emitting `{ hi, lo }` literals.
    pub fn halves(&self) -> (u64, u64) {
        let mut hi = [0u8; 8];
        let mut lo = [0u8; 8];
        hi.copy_from_slice(&self.0[..8]);
        lo.copy_from_slice(&self.0[8..]);
        (u64::from_be_bytes(hi), u64::from_be_bytes(lo))
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{byte:02x}")).collect()
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({})", self.to_hex())
    }
}

/// Hashes `canonical` for `kind`. The first 15 identifier bytes are digest
/// bytes 17..32; the last byte carries the kind bits over the low nibble of
/// digest byte 16.
pub fn hash_canonical(kind: CallKind, canonical: &str) -> TypeHash {
    let mut hasher = Sha256::new();
    hasher.update(DIGEST_SALT.as_bytes());
    hasher.update(b" ");
    hasher.update(kind.tag().as_bytes());
    hasher.update(b" ");
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes[..15].copy_from_slice(&digest[17..32]);
    bytes[15] = kind.bits() | (digest[16] & 0x0f);
    TypeHash(bytes)
}

/// Canonical digest input for `id`: the full name of a type, the signature
/// string of a method or signal.
pub fn canonical_string(model: &Model, id: TypeId) -> String {
    let ty = model.ty(id);
    let Some(func) = ty.as_func() else {
        return model.full_name(id);
    };
    let owner = func
        .owner
        .map(|owner| model.full_name(owner))
        .unwrap_or_default();
    let mut types = Vec::with_capacity(func.args.len() + 1);
    types.push(match func.rtype {
        Some(rtype) => model.full_name(rtype),
        None => "void".to_string(),
    });
    types.extend(func.args.iter().map(|arg| model.full_name(arg.ty)));
    format!("{owner}::{} {}", ty.name(), types.join("+"))
}

/// Kind a plain `type_hash` request resolves to.
pub fn call_kind(model: &Model, id: TypeId) -> CallKind {
    let Some(func) = model.ty(id).as_func() else {
        return CallKind::Type;
    };
    if func.issignal {
        return CallKind::SignalConnect;
    }
    let returns_void = match func.rtype {
        Some(rtype) => model.ty(model.resolved(rtype)).storage() == StorageKind::Void,
        None => true,
    };
    if returns_void {
        CallKind::Oneway
    } else {
        CallKind::Twoway
    }
}

/// Memoizing front end over [`hash_canonical`].
///
/// Entries are keyed by `(kind, canonical string)`, so two structurally
/// identical constructs share one entry regardless of which arena slot they
/// occupy.
#[derive(Debug, Default)]
pub struct DigestEngine {
    cache: HashMap<(CallKind, String), TypeHash>,
}

impl DigestEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn type_hash(&mut self, model: &Model, id: TypeId) -> TypeHash {
        let kind = call_kind(model, id);
        self.lookup(kind, canonical_string(model, id))
    }

    /// Forces the two-way kind and appends `suffix` to the canonical string,
    /// for synthetic calls that must not collide with a real member.
    pub fn twoway_hash(&mut self, model: &Model, id: TypeId, suffix: &str) -> TypeHash {
        let canonical = format!("{}{suffix}", canonical_string(model, id));
        self.lookup(CallKind::Twoway, canonical)
    }

    pub fn property_hash(
        &mut self,
        model: &Model,
        owner: TypeId,
        field: &Field,
        is_setter: bool,
    ) -> TypeHash {
        let kind = if is_setter {
            CallKind::Setter
        } else {
            CallKind::Getter
        };
        let canonical = format!(
            "{}::{} {}",
            canonical_string(model, owner),
            field.ident,
            model.full_name(field.ty)
        );
        self.lookup(kind, canonical)
    }

    fn lookup(&mut self, kind: CallKind, canonical: String) -> TypeHash {
        *self
            .cache
            .entry((kind, canonical))
            .or_insert_with_key(|(kind, canonical)| {
                let hash = hash_canonical(*kind, canonical);
                trace!(kind = kind.tag(), %canonical, %hash, "computed digest");
                hash
            })
    }
}
