//! Declaration model: namespaces and types of one compiler run.
//!
//! The model owns every namespace and type in two arenas and hands out
//! [`NamespaceId`] / [`TypeId`] handles. Parsers populate it through the
//! `add_*` / `set_*` operations, each of which checks the storage kind of its
//! receiver; after the build phase the model is only queried.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ancestry;
use crate::auxdata::AuxSchemas;
use crate::config::Config;
use crate::error::{AuxDataError, ModelError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(u32);

impl NamespaceId {
    pub const ROOT: NamespaceId = NamespaceId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}", self.file, self.line)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKind {
    Void,
    Bool,
    Int,
    Float,
    String,
    Enum,
    Sequence,
    Record,
    Interface,
    Func,
    Any,
    TypeReference,
}

impl StorageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKind::Void => "VOID",
            StorageKind::Bool => "BOOL",
            StorageKind::Int => "INT",
            StorageKind::Float => "FLOAT",
            StorageKind::String => "STRING",
            StorageKind::Enum => "ENUM",
            StorageKind::Sequence => "SEQUENCE",
            StorageKind::Record => "RECORD",
            StorageKind::Interface => "INTERFACE",
            StorageKind::Func => "FUNC",
            StorageKind::Any => "ANY",
            StorageKind::TypeReference => "TYPE_REFERENCE",
        }
    }

    /// Single-character key of this storage kind in type packages.
    pub fn tag(self) -> u8 {
        match self {
            StorageKind::Void => b'v',
            StorageKind::Bool => b'b',
            StorageKind::Int => b'i',
            StorageKind::Float => b'd',
            StorageKind::String => b's',
            StorageKind::Enum => b'E',
            StorageKind::Sequence => b'Q',
            StorageKind::Record => b'R',
            StorageKind::Interface => b'C',
            StorageKind::Func => b'F',
            StorageKind::Any => b'Y',
            StorageKind::TypeReference => b'T',
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub ident: String,
    pub ty: TypeId,
    pub auxdata: BTreeMap<String, String>,
}

impl Field {
    pub fn new(ident: impl Into<String>, ty: TypeId) -> Self {
        Self {
            ident: ident.into(),
            ty,
            auxdata: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumOption {
    pub ident: String,
    pub label: String,
    pub blurb: String,
    pub value: i64,
}

impl EnumOption {
    pub fn new(ident: impl Into<String>, value: i64) -> Self {
        Self {
            ident: ident.into(),
            label: String::new(),
            blurb: String::new(),
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncArg {
    pub ident: String,
    pub ty: TypeId,
    pub default: Option<String>,
}

impl FuncArg {
    pub fn new(ident: impl Into<String>, ty: TypeId) -> Self {
        Self {
            ident: ident.into(),
            ty,
            default: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumDecl {
    pub options: Vec<EnumOption>,
    pub combinable: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceDecl {
    pub elements: Option<Field>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordDecl {
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub fields: Vec<Field>,
    pub prerequisites: Vec<TypeId>,
    pub methods: Vec<TypeId>,
    pub signals: Vec<TypeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncDecl {
    pub args: Vec<FuncArg>,
    pub rtype: Option<TypeId>,
    pub owner: Option<TypeId>,
    pub pure: bool,
    pub issignal: bool,
    pub collector: String,
}

impl Default for FuncDecl {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            rtype: None,
            owner: None,
            pure: false,
            issignal: false,
            collector: "void".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Void,
    Bool,
    Int,
    Float,
    String,
    Any,
    TypeReference,
    Enum(EnumDecl),
    Sequence(SequenceDecl),
    Record(RecordDecl),
    Interface(InterfaceDecl),
    Func(FuncDecl),
}

impl TypeKind {
    pub fn empty(storage: StorageKind) -> Self {
        match storage {
            StorageKind::Void => TypeKind::Void,
            StorageKind::Bool => TypeKind::Bool,
            StorageKind::Int => TypeKind::Int,
            StorageKind::Float => TypeKind::Float,
            StorageKind::String => TypeKind::String,
            StorageKind::Any => TypeKind::Any,
            StorageKind::TypeReference => TypeKind::TypeReference,
            StorageKind::Enum => TypeKind::Enum(EnumDecl::default()),
            StorageKind::Sequence => TypeKind::Sequence(SequenceDecl::default()),
            StorageKind::Record => TypeKind::Record(RecordDecl::default()),
            StorageKind::Interface => TypeKind::Interface(InterfaceDecl::default()),
            StorageKind::Func => TypeKind::Func(FuncDecl::default()),
        }
    }

    pub fn storage(&self) -> StorageKind {
        match self {
            TypeKind::Void => StorageKind::Void,
            TypeKind::Bool => StorageKind::Bool,
            TypeKind::Int => StorageKind::Int,
            TypeKind::Float => StorageKind::Float,
            TypeKind::String => StorageKind::String,
            TypeKind::Any => StorageKind::Any,
            TypeKind::TypeReference => StorageKind::TypeReference,
            TypeKind::Enum(_) => StorageKind::Enum,
            TypeKind::Sequence(_) => StorageKind::Sequence,
            TypeKind::Record(_) => StorageKind::Record,
            TypeKind::Interface(_) => StorageKind::Interface,
            TypeKind::Func(_) => StorageKind::Func,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TypeInfo {
    name: String,
    namespace: Option<NamespaceId>,
    location: Location,
    doc: String,
    isimpl: bool,
    is_forward: bool,
    typedef_origin: Option<TypeId>,
    auxdata: BTreeMap<String, String>,
    kind: TypeKind,
}

impl TypeInfo {
    fn new(name: String, storage: StorageKind) -> Self {
        Self {
            name,
            namespace: None,
            location: Location::default(),
            doc: String::new(),
            isimpl: false,
            is_forward: false,
            typedef_origin: None,
            auxdata: BTreeMap::new(),
            kind: TypeKind::empty(storage),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<NamespaceId> {
        self.namespace
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn isimpl(&self) -> bool {
        self.isimpl
    }

    pub fn is_forward(&self) -> bool {
        self.is_forward
    }

    pub fn typedef_origin(&self) -> Option<TypeId> {
        self.typedef_origin
    }

    pub fn auxdata(&self) -> &BTreeMap<String, String> {
        &self.auxdata
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn storage(&self) -> StorageKind {
        self.kind.storage()
    }

    /// Record or interface fields; empty for every other kind.
    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            TypeKind::Record(decl) => &decl.fields,
            TypeKind::Interface(decl) => &decl.fields,
            _ => &[],
        }
    }

    pub fn options(&self) -> &[EnumOption] {
        match &self.kind {
            TypeKind::Enum(decl) => &decl.options,
            _ => &[],
        }
    }

    pub fn combinable(&self) -> bool {
        matches!(&self.kind, TypeKind::Enum(decl) if decl.combinable)
    }

    pub fn elements(&self) -> Option<&Field> {
        match &self.kind {
            TypeKind::Sequence(decl) => decl.elements.as_ref(),
            _ => None,
        }
    }

    pub fn prerequisites(&self) -> &[TypeId] {
        match &self.kind {
            TypeKind::Interface(decl) => &decl.prerequisites,
            _ => &[],
        }
    }

    pub fn methods(&self) -> &[TypeId] {
        match &self.kind {
            TypeKind::Interface(decl) => &decl.methods,
            _ => &[],
        }
    }

    pub fn signals(&self) -> &[TypeId] {
        match &self.kind {
            TypeKind::Interface(decl) => &decl.signals,
            _ => &[],
        }
    }

    pub fn as_func(&self) -> Option<&FuncDecl> {
        match &self.kind {
            TypeKind::Func(decl) => Some(decl),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Namespace {
    name: String,
    parent: Option<NamespaceId>,
    children: Vec<NamespaceId>,
    members: Vec<TypeId>,
    type_dict: HashMap<String, TypeId>,
    constants: BTreeMap<String, ConstValue>,
}

impl Namespace {
    fn new(name: String, parent: Option<NamespaceId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            members: Vec::new(),
            type_dict: HashMap::new(),
            constants: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NamespaceId> {
        self.parent
    }

    pub fn children(&self) -> &[NamespaceId] {
        &self.children
    }

    /// Member types in insertion order.
    pub fn members(&self) -> &[TypeId] {
        &self.members
    }

    pub fn constants(&self) -> &BTreeMap<String, ConstValue> {
        &self.constants
    }
}

pub const BUILTIN_TYPES: &[(&str, StorageKind)] = &[
    ("void", StorageKind::Void),
    ("bool", StorageKind::Bool),
    ("int32", StorageKind::Int),
    ("int64", StorageKind::Int),
    ("float64", StorageKind::Float),
    ("String", StorageKind::String),
    ("Any", StorageKind::Any),
    ("TypeReference", StorageKind::TypeReference),
];

/// Whole-tree arena for one compiler run.
#[derive(Clone, Debug)]
pub struct Model {
    namespaces: Vec<Namespace>,
    types: Vec<TypeInfo>,
    registered: Vec<TypeId>,
    schemas: AuxSchemas,
    config: Config,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            namespaces: vec![Namespace::new(String::new(), None)],
            types: Vec::new(),
            registered: Vec::new(),
            schemas: AuxSchemas::builtin(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn schemas_mut(&mut self) -> &mut AuxSchemas {
        &mut self.schemas
    }

    /// The anonymous global namespace.
    pub fn root(&self) -> NamespaceId {
        NamespaceId::ROOT
    }

    pub fn ns(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.index()]
    }

    pub fn ty(&self, id: TypeId) -> &TypeInfo {
        &self.types[id.index()]
    }

    pub fn namespace_ids(&self) -> impl Iterator<Item = NamespaceId> + '_ {
        (0..self.namespaces.len()).map(|idx| NamespaceId(idx as u32))
    }

    /// Every type inserted into a namespace, in insertion order.
    pub fn registered(&self) -> &[TypeId] {
        &self.registered
    }

    /// Returns the child namespace `name` of `parent`, creating it on first use
    /// so reopened namespaces share one node.
    pub fn namespace(&mut self, parent: NamespaceId, name: &str) -> NamespaceId {
        let existing = self
            .ns(parent)
            .children
            .iter()
            .copied()
            .find(|child| self.ns(*child).name == name);
        if let Some(existing) = existing {
            return existing;
        }
        let id = NamespaceId(self.namespaces.len() as u32);
        self.namespaces.push(Namespace::new(name.to_string(), Some(parent)));
        self.namespaces[parent.index()].children.push(id);
        debug!(namespace = %self.namespace_path(id), "created namespace");
        id
    }

    pub fn new_type(&mut self, name: &str, storage: StorageKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeInfo::new(name.to_string(), storage));
        id
    }

    pub fn new_method(&mut self, name: &str, rtype: TypeId) -> TypeId {
        let id = self.new_type(name, StorageKind::Func);
        if let TypeKind::Func(decl) = &mut self.types[id.index()].kind {
            decl.rtype = Some(rtype);
        }
        id
    }

    pub fn new_signal(&mut self, name: &str, rtype: TypeId) -> TypeId {
        let id = self.new_method(name, rtype);
        if let TypeKind::Func(decl) = &mut self.types[id.index()].kind {
            decl.issignal = true;
        }
        id
    }

    /// Registers the builtin scalar types in the global namespace.
    pub fn define_builtins(&mut self) -> Result<(), ModelError> {
        let root = self.root();
        for (name, storage) in BUILTIN_TYPES {
            if self.find_type(root, name).is_some() {
                continue;
            }
            let id = self.new_type(name, *storage);
            self.add_type(root, id)?;
        }
        Ok(())
    }

    pub fn builtin(&self, name: &str) -> Option<TypeId> {
        self.find_type(self.root(), name)
    }

    /// Copies `id` under a new name for typedef specialization.
    ///
    /// Variant collections are copied by value and auxdata is merged into a
    /// fresh map, so later edits of either side never reach the other. A copied
    /// FUNC starts without an owner.
    pub fn clone_type(&mut self, id: TypeId, name: &str) -> TypeId {
        let source = self.ty(id);
        let mut kind = source.kind.clone();
        if let TypeKind::Func(decl) = &mut kind {
            decl.owner = None;
        }
        let mut auxdata = BTreeMap::new();
        auxdata.extend(source.auxdata.iter().map(|(k, v)| (k.clone(), v.clone())));
        let copy = TypeInfo {
            name: name.to_string(),
            namespace: None,
            location: source.location.clone(),
            doc: source.doc.clone(),
            isimpl: source.isimpl,
            is_forward: source.is_forward,
            typedef_origin: Some(id),
            auxdata,
            kind,
        };
        let copy_id = TypeId(self.types.len() as u32);
        self.types.push(copy);
        copy_id
    }

    /// Follows typedef links to the aliased type.
    pub fn resolved(&self, mut id: TypeId) -> TypeId {
        while let Some(origin) = self.ty(id).typedef_origin {
            id = origin;
        }
        id
    }

    pub fn add_type(&mut self, ns: NamespaceId, id: TypeId) -> Result<(), ModelError> {
        let name = self.ty(id).name.clone();
        if let Some(current) = self.ty(id).namespace {
            return Err(ModelError::AlreadyInNamespace {
                type_name: name,
                namespace: self.namespace_path(current),
            });
        }
        if self.ns(ns).type_dict.contains_key(&name) {
            return Err(ModelError::DuplicateType {
                namespace: self.namespace_path(ns),
                name,
            });
        }
        let namespace = &mut self.namespaces[ns.index()];
        namespace.type_dict.insert(name, id);
        namespace.members.push(id);
        self.types[id.index()].namespace = Some(ns);
        self.registered.push(id);
        debug!(
            type_name = %self.full_name(id),
            storage = %self.ty(id).storage(),
            "added type"
        );
        Ok(())
    }

    /// Looks `name` up in `ns` only; enclosing namespaces are not searched.
    pub fn find_type(&self, ns: NamespaceId, name: &str) -> Option<TypeId> {
        self.ns(ns).type_dict.get(name).copied()
    }

    pub fn add_const(
        &mut self,
        ns: NamespaceId,
        name: &str,
        value: ConstValue,
    ) -> Result<(), ModelError> {
        if self.ns(ns).constants.contains_key(name) {
            return Err(ModelError::DuplicateConstant {
                namespace: self.namespace_path(ns),
                name: name.to_string(),
            });
        }
        self.namespaces[ns.index()]
            .constants
            .insert(name.to_string(), value);
        Ok(())
    }

    /// `::`-joined namespace path, skipping anonymous segments.
    pub fn namespace_path(&self, ns: NamespaceId) -> String {
        let mut parts = Vec::new();
        let mut cursor = Some(ns);
        while let Some(id) = cursor {
            let namespace = self.ns(id);
            if !namespace.name.is_empty() {
                parts.push(namespace.name.as_str());
            }
            cursor = namespace.parent;
        }
        parts.reverse();
        parts.join("::")
    }

    /// Qualified name used in diagnostics and as digest input. Its exact
    /// spelling is part of the wire contract.
    pub fn full_name(&self, id: TypeId) -> String {
        let ty = self.ty(id);
        match ty.namespace {
            Some(ns) => {
                let path = self.namespace_path(ns);
                if path.is_empty() {
                    ty.name.clone()
                } else {
                    format!("{path}::{}", ty.name)
                }
            }
            None => ty.name.clone(),
        }
    }

    /// Enclosing namespaces of `id`, outermost first.
    pub fn list_namespaces(&self, id: TypeId) -> Vec<NamespaceId> {
        let mut out = Vec::new();
        let mut cursor = self.ty(id).namespace;
        while let Some(ns) = cursor {
            out.push(ns);
            cursor = self.ns(ns).parent;
        }
        out.reverse();
        out
    }

    pub fn set_doc(&mut self, id: TypeId, doc: &str) {
        self.types[id.index()].doc = doc.to_string();
    }

    pub fn set_location(&mut self, id: TypeId, location: Location) {
        self.types[id.index()].location = location;
    }

    pub fn set_impl(&mut self, id: TypeId, isimpl: bool) {
        self.types[id.index()].isimpl = isimpl;
    }

    pub fn set_forward(&mut self, id: TypeId, is_forward: bool) {
        self.types[id.index()].is_forward = is_forward;
    }

    /// Merges `entries` into the auxdata map, later keys replacing earlier ones.
    pub fn update_auxdata<I, K, V>(&mut self, id: TypeId, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.types[id.index()]
            .auxdata
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Binds positional `args` through the `constructor` schema for this
    /// type's storage kind.
    pub fn apply_type_auxdata(
        &mut self,
        id: TypeId,
        constructor: &str,
        args: &[String],
    ) -> Result<(), ModelError> {
        let ty = self.ty(id);
        let bound = self
            .schemas
            .bind(&self.full_name(id), constructor, ty.storage(), args)?;
        self.update_auxdata(id, bound);
        Ok(())
    }

    /// Like [`Model::apply_type_auxdata`] for the field `ident` of a record or
    /// interface; the schema is chosen by the field type's storage kind.
    pub fn apply_field_auxdata(
        &mut self,
        owner: TypeId,
        ident: &str,
        constructor: &str,
        args: &[String],
    ) -> Result<(), ModelError> {
        let owner_name = self.full_name(owner);
        let Some(position) = self.ty(owner).fields().iter().position(|f| f.ident == ident) else {
            return Err(AuxDataError::UnknownField {
                type_name: owner_name,
                field: ident.to_string(),
            }
            .into());
        };
        let field_ty = self.ty(owner).fields()[position].ty;
        let storage = self.ty(self.resolved(field_ty)).storage();
        let bound = self.schemas.bind(
            &format!("{owner_name}.{ident}"),
            constructor,
            storage,
            args,
        )?;
        if let Some(fields) = self.fields_mut(owner) {
            fields[position].auxdata.extend(bound);
        }
        Ok(())
    }

    fn fields_mut(&mut self, id: TypeId) -> Option<&mut Vec<Field>> {
        match &mut self.types[id.index()].kind {
            TypeKind::Record(decl) => Some(&mut decl.fields),
            TypeKind::Interface(decl) => Some(&mut decl.fields),
            _ => None,
        }
    }

    fn invalid_op(&self, op: &'static str, id: TypeId) -> ModelError {
        ModelError::InvalidStorageOperation {
            op,
            type_name: self.full_name(id),
            storage: self.ty(id).storage(),
        }
    }

    pub fn add_field(&mut self, id: TypeId, field: Field) -> Result<(), ModelError> {
        match self.fields_mut(id) {
            Some(fields) => fields.push(field),
            None => return Err(self.invalid_op("add_field", id)),
        }
        Ok(())
    }

    pub fn add_option(&mut self, id: TypeId, option: EnumOption) -> Result<(), ModelError> {
        match &mut self.types[id.index()].kind {
            TypeKind::Enum(decl) => decl.options.push(option),
            _ => return Err(self.invalid_op("add_option", id)),
        }
        Ok(())
    }

    pub fn set_combinable(&mut self, id: TypeId, combinable: bool) -> Result<(), ModelError> {
        match &mut self.types[id.index()].kind {
            TypeKind::Enum(decl) => decl.combinable = combinable,
            _ => return Err(self.invalid_op("set_combinable", id)),
        }
        Ok(())
    }

    pub fn set_elements(&mut self, id: TypeId, elements: Field) -> Result<(), ModelError> {
        match &mut self.types[id.index()].kind {
            TypeKind::Sequence(decl) => decl.elements = Some(elements),
            _ => return Err(self.invalid_op("set_elements", id)),
        }
        Ok(())
    }

    pub fn add_arg(&mut self, id: TypeId, arg: FuncArg) -> Result<(), ModelError> {
        match &mut self.types[id.index()].kind {
            TypeKind::Func(decl) => decl.args.push(arg),
            _ => return Err(self.invalid_op("add_arg", id)),
        }
        Ok(())
    }

    pub fn set_rtype(&mut self, id: TypeId, rtype: TypeId) -> Result<(), ModelError> {
        match &mut self.types[id.index()].kind {
            TypeKind::Func(decl) => decl.rtype = Some(rtype),
            _ => return Err(self.invalid_op("set_rtype", id)),
        }
        Ok(())
    }

    pub fn set_pure(&mut self, id: TypeId, pure: bool) -> Result<(), ModelError> {
        match &mut self.types[id.index()].kind {
            TypeKind::Func(decl) => decl.pure = pure,
            _ => return Err(self.invalid_op("set_pure", id)),
        }
        Ok(())
    }

    pub fn set_collector(&mut self, id: TypeId, collector: &str) -> Result<(), ModelError> {
        match &mut self.types[id.index()].kind {
            TypeKind::Func(decl) => decl.collector = collector.to_string(),
            _ => return Err(self.invalid_op("set_collector", id)),
        }
        Ok(())
    }

    /// Registers `func` on the interface `id` as a method or, when the FUNC is
    /// a signal, as a signal. Sets the FUNC's owner exactly once.
    pub fn add_method(&mut self, id: TypeId, func: TypeId) -> Result<(), ModelError> {
        if self.ty(id).storage() != StorageKind::Interface {
            return Err(self.invalid_op("add_method", id));
        }
        let Some(decl) = self.ty(func).as_func() else {
            return Err(self.invalid_op("add_method", func));
        };
        if let Some(owner) = decl.owner {
            return Err(ModelError::OwnerAlreadySet {
                method: self.ty(func).name.clone(),
                owner: self.full_name(owner),
            });
        }
        let issignal = decl.issignal;
        if let TypeKind::Func(decl) = &mut self.types[func.index()].kind {
            decl.owner = Some(id);
        }
        if let TypeKind::Interface(decl) = &mut self.types[id.index()].kind {
            if issignal {
                decl.signals.push(func);
            } else {
                decl.methods.push(func);
            }
        }
        debug!(
            owner = %self.full_name(id),
            member = %self.ty(func).name,
            issignal,
            "registered method"
        );
        Ok(())
    }

    /// Appends a direct supertype. Edges that would close a cycle or push an
    /// inheritance chain past `max_inheritance_depth` are rejected, so the
    /// prerequisite graph stays acyclic.
    pub fn add_prerequisite(&mut self, id: TypeId, prerequisite: TypeId) -> Result<(), ModelError> {
        if self.ty(id).storage() != StorageKind::Interface {
            return Err(self.invalid_op("add_prerequisite", id));
        }
        if self.ty(prerequisite).storage() != StorageKind::Interface {
            return Err(self.invalid_op("add_prerequisite", prerequisite));
        }
        if prerequisite == id || ancestry::deep_ancestors(self, prerequisite).contains(&id) {
            return Err(ModelError::CyclicPrerequisite {
                type_name: self.full_name(id),
                prerequisite: self.full_name(prerequisite),
            });
        }
        let depth = ancestry::chain_height(self, prerequisite) + 1 + ancestry::chain_depth(self, id);
        let limit = self.config.max_inheritance_depth;
        if depth > limit {
            return Err(ModelError::InheritanceTooDeep {
                type_name: self.full_name(id),
                depth,
                limit,
            });
        }
        if let TypeKind::Interface(decl) = &mut self.types[id.index()].kind {
            decl.prerequisites.push(prerequisite);
        }
        Ok(())
    }

    /// Interfaces in arena order.
    pub(crate) fn interfaces(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, ty)| ty.storage() == StorageKind::Interface)
            .map(|(idx, _)| TypeId(idx as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reopened_namespace_is_shared() {
        let mut model = Model::new();
        let root = model.root();
        let first = model.namespace(root, "Outer");
        let second = model.namespace(root, "Outer");
        assert_eq!(first, second);
        assert_eq!(model.ns(root).children(), &[first]);
    }

    #[test]
    fn full_name_skips_anonymous_namespaces() {
        let mut model = Model::new();
        let root = model.root();
        let anon = model.namespace(root, "");
        let inner = model.namespace(anon, "Inner");
        let id = model.new_type("Point", StorageKind::Record);
        model.add_type(inner, id).expect("add");
        assert_eq!(model.full_name(id), "Inner::Point");
        assert_eq!(model.list_namespaces(id), vec![root, anon, inner]);
    }

    #[test]
    fn unregistered_type_uses_bare_name() {
        let mut model = Model::new();
        let id = model.new_type("Loose", StorageKind::Record);
        assert_eq!(model.full_name(id), "Loose");
        assert!(model.list_namespaces(id).is_empty());
    }

    #[test]
    fn clone_copies_collections_by_value() {
        let mut model = Model::new();
        model.define_builtins().expect("builtins");
        let int32 = model.builtin("int32").expect("int32");
        let record = model.new_type("Point", StorageKind::Record);
        model.add_field(record, Field::new("x", int32)).expect("field");
        model.update_auxdata(record, [("label", "Point")]);

        let alias = model.clone_type(record, "Coord");
        model.add_field(alias, Field::new("y", int32)).expect("field");
        model.update_auxdata(alias, [("label", "Coord")]);

        assert_eq!(model.ty(record).fields().len(), 1);
        assert_eq!(model.ty(alias).fields().len(), 2);
        assert_eq!(model.ty(record).auxdata()["label"], "Point");
        assert_eq!(model.ty(alias).typedef_origin(), Some(record));
        assert_eq!(model.resolved(alias), record);
        assert_eq!(model.ty(record).typedef_origin(), None);
    }

    #[test]
    fn builtins_are_idempotent() {
        let mut model = Model::new();
        model.define_builtins().expect("first");
        model.define_builtins().expect("second");
        assert_eq!(model.registered().len(), BUILTIN_TYPES.len());
        let void = model.builtin("void").expect("void");
        assert_eq!(model.full_name(void), "void");
    }
}
