//! Binary type package writer.
//!
//! Layout: the magic header, then one length-prefixed block per namespace that
//! has implemented members. A namespace block holds its path, a type count and
//! one size-prefixed record per type. A record starts with the storage tag
//! byte, the type name and its `key=value` auxiliary strings; records,
//! sequences, enums and interfaces continue with their member descriptors.

use idlc_rt::pack::{PackError, PackWriter};

use crate::model::{Field, Model, TypeId, TypeKind};

pub const PACKAGE_MAGIC: &[u8; 8] = b"IDLCPKG1";

fn exported(model: &Model, id: TypeId) -> bool {
    let ty = model.ty(id);
    ty.isimpl() && !matches!(ty.kind(), TypeKind::Func(_))
}

fn write_aux<'a, I>(out: &mut PackWriter, entries: I) -> Result<(), PackError>
where
    I: ExactSizeIterator<Item = (&'a String, &'a String)>,
{
    out.count(entries.len())?;
    for (key, value) in entries {
        out.str(&format!("{key}={value}"))?;
    }
    Ok(())
}

fn write_field(model: &Model, out: &mut PackWriter, field: &Field) -> Result<(), PackError> {
    out.str(&field.ident)?;
    out.str(&model.full_name(field.ty))?;
    write_aux(out, field.auxdata.iter())
}

fn write_fields(model: &Model, out: &mut PackWriter, fields: &[Field]) -> Result<(), PackError> {
    out.count(fields.len())?;
    for field in fields {
        write_field(model, out, field)?;
    }
    Ok(())
}

fn write_type(model: &Model, out: &mut PackWriter, id: TypeId) -> Result<(), PackError> {
    let ty = model.ty(id);
    out.tag(ty.storage().tag());
    out.str(ty.name())?;
    write_aux(out, ty.auxdata().iter())?;
    match ty.kind() {
        TypeKind::Enum(decl) => {
            out.int(u64::from(decl.combinable))?;
            out.count(decl.options.len())?;
            for option in &decl.options {
                out.str(&option.ident)?;
                out.str(&option.label)?;
                out.str(&option.blurb)?;
                out.str(&option.value.to_string())?;
            }
        }
        TypeKind::Sequence(decl) => match &decl.elements {
            Some(field) => {
                out.count(1)?;
                write_field(model, out, field)?;
            }
            None => out.count(0)?,
        },
        TypeKind::Record(decl) => write_fields(model, out, &decl.fields)?,
        TypeKind::Interface(decl) => {
            out.count(decl.prerequisites.len())?;
            for &prerequisite in &decl.prerequisites {
                out.str(&model.full_name(prerequisite))?;
            }
            write_fields(model, out, &decl.fields)?;
        }
        _ => {}
    }
    Ok(())
}

pub fn write_package(model: &Model) -> Result<Vec<u8>, PackError> {
    let mut out = PackWriter::new();
    out.raw(PACKAGE_MAGIC);
    for ns in model.namespace_ids() {
        let members: Vec<TypeId> = model
            .ns(ns)
            .members()
            .iter()
            .copied()
            .filter(|&id| exported(model, id))
            .collect();
        if members.is_empty() {
            continue;
        }
        out.block(|block| {
            block.str(&model.namespace_path(ns))?;
            block.count(members.len())?;
            for &id in &members {
                block.block(|record| write_type(model, record, id))?;
            }
            Ok(())
        })?;
    }
    tracing::debug!(bytes = out.len(), "wrote type package");
    Ok(out.into_bytes())
}
