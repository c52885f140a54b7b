//! Post-build checks that never block construction of the model.
//!
//! Duplicate member identifiers are accepted by the build API; this pass
//! reports them, as warnings by default or as errors with `strict_members`.

use std::collections::HashSet;

use crate::diag::{Diagnostics, Level};
use crate::model::{Model, StorageKind};
use crate::registry::{DispatchTable, Member};

fn level(model: &Model) -> Level {
    if model.config().strict_members {
        Level::Error
    } else {
        Level::Warning
    }
}

fn duplicates<'a, I>(names: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        if !seen.insert(name) && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

pub fn check_members(model: &Model, diags: &mut Diagnostics) {
    let level = level(model);
    for &id in model.registered() {
        let ty = model.ty(id);
        let owner = model.full_name(id);
        let location = ty.location().clone();
        for name in duplicates(ty.fields().iter().map(|f| f.ident.as_str())) {
            diags.push(level, location.clone(), format!("duplicate field `{name}` in {owner}"));
        }
        for name in duplicates(ty.options().iter().map(|o| o.ident.as_str())) {
            diags.push(level, location.clone(), format!("duplicate enum option `{name}` in {owner}"));
        }
        if ty.storage() != StorageKind::Interface {
            continue;
        }
        let callables = ty.methods().iter().chain(ty.signals());
        for name in duplicates(callables.clone().map(|&func| model.ty(func).name())) {
            diags.push(level, location.clone(), format!("duplicate method `{name}` in {owner}"));
        }
        for &func in callables {
            let Some(decl) = model.ty(func).as_func() else {
                continue;
            };
            for name in duplicates(decl.args.iter().map(|arg| arg.ident.as_str())) {
                diags.push(
                    level,
                    model.ty(func).location().clone(),
                    format!("duplicate argument `{name}` in {owner}::{}", model.ty(func).name()),
                );
            }
        }
    }
}

fn describe(member: &Member) -> String {
    match member {
        Member::TypeList => "type list".to_string(),
        Member::Getter { field, .. } => format!("getter `{field}`"),
        Member::Setter { field, .. } => format!("setter `{field}`"),
        Member::Method { name, .. } => format!("method `{name}`"),
        Member::SignalConnect { name, .. } => format!("signal `{name}`"),
    }
}

/// Reports identifiers that two entries of one table share; such entries
/// cannot both be dispatched.
pub fn check_dispatch(model: &Model, tables: &[DispatchTable], diags: &mut Diagnostics) {
    let level = level(model);
    for table in tables {
        for (hash, members) in table.collisions() {
            let names: Vec<String> = members.iter().map(|m| describe(m)).collect();
            tracing::warn!(interface = %table.name, %hash, "dispatch identifier collision");
            diags.push(
                level,
                model.ty(table.interface).location().clone(),
                format!(
                    "identifier {hash} is shared by {} in {}",
                    names.join(", "),
                    table.name
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::diag::Diag;
    use crate::model::{EnumOption, Field, FuncArg, TypeId};

    fn shop_model(strict: bool) -> Model {
        let mut model = Model::with_config(Config {
            strict_members: strict,
            ..Config::default()
        });
        model.define_builtins().expect("builtins");
        model
    }

    fn declare(model: &mut Model, name: &str, storage: StorageKind) -> TypeId {
        let ns = model.namespace(model.root(), "Shop");
        let id = model.new_type(name, storage);
        model.add_type(ns, id).expect("insert");
        id
    }

    fn members(model: &Model) -> Vec<Diag> {
        let mut diags = Diagnostics::default();
        check_members(model, &mut diags);
        diags.into_vec()
    }

    fn messages(diags: &[Diag]) -> Vec<&str> {
        diags.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn duplicate_record_fields_are_reported_once() {
        let mut model = shop_model(false);
        let int32 = model.builtin("int32").expect("int32");
        let item = declare(&mut model, "Item", StorageKind::Record);
        for ident in ["sku", "price", "sku", "sku"] {
            model.add_field(item, Field::new(ident, int32)).expect("field");
        }
        let diags = members(&model);
        assert_eq!(messages(&diags), vec!["duplicate field `sku` in Shop::Item"]);
        assert_eq!(diags[0].level, Level::Warning);
    }

    #[test]
    fn duplicate_enum_options_are_errors_when_strict() {
        let mut model = shop_model(true);
        let state = declare(&mut model, "State", StorageKind::Enum);
        for (ident, value) in [("OPEN", 0), ("CLOSED", 1), ("OPEN", 2)] {
            model
                .add_option(state, EnumOption::new(ident, value))
                .expect("option");
        }
        let diags = members(&model);
        assert_eq!(
            messages(&diags),
            vec!["duplicate enum option `OPEN` in Shop::State"]
        );
        assert_eq!(diags[0].level, Level::Error);
    }

    #[test]
    fn method_and_signal_sharing_a_name_collide() {
        let mut model = shop_model(false);
        let void = model.builtin("void").expect("void");
        let cart = declare(&mut model, "Cart", StorageKind::Interface);
        let method = model.new_method("changed", void);
        model.add_method(cart, method).expect("method");
        let signal = model.new_signal("changed", void);
        model.add_method(cart, signal).expect("signal");
        assert_eq!(
            messages(&members(&model)),
            vec!["duplicate method `changed` in Shop::Cart"]
        );
    }

    #[test]
    fn duplicate_argument_identifiers_name_the_method() {
        let mut model = shop_model(false);
        let int32 = model.builtin("int32").expect("int32");
        let void = model.builtin("void").expect("void");
        let cart = declare(&mut model, "Cart", StorageKind::Interface);
        let add = model.new_method("add", void);
        model.add_arg(add, FuncArg::new("qty", int32)).expect("arg");
        model.add_arg(add, FuncArg::new("qty", int32)).expect("arg");
        model.add_method(cart, add).expect("method");
        let changed = model.new_signal("changed", void);
        model.add_arg(changed, FuncArg::new("who", int32)).expect("arg");
        model.add_arg(changed, FuncArg::new("who", int32)).expect("arg");
        model.add_method(cart, changed).expect("signal");
        assert_eq!(
            messages(&members(&model)),
            vec![
                "duplicate argument `qty` in Shop::Cart::add",
                "duplicate argument `who` in Shop::Cart::changed",
            ]
        );
    }

    #[test]
    fn distinct_members_produce_no_diagnostics() {
        let mut model = shop_model(true);
        let int32 = model.builtin("int32").expect("int32");
        let void = model.builtin("void").expect("void");
        let cart = declare(&mut model, "Cart", StorageKind::Interface);
        model.add_field(cart, Field::new("count", int32)).expect("field");
        let clear = model.new_method("clear", void);
        model.add_method(cart, clear).expect("method");
        assert!(members(&model).is_empty());
    }
}
