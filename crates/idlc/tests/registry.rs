use idlc::diag::Level;
use idlc::digest::DigestEngine;
use idlc::model::{Field, FuncArg};
use idlc::registry::{
    Member, TYPELIST_SUFFIX, build_registry, build_table, decode_snapshot, encode_snapshot,
};
use idlc::{Config, Model, StorageKind, TypeId, analyze_model};

fn interface(model: &mut Model, name: &str, prerequisites: &[TypeId]) -> TypeId {
    let ns = model.namespace(model.root(), "Shop");
    let id = model.new_type(name, StorageKind::Interface);
    model.add_type(ns, id).expect("insert");
    model.set_impl(id, true);
    for &prerequisite in prerequisites {
        model
            .add_prerequisite(id, prerequisite)
            .expect("prerequisite");
    }
    id
}

fn builtin(model: &Model, name: &str) -> TypeId {
    model.builtin(name).expect("builtin")
}

#[test]
fn derived_scenario_tables() {
    let mut model = Model::new();
    model.define_builtins().expect("builtins");
    let base = interface(&mut model, "Base", &[]);
    let derived = interface(&mut model, "Derived", &[base]);
    let method = model.new_method("m", builtin(&model, "String"));
    model
        .add_arg(method, FuncArg::new("value", builtin(&model, "int32")))
        .expect("arg");
    model.add_method(derived, method).expect("method");

    let mut engine = DigestEngine::new();
    let table = build_table(&model, &mut engine, derived);
    assert_eq!(table.name, "Shop::Derived");
    assert_eq!(table.bases, vec![base]);
    let lineage: Vec<&str> = table.ancestry.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(lineage, vec!["Shop::Base", "Shop::Derived"]);
    assert_eq!(table.ancestry[1].hash, table.hash);

    let root = build_table(&model, &mut engine, base);
    assert!(root.bases.is_empty());
    assert_eq!(root.ancestry.len(), 1);
}

#[test]
fn entries_follow_documented_order() {
    let mut model = Model::new();
    model.define_builtins().expect("builtins");
    let cart = interface(&mut model, "Cart", &[]);
    let int32 = builtin(&model, "int32");
    let void = builtin(&model, "void");
    model.add_field(cart, Field::new("count", int32)).expect("field");
    model.add_field(cart, Field::new("total", int32)).expect("field");
    let clear = model.new_method("clear", void);
    model.add_method(cart, clear).expect("method");
    let changed = model.new_signal("changed", void);
    model.add_method(cart, changed).expect("signal");

    let mut engine = DigestEngine::new();
    let table = build_table(&model, &mut engine, cart);
    let shape: Vec<String> = table
        .entries
        .iter()
        .map(|entry| match &entry.member {
            Member::TypeList => "typelist".to_string(),
            Member::Getter { field, .. } => format!("get {field}"),
            Member::Setter { field, .. } => format!("set {field}"),
            Member::Method { name, .. } => format!("call {name}"),
            Member::SignalConnect { name, .. } => format!("connect {name}"),
        })
        .collect();
    assert_eq!(
        shape,
        vec![
            "typelist",
            "get count",
            "get total",
            "set count",
            "set total",
            "call clear",
            "connect changed",
        ]
    );
    assert_eq!(
        table.entries[0].hash,
        engine.twoway_hash(&model, cart, TYPELIST_SUFFIX)
    );
    assert_eq!(table.lookup(&table.entries[5].hash), Some(&table.entries[5].member));
    assert!(table.collisions().is_empty());
}

#[test]
fn diamond_reduces_bases_and_lists_ancestry_once() {
    let mut model = Model::new();
    model.define_builtins().expect("builtins");
    let item = interface(&mut model, "Item", &[]);
    let priced = interface(&mut model, "Priced", &[item]);
    let named = interface(&mut model, "Named", &[item]);
    let product = interface(&mut model, "Product", &[item, priced, named]);

    let mut engine = DigestEngine::new();
    let table = build_table(&model, &mut engine, product);
    assert_eq!(table.bases, vec![priced, named]);
    let lineage: Vec<TypeId> = table.ancestry.iter().map(|a| a.ty).collect();
    assert_eq!(lineage, vec![named, priced, item, product]);
}

#[test]
fn registry_skips_unimplemented_and_forward_interfaces() {
    let mut model = Model::new();
    model.define_builtins().expect("builtins");
    let shown = interface(&mut model, "Shown", &[]);
    let hidden = interface(&mut model, "Hidden", &[]);
    model.set_impl(hidden, false);
    let forward = interface(&mut model, "Forward", &[]);
    model.set_forward(forward, true);
    let record = model.new_type("Receipt", StorageKind::Record);
    model.set_impl(record, true);
    model.add_type(model.root(), record).expect("record");

    let mut engine = DigestEngine::new();
    let tables = build_registry(&model, &mut engine);
    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Shop::Shown"]);
    assert_eq!(tables[0].interface, shown);
}

#[test]
fn snapshot_survives_encoding() {
    let mut model = Model::new();
    model.define_builtins().expect("builtins");
    let base = interface(&mut model, "Base", &[]);
    let _derived = interface(&mut model, "Derived", &[base]);
    model
        .add_field(base, Field::new("id", builtin(&model, "int64")))
        .expect("field");

    let mut engine = DigestEngine::new();
    let tables = build_registry(&model, &mut engine);
    let bytes = encode_snapshot(&tables).expect("encode");
    let decoded = decode_snapshot(&bytes).expect("decode");
    assert_eq!(decoded, tables);
}

#[test]
fn analyze_reports_duplicate_methods_by_config() {
    let _ = idlc_rt::log::init();
    for (strict, level) in [(false, Level::Warning), (true, Level::Error)] {
        let config = Config {
            strict_members: strict,
            ..Config::default()
        };
        let mut model = Model::with_config(config);
        model.define_builtins().expect("builtins");
        let cart = interface(&mut model, "Cart", &[]);
        let void = builtin(&model, "void");
        for _ in 0..2 {
            let clear = model.new_method("clear", void);
            model.add_method(cart, clear).expect("method");
        }

        let (analysis, diags) = analyze_model(&model);
        assert_eq!(analysis.tables.len(), 1);
        assert_eq!(analysis.failed, strict);
        assert_eq!(analysis.tables[0].collisions().len(), 1);
        let mut messages: Vec<String> = diags.iter().map(|d| d.message.clone()).collect();
        messages.sort();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "duplicate method `clear` in Shop::Cart");
        assert!(messages[1].starts_with("identifier "));
        assert!(messages[1].ends_with("is shared by method `clear`, method `clear` in Shop::Cart"));
        assert!(diags.iter().all(|d| d.level == level));
    }
}
