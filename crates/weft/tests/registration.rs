// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Registration: closed registries, id assignment, configuration errors.

use std::sync::Arc;
use weft::codec::structure;
use weft::{
    Builtin, BypassInstantiator, ClassDef, Codec, DeflateCodec, Engine, EngineConfig,
    ErrorCategory, ErrorKind, FieldType, ObjectRef, Output, StringCodec, StructureKind,
    TypeHandle, Value, WriteContext,
};

fn closed() -> Engine {
    Engine::with_config(EngineConfig {
        registration_required: true,
        ..EngineConfig::default()
    })
}

fn point() -> Arc<ClassDef> {
    ClassDef::builder("Point")
        .field("x", FieldType::Int)
        .field("y", FieldType::Int)
        .build()
}

fn line() -> Arc<ClassDef> {
    ClassDef::builder("Line")
        .field("p1", FieldType::class("Point"))
        .field("p2", FieldType::class("Point"))
        .build()
}

fn sample_line(point: &Arc<ClassDef>, line: &Arc<ClassDef>) -> Value {
    let p = ObjectRef::new(point).with("x", 1).expect("point");
    Value::from(
        ObjectRef::new(line)
            .with("p1", p.clone())
            .and_then(|o| o.with("p2", p))
            .expect("line"),
    )
}

// ============================================================================
// Closed registry
// ============================================================================

#[test]
fn test_closed_registry_fails_before_writing() {
    let engine = closed();
    let (point, line) = (point(), line());
    engine.register(&line).expect("register Line");

    let value = sample_line(&point, &line);
    let mut out = Output::new();
    let err = engine
        .write_root(&mut WriteContext::new(), &mut out, &value)
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Unregistered(name) if name == "Point"));
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(out.is_empty());
}

#[test]
fn test_closed_registry_roundtrip_when_complete() {
    let engine = closed();
    let (point, line) = (point(), line());
    engine.register(&point).expect("Point");
    engine.register(&line).expect("Line");

    let value = sample_line(&point, &line);
    let bytes = engine.serialize(&value).expect("serialize");
    let decoded = engine.deserialize(&bytes).expect("deserialize");
    assert!(weft::graph_eq(&decoded, &value));
}

#[test]
fn test_closed_registry_rejects_named_class_on_read() {
    let open = Engine::new();
    let (point, line) = (point(), line());
    open.register_with_id(&line, 11).expect("Line");
    open.define(&point);
    let bytes = open.serialize(&sample_line(&point, &line)).expect("open write");

    let engine = closed();
    engine.register_with_id(&line, 11).expect("Line");
    engine.define(&point);
    let err = engine.deserialize(&bytes).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Unregistered(name) if name == "Point"));
    assert_eq!(err.trace(), ["p1 (Line)"]);
}

// ============================================================================
// Ids
// ============================================================================

#[test]
fn test_ids_follow_registration_order() {
    let engine = Engine::new();
    let (point, line) = (point(), line());
    let first = engine.register(&line).expect("Line");
    let second = engine.register(&point).expect("Point");
    assert_eq!(first.id(), Some(10));
    assert_eq!(second.id(), Some(11));

    let names: Vec<String> = engine
        .registrations()
        .iter()
        .filter(|r| r.id().is_some_and(|id| id >= 10))
        .map(|r| r.ty().name().to_owned())
        .collect();
    assert_eq!(names, ["Line", "Point"]);
}

#[test]
fn test_ids_must_match_on_both_ends() {
    let (point, line) = (point(), line());
    let writer = Engine::new();
    writer.register(&point).expect("Point");
    writer.register(&line).expect("Line");
    let bytes = writer.serialize(&sample_line(&point, &line)).expect("write");

    // Registered in the opposite order: the root token now names Point,
    // which reads two members and leaves the rest of the stream behind.
    let reader = Engine::new();
    reader.register(&line).expect("Line");
    reader.register(&point).expect("Point");
    assert!(reader.deserialize(&bytes).is_err());
}

#[test]
fn test_id_conflict_is_configuration_error() {
    let engine = Engine::new();
    engine.register_with_id(&point(), 40).expect("Point");
    let err = engine.register_with_id(&line(), 40).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(matches!(err.kind(), ErrorKind::IdConflict { id: 40, .. }));
}

// ============================================================================
// Codec configuration errors
// ============================================================================

#[test]
fn test_duplicate_tags_rejected_at_registration() {
    let engine = Engine::with_config(EngineConfig {
        default_structure: StructureKind::Tagged,
        ..EngineConfig::default()
    });
    let base = ClassDef::builder("Event").tagged("id", FieldType::Int, 1).build();
    let derived = ClassDef::builder("Click")
        .extends(&base)
        .tagged("button", FieldType::Int, 1)
        .build();
    let err = engine.register(&derived).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(matches!(
        err.kind(),
        ErrorKind::DuplicateTag { tag: 1, class, .. } if class == "Click"
    ));
    assert!(engine.registration(&TypeHandle::from(&derived)).is_none());
}

#[test]
fn test_non_instantiable_rejected_eagerly() {
    let shape = ClassDef::builder("Shape")
        .field("sides", FieldType::Int)
        .no_default_constructor()
        .build();
    let engine = Engine::new();
    let err = engine.register(&shape).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NotInstantiable(name) if name == "Shape"));

    // Implicit registration during a write fails the same way.
    let value = Value::from(ObjectRef::new(&shape));
    let err = engine.serialize(&value).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NotInstantiable(_)));
}

#[test]
fn test_bypass_instantiator_per_registration() {
    let shape = ClassDef::builder("Shape")
        .field("sides", FieldType::Int)
        .no_default_constructor()
        .build();
    let engine = Engine::new();
    engine
        .registrar(&shape)
        .instantiator(Arc::new(BypassInstantiator))
        .register()
        .expect("bypass");

    let value = Value::from(ObjectRef::new(&shape).with("sides", 3).expect("shape"));
    let bytes = engine.serialize(&value).expect("serialize");
    let decoded = engine.deserialize(&bytes).expect("deserialize");
    assert!(weft::graph_eq(&decoded, &value));
}

#[test]
fn test_registered_codec_replaces_default() {
    let engine = Engine::new();
    let (point, line) = (point(), line());
    engine.register_with_id(&point, 10).expect("Point");
    let plain = engine.register_with_id(&line, 11).expect("Line");
    let inner = plain.codec();
    engine
        .registrar(&line)
        .codec(Arc::new(DeflateCodec::new(inner)))
        .register()
        .expect("swap");
    assert_eq!(plain.codec().name(), "DeflateCodec");
    assert_eq!(plain.id(), Some(11));

    let value = sample_line(&point, &line);
    let bytes = engine.serialize(&value).expect("serialize");
    assert_eq!(bytes[0], 13);
    let decoded = engine.deserialize(&bytes).expect("deserialize");
    assert!(weft::graph_eq(&decoded, &value));
}

// ============================================================================
// Default-codec rules
// ============================================================================

fn codec_name(engine: &Engine, ty: impl Into<TypeHandle>) -> &'static str {
    engine.default_codec(&ty.into()).expect("codec").name()
}

#[test]
fn test_default_codec_rule_order() {
    let shape = ClassDef::builder("Shape").build();
    let polygon = ClassDef::builder("Polygon").extends(&shape).build();
    let square = ClassDef::builder("Square").extends(&polygon).build();
    let circle = ClassDef::builder("Circle").extends(&shape).build();
    let loose = ClassDef::builder("Loose").build();

    let deflate_str = |_: &Engine, _: &TypeHandle| -> weft::Result<Arc<dyn Codec>> {
        Ok(Arc::new(DeflateCodec::new(Arc::new(StringCodec))))
    };
    let engine = Engine::builder()
        .default_codec(&shape, structure::factory(StructureKind::Versioned))
        .default_codec(&circle, structure::factory(StructureKind::Tagged))
        .default_codec(&polygon, structure::factory(StructureKind::NamedSchema))
        .default_codec(Builtin::Str, Arc::new(deflate_str))
        .build();

    // An exact rule wins over an earlier assignable one.
    assert_eq!(codec_name(&engine, &circle), "TaggedFieldCodec");
    assert_eq!(codec_name(&engine, &polygon), "CompatibleFieldCodec");
    // Without an exact rule, the first assignable rule wins.
    assert_eq!(codec_name(&engine, &square), "VersionFieldCodec");
    assert_eq!(codec_name(&engine, &shape), "VersionFieldCodec");
    // Rules apply before the built-in codec, which applies before the
    // structural fallback.
    assert_eq!(codec_name(&engine, Builtin::Str), "DeflateCodec");
    assert_eq!(codec_name(&engine, Builtin::Int), "IntCodec");
    assert_eq!(codec_name(&engine, &loose), "FieldCodec");

    // Registration without an explicit codec uses the same rules.
    let registration = engine.register(&square).expect("Square");
    assert_eq!(registration.codec().name(), "VersionFieldCodec");
}
