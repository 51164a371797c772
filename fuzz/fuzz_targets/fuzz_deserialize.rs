// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::{Arc, OnceLock};
use weft::{ClassDef, Engine, EngineConfig, FieldType, StructureKind};

fn classes() -> [Arc<ClassDef>; 2] {
    let node = ClassDef::builder("Node")
        .tagged("value", FieldType::Int, 1)
        .tagged("label", FieldType::Str, 2)
        .tagged("next", FieldType::class("Node"), 3)
        .tagged("items", FieldType::list_of(FieldType::Any), 4)
        .build();
    let pair = ClassDef::builder("Pair")
        .type_param("T")
        .tagged("first", FieldType::type_var("T"), 1)
        .tagged("second", FieldType::parameterized("Pair", vec![FieldType::Long]), 2)
        .final_class()
        .build();
    [node, pair]
}

fn engines() -> &'static [Engine] {
    static ENGINES: OnceLock<Vec<Engine>> = OnceLock::new();
    ENGINES.get_or_init(|| {
        [
            StructureKind::FieldOrder,
            StructureKind::NamedSchema,
            StructureKind::Tagged,
            StructureKind::Versioned,
        ]
        .into_iter()
        .map(|kind| {
            let engine = Engine::with_config(EngineConfig {
                default_structure: kind,
                max_depth: 64,
                ..EngineConfig::default()
            });
            for class in classes() {
                let _ = engine.register(&class);
            }
            engine
        })
        .collect()
    })
}

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must fail cleanly, never panic or overflow the stack.
    for engine in engines() {
        if let Ok(value) = engine.deserialize(data) {
            let _ = engine.serialize(&value);
        }
    }
});
