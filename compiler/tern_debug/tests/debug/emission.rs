//! Header and symbol emission end to end.

use pretty_assertions::assert_eq;
use tern_debug::{
    generate_debug_info_header, LineMap, MetadataNode, PrimitiveKind, SourceLocator, SourceType,
};
use tern_session::DebugLevel;

use super::util::{context, flag_keys};

#[test]
fn test_disabled_output_has_no_metadata() {
    let mut ctx = context("x86_64-unknown-linux-gnu", DebugLevel::None, "out/app.o");
    let info = generate_debug_info_header(&mut ctx).unwrap_or_else(|e| panic!("{e}"));

    assert!(info.is_none());
    assert_eq!(ctx.sink().node_count(), 0);
    assert!(ctx.sink().named_metadata("llvm.module.flags").is_none());
}

#[test]
fn test_one_compile_unit_and_two_flags_after_symbols() {
    let mut ctx = context("aarch64-apple-darwin", DebugLevel::Full, "out/app.o");
    let mut info = generate_debug_info_header(&mut ctx)
        .unwrap_or_else(|e| panic!("{e}"))
        .unwrap_or_else(|| panic!("debug info disabled"));

    let source = LineMap::new("fun add(a: Int, b: Int): Int =\n  a + b\n");
    let locator = SourceLocator::new(&source);
    let add = info
        .subprogram(&mut ctx, &locator, "add", None, 4)
        .unwrap_or_else(|e| panic!("{e}"));
    info.location(&mut ctx, &locator, 33, add)
        .unwrap_or_else(|e| panic!("{e}"));
    for kind in PrimitiveKind::ALL {
        info.basic_type(&mut ctx, &SourceType::Primitive(kind))
            .unwrap_or_else(|e| panic!("{kind:?}: {e}"));
    }
    info.basic_type(&mut ctx, &SourceType::Any { nullable: false })
        .unwrap_or_else(|e| panic!("{e}"));

    let module = ctx.sink();
    assert_eq!(module.compile_unit_count(), 1);
    assert_eq!(flag_keys(module), vec!["Dwarf Version", "Debug Info Version"]);
    assert_eq!(module.named_groups().len(), 1);
}

/// The basic-type node emitted for `kind` on `target`.
fn primitive_node(target: &str, kind: PrimitiveKind) -> MetadataNode {
    let mut ctx = context(target, DebugLevel::Full, "app.o");
    let mut info = generate_debug_info_header(&mut ctx)
        .unwrap_or_else(|e| panic!("{e}"))
        .unwrap_or_else(|| panic!("debug info disabled"));
    let id = info
        .basic_type(&mut ctx, &SourceType::Primitive(kind))
        .unwrap_or_else(|e| panic!("{kind:?}: {e}"))
        .unwrap_or_else(|| panic!("{kind:?}: no type node"));
    ctx.sink()
        .node(id)
        .cloned()
        .unwrap_or_else(|| panic!("{kind:?}: dangling node {id}"))
}

#[test]
fn test_primitive_sizes_follow_target() {
    assert!(matches!(
        primitive_node("wasm32-unknown-unknown", PrimitiveKind::Long),
        MetadataNode::BasicType {
            size_in_bits: 64,
            align_in_bits: 64,
            ..
        }
    ));
    assert!(matches!(
        primitive_node("wasm32-unknown-unknown", PrimitiveKind::Boolean),
        MetadataNode::BasicType { size_in_bits: 1, .. }
    ));

    let x86 = primitive_node("x86_64-unknown-linux-gnu", PrimitiveKind::Byte);
    let arm = primitive_node("aarch64-unknown-linux-gnu", PrimitiveKind::Byte);
    assert!(matches!(x86, MetadataNode::BasicType { align_in_bits: 8, .. }));
    assert!(matches!(arm, MetadataNode::BasicType { align_in_bits: 32, .. }));
    assert_ne!(x86, arm);
}

#[test]
fn test_line_tables_only_has_locations_but_no_types() {
    let mut ctx = context("x86_64-unknown-linux-gnu", DebugLevel::LineTablesOnly, "app.o");
    let mut info = generate_debug_info_header(&mut ctx)
        .unwrap_or_else(|e| panic!("{e}"))
        .unwrap_or_else(|| panic!("debug info disabled"));

    let int = info
        .basic_type(&mut ctx, &SourceType::Primitive(PrimitiveKind::Int))
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(int, None);

    let source = LineMap::new("fun main() = 0\n");
    let locator = SourceLocator::new(&source);
    let main = info
        .subprogram(&mut ctx, &locator, "main", None, 4)
        .unwrap_or_else(|e| panic!("{e}"));
    info.location(&mut ctx, &locator, 13, main)
        .unwrap_or_else(|e| panic!("{e}"));

    assert!(!ctx
        .sink()
        .nodes()
        .any(|(_, node)| matches!(node, MetadataNode::BasicType { .. } | MetadataNode::PointerType { .. })));
    assert_eq!(ctx.sink().compile_unit_count(), 1);
}

#[test]
fn test_unresolved_type_is_fatal() {
    let mut ctx = context("x86_64-unknown-linux-gnu", DebugLevel::Full, "app.o");
    let mut info = generate_debug_info_header(&mut ctx)
        .unwrap_or_else(|e| panic!("{e}"))
        .unwrap_or_else(|| panic!("debug info disabled"));

    let err = info
        .basic_type(
            &mut ctx,
            &SourceType::Error {
                printable: "<error>".to_string(),
            },
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "debug info for type '<error>' is not yet implemented");
}
