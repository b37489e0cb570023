// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cross-module scenario tests exercising the public surface end to end.

use crate::descriptor::{ANNOTATION_EXTENSIBILITY, ANNOTATION_KEY, ANNOTATION_VALUE_ATTR};
use crate::factory::{AnnotationFactory, DynamicDataFactory, DynamicTypeBuilderFactory};
use crate::{
    DynamicData, DynamicPubSubType, DynamicType, ReturnCode, TypeKind, MEMBER_ID_INVALID,
};

fn types() -> &'static DynamicTypeBuilderFactory {
    DynamicTypeBuilderFactory::get_instance()
}

fn prim(kind: TypeKind) -> DynamicType {
    types().get_primitive_type(kind).expect("primitive")
}

fn data_for(ty: &DynamicType) -> DynamicData {
    DynamicDataFactory::get_instance()
        .create_data(ty)
        .expect("data")
}

fn key_annotation() -> crate::AnnotationDescriptor {
    AnnotationFactory::get_instance()
        .create_annotation(ANNOTATION_KEY)
        .expect("key")
}

/// Keyed two-int point: the canonical small-key sample.
fn keyed_point() -> DynamicType {
    let mut b = types().create_struct_builder("Point").expect("b");
    b.add_member(Some(0), "x", prim(TypeKind::TK_INT32)).expect("x");
    b.add_member(Some(1), "y", prim(TypeKind::TK_INT32)).expect("y");
    b.apply_annotation_to_member(0, key_annotation()).expect("k");
    b.apply_annotation_to_member(1, key_annotation()).expect("k");
    b.build().expect("build")
}

#[test]
fn test_point_key_layout_and_raw_identity() {
    let ty = keyed_point();
    let mut d = data_for(&ty);
    d.set_i32(3, 0).expect("x");
    d.set_i32(4, 1).expect("y");

    assert_eq!(
        d.get_key_id_and_type().expect("layout"),
        &[(0, TypeKind::TK_INT32), (1, TypeKind::TK_INT32)]
    );
    let raw = d.serialize_key().expect("raw");
    assert_eq!(raw.len(), 8);
    let handle = d.get_key().expect("key");
    assert_eq!(&handle.as_bytes()[..8], &raw[..]);
    assert_eq!(&handle.as_bytes()[8..], &[0u8; 8]);
}

#[test]
fn test_enum_scenario() {
    let mut b = types().create_enum_builder("Letter").expect("b");
    for name in ["A", "B", "C"] {
        b.add_enum_literal(name).expect("l");
    }
    let ty = b.build().expect("build");
    let mut d = data_for(&ty);
    d.set_enum_string("B", MEMBER_ID_INVALID).expect("set");
    assert_eq!(d.get_enum_value(MEMBER_ID_INVALID), Ok(1));
    assert_eq!(d.get_enum_string(MEMBER_ID_INVALID), Ok("B".to_string()));
}

#[test]
fn test_nested_struct_round_trip() {
    let point = keyed_point();
    let mut b = types().create_struct_builder("Track").expect("b");
    b.add_member(Some(0), "position", point.clone()).expect("m");
    b.add_member(Some(1), "speed", prim(TypeKind::TK_FLOAT32)).expect("m");
    let ty = b.build().expect("build");

    let mut d = data_for(&ty);
    let mut pos = d.loan_value(0).expect("loan");
    pos.set_i32(-5, 0).expect("x");
    pos.set_i32(12, 1).expect("y");
    d.return_loaned_value(pos).expect("return");
    d.set_f32(1.25, 1).expect("speed");

    let bytes = d.serialize().expect("ser");
    let back = DynamicData::deserialize(&bytes, &ty).expect("de");
    let pos = back.get_complex_value(0).expect("pos");
    assert_eq!(pos.get_i32(0), Ok(-5));
    assert_eq!(pos.get_i32(1), Ok(12));
    assert_eq!(back.get_f32(1), Ok(1.25));
    assert_eq!(back, d);
}

#[test]
fn test_union_wire_round_trip() {
    let mut b = types()
        .create_union_builder("Shape", prim(TypeKind::TK_UINT16))
        .expect("b");
    b.add_union_member(Some(1), "radius", prim(TypeKind::TK_FLOAT64), &[0], false)
        .expect("radius");
    b.add_union_member(Some(2), "side", prim(TypeKind::TK_UINT32), &[1, 2], false)
        .expect("side");
    b.add_union_member(Some(3), "label", types().create_string_type(0).expect("s"), &[], true)
        .expect("label");
    let ty = b.build().expect("build");

    let mut d = data_for(&ty);
    d.set_discriminator_value(2).expect("select");
    d.set_u32(77, 2).expect("set");
    let bytes = d.serialize().expect("ser");
    // The wire discriminator is the selected value, not the first label.
    assert_eq!(&bytes[..2], [2, 0]);
    let back = DynamicData::deserialize(&bytes, &ty).expect("de");
    assert_eq!(back.get_union_id(), 2);
    assert_eq!(back.get_union_label(), Ok(2));
    assert_eq!(back.get_u32(2), Ok(77));

    // The default case survives the wire too.
    d.set_string("circle-ish".to_string(), 3).expect("set");
    let back = DynamicData::deserialize(&d.serialize().expect("ser"), &ty).expect("de");
    assert_eq!(back.get_union_id(), 3);
    assert_eq!(back.get_string(3), Ok("circle-ish".to_string()));
}

#[test]
fn test_sequence_of_strings_round_trip() {
    let seq_ty = types()
        .create_sequence_type(types().create_string_type(0).expect("s"), 0)
        .expect("seq");
    let mut d = data_for(&seq_ty);
    for text in ["alpha", "", "gamma"] {
        let id = d.insert_sequence_data().expect("insert");
        d.set_string(text.to_string(), id).expect("set");
    }
    let back = DynamicData::deserialize(&d.serialize().expect("ser"), &seq_ty).expect("de");
    assert_eq!(back.get_item_count(), 3);
    assert_eq!(back.get_string(0), Ok("alpha".to_string()));
    assert_eq!(back.get_string(1), Ok(String::new()));
    assert_eq!(back.get_string(2), Ok("gamma".to_string()));
}

#[test]
fn test_array_zero_fills_unset_cells() {
    let arr_ty = types()
        .create_array_type(prim(TypeKind::TK_UINT16), &[4])
        .expect("arr");
    let mut d = data_for(&arr_ty);
    let id = d.insert_array_data().expect("insert");
    d.set_u16(9, id).expect("set");
    let bytes = d.serialize().expect("ser");
    assert_eq!(bytes, [9, 0, 0, 0, 0, 0, 0, 0]);
    let back = DynamicData::deserialize(&bytes, &arr_ty).expect("de");
    assert_eq!(back.get_u16(3), Ok(0));
}

#[test]
fn test_map_round_trip() {
    let map_ty = types()
        .create_map_type(prim(TypeKind::TK_UINT32), prim(TypeKind::TK_FLOAT64), 0)
        .expect("map");
    let mut d = data_for(&map_ty);
    for (k, v) in [(1u32, 0.5f64), (9, 2.25)] {
        let id = d.insert_map_data(crate::DynamicValue::U32(k)).expect("pair");
        d.set_f64(v, id).expect("set");
    }
    let back = DynamicData::deserialize(&d.serialize().expect("ser"), &map_ty).expect("de");
    assert_eq!(back.get_item_count(), 2);
    assert_eq!(back.get_map_key(0), Ok(crate::DynamicValue::U32(1)));
    assert_eq!(back.get_f64(1), Ok(2.25));
}

#[test]
fn test_appendable_reader_skips_new_members() {
    let appendable = || {
        AnnotationFactory::get_instance()
            .create_annotation(ANNOTATION_EXTENSIBILITY)
            .map(|mut a| {
                a.set_value(ANNOTATION_VALUE_ATTR, "APPENDABLE").expect("attr");
                a
            })
            .expect("ext")
    };
    let mut new_b = types().create_struct_builder("Evolved").expect("b");
    new_b.add_member(Some(0), "v", prim(TypeKind::TK_INT32)).expect("m");
    new_b.add_member(Some(1), "added", prim(TypeKind::TK_INT32)).expect("m");
    new_b.apply_annotation(appendable()).expect("a");
    let new_ty = new_b.build().expect("build");

    let mut old_b = types().create_struct_builder("Evolved").expect("b");
    old_b.add_member(Some(0), "v", prim(TypeKind::TK_INT32)).expect("m");
    old_b.apply_annotation(appendable()).expect("a");
    let old_ty = old_b.build().expect("build");

    let mut sample = data_for(&new_ty);
    sample.set_i32(31, 0).expect("set");
    sample.set_i32(99, 1).expect("set");
    let back = DynamicData::deserialize(&sample.serialize().expect("ser"), &old_ty).expect("de");
    assert_eq!(back.get_i32(0), Ok(31));
}

#[test]
fn test_alias_is_transparent_on_the_wire() {
    let meters = types()
        .create_alias_type("Meters", prim(TypeKind::TK_UINT32))
        .expect("alias");
    let mut b = types().create_struct_builder("Distance").expect("b");
    b.add_member(Some(0), "d", meters).expect("m");
    let ty = b.build().expect("build");
    let mut d = data_for(&ty);
    d.set_u32(1500, 0).expect("set");
    let bytes = d.serialize().expect("ser");
    assert_eq!(bytes, 1500u32.to_le_bytes());
}

#[test]
fn test_pubsub_adapter_full_path() {
    let ty = keyed_point();
    let adapter = DynamicPubSubType::new(ty.clone());
    assert!(adapter.is_with_key());
    let mut d = data_for(&ty);
    d.set_i32(8, 0).expect("x");
    d.set_i32(-8, 1).expect("y");
    let bytes = adapter.serialize(&d).expect("ser");
    let back = adapter.deserialize(&bytes).expect("de");
    assert_eq!(adapter.get_key(&d), adapter.get_key(&back));
    // Identity survives clearing non-key state.
    let mut cleared = back.clone();
    cleared.clear_nonkey_values().expect("clear");
    assert_eq!(adapter.get_key(&cleared), adapter.get_key(&d));
}

#[test]
fn test_malformed_payload_reports_bad_parameter() {
    let ty = keyed_point();
    assert_eq!(
        DynamicData::deserialize(&[1, 2, 3, 4, 5], &ty).map(|_| ()),
        Err(ReturnCode::BadParameter)
    );
}
