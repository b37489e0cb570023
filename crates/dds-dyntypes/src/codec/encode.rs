// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sample encoding.

use crate::codec::cursor::Writer;
use crate::codec::{CodecError, CodecResult};
use crate::data::{DynamicData, DynamicValue};
use crate::descriptor::Extensibility;
use crate::kind::TypeKind;
use crate::types::{DynamicType, DynamicTypeMember};

/// 28-bit member id mask inside an EMHEADER.
pub(crate) const EMHEADER_ID_MASK: u32 = 0x0FFF_FFFF;
/// EMHEADER length code "NEXTINT reused as member length".
pub(crate) const LC_NEXT_INT: u32 = 5;

/// Encode a whole sample into a fresh buffer.
pub fn serialize(data: &DynamicData) -> CodecResult<Vec<u8>> {
    let mut w = Writer::new();
    encode_data(&mut w, data)?;
    Ok(w.into_vec())
}

/// Encoded size of [`serialize`] output.
pub fn serialized_size(data: &DynamicData) -> CodecResult<usize> {
    serialize(data).map(|buf| buf.len())
}

/// Dispatch on the bound type's kind.
pub(crate) fn encode_data(w: &mut Writer, data: &DynamicData) -> CodecResult<()> {
    let ty = data.get_type().clone();
    match ty.get_kind() {
        TypeKind::TK_STRUCTURE | TypeKind::TK_ANNOTATION => match ty.get_extensibility() {
            Extensibility::Final => encode_members_typeless(w, data, &ty),
            Extensibility::Appendable => {
                w.align(4);
                let dheader_pos = w.position();
                w.write_u32_le(0);
                encode_members_typeless(w, data, &ty)?;
                let len = (w.position() - dheader_pos - 4) as u32;
                w.patch_u32_le(dheader_pos, len)
            }
            Extensibility::Mutable => encode_members_identified(w, data, &ty),
        },
        TypeKind::TK_UNION => encode_union(w, data, &ty),
        TypeKind::TK_SEQUENCE => {
            let element_ty = element_type(&ty)?;
            w.align(4);
            w.write_u32_le(data.get_item_count() as u32);
            for id in data.element_ids().collect::<Vec<_>>() {
                encode_slot(w, slot_value(data, id)?, &element_ty)?;
            }
            Ok(())
        }
        TypeKind::TK_ARRAY => {
            let element_ty = element_type(&ty)?;
            for i in 0..ty.get_total_bound() as u32 {
                match data.value_of(i) {
                    Some(value) => encode_slot(w, value, &element_ty)?,
                    // Unpopulated cells serialize as the element default.
                    None => {
                        let zero = DynamicValue::default_for(&element_ty)
                            .ok_or(CodecError::UnsupportedKind(element_ty.get_kind()))?;
                        encode_slot(w, &zero, &element_ty)?;
                    }
                }
            }
            Ok(())
        }
        TypeKind::TK_MAP => {
            let element_ty = element_type(&ty)?;
            let key_ty = ty
                .get_key_element_type()
                .map(|t| t.resolve_alias())
                .ok_or(CodecError::UnsupportedKind(TypeKind::TK_MAP))?;
            w.align(4);
            w.write_u32_le(data.get_item_count() as u32);
            for id in data.element_ids().collect::<Vec<_>>() {
                let key = data.map_key_of(id).ok_or_else(|| CodecError::InvalidData {
                    reason: "map pair without a key".into(),
                })?;
                encode_slot(w, key, &key_ty)?;
                encode_slot(w, slot_value(data, id)?, &element_ty)?;
            }
            Ok(())
        }
        // Single-value samples.
        _ => encode_slot(w, slot_value(data, 0)?, &ty),
    }
}

/// FINAL/APPENDABLE body: members in declaration order, no per-member
/// header. Absent optional members are zero-filled with their default.
fn encode_members_typeless(w: &mut Writer, data: &DynamicData, ty: &DynamicType) -> CodecResult<()> {
    for member in ty.members() {
        let member_ty = member_type(member)?;
        match data.value_of(member.get_id()) {
            Some(value) => encode_slot(w, value, &member_ty)?,
            None => {
                let zero = DynamicValue::from_literal(&member_ty, &member.get_descriptor().default_value)
                    .ok_or(CodecError::UnsupportedKind(member_ty.get_kind()))?;
                encode_slot(w, &zero, &member_ty)?;
            }
        }
    }
    Ok(())
}

/// MUTABLE body: DHEADER, then per present member an EMHEADER
/// `(LC=NEXTINT << 28) | id`, a NEXTINT length, and the payload encoded
/// with alignment relative to its own start. Absent optional members are
/// omitted entirely.
fn encode_members_identified(
    w: &mut Writer,
    data: &DynamicData,
    ty: &DynamicType,
) -> CodecResult<()> {
    w.align(4);
    let dheader_pos = w.position();
    w.write_u32_le(0);
    for member in ty.members() {
        let id = member.get_id();
        let Some(value) = data.value_of(id) else {
            continue;
        };
        let member_ty = member_type(member)?;
        let mut payload = Writer::new();
        encode_slot(&mut payload, value, &member_ty)?;
        let payload = payload.into_vec();

        w.align(4);
        w.write_u32_le(LC_NEXT_INT << 28 | id & EMHEADER_ID_MASK);
        w.write_u32_le(payload.len() as u32);
        w.write_bytes(&payload);
    }
    let len = (w.position() - dheader_pos - 4) as u32;
    w.patch_u32_le(dheader_pos, len)
}

/// Discriminator first (typeless), then the single active member.
fn encode_union(w: &mut Writer, data: &DynamicData, ty: &DynamicType) -> CodecResult<()> {
    let active = data.get_union_id();
    if active == crate::MEMBER_ID_INVALID {
        return Err(CodecError::InvalidData {
            reason: "union has no active member".into(),
        });
    }
    let member = ty
        .get_member(active)
        .map_err(|_| CodecError::InvalidData {
            reason: "active union member not in type".into(),
        })?;
    let label = data
        .raw_union_label()
        .or_else(|| member.get_union_labels().first().copied())
        .unwrap_or_else(|| default_case_label(ty));
    let disc_kind = ty
        .get_discriminator_type()
        .map(|t| t.resolved_kind())
        .ok_or(CodecError::UnsupportedKind(TypeKind::TK_UNION))?;
    write_discriminator(w, disc_kind, label)?;
    let member_ty = member_type(&member)?;
    encode_slot(w, slot_value(data, active)?, &member_ty)
}

/// One value at its type's wire shape.
pub(crate) fn encode_slot(w: &mut Writer, value: &DynamicValue, ty: &DynamicType) -> CodecResult<()> {
    let resolved = ty.resolve_alias();
    let kind = resolved.get_kind();
    match (kind, value) {
        (TypeKind::TK_BOOLEAN, DynamicValue::Bool(v)) => w.write_u8(u8::from(*v)),
        (TypeKind::TK_BYTE | TypeKind::TK_UINT8, DynamicValue::U8(v)) => w.write_u8(*v),
        (TypeKind::TK_UINT16, DynamicValue::U16(v)) => {
            w.align(2);
            w.write_u16_le(*v);
        }
        (TypeKind::TK_UINT32, DynamicValue::U32(v)) => {
            w.align(4);
            w.write_u32_le(*v);
        }
        (TypeKind::TK_UINT64, DynamicValue::U64(v)) => {
            w.align(8);
            w.write_u64_le(*v);
        }
        (TypeKind::TK_INT8, DynamicValue::I8(v)) => w.write_i8(*v),
        (TypeKind::TK_INT16, DynamicValue::I16(v)) => {
            w.align(2);
            w.write_i16_le(*v);
        }
        (TypeKind::TK_INT32, DynamicValue::I32(v)) => {
            w.align(4);
            w.write_i32_le(*v);
        }
        (TypeKind::TK_INT64, DynamicValue::I64(v)) => {
            w.align(8);
            w.write_i64_le(*v);
        }
        (TypeKind::TK_FLOAT32, DynamicValue::F32(v)) => {
            w.align(4);
            w.write_f32_le(*v);
        }
        (TypeKind::TK_FLOAT64, DynamicValue::F64(v)) => {
            w.align(8);
            w.write_f64_le(*v);
        }
        (TypeKind::TK_FLOAT128, DynamicValue::F128(v)) => {
            w.align(16);
            w.write_bytes(v);
        }
        (TypeKind::TK_CHAR8, DynamicValue::Char8(v)) => w.write_u8(*v as u8),
        (TypeKind::TK_CHAR16, DynamicValue::Char16(v)) => {
            w.align(2);
            w.write_u16_le(*v);
        }
        (TypeKind::TK_STRING8, DynamicValue::String(v)) => {
            // u32 length including the terminating NUL.
            w.align(4);
            w.write_u32_le(v.len() as u32 + 1);
            w.write_bytes(v.as_bytes());
            w.write_u8(0);
        }
        (TypeKind::TK_STRING16, DynamicValue::WString(v)) => {
            // u32 count of UTF-16 code units, no terminator.
            let units: Vec<u16> = v.encode_utf16().collect();
            w.align(4);
            w.write_u32_le(units.len() as u32);
            for unit in units {
                w.write_u16_le(unit);
            }
        }
        (TypeKind::TK_ENUM, DynamicValue::U32(v)) => {
            w.align(4);
            w.write_u32_le(*v);
        }
        (TypeKind::TK_BITMASK | TypeKind::TK_BITSET, DynamicValue::U64(v)) => {
            // Smallest carrier that fits the declared bit width.
            match carrier_bits(&resolved) {
                0..=8 => w.write_u8(*v as u8),
                9..=16 => {
                    w.align(2);
                    w.write_u16_le(*v as u16);
                }
                17..=32 => {
                    w.align(4);
                    w.write_u32_le(*v as u32);
                }
                _ => {
                    w.align(8);
                    w.write_u64_le(*v);
                }
            }
        }
        (_, DynamicValue::Complex(nested)) => encode_data(w, nested)?,
        _ => return Err(CodecError::UnsupportedKind(kind)),
    }
    Ok(())
}

/// Declared bit width of a bitmask (its bound) or bitset (last field end).
pub(crate) fn carrier_bits(ty: &DynamicType) -> u32 {
    match ty.get_kind() {
        TypeKind::TK_BITMASK => ty.get_bound().first().copied().unwrap_or(64),
        TypeKind::TK_BITSET => ty
            .members()
            .iter()
            .map(|m| m.get_id() + m.get_union_labels().first().copied().unwrap_or(1) as u32)
            .max()
            .unwrap_or(64),
        _ => 64,
    }
}

/// A discriminator value selecting the default case: the smallest value
/// not claimed by any explicit label.
pub(crate) fn default_case_label(ty: &DynamicType) -> u64 {
    let mut candidate = 0u64;
    let mut labels: Vec<u64> = ty
        .members()
        .iter()
        .flat_map(|m| m.get_union_labels().iter().copied())
        .collect();
    labels.sort_unstable();
    for label in labels {
        if label == candidate {
            candidate += 1;
        }
    }
    candidate
}

/// Write a discriminator value at its declared kind's width.
pub(crate) fn write_discriminator(w: &mut Writer, kind: TypeKind, label: u64) -> CodecResult<()> {
    match kind {
        TypeKind::TK_BOOLEAN | TypeKind::TK_BYTE | TypeKind::TK_UINT8 | TypeKind::TK_INT8
        | TypeKind::TK_CHAR8 => w.write_u8(label as u8),
        TypeKind::TK_UINT16 | TypeKind::TK_INT16 | TypeKind::TK_CHAR16 => {
            w.align(2);
            w.write_u16_le(label as u16);
        }
        TypeKind::TK_UINT32 | TypeKind::TK_INT32 | TypeKind::TK_ENUM => {
            w.align(4);
            w.write_u32_le(label as u32);
        }
        TypeKind::TK_UINT64 | TypeKind::TK_INT64 => {
            w.align(8);
            w.write_u64_le(label);
        }
        _ => return Err(CodecError::UnsupportedKind(kind)),
    }
    Ok(())
}

pub(crate) fn member_type(member: &DynamicTypeMember) -> CodecResult<DynamicType> {
    member
        .get_descriptor()
        .ty
        .map(|t| t.resolve_alias())
        .ok_or(CodecError::InvalidData {
            reason: "member without a type".into(),
        })
}

fn element_type(ty: &DynamicType) -> CodecResult<DynamicType> {
    ty.get_element_type()
        .map(|t| t.resolve_alias())
        .ok_or(CodecError::UnsupportedKind(ty.get_kind()))
}

fn slot_value(data: &DynamicData, id: crate::MemberId) -> CodecResult<&DynamicValue> {
    data.value_of(id).ok_or(CodecError::InvalidData {
        reason: "missing value slot".into(),
    })
}
