// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sample decoding.

use crate::codec::cursor::Reader;
use crate::codec::encode::{carrier_bits, member_type, EMHEADER_ID_MASK};
use crate::codec::{CodecError, CodecResult};
use crate::data::{DynamicData, DynamicValue};
use crate::descriptor::Extensibility;
use crate::kind::TypeKind;
use crate::types::DynamicType;

/// Rebuild a sample of `ty` from its encoded form.
pub fn deserialize(bytes: &[u8], ty: &DynamicType) -> CodecResult<DynamicData> {
    let mut r = Reader::new(bytes);
    decode_data(&mut r, ty)
}

pub(crate) fn decode_data(r: &mut Reader<'_>, ty: &DynamicType) -> CodecResult<DynamicData> {
    let resolved = ty.resolve_alias();
    let mut data = DynamicData::new(&resolved).ok_or(CodecError::InvalidData {
        reason: "type cannot hold data".into(),
    })?;
    match resolved.get_kind() {
        TypeKind::TK_STRUCTURE | TypeKind::TK_ANNOTATION => match resolved.get_extensibility() {
            Extensibility::Final => decode_members_typeless(r, &resolved, &mut data)?,
            Extensibility::Appendable => {
                r.align(4)?;
                let dheader = r.read_u32_le()? as usize;
                let end = r.offset() + dheader;
                decode_members_typeless(r, &resolved, &mut data)?;
                // Skip members appended by a newer writer.
                if r.offset() < end {
                    r.skip(end - r.offset())?;
                }
            }
            Extensibility::Mutable => decode_members_identified(r, &resolved, &mut data)?,
        },
        TypeKind::TK_UNION => decode_union(r, &resolved, &mut data)?,
        TypeKind::TK_SEQUENCE => {
            let element_ty = element_type(&resolved)?;
            r.align(4)?;
            let count = r.read_u32_le()?;
            for i in 0..count {
                let value = decode_slot(r, &element_ty)?;
                data.set_raw(i, value);
            }
        }
        TypeKind::TK_ARRAY => {
            let element_ty = element_type(&resolved)?;
            for i in 0..resolved.get_total_bound() as u32 {
                let value = decode_slot(r, &element_ty)?;
                data.set_raw(i, value);
            }
        }
        TypeKind::TK_MAP => {
            let element_ty = element_type(&resolved)?;
            let key_ty = resolved
                .get_key_element_type()
                .map(|t| t.resolve_alias())
                .ok_or(CodecError::UnsupportedKind(TypeKind::TK_MAP))?;
            r.align(4)?;
            let count = r.read_u32_le()?;
            for i in 0..count {
                let key = decode_slot(r, &key_ty)?;
                let value = decode_slot(r, &element_ty)?;
                data.set_raw_map_key(i, key);
                data.set_raw(i, value);
            }
        }
        _ => {
            let value = decode_slot(r, &resolved)?;
            data.set_raw(0, value);
        }
    }
    Ok(data)
}

fn decode_members_typeless(
    r: &mut Reader<'_>,
    ty: &DynamicType,
    data: &mut DynamicData,
) -> CodecResult<()> {
    for member in ty.members() {
        let member_ty = member_type(member)?;
        let value = decode_slot(r, &member_ty)?;
        data.set_raw(member.get_id(), value);
    }
    Ok(())
}

/// Walk EMHEADERs until the DHEADER extent is consumed, skipping member
/// ids this type does not know.
fn decode_members_identified(
    r: &mut Reader<'_>,
    ty: &DynamicType,
    data: &mut DynamicData,
) -> CodecResult<()> {
    r.align(4)?;
    let dheader = r.read_u32_le()? as usize;
    let end = r.offset() + dheader;
    while r.offset() < end {
        r.align(4)?;
        if r.offset() >= end {
            break;
        }
        let emheader = r.read_u32_le()?;
        let id = emheader & EMHEADER_ID_MASK;
        let lc = emheader >> 28;
        // LC 0-3 encode the length directly; 4+ read it from NEXTINT.
        let len = match lc {
            0..=3 => 1usize << lc,
            _ => r.read_u32_le()? as usize,
        };
        let payload = r.read_bytes(len)?;
        match ty.get_member(id) {
            Ok(member) => {
                let member_ty = member_type(&member)?;
                let mut sub = Reader::new(payload);
                let value = decode_slot(&mut sub, &member_ty)?;
                data.set_raw(id, value);
            }
            // Unknown member from a newer writer.
            Err(_) => continue,
        }
    }
    Ok(())
}

fn decode_union(r: &mut Reader<'_>, ty: &DynamicType, data: &mut DynamicData) -> CodecResult<()> {
    let disc_kind = ty
        .get_discriminator_type()
        .map(|t| t.resolved_kind())
        .ok_or(CodecError::UnsupportedKind(TypeKind::TK_UNION))?;
    let label = read_discriminator(r, disc_kind)?;
    let member = ty
        .members()
        .iter()
        .find(|m| m.get_union_labels().contains(&label))
        .or_else(|| ty.members().iter().find(|m| m.is_default_union_member()))
        .ok_or(CodecError::InvalidData {
            reason: "discriminator matches no union case".into(),
        })?;
    let member_ty = member_type(member)?;
    let value = decode_slot(r, &member_ty)?;
    data.set_raw(member.get_id(), value);
    data.set_active_union_id(member.get_id());
    data.set_raw_union_label(label);
    Ok(())
}

/// One value at its type's wire shape.
pub(crate) fn decode_slot(r: &mut Reader<'_>, ty: &DynamicType) -> CodecResult<DynamicValue> {
    let resolved = ty.resolve_alias();
    let kind = resolved.get_kind();
    let value = match kind {
        TypeKind::TK_BOOLEAN => DynamicValue::Bool(r.read_u8()? != 0),
        TypeKind::TK_BYTE | TypeKind::TK_UINT8 => DynamicValue::U8(r.read_u8()?),
        TypeKind::TK_UINT16 => {
            r.align(2)?;
            DynamicValue::U16(r.read_u16_le()?)
        }
        TypeKind::TK_UINT32 => {
            r.align(4)?;
            DynamicValue::U32(r.read_u32_le()?)
        }
        TypeKind::TK_UINT64 => {
            r.align(8)?;
            DynamicValue::U64(r.read_u64_le()?)
        }
        TypeKind::TK_INT8 => DynamicValue::I8(r.read_i8()?),
        TypeKind::TK_INT16 => {
            r.align(2)?;
            DynamicValue::I16(r.read_i16_le()?)
        }
        TypeKind::TK_INT32 => {
            r.align(4)?;
            DynamicValue::I32(r.read_i32_le()?)
        }
        TypeKind::TK_INT64 => {
            r.align(8)?;
            DynamicValue::I64(r.read_i64_le()?)
        }
        TypeKind::TK_FLOAT32 => {
            r.align(4)?;
            DynamicValue::F32(r.read_f32_le()?)
        }
        TypeKind::TK_FLOAT64 => {
            r.align(8)?;
            DynamicValue::F64(r.read_f64_le()?)
        }
        TypeKind::TK_FLOAT128 => {
            r.align(16)?;
            let mut raw = [0u8; 16];
            raw.copy_from_slice(r.read_bytes(16)?);
            DynamicValue::F128(raw)
        }
        TypeKind::TK_CHAR8 => DynamicValue::Char8(r.read_u8()? as char),
        TypeKind::TK_CHAR16 => {
            r.align(2)?;
            DynamicValue::Char16(r.read_u16_le()?)
        }
        TypeKind::TK_STRING8 => {
            r.align(4)?;
            let len = r.read_u32_le()? as usize;
            if len == 0 {
                return Err(CodecError::InvalidData {
                    reason: "string length must include the terminator".into(),
                });
            }
            let raw = r.read_bytes(len)?;
            let text = std::str::from_utf8(&raw[..len - 1]).map_err(|_| {
                CodecError::InvalidData {
                    reason: "string payload is not UTF-8".into(),
                }
            })?;
            DynamicValue::String(text.to_string())
        }
        TypeKind::TK_STRING16 => {
            r.align(4)?;
            let count = r.read_u32_le()? as usize;
            let mut units = Vec::with_capacity(count);
            for _ in 0..count {
                units.push(r.read_u16_le()?);
            }
            let text = String::from_utf16(&units).map_err(|_| CodecError::InvalidData {
                reason: "wide string payload is not UTF-16".into(),
            })?;
            DynamicValue::WString(text)
        }
        TypeKind::TK_ENUM => {
            r.align(4)?;
            let value = r.read_u32_le()?;
            if resolved.get_member(value).is_err() {
                return Err(CodecError::InvalidData {
                    reason: "enum value names no literal".into(),
                });
            }
            DynamicValue::U32(value)
        }
        TypeKind::TK_BITMASK | TypeKind::TK_BITSET => {
            let word = match carrier_bits(&resolved) {
                0..=8 => u64::from(r.read_u8()?),
                9..=16 => {
                    r.align(2)?;
                    u64::from(r.read_u16_le()?)
                }
                17..=32 => {
                    r.align(4)?;
                    u64::from(r.read_u32_le()?)
                }
                _ => {
                    r.align(8)?;
                    r.read_u64_le()?
                }
            };
            DynamicValue::U64(word)
        }
        TypeKind::TK_STRUCTURE
        | TypeKind::TK_UNION
        | TypeKind::TK_ANNOTATION
        | TypeKind::TK_SEQUENCE
        | TypeKind::TK_ARRAY
        | TypeKind::TK_MAP => DynamicValue::Complex(Box::new(decode_data(r, &resolved)?)),
        TypeKind::TK_NONE | TypeKind::TK_ALIAS => {
            return Err(CodecError::UnsupportedKind(kind))
        }
    };
    Ok(value)
}

fn read_discriminator(r: &mut Reader<'_>, kind: TypeKind) -> CodecResult<u64> {
    let label = match kind {
        TypeKind::TK_BOOLEAN | TypeKind::TK_BYTE | TypeKind::TK_UINT8 | TypeKind::TK_INT8
        | TypeKind::TK_CHAR8 => u64::from(r.read_u8()?),
        TypeKind::TK_UINT16 | TypeKind::TK_INT16 | TypeKind::TK_CHAR16 => {
            r.align(2)?;
            u64::from(r.read_u16_le()?)
        }
        TypeKind::TK_UINT32 | TypeKind::TK_INT32 | TypeKind::TK_ENUM => {
            r.align(4)?;
            u64::from(r.read_u32_le()?)
        }
        TypeKind::TK_UINT64 | TypeKind::TK_INT64 => {
            r.align(8)?;
            r.read_u64_le()?
        }
        _ => return Err(CodecError::UnsupportedKind(kind)),
    };
    Ok(label)
}

fn element_type(ty: &DynamicType) -> CodecResult<DynamicType> {
    ty.get_element_type()
        .map(|t| t.resolve_alias())
        .ok_or(CodecError::UnsupportedKind(ty.get_kind()))
}
