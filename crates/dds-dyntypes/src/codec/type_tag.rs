// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compact type identifiers.
//!
//! Strings, sequences, arrays and maps get a one-byte tag with distinct
//! "small" (u8 bounds, everything below 256) and "large" (u32 bounds)
//! variants. Primitives and nominal kinds (enums, aggregates) are
//! identified by their raw kind byte. These bytes are interchange format;
//! they must not change between releases.

use crate::codec::cursor::Writer;
use crate::codec::{CodecError, CodecResult};
use crate::kind::TypeKind;
use crate::types::DynamicType;

pub const TI_STRING8_SMALL: u8 = 0x70;
pub const TI_STRING8_LARGE: u8 = 0x71;
pub const TI_STRING16_SMALL: u8 = 0x72;
pub const TI_STRING16_LARGE: u8 = 0x73;
pub const TI_PLAIN_SEQUENCE_SMALL: u8 = 0x80;
pub const TI_PLAIN_SEQUENCE_LARGE: u8 = 0x81;
pub const TI_PLAIN_ARRAY_SMALL: u8 = 0x90;
pub const TI_PLAIN_ARRAY_LARGE: u8 = 0x91;
pub const TI_PLAIN_MAP_SMALL: u8 = 0xA0;
pub const TI_PLAIN_MAP_LARGE: u8 = 0xA1;

/// Bounds up to this value use the small (u8) form.
const SMALL_BOUND_MAX: u32 = 255;

/// The compact identifier of a type, as raw bytes.
pub fn type_tag(ty: &DynamicType) -> CodecResult<Vec<u8>> {
    let mut w = Writer::new();
    encode_type_tag(&mut w, ty)?;
    Ok(w.into_vec())
}

/// Append a type's compact identifier.
///
/// Collection identifiers nest their element (and map key) identifiers,
/// so the whole shape of a plain collection is spelled out; nominal kinds
/// stop at the kind byte.
pub fn encode_type_tag(w: &mut Writer, ty: &DynamicType) -> CodecResult<()> {
    let resolved = ty.resolve_alias();
    let kind = resolved.get_kind();
    match kind {
        TypeKind::TK_STRING8 | TypeKind::TK_STRING16 => {
            let bound = resolved.get_bound().first().copied().unwrap_or(0);
            let (small, large) = if kind == TypeKind::TK_STRING8 {
                (TI_STRING8_SMALL, TI_STRING8_LARGE)
            } else {
                (TI_STRING16_SMALL, TI_STRING16_LARGE)
            };
            write_tagged_bound(w, small, large, bound);
        }
        TypeKind::TK_SEQUENCE => {
            let bound = resolved.get_bound().first().copied().unwrap_or(0);
            write_tagged_bound(w, TI_PLAIN_SEQUENCE_SMALL, TI_PLAIN_SEQUENCE_LARGE, bound);
            encode_type_tag(w, &element_of(&resolved)?)?;
        }
        TypeKind::TK_ARRAY => {
            let bounds = resolved.get_bound();
            if bounds.iter().all(|b| *b <= SMALL_BOUND_MAX) {
                w.write_u8(TI_PLAIN_ARRAY_SMALL);
                w.write_u8(bounds.len() as u8);
                for b in bounds {
                    w.write_u8(*b as u8);
                }
            } else {
                w.write_u8(TI_PLAIN_ARRAY_LARGE);
                w.write_u8(bounds.len() as u8);
                for b in bounds {
                    w.write_u32_le(*b);
                }
            }
            encode_type_tag(w, &element_of(&resolved)?)?;
        }
        TypeKind::TK_MAP => {
            let bound = resolved.get_bound().first().copied().unwrap_or(0);
            write_tagged_bound(w, TI_PLAIN_MAP_SMALL, TI_PLAIN_MAP_LARGE, bound);
            let key = resolved
                .get_key_element_type()
                .ok_or(CodecError::UnsupportedKind(TypeKind::TK_MAP))?;
            encode_type_tag(w, &key)?;
            encode_type_tag(w, &element_of(&resolved)?)?;
        }
        TypeKind::TK_NONE | TypeKind::TK_ALIAS => {
            return Err(CodecError::UnsupportedKind(kind));
        }
        // Primitives and nominal kinds are their kind byte.
        _ => w.write_u8(kind.to_u8()),
    }
    Ok(())
}

fn write_tagged_bound(w: &mut Writer, small: u8, large: u8, bound: u32) {
    if bound <= SMALL_BOUND_MAX {
        w.write_u8(small);
        w.write_u8(bound as u8);
    } else {
        w.write_u8(large);
        w.write_u32_le(bound);
    }
}

fn element_of(ty: &DynamicType) -> CodecResult<DynamicType> {
    ty.get_element_type()
        .ok_or(CodecError::UnsupportedKind(ty.get_kind()))
}
