// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged per-member value storage.

use crate::data::DynamicData;
use crate::descriptor::literal_matches_kind;
use crate::kind::TypeKind;
use crate::types::DynamicType;

/// Byte width of an IEEE binary128 payload.
pub const FLOAT128_SIZE: usize = 16;

/// Closed variant over everything a member slot can hold.
///
/// Enum values are stored as `U32`, bitmask/bitset state as `U64`.
/// Aggregates and collections nest a whole [`DynamicData`] bound to the
/// member's type, so the container recursion mirrors the type recursion.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    /// binary128 carried as raw little-endian bytes.
    F128([u8; FLOAT128_SIZE]),
    Char8(char),
    Char16(u16),
    String(String),
    WString(String),
    Complex(Box<DynamicData>),
}

impl DynamicValue {
    /// The TypeKind this value satisfies. Complex values report their
    /// bound type's kind.
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Bool(_) => TypeKind::TK_BOOLEAN,
            Self::U8(_) => TypeKind::TK_BYTE,
            Self::U16(_) => TypeKind::TK_UINT16,
            Self::U32(_) => TypeKind::TK_UINT32,
            Self::U64(_) => TypeKind::TK_UINT64,
            Self::I8(_) => TypeKind::TK_INT8,
            Self::I16(_) => TypeKind::TK_INT16,
            Self::I32(_) => TypeKind::TK_INT32,
            Self::I64(_) => TypeKind::TK_INT64,
            Self::F32(_) => TypeKind::TK_FLOAT32,
            Self::F64(_) => TypeKind::TK_FLOAT64,
            Self::F128(_) => TypeKind::TK_FLOAT128,
            Self::Char8(_) => TypeKind::TK_CHAR8,
            Self::Char16(_) => TypeKind::TK_CHAR16,
            Self::String(_) => TypeKind::TK_STRING8,
            Self::WString(_) => TypeKind::TK_STRING16,
            Self::Complex(d) => d.get_type().resolved_kind(),
        }
    }

    pub fn as_complex(&self) -> Option<&DynamicData> {
        match self {
            Self::Complex(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_complex_mut(&mut self) -> Option<&mut DynamicData> {
        match self {
            Self::Complex(d) => Some(d),
            _ => None,
        }
    }

    /// The zero value for a resolved type, recursing into aggregates and
    /// leaving collections empty. Returns `None` for kinds that have no
    /// runtime value (e.g. `TK_NONE`).
    pub fn default_for(ty: &DynamicType) -> Option<Self> {
        let resolved = ty.resolve_alias();
        let value = match resolved.get_kind() {
            TypeKind::TK_BOOLEAN => Self::Bool(false),
            TypeKind::TK_BYTE | TypeKind::TK_UINT8 => Self::U8(0),
            TypeKind::TK_UINT16 => Self::U16(0),
            TypeKind::TK_UINT32 => Self::U32(0),
            TypeKind::TK_UINT64 => Self::U64(0),
            TypeKind::TK_INT8 => Self::I8(0),
            TypeKind::TK_INT16 => Self::I16(0),
            TypeKind::TK_INT32 => Self::I32(0),
            TypeKind::TK_INT64 => Self::I64(0),
            TypeKind::TK_FLOAT32 => Self::F32(0.0),
            TypeKind::TK_FLOAT64 => Self::F64(0.0),
            TypeKind::TK_FLOAT128 => Self::F128([0u8; FLOAT128_SIZE]),
            TypeKind::TK_CHAR8 => Self::Char8('\0'),
            TypeKind::TK_CHAR16 => Self::Char16(0),
            TypeKind::TK_STRING8 => Self::String(String::new()),
            TypeKind::TK_STRING16 => Self::WString(String::new()),
            TypeKind::TK_ENUM => Self::U32(0),
            TypeKind::TK_BITMASK | TypeKind::TK_BITSET => Self::U64(0),
            TypeKind::TK_STRUCTURE
            | TypeKind::TK_UNION
            | TypeKind::TK_ANNOTATION
            | TypeKind::TK_SEQUENCE
            | TypeKind::TK_ARRAY
            | TypeKind::TK_MAP => Self::Complex(Box::new(DynamicData::new(&resolved)?)),
            TypeKind::TK_NONE | TypeKind::TK_ALIAS => return None,
        };
        Some(value)
    }

    /// Parse a descriptor default-value literal for the given type. An
    /// empty or unparseable literal falls back to [`default_for`].
    ///
    /// [`default_for`]: Self::default_for
    pub fn from_literal(ty: &DynamicType, literal: &str) -> Option<Self> {
        let resolved = ty.resolve_alias();
        let kind = resolved.get_kind();
        if literal.is_empty() || !literal_matches_kind(literal, kind) {
            return Self::default_for(ty);
        }
        let value = match kind {
            TypeKind::TK_BOOLEAN => Self::Bool(literal == "true" || literal == "1"),
            TypeKind::TK_BYTE | TypeKind::TK_UINT8 => Self::U8(literal.parse().ok()?),
            TypeKind::TK_UINT16 => Self::U16(literal.parse().ok()?),
            TypeKind::TK_UINT32 => Self::U32(literal.parse().ok()?),
            TypeKind::TK_UINT64 => Self::U64(literal.parse().ok()?),
            TypeKind::TK_INT8 => Self::I8(literal.parse().ok()?),
            TypeKind::TK_INT16 => Self::I16(literal.parse().ok()?),
            TypeKind::TK_INT32 => Self::I32(literal.parse().ok()?),
            TypeKind::TK_INT64 => Self::I64(literal.parse().ok()?),
            TypeKind::TK_FLOAT32 => Self::F32(literal.parse().ok()?),
            TypeKind::TK_FLOAT64 => Self::F64(literal.parse().ok()?),
            TypeKind::TK_CHAR8 => Self::Char8(literal.chars().next()?),
            TypeKind::TK_CHAR16 => Self::Char16(literal.chars().next()? as u16),
            TypeKind::TK_STRING8 => Self::String(literal.to_string()),
            TypeKind::TK_STRING16 => Self::WString(literal.to_string()),
            TypeKind::TK_ENUM => {
                // Literal names the enum constant.
                let id = resolved
                    .get_member_by_name(literal)
                    .map(|m| m.get_id())
                    .ok()?;
                Self::U32(id)
            }
            _ => return Self::default_for(ty),
        };
        Some(value)
    }
}
