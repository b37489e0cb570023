// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeKind - the closed tag identifying a type's category.
//!
//! Values follow the OMG DDS-XTypes v1.3 TypeKind table so that compact
//! type tags and discriminators can be reproduced bit-exactly on the wire.

/// Closed enumeration of type categories.
///
/// The numeric values are wire-visible (compact type tags, TypeObject
/// discriminators) and must not be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(non_camel_case_types)]
pub enum TypeKind {
    /// No type (invalid marker).
    TK_NONE = 0x00,
    TK_BOOLEAN = 0x01,
    TK_BYTE = 0x02,
    TK_INT16 = 0x03,
    TK_INT32 = 0x04,
    TK_INT64 = 0x05,
    TK_UINT16 = 0x06,
    TK_UINT32 = 0x07,
    TK_UINT64 = 0x08,
    TK_FLOAT32 = 0x09,
    TK_FLOAT64 = 0x0A,
    /// 128-bit IEEE floating point, carried as raw bytes.
    TK_FLOAT128 = 0x0B,
    TK_INT8 = 0x0C,
    TK_UINT8 = 0x0D,
    TK_CHAR8 = 0x10,
    /// Wide character (UTF-16 code unit).
    TK_CHAR16 = 0x11,
    TK_STRING8 = 0x20,
    TK_STRING16 = 0x21,
    /// Type alias (typedef); resolves through `base_type`.
    TK_ALIAS = 0x30,
    TK_ENUM = 0x31,
    TK_BITMASK = 0x32,
    /// Annotation type (IDL 4.2); its members declare the attributes.
    TK_ANNOTATION = 0x33,
    TK_STRUCTURE = 0x40,
    TK_UNION = 0x41,
    TK_BITSET = 0x42,
    TK_SEQUENCE = 0x50,
    TK_ARRAY = 0x51,
    TK_MAP = 0x52,
}

impl TypeKind {
    /// True for fixed-size scalar kinds (everything below the string kinds).
    pub const fn is_primitive(self) -> bool {
        matches!(
            self,
            TypeKind::TK_BOOLEAN
                | TypeKind::TK_BYTE
                | TypeKind::TK_INT8
                | TypeKind::TK_INT16
                | TypeKind::TK_INT32
                | TypeKind::TK_INT64
                | TypeKind::TK_UINT8
                | TypeKind::TK_UINT16
                | TypeKind::TK_UINT32
                | TypeKind::TK_UINT64
                | TypeKind::TK_FLOAT32
                | TypeKind::TK_FLOAT64
                | TypeKind::TK_FLOAT128
                | TypeKind::TK_CHAR8
                | TypeKind::TK_CHAR16
        )
    }

    pub const fn is_string(self) -> bool {
        matches!(self, TypeKind::TK_STRING8 | TypeKind::TK_STRING16)
    }

    pub const fn is_collection(self) -> bool {
        matches!(
            self,
            TypeKind::TK_SEQUENCE | TypeKind::TK_ARRAY | TypeKind::TK_MAP
        )
    }

    /// Aggregate kinds carry named, id-addressed members.
    pub const fn is_aggregate(self) -> bool {
        matches!(
            self,
            TypeKind::TK_STRUCTURE
                | TypeKind::TK_UNION
                | TypeKind::TK_BITSET
                | TypeKind::TK_ANNOTATION
        )
    }

    /// Kinds whose instances contain child values (members or elements).
    pub const fn has_children(self) -> bool {
        self.is_aggregate() || self.is_collection()
    }

    /// Kinds legal as a union discriminator (after alias resolution).
    pub const fn is_discriminator(self) -> bool {
        matches!(
            self,
            TypeKind::TK_BOOLEAN
                | TypeKind::TK_BYTE
                | TypeKind::TK_INT8
                | TypeKind::TK_INT16
                | TypeKind::TK_INT32
                | TypeKind::TK_INT64
                | TypeKind::TK_UINT8
                | TypeKind::TK_UINT16
                | TypeKind::TK_UINT32
                | TypeKind::TK_UINT64
                | TypeKind::TK_CHAR8
                | TypeKind::TK_CHAR16
                | TypeKind::TK_ENUM
        )
    }

    /// Size in bytes for primitive kinds, None otherwise.
    pub const fn primitive_size(self) -> Option<usize> {
        match self {
            TypeKind::TK_BOOLEAN
            | TypeKind::TK_BYTE
            | TypeKind::TK_INT8
            | TypeKind::TK_UINT8
            | TypeKind::TK_CHAR8 => Some(1),
            TypeKind::TK_INT16 | TypeKind::TK_UINT16 | TypeKind::TK_CHAR16 => Some(2),
            TypeKind::TK_INT32 | TypeKind::TK_UINT32 | TypeKind::TK_FLOAT32 => Some(4),
            TypeKind::TK_INT64 | TypeKind::TK_UINT64 | TypeKind::TK_FLOAT64 => Some(8),
            TypeKind::TK_FLOAT128 => Some(16),
            _ => None,
        }
    }

    /// CDR natural alignment of the first primitive this kind encodes.
    ///
    /// Strings, enums, sequences and maps start with a u32 length or literal;
    /// bitmasks default to their widest carrier.
    pub const fn cdr_alignment(self) -> usize {
        match self {
            TypeKind::TK_BOOLEAN
            | TypeKind::TK_BYTE
            | TypeKind::TK_INT8
            | TypeKind::TK_UINT8
            | TypeKind::TK_CHAR8 => 1,
            TypeKind::TK_INT16 | TypeKind::TK_UINT16 | TypeKind::TK_CHAR16 => 2,
            TypeKind::TK_INT32
            | TypeKind::TK_UINT32
            | TypeKind::TK_FLOAT32
            | TypeKind::TK_STRING8
            | TypeKind::TK_STRING16
            | TypeKind::TK_ENUM
            | TypeKind::TK_SEQUENCE
            | TypeKind::TK_MAP => 4,
            TypeKind::TK_INT64 | TypeKind::TK_UINT64 | TypeKind::TK_FLOAT64 => 8,
            TypeKind::TK_FLOAT128 => 16,
            // Aggregates/arrays/aliases align on their first member/element;
            // callers resolve those recursively.
            _ => 1,
        }
    }

    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(TypeKind::TK_NONE),
            0x01 => Some(TypeKind::TK_BOOLEAN),
            0x02 => Some(TypeKind::TK_BYTE),
            0x03 => Some(TypeKind::TK_INT16),
            0x04 => Some(TypeKind::TK_INT32),
            0x05 => Some(TypeKind::TK_INT64),
            0x06 => Some(TypeKind::TK_UINT16),
            0x07 => Some(TypeKind::TK_UINT32),
            0x08 => Some(TypeKind::TK_UINT64),
            0x09 => Some(TypeKind::TK_FLOAT32),
            0x0A => Some(TypeKind::TK_FLOAT64),
            0x0B => Some(TypeKind::TK_FLOAT128),
            0x0C => Some(TypeKind::TK_INT8),
            0x0D => Some(TypeKind::TK_UINT8),
            0x10 => Some(TypeKind::TK_CHAR8),
            0x11 => Some(TypeKind::TK_CHAR16),
            0x20 => Some(TypeKind::TK_STRING8),
            0x21 => Some(TypeKind::TK_STRING16),
            0x30 => Some(TypeKind::TK_ALIAS),
            0x31 => Some(TypeKind::TK_ENUM),
            0x32 => Some(TypeKind::TK_BITMASK),
            0x33 => Some(TypeKind::TK_ANNOTATION),
            0x40 => Some(TypeKind::TK_STRUCTURE),
            0x41 => Some(TypeKind::TK_UNION),
            0x42 => Some(TypeKind::TK_BITSET),
            0x50 => Some(TypeKind::TK_SEQUENCE),
            0x51 => Some(TypeKind::TK_ARRAY),
            0x52 => Some(TypeKind::TK_MAP),
            _ => None,
        }
    }
}
