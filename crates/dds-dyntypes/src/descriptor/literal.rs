// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Literal validation for default values and annotation attributes.

use crate::kind::TypeKind;

/// Check that `text` is a valid literal for a member of the given kind.
///
/// Used by member/annotation consistency checks; the empty string is always
/// accepted as "no default declared".
pub fn literal_matches_kind(text: &str, kind: TypeKind) -> bool {
    if text.is_empty() {
        return true;
    }
    match kind {
        TypeKind::TK_BOOLEAN => matches!(text, "true" | "false" | "0" | "1"),
        TypeKind::TK_BYTE | TypeKind::TK_UINT8 => text.parse::<u8>().is_ok(),
        TypeKind::TK_UINT16 => text.parse::<u16>().is_ok(),
        TypeKind::TK_UINT32 => text.parse::<u32>().is_ok(),
        TypeKind::TK_UINT64 | TypeKind::TK_BITMASK => text.parse::<u64>().is_ok(),
        TypeKind::TK_INT8 => text.parse::<i8>().is_ok(),
        TypeKind::TK_INT16 => text.parse::<i16>().is_ok(),
        TypeKind::TK_INT32 => text.parse::<i32>().is_ok(),
        TypeKind::TK_INT64 => text.parse::<i64>().is_ok(),
        TypeKind::TK_FLOAT32 => text.parse::<f32>().is_ok(),
        TypeKind::TK_FLOAT64 | TypeKind::TK_FLOAT128 => text.parse::<f64>().is_ok(),
        TypeKind::TK_CHAR8 => text.chars().count() == 1,
        TypeKind::TK_CHAR16 => text.encode_utf16().count() == 1,
        TypeKind::TK_STRING8 | TypeKind::TK_STRING16 => true,
        // Enum defaults are literal names, validated against the members
        // once the owning type is known.
        TypeKind::TK_ENUM => !text.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_literals() {
        assert!(literal_matches_kind("true", TypeKind::TK_BOOLEAN));
        assert!(literal_matches_kind("0", TypeKind::TK_BOOLEAN));
        assert!(!literal_matches_kind("yes", TypeKind::TK_BOOLEAN));
    }

    #[test]
    fn test_numeric_literals() {
        assert!(literal_matches_kind("255", TypeKind::TK_UINT8));
        assert!(!literal_matches_kind("256", TypeKind::TK_UINT8));
        assert!(literal_matches_kind("-7", TypeKind::TK_INT32));
        assert!(!literal_matches_kind("-7", TypeKind::TK_UINT32));
        assert!(literal_matches_kind("2.5", TypeKind::TK_FLOAT64));
    }

    #[test]
    fn test_char_and_empty() {
        assert!(literal_matches_kind("x", TypeKind::TK_CHAR8));
        assert!(!literal_matches_kind("xy", TypeKind::TK_CHAR8));
        assert!(literal_matches_kind("", TypeKind::TK_INT32));
    }

    #[test]
    fn test_structural_kinds_reject() {
        assert!(!literal_matches_kind("x", TypeKind::TK_STRUCTURE));
        assert!(!literal_matches_kind("x", TypeKind::TK_SEQUENCE));
    }
}
