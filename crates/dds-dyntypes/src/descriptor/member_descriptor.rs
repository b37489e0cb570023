// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! MemberDescriptor - blueprint of one member of an aggregate type.

use crate::descriptor::{is_valid_name, literal_matches_kind};
use crate::error::{DdsResult, ReturnCode};
use crate::kind::TypeKind;
use crate::types::DynamicType;
use crate::{MemberId, MEMBER_ID_INVALID};

/// Blueprint of one member: id, name, declared type, default value, union
/// case labels and derived flags.
///
/// Consistency is parent-kind-dependent: enum/bitmask members are positional
/// literal entries, union members must carry labels or the default flag.
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    pub id: MemberId,
    pub name: String,
    pub ty: Option<DynamicType>,
    /// Default value as a string literal; empty = none declared.
    pub default_value: String,
    /// Declaration order within the owner.
    pub index: u32,
    /// Union case labels; mutually exclusive with `is_default_union_value`.
    pub labels: Vec<u64>,
    pub is_default_union_value: bool,
    /// Derived from `@key`.
    pub is_key: bool,
    /// Derived from `@optional`.
    pub is_optional: bool,
    /// Whether a bound DynamicData member has been explicitly assigned.
    pub is_set: bool,
}

impl Default for MemberDescriptor {
    fn default() -> Self {
        Self {
            id: MEMBER_ID_INVALID,
            name: String::new(),
            ty: None,
            default_value: String::new(),
            index: 0,
            labels: Vec::new(),
            is_default_union_value: false,
            is_key: false,
            is_optional: false,
            is_set: false,
        }
    }
}

impl MemberDescriptor {
    pub fn new(id: MemberId, name: impl Into<String>, ty: DynamicType) -> Self {
        Self {
            id,
            name: name.into(),
            ty: Some(ty),
            ..Self::default()
        }
    }

    /// Overwrite this descriptor with a field-by-field copy of `other`.
    pub fn copy_from(&mut self, other: Option<&MemberDescriptor>) -> DdsResult<()> {
        let src = other.ok_or(ReturnCode::BadParameter)?;
        *self = src.clone();
        Ok(())
    }

    /// Structural comparison; types compare by deep equality.
    pub fn equals(&self, other: &MemberDescriptor) -> bool {
        let ty_eq = match (&self.ty, &other.ty) {
            (None, None) => true,
            (Some(a), Some(b)) => a.equals(b),
            _ => false,
        };
        ty_eq
            && self.id == other.id
            && self.name == other.name
            && self.default_value == other.default_value
            && self.index == other.index
            && self.labels == other.labels
            && self.is_default_union_value == other.is_default_union_value
            && self.is_key == other.is_key
            && self.is_optional == other.is_optional
    }

    /// Validate against the owning type's kind.
    pub fn is_consistent(&self, parent_kind: TypeKind) -> bool {
        match parent_kind {
            TypeKind::TK_ENUM => {
                // Positional literal: name only, no declared type or labels.
                is_valid_name(&self.name) && self.labels.is_empty() && !self.is_default_union_value
            }
            TypeKind::TK_BITMASK => {
                // Positional flag: id is the bit position.
                is_valid_name(&self.name) && self.id < 64 && self.labels.is_empty()
            }
            TypeKind::TK_BITSET => {
                // Field width rides in a single label; id is the bit position.
                is_valid_name(&self.name)
                    && self.id < 64
                    && self.labels.len() == 1
                    && self.labels[0] >= 1
                    && u64::from(self.id) + self.labels[0] <= 64
            }
            TypeKind::TK_UNION => {
                self.common_consistent()
                    // Exactly one of: >= 1 label, or the default flag.
                    && (self.is_default_union_value != !self.labels.is_empty())
            }
            TypeKind::TK_STRUCTURE | TypeKind::TK_ANNOTATION => {
                self.common_consistent()
                    && self.labels.is_empty()
                    && !self.is_default_union_value
            }
            _ => false,
        }
    }

    /// Kind of the declared type after alias resolution.
    pub fn resolved_kind(&self) -> TypeKind {
        self.ty
            .as_ref()
            .map_or(TypeKind::TK_NONE, DynamicType::resolved_kind)
    }

    fn common_consistent(&self) -> bool {
        let Some(ty) = &self.ty else {
            return false;
        };
        self.id != MEMBER_ID_INVALID
            && is_valid_name(&self.name)
            && literal_matches_kind(&self.default_value, ty.resolved_kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::DynamicTypeBuilderFactory;

    fn int32() -> DynamicType {
        DynamicTypeBuilderFactory::get_instance()
            .get_primitive_type(TypeKind::TK_INT32)
            .expect("primitive")
    }

    #[test]
    fn test_struct_member_consistency() {
        let m = MemberDescriptor::new(0, "x", int32());
        assert!(m.is_consistent(TypeKind::TK_STRUCTURE));
        assert!(!m.is_consistent(TypeKind::TK_SEQUENCE));
    }

    #[test]
    fn test_union_member_needs_labels_or_default() {
        let mut m = MemberDescriptor::new(1, "a", int32());
        assert!(!m.is_consistent(TypeKind::TK_UNION));

        m.labels = vec![3];
        assert!(m.is_consistent(TypeKind::TK_UNION));

        m.is_default_union_value = true;
        assert!(!m.is_consistent(TypeKind::TK_UNION));

        m.labels.clear();
        assert!(m.is_consistent(TypeKind::TK_UNION));
    }

    #[test]
    fn test_enum_literal_is_positional() {
        let m = MemberDescriptor {
            name: "RED".into(),
            id: 0,
            ..MemberDescriptor::default()
        };
        assert!(m.is_consistent(TypeKind::TK_ENUM));
    }

    #[test]
    fn test_bitmask_position_cap() {
        let mut m = MemberDescriptor {
            name: "FLAG".into(),
            id: 63,
            ..MemberDescriptor::default()
        };
        assert!(m.is_consistent(TypeKind::TK_BITMASK));
        m.id = 64;
        assert!(!m.is_consistent(TypeKind::TK_BITMASK));
    }

    #[test]
    fn test_default_value_must_match_kind() {
        let mut m = MemberDescriptor::new(0, "x", int32());
        m.default_value = "12".into();
        assert!(m.is_consistent(TypeKind::TK_STRUCTURE));
        m.default_value = "not a number".into();
        assert!(!m.is_consistent(TypeKind::TK_STRUCTURE));
    }

    #[test]
    fn test_copy_from_null_source() {
        let mut m = MemberDescriptor::new(0, "x", int32());
        assert_eq!(m.copy_from(None), Err(ReturnCode::BadParameter));
        assert_eq!(m.name, "x");
    }
}
