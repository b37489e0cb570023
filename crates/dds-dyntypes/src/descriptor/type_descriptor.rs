// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeDescriptor - the blueprint a DynamicType is built from.

use crate::descriptor::{is_valid_name, AnnotationDescriptor};
use crate::error::{DdsResult, ReturnCode};
use crate::kind::TypeKind;
use crate::types::DynamicType;

/// Aggregate member encoding mode.
///
/// Final and Appendable aggregates encode members typelessly in declaration
/// order; Mutable aggregates prefix each member with an identified header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Extensibility {
    #[default]
    Final,
    Appendable,
    Mutable,
}

/// Blueprint of a type: kind, qualified name and cross-references.
///
/// A descriptor is consistent only if every cross-reference below matches
/// its kind's requirement exactly (see [`TypeDescriptor::is_consistent`]).
#[derive(Debug, Clone, Default)]
pub struct TypeDescriptor {
    pub kind: Option<TypeKind>,
    /// Qualified name (`::`-separated), required for nominal kinds.
    pub name: String,
    /// Structure supertype or alias target; only legal for those kinds.
    pub base_type: Option<DynamicType>,
    /// Union only; must resolve to an integral/enum kind.
    pub discriminator_type: Option<DynamicType>,
    /// Collection payload (array/sequence/string/map/bitmask).
    pub element_type: Option<DynamicType>,
    /// Map key type; map only.
    pub key_element_type: Option<DynamicType>,
    /// Per-dimension bounds for arrays; single bound for bounded
    /// string/sequence/map/bitmask. 0 = unbounded.
    pub bound: Vec<u32>,
    pub extensibility: Extensibility,
    pub annotations: Vec<AnnotationDescriptor>,
}

impl TypeDescriptor {
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.kind.unwrap_or(TypeKind::TK_NONE)
    }

    /// Overwrite this descriptor with a field-by-field copy of `other`.
    pub fn copy_from(&mut self, other: Option<&TypeDescriptor>) -> DdsResult<()> {
        let src = other.ok_or(ReturnCode::BadParameter)?;
        *self = src.clone();
        Ok(())
    }

    /// Structural, field-by-field comparison.
    pub fn equals(&self, other: &TypeDescriptor) -> bool {
        fn ty_eq(a: &Option<DynamicType>, b: &Option<DynamicType>) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => a.equals(b),
                _ => false,
            }
        }
        self.kind == other.kind
            && self.name == other.name
            && ty_eq(&self.base_type, &other.base_type)
            && ty_eq(&self.discriminator_type, &other.discriminator_type)
            && ty_eq(&self.element_type, &other.element_type)
            && ty_eq(&self.key_element_type, &other.key_element_type)
            && self.bound == other.bound
            && self.extensibility == other.extensibility
            && self.annotations.len() == other.annotations.len()
            && self
                .annotations
                .iter()
                .zip(other.annotations.iter())
                .all(|(a, b)| a.equals(b))
    }

    /// Validate every kind-dependent cross-reference.
    pub fn is_consistent(&self) -> bool {
        let Some(kind) = self.kind else {
            return false;
        };
        if !self.name_consistent(kind) {
            return false;
        }
        if !self.annotations.iter().all(AnnotationDescriptor::is_consistent) {
            return false;
        }
        match kind {
            k if k.is_primitive() => self.refs_none() && self.bound.is_empty(),
            TypeKind::TK_STRING8 => {
                self.string_payload_is(TypeKind::TK_CHAR8) && self.single_bound_or_none()
            }
            TypeKind::TK_STRING16 => {
                self.string_payload_is(TypeKind::TK_CHAR16) && self.single_bound_or_none()
            }
            TypeKind::TK_ALIAS => {
                self.base_type.is_some()
                    && self.discriminator_type.is_none()
                    && self.element_type.is_none()
                    && self.key_element_type.is_none()
                    && self.bound.is_empty()
            }
            TypeKind::TK_ENUM | TypeKind::TK_ANNOTATION => {
                self.refs_none() && self.bound.is_empty()
            }
            TypeKind::TK_BITMASK => {
                self.element_kind() == Some(TypeKind::TK_BOOLEAN)
                    && self.bound.len() == 1
                    && (1..=64).contains(&self.bound[0])
                    && self.discriminator_type.is_none()
                    && self.base_type.is_none()
                    && self.key_element_type.is_none()
            }
            TypeKind::TK_STRUCTURE => {
                // Optional supertype must itself be a structure.
                self.base_type
                    .as_ref()
                    .is_none_or(|b| b.get_kind() == TypeKind::TK_STRUCTURE)
                    && self.discriminator_type.is_none()
                    && self.element_type.is_none()
                    && self.key_element_type.is_none()
                    && self.bound.is_empty()
            }
            TypeKind::TK_UNION => {
                self.discriminator_type
                    .as_ref()
                    .is_some_and(|d| d.resolved_kind().is_discriminator())
                    && self.base_type.is_none()
                    && self.element_type.is_none()
                    && self.key_element_type.is_none()
                    && self.bound.is_empty()
            }
            TypeKind::TK_BITSET => self.refs_none() && self.bound.is_empty(),
            TypeKind::TK_SEQUENCE => {
                self.element_type.is_some()
                    && self.key_element_type.is_none()
                    && self.single_bound_or_none()
            }
            TypeKind::TK_ARRAY => {
                self.element_type.is_some()
                    && self.key_element_type.is_none()
                    && !self.bound.is_empty()
                    && self.bound.iter().all(|b| *b > 0)
            }
            TypeKind::TK_MAP => {
                self.element_type.is_some()
                    && self.key_element_type.is_some()
                    && self.single_bound_or_none()
            }
            _ => false,
        }
    }

    /// Total element capacity for arrays (product of dimensions).
    pub fn total_array_bound(&self) -> u64 {
        self.bound.iter().map(|b| u64::from(*b)).product()
    }

    fn name_consistent(&self, kind: TypeKind) -> bool {
        let nominal = kind.is_aggregate()
            || matches!(
                kind,
                TypeKind::TK_ALIAS | TypeKind::TK_ENUM | TypeKind::TK_BITMASK
            );
        // Anonymous kinds (primitives, strings, collections) carry decorated
        // display names like `sequence<int32>`; anything goes there.
        !nominal || is_valid_name(&self.name)
    }

    fn refs_none(&self) -> bool {
        self.base_type.is_none()
            && self.discriminator_type.is_none()
            && self.element_type.is_none()
            && self.key_element_type.is_none()
    }

    fn element_kind(&self) -> Option<TypeKind> {
        self.element_type.as_ref().map(DynamicType::get_kind)
    }

    fn string_payload_is(&self, char_kind: TypeKind) -> bool {
        self.element_kind() == Some(char_kind)
            && self.base_type.is_none()
            && self.discriminator_type.is_none()
            && self.key_element_type.is_none()
    }

    fn single_bound_or_none(&self) -> bool {
        self.bound.len() <= 1
    }
}
