// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AnnotationDescriptor - one applied annotation and its attribute values.

use std::collections::BTreeMap;

use crate::descriptor::literal_matches_kind;
use crate::error::{DdsResult, ReturnCode};
use crate::kind::TypeKind;
use crate::types::DynamicType;

/// Builtin annotation names, matching their IDL spellings.
pub const ANNOTATION_KEY: &str = "key";
pub const ANNOTATION_OPTIONAL: &str = "optional";
pub const ANNOTATION_ID: &str = "id";
pub const ANNOTATION_DEFAULT: &str = "default";
pub const ANNOTATION_EXTENSIBILITY: &str = "extensibility";
pub const ANNOTATION_BIT_BOUND: &str = "bit_bound";
pub const ANNOTATION_POSITION: &str = "position";

/// Attribute name used by single-valued builtin annotations.
pub const ANNOTATION_VALUE_ATTR: &str = "value";

/// One applied annotation: a reference to its ANNOTATION-kind type plus an
/// attribute-name to string-literal map.
#[derive(Debug, Clone, Default)]
pub struct AnnotationDescriptor {
    /// The annotation's declared type (kind must be TK_ANNOTATION).
    pub ty: Option<DynamicType>,
    /// Attribute name -> literal value.
    pub value: BTreeMap<String, String>,
}

impl AnnotationDescriptor {
    pub fn new(ty: DynamicType) -> Self {
        Self {
            ty: Some(ty),
            value: BTreeMap::new(),
        }
    }

    /// The annotation's name (its type name), or "" when no type is set.
    pub fn name(&self) -> &str {
        self.ty.as_ref().map_or("", DynamicType::name)
    }

    pub fn get_value(&self, attribute: &str) -> DdsResult<&str> {
        self.value
            .get(attribute)
            .map(String::as_str)
            .ok_or(ReturnCode::BadParameter)
    }

    /// Set one attribute value. The attribute must be declared by the
    /// annotation type and the literal must match its kind.
    pub fn set_value(&mut self, attribute: &str, literal: &str) -> DdsResult<()> {
        let ty = self.ty.as_ref().ok_or(ReturnCode::PreconditionNotMet)?;
        let member = ty
            .get_member_by_name(attribute)
            .map_err(|_| ReturnCode::BadParameter)?;
        if !literal_matches_kind(literal, member.resolved_kind()) {
            return Err(ReturnCode::BadParameter);
        }
        self.value.insert(attribute.to_string(), literal.to_string());
        Ok(())
    }

    /// Overwrite this descriptor with a field-by-field copy of `other`.
    pub fn copy_from(&mut self, other: Option<&AnnotationDescriptor>) -> DdsResult<()> {
        let src = other.ok_or(ReturnCode::BadParameter)?;
        *self = src.clone();
        Ok(())
    }

    pub fn equals(&self, other: &AnnotationDescriptor) -> bool {
        let ty_eq = match (&self.ty, &other.ty) {
            (None, None) => true,
            (Some(a), Some(b)) => a.equals(b),
            _ => false,
        };
        ty_eq && self.value == other.value
    }

    /// Every key must name a declared attribute of the annotation type and
    /// every value must be a valid literal for that attribute's kind.
    pub fn is_consistent(&self) -> bool {
        let Some(ty) = &self.ty else {
            return false;
        };
        if ty.get_kind() != TypeKind::TK_ANNOTATION {
            return false;
        }
        self.value.iter().all(|(attribute, literal)| {
            ty.get_member_by_name(attribute)
                .map(|m| literal_matches_kind(literal, m.resolved_kind()))
                .unwrap_or(false)
        })
    }
}
