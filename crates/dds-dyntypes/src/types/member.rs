// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DynamicTypeMember - one member bound to its owning type.

use std::sync::Weak;

use crate::descriptor::{AnnotationDescriptor, MemberDescriptor, ANNOTATION_KEY};
use crate::error::{DdsResult, ReturnCode};
use crate::kind::TypeKind;
use crate::types::{DynamicType, TypeInner};
use crate::MemberId;

/// One member of a built type: its descriptor plus per-member annotations.
///
/// Members are created once at build time and exposed to callers only as
/// copies; the parent edge is non-owning.
#[derive(Clone)]
pub struct DynamicTypeMember {
    pub(crate) descriptor: MemberDescriptor,
    pub(crate) annotations: Vec<AnnotationDescriptor>,
    pub(crate) parent: Weak<TypeInner>,
}

impl DynamicTypeMember {
    pub fn get_id(&self) -> MemberId {
        self.descriptor.id
    }

    pub fn get_name(&self) -> &str {
        &self.descriptor.name
    }

    /// Copy of the member blueprint (value semantics at the API boundary).
    pub fn get_descriptor(&self) -> MemberDescriptor {
        self.descriptor.clone()
    }

    /// The owning type, if it is still alive.
    pub fn get_parent(&self) -> Option<DynamicType> {
        self.parent.upgrade().map(DynamicType::from_inner)
    }

    pub fn get_union_labels(&self) -> &[u64] {
        &self.descriptor.labels
    }

    pub fn is_default_union_member(&self) -> bool {
        self.descriptor.is_default_union_value
    }

    pub fn is_key(&self) -> bool {
        self.descriptor.is_key
    }

    pub fn is_optional(&self) -> bool {
        self.descriptor.is_optional
    }

    /// Kind of the declared type after alias resolution.
    pub fn resolved_kind(&self) -> TypeKind {
        self.descriptor.resolved_kind()
    }

    pub fn get_annotation_count(&self) -> usize {
        self.annotations.len()
    }

    pub fn get_annotation(&self, index: usize) -> DdsResult<AnnotationDescriptor> {
        self.annotations
            .get(index)
            .cloned()
            .ok_or(ReturnCode::BadParameter)
    }

    /// True if this member carries an applied `@key` annotation (or the
    /// derived key flag set at build time).
    pub fn key_annotation(&self) -> bool {
        self.descriptor.is_key
            || self
                .annotations
                .iter()
                .any(|a| a.name() == ANNOTATION_KEY)
    }

    pub fn equals(&self, other: &DynamicTypeMember) -> bool {
        self.descriptor.equals(&other.descriptor)
            && self.annotations.len() == other.annotations.len()
            && self
                .annotations
                .iter()
                .zip(other.annotations.iter())
                .all(|(a, b)| a.equals(b))
    }
}

impl std::fmt::Debug for DynamicTypeMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicTypeMember")
            .field("id", &self.descriptor.id)
            .field("name", &self.descriptor.name)
            .field("kind", &self.resolved_kind())
            .finish()
    }
}
