// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DynamicType - immutable, shareable type graph node.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::descriptor::{AnnotationDescriptor, MemberDescriptor, TypeDescriptor, Extensibility};
use crate::error::{DdsResult, ReturnCode};
use crate::kind::TypeKind;
use crate::types::DynamicTypeMember;
use crate::MemberId;

pub(crate) struct TypeInner {
    /// Frozen blueprint; its `annotations` field stays empty, the live list
    /// is kept separately so the post-build escape hatch below works.
    pub(crate) descriptor: TypeDescriptor,
    /// Applied annotations. Post-build `apply_annotation` is the one
    /// documented exception to immutability, hence the lock.
    pub(crate) annotations: RwLock<Vec<AnnotationDescriptor>>,
    /// Members in declaration order.
    pub(crate) members: Vec<DynamicTypeMember>,
    pub(crate) index_by_id: BTreeMap<MemberId, usize>,
    pub(crate) id_by_name: BTreeMap<String, MemberId>,
}

/// An immutable type graph node, created by a factory from a builder
/// snapshot and shared by every value and nested reference bound to it.
#[derive(Clone)]
pub struct DynamicType {
    inner: Arc<TypeInner>,
}

impl DynamicType {
    pub(crate) fn from_inner(inner: Arc<TypeInner>) -> Self {
        Self { inner }
    }

    /// Assemble a type from builder parts. Members arrive in declaration
    /// order and have already been validated by the builder.
    pub(crate) fn from_parts(
        descriptor: TypeDescriptor,
        annotations: Vec<AnnotationDescriptor>,
        members: Vec<(MemberDescriptor, Vec<AnnotationDescriptor>)>,
    ) -> Self {
        let inner = Arc::new_cyclic(|weak| {
            let mut index_by_id = BTreeMap::new();
            let mut id_by_name = BTreeMap::new();
            let built: Vec<DynamicTypeMember> = members
                .into_iter()
                .enumerate()
                .map(|(index, (descriptor, annotations))| {
                    index_by_id.insert(descriptor.id, index);
                    id_by_name.insert(descriptor.name.clone(), descriptor.id);
                    DynamicTypeMember {
                        descriptor,
                        annotations,
                        parent: weak.clone(),
                    }
                })
                .collect();
            TypeInner {
                descriptor,
                annotations: RwLock::new(annotations),
                members: built,
                index_by_id,
                id_by_name,
            }
        });
        Self { inner }
    }

    pub fn get_kind(&self) -> TypeKind {
        self.inner.descriptor.kind()
    }

    pub fn name(&self) -> &str {
        &self.inner.descriptor.name
    }

    pub fn get_name(&self) -> String {
        self.inner.descriptor.name.clone()
    }

    pub fn get_extensibility(&self) -> Extensibility {
        self.inner.descriptor.extensibility
    }

    /// Copy of the blueprint, with the live annotation list snapshotted in.
    pub fn get_descriptor(&self) -> TypeDescriptor {
        let mut descriptor = self.inner.descriptor.clone();
        descriptor.annotations = self.inner.annotations.read().clone();
        descriptor
    }

    pub fn get_base_type(&self) -> Option<DynamicType> {
        self.inner.descriptor.base_type.clone()
    }

    pub fn get_discriminator_type(&self) -> Option<DynamicType> {
        self.inner.descriptor.discriminator_type.clone()
    }

    pub fn get_element_type(&self) -> Option<DynamicType> {
        self.inner.descriptor.element_type.clone()
    }

    pub fn get_key_element_type(&self) -> Option<DynamicType> {
        self.inner.descriptor.key_element_type.clone()
    }

    pub fn get_bound(&self) -> &[u32] {
        &self.inner.descriptor.bound
    }

    /// Total element capacity for arrays; 0 for unbounded collections.
    pub fn get_total_bound(&self) -> u64 {
        if self.get_kind() == TypeKind::TK_ARRAY {
            self.inner.descriptor.total_array_bound()
        } else {
            u64::from(self.inner.descriptor.bound.first().copied().unwrap_or(0))
        }
    }

    /// Kind after resolving alias chains.
    pub fn resolved_kind(&self) -> TypeKind {
        self.resolve_alias().get_kind()
    }

    /// Follow alias chains to the ultimate target (self for non-aliases).
    pub fn resolve_alias(&self) -> DynamicType {
        let mut current = self.clone();
        while current.get_kind() == TypeKind::TK_ALIAS {
            match current.get_base_type() {
                Some(target) => current = target,
                None => break,
            }
        }
        current
    }

    pub fn get_member_count(&self) -> usize {
        self.inner.members.len()
    }

    pub fn get_member(&self, id: MemberId) -> DdsResult<DynamicTypeMember> {
        self.inner
            .index_by_id
            .get(&id)
            .and_then(|idx| self.inner.members.get(*idx))
            .cloned()
            .ok_or(ReturnCode::BadParameter)
    }

    pub fn get_member_by_name(&self, name: &str) -> DdsResult<DynamicTypeMember> {
        let id = self
            .inner
            .id_by_name
            .get(name)
            .copied()
            .ok_or(ReturnCode::BadParameter)?;
        self.get_member(id)
    }

    pub fn get_member_by_index(&self, index: usize) -> DdsResult<DynamicTypeMember> {
        self.inner
            .members
            .get(index)
            .cloned()
            .ok_or(ReturnCode::BadParameter)
    }

    /// Member ids in declaration order.
    pub fn get_all_member_ids(&self) -> Vec<MemberId> {
        self.inner.members.iter().map(|m| m.descriptor.id).collect()
    }

    pub(crate) fn members(&self) -> &[DynamicTypeMember] {
        &self.inner.members
    }

    pub fn get_annotation_count(&self) -> usize {
        self.inner.annotations.read().len()
    }

    pub fn get_annotation(&self, index: usize) -> DdsResult<AnnotationDescriptor> {
        self.inner
            .annotations
            .read()
            .get(index)
            .cloned()
            .ok_or(ReturnCode::BadParameter)
    }

    /// Attach an annotation to an already-built type.
    ///
    /// This is the single documented exception to post-build immutability:
    /// everything else about the type is frozen, but annotations may still
    /// be applied afterwards (mirroring the construction-time API).
    pub fn apply_annotation(&self, descriptor: AnnotationDescriptor) -> DdsResult<()> {
        if !descriptor.is_consistent() {
            return Err(ReturnCode::BadParameter);
        }
        self.inner.annotations.write().push(descriptor);
        Ok(())
    }

    /// True for aggregate/collection/annotation kinds.
    pub fn has_children(&self) -> bool {
        self.get_kind().has_children()
    }

    /// Recursive `@key` search: any direct member keyed, or a nested
    /// aggregate member whose own type is key-defined.
    pub fn is_key_defined(&self) -> bool {
        if !self.get_kind().is_aggregate() {
            return false;
        }
        self.inner.members.iter().any(|m| {
            if m.key_annotation() {
                return true;
            }
            m.descriptor
                .ty
                .as_ref()
                .map(|t| t.resolve_alias())
                .is_some_and(|t| t.get_kind().is_aggregate() && t.is_key_defined())
        })
    }

    /// Entity-layer alias for [`is_key_defined`](Self::is_key_defined).
    pub fn is_with_key(&self) -> bool {
        self.is_key_defined()
    }

    /// Deep structural equality over descriptor, members and annotations.
    pub fn equals(&self, other: &DynamicType) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        self.inner.descriptor.equals(&other.inner.descriptor)
            && self.get_annotation_count() == other.get_annotation_count()
            && self
                .inner
                .annotations
                .read()
                .iter()
                .zip(other.inner.annotations.read().iter())
                .all(|(a, b)| a.equals(b))
            && self.inner.members.len() == other.inner.members.len()
            && self
                .inner
                .members
                .iter()
                .zip(other.inner.members.iter())
                .all(|(a, b)| a.equals(b))
    }

    /// Same underlying node (used by the primitive singleton cache).
    pub fn ptr_eq(&self, other: &DynamicType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Re-validate the whole graph: descriptor, every member, and the
    /// union default-member count.
    pub fn is_consistent(&self) -> bool {
        let mut descriptor = self.inner.descriptor.clone();
        descriptor.annotations = self.inner.annotations.read().clone();
        if !descriptor.is_consistent() {
            return false;
        }
        let kind = self.get_kind();
        if !self
            .inner
            .members
            .iter()
            .all(|m| m.descriptor.is_consistent(kind))
        {
            return false;
        }
        if kind == TypeKind::TK_UNION {
            let defaults = self
                .inner
                .members
                .iter()
                .filter(|m| m.descriptor.is_default_union_value)
                .count();
            if defaults > 1 {
                return false;
            }
        }
        true
    }
}

impl std::fmt::Debug for DynamicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicType")
            .field("kind", &self.get_kind())
            .field("name", &self.name())
            .field("members", &self.get_member_count())
            .finish()
    }
}
