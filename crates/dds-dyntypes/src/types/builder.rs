// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DynamicTypeBuilder - mutable construction-time counterpart of DynamicType.

use std::collections::{BTreeMap, BTreeSet};

use crate::descriptor::{
    AnnotationDescriptor, MemberDescriptor, TypeDescriptor, Extensibility, ANNOTATION_BIT_BOUND,
    ANNOTATION_DEFAULT, ANNOTATION_EXTENSIBILITY, ANNOTATION_ID, ANNOTATION_KEY,
    ANNOTATION_OPTIONAL, ANNOTATION_POSITION, ANNOTATION_VALUE_ATTR,
};
use crate::error::{DdsResult, ReturnCode};
use crate::kind::TypeKind;
use crate::types::DynamicType;
use crate::{MemberId, MEMBER_ID_INVALID};

/// Total bit capacity of a bitmask/bitset.
const MAX_BIT_BOUND: u32 = 64;

/// Accumulates members and annotations, then emits an immutable
/// [`DynamicType`] snapshot on [`build`](Self::build).
///
/// Builders are reusable construction tools: `build()` deep-copies the
/// current state, so no later mutation is observable through a previously
/// built type. Builders are move-only; there is no way to clone one.
pub struct DynamicTypeBuilder {
    descriptor: TypeDescriptor,
    annotations: Vec<AnnotationDescriptor>,
    members: Vec<(MemberDescriptor, Vec<AnnotationDescriptor>)>,
    used_ids: BTreeSet<MemberId>,
    used_names: BTreeSet<String>,
    /// Union case label -> owning member id.
    label_map: BTreeMap<u64, MemberId>,
    has_default_union_member: bool,
    next_id: MemberId,
    /// Running bit position for bitmask/bitset members.
    bit_cursor: u32,
}

impl DynamicTypeBuilder {
    /// Create a builder for the given blueprint. The descriptor must be
    /// consistent before any member is added.
    pub(crate) fn from_descriptor(descriptor: TypeDescriptor) -> DdsResult<Self> {
        if !descriptor.is_consistent() {
            return Err(ReturnCode::BadParameter);
        }
        let mut annotations = descriptor.annotations.clone();
        let mut descriptor = descriptor;
        descriptor.annotations.clear();
        annotations.retain(AnnotationDescriptor::is_consistent);
        Ok(Self {
            descriptor,
            annotations,
            members: Vec::new(),
            used_ids: BTreeSet::new(),
            used_names: BTreeSet::new(),
            label_map: BTreeMap::new(),
            has_default_union_member: false,
            next_id: 0,
            bit_cursor: 0,
        })
    }

    pub fn get_kind(&self) -> TypeKind {
        self.descriptor.kind()
    }

    pub fn get_name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn get_member_count(&self) -> usize {
        self.members.len()
    }

    /// Add a structure/annotation member.
    ///
    /// With `id = None` the next unused sequential id is assigned; an
    /// explicit id is used verbatim if free and rejected otherwise.
    pub fn add_member(
        &mut self,
        id: Option<MemberId>,
        name: &str,
        ty: DynamicType,
    ) -> DdsResult<MemberId> {
        match self.get_kind() {
            TypeKind::TK_STRUCTURE | TypeKind::TK_ANNOTATION => {}
            _ => return Err(ReturnCode::Unsupported),
        }
        let id = self.claim_id(id)?;
        let descriptor = MemberDescriptor {
            index: self.members.len() as u32,
            ..MemberDescriptor::new(id, name, ty)
        };
        self.push_member(descriptor)
    }

    /// Add a union case member with its labels, or the default case.
    ///
    /// Label sets must partition: a label already mapped to a different
    /// member is rejected, as is a second default member.
    pub fn add_union_member(
        &mut self,
        id: Option<MemberId>,
        name: &str,
        ty: DynamicType,
        labels: &[u64],
        is_default: bool,
    ) -> DdsResult<MemberId> {
        if self.get_kind() != TypeKind::TK_UNION {
            return Err(ReturnCode::Unsupported);
        }
        if is_default == !labels.is_empty() {
            return Err(ReturnCode::BadParameter);
        }
        if is_default && self.has_default_union_member {
            return Err(ReturnCode::BadParameter);
        }
        if labels.iter().any(|l| self.label_map.contains_key(l)) {
            return Err(ReturnCode::BadParameter);
        }
        let id = self.claim_id(id)?;
        let descriptor = MemberDescriptor {
            index: self.members.len() as u32,
            labels: labels.to_vec(),
            is_default_union_value: is_default,
            ..MemberDescriptor::new(id, name, ty)
        };
        let id = self.push_member(descriptor)?;
        for label in labels {
            self.label_map.insert(*label, id);
        }
        if is_default {
            self.has_default_union_member = true;
        }
        Ok(id)
    }

    /// Add an enum literal; its value is its declaration position.
    pub fn add_enum_literal(&mut self, name: &str) -> DdsResult<MemberId> {
        if self.get_kind() != TypeKind::TK_ENUM {
            return Err(ReturnCode::Unsupported);
        }
        let id = self.members.len() as MemberId;
        let descriptor = MemberDescriptor {
            id,
            name: name.to_string(),
            index: id,
            ..MemberDescriptor::default()
        };
        self.push_member(descriptor)
    }

    /// Add a bitmask flag at the running bit position.
    pub fn add_bitmask_flag(&mut self, name: &str) -> DdsResult<MemberId> {
        if self.get_kind() != TypeKind::TK_BITMASK {
            return Err(ReturnCode::Unsupported);
        }
        let bound = self.descriptor.bound.first().copied().unwrap_or(MAX_BIT_BOUND);
        if self.bit_cursor >= bound {
            return Err(ReturnCode::BadParameter);
        }
        let position = self.bit_cursor;
        let descriptor = MemberDescriptor {
            id: position,
            name: name.to_string(),
            index: self.members.len() as u32,
            ..MemberDescriptor::default()
        };
        let id = self.push_member(descriptor)?;
        self.bit_cursor += 1;
        Ok(id)
    }

    /// Add a bitset field of `width` bits at the running bit position.
    ///
    /// An addition that would exceed 64 total bits is rejected. The
    /// optional carrier type records the integer the field is surfaced as.
    pub fn add_bitset_field(
        &mut self,
        name: &str,
        width: u16,
        carrier: Option<DynamicType>,
    ) -> DdsResult<MemberId> {
        if self.get_kind() != TypeKind::TK_BITSET {
            return Err(ReturnCode::Unsupported);
        }
        if width == 0 || self.bit_cursor + u32::from(width) > MAX_BIT_BOUND {
            return Err(ReturnCode::BadParameter);
        }
        let position = self.bit_cursor;
        let descriptor = MemberDescriptor {
            id: position,
            name: name.to_string(),
            index: self.members.len() as u32,
            ty: carrier,
            // Field width rides in the labels slot of the blueprint.
            labels: vec![u64::from(width)],
            ..MemberDescriptor::default()
        };
        self.push_member(descriptor)?;
        self.bit_cursor += u32::from(width);
        Ok(position)
    }

    /// Apply a type-level annotation; the descriptor is validated first.
    ///
    /// `@extensibility` immediately reshapes the blueprint's encoding mode;
    /// `@bit_bound` resizes a bitmask/bitset's declared width.
    pub fn apply_annotation(&mut self, annotation: AnnotationDescriptor) -> DdsResult<()> {
        if !annotation.is_consistent() {
            return Err(ReturnCode::BadParameter);
        }
        match annotation.name() {
            ANNOTATION_EXTENSIBILITY => {
                match annotation.get_value(ANNOTATION_VALUE_ATTR)? {
                    "FINAL" | "final" => self.descriptor.extensibility = Extensibility::Final,
                    "APPENDABLE" | "appendable" => {
                        self.descriptor.extensibility = Extensibility::Appendable;
                    }
                    "MUTABLE" | "mutable" => self.descriptor.extensibility = Extensibility::Mutable,
                    _ => return Err(ReturnCode::BadParameter),
                }
            }
            ANNOTATION_BIT_BOUND => {
                if !matches!(self.get_kind(), TypeKind::TK_BITMASK | TypeKind::TK_BITSET) {
                    return Err(ReturnCode::Unsupported);
                }
                let bits: u32 = annotation
                    .get_value(ANNOTATION_VALUE_ATTR)?
                    .parse()
                    .map_err(|_| ReturnCode::BadParameter)?;
                // Cannot shrink below the bits already claimed.
                if bits == 0 || bits > MAX_BIT_BOUND || bits < self.bit_cursor {
                    return Err(ReturnCode::BadParameter);
                }
                self.descriptor.bound = vec![bits];
            }
            _ => {}
        }
        self.annotations.push(annotation);
        Ok(())
    }

    /// Apply an annotation to one member; unknown member id is rejected.
    ///
    /// `@key`, `@optional` and `@default` update the member's derived
    /// state; `@id` moves the member to the requested id and `@position`
    /// does the same for bitmask/bitset bit positions.
    pub fn apply_annotation_to_member(
        &mut self,
        id: MemberId,
        annotation: AnnotationDescriptor,
    ) -> DdsResult<()> {
        if !annotation.is_consistent() {
            return Err(ReturnCode::BadParameter);
        }
        let id = match annotation.name() {
            ANNOTATION_ID => self.rekey_member(id, self.parse_id_attribute(&annotation)?)?,
            ANNOTATION_POSITION => {
                if !matches!(self.get_kind(), TypeKind::TK_BITMASK | TypeKind::TK_BITSET) {
                    return Err(ReturnCode::Unsupported);
                }
                self.rekey_member(id, self.parse_id_attribute(&annotation)?)?
            }
            _ => id,
        };
        let entry = self
            .members
            .iter_mut()
            .find(|(m, _)| m.id == id)
            .ok_or(ReturnCode::BadParameter)?;
        match annotation.name() {
            ANNOTATION_KEY => entry.0.is_key = true,
            ANNOTATION_OPTIONAL => entry.0.is_optional = true,
            ANNOTATION_DEFAULT => {
                entry.0.default_value = annotation
                    .get_value(ANNOTATION_VALUE_ATTR)
                    .unwrap_or_default()
                    .to_string();
            }
            _ => {}
        }
        entry.1.push(annotation);
        Ok(())
    }

    /// Emit an immutable snapshot of the current state.
    ///
    /// A union must have its discriminator set (checked at creation) and at
    /// least one case; every member is re-validated against the owner kind.
    pub fn build(&self) -> DdsResult<DynamicType> {
        let kind = self.get_kind();
        if kind == TypeKind::TK_UNION && self.members.is_empty() {
            return Err(ReturnCode::PreconditionNotMet);
        }
        for (member, _) in &self.members {
            if !member.is_consistent(kind) {
                return Err(ReturnCode::PreconditionNotMet);
            }
        }
        let ty = DynamicType::from_parts(
            self.descriptor.clone(),
            self.annotations.clone(),
            self.members.clone(),
        );
        log::trace!(
            "built dynamic type '{}' ({:?}, {} members)",
            ty.name(),
            kind,
            ty.get_member_count()
        );
        Ok(ty)
    }

    fn parse_id_attribute(&self, annotation: &AnnotationDescriptor) -> DdsResult<MemberId> {
        annotation
            .get_value(ANNOTATION_VALUE_ATTR)?
            .parse()
            .map_err(|_| ReturnCode::BadParameter)
    }

    /// Move a member to a caller-chosen id, keeping the id and union label
    /// tables in sync. Bit-addressed kinds treat the id as the new bit
    /// position and advance the running cursor past it.
    fn rekey_member(&mut self, id: MemberId, new_id: MemberId) -> DdsResult<MemberId> {
        let index = self
            .members
            .iter()
            .position(|(m, _)| m.id == id)
            .ok_or(ReturnCode::BadParameter)?;
        if new_id == id {
            return Ok(id);
        }
        if new_id == MEMBER_ID_INVALID || self.used_ids.contains(&new_id) {
            return Err(ReturnCode::BadParameter);
        }
        let kind = self.get_kind();
        let width = self.members[index].0.labels.first().copied().unwrap_or(1) as u32;
        match kind {
            TypeKind::TK_BITMASK => {
                let bound = self.descriptor.bound.first().copied().unwrap_or(MAX_BIT_BOUND);
                if new_id >= bound {
                    return Err(ReturnCode::BadParameter);
                }
            }
            TypeKind::TK_BITSET => {
                if new_id + width > MAX_BIT_BOUND {
                    return Err(ReturnCode::BadParameter);
                }
            }
            _ => {}
        }
        self.members[index].0.id = new_id;
        if !self.members[index].0.is_consistent(kind) {
            self.members[index].0.id = id;
            return Err(ReturnCode::BadParameter);
        }
        self.used_ids.remove(&id);
        self.used_ids.insert(new_id);
        for target in self.label_map.values_mut() {
            if *target == id {
                *target = new_id;
            }
        }
        match kind {
            TypeKind::TK_BITMASK => self.bit_cursor = self.bit_cursor.max(new_id + 1),
            TypeKind::TK_BITSET => self.bit_cursor = self.bit_cursor.max(new_id + width),
            _ => {}
        }
        Ok(new_id)
    }

    fn claim_id(&mut self, requested: Option<MemberId>) -> DdsResult<MemberId> {
        let id = match requested {
            Some(id) => {
                if id == MEMBER_ID_INVALID || self.used_ids.contains(&id) {
                    return Err(ReturnCode::BadParameter);
                }
                id
            }
            None => {
                let mut candidate = self.next_id;
                while self.used_ids.contains(&candidate) {
                    candidate += 1;
                }
                self.next_id = candidate + 1;
                candidate
            }
        };
        Ok(id)
    }

    fn push_member(&mut self, descriptor: MemberDescriptor) -> DdsResult<MemberId> {
        let kind = self.get_kind();
        if !descriptor.is_consistent(kind) {
            return Err(ReturnCode::BadParameter);
        }
        if self.used_names.contains(&descriptor.name) {
            return Err(ReturnCode::BadParameter);
        }
        if kind == TypeKind::TK_ENUM || kind == TypeKind::TK_BITMASK {
            // Positional members carry their id implicitly.
        } else if self.used_ids.contains(&descriptor.id) {
            return Err(ReturnCode::BadParameter);
        }
        let id = descriptor.id;
        self.used_ids.insert(id);
        self.used_names.insert(descriptor.name.clone());
        self.members.push((descriptor, Vec::new()));
        Ok(id)
    }
}

impl std::fmt::Debug for DynamicTypeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicTypeBuilder")
            .field("kind", &self.get_kind())
            .field("name", &self.get_name())
            .field("members", &self.members.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::DynamicTypeBuilderFactory;

    fn factory() -> &'static DynamicTypeBuilderFactory {
        DynamicTypeBuilderFactory::get_instance()
    }

    fn int32() -> DynamicType {
        factory().get_primitive_type(TypeKind::TK_INT32).expect("ty")
    }

    #[test]
    fn test_sequential_and_explicit_ids() {
        let mut b = factory().create_struct_builder("S").expect("builder");
        assert_eq!(b.add_member(None, "a", int32()).expect("a"), 0);
        assert_eq!(b.add_member(Some(5), "b", int32()).expect("b"), 5);
        assert_eq!(b.add_member(None, "c", int32()).expect("c"), 1);
        // Duplicate explicit id is rejected.
        assert_eq!(
            b.add_member(Some(5), "d", int32()),
            Err(ReturnCode::BadParameter)
        );
        // Duplicate name is rejected.
        assert_eq!(
            b.add_member(None, "a", int32()),
            Err(ReturnCode::BadParameter)
        );
    }

    #[test]
    fn test_build_independence() {
        let mut b = factory().create_struct_builder("S").expect("builder");
        b.add_member(None, "a", int32()).expect("a");
        let t1 = b.build().expect("t1");
        b.add_member(None, "b", int32()).expect("b");
        let t2 = b.build().expect("t2");
        assert_eq!(t1.get_member_count(), 1);
        assert_eq!(t2.get_member_count(), 2);
    }

    #[test]
    fn test_union_label_partition() {
        let mut b = factory()
            .create_union_builder("U", int32())
            .expect("builder");
        b.add_union_member(None, "a", int32(), &[1, 2], false)
            .expect("a");
        // Label 2 already maps to "a".
        assert_eq!(
            b.add_union_member(None, "b", int32(), &[2], false),
            Err(ReturnCode::BadParameter)
        );
        b.add_union_member(None, "c", int32(), &[], true).expect("c");
        // Second default member rejected.
        assert_eq!(
            b.add_union_member(None, "d", int32(), &[], true),
            Err(ReturnCode::BadParameter)
        );
        // Labels and default flag are mutually exclusive.
        assert_eq!(
            b.add_union_member(None, "e", int32(), &[9], true),
            Err(ReturnCode::BadParameter)
        );
    }

    #[test]
    fn test_union_without_members_fails_build() {
        let b = factory()
            .create_union_builder("U", int32())
            .expect("builder");
        assert!(b.build().is_err());
    }

    #[test]
    fn test_enum_literals_are_positional() {
        let mut b = factory().create_enum_builder("Color").expect("builder");
        assert_eq!(b.add_enum_literal("RED").expect("l"), 0);
        assert_eq!(b.add_enum_literal("GREEN").expect("l"), 1);
        assert_eq!(b.add_enum_literal("BLUE").expect("l"), 2);
        let ty = b.build().expect("build");
        assert_eq!(ty.get_member_by_name("GREEN").expect("m").get_id(), 1);
    }

    #[test]
    fn test_bitmask_bit_budget() {
        let mut b = factory()
            .create_bitmask_builder("Flags", 2)
            .expect("builder");
        b.add_bitmask_flag("A").expect("a");
        b.add_bitmask_flag("B").expect("b");
        assert_eq!(b.add_bitmask_flag("C"), Err(ReturnCode::BadParameter));
    }

    #[test]
    fn test_bitset_width_budget() {
        let mut b = factory().create_bitset_builder("Bits").expect("builder");
        assert_eq!(b.add_bitset_field("low", 3, None).expect("low"), 0);
        assert_eq!(b.add_bitset_field("mid", 10, None).expect("mid"), 3);
        assert_eq!(
            b.add_bitset_field("huge", 60, None),
            Err(ReturnCode::BadParameter)
        );
        assert_eq!(b.add_bitset_field("zero", 0, None), Err(ReturnCode::BadParameter));
    }

    #[test]
    fn test_wrong_kind_add_is_unsupported() {
        let mut b = factory().create_enum_builder("E").expect("builder");
        assert_eq!(
            b.add_member(None, "x", int32()),
            Err(ReturnCode::Unsupported)
        );
        let mut s = factory().create_struct_builder("S").expect("builder");
        assert_eq!(s.add_enum_literal("Y"), Err(ReturnCode::Unsupported));
    }

    #[test]
    fn test_id_annotation_rekeys_member() {
        let ann_factory = crate::factory::AnnotationFactory::get_instance();
        let mut b = factory().create_struct_builder("S").expect("builder");
        b.add_member(None, "a", int32()).expect("a");
        b.add_member(None, "b", int32()).expect("b");

        let mut ann = ann_factory.create_annotation(ANNOTATION_ID).expect("id");
        ann.set_value(ANNOTATION_VALUE_ATTR, "7").expect("set");
        b.apply_annotation_to_member(0, ann).expect("apply");
        let ty = b.build().expect("build");
        assert!(ty.get_member(0).is_err());
        assert_eq!(ty.get_member_by_name("a").expect("a").get_id(), 7);

        // An occupied target id is rejected.
        let mut clash = ann_factory.create_annotation(ANNOTATION_ID).expect("id");
        clash.set_value(ANNOTATION_VALUE_ATTR, "1").expect("set");
        assert_eq!(
            b.apply_annotation_to_member(7, clash),
            Err(ReturnCode::BadParameter)
        );
        // @position only addresses bit positions.
        let mut pos = ann_factory.create_annotation(ANNOTATION_POSITION).expect("pos");
        pos.set_value(ANNOTATION_VALUE_ATTR, "3").expect("set");
        assert_eq!(
            b.apply_annotation_to_member(7, pos),
            Err(ReturnCode::Unsupported)
        );
    }

    #[test]
    fn test_bit_bound_annotation_resizes_bitmask() {
        let ann_factory = crate::factory::AnnotationFactory::get_instance();
        let mut b = factory().create_bitmask_builder("Flags", 2).expect("builder");
        b.add_bitmask_flag("A").expect("a");
        b.add_bitmask_flag("B").expect("b");
        assert_eq!(b.add_bitmask_flag("C"), Err(ReturnCode::BadParameter));

        let mut bound = ann_factory
            .create_annotation(ANNOTATION_BIT_BOUND)
            .expect("bound");
        bound.set_value(ANNOTATION_VALUE_ATTR, "3").expect("set");
        b.apply_annotation(bound).expect("apply");
        b.add_bitmask_flag("C").expect("c");
        assert_eq!(b.add_bitmask_flag("D"), Err(ReturnCode::BadParameter));

        // Shrinking below the claimed bits is rejected.
        let mut shrink = ann_factory
            .create_annotation(ANNOTATION_BIT_BOUND)
            .expect("bound");
        shrink.set_value(ANNOTATION_VALUE_ATTR, "1").expect("set");
        assert_eq!(b.apply_annotation(shrink), Err(ReturnCode::BadParameter));
    }

    #[test]
    fn test_position_annotation_moves_flag() {
        let ann_factory = crate::factory::AnnotationFactory::get_instance();
        let mut b = factory().create_bitmask_builder("Flags", 8).expect("builder");
        b.add_bitmask_flag("A").expect("a");

        let mut pos = ann_factory.create_annotation(ANNOTATION_POSITION).expect("pos");
        pos.set_value(ANNOTATION_VALUE_ATTR, "5").expect("set");
        b.apply_annotation_to_member(0, pos).expect("apply");
        // The cursor advances past the moved flag.
        let next = b.add_bitmask_flag("B").expect("b");
        assert_eq!(next, 6);
        let ty = b.build().expect("build");
        assert_eq!(ty.get_member_by_name("A").expect("a").get_id(), 5);
    }

    #[test]
    fn test_member_annotation_unknown_id() {
        let mut b = factory().create_struct_builder("S").expect("builder");
        b.add_member(None, "a", int32()).expect("a");
        let key = crate::factory::AnnotationFactory::get_instance()
            .create_annotation(ANNOTATION_KEY)
            .expect("key");
        assert_eq!(
            b.apply_annotation_to_member(42, key),
            Err(ReturnCode::BadParameter)
        );
    }
}
