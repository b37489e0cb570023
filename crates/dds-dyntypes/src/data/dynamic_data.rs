// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DynamicData - a runtime sample bound to a DynamicType.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::codec;
use crate::codec::key::InstanceHandle;
use crate::data::value::DynamicValue;
use crate::error::{DdsResult, ReturnCode};
use crate::kind::TypeKind;
use crate::types::DynamicType;
use crate::{MemberId, MEMBER_ID_INVALID};

/// A generic data sample. Every member slot holds a [`DynamicValue`]
/// keyed by member id; collection elements use dense element ids in the
/// same map. Instances bound to a primitive, string, enum or bitmask
/// type hold their single value at slot 0, addressed with
/// [`MEMBER_ID_INVALID`].
///
/// Accessors never mutate on failure. A kind mismatch reports
/// `Unsupported`, an unknown id `BadParameter`, and an absent optional
/// member `NoData`.
#[derive(Debug, Clone)]
pub struct DynamicData {
    ty: DynamicType,
    values: BTreeMap<MemberId, DynamicValue>,
    /// Map pair id -> key value, parallel to `values`. Only for TK_MAP.
    map_keys: BTreeMap<MemberId, DynamicValue>,
    active_union_id: MemberId,
    /// The discriminator value that selected the active case; `None` when
    /// the case was activated by a direct member write.
    union_label: Option<u64>,
    /// Members written through an accessor, as opposed to holding their
    /// seeded default.
    explicit: BTreeSet<MemberId>,
    loaned: Option<MemberId>,
    key_layout: OnceCell<Vec<(MemberId, TypeKind)>>,
}

macro_rules! typed_accessors {
    ($(($get:ident, $set:ident, $ty:ty, $variant:ident, $kind:ident)),* $(,)?) => {
        $(
            pub fn $get(&self, id: MemberId) -> DdsResult<$ty> {
                match self.read_slot(id, TypeKind::$kind)? {
                    DynamicValue::$variant(v) => Ok(v.clone()),
                    _ => Err(ReturnCode::Error),
                }
            }

            pub fn $set(&mut self, value: $ty, id: MemberId) -> DdsResult<()> {
                self.write_slot(id, TypeKind::$kind, DynamicValue::$variant(value))
            }
        )*
    };
}

impl DynamicData {
    /// Bind a fresh sample to `ty`, seeding every non-optional member
    /// with its default value (descriptor literal or the kind's zero).
    /// Returns `None` when the type graph cannot produce defaults.
    pub(crate) fn new(ty: &DynamicType) -> Option<Self> {
        let resolved = ty.resolve_alias();
        let mut data = Self {
            ty: resolved.clone(),
            values: BTreeMap::new(),
            map_keys: BTreeMap::new(),
            active_union_id: MEMBER_ID_INVALID,
            union_label: None,
            explicit: BTreeSet::new(),
            loaned: None,
            key_layout: OnceCell::new(),
        };
        match resolved.get_kind() {
            TypeKind::TK_STRUCTURE | TypeKind::TK_ANNOTATION => {
                for member in resolved.members() {
                    let d = &member.descriptor;
                    if d.is_optional {
                        continue;
                    }
                    let ty = d.ty.as_ref()?;
                    let value = DynamicValue::from_literal(ty, &d.default_value)?;
                    data.values.insert(d.id, value);
                }
            }
            // Unions start with no active case, collections start empty.
            TypeKind::TK_UNION | TypeKind::TK_SEQUENCE | TypeKind::TK_ARRAY | TypeKind::TK_MAP => {}
            _ => {
                data.values.insert(0, DynamicValue::default_for(&resolved)?);
            }
        }
        Some(data)
    }

    pub fn get_type(&self) -> &DynamicType {
        &self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// Number of populated slots (members set, or elements present).
    pub fn get_item_count(&self) -> usize {
        self.values.len()
    }

    /// Snapshot of a member's blueprint with its live `is_set` state:
    /// true once the member has been written through an accessor, false
    /// while it holds its seeded default.
    pub fn get_descriptor(&self, id: MemberId) -> DdsResult<crate::descriptor::MemberDescriptor> {
        if !self.ty.get_kind().is_aggregate() {
            return Err(ReturnCode::Unsupported);
        }
        let member = self.ty.get_member(id)?;
        let mut descriptor = member.descriptor.clone();
        descriptor.is_set = self.explicit.contains(&id);
        Ok(descriptor)
    }

    typed_accessors!(
        (get_bool, set_bool, bool, Bool, TK_BOOLEAN),
        (get_u8, set_u8, u8, U8, TK_UINT8),
        (get_u16, set_u16, u16, U16, TK_UINT16),
        (get_u32, set_u32, u32, U32, TK_UINT32),
        (get_u64, set_u64, u64, U64, TK_UINT64),
        (get_i8, set_i8, i8, I8, TK_INT8),
        (get_i16, set_i16, i16, I16, TK_INT16),
        (get_i32, set_i32, i32, I32, TK_INT32),
        (get_i64, set_i64, i64, I64, TK_INT64),
        (get_f32, set_f32, f32, F32, TK_FLOAT32),
        (get_f64, set_f64, f64, F64, TK_FLOAT64),
        (get_f128, set_f128, [u8; 16], F128, TK_FLOAT128),
        (get_char8, set_char8, char, Char8, TK_CHAR8),
        (get_char16, set_char16, u16, Char16, TK_CHAR16),
        (get_string, set_string, String, String, TK_STRING8),
        (get_wstring, set_wstring, String, WString, TK_STRING16),
    );

    /// Read a byte member. `TK_BYTE` and `TK_UINT8` share storage.
    pub fn get_byte(&self, id: MemberId) -> DdsResult<u8> {
        self.get_u8(id)
    }

    pub fn set_byte(&mut self, value: u8, id: MemberId) -> DdsResult<()> {
        self.set_u8(value, id)
    }

    // --- enum -----------------------------------------------------------

    pub fn get_enum_value(&self, id: MemberId) -> DdsResult<u32> {
        match self.read_slot(id, TypeKind::TK_ENUM)? {
            DynamicValue::U32(v) => Ok(*v),
            _ => Err(ReturnCode::Error),
        }
    }

    /// Set an enum member by literal value; unknown values are rejected.
    pub fn set_enum_value(&mut self, value: u32, id: MemberId) -> DdsResult<()> {
        let ty = self.slot_type(id)?;
        if ty.get_member(value).is_err() {
            return Err(ReturnCode::BadParameter);
        }
        self.write_slot(id, TypeKind::TK_ENUM, DynamicValue::U32(value))
    }

    pub fn get_enum_string(&self, id: MemberId) -> DdsResult<String> {
        let value = self.get_enum_value(id)?;
        let ty = self.slot_type(id)?;
        Ok(ty.get_member(value)?.get_name().to_string())
    }

    /// Set an enum member by literal name.
    pub fn set_enum_string(&mut self, name: &str, id: MemberId) -> DdsResult<()> {
        let ty = self.slot_type(id)?;
        let value = ty.get_member_by_name(name)?.get_id();
        self.write_slot(id, TypeKind::TK_ENUM, DynamicValue::U32(value))
    }

    // --- bitmask / bitset -----------------------------------------------

    pub fn get_bitmask_value(&self, id: MemberId) -> DdsResult<u64> {
        match self.read_slot(id, TypeKind::TK_BITMASK)? {
            DynamicValue::U64(v) => Ok(*v),
            _ => Err(ReturnCode::Error),
        }
    }

    /// Set the whole flag word; bits beyond the declared bound are rejected.
    pub fn set_bitmask_value(&mut self, value: u64, id: MemberId) -> DdsResult<()> {
        let ty = self.slot_type(id)?;
        let bound = ty.get_bound().first().copied().unwrap_or(64);
        if bound < 64 && value >> bound != 0 {
            return Err(ReturnCode::BadParameter);
        }
        self.write_slot(id, TypeKind::TK_BITMASK, DynamicValue::U64(value))
    }

    /// Read one flag of a bitmask-typed sample by name.
    pub fn get_flag(&self, name: &str) -> DdsResult<bool> {
        let position = self.ty.get_member_by_name(name)?.get_id();
        let mask = self.get_bitmask_value(MEMBER_ID_INVALID)?;
        Ok(mask >> position & 1 == 1)
    }

    pub fn set_flag(&mut self, name: &str, active: bool) -> DdsResult<()> {
        let position = self.ty.get_member_by_name(name)?.get_id();
        let mask = self.get_bitmask_value(MEMBER_ID_INVALID)?;
        let mask = if active {
            mask | 1 << position
        } else {
            mask & !(1 << position)
        };
        self.write_slot(
            MEMBER_ID_INVALID,
            TypeKind::TK_BITMASK,
            DynamicValue::U64(mask),
        )
    }

    pub fn get_bitset_value(&self, id: MemberId) -> DdsResult<u64> {
        match self.read_slot(id, TypeKind::TK_BITSET)? {
            DynamicValue::U64(v) => Ok(*v),
            _ => Err(ReturnCode::Error),
        }
    }

    pub fn set_bitset_value(&mut self, value: u64, id: MemberId) -> DdsResult<()> {
        self.write_slot(id, TypeKind::TK_BITSET, DynamicValue::U64(value))
    }

    /// Extract one bitset field (the member's width bits at its position).
    pub fn get_bitset_field(&self, field_id: MemberId) -> DdsResult<u64> {
        let member = self.ty.get_member(field_id)?;
        let width = member.get_union_labels().first().copied().unwrap_or(1) as u32;
        let word = self.get_bitset_value(MEMBER_ID_INVALID)?;
        let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
        Ok(word >> field_id & mask)
    }

    pub fn set_bitset_field(&mut self, value: u64, field_id: MemberId) -> DdsResult<()> {
        let member = self.ty.get_member(field_id)?;
        let width = member.get_union_labels().first().copied().unwrap_or(1) as u32;
        let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
        if value & !mask != 0 {
            return Err(ReturnCode::BadParameter);
        }
        let word = self.get_bitset_value(MEMBER_ID_INVALID)?;
        let word = word & !(mask << field_id) | value << field_id;
        self.write_slot(MEMBER_ID_INVALID, TypeKind::TK_BITSET, DynamicValue::U64(word))
    }

    // --- union ----------------------------------------------------------

    /// Select the active union case by discriminator value.
    ///
    /// Resolution walks the label table built from all cases, falling back
    /// to the default case; no match and no default leaves the union
    /// unselected and reports `BadParameter`.
    pub fn set_discriminator_value(&mut self, label: u64) -> DdsResult<()> {
        if self.ty.get_kind() != TypeKind::TK_UNION {
            return Err(ReturnCode::Unsupported);
        }
        let selected = self
            .ty
            .members()
            .iter()
            .find(|m| m.descriptor.labels.contains(&label))
            .or_else(|| {
                self.ty
                    .members()
                    .iter()
                    .find(|m| m.descriptor.is_default_union_value)
            })
            .ok_or(ReturnCode::BadParameter)?;
        let id = selected.get_id();
        if id != self.active_union_id {
            let ty = selected
                .descriptor
                .ty
                .as_ref()
                .ok_or(ReturnCode::Error)?;
            let value = DynamicValue::default_for(ty).ok_or(ReturnCode::Error)?;
            self.values.clear();
            self.explicit.clear();
            self.values.insert(id, value);
            self.active_union_id = id;
        }
        self.union_label = Some(label);
        Ok(())
    }

    /// The currently active case, or [`MEMBER_ID_INVALID`] when unselected.
    pub fn get_union_id(&self) -> MemberId {
        self.active_union_id
    }

    /// The discriminator value that selected the active case. A case
    /// activated by a direct member write reports its first declared
    /// label; `NoData` for such a default case or an unselected union.
    pub fn get_union_label(&self) -> DdsResult<u64> {
        if self.active_union_id == MEMBER_ID_INVALID {
            return Err(ReturnCode::NoData);
        }
        if let Some(label) = self.union_label {
            return Ok(label);
        }
        let member = self.ty.get_member(self.active_union_id)?;
        member
            .get_union_labels()
            .first()
            .copied()
            .ok_or(ReturnCode::NoData)
    }

    // --- complex / loan -------------------------------------------------

    /// Clone out a nested sample (struct, union or collection member).
    pub fn get_complex_value(&self, id: MemberId) -> DdsResult<DynamicData> {
        let slot = self.canonical_id(id)?;
        match self.values.get(&slot) {
            Some(DynamicValue::Complex(d)) => Ok((**d).clone()),
            Some(_) => Err(ReturnCode::Unsupported),
            None => Err(self.missing_slot_code(slot)),
        }
    }

    /// Replace a nested sample; the value's type must match the member's.
    pub fn set_complex_value(&mut self, value: DynamicData, id: MemberId) -> DdsResult<()> {
        let slot = self.canonical_id(id)?;
        let expected = self.slot_type(id)?;
        if !expected.equals(value.get_type()) {
            return Err(ReturnCode::BadParameter);
        }
        self.activate_union_member(slot)?;
        self.values.insert(slot, DynamicValue::Complex(Box::new(value)));
        self.explicit.insert(slot);
        Ok(())
    }

    /// Take temporary ownership of a nested sample. Only one loan may be
    /// outstanding per container; a second call before
    /// [`return_loaned_value`](Self::return_loaned_value) reports
    /// `PreconditionNotMet`.
    pub fn loan_value(&mut self, id: MemberId) -> DdsResult<DynamicData> {
        if self.loaned.is_some() {
            return Err(ReturnCode::PreconditionNotMet);
        }
        let slot = self.canonical_id(id)?;
        match self.values.get(&slot) {
            Some(DynamicValue::Complex(_)) => {}
            Some(_) => return Err(ReturnCode::Unsupported),
            None => return Err(self.missing_slot_code(slot)),
        }
        let Some(DynamicValue::Complex(data)) = self.values.remove(&slot) else {
            return Err(ReturnCode::Error);
        };
        self.loaned = Some(slot);
        Ok(*data)
    }

    /// Give back the sample obtained from [`loan_value`](Self::loan_value).
    /// The returned object must be bound to the loaned member's type.
    pub fn return_loaned_value(&mut self, value: DynamicData) -> DdsResult<()> {
        let slot = self.loaned.ok_or(ReturnCode::PreconditionNotMet)?;
        let expected = self.type_of_slot(slot)?;
        if !expected.resolve_alias().equals(value.get_type()) {
            return Err(ReturnCode::BadParameter);
        }
        self.values.insert(slot, DynamicValue::Complex(Box::new(value)));
        self.loaned = None;
        Ok(())
    }

    // --- collections ----------------------------------------------------

    /// Append a default-valued element, returning its id.
    pub fn insert_sequence_data(&mut self) -> DdsResult<MemberId> {
        if self.ty.get_kind() != TypeKind::TK_SEQUENCE {
            return Err(ReturnCode::Unsupported);
        }
        let bound = self.ty.get_bound().first().copied().unwrap_or(0);
        if bound != 0 && self.values.len() as u32 >= bound {
            return Err(ReturnCode::PreconditionNotMet);
        }
        self.insert_element()
    }

    /// Populate the next array cell, up to the total bound.
    pub fn insert_array_data(&mut self) -> DdsResult<MemberId> {
        if self.ty.get_kind() != TypeKind::TK_ARRAY {
            return Err(ReturnCode::Unsupported);
        }
        if self.values.len() as u64 >= self.ty.get_total_bound() {
            return Err(ReturnCode::PreconditionNotMet);
        }
        self.insert_element()
    }

    /// Insert a default-valued pair under `key`, returning the pair id.
    /// Duplicate keys are rejected.
    pub fn insert_map_data(&mut self, key: DynamicValue) -> DdsResult<MemberId> {
        if self.ty.get_kind() != TypeKind::TK_MAP {
            return Err(ReturnCode::Unsupported);
        }
        let key_ty = self
            .ty
            .get_key_element_type()
            .ok_or(ReturnCode::PreconditionNotMet)?;
        if key.kind() != key_ty.resolved_kind() {
            return Err(ReturnCode::BadParameter);
        }
        if self.map_keys.values().any(|k| *k == key) {
            return Err(ReturnCode::PreconditionNotMet);
        }
        let bound = self.ty.get_bound().first().copied().unwrap_or(0);
        if bound != 0 && self.values.len() as u32 >= bound {
            return Err(ReturnCode::PreconditionNotMet);
        }
        let id = self.insert_element()?;
        self.map_keys.insert(id, key);
        Ok(id)
    }

    /// The key of a map pair.
    pub fn get_map_key(&self, id: MemberId) -> DdsResult<DynamicValue> {
        self.map_keys
            .get(&id)
            .cloned()
            .ok_or(ReturnCode::BadParameter)
    }

    pub fn remove_sequence_data(&mut self, id: MemberId) -> DdsResult<()> {
        self.remove_element(TypeKind::TK_SEQUENCE, id)
    }

    pub fn remove_array_data(&mut self, id: MemberId) -> DdsResult<()> {
        self.remove_element(TypeKind::TK_ARRAY, id)
    }

    pub fn remove_map_data(&mut self, id: MemberId) -> DdsResult<()> {
        self.remove_element(TypeKind::TK_MAP, id)?;
        self.map_keys.remove(&id);
        Ok(())
    }

    /// Renumber remaining collection elements to `0..count`, preserving
    /// their relative order.
    pub fn sort_member_ids(&mut self) -> DdsResult<()> {
        if !matches!(
            self.ty.get_kind(),
            TypeKind::TK_SEQUENCE | TypeKind::TK_ARRAY | TypeKind::TK_MAP
        ) {
            return Err(ReturnCode::Unsupported);
        }
        self.values = std::mem::take(&mut self.values)
            .into_values()
            .enumerate()
            .map(|(i, v)| (i as MemberId, v))
            .collect();
        self.map_keys = std::mem::take(&mut self.map_keys)
            .into_values()
            .enumerate()
            .map(|(i, v)| (i as MemberId, v))
            .collect();
        Ok(())
    }

    // --- clearing -------------------------------------------------------

    /// Reset one member to its default (or drop one collection element).
    pub fn clear_value(&mut self, id: MemberId) -> DdsResult<()> {
        let kind = self.ty.get_kind();
        if matches!(
            kind,
            TypeKind::TK_SEQUENCE | TypeKind::TK_ARRAY | TypeKind::TK_MAP
        ) {
            self.values.remove(&id).ok_or(ReturnCode::BadParameter)?;
            self.map_keys.remove(&id);
            return Ok(());
        }
        let slot = self.canonical_id(id)?;
        if kind == TypeKind::TK_UNION && slot != self.active_union_id {
            // Only the active case holds a value; clearing another case
            // must not populate it.
            return Ok(());
        }
        let ty = self.type_of_slot(slot)?;
        let member_default = if kind.is_aggregate() {
            let member = self.ty.get_member(slot)?;
            if member.is_optional() {
                self.values.remove(&slot);
                self.explicit.remove(&slot);
                return Ok(());
            }
            DynamicValue::from_literal(&ty, &member.descriptor.default_value)
        } else {
            DynamicValue::default_for(&ty)
        };
        let value = member_default.ok_or(ReturnCode::Error)?;
        self.values.insert(slot, value);
        self.explicit.remove(&slot);
        Ok(())
    }

    /// Reset the whole sample to its freshly-created state.
    pub fn clear_all_values(&mut self) -> DdsResult<()> {
        let fresh = Self::new(&self.ty).ok_or(ReturnCode::Error)?;
        self.values = fresh.values;
        self.map_keys.clear();
        self.explicit.clear();
        self.active_union_id = MEMBER_ID_INVALID;
        self.union_label = None;
        Ok(())
    }

    /// Reset every member that does not participate in the key.
    pub fn clear_nonkey_values(&mut self) -> DdsResult<()> {
        if !self.ty.get_kind().is_aggregate() {
            return self.clear_all_values();
        }
        let nonkey: Vec<MemberId> = self
            .ty
            .members()
            .iter()
            .filter(|m| !m.key_annotation())
            .map(|m| m.get_id())
            .collect();
        for id in nonkey {
            self.clear_value(id)?;
        }
        Ok(())
    }

    // --- key / serialization --------------------------------------------

    /// The `(id, resolved kind)` list of key members in declared order.
    /// `NoData` when the type declares no key.
    pub fn get_key_id_and_type(&self) -> DdsResult<&[(MemberId, TypeKind)]> {
        let layout = self.key_layout.get_or_init(|| {
            self.ty
                .members()
                .iter()
                .filter(|m| m.key_annotation())
                .filter_map(|m| {
                    let kind = m.descriptor.ty.as_ref()?.resolved_kind();
                    Some((m.get_id(), kind))
                })
                .collect()
        });
        if layout.is_empty() {
            return Err(ReturnCode::NoData);
        }
        Ok(layout)
    }

    /// Raw big-picture serialization of the whole sample.
    pub fn serialize(&self) -> DdsResult<Vec<u8>> {
        codec::encode::serialize(self).map_err(ReturnCode::from)
    }

    /// Rebuild a sample of `ty` from its serialized form.
    pub fn deserialize(bytes: &[u8], ty: &DynamicType) -> DdsResult<DynamicData> {
        codec::decode::deserialize(bytes, ty).map_err(ReturnCode::from)
    }

    /// Encoded size of [`serialize`](Self::serialize) without allocating
    /// the buffer.
    pub fn get_cdr_serialized_size(&self) -> DdsResult<usize> {
        codec::encode::serialized_size(self).map_err(ReturnCode::from)
    }

    /// Serialize only the key members, in declared order.
    pub fn serialize_key(&self) -> DdsResult<Vec<u8>> {
        codec::key::serialize_key(self).map_err(ReturnCode::from)
    }

    /// The 16-byte instance identity: the raw key bytes zero-padded when
    /// they fit, their MD5 digest otherwise.
    pub fn get_key(&self) -> DdsResult<InstanceHandle> {
        codec::key::key_hash(self).map_err(ReturnCode::from)
    }

    // --- internals ------------------------------------------------------

    pub(crate) fn value_of(&self, id: MemberId) -> Option<&DynamicValue> {
        self.values.get(&id)
    }

    pub(crate) fn element_ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.values.keys().copied()
    }

    pub(crate) fn map_key_of(&self, id: MemberId) -> Option<&DynamicValue> {
        self.map_keys.get(&id)
    }

    pub(crate) fn set_raw(&mut self, id: MemberId, value: DynamicValue) {
        self.values.insert(id, value);
    }

    pub(crate) fn set_raw_map_key(&mut self, id: MemberId, key: DynamicValue) {
        self.map_keys.insert(id, key);
    }

    pub(crate) fn set_active_union_id(&mut self, id: MemberId) {
        self.active_union_id = id;
    }

    pub(crate) fn raw_union_label(&self) -> Option<u64> {
        self.union_label
    }

    pub(crate) fn set_raw_union_label(&mut self, label: u64) {
        self.union_label = Some(label);
    }

    /// Translate the caller-facing id to the storage slot.
    fn canonical_id(&self, id: MemberId) -> DdsResult<MemberId> {
        let kind = self.ty.get_kind();
        if kind.is_aggregate() {
            if id == MEMBER_ID_INVALID {
                return Err(ReturnCode::BadParameter);
            }
            self.ty.get_member(id)?;
            Ok(id)
        } else if matches!(
            kind,
            TypeKind::TK_SEQUENCE | TypeKind::TK_ARRAY | TypeKind::TK_MAP
        ) {
            if id == MEMBER_ID_INVALID {
                return Err(ReturnCode::BadParameter);
            }
            Ok(id)
        } else {
            // Single-value sample: the unnamed slot.
            if id == MEMBER_ID_INVALID || id == 0 {
                Ok(0)
            } else {
                Err(ReturnCode::BadParameter)
            }
        }
    }

    /// The declared type behind a caller-facing id.
    fn slot_type(&self, id: MemberId) -> DdsResult<DynamicType> {
        self.type_of_slot(self.canonical_id(id)?)
    }

    fn type_of_slot(&self, slot: MemberId) -> DdsResult<DynamicType> {
        let kind = self.ty.get_kind();
        if kind.is_aggregate() {
            let member = self.ty.get_member(slot)?;
            member
                .descriptor
                .ty
                .clone()
                .map(|t| t.resolve_alias())
                .ok_or(ReturnCode::Error)
        } else if matches!(
            kind,
            TypeKind::TK_SEQUENCE | TypeKind::TK_ARRAY | TypeKind::TK_MAP
        ) {
            self.ty
                .get_element_type()
                .map(|t| t.resolve_alias())
                .ok_or(ReturnCode::Error)
        } else {
            Ok(self.ty.clone())
        }
    }

    fn missing_slot_code(&self, slot: MemberId) -> ReturnCode {
        if self.ty.get_kind() == TypeKind::TK_UNION && self.active_union_id != slot {
            ReturnCode::PreconditionNotMet
        } else {
            // Known member with no stored value: absent optional.
            ReturnCode::NoData
        }
    }

    fn read_slot(&self, id: MemberId, expected: TypeKind) -> DdsResult<&DynamicValue> {
        let slot = self.canonical_id(id)?;
        let actual = self.type_of_slot(slot)?.get_kind();
        if !kinds_compatible(actual, expected) {
            return Err(ReturnCode::Unsupported);
        }
        self.values.get(&slot).ok_or(self.missing_slot_code(slot))
    }

    fn write_slot(&mut self, id: MemberId, expected: TypeKind, value: DynamicValue) -> DdsResult<()> {
        let slot = self.canonical_id(id)?;
        let actual = self.type_of_slot(slot)?.get_kind();
        if !kinds_compatible(actual, expected) {
            return Err(ReturnCode::Unsupported);
        }
        if matches!(
            self.ty.get_kind(),
            TypeKind::TK_SEQUENCE | TypeKind::TK_ARRAY | TypeKind::TK_MAP
        ) && !self.values.contains_key(&slot)
        {
            // Elements are created by insert_*_data, never by set.
            return Err(ReturnCode::BadParameter);
        }
        self.activate_union_member(slot)?;
        self.values.insert(slot, value);
        if !matches!(
            self.ty.get_kind(),
            TypeKind::TK_SEQUENCE | TypeKind::TK_ARRAY | TypeKind::TK_MAP
        ) {
            self.explicit.insert(slot);
        }
        Ok(())
    }

    /// Setting a union case makes it the active one, dropping the old case
    /// and any explicitly selected discriminator value.
    fn activate_union_member(&mut self, slot: MemberId) -> DdsResult<()> {
        if self.ty.get_kind() == TypeKind::TK_UNION && self.active_union_id != slot {
            self.values.clear();
            self.explicit.clear();
            self.active_union_id = slot;
            self.union_label = None;
        }
        Ok(())
    }

    fn insert_element(&mut self) -> DdsResult<MemberId> {
        let element_ty = self
            .ty
            .get_element_type()
            .ok_or(ReturnCode::PreconditionNotMet)?;
        let value = DynamicValue::default_for(&element_ty).ok_or(ReturnCode::Error)?;
        let id = self
            .values
            .keys()
            .next_back()
            .map_or(0, |last| last + 1);
        self.values.insert(id, value);
        Ok(id)
    }

    fn remove_element(&mut self, kind: TypeKind, id: MemberId) -> DdsResult<()> {
        if self.ty.get_kind() != kind {
            return Err(ReturnCode::Unsupported);
        }
        self.values.remove(&id).ok_or(ReturnCode::BadParameter)?;
        Ok(())
    }
}

impl PartialEq for DynamicData {
    fn eq(&self, other: &Self) -> bool {
        self.ty.equals(&other.ty)
            && self.values == other.values
            && self.map_keys == other.map_keys
            && self.active_union_id == other.active_union_id
    }
}

/// Byte and uint8 accessors are interchangeable; everything else is exact.
fn kinds_compatible(actual: TypeKind, expected: TypeKind) -> bool {
    if actual == expected {
        return true;
    }
    matches!(
        (actual, expected),
        (TypeKind::TK_BYTE, TypeKind::TK_UINT8) | (TypeKind::TK_UINT8, TypeKind::TK_BYTE)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{DynamicDataFactory, DynamicTypeBuilderFactory};

    fn type_factory() -> &'static DynamicTypeBuilderFactory {
        DynamicTypeBuilderFactory::get_instance()
    }

    fn prim(kind: TypeKind) -> DynamicType {
        type_factory().get_primitive_type(kind).expect("primitive")
    }

    fn point_type() -> DynamicType {
        let mut b = type_factory().create_struct_builder("Point").expect("b");
        b.add_member(Some(0), "x", prim(TypeKind::TK_INT32)).expect("x");
        b.add_member(Some(1), "y", prim(TypeKind::TK_INT32)).expect("y");
        b.build().expect("build")
    }

    fn data_for(ty: &DynamicType) -> DynamicData {
        DynamicDataFactory::get_instance()
            .create_data(ty)
            .expect("data")
    }

    #[test]
    fn test_struct_round_trip_and_kind_mismatch() {
        let mut d = data_for(&point_type());
        d.set_i32(3, 0).expect("set");
        assert_eq!(d.get_i32(0), Ok(3));
        // Wrong kind on a known member.
        assert_eq!(d.get_f32(0), Err(ReturnCode::Unsupported));
        // Unknown member id.
        assert_eq!(d.set_i32(1, 9), Err(ReturnCode::BadParameter));
        // Failure left the value untouched.
        assert_eq!(d.get_i32(0), Ok(3));
    }

    #[test]
    fn test_single_value_sample() {
        let mut d = data_for(&prim(TypeKind::TK_UINT16));
        d.set_u16(500, MEMBER_ID_INVALID).expect("set");
        assert_eq!(d.get_u16(MEMBER_ID_INVALID), Ok(500));
        assert_eq!(d.get_u16(3), Err(ReturnCode::BadParameter));
    }

    #[test]
    fn test_union_discriminator_resolution() {
        let f = type_factory();
        let mut b = f
            .create_union_builder("U", prim(TypeKind::TK_INT32))
            .expect("b");
        b.add_union_member(Some(1), "a", prim(TypeKind::TK_INT32), &[10, 11], false)
            .expect("a");
        b.add_union_member(Some(2), "b", prim(TypeKind::TK_FLOAT64), &[20], false)
            .expect("b");
        let ty = b.build().expect("build");
        let mut d = data_for(&ty);

        assert_eq!(d.get_union_id(), MEMBER_ID_INVALID);
        d.set_discriminator_value(11).expect("select");
        assert_eq!(d.get_union_id(), 1);
        // The caller's discriminator value is kept, not the first label.
        assert_eq!(d.get_union_label(), Ok(11));
        d.set_discriminator_value(10).expect("reselect");
        assert_eq!(d.get_union_label(), Ok(10));
        // No case and no default.
        assert_eq!(d.set_discriminator_value(99), Err(ReturnCode::BadParameter));
        assert_eq!(d.get_union_id(), 1);
        assert_eq!(d.get_union_label(), Ok(10));

        // Setting a member activates it; with no explicit discriminator
        // the label falls back to the member's first declared one.
        d.set_f64(2.5, 2).expect("set");
        assert_eq!(d.get_union_id(), 2);
        assert_eq!(d.get_union_label(), Ok(20));
        // The previous case is gone.
        assert_eq!(d.get_i32(1), Err(ReturnCode::PreconditionNotMet));
    }

    #[test]
    fn test_union_default_member_fallback() {
        let f = type_factory();
        let mut b = f
            .create_union_builder("U", prim(TypeKind::TK_INT32))
            .expect("b");
        b.add_union_member(Some(1), "a", prim(TypeKind::TK_INT32), &[1], false)
            .expect("a");
        b.add_union_member(Some(2), "other", prim(TypeKind::TK_INT32), &[], true)
            .expect("other");
        let ty = b.build().expect("build");
        let mut d = data_for(&ty);
        d.set_discriminator_value(42).expect("select default");
        assert_eq!(d.get_union_id(), 2);
        assert_eq!(d.get_union_label(), Ok(42));

        // Activating the default case by writing it leaves no label.
        let mut d = data_for(&ty);
        d.set_i32(5, 2).expect("set");
        assert_eq!(d.get_union_id(), 2);
        assert_eq!(d.get_union_label(), Err(ReturnCode::NoData));
    }

    #[test]
    fn test_union_clear_inactive_case_is_noop() {
        let f = type_factory();
        let mut b = f
            .create_union_builder("U", prim(TypeKind::TK_INT32))
            .expect("b");
        b.add_union_member(Some(1), "a", prim(TypeKind::TK_INT32), &[1], false)
            .expect("a");
        b.add_union_member(Some(2), "b", prim(TypeKind::TK_INT32), &[2], false)
            .expect("b");
        let ty = b.build().expect("build");
        let mut d = data_for(&ty);
        d.set_discriminator_value(1).expect("select");
        d.set_i32(7, 1).expect("set");

        // Clearing the inactive case must not populate it.
        d.clear_value(2).expect("clear");
        assert_eq!(d.get_item_count(), 1);
        assert_eq!(d.get_union_id(), 1);
        assert_eq!(d.get_i32(1), Ok(7));

        // Clearing the active case resets it in place.
        d.clear_value(1).expect("clear");
        assert_eq!(d.get_item_count(), 1);
        assert_eq!(d.get_i32(1), Ok(0));
    }

    #[test]
    fn test_sequence_insert_remove_renumber() {
        let f = type_factory();
        let seq = f
            .create_sequence_type(prim(TypeKind::TK_INT32), 0)
            .expect("seq");
        let mut d = data_for(&seq);
        for v in [10, 20, 30] {
            let id = d.insert_sequence_data().expect("insert");
            d.set_i32(v, id).expect("set");
        }
        d.remove_sequence_data(1).expect("remove");
        d.sort_member_ids().expect("sort");
        assert_eq!(d.get_item_count(), 2);
        assert_eq!(d.get_i32(0), Ok(10));
        assert_eq!(d.get_i32(1), Ok(30));
    }

    #[test]
    fn test_sequence_bound_enforced() {
        let f = type_factory();
        let seq = f
            .create_sequence_type(prim(TypeKind::TK_INT32), 2)
            .expect("seq");
        let mut d = data_for(&seq);
        d.insert_sequence_data().expect("0");
        d.insert_sequence_data().expect("1");
        assert_eq!(d.insert_sequence_data(), Err(ReturnCode::PreconditionNotMet));
    }

    #[test]
    fn test_map_duplicate_key_rejected() {
        let f = type_factory();
        let map = f
            .create_map_type(
                prim(TypeKind::TK_INT32),
                f.create_string_type(0).expect("string"),
                0,
            )
            .expect("map");
        let mut d = data_for(&map);
        let id = d.insert_map_data(DynamicValue::I32(7)).expect("pair");
        d.set_string("seven".to_string(), id).expect("set");
        assert_eq!(
            d.insert_map_data(DynamicValue::I32(7)),
            Err(ReturnCode::PreconditionNotMet)
        );
        assert_eq!(d.get_map_key(id), Ok(DynamicValue::I32(7)));
    }

    #[test]
    fn test_descriptor_snapshot_tracks_is_set() {
        let mut d = data_for(&point_type());
        // Seeded defaults are not "set".
        assert!(!d.get_descriptor(0).expect("d").is_set);
        d.set_i32(3, 0).expect("set");
        assert!(d.get_descriptor(0).expect("d").is_set);
        assert!(!d.get_descriptor(1).expect("d").is_set);
        // Clearing returns the member to its default state.
        d.clear_value(0).expect("clear");
        assert!(!d.get_descriptor(0).expect("d").is_set);
        assert_eq!(d.get_descriptor(9).map(|_| ()), Err(ReturnCode::BadParameter));
    }

    #[test]
    fn test_loan_exclusivity() {
        let f = type_factory();
        let mut b = f.create_struct_builder("Outer").expect("b");
        b.add_member(Some(0), "inner", point_type()).expect("inner");
        b.add_member(Some(1), "other", point_type()).expect("other");
        let ty = b.build().expect("build");
        let mut d = data_for(&ty);

        let mut inner = d.loan_value(0).expect("loan");
        assert_eq!(d.loan_value(1).map(|_| ()), Err(ReturnCode::PreconditionNotMet));
        inner.set_i32(9, 0).expect("set");
        d.return_loaned_value(inner).expect("return");
        let again = d.loan_value(1).expect("second loan");
        d.return_loaned_value(again).expect("return");
        assert_eq!(d.get_complex_value(0).expect("inner").get_i32(0), Ok(9));
    }

    #[test]
    fn test_enum_accessors() {
        let f = type_factory();
        let mut b = f.create_enum_builder("Color").expect("b");
        for name in ["A", "B", "C"] {
            b.add_enum_literal(name).expect("literal");
        }
        let ty = b.build().expect("build");
        let mut d = data_for(&ty);
        d.set_enum_string("B", MEMBER_ID_INVALID).expect("set");
        assert_eq!(d.get_enum_value(MEMBER_ID_INVALID), Ok(1));
        assert_eq!(d.get_enum_string(MEMBER_ID_INVALID), Ok("B".to_string()));
        // Out-of-range literal value.
        assert_eq!(d.set_enum_value(5, MEMBER_ID_INVALID), Err(ReturnCode::BadParameter));
    }

    #[test]
    fn test_bitmask_flags() {
        let f = type_factory();
        let mut b = f.create_bitmask_builder("Flags", 8).expect("b");
        b.add_bitmask_flag("READ").expect("f");
        b.add_bitmask_flag("WRITE").expect("f");
        let ty = b.build().expect("build");
        let mut d = data_for(&ty);
        d.set_flag("WRITE", true).expect("set");
        assert_eq!(d.get_flag("WRITE"), Ok(true));
        assert_eq!(d.get_flag("READ"), Ok(false));
        assert_eq!(d.get_bitmask_value(MEMBER_ID_INVALID), Ok(0b10));
        // Bits beyond the bound are rejected.
        assert_eq!(
            d.set_bitmask_value(0x100, MEMBER_ID_INVALID),
            Err(ReturnCode::BadParameter)
        );
    }

    #[test]
    fn test_optional_member_absent() {
        let f = type_factory();
        let mut b = f.create_struct_builder("Opt").expect("b");
        b.add_member(Some(0), "always", prim(TypeKind::TK_INT32)).expect("m");
        b.add_member(Some(1), "maybe", prim(TypeKind::TK_INT32)).expect("m");
        let opt = crate::factory::AnnotationFactory::get_instance()
            .create_annotation(crate::descriptor::ANNOTATION_OPTIONAL)
            .expect("opt");
        b.apply_annotation_to_member(1, opt).expect("apply");
        let ty = b.build().expect("build");
        let mut d = data_for(&ty);
        assert_eq!(d.get_i32(1), Err(ReturnCode::NoData));
        d.set_i32(5, 1).expect("set");
        assert_eq!(d.get_i32(1), Ok(5));
        d.clear_value(1).expect("clear");
        assert_eq!(d.get_i32(1), Err(ReturnCode::NoData));
    }

    #[test]
    fn test_clear_nonkey_values() {
        let f = type_factory();
        let mut b = f.create_struct_builder("Keyed").expect("b");
        b.add_member(Some(0), "id", prim(TypeKind::TK_INT32)).expect("m");
        b.add_member(Some(1), "payload", prim(TypeKind::TK_INT32)).expect("m");
        let key = crate::factory::AnnotationFactory::get_instance()
            .create_annotation(crate::descriptor::ANNOTATION_KEY)
            .expect("key");
        b.apply_annotation_to_member(0, key).expect("apply");
        let ty = b.build().expect("build");
        let mut d = data_for(&ty);
        d.set_i32(7, 0).expect("set");
        d.set_i32(99, 1).expect("set");
        d.clear_nonkey_values().expect("clear");
        assert_eq!(d.get_i32(0), Ok(7));
        assert_eq!(d.get_i32(1), Ok(0));
    }
}
