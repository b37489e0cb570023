// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide factories.
//!
//! Each factory is a lazily-initialized global behind a mutex-guarded
//! registry. `delete_instance` tears the registry down; a later
//! `get_instance` transparently recreates it, so the pair can be called
//! in any order across the process lifetime.
//!
//! `create_*` operations signal "could not construct" by returning `None`;
//! there is no receiver object to attach a result code to.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::data::DynamicData;
use crate::descriptor::{
    AnnotationDescriptor, TypeDescriptor, ANNOTATION_BIT_BOUND, ANNOTATION_DEFAULT,
    ANNOTATION_EXTENSIBILITY, ANNOTATION_ID, ANNOTATION_KEY, ANNOTATION_OPTIONAL,
    ANNOTATION_POSITION, ANNOTATION_VALUE_ATTR,
};
use crate::kind::TypeKind;
use crate::types::{DynamicType, DynamicTypeBuilder};

/// Default bit bound of a bitmask when the caller passes 0.
const DEFAULT_BITMASK_BOUND: u32 = 32;

// ---------------------------------------------------------------------------
// DynamicTypeBuilderFactory
// ---------------------------------------------------------------------------

/// Entry point for building types: kind-specific builder constructors plus
/// direct constructors for member-less types (primitives, strings,
/// collections, aliases). Primitive types are cached so repeated lookups
/// share one instance.
pub struct DynamicTypeBuilderFactory {
    primitives: Mutex<Option<BTreeMap<u8, DynamicType>>>,
}

impl DynamicTypeBuilderFactory {
    pub fn get_instance() -> &'static Self {
        static INSTANCE: OnceLock<DynamicTypeBuilderFactory> = OnceLock::new();
        INSTANCE.get_or_init(|| DynamicTypeBuilderFactory {
            primitives: Mutex::new(None),
        })
    }

    /// Drop the factory's cached state. A later `get_instance` starts fresh.
    pub fn delete_instance() {
        *Self::get_instance().primitives.lock() = None;
        log::debug!("type builder factory deleted");
    }

    /// The shared, cached type object for a primitive kind.
    pub fn get_primitive_type(&self, kind: TypeKind) -> Option<DynamicType> {
        if !kind.is_primitive() {
            return None;
        }
        let mut cache = self.primitives.lock();
        let cache = cache.get_or_insert_with(BTreeMap::new);
        let ty = cache.entry(kind.to_u8()).or_insert_with(|| {
            let name = primitive_name(kind);
            DynamicType::from_parts(TypeDescriptor::new(kind, name), Vec::new(), Vec::new())
        });
        Some(ty.clone())
    }

    pub fn create_struct_builder(&self, name: &str) -> Option<DynamicTypeBuilder> {
        self.create_type_builder(TypeDescriptor::new(TypeKind::TK_STRUCTURE, name))
    }

    pub fn create_union_builder(
        &self,
        name: &str,
        discriminator: DynamicType,
    ) -> Option<DynamicTypeBuilder> {
        let mut descriptor = TypeDescriptor::new(TypeKind::TK_UNION, name);
        descriptor.discriminator_type = Some(discriminator);
        self.create_type_builder(descriptor)
    }

    pub fn create_enum_builder(&self, name: &str) -> Option<DynamicTypeBuilder> {
        self.create_type_builder(TypeDescriptor::new(TypeKind::TK_ENUM, name))
    }

    /// `bound` is the flag count (1..=64); 0 selects the default of 32.
    pub fn create_bitmask_builder(&self, name: &str, bound: u32) -> Option<DynamicTypeBuilder> {
        let mut descriptor = TypeDescriptor::new(TypeKind::TK_BITMASK, name);
        descriptor.bound = vec![if bound == 0 { DEFAULT_BITMASK_BOUND } else { bound }];
        descriptor.element_type = self.get_primitive_type(TypeKind::TK_BOOLEAN);
        self.create_type_builder(descriptor)
    }

    pub fn create_bitset_builder(&self, name: &str) -> Option<DynamicTypeBuilder> {
        self.create_type_builder(TypeDescriptor::new(TypeKind::TK_BITSET, name))
    }

    pub fn create_annotation_builder(&self, name: &str) -> Option<DynamicTypeBuilder> {
        self.create_type_builder(TypeDescriptor::new(TypeKind::TK_ANNOTATION, name))
    }

    /// Builder for an arbitrary (consistent) descriptor.
    pub fn create_type_builder(&self, descriptor: TypeDescriptor) -> Option<DynamicTypeBuilder> {
        DynamicTypeBuilder::from_descriptor(descriptor).ok()
    }

    /// Directly build a member-less type from a consistent descriptor.
    pub fn create_type(&self, descriptor: TypeDescriptor) -> Option<DynamicType> {
        self.create_type_builder(descriptor)?.build().ok()
    }

    /// `bound` 0 means unbounded.
    pub fn create_string_type(&self, bound: u32) -> Option<DynamicType> {
        self.string_descriptor(TypeKind::TK_STRING8, TypeKind::TK_CHAR8, "string", bound)
    }

    pub fn create_wstring_type(&self, bound: u32) -> Option<DynamicType> {
        self.string_descriptor(TypeKind::TK_STRING16, TypeKind::TK_CHAR16, "wstring", bound)
    }

    pub fn create_sequence_type(&self, element: DynamicType, bound: u32) -> Option<DynamicType> {
        let name = format!("sequence<{}>", element.name());
        let mut descriptor = TypeDescriptor::new(TypeKind::TK_SEQUENCE, &name);
        descriptor.element_type = Some(element);
        if bound > 0 {
            descriptor.bound = vec![bound];
        }
        self.create_type(descriptor)
    }

    /// Every dimension bound must be nonzero.
    pub fn create_array_type(&self, element: DynamicType, bounds: &[u32]) -> Option<DynamicType> {
        if bounds.is_empty() || bounds.contains(&0) {
            return None;
        }
        let name = format!("array<{}>", element.name());
        let mut descriptor = TypeDescriptor::new(TypeKind::TK_ARRAY, &name);
        descriptor.element_type = Some(element);
        descriptor.bound = bounds.to_vec();
        self.create_type(descriptor)
    }

    pub fn create_map_type(
        &self,
        key: DynamicType,
        value: DynamicType,
        bound: u32,
    ) -> Option<DynamicType> {
        let name = format!("map<{},{}>", key.name(), value.name());
        let mut descriptor = TypeDescriptor::new(TypeKind::TK_MAP, &name);
        descriptor.key_element_type = Some(key);
        descriptor.element_type = Some(value);
        if bound > 0 {
            descriptor.bound = vec![bound];
        }
        self.create_type(descriptor)
    }

    pub fn create_alias_type(&self, name: &str, base: DynamicType) -> Option<DynamicType> {
        let mut descriptor = TypeDescriptor::new(TypeKind::TK_ALIAS, name);
        descriptor.base_type = Some(base);
        self.create_type(descriptor)
    }

    fn string_descriptor(
        &self,
        kind: TypeKind,
        char_kind: TypeKind,
        stem: &str,
        bound: u32,
    ) -> Option<DynamicType> {
        let name = if bound == 0 {
            stem.to_string()
        } else {
            format!("{}<{}>", stem, bound)
        };
        let mut descriptor = TypeDescriptor::new(kind, &name);
        descriptor.element_type = self.get_primitive_type(char_kind);
        if bound > 0 {
            descriptor.bound = vec![bound];
        }
        self.create_type(descriptor)
    }
}

fn primitive_name(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::TK_BOOLEAN => "boolean",
        TypeKind::TK_BYTE => "byte",
        TypeKind::TK_INT8 => "int8",
        TypeKind::TK_INT16 => "int16",
        TypeKind::TK_INT32 => "int32",
        TypeKind::TK_INT64 => "int64",
        TypeKind::TK_UINT8 => "uint8",
        TypeKind::TK_UINT16 => "uint16",
        TypeKind::TK_UINT32 => "uint32",
        TypeKind::TK_UINT64 => "uint64",
        TypeKind::TK_FLOAT32 => "float32",
        TypeKind::TK_FLOAT64 => "float64",
        TypeKind::TK_FLOAT128 => "float128",
        TypeKind::TK_CHAR8 => "char8",
        TypeKind::TK_CHAR16 => "char16",
        _ => "unknown",
    }
}

// ---------------------------------------------------------------------------
// DynamicDataFactory
// ---------------------------------------------------------------------------

/// Constructs data samples bound to a type.
pub struct DynamicDataFactory {
    _private: (),
}

impl DynamicDataFactory {
    pub fn get_instance() -> &'static Self {
        static INSTANCE: OnceLock<DynamicDataFactory> = OnceLock::new();
        INSTANCE.get_or_init(|| DynamicDataFactory { _private: () })
    }

    pub fn delete_instance() {
        log::debug!("data factory deleted");
    }

    /// A fresh default-valued sample, or `None` for an inconsistent type.
    pub fn create_data(&self, ty: &DynamicType) -> Option<DynamicData> {
        if !ty.is_consistent() {
            log::debug!("create_data rejected inconsistent type '{}'", ty.name());
            return None;
        }
        DynamicData::new(ty)
    }

    /// Release a sample. Present for API symmetry; ownership rules already
    /// free it on drop.
    pub fn delete_data(&self, data: DynamicData) {
        log::trace!("deleting data sample of '{}'", data.type_name());
        drop(data);
    }
}

// ---------------------------------------------------------------------------
// AnnotationFactory
// ---------------------------------------------------------------------------

/// Hands out descriptors for the builtin annotations (`@key`, `@optional`,
/// `@id`, `@default`, `@extensibility`, ...). The backing annotation types
/// are built once and pooled.
pub struct AnnotationFactory {
    pool: Mutex<Option<BTreeMap<&'static str, DynamicType>>>,
}

impl AnnotationFactory {
    pub fn get_instance() -> &'static Self {
        static INSTANCE: OnceLock<AnnotationFactory> = OnceLock::new();
        INSTANCE.get_or_init(|| AnnotationFactory {
            pool: Mutex::new(None),
        })
    }

    pub fn delete_instance() {
        *Self::get_instance().pool.lock() = None;
        log::debug!("annotation factory deleted");
    }

    /// A descriptor for a builtin annotation; `None` for unknown names.
    pub fn create_annotation(&self, name: &str) -> Option<AnnotationDescriptor> {
        let mut pool = self.pool.lock();
        let pool = pool.get_or_insert_with(builtin_annotation_types);
        let ty = pool.get(name)?;
        Some(AnnotationDescriptor::new(ty.clone()))
    }
}

/// Build the builtin annotation type pool. Marker annotations carry no
/// attributes; parameterized ones declare a single `value` attribute.
fn builtin_annotation_types() -> BTreeMap<&'static str, DynamicType> {
    let types = DynamicTypeBuilderFactory::get_instance();
    let u32_ty = types.get_primitive_type(TypeKind::TK_UINT32);
    let string_ty = types.create_string_type(0);

    let marker = |name: &str| -> Option<DynamicType> {
        types.create_annotation_builder(name)?.build().ok()
    };
    let with_value = |name: &str, value_ty: Option<&DynamicType>| -> Option<DynamicType> {
        let mut builder = types.create_annotation_builder(name)?;
        builder
            .add_member(None, ANNOTATION_VALUE_ATTR, value_ty?.clone())
            .ok()?;
        builder.build().ok()
    };

    let mut pool = BTreeMap::new();
    let entries: [(&'static str, Option<DynamicType>); 7] = [
        (ANNOTATION_KEY, marker(ANNOTATION_KEY)),
        (ANNOTATION_OPTIONAL, marker(ANNOTATION_OPTIONAL)),
        (ANNOTATION_ID, with_value(ANNOTATION_ID, u32_ty.as_ref())),
        (
            ANNOTATION_BIT_BOUND,
            with_value(ANNOTATION_BIT_BOUND, u32_ty.as_ref()),
        ),
        (
            ANNOTATION_POSITION,
            with_value(ANNOTATION_POSITION, u32_ty.as_ref()),
        ),
        (
            ANNOTATION_DEFAULT,
            with_value(ANNOTATION_DEFAULT, string_ty.as_ref()),
        ),
        (
            ANNOTATION_EXTENSIBILITY,
            with_value(ANNOTATION_EXTENSIBILITY, string_ty.as_ref()),
        ),
    ];
    for (name, ty) in entries {
        if let Some(ty) = ty {
            pool.insert(name, ty);
        }
    }
    log::debug!("annotation pool initialized with {} builtins", pool.len());
    pool
}
