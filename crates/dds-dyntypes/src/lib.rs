// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # dds-dyntypes - Dynamic Types for DDS
//!
//! Runtime-introspectable type system, generic data containers and CDR wire
//! codec for publish-subscribe middleware. Participants describe structured
//! record types at run time, build values conforming to them, extract stable
//! instance identities (keys) and exchange byte-exact wire payloads with
//! peers built against a different compiled schema.
//!
//! ## Quick Start
//!
//! ```rust
//! use dds_dyntypes::factory::DynamicTypeBuilderFactory;
//! use dds_dyntypes::factory::DynamicDataFactory;
//! use dds_dyntypes::TypeKind;
//!
//! let factory = DynamicTypeBuilderFactory::get_instance();
//! let mut builder = factory.create_struct_builder("SensorReading").unwrap();
//! let u32_ty = factory.get_primitive_type(TypeKind::TK_UINT32).unwrap();
//! let f64_ty = factory.get_primitive_type(TypeKind::TK_FLOAT64).unwrap();
//! builder.add_member(None, "sensor_id", u32_ty).unwrap();
//! builder.add_member(None, "temperature", f64_ty).unwrap();
//! let reading = builder.build().unwrap();
//!
//! let mut data = DynamicDataFactory::get_instance()
//!     .create_data(&reading)
//!     .unwrap();
//! data.set_u32(42, 0).unwrap();
//! data.set_f64(23.5, 1).unwrap();
//! assert_eq!(data.get_f64(1).unwrap(), 23.5);
//!
//! let bytes = data.serialize().unwrap();
//! let back = dds_dyntypes::DynamicData::deserialize(&bytes, &reading).unwrap();
//! assert_eq!(back.get_u32(0).unwrap(), 42);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                 Entity layer (out of scope)                  |
//! |    DynamicPubSubType: serialize / deserialize / get_key      |
//! +--------------------------------------------------------------+
//! |  DynamicData  <- bound 1:1 ->  DynamicType  <- build() --+   |
//! |  typed accessors, unions,      immutable graph,          |   |
//! |  collections, loans, keys      members by id/name        |   |
//! |                                          DynamicTypeBuilder  |
//! +--------------------------------------------------------------+
//! |   Descriptors (Type / Member / Annotation): pure values      |
//! +--------------------------------------------------------------+
//! |   CDR codec: cursors, typeless + identified member encoding, |
//! |   compact type tags, 16-byte key folding (MD5)               |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`kind`] - the closed `TypeKind` enumeration (XTypes wire values)
//! - [`descriptor`] - Type/Member/Annotation descriptor value objects
//! - [`types`] - `DynamicType`, `DynamicTypeMember`, `DynamicTypeBuilder`
//! - [`data`] - `DynamicData` container and the `DynamicValue` variant
//! - [`codec`] - CDR cursors, encode/decode, type tags, key extraction
//! - [`factory`] - process-wide builder/data/annotation factories
//! - [`pubsub`] - the adapter surface consumed by the entity layer
//!
//! ## See Also
//!
//! - [DDS XTypes](https://www.omg.org/spec/DDS-XTypes/1.3/)
//! - [DDS Specification](https://www.omg.org/spec/DDS/1.4/)

/// CDR codec: cursors, encode/decode, compact type tags, key extraction.
pub mod codec;
/// DynamicData container and the closed DynamicValue variant.
pub mod data;
/// Type, member and annotation descriptor value objects.
pub mod descriptor;
/// Result-code taxonomy shared by every fallible operation.
pub mod error;
/// Process-wide type-builder, data and annotation factories.
pub mod factory;
/// The closed TypeKind enumeration.
pub mod kind;
/// Entity-facing adapter surface (serialize/deserialize/get_key).
pub mod pubsub;
/// Immutable type graph and its construction-time builder.
pub mod types;

pub use codec::InstanceHandle;
pub use data::{DynamicData, DynamicValue};
pub use descriptor::{AnnotationDescriptor, Extensibility, MemberDescriptor, TypeDescriptor};
pub use error::{DdsResult, ReturnCode};
pub use factory::{AnnotationFactory, DynamicDataFactory, DynamicTypeBuilderFactory};
pub use kind::TypeKind;
pub use pubsub::DynamicPubSubType;
pub use types::{DynamicType, DynamicTypeBuilder, DynamicTypeMember};

/// Stable numeric identifier of a member within its owning type.
pub type MemberId = u32;

/// Sentinel member id: "no member" / "the single unnamed value".
///
/// Matches the 28-bit member-id space used by the identified (mutable)
/// member encoding; wire member ids never reach this value.
pub const MEMBER_ID_INVALID: MemberId = 0x0FFF_FFFF;

/// Size in bytes of an instance identity handle.
pub const KEY_HASH_LENGTH: usize = 16;

#[cfg(test)]
mod tests;
