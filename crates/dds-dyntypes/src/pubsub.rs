// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Topic-type adapter for the entity layer.
//!
//! Writers and readers hold one [`DynamicPubSubType`] per topic and call
//! through it instead of touching the codec directly. The adapter pins the
//! topic's type, so serializing a sample bound to a different type is a
//! caller error, not silent corruption.

use crate::codec::key::InstanceHandle;
use crate::codec::type_tag;
use crate::data::DynamicData;
use crate::error::{DdsResult, ReturnCode};
use crate::types::DynamicType;

/// Bridges one [`DynamicType`] to the topic-data-type surface the entity
/// layer expects.
#[derive(Clone)]
pub struct DynamicPubSubType {
    ty: DynamicType,
}

impl DynamicPubSubType {
    pub fn new(ty: DynamicType) -> Self {
        Self { ty }
    }

    pub fn get_dynamic_type(&self) -> &DynamicType {
        &self.ty
    }

    pub fn get_name(&self) -> &str {
        self.ty.name()
    }

    /// Whether samples of this type carry an instance key.
    pub fn is_with_key(&self) -> bool {
        self.ty.is_key_defined()
    }

    /// Encode a sample of this topic's type.
    pub fn serialize(&self, data: &DynamicData) -> DdsResult<Vec<u8>> {
        self.check_type(data)?;
        data.serialize()
    }

    /// Decode a received payload into a sample of this topic's type.
    pub fn deserialize(&self, bytes: &[u8]) -> DdsResult<DynamicData> {
        DynamicData::deserialize(bytes, &self.ty)
    }

    pub fn get_serialized_size(&self, data: &DynamicData) -> DdsResult<usize> {
        self.check_type(data)?;
        data.get_cdr_serialized_size()
    }

    /// The sample's 16-byte instance identity.
    pub fn get_key(&self, data: &DynamicData) -> DdsResult<InstanceHandle> {
        self.check_type(data)?;
        data.get_key()
    }

    /// The compact wire identifier of this topic's type.
    pub fn type_tag(&self) -> DdsResult<Vec<u8>> {
        type_tag::type_tag(&self.ty).map_err(ReturnCode::from)
    }

    fn check_type(&self, data: &DynamicData) -> DdsResult<()> {
        if !self.ty.equals(data.get_type()) {
            log::debug!(
                "sample of '{}' offered to topic type '{}'",
                data.type_name(),
                self.ty.name()
            );
            return Err(ReturnCode::PreconditionNotMet);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ANNOTATION_KEY;
    use crate::factory::{AnnotationFactory, DynamicDataFactory, DynamicTypeBuilderFactory};
    use crate::kind::TypeKind;

    fn reading_type() -> DynamicType {
        let f = DynamicTypeBuilderFactory::get_instance();
        let mut b = f.create_struct_builder("SensorReading").expect("b");
        let u32_ty = f.get_primitive_type(TypeKind::TK_UINT32).expect("ty");
        let f64_ty = f.get_primitive_type(TypeKind::TK_FLOAT64).expect("ty");
        b.add_member(Some(0), "sensor_id", u32_ty).expect("m");
        b.add_member(Some(1), "value", f64_ty).expect("m");
        let key = AnnotationFactory::get_instance()
            .create_annotation(ANNOTATION_KEY)
            .expect("key");
        b.apply_annotation_to_member(0, key).expect("apply");
        b.build().expect("build")
    }

    #[test]
    fn test_round_trip_through_adapter() {
        let ty = reading_type();
        let adapter = DynamicPubSubType::new(ty.clone());
        assert!(adapter.is_with_key());

        let mut sample = DynamicDataFactory::get_instance().create_data(&ty).expect("d");
        sample.set_u32(42, 0).expect("set");
        sample.set_f64(23.5, 1).expect("set");

        let bytes = adapter.serialize(&sample).expect("ser");
        assert_eq!(bytes.len(), adapter.get_serialized_size(&sample).expect("size"));
        let back = adapter.deserialize(&bytes).expect("de");
        assert_eq!(back.get_u32(0), Ok(42));
        assert_eq!(back.get_f64(1), Ok(23.5));
        assert_eq!(adapter.get_key(&sample), adapter.get_key(&back));
    }

    #[test]
    fn test_foreign_sample_rejected() {
        let adapter = DynamicPubSubType::new(reading_type());
        let f = DynamicTypeBuilderFactory::get_instance();
        let other_ty = f.get_primitive_type(TypeKind::TK_INT32).expect("ty");
        let other = DynamicDataFactory::get_instance()
            .create_data(&other_ty)
            .expect("d");
        assert_eq!(
            adapter.serialize(&other),
            Err(ReturnCode::PreconditionNotMet)
        );
    }
}
