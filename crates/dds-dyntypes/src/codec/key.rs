// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Key serialization and instance identity.
//!
//! The raw key is the typeless serialization of the `@key` members in
//! declaration order. A raw key of at most 16 bytes is the identity
//! verbatim (zero-padded); anything longer is folded through MD5 so large
//! or composite keys still get a fixed-size handle.

use md5::{Digest, Md5};

use crate::codec::cursor::Writer;
use crate::codec::encode::{encode_slot, member_type};
use crate::codec::{CodecError, CodecResult};
use crate::data::{DynamicData, DynamicValue};
use crate::KEY_HASH_LENGTH;

/// 16-byte instance identity derived from a sample's key members.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InstanceHandle([u8; KEY_HASH_LENGTH]);

impl InstanceHandle {
    pub const NIL: InstanceHandle = InstanceHandle([0u8; KEY_HASH_LENGTH]);

    pub fn from_bytes(bytes: [u8; KEY_HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_HASH_LENGTH] {
        &self.0
    }
}

impl std::fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InstanceHandle({})", self)
    }
}

/// Serialize only the key members, in declaration order.
pub fn serialize_key(data: &DynamicData) -> CodecResult<Vec<u8>> {
    let mut w = Writer::new();
    encode_key_members(&mut w, data)?;
    Ok(w.into_vec())
}

/// The instance identity: raw key bytes when they fit, MD5 fold otherwise.
pub fn key_hash(data: &DynamicData) -> CodecResult<InstanceHandle> {
    let raw = serialize_key(data)?;
    let mut handle = [0u8; KEY_HASH_LENGTH];
    if raw.len() <= KEY_HASH_LENGTH {
        handle[..raw.len()].copy_from_slice(&raw);
    } else {
        handle.copy_from_slice(&Md5::digest(&raw));
    }
    Ok(InstanceHandle::from_bytes(handle))
}

fn encode_key_members(w: &mut Writer, data: &DynamicData) -> CodecResult<()> {
    let ty = data.get_type().clone();
    if !ty.get_kind().is_aggregate() {
        return Err(CodecError::NoKey);
    }
    let mut found = false;
    for member in ty.members() {
        if !member.key_annotation() {
            continue;
        }
        found = true;
        let member_ty = member_type(member)?;
        let value = match data.value_of(member.get_id()) {
            Some(value) => value.clone(),
            None => DynamicValue::from_literal(&member_ty, &member.get_descriptor().default_value)
                .ok_or(CodecError::UnsupportedKind(member_ty.get_kind()))?,
        };
        // A nested aggregate contributes its own key members only.
        match &value {
            DynamicValue::Complex(nested) if nested.get_type().is_key_defined() => {
                encode_key_members(w, nested)?;
            }
            _ => encode_slot(w, &value, &member_ty)?,
        }
    }
    if !found {
        return Err(CodecError::NoKey);
    }
    Ok(())
}
