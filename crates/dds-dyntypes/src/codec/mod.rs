// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CDR wire codec for [`DynamicData`](crate::data::DynamicData).
//!
//! Little-endian XCDR2-style encoding. FINAL aggregates serialize members
//! typelessly in declaration order; APPENDABLE adds a DHEADER delimiter;
//! MUTABLE prefixes each member with an EMHEADER carrying its id and
//! length, so unknown members can be skipped on read.

pub mod cursor;
pub mod decode;
pub mod encode;
pub mod key;
pub mod type_tag;

pub use key::InstanceHandle;

use crate::error::ReturnCode;
use crate::kind::TypeKind;

/// Errors raised while encoding or decoding a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    WriteFailed { offset: usize, reason: String },
    ReadFailed { offset: usize, reason: String },
    InvalidData { reason: String },
    /// The type kind has no wire representation in this codec.
    UnsupportedKind(TypeKind),
    /// Key operations on a type that declares no key members.
    NoKey,
}

pub type CodecResult<T> = Result<T, CodecError>;

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::WriteFailed { offset, reason } => {
                write!(f, "write failed at offset {}: {}", offset, reason)
            }
            CodecError::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            CodecError::InvalidData { reason } => write!(f, "invalid data: {}", reason),
            CodecError::UnsupportedKind(kind) => {
                write!(f, "kind {:?} has no wire representation", kind)
            }
            CodecError::NoKey => write!(f, "type declares no key members"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<CodecError> for ReturnCode {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::WriteFailed { .. } => ReturnCode::Error,
            CodecError::ReadFailed { .. } | CodecError::InvalidData { .. } => {
                ReturnCode::BadParameter
            }
            CodecError::UnsupportedKind(_) => ReturnCode::Unsupported,
            CodecError::NoKey => ReturnCode::NoData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_return_code_mapping() {
        let err = CodecError::ReadFailed {
            offset: 8,
            reason: "unexpected end of buffer".into(),
        };
        assert_eq!(ReturnCode::from(err), ReturnCode::BadParameter);
        assert_eq!(
            ReturnCode::from(CodecError::UnsupportedKind(TypeKind::TK_NONE)),
            ReturnCode::Unsupported
        );
        assert_eq!(ReturnCode::from(CodecError::NoKey), ReturnCode::NoData);
    }

    #[test]
    fn test_error_display() {
        let err = CodecError::InvalidData {
            reason: "union has no active member".into(),
        };
        assert_eq!(err.to_string(), "invalid data: union has no active member");
    }
}
