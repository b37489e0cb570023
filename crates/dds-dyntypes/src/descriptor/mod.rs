// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor value objects consumed when constructing live types.
//!
//! Descriptors are pure values: `copy_from` / `equals` / `is_consistent`
//! never mutate anything on failure and never panic. An inconsistent
//! descriptor must never reach a builder or a built type; construction
//! entry points re-validate.

mod annotation_descriptor;
mod literal;
mod member_descriptor;
mod type_descriptor;

pub use annotation_descriptor::{
    AnnotationDescriptor, ANNOTATION_BIT_BOUND, ANNOTATION_DEFAULT, ANNOTATION_EXTENSIBILITY,
    ANNOTATION_ID, ANNOTATION_KEY, ANNOTATION_OPTIONAL, ANNOTATION_POSITION,
    ANNOTATION_VALUE_ATTR,
};
pub use literal::literal_matches_kind;
pub use member_descriptor::MemberDescriptor;
pub use type_descriptor::{Extensibility, TypeDescriptor};

/// Validate a qualified type name: `::`-separated segments of
/// alphanumerics and underscores, no segment starting with a digit.
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    name.split("::").all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
