// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Immutable type graph nodes and their construction-time builder.
//!
//! A [`DynamicTypeBuilder`] accumulates members and annotations; `build()`
//! deep-copies its state into an immutable, `Arc`-shared [`DynamicType`]
//! snapshot. Forward edges (base/element/discriminator/member types) are
//! shared ownership; the member-to-parent edge is a `Weak` back-reference,
//! so type graphs never form strong reference cycles.

mod builder;
mod dynamic_type;
mod member;

pub use builder::DynamicTypeBuilder;
pub use dynamic_type::DynamicType;
pub use member::DynamicTypeMember;

pub(crate) use dynamic_type::TypeInner;
