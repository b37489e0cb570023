// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values bound to a [`DynamicType`](crate::types::DynamicType).
//!
//! [`DynamicData`] is the generic data container: one instance per sample,
//! holding a tagged [`DynamicValue`] per member id. Instances are move-only
//! within the single-writer contract; concurrent mutation is the caller's
//! problem, not this module's.

mod dynamic_data;
mod value;

pub use dynamic_data::DynamicData;
pub use value::DynamicValue;
