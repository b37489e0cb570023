// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Result codes for the dynamic type and data layer.
//!
//! Every fallible operation returns `DdsResult<T>`; nothing in this crate
//! panics or unwinds for caller errors. Factories are the one exception to
//! the code taxonomy: their `create_*` operations return `Option` because no
//! receiver object exists yet to attach a code to.

use std::fmt;

/// Failure taxonomy shared by every operation in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnCode {
    /// Unknown id/name, null required argument, malformed descriptor.
    BadParameter,
    /// Stateful invariant violation: double loan, mismatched union state,
    /// mutating an object that is not ready for it.
    PreconditionNotMet,
    /// Operation not meaningful for the member's actual kind (e.g. a float
    /// accessor invoked on a string member).
    Unsupported,
    /// No applicable annotation/key found.
    NoData,
    /// Implementation-internal failure.
    Error,
}

/// Result alias used throughout the crate; `Ok(..)` is the OK code.
pub type DdsResult<T> = Result<T, ReturnCode>;

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::BadParameter => "bad parameter",
            Self::PreconditionNotMet => "precondition not met",
            Self::Unsupported => "unsupported operation for kind",
            Self::NoData => "no data",
            Self::Error => "internal error",
        };
        f.write_str(text)
    }
}

impl std::error::Error for ReturnCode {}
