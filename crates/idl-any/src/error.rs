// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy shared by TypeCode, Any and the CDR streams.
//!
//! Every failure is local and synchronous. Operations that fail leave the
//! receiver exactly as it was before the call.

use crate::typecode::TCKind;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by TypeCode accessors, Any operations and marshaling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Operation invoked on a TypeCode of an incompatible kind.
    #[error("{op} is not valid for TypeCode kind {kind}")]
    WrongKind { op: &'static str, kind: TCKind },

    /// Member or label index beyond `member_count()`.
    #[error("member index {index} out of range (member count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// Requested value kind does not match the Any's current TypeCode.
    #[error("value kind mismatch: expected {expected}, found {actual}")]
    WrongValueKind { expected: String, actual: String },

    /// Extract or marshal attempted before a value was inserted.
    #[error("Any holds no value")]
    ValueNotSet,

    /// The stream's content cannot satisfy the expected TypeCode.
    #[error("encoding mismatch: {reason}")]
    EncodingMismatch { reason: String },

    /// Recursive placeholder used before its enclosing type was built.
    #[error("recursive TypeCode '{id}' is not resolved")]
    NotYetResolved { id: String },

    /// Deliberately unimplemented legacy operation.
    #[error("{op} is not supported")]
    Unsupported { op: &'static str },
}

impl Error {
    pub(crate) fn wrong_kind(op: &'static str, kind: TCKind) -> Self {
        Self::WrongKind { op, kind }
    }

    pub(crate) fn mismatch(reason: impl Into<String>) -> Self {
        Self::EncodingMismatch {
            reason: reason.into(),
        }
    }

    pub(crate) fn value_kind(expected: impl ToString, actual: impl ToString) -> Self {
        Self::WrongValueKind {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
