// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # idl-any - run-time IDL type descriptions and dynamic values
//!
//! `TypeCode` describes any IDL type at run time, including recursive
//! types; `Any` carries a value of any IDL type together with its
//! `TypeCode` and marshals itself against a CDR stream.
//!
//! ## Quick Start
//!
//! ```rust
//! use idl_any::cdr::{CdrInputStream, CdrOutputStream};
//! use idl_any::{Any, StructMember, TCKind, TypeCode, Value};
//!
//! # fn main() -> idl_any::Result<()> {
//! let point = TypeCode::struct_tc(
//!     "IDL:Point:1.0",
//!     "Point",
//!     vec![
//!         StructMember::new("x", TypeCode::primitive(TCKind::Long)?),
//!         StructMember::new("y", TypeCode::primitive(TCKind::Long)?),
//!     ],
//! );
//!
//! let any = Any::with_value(point.clone(), Value::Struct(vec![Value::Long(1), Value::Long(2)]))?;
//!
//! let mut out = CdrOutputStream::new();
//! any.write_value(&mut out)?;
//! let bytes = out.into_bytes();
//!
//! let mut copy = Any::new();
//! copy.read_value(&mut CdrInputStream::new(&bytes), point)?;
//! assert_eq!(copy, any);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`typecode`] | `TypeCode`, kinds, members, equality, compact form |
//! | [`any`] | `Any` container and `Value` payloads |
//! | [`cdr`] | Stream traits and the little-endian CDR implementation |
//! | [`locator`] | Bootstrap chain resolving a `TypeCodeFactory` |
//!
//! ## Thread Safety
//!
//! `TypeCode` is immutable and `Send + Sync`; clones share one graph.
//! `Any` is a plain value: share TypeCodes, not Anys, across threads.

pub mod any;
pub mod cdr;
mod error;
pub mod locator;
pub mod typecode;

pub use any::{Any, ObjectRef, TaggedProfile, Value};
pub use error::{Error, Result};
pub use typecode::{
    StructMember, TCKind, TypeCode, UnionLabel, UnionMember, ValueMember, ValueModifier,
    Visibility,
};

#[cfg(test)]
mod tests;
