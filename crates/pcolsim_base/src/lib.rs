//! # pcolsim-base
//!
//! Foundational types shared by the pcolsim crates:
//!
//! - [`Span`] — byte-offset source locations
//! - [`SpannedError`]/[`Result`] — errors that point at source text
//! - [`Interner`]/[`Symbol`] — string interning for O(1) object comparison
//!
//! This crate knows nothing about P colonies or the input language; it
//! provides only generic infrastructure the higher-level crates build upon.
//!
//! # Example
//!
//! ```
//! use pcolsim_base::{Interner, Span};
//!
//! let mut interner = Interner::new();
//! let obj = interner.intern("d_1");
//! assert_eq!(interner.resolve(obj), "d_1");
//!
//! let span = Span::new(0, 3);
//! assert_eq!(span.len(), 3);
//! ```

pub mod error;
pub mod intern;
pub mod span;

pub use error::{Result, SpannedError};
pub use intern::{Interner, Symbol};
pub use span::Span;
