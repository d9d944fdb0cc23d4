//! Core types for the fairypack converter.
//!
//! This crate provides the types shared by every other fairypack crate:
//! - The layered document model handed over by a document reader
//! - The UI markup tree and its XML serialization
//! - Error types

pub mod document;
pub mod errors;
pub mod markup;

pub use document::*;
pub use errors::*;
pub use markup::*;
