//! fairypack-io: reading layered documents and writing UI packages.
//!
//! Documents come in through a [`DocumentReader`] and leave as a package:
//! either a zip archive or a plain directory holding one PNG per image
//! resource, one XML file per component, and the `package.xml` descriptor.
//!
//! ```text
//! layer dump ─> Document ─> convert ─> resources ─┬─> <stem>.fairypackage
//!                                                 └─> <stem>-fairypackage/
//! ```

pub mod emit;
pub mod error;
pub mod png;
pub mod reader;

pub use emit::{
    default_output_path, emit_package, package_files, write_package, EmitOptions, EmitReport,
    PackageFile,
};
pub use error::{PackageError, Result};
pub use png::encode_png;
pub use reader::{read_document, reader_for_extension, DocumentReader, JsonDocumentReader};
