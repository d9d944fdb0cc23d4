//! Package writing.
//!
//! A package is a flat set of files: every resource under its assigned name
//! plus `package.xml`. It is written either as a zip archive or, in no-pack
//! mode, as a directory.

use crate::error::{PackageError, Result};
use crate::png::encode_png;
use crate::reader::read_document;
use fairypack_convert::{convert, Conversion, ConvertOptions, ResourceData, PACKAGE_DESCRIPTOR};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Extension of packed packages.
pub const PACKAGE_EXTENSION: &str = "fairypackage";

/// Options for writing a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// Write a zip archive instead of a directory.
    pub pack: bool,
    /// Output path; derived from the input path when unset.
    pub output: Option<PathBuf>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            pack: true,
            output: None,
        }
    }
}

impl EmitOptions {
    pub fn with_pack(mut self, pack: bool) -> Self {
        self.pack = pack;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// The output path for `input` under these options.
    pub fn output_for(&self, input: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(input, self.pack))
    }
}

/// Summary of a written package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmitReport {
    /// Build id used, reusable for a stable rebuild.
    pub build_id: String,
    pub output: PathBuf,
    /// Number of resources, not counting the descriptor.
    pub resource_count: usize,
}

/// One file of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// `<dir>/<stem>.fairypackage` when packing, `<dir>/<stem>-fairypackage` otherwise.
pub fn default_output_path(input: &Path, pack: bool) -> PathBuf {
    let stem = file_stem(input);
    let name = if pack {
        format!("{stem}.{PACKAGE_EXTENSION}")
    } else {
        format!("{stem}-{PACKAGE_EXTENSION}")
    };
    input.with_file_name(name)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read, convert, and write one document.
pub fn emit_package(
    input: &Path,
    emit: &EmitOptions,
    options: &ConvertOptions,
) -> Result<EmitReport> {
    let doc = read_document(input)?;
    let root_name = file_stem(input);
    if root_name.is_empty() {
        return Err(PackageError::InvalidData(format!(
            "cannot derive a package name from {}",
            input.display()
        )));
    }

    let conversion = convert(&doc, &root_name, options)?;
    let output = emit.output_for(input);
    write_package(&conversion, &output, emit.pack)?;

    let report = EmitReport {
        build_id: conversion.build_id.to_string(),
        output,
        resource_count: conversion.resources.len(),
    };
    tracing::info!(
        output = %report.output.display(),
        build_id = %report.build_id,
        resources = report.resource_count,
        "wrote package"
    );
    Ok(report)
}

/// Encode every resource and the descriptor into package files.
pub fn package_files(conversion: &Conversion<'_>) -> Result<Vec<PackageFile>> {
    let mut files = conversion
        .resources
        .par_iter()
        .map(|entry| -> Result<PackageFile> {
            let data = match &entry.data {
                ResourceData::Image(raster) => encode_png(raster)?,
                ResourceData::Component(xml) => xml.as_bytes().to_vec(),
            };
            Ok(PackageFile {
                name: entry.name.clone(),
                data,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    files.push(PackageFile {
        name: PACKAGE_DESCRIPTOR.to_string(),
        data: conversion.manifest().to_xml().into_bytes(),
    });
    Ok(files)
}

/// Write a converted document to `output`.
pub fn write_package(conversion: &Conversion<'_>, output: &Path, pack: bool) -> Result<()> {
    let files = package_files(conversion)?;
    if pack {
        write_archive(&files, output)
    } else {
        write_directory(&files, output)
    }
}

fn write_archive(files: &[PackageFile], output: &Path) -> Result<()> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        zip.start_file(file.name.as_str(), file_options.clone())?;
        zip.write_all(&file.data)?;
        tracing::debug!(entry = %file.name, bytes = file.data.len(), "added archive entry");
    }
    let archive = zip.finish()?.into_inner();

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, archive)?;
    Ok(())
}

/// Write files into `output`, overwriting namesakes and leaving other files alone.
fn write_directory(files: &[PackageFile], output: &Path) -> Result<()> {
    fs::create_dir_all(output)?;

    files.par_iter().try_for_each(|file| -> Result<()> {
        fs::write(output.join(&file.name), &file.data)?;
        tracing::debug!(file = %file.name, bytes = file.data.len(), "wrote package file");
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::io::Read;

    fn pixels(seed: u8) -> String {
        STANDARD.encode([seed, seed, seed, 255])
    }

    fn dump() -> String {
        format!(
            r#"{{"width":100,"height":50,"children":[
                {{"name":"bg","left":0,"top":0,"width":100,"height":50,
                  "image":{{"width":1,"height":1,"pixels":"{bg}"}}}},
                {{"name":"ButtonOk","group":true,"left":10,"top":10,"width":40,"height":20,"children":[
                    {{"name":"face@up","left":10,"top":10,"width":40,"height":20,
                      "image":{{"width":1,"height":1,"pixels":"{up}"}}}},
                    {{"name":"face@down","left":10,"top":10,"width":40,"height":20,
                      "image":{{"width":1,"height":1,"pixels":"{down}"}}}}
                ]}}
            ]}}"#,
            bg = pixels(1),
            up = pixels(2),
            down = pixels(3),
        )
    }

    fn write_input(dir: &Path) -> PathBuf {
        let input = dir.join("Main.json");
        fs::write(&input, dump()).unwrap();
        input
    }

    fn fixed_build_id() -> ConvertOptions {
        ConvertOptions::default().with_build_id("pkg00001ns")
    }

    #[test]
    fn test_default_output_paths() {
        let input = Path::new("/art/menu.json");
        assert_eq!(
            default_output_path(input, true),
            PathBuf::from("/art/menu.fairypackage")
        );
        assert_eq!(
            default_output_path(input, false),
            PathBuf::from("/art/menu-fairypackage")
        );
        let explicit = EmitOptions::default().with_output("/out/x.zip");
        assert_eq!(explicit.output_for(input), PathBuf::from("/out/x.zip"));
    }

    #[test]
    fn test_emit_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let emit = EmitOptions::default().with_pack(false);

        let report = emit_package(&input, &emit, &fixed_build_id()).unwrap();
        assert_eq!(report.output, dir.path().join("Main-fairypackage"));
        assert_eq!(report.build_id, "pkg00001ns");
        assert_eq!(report.resource_count, 5);

        for name in ["bg.png", "face_up.png", "face_down.png", "ButtonOk.xml", "Main.xml"] {
            assert!(report.output.join(name).is_file(), "missing {name}");
        }
        let manifest = fs::read_to_string(report.output.join("package.xml")).unwrap();
        assert!(manifest.contains("<packageDescription id=\"pkg00001\">"));
        assert!(manifest.contains("name=\"Main.xml\""));
    }

    #[test]
    fn test_emit_directory_keeps_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let notes = dir.path().join("my_notes.txt");
        fs::write(&notes, b"keep me").unwrap();
        fs::write(dir.path().join("Main.xml"), b"old").unwrap();

        let emit = EmitOptions::default()
            .with_pack(false)
            .with_output(dir.path());
        emit_package(&input, &emit, &fixed_build_id()).unwrap();

        assert_eq!(fs::read(&notes).unwrap(), b"keep me");
        assert!(input.is_file());
        assert!(dir.path().join("package.xml").is_file());
        let root = fs::read_to_string(dir.path().join("Main.xml")).unwrap();
        assert!(root.starts_with("<?xml"));
    }

    #[test]
    fn test_emit_archive() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());

        let report = emit_package(&input, &EmitOptions::default(), &fixed_build_id()).unwrap();
        assert_eq!(report.output, dir.path().join("Main.fairypackage"));

        let file = fs::File::open(&report.output).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 6);

        let mut manifest = String::new();
        archive
            .by_name("package.xml")
            .unwrap()
            .read_to_string(&mut manifest)
            .unwrap();
        assert!(manifest.contains("<component id=\"ns4\" name=\"Main.xml\" path=\"/\"/>"));

        let mut png = Vec::new();
        archive.by_name("bg.png").unwrap().read_to_end(&mut png).unwrap();
        assert!(png.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_emit_is_stable_with_build_id() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let emit = EmitOptions::default().with_pack(false);

        let first = emit_package(&input, &emit, &fixed_build_id()).unwrap();
        let a = fs::read(first.output.join("Main.xml")).unwrap();
        let second = emit_package(&input, &emit, &fixed_build_id()).unwrap();
        let b = fs::read(second.output.join("Main.xml")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bad_pixels_fail_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Bad.json");
        let json = format!(
            r#"{{"width":2,"height":2,"children":[
                {{"name":"x","left":0,"top":0,"width":2,"height":2,
                  "image":{{"width":2,"height":2,"pixels":"{}"}}}}]}}"#,
            pixels(1)
        );
        fs::write(&input, json).unwrap();

        let emit = EmitOptions::default().with_pack(false);
        let err = emit_package(&input, &emit, &fixed_build_id()).unwrap_err();
        assert!(matches!(err, PackageError::InvalidData(_)));
        assert!(!dir.path().join("Bad-fairypackage").exists());
    }

    #[test]
    fn test_malformed_node_surfaces_convert_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Broken.json");
        fs::write(
            &input,
            r#"{"width":2,"height":2,"children":[{"left":0,"top":0,"width":1,"height":1}]}"#,
        )
        .unwrap();
        let err = emit_package(&input, &EmitOptions::default(), &fixed_build_id()).unwrap_err();
        assert!(matches!(err, PackageError::Convert(_)));
    }
}
