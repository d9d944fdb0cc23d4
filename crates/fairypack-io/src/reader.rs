//! Document readers.
//!
//! A reader turns the bytes of an exported layer tree into a [`Document`].
//! The bundled [`JsonDocumentReader`] reads the JSON layer dump written by
//! image-editor export scripts:
//!
//! ```json
//! { "width": 320, "height": 240, "children": [
//!     { "name": "ButtonOk", "group": true, "left": 10, "top": 10,
//!       "width": 100, "height": 40, "children": [ ... ] },
//!     { "name": "bg", "left": 0, "top": 0, "width": 320, "height": 240,
//!       "image": { "width": 320, "height": 240, "pixels": "<base64 rgba>" } }
//! ] }
//! ```

use crate::error::{PackageError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use fairypack_core::{
    Bounds, Color, Document, DocumentNode, RasterImage, TextAlign, TextRun, OPAQUE,
};
use serde::Deserialize;
use std::path::Path;

/// Reads one document format into the layered document model.
pub trait DocumentReader: Send + Sync {
    /// Format name, for diagnostics.
    fn name(&self) -> &'static str;

    /// File extensions handled, lowercase and without the dot.
    fn extensions(&self) -> &[&'static str];

    /// Quick check on the leading bytes.
    fn can_read(&self, data: &[u8]) -> bool;

    fn read(&self, data: &[u8]) -> Result<Document>;
}

/// Reader for JSON layer dumps.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentReader;

impl DocumentReader for JsonDocumentReader {
    fn name(&self) -> &'static str {
        "layer dump"
    }

    fn extensions(&self) -> &[&'static str] {
        &["json"]
    }

    fn can_read(&self, data: &[u8]) -> bool {
        data.iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|&b| b == b'{')
    }

    fn read(&self, data: &[u8]) -> Result<Document> {
        let record: DocumentRecord = serde_json::from_slice(data)?;
        let children = record
            .children
            .into_iter()
            .map(LayerRecord::into_node)
            .collect::<Result<Vec<_>>>()?;
        Ok(Document {
            width: record.width,
            height: record.height,
            children,
        })
    }
}

/// Pick a reader for a file extension.
pub fn reader_for_extension(extension: &str) -> Option<Box<dyn DocumentReader>> {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    let readers: [Box<dyn DocumentReader>; 1] = [Box::new(JsonDocumentReader)];
    readers
        .into_iter()
        .find(|reader| reader.extensions().iter().any(|ext| *ext == extension))
}

/// Read a document file, choosing the reader by extension.
pub fn read_document(path: &Path) -> Result<Document> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();
    let reader = reader_for_extension(&extension)
        .ok_or_else(|| PackageError::UnknownFormat(path.display().to_string()))?;

    let data = std::fs::read(path)?;
    if !reader.can_read(&data) {
        return Err(PackageError::InvalidData(format!(
            "{} is not a {} file",
            path.display(),
            reader.name()
        )));
    }

    let doc = reader.read(&data)?;
    tracing::debug!(
        path = %path.display(),
        format = reader.name(),
        nodes = doc.node_count(),
        "read document"
    );
    Ok(doc)
}

#[derive(Debug, Deserialize)]
struct DocumentRecord {
    width: i32,
    height: i32,
    #[serde(default)]
    children: Vec<LayerRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayerRecord {
    name: Option<String>,
    left: Option<i32>,
    top: Option<i32>,
    width: Option<i32>,
    height: Option<i32>,
    #[serde(default = "opaque")]
    opacity: u8,
    #[serde(default)]
    group: bool,
    #[serde(default)]
    empty: bool,
    #[serde(default)]
    children: Vec<LayerRecord>,
    text: Option<TextRecord>,
    image: Option<ImageRecord>,
    scale9_grid: Option<String>,
}

fn opaque() -> u8 {
    OPAQUE
}

#[derive(Debug, Deserialize)]
struct TextRecord {
    text: String,
    #[serde(default)]
    align: Option<String>,
    #[serde(default)]
    font: String,
    #[serde(default = "default_font_size")]
    size: f32,
    #[serde(default)]
    color: Option<[u8; 4]>,
}

fn default_font_size() -> f32 {
    12.0
}

#[derive(Debug, Deserialize)]
struct ImageRecord {
    width: u32,
    height: u32,
    pixels: String,
}

impl LayerRecord {
    fn into_node(self) -> Result<DocumentNode> {
        let bounds = match (self.left, self.top, self.width, self.height) {
            (Some(left), Some(top), Some(width), Some(height)) => {
                Some(Bounds::new(left, top, width, height))
            }
            _ => None,
        };
        let children = self
            .children
            .into_iter()
            .map(LayerRecord::into_node)
            .collect::<Result<Vec<_>>>()?;
        let image = self.image.map(ImageRecord::into_raster).transpose()?;

        Ok(DocumentNode {
            name: self.name,
            bounds,
            opacity: self.opacity,
            group: self.group,
            empty: self.empty,
            children,
            text: self.text.map(TextRecord::into_run),
            image,
            scale9_grid: self.scale9_grid,
        })
    }
}

impl TextRecord {
    fn into_run(self) -> TextRun {
        let align = match self.align.as_deref() {
            None => TextAlign::Left,
            Some(keyword) => TextAlign::from_keyword(keyword).unwrap_or_else(|| {
                tracing::warn!(keyword, "unknown text alignment, using left");
                TextAlign::Left
            }),
        };
        let mut run = TextRun::new(self.text)
            .with_align(align)
            .with_font(self.font, self.size);
        if let Some(color) = self.color {
            run = run.with_color(Color::from(color));
        }
        run
    }
}

impl ImageRecord {
    fn into_raster(self) -> Result<RasterImage> {
        let pixels = STANDARD.decode(self.pixels.as_bytes())?;
        Ok(RasterImage::new(self.width, self.height, pixels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"{
        "width": 64,
        "height": 32,
        "children": [
            { "name": "bg", "left": 0, "top": 0, "width": 64, "height": 32,
              "opacity": 128, "scale9Grid": "2,2,60,28",
              "image": { "width": 1, "height": 1, "pixels": "AQIDBA==" } },
            { "name": "ButtonOk", "group": true, "left": 4, "top": 4, "width": 20, "height": 10,
              "children": [
                { "name": "label@title", "left": 6, "top": 5, "width": 10, "height": 8,
                  "text": { "text": "OK", "align": "center", "font": "Arial", "size": 14,
                            "color": [255, 0, 0, 255] } }
              ] },
            { "name": "spacer", "empty": true }
        ]
    }"#;

    #[test]
    fn test_read_layer_dump() {
        let doc = JsonDocumentReader.read(DUMP.as_bytes()).unwrap();
        assert_eq!((doc.width, doc.height), (64, 32));
        assert_eq!(doc.node_count(), 4);

        let bg = &doc.children[0];
        assert_eq!(bg.opacity, 128);
        assert_eq!(bg.scale9_grid.as_deref(), Some("2,2,60,28"));
        assert_eq!(bg.image.as_ref().unwrap().pixels, vec![1, 2, 3, 4]);

        let button = &doc.children[1];
        assert!(button.is_group());
        assert_eq!(button.opacity, OPAQUE);
        let label = button.children[0].text.as_ref().unwrap();
        assert_eq!(label.align, TextAlign::Center);
        assert_eq!(label.size, 14.0);
        assert_eq!(label.color.to_hex_rgb(), "#ff0000");

        let spacer = &doc.children[2];
        assert!(spacer.is_empty());
        assert_eq!(spacer.bounds, None);
    }

    #[test]
    fn test_unknown_align_falls_back_to_left() {
        let json = r#"{"width":1,"height":1,"children":[
            {"name":"t","left":0,"top":0,"width":1,"height":1,"text":{"text":"x","align":"middle"}}]}"#;
        let doc = JsonDocumentReader.read(json.as_bytes()).unwrap();
        assert_eq!(doc.children[0].text.as_ref().unwrap().align, TextAlign::Left);
    }

    #[test]
    fn test_bad_base64_is_error() {
        let json = r#"{"width":1,"height":1,"children":[
            {"name":"i","image":{"width":1,"height":1,"pixels":"@@@"}}]}"#;
        assert!(matches!(
            JsonDocumentReader.read(json.as_bytes()),
            Err(PackageError::Base64(_))
        ));
    }

    #[test]
    fn test_can_read() {
        assert!(JsonDocumentReader.can_read(b"  \n{\"width\":1}"));
        assert!(!JsonDocumentReader.can_read(b"8BPS"));
        assert!(!JsonDocumentReader.can_read(b""));
    }

    #[test]
    fn test_reader_for_extension() {
        assert!(reader_for_extension("JSON").is_some());
        assert!(reader_for_extension(".json").is_some());
        assert!(reader_for_extension("psd").is_none());
    }

    #[test]
    fn test_read_document_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.xcf");
        std::fs::write(&path, b"{}").unwrap();
        assert!(matches!(read_document(&path), Err(PackageError::UnknownFormat(_))));
    }

    #[test]
    fn test_read_document_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui.json");
        std::fs::write(&path, DUMP).unwrap();
        let doc = read_document(&path).unwrap();
        assert_eq!(doc.children.len(), 3);
    }
}
