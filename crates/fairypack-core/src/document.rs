//! Layered document model.
//!
//! A [`Document`] is what a document reader hands to the converter: a canvas
//! size and a tree of [`DocumentNode`]s whose children are stored back-to-front.
//! The converter never mutates it.

/// Opacity of a fully opaque layer.
pub const OPAQUE: u8 = 255;

/// An axis-aligned bounding box in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Offset of this box's top-left corner relative to `origin`, saturating at the `i32` range.
    pub fn offset_from(&self, origin: &Bounds) -> (i32, i32) {
        (
            self.left.saturating_sub(origin.left),
            self.top.saturating_sub(origin.top),
        )
    }

    /// This box grown by `padding` on every side, saturating at the `i32` range.
    pub fn padded(&self, padding: i32) -> Bounds {
        Bounds::new(
            self.left.saturating_sub(padding),
            self.top.saturating_sub(padding),
            self.width.saturating_add(padding.saturating_mul(2)),
            self.height.saturating_add(padding.saturating_mul(2)),
        )
    }
}

/// Horizontal text alignment of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }

    /// Parse an alignment keyword. Unknown keywords yield `None`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            "justify" => Some(TextAlign::Justify),
            _ => None,
        }
    }
}

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Format as `#rrggbb`, dropping alpha.
    pub fn to_hex_rgb(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 4]> for Color {
    fn from(c: [u8; 4]) -> Self {
        Color::rgba(c[0], c[1], c[2], c[3])
    }
}

/// The first style run of a text layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub align: TextAlign,
    pub font: String,
    pub size: f32,
    pub color: Color,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            align: TextAlign::Left,
            font: String::new(),
            size: 12.0,
            color: Color::rgb(0, 0, 0),
        }
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_font(mut self, font: impl Into<String>, size: f32) -> Self {
        self.font = font.into();
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Raw RGBA pixels of a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, 4 bytes per pixel.
    pub pixels: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Whether the buffer length matches `width * height * 4`.
    pub fn is_well_formed(&self) -> bool {
        self.pixels.len() as u64 == u64::from(self.width) * u64::from(self.height) * 4
    }
}

/// One layer or group in the document tree.
///
/// `name` and `bounds` are optional because readers may hand over incomplete
/// records; the converter rejects such nodes when it needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentNode {
    pub name: Option<String>,
    pub bounds: Option<Bounds>,
    pub opacity: u8,
    pub group: bool,
    pub empty: bool,
    /// Children, back-to-front.
    pub children: Vec<DocumentNode>,
    pub text: Option<TextRun>,
    pub image: Option<RasterImage>,
    pub scale9_grid: Option<String>,
}

impl DocumentNode {
    fn new(name: impl Into<String>, bounds: Bounds, group: bool) -> Self {
        Self {
            name: Some(name.into()),
            bounds: Some(bounds),
            opacity: OPAQUE,
            group,
            empty: false,
            children: Vec::new(),
            text: None,
            image: None,
            scale9_grid: None,
        }
    }

    /// Create a group node.
    pub fn group(name: impl Into<String>, bounds: Bounds) -> Self {
        Self::new(name, bounds, true)
    }

    /// Create a leaf layer node.
    pub fn layer(name: impl Into<String>, bounds: Bounds) -> Self {
        Self::new(name, bounds, false)
    }

    pub fn with_children(mut self, children: Vec<DocumentNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_child(mut self, child: DocumentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_text(mut self, text: TextRun) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_image(mut self, image: RasterImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_scale9_grid(mut self, grid: impl Into<String>) -> Self {
        self.scale9_grid = Some(grid.into());
        self
    }

    /// Mark the layer as having no visible content.
    pub fn into_empty(mut self) -> Self {
        self.empty = true;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_group(&self) -> bool {
        self.group
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// All nodes below this one in pre-order, document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

/// Pre-order iterator over a node's subtree, excluding the node itself.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a DocumentNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a DocumentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A parsed layered document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub width: i32,
    pub height: i32,
    /// Top-level layers, back-to-front.
    pub children: Vec<DocumentNode>,
}

impl Document {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: DocumentNode) -> Self {
        self.children.push(child);
        self
    }

    /// The canvas as a box at the origin.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(0, 0, self.width, self.height)
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendants().count())
            .sum()
    }
}
