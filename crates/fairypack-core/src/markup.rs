//! UI markup tree and XML serialization.
//!
//! Translators build [`MarkupNode`] trees bottom-up; the finished tree is
//! serialized once with [`MarkupNode::to_xml`]. Attribute order is preserved.

use indexmap::IndexMap;
use std::fmt;

/// Element tags understood by the UI engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Component,
    DisplayList,
    Image,
    Loader,
    Text,
    Controller,
    GearDisplay,
    Button,
    PackageDescription,
    Resources,
}

impl ElementKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Component => "component",
            ElementKind::DisplayList => "displayList",
            ElementKind::Image => "image",
            ElementKind::Loader => "loader",
            ElementKind::Text => "text",
            ElementKind::Controller => "controller",
            ElementKind::GearDisplay => "gearDisplay",
            ElementKind::Button => "Button",
            ElementKind::PackageDescription => "packageDescription",
            ElementKind::Resources => "resources",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One element of the output markup.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupNode {
    pub kind: ElementKind,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<MarkupNode>,
}

impl MarkupNode {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, builder style.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_child(mut self, child: MarkupNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set an attribute. Re-setting keeps the original position.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl ToString) {
        self.attributes.insert(key.into(), value.to_string());
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Remove an attribute, keeping the order of the rest.
    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        self.attributes.shift_remove(key)
    }

    pub fn push(&mut self, child: MarkupNode) {
        self.children.push(child);
    }

    /// First direct child of the given kind.
    pub fn child(&self, kind: ElementKind) -> Option<&MarkupNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Serialize as a standalone pretty-printed XML document.
    pub fn to_xml(&self) -> String {
        let mut writer = XmlWriter::new();
        writer.output.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        writer.write_element(self);
        writer.output
    }
}

/// Indenting writer for markup trees.
struct XmlWriter {
    output: String,
    indent: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    fn write_element(&mut self, node: &MarkupNode) {
        let mut open = format!("<{}", node.kind);
        for (key, value) in &node.attributes {
            open.push(' ');
            open.push_str(key);
            open.push_str("=\"");
            open.push_str(&escape_attr(value));
            open.push('"');
        }

        if node.children.is_empty() {
            open.push_str("/>");
            self.write_line(&open);
            return;
        }

        open.push('>');
        self.write_line(&open);
        self.indent += 1;
        for child in &node.children {
            self.write_element(child);
        }
        self.indent -= 1;
        self.write_line(&format!("</{}>", node.kind));
    }

    fn write_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }
}

/// Escape a string for use inside a double-quoted XML attribute.
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\t' => result.push_str("&#x9;"),
            '\n' => result.push_str("&#xA;"),
            '\r' => result.push_str("&#xD;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_order_preserved() {
        let mut node = MarkupNode::new(ElementKind::Text)
            .with_attr("id", "n1_x")
            .with_attr("name", "n1")
            .with_attr("text", "hi")
            .with_attr("xy", "0,0");
        assert_eq!(node.remove_attr("text").as_deref(), Some("hi"));
        let keys: Vec<_> = node.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "xy"]);
    }

    #[test]
    fn test_to_xml_nesting() {
        let node = MarkupNode::new(ElementKind::Component)
            .with_attr("size", "10,20")
            .with_child(
                MarkupNode::new(ElementKind::DisplayList)
                    .with_child(MarkupNode::new(ElementKind::Image).with_attr("src", "ab0")),
            );

        let xml = node.to_xml();
        let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<component size=\"10,20\">\n  <displayList>\n    <image src=\"ab0\"/>\n  </displayList>\n</component>\n";
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("a<b & \"c\"\nd"), "a&lt;b &amp; &quot;c&quot;&#xA;d");
    }

    #[test]
    fn test_child_lookup() {
        let node = MarkupNode::new(ElementKind::Component)
            .with_child(MarkupNode::new(ElementKind::Controller))
            .with_child(MarkupNode::new(ElementKind::DisplayList));
        assert!(node.child(ElementKind::DisplayList).is_some());
        assert!(node.child(ElementKind::Button).is_none());
    }
}
