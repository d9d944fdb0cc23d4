//! Package descriptor.

use crate::store::{ResourceEntry, ResourceKind};
use fairypack_core::{ElementKind, MarkupNode};

/// File name of the package descriptor inside the package.
pub const PACKAGE_DESCRIPTOR: &str = "package.xml";

/// Scale mode written for images carrying a scale-9 grid.
const SCALE_9GRID: &str = "9grid";

/// One resource line of the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub kind: ResourceKind,
    pub id: String,
    pub name: String,
    pub scale9_grid: Option<String>,
}

/// The package descriptor: package id plus every resource in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub package_id: String,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn from_resources(package_id: impl Into<String>, resources: &[ResourceEntry<'_>]) -> Self {
        Self {
            package_id: package_id.into(),
            entries: resources
                .iter()
                .map(|r| ManifestEntry {
                    kind: r.kind,
                    id: r.id.clone(),
                    name: r.name.clone(),
                    scale9_grid: r.scale9_grid.clone(),
                })
                .collect(),
        }
    }

    pub fn to_markup(&self) -> MarkupNode {
        let mut resources = MarkupNode::new(ElementKind::Resources);
        for entry in &self.entries {
            let mut element = MarkupNode::new(entry.kind.element())
                .with_attr("id", &entry.id)
                .with_attr("name", &entry.name)
                .with_attr("path", "/");
            if entry.kind == ResourceKind::Image {
                if let Some(grid) = &entry.scale9_grid {
                    element.set_attr("scale", SCALE_9GRID);
                    element.set_attr("scale9Grid", grid);
                }
            }
            resources.push(element);
        }

        MarkupNode::new(ElementKind::PackageDescription)
            .with_attr("id", &self.package_id)
            .with_child(resources)
    }

    pub fn to_xml(&self) -> String {
        self.to_markup().to_xml()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ContentStore;
    use fairypack_core::RasterImage;

    #[test]
    fn test_manifest_lists_resources_in_order() {
        let plain = RasterImage::new(1, 1, vec![1; 4]);
        let framed = RasterImage::new(1, 1, vec![2; 4]);
        let mut store = ContentStore::new("ns");
        store.register_image(&plain, "a.png", None);
        store.register_image(&framed, "frame.png", Some("2,2,4,4"));
        store.register_component("<c/>".into(), "Main.xml");

        let manifest = Manifest::from_resources("pkg00001", store.resources());
        let xml = manifest.to_xml();
        let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<packageDescription id=\"pkg00001\">\n  <resources>\n    \
<image id=\"ns0\" name=\"a.png\" path=\"/\"/>\n    \
<image id=\"ns1\" name=\"frame.png\" path=\"/\" scale=\"9grid\" scale9Grid=\"2,2,4,4\"/>\n    \
<component id=\"ns2\" name=\"Main.xml\" path=\"/\"/>\n  </resources>\n</packageDescription>\n";
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = Manifest::from_resources("p", &[]);
        assert!(manifest.to_xml().contains("<resources/>"));
    }
}
