//! Content-addressed resource store for one conversion run.
//!
//! Every extracted image and built component goes through the store. Content
//! is keyed by its MD5 hash, so identical pixels or identical component markup
//! anywhere in the document collapse into one resource with one id and one
//! file. Ids are `<namespace><base36 counter>` in first-registration order.

use crate::build_id::to_base36;
use fairypack_core::{ElementKind, RasterImage};
use md5::{Digest, Md5};
use std::collections::HashMap;

/// Characters replaced by `_` in proposed file names.
const UNSAFE_FILE_CHARS: &[char] = &[
    '@', '\'', '"', '\\', '/', '\u{8}', '\u{c}', '\n', '\r', '\t', '$', '%', '*', ':', '?', '<',
    '>', '|',
];

/// File stem reserved for the package descriptor.
pub const RESERVED_STEM: &str = "package";

/// Kind of a packaged resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Component,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Component => "component",
        }
    }

    /// Manifest element for this kind.
    pub fn element(&self) -> ElementKind {
        match self {
            ResourceKind::Image => ElementKind::Image,
            ResourceKind::Component => ElementKind::Component,
        }
    }
}

/// Payload of a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceData<'a> {
    /// Pixels borrowed from the document.
    Image(&'a RasterImage),
    /// Serialized component XML.
    Component(String),
}

/// A deduplicated, named, identified unit of output.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry<'a> {
    pub kind: ResourceKind,
    pub id: String,
    pub name: String,
    pub data: ResourceData<'a>,
    pub scale9_grid: Option<String>,
}

impl ResourceEntry<'_> {
    /// Detach the id and file name from the entry.
    pub fn to_ref(&self) -> ResourceRef {
        ResourceRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Id and file name of a registered resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub id: String,
    pub name: String,
}

/// Resource registry scoped to one conversion run.
#[derive(Debug)]
pub struct ContentStore<'a> {
    namespace: String,
    next_item_index: u64,
    resources: Vec<ResourceEntry<'a>>,
    hash_index: HashMap<String, usize>,
    name_index: HashMap<String, u32>,
}

impl<'a> ContentStore<'a> {
    /// Create an empty store assigning ids under `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        let mut name_index = HashMap::new();
        name_index.insert(RESERVED_STEM.to_string(), 1);
        Self {
            namespace: namespace.into(),
            next_item_index: 0,
            resources: Vec::new(),
            hash_index: HashMap::new(),
            name_index,
        }
    }

    /// Register an image layer's pixels.
    pub fn register_image(
        &mut self,
        image: &'a RasterImage,
        file_name: &str,
        scale9_grid: Option<&str>,
    ) -> &ResourceEntry<'a> {
        let hash = content_hash(&image.pixels);
        let index = match self.hash_index.get(&hash).copied() {
            Some(index) => index,
            None => self.insert(
                hash,
                ResourceKind::Image,
                file_name,
                ResourceData::Image(image),
                scale9_grid.map(str::to_string),
            ),
        };
        &self.resources[index]
    }

    /// Register serialized component markup.
    pub fn register_component(&mut self, xml: String, file_name: &str) -> &ResourceEntry<'a> {
        let hash = content_hash(xml.as_bytes());
        let index = match self.hash_index.get(&hash).copied() {
            Some(index) => index,
            None => self.insert(
                hash,
                ResourceKind::Component,
                file_name,
                ResourceData::Component(xml),
                None,
            ),
        };
        &self.resources[index]
    }

    fn insert(
        &mut self,
        hash: String,
        kind: ResourceKind,
        file_name: &str,
        data: ResourceData<'a>,
        scale9_grid: Option<String>,
    ) -> usize {
        let id = self.next_item_id();
        let name = self.unique_file_name(file_name);
        tracing::debug!(%id, %name, kind = kind.as_str(), "registered resource");

        let index = self.resources.len();
        self.resources.push(ResourceEntry {
            kind,
            id,
            name,
            data,
            scale9_grid,
        });
        self.hash_index.insert(hash, index);
        index
    }

    fn next_item_id(&mut self) -> String {
        let id = format!("{}{}", self.namespace, to_base36(self.next_item_index));
        self.next_item_index += 1;
        id
    }

    /// Sanitize the stem and suffix `_<n>` until it is unused.
    fn unique_file_name(&mut self, file_name: &str) -> String {
        let (stem, extension) = split_extension(file_name);
        let mut stem = sanitize_file_stem(stem);
        loop {
            match self.name_index.get_mut(&stem) {
                None => {
                    self.name_index.insert(stem.clone(), 1);
                    break;
                }
                Some(count) => {
                    let n = *count;
                    *count += 1;
                    stem = format!("{stem}_{n}");
                }
            }
        }
        format!("{stem}{extension}")
    }

    /// Resources in registration order.
    pub fn resources(&self) -> &[ResourceEntry<'a>] {
        &self.resources
    }

    pub fn into_resources(self) -> Vec<ResourceEntry<'a>> {
        self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Hex MD5 digest of a payload.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Replace characters that are unsafe in file names with `_`.
pub fn sanitize_file_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| if UNSAFE_FILE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(dot) => file_name.split_at(dot),
        None => (file_name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(seed: u8) -> RasterImage {
        RasterImage::new(1, 1, vec![seed, seed, seed, 255])
    }

    fn suffix_value(id: &str, namespace: &str) -> u64 {
        u64::from_str_radix(&id[namespace.len()..], 36).unwrap()
    }

    #[test]
    fn test_duplicate_images_collapse() {
        let a = raster(1);
        let b = raster(1);
        let mut store = ContentStore::new("ns");

        let first = store.register_image(&a, "a.png", None).to_ref();
        let second = store.register_image(&b, "b.png", None).to_ref();
        let third = store.register_image(&a, "c.png", None).to_ref();

        assert_eq!(first, second);
        assert_eq!(first, third);
        assert_eq!(store.len(), 1);
        assert_eq!(first.name, "a.png");
    }

    #[test]
    fn test_duplicate_components_collapse() {
        let mut store = ContentStore::new("ns");
        let first = store.register_component("<x/>".into(), "A.xml").to_ref();
        let second = store.register_component("<x/>".into(), "B.xml").to_ref();
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_name_collisions_get_counters() {
        let images: Vec<_> = (0..4).map(raster).collect();
        let mut store = ContentStore::new("ns");

        let names: Vec<_> = images
            .iter()
            .map(|img| store.register_image(img, "btn.png", None).name.clone())
            .collect();
        assert_eq!(names, vec!["btn.png", "btn_1.png", "btn_2.png", "btn_3.png"]);
    }

    #[test]
    fn test_collision_counter_keyed_by_stem() {
        let img = raster(9);
        let mut store = ContentStore::new("ns");
        store.register_image(&img, "Panel.png", None);
        let component = store.register_component("<c/>".into(), "Panel.xml");
        assert_eq!(component.name, "Panel_1.xml");
    }

    #[test]
    fn test_suffixed_name_does_not_reuse_existing() {
        let images: Vec<_> = (0..3).map(raster).collect();
        let mut store = ContentStore::new("ns");
        store.register_image(&images[0], "a_1.png", None);
        store.register_image(&images[1], "a.png", None);
        let third = store.register_image(&images[2], "a.png", None);
        assert_eq!(third.name, "a_1_1.png");
    }

    #[test]
    fn test_ids_monotonic_base36() {
        let images: Vec<_> = (0..40).map(raster).collect();
        let mut store = ContentStore::new("abc");
        for (i, img) in images.iter().enumerate() {
            let id = store.register_image(img, "x.png", None).id.clone();
            assert!(id.starts_with("abc"));
            assert_eq!(suffix_value(&id, "abc"), i as u64);
        }
        assert_eq!(store.resources()[36].id, "abc10");
    }

    #[test]
    fn test_sanitize_unsafe_characters() {
        assert_eq!(sanitize_file_stem("a@b:c?d"), "a_b_c_d");
        assert_eq!(sanitize_file_stem("x/y\\z|w"), "x_y_z_w");
        assert_eq!(sanitize_file_stem("plain name-1"), "plain name-1");
    }

    #[test]
    fn test_sanitized_collisions_deterministic() {
        let run = || {
            let images: Vec<_> = (0..3).map(raster).collect();
            let mut store = ContentStore::new("n");
            images
                .iter()
                .zip(["bg@up.png", "bg:up.png", "bg?up.png"])
                .map(|(img, name)| store.register_image(img, name, None).name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), vec!["bg_up.png", "bg_up_1.png", "bg_up_2.png"]);
        assert_eq!(run(), run());
    }

    #[test]
    fn test_reserved_descriptor_stem() {
        let mut store = ContentStore::new("n");
        let entry = store.register_component("<c/>".into(), "package.xml");
        assert_eq!(entry.name, "package_1.xml");
    }

    #[test]
    fn test_scale9_grid_kept() {
        let img = raster(3);
        let mut store = ContentStore::new("n");
        let entry = store.register_image(&img, "frame.png", Some("4,4,8,8"));
        assert_eq!(entry.scale9_grid.as_deref(), Some("4,4,8,8"));
        assert_eq!(entry.kind, ResourceKind::Image);
    }

    #[test]
    fn test_file_name_without_extension() {
        let mut store = ContentStore::new("n");
        let entry = store.register_component("<c/>".into(), "noext");
        assert_eq!(entry.name, "noext");
    }
}
