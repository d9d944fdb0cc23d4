//! Layer tree to UI package translation.
//!
//! [`convert`] walks a [`Document`] and produces the set of resources making
//! up a UI package: deduplicated images, one component per component or
//! button group, and a root component for the document itself. Writing the
//! package to disk is left to `fairypack-io`.

pub mod build_id;
pub mod button;
pub mod classify;
pub mod manifest;
pub mod store;
pub mod translate;

pub use build_id::{BuildId, PACKAGE_ID_LEN};
pub use button::{assemble_button, AssembledButton, StatePages};
pub use classify::{ButtonState, GroupKind, SlotRole};
pub use manifest::{Manifest, ManifestEntry, PACKAGE_DESCRIPTOR};
pub use store::{ContentStore, ResourceData, ResourceEntry, ResourceKind, ResourceRef};
pub use translate::{build_component, ConvertContext};

use fairypack_core::{Document, Result};
use serde::{Deserialize, Serialize};

/// Options for one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Leave the `font` attribute off text elements.
    pub ignore_font: bool,
    /// Reuse a build id instead of generating one.
    pub build_id: Option<String>,
}

impl ConvertOptions {
    pub fn with_ignore_font(mut self, ignore_font: bool) -> Self {
        self.ignore_font = ignore_font;
        self
    }

    pub fn with_build_id(mut self, build_id: impl Into<String>) -> Self {
        self.build_id = Some(build_id.into());
        self
    }
}

/// Result of converting one document.
#[derive(Debug)]
pub struct Conversion<'a> {
    pub build_id: BuildId,
    /// The document's own component.
    pub root: ResourceRef,
    /// Every resource in registration order; the root component is last.
    pub resources: Vec<ResourceEntry<'a>>,
}

impl Conversion<'_> {
    pub fn package_id(&self) -> &str {
        self.build_id.package_id()
    }

    pub fn manifest(&self) -> Manifest {
        Manifest::from_resources(self.package_id(), &self.resources)
    }
}

/// Convert a document into package resources.
///
/// `root_name` names the document's own component, normally the input file
/// stem.
pub fn convert<'a>(
    doc: &'a Document,
    root_name: &str,
    options: &ConvertOptions,
) -> Result<Conversion<'a>> {
    let build_id = match options.build_id.as_deref() {
        Some(value) => BuildId::parse(value)?,
        None => BuildId::generate(),
    };

    let mut ctx = ConvertContext::new(build_id, options.clone());
    let root = build_component(&mut ctx, root_name, doc.bounds(), &doc.children, "")?;

    let ConvertContext { store, build_id, .. } = ctx;
    let resources = store.into_resources();
    tracing::info!(
        build_id = %build_id,
        nodes = doc.node_count(),
        resources = resources.len(),
        "converted document"
    );

    Ok(Conversion {
        build_id,
        root,
        resources,
    })
}
