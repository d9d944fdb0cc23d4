//! Layer tree to UI markup translation.
//!
//! [`build_component`] turns a group (or the document root) into a component
//! resource. It walks the children front-to-back through [`translate_node`],
//! which classifies each node and emits at most one element into the current
//! display list. Components and buttons nested inside start a fresh walk with
//! their own box as coordinate origin.

use crate::button::assemble_button;
use crate::classify::{GroupKind, SlotRole};
use crate::store::{ContentStore, ResourceRef};
use crate::{BuildId, ConvertOptions};
use fairypack_core::{
    Bounds, ConvertError, DocumentNode, ElementKind, MarkupNode, Result, TextAlign, TextRun,
    OPAQUE,
};

/// Padding added around text boxes.
const TEXT_PADDING: i32 = 4;

/// Scheme prefix of package resource urls.
const UI_URL_SCHEME: &str = "ui://";

/// State shared by every translator call of one run.
#[derive(Debug)]
pub struct ConvertContext<'a> {
    pub store: ContentStore<'a>,
    pub options: ConvertOptions,
    pub build_id: BuildId,
}

impl<'a> ConvertContext<'a> {
    pub fn new(build_id: BuildId, options: ConvertOptions) -> Self {
        Self {
            store: ContentStore::new(build_id.item_namespace()),
            options,
            build_id,
        }
    }

    fn element_id(&self, generated_name: &str) -> String {
        format!("{generated_name}_{}", self.build_id.item_namespace())
    }

    fn resource_url(&self, resource: &ResourceRef) -> String {
        format!("{UI_URL_SCHEME}{}{}", self.build_id.package_id(), resource.id)
    }
}

/// A slot value pulled out of an element by an observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOverride {
    pub role: SlotRole,
    pub value: String,
}

/// Hook run on every element before it joins its display list.
///
/// The observer may edit the element in place and hand back a slot value
/// that the caller exposes as an instance property.
pub trait ElementObserver {
    fn observe(&mut self, element: &mut MarkupNode, node: &DocumentNode) -> Option<SlotOverride>;
}

/// Observer that leaves elements untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl ElementObserver for NoObserver {
    fn observe(&mut self, _element: &mut MarkupNode, _node: &DocumentNode) -> Option<SlotOverride> {
        None
    }
}

/// A display list under construction plus the slot values collected for it.
#[derive(Debug)]
pub struct DisplayList {
    pub element: MarkupNode,
    pub overrides: Vec<SlotOverride>,
}

impl DisplayList {
    fn new() -> Self {
        Self {
            element: MarkupNode::new(ElementKind::DisplayList),
            overrides: Vec::new(),
        }
    }

    /// Generated name for the next element, `n<k>` with k 1-based.
    fn next_name(&self) -> String {
        format!("n{}", self.len() + 1)
    }

    pub fn len(&self) -> usize {
        self.element.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.element.children.is_empty()
    }
}

/// Build a component resource from a group's children.
///
/// `name` is the component name without extension; `bounds` is both the
/// component size and the coordinate origin of its children.
pub fn build_component<'a>(
    ctx: &mut ConvertContext<'a>,
    name: &str,
    bounds: Bounds,
    children: &'a [DocumentNode],
    path: &str,
) -> Result<ResourceRef> {
    let display_list = build_display_list(ctx, children, &bounds, &mut NoObserver, path)?;

    let component = MarkupNode::new(ElementKind::Component)
        .with_attr("size", format!("{},{}", bounds.width, bounds.height))
        .with_child(display_list.element);

    let resource = ctx
        .store
        .register_component(component.to_xml(), &format!("{name}.xml"))
        .to_ref();
    tracing::debug!(component = name, id = %resource.id, "built component");
    Ok(resource)
}

/// Translate `children` front-to-back into a new display list.
pub fn build_display_list<'a>(
    ctx: &mut ConvertContext<'a>,
    children: &'a [DocumentNode],
    root: &Bounds,
    observer: &mut dyn ElementObserver,
    path: &str,
) -> Result<DisplayList> {
    let mut display_list = DisplayList::new();
    for (index, child) in children.iter().enumerate().rev() {
        translate_node(ctx, child, index, root, &mut display_list, observer, path)?;
    }
    Ok(display_list)
}

/// Translate one node into the display list, recursing into plain groups.
///
/// `index` is the node's position among its siblings and only feeds error
/// paths for unnamed nodes.
pub fn translate_node<'a>(
    ctx: &mut ConvertContext<'a>,
    node: &'a DocumentNode,
    index: usize,
    root: &Bounds,
    display_list: &mut DisplayList,
    observer: &mut dyn ElementObserver,
    parent_path: &str,
) -> Result<()> {
    let name = node
        .name()
        .ok_or_else(|| ConvertError::malformed(format!("{parent_path}/#{index}"), "name"))?;
    let path = format!("{parent_path}/{name}");
    let slot = SlotRole::detect(name);

    let element = if node.is_group() {
        match GroupKind::classify(name) {
            GroupKind::PlainGroup => {
                for (i, child) in node.children.iter().enumerate().rev() {
                    translate_node(ctx, child, i, root, display_list, observer, &path)?;
                }
                return Ok(());
            }
            GroupKind::Component => {
                let bounds = require_bounds(node, &path)?;
                let resource = build_component(ctx, name, bounds, &node.children, &path)?;
                Some(component_ref(ctx, display_list, slot, &resource, &bounds, root))
            }
            kind @ (GroupKind::CommonButton | GroupKind::CheckButton | GroupKind::RadioButton) => {
                let bounds = require_bounds(node, &path)?;
                let button = assemble_button(ctx, node, name, kind, bounds, &path)?;
                let mut element =
                    component_ref(ctx, display_list, slot, &button.resource, &bounds, root);
                element.push(button.instance_element());
                Some(element)
            }
        }
    } else if let Some(text) = &node.text {
        let bounds = require_bounds(node, &path)?;
        Some(text_element(ctx, display_list, slot, text, &bounds, root))
    } else if !node.is_empty() {
        let bounds = require_bounds(node, &path)?;
        let image = node
            .image
            .as_ref()
            .ok_or_else(|| ConvertError::malformed(path.as_str(), "image"))?;
        let resource = ctx
            .store
            .register_image(image, &format!("{name}.png"), node.scale9_grid.as_deref())
            .to_ref();
        Some(image_element(ctx, display_list, slot, &resource, &bounds, root))
    } else {
        None
    };

    if let Some(mut element) = element {
        if node.opacity < OPAQUE {
            element.set_attr("alpha", format_alpha(node.opacity));
        }
        if let Some(slot_override) = observer.observe(&mut element, node) {
            display_list.overrides.push(slot_override);
        }
        display_list.element.push(element);
    }
    Ok(())
}

fn require_bounds(node: &DocumentNode, path: &str) -> Result<Bounds> {
    node.bounds
        .ok_or_else(|| ConvertError::malformed(path, "bounds"))
}

/// Start an element with its `id` and `name` attributes.
fn start_element(
    ctx: &ConvertContext<'_>,
    kind: ElementKind,
    display_list: &DisplayList,
    slot: SlotRole,
) -> MarkupNode {
    let generated = display_list.next_name();
    let name = slot
        .element_name()
        .map(str::to_string)
        .unwrap_or_else(|| generated.clone());
    MarkupNode::new(kind)
        .with_attr("id", ctx.element_id(&generated))
        .with_attr("name", name)
}

fn component_ref(
    ctx: &ConvertContext<'_>,
    display_list: &DisplayList,
    slot: SlotRole,
    resource: &ResourceRef,
    bounds: &Bounds,
    root: &Bounds,
) -> MarkupNode {
    let (x, y) = bounds.offset_from(root);
    start_element(ctx, ElementKind::Component, display_list, slot)
        .with_attr("src", &resource.id)
        .with_attr("fileName", &resource.name)
        .with_attr("xy", format!("{x},{y}"))
}

fn text_element(
    ctx: &ConvertContext<'_>,
    display_list: &DisplayList,
    slot: SlotRole,
    text: &TextRun,
    bounds: &Bounds,
    root: &Bounds,
) -> MarkupNode {
    let mut element = start_element(ctx, ElementKind::Text, display_list, slot)
        .with_attr("text", &text.text);

    let padded = bounds.padded(TEXT_PADDING);
    let (x, y) = padded.offset_from(root);
    if slot == SlotRole::Title {
        element.set_attr("xy", format!("0,{y}"));
        element.set_attr("size", format!("{},{}", root.width, padded.height));
        element.set_attr("align", TextAlign::Center.as_str());
    } else {
        element.set_attr("xy", format!("{x},{y}"));
        element.set_attr("size", format!("{},{}", padded.width, padded.height));
        if text.align != TextAlign::Left {
            element.set_attr("align", text.align.as_str());
        }
    }

    element.set_attr("vAlign", "middle");
    element.set_attr("autoSize", "none");
    if !ctx.options.ignore_font {
        element.set_attr("font", &text.font);
    }
    element.set_attr("fontSize", text.size);
    element.set_attr("color", text.color.to_hex_rgb());
    element
}

fn image_element(
    ctx: &ConvertContext<'_>,
    display_list: &DisplayList,
    slot: SlotRole,
    resource: &ResourceRef,
    bounds: &Bounds,
    root: &Bounds,
) -> MarkupNode {
    let (x, y) = bounds.offset_from(root);
    if slot == SlotRole::Icon {
        start_element(ctx, ElementKind::Loader, display_list, slot)
            .with_attr("xy", format!("{x},{y}"))
            .with_attr("size", format!("{},{}", bounds.width, bounds.height))
            .with_attr("url", ctx.resource_url(resource))
            .with_attr("fileName", &resource.name)
    } else {
        start_element(ctx, ElementKind::Image, display_list, slot)
            .with_attr("xy", format!("{x},{y}"))
            .with_attr("src", &resource.id)
            .with_attr("fileName", &resource.name)
    }
}

/// Opacity as a 0..1 fraction with two decimals.
pub fn format_alpha(opacity: u8) -> String {
    format!("{:.2}", f64::from(opacity) / f64::from(OPAQUE))
}
