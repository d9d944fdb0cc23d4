//! Button assembly.
//!
//! A button group becomes a component with a `button` controller whose pages
//! are the four visual states. Layers named with a state suffix are shown on
//! their state's page; states without art borrow another state's image. Title
//! and icon slots are lifted out of the component markup and returned as
//! instance properties for the referencing element.

use crate::classify::{ButtonState, GroupKind, SlotRole};
use crate::store::ResourceRef;
use crate::translate::{build_display_list, ConvertContext, ElementObserver, SlotOverride};
use fairypack_core::{Bounds, DocumentNode, ElementKind, MarkupNode, Result};
use indexmap::IndexMap;

/// Name of the state controller.
pub const CONTROLLER_NAME: &str = "button";

/// Scale applied on press for buttons with a single state image.
const FLAT_DOWN_EFFECT_VALUE: &str = "1.1";

/// Which image is shown for each button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatePages {
    found: [bool; 4],
}

impl StatePages {
    /// `found[i]` tells whether state `i` has its own image.
    pub fn new(found: [bool; 4]) -> Self {
        Self { found }
    }

    /// The state whose image is displayed on `state`'s page.
    ///
    /// A missing `selectedOver` falls back to `down` when it exists; every
    /// other missing state falls back to `up`.
    pub fn display_state(&self, state: ButtonState) -> ButtonState {
        if self.found[state.index()] {
            state
        } else if state == ButtonState::SelectedOver && self.found[ButtonState::Down.index()] {
            ButtonState::Down
        } else {
            ButtonState::Up
        }
    }

    /// Controller pages on which `image`'s layer is visible.
    pub fn pages_for(&self, image: ButtonState) -> Vec<usize> {
        ButtonState::ALL
            .into_iter()
            .filter(|&state| self.display_state(state) == image)
            .map(|state| state.index())
            .collect()
    }

    fn pages_attr(&self, image: ButtonState) -> String {
        self.pages_for(image)
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// State images found in a button's subtree.
#[derive(Debug, Default)]
struct StateImages<'a> {
    images: [Option<&'a DocumentNode>; 4],
    matches: usize,
}

impl<'a> StateImages<'a> {
    /// Scan every descendant; a later match for a state replaces an earlier one.
    fn scan(node: &'a DocumentNode) -> Self {
        let mut found = Self::default();
        for descendant in node.descendants() {
            let Some(name) = descendant.name() else {
                continue;
            };
            for state in ButtonState::detect(name) {
                found.images[state.index()] = Some(descendant);
                found.matches += 1;
            }
        }
        found
    }

    fn found(&self) -> [bool; 4] {
        self.images.map(|image| image.is_some())
    }

    fn state_of(&self, node: &DocumentNode) -> Option<ButtonState> {
        ButtonState::ALL.into_iter().find(|state| {
            self.images[state.index()].is_some_and(|image| std::ptr::eq(image, node))
        })
    }
}

/// Attaches display gears to state images and lifts title/icon slots.
struct ButtonObserver<'a> {
    states: StateImages<'a>,
    pages: StatePages,
}

impl ElementObserver for ButtonObserver<'_> {
    fn observe(&mut self, element: &mut MarkupNode, node: &DocumentNode) -> Option<SlotOverride> {
        if let Some(state) = self.states.state_of(node) {
            element.push(
                MarkupNode::new(ElementKind::GearDisplay)
                    .with_attr("controller", CONTROLLER_NAME)
                    .with_attr("pages", self.pages.pages_attr(state)),
            );
        }

        let role = SlotRole::detect(node.name()?);
        let attribute = match role {
            SlotRole::Title => "text",
            SlotRole::Icon => "url",
            SlotRole::None => return None,
        };
        element
            .remove_attr(attribute)
            .map(|value| SlotOverride { role, value })
    }
}

/// A registered button component plus its instance property overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledButton {
    pub resource: ResourceRef,
    pub properties: IndexMap<String, String>,
}

impl AssembledButton {
    /// The `Button` element attached to the referencing component element.
    pub fn instance_element(&self) -> MarkupNode {
        let mut element = MarkupNode::new(ElementKind::Button);
        for (key, value) in &self.properties {
            element.set_attr(key.as_str(), value);
        }
        element
    }
}

/// Build and register the component for a button-family group.
pub fn assemble_button<'a>(
    ctx: &mut ConvertContext<'a>,
    node: &'a DocumentNode,
    name: &str,
    kind: GroupKind,
    bounds: Bounds,
    path: &str,
) -> Result<AssembledButton> {
    let states = StateImages::scan(node);
    let matches = states.matches;
    let mut observer = ButtonObserver {
        pages: StatePages::new(states.found()),
        states,
    };
    let display_list = build_display_list(ctx, &node.children, &bounds, &mut observer, path)?;

    let controller = MarkupNode::new(ElementKind::Controller)
        .with_attr("name", CONTROLLER_NAME)
        .with_attr("pages", controller_pages());

    let mut extension = MarkupNode::new(ElementKind::Button);
    if let Some(mode) = kind.button_mode() {
        extension.set_attr("mode", mode);
    }
    if matches == 1 {
        extension.set_attr("downEffect", "scale");
        extension.set_attr("downEffectValue", FLAT_DOWN_EFFECT_VALUE);
    }

    let component = MarkupNode::new(ElementKind::Component)
        .with_attr("size", format!("{},{}", bounds.width, bounds.height))
        .with_attr("extention", "Button")
        .with_child(controller)
        .with_child(display_list.element)
        .with_child(extension);

    let mut properties = IndexMap::new();
    for slot in display_list.overrides {
        if let Some(key) = slot.role.element_name() {
            properties.insert(key.to_string(), slot.value);
        }
    }
    if kind == GroupKind::CheckButton {
        properties.insert("checked".to_string(), "true".to_string());
    }

    let resource = ctx
        .store
        .register_component(component.to_xml(), &format!("{name}.xml"))
        .to_ref();
    tracing::debug!(button = name, id = %resource.id, state_images = matches, "assembled button");

    Ok(AssembledButton {
        resource,
        properties,
    })
}

/// `0,up,1,down,2,over,3,selectedOver`
fn controller_pages() -> String {
    ButtonState::ALL
        .iter()
        .map(|state| format!("{},{}", state.index(), state.label()))
        .collect::<Vec<_>>()
        .join(",")
}
