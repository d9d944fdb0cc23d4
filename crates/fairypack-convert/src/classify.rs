//! Naming conventions for groups and layers.
//!
//! Designers mark up the layer tree by name: a group prefix chooses what the
//! group becomes, and a marker anywhere in a layer name gives it a slot role
//! inside its button or component parent.

/// Group name prefix identifying a component.
pub const COMPONENT_PREFIX: &str = "Com";
/// Group name prefix identifying a common button.
pub const COMMON_BUTTON_PREFIX: &str = "Button";
/// Group name prefix identifying a checkbox button.
pub const CHECK_BUTTON_PREFIX: &str = "CheckButton";
/// Group name prefix identifying a radio button.
pub const RADIO_BUTTON_PREFIX: &str = "RadioButton";

/// Layer name marker for the title slot.
pub const TITLE_MARKER: &str = "@title";
/// Layer name marker for the icon slot.
pub const ICON_MARKER: &str = "@icon";

/// What a group turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// No convention matched; children are inlined into the parent.
    PlainGroup,
    Component,
    CommonButton,
    CheckButton,
    RadioButton,
}

impl GroupKind {
    /// Classify a group by its name prefix.
    pub fn classify(name: &str) -> Self {
        if name.starts_with(COMPONENT_PREFIX) {
            GroupKind::Component
        } else if name.starts_with(CHECK_BUTTON_PREFIX) {
            GroupKind::CheckButton
        } else if name.starts_with(RADIO_BUTTON_PREFIX) {
            GroupKind::RadioButton
        } else if name.starts_with(COMMON_BUTTON_PREFIX) {
            GroupKind::CommonButton
        } else {
            GroupKind::PlainGroup
        }
    }

    /// Value of the `mode` attribute on the button extension, if any.
    pub fn button_mode(&self) -> Option<&'static str> {
        match self {
            GroupKind::CheckButton => Some("Check"),
            GroupKind::RadioButton => Some("Radio"),
            _ => None,
        }
    }
}

/// The slot a layer fills in its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlotRole {
    #[default]
    None,
    Title,
    Icon,
}

impl SlotRole {
    /// Detect the slot marker in a layer name. Title wins over icon.
    pub fn detect(name: &str) -> Self {
        if name.contains(TITLE_MARKER) {
            SlotRole::Title
        } else if name.contains(ICON_MARKER) {
            SlotRole::Icon
        } else {
            SlotRole::None
        }
    }

    /// Element name used instead of the generated `n<k>`.
    pub fn element_name(&self) -> Option<&'static str> {
        match self {
            SlotRole::None => None,
            SlotRole::Title => Some("title"),
            SlotRole::Icon => Some("icon"),
        }
    }
}

/// Visual states of a button, in controller page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Up,
    Down,
    Over,
    SelectedOver,
}

impl ButtonState {
    pub const ALL: [ButtonState; 4] = [
        ButtonState::Up,
        ButtonState::Down,
        ButtonState::Over,
        ButtonState::SelectedOver,
    ];

    /// Controller page index.
    pub fn index(&self) -> usize {
        match self {
            ButtonState::Up => 0,
            ButtonState::Down => 1,
            ButtonState::Over => 2,
            ButtonState::SelectedOver => 3,
        }
    }

    /// Controller page label.
    pub fn label(&self) -> &'static str {
        match self {
            ButtonState::Up => "up",
            ButtonState::Down => "down",
            ButtonState::Over => "over",
            ButtonState::SelectedOver => "selectedOver",
        }
    }

    /// Layer name suffix marking the image for this state.
    pub fn suffix(&self) -> &'static str {
        match self {
            ButtonState::Up => "@up",
            ButtonState::Down => "@down",
            ButtonState::Over => "@over",
            ButtonState::SelectedOver => "@selectedOver",
        }
    }

    /// All states whose suffix appears in `name`.
    pub fn detect(name: &str) -> impl Iterator<Item = ButtonState> + '_ {
        Self::ALL
            .into_iter()
            .filter(move |state| name.contains(state.suffix()))
    }
}
