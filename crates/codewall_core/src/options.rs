use std::fmt;
use std::str::FromStr;

use crate::Aesthetic;

pub const MIN_FONT_SIZE: u32 = 1;
pub const MAX_FONT_SIZE: u32 = 200;
pub const DEFAULT_FONT_SIZE: u32 = 16;

/// Modifier class added to the content container when comments are hidden.
pub const HIDE_COMMENTS_CLASS: &str = "hide-comments";

/// Visual style applied to the content container. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleClass {
    #[default]
    Venturis,
    WeylandYutani,
    Delos,
    Cyberdyne,
    Tyrell,
}

impl StyleClass {
    pub const ALL: [StyleClass; 5] = [
        StyleClass::Venturis,
        StyleClass::WeylandYutani,
        StyleClass::Delos,
        StyleClass::Cyberdyne,
        StyleClass::Tyrell,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            StyleClass::Venturis => "venturis",
            StyleClass::WeylandYutani => "weyland-yutani",
            StyleClass::Delos => "delos",
            StyleClass::Cyberdyne => "cyberdyne",
            StyleClass::Tyrell => "tyrell",
        }
    }
}

impl fmt::Display for StyleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for StyleClass {
    type Err = OptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        StyleClass::ALL
            .into_iter()
            .find(|style| style.class_name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| OptionError::invalid(ControlId::StyleSelect, value, "unknown style"))
    }
}

/// Closed set of user-facing controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    StyleSelect,
    AestheticSelect,
    FontSize,
    HideComments,
    HideOptions,
}

impl ControlId {
    pub const ALL: [ControlId; 5] = [
        ControlId::StyleSelect,
        ControlId::AestheticSelect,
        ControlId::FontSize,
        ControlId::HideComments,
        ControlId::HideOptions,
    ];

    /// Name used for the control on the page and as a query parameter.
    pub fn name(self) -> &'static str {
        match self {
            ControlId::StyleSelect => "styleSelect",
            ControlId::AestheticSelect => "aestheticSelect",
            ControlId::FontSize => "fontSize",
            ControlId::HideComments => "hideComments",
            ControlId::HideOptions => "hideOptions",
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControlId {
    type Err = OptionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ControlId::ALL
            .into_iter()
            .find(|control| control.name() == name)
            .ok_or_else(|| OptionError::UnknownControl(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("unknown control `{0}`")]
    UnknownControl(String),
    #[error("invalid value `{value}` for {control}: {reason}")]
    InvalidValue {
        control: ControlId,
        value: String,
        reason: &'static str,
    },
}

impl OptionError {
    pub(crate) fn invalid(control: ControlId, value: &str, reason: &'static str) -> Self {
        OptionError::InvalidValue {
            control,
            value: value.to_string(),
            reason,
        }
    }
}

/// What an accepted control change did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlChange {
    Style {
        previous: StyleClass,
        current: StyleClass,
    },
    Aesthetic(Aesthetic),
    FontSize(u32),
    HideComments(bool),
    HideOptions(bool),
}

/// Current values of every control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSet {
    pub style: StyleClass,
    pub aesthetic: Aesthetic,
    pub font_size: u32,
    pub hide_comments: bool,
    pub hide_options: bool,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self {
            style: StyleClass::default(),
            aesthetic: Aesthetic::default(),
            font_size: DEFAULT_FONT_SIZE,
            hide_comments: false,
            hide_options: false,
        }
    }
}

type ControlHandler = fn(&mut OptionSet, &str) -> Result<ControlChange, OptionError>;

impl OptionSet {
    /// Dispatches `value` to the handler registered for `control`.
    /// On error the option set is left untouched.
    pub fn apply(&mut self, control: ControlId, value: &str) -> Result<ControlChange, OptionError> {
        handler_for(control)(self, value)
    }

    /// Current value of `control`, formatted the way `apply` accepts it.
    pub fn value_of(&self, control: ControlId) -> String {
        match control {
            ControlId::StyleSelect => self.style.class_name().to_string(),
            ControlId::AestheticSelect => self.aesthetic.name().to_string(),
            ControlId::FontSize => self.font_size.to_string(),
            ControlId::HideComments => self.hide_comments.to_string(),
            ControlId::HideOptions => self.hide_options.to_string(),
        }
    }
}

fn handler_for(control: ControlId) -> ControlHandler {
    match control {
        ControlId::StyleSelect => set_style,
        ControlId::AestheticSelect => set_aesthetic,
        ControlId::FontSize => set_font_size,
        ControlId::HideComments => set_hide_comments,
        ControlId::HideOptions => set_hide_options,
    }
}

fn set_style(options: &mut OptionSet, value: &str) -> Result<ControlChange, OptionError> {
    let current: StyleClass = value.parse()?;
    let previous = std::mem::replace(&mut options.style, current);
    Ok(ControlChange::Style { previous, current })
}

fn set_aesthetic(options: &mut OptionSet, value: &str) -> Result<ControlChange, OptionError> {
    let aesthetic: Aesthetic = value.parse()?;
    options.aesthetic = aesthetic;
    Ok(ControlChange::Aesthetic(aesthetic))
}

fn set_font_size(options: &mut OptionSet, value: &str) -> Result<ControlChange, OptionError> {
    let trimmed = value.trim();
    let size: u32 = trimmed
        .strip_suffix("px")
        .unwrap_or(trimmed)
        .parse()
        .map_err(|_| OptionError::invalid(ControlId::FontSize, value, "not a whole number"))?;
    if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) {
        return Err(OptionError::invalid(
            ControlId::FontSize,
            value,
            "out of range 1..=200",
        ));
    }
    options.font_size = size;
    Ok(ControlChange::FontSize(size))
}

fn set_hide_comments(options: &mut OptionSet, value: &str) -> Result<ControlChange, OptionError> {
    let flag = parse_flag(ControlId::HideComments, value)?;
    options.hide_comments = flag;
    Ok(ControlChange::HideComments(flag))
}

fn set_hide_options(options: &mut OptionSet, value: &str) -> Result<ControlChange, OptionError> {
    let flag = parse_flag(ControlId::HideOptions, value)?;
    options.hide_options = flag;
    Ok(ControlChange::HideOptions(flag))
}

fn parse_flag(control: ControlId, value: &str) -> Result<bool, OptionError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" | "" => Ok(false),
        _ => Err(OptionError::invalid(control, value, "expected a boolean")),
    }
}

/// Class attribute for the content container: one style class plus the optional
/// hide-comments modifier.
pub fn container_class(style: StyleClass, hide_comments: bool) -> String {
    if hide_comments {
        format!("{} {HIDE_COMMENTS_CLASS}", style.class_name())
    } else {
        style.class_name().to_string()
    }
}
