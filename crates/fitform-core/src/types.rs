//! Domain enums shared by the store, the admin API, and the widget engine.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// How a matched size set is presented on the product page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStyle {
    #[default]
    Inline,
    Modal,
}

impl DisplayStyle {
    /// Storefront wire form (`INLINE` / `MODAL`).
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            DisplayStyle::Inline => "INLINE",
            DisplayStyle::Modal => "MODAL",
        }
    }
}

impl std::fmt::Display for DisplayStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayStyle::Inline => write!(f, "inline"),
            DisplayStyle::Modal => write!(f, "modal"),
        }
    }
}

impl std::str::FromStr for DisplayStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" => Ok(DisplayStyle::Inline),
            "modal" => Ok(DisplayStyle::Modal),
            other => Err(CoreError::InvalidDisplayStyle(other.to_string())),
        }
    }
}

/// Input control type for a measurement field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Number,
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputType::Text => write!(f, "text"),
            InputType::Number => write!(f, "number"),
        }
    }
}

impl std::str::FromStr for InputType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(InputType::Text),
            "number" => Ok(InputType::Number),
            other => Err(CoreError::InvalidInputType(other.to_string())),
        }
    }
}

/// Where a set's header image sits relative to its fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePosition {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl ImagePosition {
    /// Whether image and fields sit side by side rather than stacked.
    #[must_use]
    pub fn is_row(self) -> bool {
        matches!(self, ImagePosition::Left | ImagePosition::Right)
    }

    /// Whether the image block renders before the fields block.
    #[must_use]
    pub fn image_first(self) -> bool {
        matches!(self, ImagePosition::Top | ImagePosition::Left)
    }
}

impl std::fmt::Display for ImagePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImagePosition::Top => write!(f, "top"),
            ImagePosition::Bottom => write!(f, "bottom"),
            ImagePosition::Left => write!(f, "left"),
            ImagePosition::Right => write!(f, "right"),
        }
    }
}

impl std::str::FromStr for ImagePosition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(ImagePosition::Top),
            "bottom" => Ok(ImagePosition::Bottom),
            "left" => Ok(ImagePosition::Left),
            "right" => Ok(ImagePosition::Right),
            other => Err(CoreError::InvalidImagePosition(other.to_string())),
        }
    }
}

/// Shop-wide default axis for image/fields arrangement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageLayout {
    #[default]
    Vertical,
    Horizontal,
}

impl std::fmt::Display for ImageLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageLayout::Vertical => write!(f, "vertical"),
            ImageLayout::Horizontal => write!(f, "horizontal"),
        }
    }
}

impl std::str::FromStr for ImageLayout {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vertical" => Ok(ImageLayout::Vertical),
            "horizontal" => Ok(ImageLayout::Horizontal),
            other => Err(CoreError::InvalidImageLayout(other.to_string())),
        }
    }
}

/// CSS border style applied to the widget frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    None,
}

impl std::fmt::Display for BorderStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BorderStyle::Solid => write!(f, "solid"),
            BorderStyle::Dashed => write!(f, "dashed"),
            BorderStyle::Dotted => write!(f, "dotted"),
            BorderStyle::None => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for BorderStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(BorderStyle::Solid),
            "dashed" => Ok(BorderStyle::Dashed),
            "dotted" => Ok(BorderStyle::Dotted),
            "none" => Ok(BorderStyle::None),
            other => Err(CoreError::InvalidBorderStyle(other.to_string())),
        }
    }
}

/// Billing tier resolved from the shop's active app subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanTier {
    Free,
    Pro,
    Ultimate,
}

/// Feature allowances for a [`PlanTier`]. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    pub max_sets: Option<u32>,
    pub max_fields_per_set: Option<u32>,
}

impl PlanTier {
    /// Map an active subscription name to a tier.
    ///
    /// Shops with no active subscription, or one we do not recognize, are on
    /// the free tier. Both the display names and the legacy plan keys are
    /// accepted.
    #[must_use]
    pub fn from_subscription_name(name: Option<&str>) -> Self {
        match name {
            Some("Pro Plan" | "PRO_PLAN") => PlanTier::Pro,
            Some("Ultimate Plan" | "ULTIMATE_PLAN") => PlanTier::Ultimate,
            _ => PlanTier::Free,
        }
    }

    #[must_use]
    pub fn limits(self) -> PlanLimits {
        match self {
            PlanTier::Free => PlanLimits {
                max_sets: Some(1),
                max_fields_per_set: Some(3),
            },
            PlanTier::Pro => PlanLimits {
                max_sets: Some(100),
                max_fields_per_set: None,
            },
            PlanTier::Ultimate => PlanLimits {
                max_sets: None,
                max_fields_per_set: None,
            },
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanTier::Free => write!(f, "free"),
            PlanTier::Pro => write!(f, "pro"),
            PlanTier::Ultimate => write!(f, "ultimate"),
        }
    }
}
