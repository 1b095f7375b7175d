//! Page snapshots sampled by the host shim each widget tick.

use serde::Deserialize;

/// What kind of DOM control a snapshot entry was taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Radio,
    Checkbox,
    SelectedOption,
    #[default]
    Element,
}

/// One candidate variant control observed on the product page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ControlSnapshot {
    pub kind: ControlKind,
    pub checked: bool,
    pub value: Option<String>,
    pub data_value: Option<String>,
    pub text: Option<String>,
    pub aria_label: Option<String>,
    pub aria_checked: Option<String>,
    pub css_classes: Vec<String>,
    pub background_color: Option<String>,
}

impl ControlSnapshot {
    /// The raw label for this control, taken from `value`, `data_value`,
    /// `text`, and `aria_label` in that preference order.
    #[must_use]
    pub fn candidate_text(&self) -> Option<&str> {
        [&self.value, &self.data_value, &self.text, &self.aria_label]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|text| !text.is_empty())
    }
}

/// A product form observed on the page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormSnapshot {
    pub action: String,
    pub controls: Vec<ControlSnapshot>,
    /// Values of the theme's own size selector, harvested for the
    /// nearest-size dropdown.
    pub size_selector_values: Vec<String>,
    pub has_buy_buttons: bool,
    pub variant_picker_present: bool,
}

impl FormSnapshot {
    /// Returns `true` when the form posts to the platform cart-add path.
    #[must_use]
    pub fn is_cart_add_form(&self) -> bool {
        self.action.contains("/cart/add")
    }
}

/// Everything the widget needs to know about the page on one tick.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageSnapshot {
    pub product_form: Option<FormSnapshot>,
    pub viewport_width: u32,
    pub widget_container_present: bool,
}

impl PageSnapshot {
    /// The cart-add form, if the page has one.
    #[must_use]
    pub fn cart_form(&self) -> Option<&FormSnapshot> {
        self.product_form
            .as_ref()
            .filter(|form| form.is_cart_add_form())
    }
}
