//! Variant detection on themed product pages.
//!
//! Tries detection strategies in priority order (checked form controls,
//! selected-state CSS classes, `aria-checked`, background-color swatch
//! heuristic) and returns the first strategy's candidates, normalized into
//! a [`VariantKey`]. Themes vary wildly in how they mark the selected
//! variant, which is why one strategy is never enough.

use fitform_core::slug::VariantKey;

use crate::page::{ControlKind, ControlSnapshot, FormSnapshot};

const SELECTED_CLASS_CONVENTIONS: [&str; 5] = [
    "selected",
    "active",
    "is-selected",
    "is-active",
    "swatch--selected",
];

/// Resolves the currently selected variant combination from a form snapshot.
///
/// Returns an empty key when no strategy finds a selection; the caller treats
/// that as "try again next tick".
#[must_use]
pub fn resolve_variant_key(form: &FormSnapshot) -> VariantKey {
    // Strategy 1: checked radios/checkboxes and selected dropdown options
    let candidates: Vec<&str> = form
        .controls
        .iter()
        .filter(|control| {
            control.checked
                && matches!(
                    control.kind,
                    ControlKind::Radio | ControlKind::Checkbox | ControlKind::SelectedOption
                )
        })
        .filter_map(ControlSnapshot::candidate_text)
        .collect();
    if !candidates.is_empty() {
        tracing::debug!(count = candidates.len(), "resolved variant from checked controls");
        return VariantKey::from_tokens(candidates);
    }

    // Strategy 2: selected-state CSS class conventions
    let candidates: Vec<&str> = form
        .controls
        .iter()
        .filter(|control| {
            control
                .css_classes
                .iter()
                .any(|class| SELECTED_CLASS_CONVENTIONS.contains(&class.as_str()))
        })
        .filter_map(ControlSnapshot::candidate_text)
        .collect();
    if !candidates.is_empty() {
        tracing::debug!(count = candidates.len(), "resolved variant from selected-state classes");
        return VariantKey::from_tokens(candidates);
    }

    // Strategy 3: aria-checked="true"
    let candidates: Vec<&str> = form
        .controls
        .iter()
        .filter(|control| control.aria_checked.as_deref() == Some("true"))
        .filter_map(ControlSnapshot::candidate_text)
        .collect();
    if !candidates.is_empty() {
        tracing::debug!(count = candidates.len(), "resolved variant from aria-checked");
        return VariantKey::from_tokens(candidates);
    }

    // Strategy 4: highlighted swatch backgrounds on plain option elements
    let candidates: Vec<&str> = form
        .controls
        .iter()
        .filter(|control| {
            control.kind == ControlKind::Element
                && control
                    .background_color
                    .as_deref()
                    .is_some_and(is_highlight_color)
        })
        .filter_map(ControlSnapshot::candidate_text)
        .collect();
    if !candidates.is_empty() {
        tracing::debug!(count = candidates.len(), "resolved variant from swatch backgrounds");
        return VariantKey::from_tokens(candidates);
    }

    VariantKey::default()
}

/// Returns `true` for a computed background color that plausibly marks a
/// highlighted swatch. Transparent, white, and black backgrounds are what
/// unselected options and bare elements report, so they never count.
fn is_highlight_color(color: &str) -> bool {
    let compact: String = color
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if compact.is_empty() {
        return false;
    }
    const FLAT: [&str; 10] = [
        "transparent",
        "inherit",
        "initial",
        "none",
        "#fff",
        "#ffffff",
        "#000",
        "#000000",
        "rgb(255,255,255)",
        "rgb(0,0,0)",
    ];
    if FLAT.contains(&compact.as_str()) {
        return false;
    }
    // Zero-alpha rgba is fully transparent whatever the channels say.
    if compact.starts_with("rgba(") && compact.ends_with(",0)") {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked_radio(value: &str) -> ControlSnapshot {
        ControlSnapshot {
            kind: ControlKind::Radio,
            checked: true,
            value: Some(value.to_owned()),
            ..ControlSnapshot::default()
        }
    }

    fn classed_element(text: &str, class: &str) -> ControlSnapshot {
        ControlSnapshot {
            kind: ControlKind::Element,
            text: Some(text.to_owned()),
            css_classes: vec![class.to_owned()],
            ..ControlSnapshot::default()
        }
    }

    fn form_with(controls: Vec<ControlSnapshot>) -> FormSnapshot {
        FormSnapshot {
            action: "/cart/add".to_owned(),
            controls,
            ..FormSnapshot::default()
        }
    }

    #[test]
    fn checked_controls_win_over_everything_else() {
        let form = form_with(vec![
            classed_element("Large", "selected"),
            checked_radio("Custom Size"),
        ]);
        assert_eq!(resolve_variant_key(&form).as_str(), "custom-size");
    }

    #[test]
    fn unchecked_radios_do_not_count() {
        let form = form_with(vec![ControlSnapshot {
            kind: ControlKind::Radio,
            checked: false,
            value: Some("Custom Size".to_owned()),
            ..ControlSnapshot::default()
        }]);
        assert!(resolve_variant_key(&form).is_empty());
    }

    #[test]
    fn selected_class_conventions_are_recognized() {
        for class in ["selected", "active", "is-selected", "is-active", "swatch--selected"] {
            let form = form_with(vec![classed_element("Custom Size", class)]);
            assert_eq!(resolve_variant_key(&form).as_str(), "custom-size", "class {class}");
        }
    }

    #[test]
    fn unrelated_classes_are_ignored() {
        let form = form_with(vec![classed_element("Custom Size", "swatch")]);
        assert!(resolve_variant_key(&form).is_empty());
    }

    #[test]
    fn aria_checked_true_is_a_selection() {
        let form = form_with(vec![ControlSnapshot {
            kind: ControlKind::Element,
            aria_label: Some("Custom Size".to_owned()),
            aria_checked: Some("true".to_owned()),
            ..ControlSnapshot::default()
        }]);
        assert_eq!(resolve_variant_key(&form).as_str(), "custom-size");
    }

    #[test]
    fn aria_checked_false_is_not() {
        let form = form_with(vec![ControlSnapshot {
            kind: ControlKind::Element,
            aria_label: Some("Custom Size".to_owned()),
            aria_checked: Some("false".to_owned()),
            ..ControlSnapshot::default()
        }]);
        assert!(resolve_variant_key(&form).is_empty());
    }

    #[test]
    fn highlighted_swatch_background_is_last_resort() {
        let form = form_with(vec![
            ControlSnapshot {
                kind: ControlKind::Element,
                text: Some("Small".to_owned()),
                background_color: Some("rgba(0, 0, 0, 0)".to_owned()),
                ..ControlSnapshot::default()
            },
            ControlSnapshot {
                kind: ControlKind::Element,
                text: Some("Custom Size".to_owned()),
                background_color: Some("rgb(18, 82, 199)".to_owned()),
                ..ControlSnapshot::default()
            },
        ]);
        assert_eq!(resolve_variant_key(&form).as_str(), "custom-size");
    }

    #[test]
    fn white_and_black_backgrounds_never_count() {
        for color in ["#fff", "#FFFFFF", "#000", "rgb(0, 0, 0)", "transparent", ""] {
            assert!(!is_highlight_color(color), "color {color:?}");
        }
        assert!(is_highlight_color("#e0245e"));
        assert!(is_highlight_color("rgba(18, 82, 199, 0.9)"));
    }

    #[test]
    fn multi_selection_is_order_independent() {
        let forward = form_with(vec![checked_radio("Custom Size"), checked_radio("Blue")]);
        let reverse = form_with(vec![checked_radio("Blue"), checked_radio("Custom Size")]);
        assert_eq!(
            resolve_variant_key(&forward),
            resolve_variant_key(&reverse)
        );
        assert_eq!(resolve_variant_key(&forward).as_str(), "blue,custom-size");
    }

    #[test]
    fn empty_form_resolves_to_empty_key() {
        let form = form_with(Vec::new());
        assert!(resolve_variant_key(&form).is_empty());
    }
}
