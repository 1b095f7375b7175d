//! Per-widget state machine.
//!
//! One [`WidgetSession`] owns all mutable widget state; every method is
//! synchronous and returns effects for the host shim to apply, so the
//! machine is testable without a DOM or a network.

use std::collections::HashMap;

use fitform_core::slug::VariantKey;

use crate::page::PageSnapshot;
use crate::render::{self, InsertPoint, RenderedWidget, NEAREST_SIZE_LABEL};
use crate::resolver::resolve_variant_key;
use crate::types::{ConfigResponse, DesignConfig, SizeSetConfig};

/// Lifecycle of one widget instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No matched sets; the page behaves as if the app were not installed.
    #[default]
    Idle,
    /// Widget on screen, required fields incomplete.
    Rendered,
    /// All required fields complete; cart controls usable.
    Valid,
}

/// What a tick asks the driver to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    NoChange,
    FetchNeeded(VariantKey),
}

/// A cart line-item property to inject as a hidden input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartProperty {
    pub name: String,
    pub value: String,
}

/// DOM work the host shim performs on the session's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    InsertInline {
        html: String,
        insert_point: InsertPoint,
    },
    OpenModal {
        html: String,
    },
    ShowModalTrigger {
        html: String,
    },
    /// Remove every widget element this session put on the page.
    Teardown,
    SetControlsEnabled(bool),
}

/// Verdict for an attempted cart submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Let the submit through after swapping the injected properties.
    Proceed {
        /// Previously injected property names to remove first.
        remove: Vec<String>,
        inject: Vec<CartProperty>,
    },
    /// Block the submit and tell the shopper why.
    Cancel { alert: String },
}

#[derive(Debug, Default)]
pub struct WidgetSession {
    state: SessionState,
    memoized_key: Option<VariantKey>,
    matched_sets: Vec<SizeSetConfig>,
    design: Option<DesignConfig>,
    values: HashMap<String, String>,
    injected_names: Vec<String>,
    modal_open: bool,
    last_page: PageSnapshot,
}

impl WidgetSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn memoized_key(&self) -> Option<&VariantKey> {
        self.memoized_key.as_ref()
    }

    /// Resolves the page's variant selection and decides whether a config
    /// fetch is needed.
    ///
    /// Pages without a cart-add form are ignored. An empty or unchanged key
    /// is the memoization short-circuit: nothing is fetched and nothing
    /// changes on screen.
    pub fn tick(&mut self, page: &PageSnapshot) -> TickOutcome {
        let Some(form) = page.cart_form() else {
            return TickOutcome::NoChange;
        };
        let key = resolve_variant_key(form);
        self.last_page = page.clone();
        if key.is_empty() || self.memoized_key.as_ref() == Some(&key) {
            return TickOutcome::NoChange;
        }
        self.memoized_key = Some(key.clone());
        TickOutcome::FetchNeeded(key)
    }

    /// Applies a fetched config, unless the session has moved on to another
    /// variant since the request went out. The last response whose request
    /// key still equals the memoized key wins; anything else is dropped.
    pub fn apply_config(&mut self, key: &VariantKey, config: ConfigResponse) -> Vec<Effect> {
        if self.memoized_key.as_ref() != Some(key) {
            tracing::debug!(stale_key = %key, "discarding config response for a superseded variant");
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.state != SessionState::Idle {
            effects.push(Effect::Teardown);
        }
        self.values.clear();
        self.modal_open = false;
        self.matched_sets = config.sets;
        self.design = config.design;

        if self.matched_sets.is_empty() {
            self.state = SessionState::Idle;
            if effects.is_empty() {
                effects.push(Effect::Teardown);
            }
            effects.push(Effect::SetControlsEnabled(true));
            return effects;
        }

        if self.wants_modal() {
            self.modal_open = true;
            effects.push(Effect::OpenModal {
                html: render::render_modal(&self.matched_sets, self.design.as_ref(), &self.last_page),
            });
        } else {
            let RenderedWidget { html, insert_point } =
                render::render_inline(&self.matched_sets, self.design.as_ref(), &self.last_page);
            effects.push(Effect::InsertInline { html, insert_point });
        }
        let valid = self.recompute_validity();
        effects.push(Effect::SetControlsEnabled(valid));
        effects
    }

    /// Records a fetch failure for `key` so the next tick can retry instead
    /// of short-circuiting on the memoized key.
    pub fn fetch_failed(&mut self, key: &VariantKey) {
        if self.memoized_key.as_ref() == Some(key) {
            self.memoized_key = None;
        }
    }

    /// Records an input edit and re-evaluates required completeness.
    ///
    /// Numeric fields accept only digits and dots; an offending update is
    /// filtered out rather than treated as an error, leaving the previous
    /// value in place.
    pub fn input_changed(&mut self, label: &str, value: &str) -> Vec<Effect> {
        if self.state == SessionState::Idle {
            return Vec::new();
        }
        if self.is_numeric_field(label) && !value.chars().all(|c| c.is_ascii_digit() || c == '.') {
            tracing::debug!(label, "filtered non-numeric input");
            return Vec::new();
        }
        self.values.insert(label.to_owned(), value.to_owned());

        let was_valid = self.state == SessionState::Valid;
        let valid = self.recompute_validity();
        if was_valid == valid {
            Vec::new()
        } else {
            vec![Effect::SetControlsEnabled(valid)]
        }
    }

    /// Decides an attempted cart submit.
    ///
    /// Every proceed carries the previously injected property names for
    /// removal first, so stale values from an earlier submit never ride
    /// along.
    pub fn submit_requested(&mut self) -> SubmitDecision {
        match self.state {
            SessionState::Idle => SubmitDecision::Proceed {
                remove: std::mem::take(&mut self.injected_names),
                inject: Vec::new(),
            },
            SessionState::Rendered => SubmitDecision::Cancel {
                alert: "Please fill in the required size fields before adding to cart.".to_owned(),
            },
            SessionState::Valid => {
                let inject = self.collect_properties();
                let remove = std::mem::take(&mut self.injected_names);
                self.injected_names = inject.iter().map(|p| p.name.clone()).collect();
                SubmitDecision::Proceed { remove, inject }
            }
        }
    }

    /// Swaps the open overlay for the docked re-open trigger.
    pub fn modal_closed(&mut self) -> Vec<Effect> {
        if !self.modal_open {
            return Vec::new();
        }
        self.modal_open = false;
        vec![Effect::ShowModalTrigger {
            html: render::render_modal_trigger(),
        }]
    }

    /// Re-opens the modal from the docked trigger. A no-op while an overlay
    /// is already open or when there is nothing to show.
    pub fn modal_open_requested(&mut self) -> Vec<Effect> {
        if self.state == SessionState::Idle || !self.wants_modal() || self.modal_open {
            return Vec::new();
        }
        self.modal_open = true;
        vec![Effect::OpenModal {
            html: render::render_modal(&self.matched_sets, self.design.as_ref(), &self.last_page),
        }]
    }

    /// The first matched set decides the presentation mode for the render.
    fn wants_modal(&self) -> bool {
        self.matched_sets.first().is_some_and(SizeSetConfig::is_modal)
    }

    fn size_values(&self) -> &[String] {
        self.last_page
            .cart_form()
            .map_or(&[], |form| form.size_selector_values.as_slice())
    }

    fn is_numeric_field(&self, label: &str) -> bool {
        self.matched_sets
            .iter()
            .flat_map(|set| &set.fields)
            .any(|field| field.label == label && field.is_numeric())
    }

    fn has_value(&self, label: &str) -> bool {
        self.values
            .get(label)
            .is_some_and(|value| !value.trim().is_empty())
    }

    fn is_complete(&self) -> bool {
        for set in &self.matched_sets {
            for field in &set.fields {
                if field.required && !self.has_value(&field.label) {
                    return false;
                }
            }
            if set.req_nearest_size
                && !render::nearest_size_options(set, self.size_values()).is_empty()
                && !self.has_value(NEAREST_SIZE_LABEL)
            {
                return false;
            }
        }
        true
    }

    /// Moves between `Rendered` and `Valid` per required completeness and
    /// reports whether the controls should be enabled.
    fn recompute_validity(&mut self) -> bool {
        let valid = self.is_complete();
        self.state = if valid {
            SessionState::Valid
        } else {
            SessionState::Rendered
        };
        valid
    }

    fn collect_properties(&self) -> Vec<CartProperty> {
        let mut inject: Vec<CartProperty> = Vec::new();
        let mut push = |label: &str, value: Option<&String>| {
            let Some(value) = value else { return };
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return;
            }
            let name = format!("properties[{label}]");
            if inject.iter().any(|p| p.name == name) {
                return;
            }
            inject.push(CartProperty {
                name,
                value: trimmed.to_owned(),
            });
        };
        for set in &self.matched_sets {
            for field in &set.fields {
                push(&field.label, self.values.get(&field.label));
            }
            if set.req_nearest_size
                && !render::nearest_size_options(set, self.size_values()).is_empty()
            {
                push(NEAREST_SIZE_LABEL, self.values.get(NEAREST_SIZE_LABEL));
            }
        }
        inject
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ControlKind, ControlSnapshot, FormSnapshot};
    use crate::types::FieldConfig;

    fn snapshot_with_variant(variant: &str) -> PageSnapshot {
        PageSnapshot {
            product_form: Some(FormSnapshot {
                action: "/cart/add".to_owned(),
                controls: vec![ControlSnapshot {
                    kind: ControlKind::Radio,
                    checked: true,
                    value: Some(variant.to_owned()),
                    ..ControlSnapshot::default()
                }],
                has_buy_buttons: true,
                ..FormSnapshot::default()
            }),
            viewport_width: 1280,
            widget_container_present: false,
        }
    }

    fn make_field(label: &str, field_type: &str, required: bool) -> FieldConfig {
        FieldConfig {
            label: label.to_owned(),
            field_type: field_type.to_owned(),
            required,
            placeholder: String::new(),
        }
    }

    fn make_set(trigger: &str, fields: Vec<FieldConfig>) -> SizeSetConfig {
        SizeSetConfig {
            id: 1,
            name: "Custom Curtains".to_owned(),
            trigger_variant: trigger.to_owned(),
            display_style: "INLINE".to_owned(),
            fields,
            ..SizeSetConfig::default()
        }
    }

    fn config_with(sets: Vec<SizeSetConfig>) -> ConfigResponse {
        ConfigResponse { sets, design: None }
    }

    /// Ticks with a selected variant and applies one matched set, leaving
    /// the session in `Rendered` (or `Valid` if nothing is required).
    fn rendered_session(fields: Vec<FieldConfig>) -> WidgetSession {
        let mut session = WidgetSession::new();
        let outcome = session.tick(&snapshot_with_variant("Custom Size"));
        let TickOutcome::FetchNeeded(key) = outcome else {
            panic!("expected a fetch");
        };
        session.apply_config(&key, config_with(vec![make_set("Custom Size", fields)]));
        session
    }

    #[test]
    fn pages_without_cart_form_are_ignored() {
        let mut session = WidgetSession::new();
        let page = PageSnapshot {
            product_form: Some(FormSnapshot {
                action: "/contact".to_owned(),
                ..FormSnapshot::default()
            }),
            ..PageSnapshot::default()
        };
        assert_eq!(session.tick(&page), TickOutcome::NoChange);
        assert!(session.memoized_key().is_none());
    }

    #[test]
    fn repeated_key_short_circuits_after_the_first_fetch() {
        let mut session = WidgetSession::new();
        let page = snapshot_with_variant("Custom Size");
        assert!(matches!(session.tick(&page), TickOutcome::FetchNeeded(_)));
        assert_eq!(session.tick(&page), TickOutcome::NoChange);
        assert_eq!(session.tick(&page), TickOutcome::NoChange);
    }

    #[test]
    fn empty_resolution_does_not_clear_the_memoized_key() {
        let mut session = WidgetSession::new();
        assert!(matches!(
            session.tick(&snapshot_with_variant("Custom Size")),
            TickOutcome::FetchNeeded(_)
        ));

        let mut page = snapshot_with_variant("Custom Size");
        page.product_form.as_mut().unwrap().controls[0].checked = false;
        assert_eq!(session.tick(&page), TickOutcome::NoChange);

        // Re-selecting the same variant is still the memoized key.
        assert_eq!(
            session.tick(&snapshot_with_variant("Custom Size")),
            TickOutcome::NoChange
        );
    }

    #[test]
    fn variant_change_triggers_a_new_fetch() {
        let mut session = WidgetSession::new();
        assert!(matches!(
            session.tick(&snapshot_with_variant("Custom Size")),
            TickOutcome::FetchNeeded(_)
        ));
        let outcome = session.tick(&snapshot_with_variant("Large"));
        assert_eq!(
            outcome,
            TickOutcome::FetchNeeded(VariantKey::parse("Large"))
        );
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut session = WidgetSession::new();
        let TickOutcome::FetchNeeded(first) = session.tick(&snapshot_with_variant("Custom Size"))
        else {
            panic!("expected a fetch");
        };
        let TickOutcome::FetchNeeded(second) = session.tick(&snapshot_with_variant("Large"))
        else {
            panic!("expected a fetch");
        };

        let effects = session.apply_config(&first, config_with(vec![make_set("Custom Size", vec![])]));
        assert!(effects.is_empty(), "out-of-order response must be dropped");
        assert_eq!(session.state(), SessionState::Idle);

        let effects = session.apply_config(&second, config_with(vec![make_set("Large", vec![])]));
        assert!(!effects.is_empty(), "current response applies");
    }

    #[test]
    fn zero_matches_tears_down_and_reenables() {
        let mut session = rendered_session(vec![make_field("Width", "text", true)]);
        assert_eq!(session.state(), SessionState::Rendered);

        let TickOutcome::FetchNeeded(key) = session.tick(&snapshot_with_variant("Large")) else {
            panic!("expected a fetch");
        };
        let effects = session.apply_config(&key, config_with(vec![]));
        assert!(effects.contains(&Effect::Teardown));
        assert!(effects.contains(&Effect::SetControlsEnabled(true)));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn match_renders_inline_and_disables_controls() {
        let mut session = WidgetSession::new();
        let TickOutcome::FetchNeeded(key) = session.tick(&snapshot_with_variant("Custom Size"))
        else {
            panic!("expected a fetch");
        };
        let effects = session.apply_config(
            &key,
            config_with(vec![make_set(
                "Custom Size",
                vec![make_field("Width", "text", true)],
            )]),
        );
        assert!(matches!(
            effects[0],
            Effect::InsertInline {
                insert_point: InsertPoint::BeforeBuyButtons,
                ..
            }
        ));
        assert!(effects.contains(&Effect::SetControlsEnabled(false)));
        assert_eq!(session.state(), SessionState::Rendered);
    }

    #[test]
    fn modal_set_opens_the_overlay() {
        let mut session = WidgetSession::new();
        let TickOutcome::FetchNeeded(key) = session.tick(&snapshot_with_variant("Custom Size"))
        else {
            panic!("expected a fetch");
        };
        let mut set = make_set("Custom Size", vec![make_field("Width", "text", true)]);
        set.display_style = "MODAL".to_owned();
        let effects = session.apply_config(&key, config_with(vec![set]));
        assert!(matches!(effects[0], Effect::OpenModal { .. }));
    }

    #[test]
    fn set_without_required_fields_is_immediately_valid() {
        let session = rendered_session(vec![make_field("Notes", "text", false)]);
        assert_eq!(session.state(), SessionState::Valid);
    }

    #[test]
    fn required_fields_gate_the_valid_state() {
        let mut session = rendered_session(vec![
            make_field("Width", "text", true),
            make_field("Height", "text", true),
        ]);

        assert!(session.input_changed("Width", "120cm").is_empty(), "still incomplete");
        assert_eq!(session.state(), SessionState::Rendered);

        let effects = session.input_changed("Height", "80cm");
        assert_eq!(effects, vec![Effect::SetControlsEnabled(true)]);
        assert_eq!(session.state(), SessionState::Valid);

        let effects = session.input_changed("Width", "   ");
        assert_eq!(effects, vec![Effect::SetControlsEnabled(false)]);
        assert_eq!(session.state(), SessionState::Rendered);
    }

    #[test]
    fn numeric_fields_filter_bad_input() {
        let mut session = rendered_session(vec![make_field("Width (cm)", "number", true)]);

        assert!(session.input_changed("Width (cm)", "12a").is_empty());
        assert_eq!(session.state(), SessionState::Rendered, "filtered input records nothing");

        let effects = session.input_changed("Width (cm)", "12.5");
        assert_eq!(effects, vec![Effect::SetControlsEnabled(true)]);
        assert_eq!(session.state(), SessionState::Valid);

        assert!(session.input_changed("Width (cm)", "12.5x").is_empty());
        assert_eq!(session.state(), SessionState::Valid, "previous value survives");
    }

    #[test]
    fn nearest_size_is_required_only_with_candidates() {
        let mut session = WidgetSession::new();
        let mut page = snapshot_with_variant("Custom Size");
        page.product_form.as_mut().unwrap().size_selector_values =
            vec!["Small".to_owned(), "Large".to_owned()];
        let TickOutcome::FetchNeeded(key) = session.tick(&page) else {
            panic!("expected a fetch");
        };
        let mut set = make_set("Custom Size", vec![make_field("Width", "text", true)]);
        set.req_nearest_size = true;
        session.apply_config(&key, config_with(vec![set]));

        session.input_changed("Width", "120");
        assert_eq!(session.state(), SessionState::Rendered, "nearest size still missing");

        session.input_changed(NEAREST_SIZE_LABEL, "Large");
        assert_eq!(session.state(), SessionState::Valid);
    }

    #[test]
    fn nearest_size_not_required_without_candidates() {
        let mut session = WidgetSession::new();
        let TickOutcome::FetchNeeded(key) = session.tick(&snapshot_with_variant("Custom Size"))
        else {
            panic!("expected a fetch");
        };
        let mut set = make_set("Custom Size", vec![make_field("Width", "text", true)]);
        set.req_nearest_size = true;
        session.apply_config(&key, config_with(vec![set]));

        session.input_changed("Width", "120");
        assert_eq!(session.state(), SessionState::Valid);
    }

    #[test]
    fn submit_in_rendered_cancels_with_an_alert() {
        let mut session = rendered_session(vec![make_field("Width", "text", true)]);
        let decision = session.submit_requested();
        assert!(matches!(decision, SubmitDecision::Cancel { ref alert } if !alert.is_empty()));
    }

    #[test]
    fn submit_in_idle_proceeds_without_injection() {
        let mut session = WidgetSession::new();
        let decision = session.submit_requested();
        assert_eq!(
            decision,
            SubmitDecision::Proceed {
                remove: vec![],
                inject: vec![]
            }
        );
    }

    #[test]
    fn submit_in_valid_injects_and_later_cleans_up() {
        let mut session = rendered_session(vec![
            make_field("Width", "text", true),
            make_field("Notes", "text", false),
        ]);
        session.input_changed("Width", "120cm");

        let SubmitDecision::Proceed { remove, inject } = session.submit_requested() else {
            panic!("expected proceed");
        };
        assert!(remove.is_empty(), "nothing injected before");
        assert_eq!(inject.len(), 1, "empty optional values are skipped");
        assert_eq!(inject[0].name, "properties[Width]");
        assert_eq!(inject[0].value, "120cm");

        session.input_changed("Notes", "hem both edges");
        let SubmitDecision::Proceed { remove, inject } = session.submit_requested() else {
            panic!("expected proceed");
        };
        assert_eq!(remove, vec!["properties[Width]".to_owned()]);
        assert_eq!(inject.len(), 2);
    }

    #[test]
    fn modal_close_and_reopen_cycle() {
        let mut session = WidgetSession::new();
        let TickOutcome::FetchNeeded(key) = session.tick(&snapshot_with_variant("Custom Size"))
        else {
            panic!("expected a fetch");
        };
        let mut set = make_set("Custom Size", vec![]);
        set.display_style = "MODAL".to_owned();
        session.apply_config(&key, config_with(vec![set]));

        let effects = session.modal_closed();
        assert!(matches!(effects[0], Effect::ShowModalTrigger { .. }));

        let effects = session.modal_open_requested();
        assert!(matches!(effects[0], Effect::OpenModal { .. }));

        assert!(
            session.modal_open_requested().is_empty(),
            "opening an open modal is a no-op"
        );
        assert!(
            session.modal_closed().len() == 1,
            "closing again shows the trigger again"
        );
        assert!(session.modal_closed().is_empty(), "already closed");
    }

    #[test]
    fn fetch_failure_unlocks_a_retry_on_the_next_tick() {
        let mut session = WidgetSession::new();
        let page = snapshot_with_variant("Custom Size");
        let TickOutcome::FetchNeeded(key) = session.tick(&page) else {
            panic!("expected a fetch");
        };
        session.fetch_failed(&key);
        assert!(matches!(session.tick(&page), TickOutcome::FetchNeeded(_)));
    }

    #[test]
    fn apply_config_before_any_tick_is_dropped() {
        let mut session = WidgetSession::new();
        let effects = session.apply_config(
            &VariantKey::parse("custom-size"),
            config_with(vec![make_set("Custom Size", vec![])]),
        );
        assert!(effects.is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }
}
