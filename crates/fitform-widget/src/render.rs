//! Markup generation for the storefront widget.
//!
//! Everything here is a pure function from config and page state to HTML
//! strings; the host shim owns the DOM. All merchant-provided text is
//! HTML-escaped before interpolation.

use regex::Regex;

use fitform_core::slug::slugify;

use crate::page::PageSnapshot;
use crate::types::{DesignConfig, FieldConfig, SizeSetConfig};

/// Property label used for the harvested nearest-size dropdown.
pub const NEAREST_SIZE_LABEL: &str = "Nearest Size";

const MOBILE_MAX_WIDTH: u32 = 600;

/// Logical viewport width at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
}

impl Viewport {
    /// Mobile presentation applies at 600px logical width and below.
    #[must_use]
    pub fn is_mobile(self) -> bool {
        self.width <= MOBILE_MAX_WIDTH
    }
}

/// Where the host should insert the inline widget subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPoint {
    /// The theme provides a designated widget container.
    WidgetContainer,
    /// Directly above the buy-button cluster.
    BeforeBuyButtons,
    /// Directly below the variant picker.
    AfterVariantPicker,
    /// Last resort: append to the cart-add form.
    AppendToForm,
}

/// An inline render: the subtree plus where to put it.
#[derive(Debug, Clone)]
pub struct RenderedWidget {
    pub html: String,
    pub insert_point: InsertPoint,
}

/// Escapes text for interpolation into HTML body or attribute context.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Picks the insert point for the inline widget by ordered fallback.
#[must_use]
pub fn resolve_insert_point(page: &PageSnapshot) -> InsertPoint {
    if page.widget_container_present {
        return InsertPoint::WidgetContainer;
    }
    let Some(form) = page.cart_form() else {
        return InsertPoint::AppendToForm;
    };
    if form.has_buy_buttons {
        return InsertPoint::BeforeBuyButtons;
    }
    if form.variant_picker_present {
        return InsertPoint::AfterVariantPicker;
    }
    InsertPoint::AppendToForm
}

/// Renders the inline widget subtree for the matched sets.
#[must_use]
pub fn render_inline(
    sets: &[SizeSetConfig],
    design: Option<&DesignConfig>,
    page: &PageSnapshot,
) -> RenderedWidget {
    let default_design = DesignConfig::default();
    let design = design.unwrap_or(&default_design);
    let viewport = Viewport {
        width: page.viewport_width,
    };
    let size_values = harvest_size_values(page);

    let mut html = String::from("<div class=\"fitform-widget\" data-fitform=\"inline\">");
    html.push_str(&render_style(design, viewport));
    for set in sets {
        html.push_str(&render_set_block(set, design, viewport, size_values));
    }
    html.push_str("</div>");

    RenderedWidget {
        html,
        insert_point: resolve_insert_point(page),
    }
}

/// Renders the full-screen modal overlay for the matched sets.
#[must_use]
pub fn render_modal(
    sets: &[SizeSetConfig],
    design: Option<&DesignConfig>,
    page: &PageSnapshot,
) -> String {
    let default_design = DesignConfig::default();
    let design = design.unwrap_or(&default_design);
    let viewport = Viewport {
        width: page.viewport_width,
    };
    let size_values = harvest_size_values(page);

    let mut html = String::from(
        "<div class=\"fitform-modal-overlay\" data-fitform=\"modal\"><div class=\"fitform-modal\">",
    );
    html.push_str(
        "<button class=\"fitform-modal-close\" type=\"button\" aria-label=\"Close\">&#215;</button>",
    );
    html.push_str(&render_style(design, viewport));
    for (index, set) in sets.iter().enumerate() {
        if index > 0 {
            html.push_str("<hr class=\"fitform-divider\">");
        }
        html.push_str(&render_set_block(set, design, viewport, size_values));
    }
    html.push_str("</div></div>");
    html
}

/// The small docked button shown after the modal is dismissed.
#[must_use]
pub fn render_modal_trigger() -> String {
    "<button class=\"fitform-modal-reopen\" type=\"button\">Enter custom size</button>".to_owned()
}

/// Candidate values for the nearest-size dropdown: the theme's own size
/// options minus blanks, duplicates, and anything that slugifies to the
/// set's trigger token.
#[must_use]
pub fn nearest_size_options(set: &SizeSetConfig, size_values: &[String]) -> Vec<String> {
    let trigger = slugify(&set.trigger_variant);
    let mut options: Vec<String> = Vec::new();
    for value in size_values {
        let trimmed = value.trim();
        if trimmed.is_empty() || slugify(trimmed) == trigger {
            continue;
        }
        if options.iter().any(|existing| existing == trimmed) {
            continue;
        }
        options.push(trimmed.to_owned());
    }
    options
}

fn harvest_size_values(page: &PageSnapshot) -> &[String] {
    page.cart_form()
        .map_or(&[], |form| form.size_selector_values.as_slice())
}

fn render_set_block(
    set: &SizeSetConfig,
    design: &DesignConfig,
    viewport: Viewport,
    size_values: &[String],
) -> String {
    let (position, image_width, image_height, container_width, fields_width) = if viewport
        .is_mobile()
    {
        (
            set.mobile_image_position.as_str(),
            set.mobile_image_width.as_str(),
            set.mobile_image_height.as_str(),
            set.mobile_container_width.as_str(),
            set.mobile_fields_container_width.as_str(),
        )
    } else {
        (
            set.image_position.as_str(),
            set.image_width.as_str(),
            set.image_height.as_str(),
            set.container_width.as_str(),
            set.fields_container_width.as_str(),
        )
    };
    let position = effective_position(position, design);
    let (row, image_first) = axes(position);

    let image_block = set
        .image_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .map(|url| {
            format!(
                "<div class=\"fitform-image\" style=\"width:{};height:{}\"><img src=\"{}\" alt=\"{}\"></div>",
                escape_html(image_width),
                escape_html(image_height),
                escape_html(url),
                escape_html(&set.name),
            )
        })
        .unwrap_or_default();

    let mut fields_block = format!(
        "<div class=\"fitform-fields\" style=\"width:{}\">",
        escape_html(fields_width)
    );
    fields_block.push_str(&format!(
        "<h3 class=\"fitform-title\">{}</h3>",
        escape_html(&set.name)
    ));
    for field in &set.fields {
        fields_block.push_str(&render_field(field));
    }
    if set.req_nearest_size {
        let options = nearest_size_options(set, size_values);
        if !options.is_empty() {
            fields_block.push_str(&render_nearest_select(&options));
        }
    }
    fields_block.push_str(&render_note(set));
    fields_block.push_str("</div>");

    let direction = if row { "row" } else { "column" };
    let (first, second) = if image_first {
        (image_block, fields_block)
    } else {
        (fields_block, image_block)
    };
    format!(
        "<div class=\"fitform-set\" data-set-id=\"{}\" style=\"display:flex;flex-direction:{};width:{}\">{}{}</div>",
        set.id,
        direction,
        escape_html(container_width),
        first,
        second,
    )
}

/// The per-set position string wins; an empty one falls back to the
/// shop-wide layout preference.
fn effective_position<'a>(position: &'a str, design: &DesignConfig) -> &'a str {
    if !position.trim().is_empty() {
        return position;
    }
    if design.image_layout.eq_ignore_ascii_case("horizontal") {
        "left"
    } else {
        "top"
    }
}

/// `(row_layout, image_first)` for an image position string.
fn axes(position: &str) -> (bool, bool) {
    match position.to_ascii_lowercase().as_str() {
        "left" => (true, true),
        "right" => (true, false),
        "bottom" => (false, false),
        _ => (false, true),
    }
}

fn render_field(field: &FieldConfig) -> String {
    let input_type = if field.is_numeric() { "number" } else { "text" };
    let star = if field.required {
        "<span class=\"fitform-required\">*</span>"
    } else {
        ""
    };
    let required_attr = if field.required {
        " data-required=\"true\""
    } else {
        ""
    };
    format!(
        "<div class=\"fitform-field\"><label class=\"fitform-label\">{label}{star}</label><input class=\"fitform-input\" type=\"{input_type}\" data-label=\"{label}\" placeholder=\"{placeholder}\"{required_attr}></div>",
        label = escape_html(&field.label),
        placeholder = escape_html(&field.placeholder),
    )
}

fn render_nearest_select(options: &[String]) -> String {
    let mut html = format!(
        "<div class=\"fitform-field fitform-nearest\"><label class=\"fitform-label\">{NEAREST_SIZE_LABEL}<span class=\"fitform-required\">*</span></label><select class=\"fitform-input\" data-label=\"{NEAREST_SIZE_LABEL}\" data-required=\"true\"><option value=\"\"></option>",
    );
    for option in options {
        let escaped = escape_html(option);
        html.push_str(&format!(
            "<option value=\"{escaped}\">{escaped}</option>"
        ));
    }
    html.push_str("</select></div>");
    html
}

fn render_note(set: &SizeSetConfig) -> String {
    if set.note_title.trim().is_empty() && set.note_content.trim().is_empty() {
        return String::new();
    }
    let mut html = String::from("<div class=\"fitform-note\">");
    if !set.note_title.trim().is_empty() {
        html.push_str(&format!(
            "<strong class=\"fitform-note-title\">{}</strong>",
            escape_html(&set.note_title)
        ));
    }
    if !set.note_content.trim().is_empty() {
        html.push_str(&format!(
            "<p class=\"fitform-note-text\">{}</p>",
            escape_html(&set.note_content)
        ));
    }
    html.push_str("</div>");
    html
}

fn render_style(design: &DesignConfig, viewport: Viewport) -> String {
    let (title_font, note_font, field_font) = if viewport.is_mobile() {
        (
            design.mobile_title_font_size.as_str(),
            design.mobile_note_font_size.as_str(),
            design.mobile_field_font_size.as_str(),
        )
    } else {
        (
            design.title_font_size.as_str(),
            design.note_font_size.as_str(),
            design.field_font_size.as_str(),
        )
    };
    format!(
        "<style class=\"fitform-style\">\
         .fitform-set{{border:{bw}px {bs} {bc};color:{tc};padding:12px;gap:12px;}}\
         .fitform-title{{color:{title_color};font-size:{title_font};margin:0 0 8px;}}\
         .fitform-label{{font-size:{field_font};display:block;}}\
         .fitform-input{{font-size:{field_font};width:100%;}}\
         .fitform-input::placeholder{{color:{pc};}}\
         .fitform-note{{color:{nc};background:{nbc};font-size:{note_font};padding:8px;}}\
         .fitform-modal{{background:{mbc};}}\
         {custom}\
         </style>",
        bw = design.border_width,
        bs = css_value(&design.border_style),
        bc = css_value(&design.border_color),
        tc = css_value(&design.text_color),
        title_color = css_value(&design.title_color),
        title_font = css_value(title_font),
        field_font = css_value(field_font),
        note_font = css_value(note_font),
        pc = css_value(&design.placeholder_color),
        nc = css_value(&design.note_color),
        nbc = css_value(&design.note_bg_color),
        mbc = css_value(&design.modal_bg_color),
        custom = strip_style_escapes(&design.custom_css),
    )
}

/// Keeps only characters that are safe inside a CSS declaration value.
fn css_value(raw: &str) -> String {
    raw.chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | ' ' | '-')
        })
        .collect()
}

/// Removes every `</style` sequence from merchant CSS so the blob cannot
/// terminate the scoped style block.
fn strip_style_escapes(css: &str) -> String {
    let re = Regex::new(r"(?i)</style").expect("valid regex");
    let mut out = css.to_owned();
    // Re-scan: removing one occurrence can splice another together.
    while re.is_match(&out) {
        out = re.replace_all(&out, "").into_owned();
    }
    out
}
