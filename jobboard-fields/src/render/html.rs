//! Markup helpers shared by the widgets

use crate::sanitize::{esc_html, strip_all_tags};
use crate::types::FieldDescriptor;

/// `<label>` with a trailing colon and a `[?]` tip when the field has a
/// description.
pub(super) fn label_with_tip(field: &FieldDescriptor) -> String {
    let tip = match field.description.as_deref() {
        Some(description) if !description.is_empty() => format!(
            "<span class=\"tips\" data-tip=\"{}\">[?]</span>",
            esc_html(description)
        ),
        _ => String::new(),
    };
    format!(
        "<label for=\"{}\">{}: {tip}</label>",
        esc_html(&field.key),
        strip_all_tags(&field.label)
    )
}

/// Trailing `<span class="description">`. The description is trusted markup.
pub(super) fn description_span(field: &FieldDescriptor) -> String {
    match field.description.as_deref() {
        Some(description) if !description.is_empty() => {
            format!("<span class=\"description\">{description}</span>")
        }
        _ => String::new(),
    }
}

pub(super) fn class_list(field: &FieldDescriptor) -> String {
    field.classes.join(" ")
}

pub(super) fn paragraph(class: &str, body: &str) -> String {
    format!("<p class=\"{class}\">\n{body}\n</p>\n")
}

/// ` selected="selected"` or nothing.
pub(super) fn selected(on: bool) -> &'static str {
    if on {
        " selected=\"selected\""
    } else {
        ""
    }
}

/// ` checked="checked"` or nothing.
pub(super) fn checked(on: bool) -> &'static str {
    if on {
        " checked=\"checked\""
    } else {
        ""
    }
}
