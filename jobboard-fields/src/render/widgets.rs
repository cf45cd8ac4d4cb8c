//! Built-in widgets, one per [`FieldType`] other than custom tags

use super::html::{checked, class_list, description_span, label_with_tip, paragraph, selected};
use super::RenderContext;
use crate::error::Result;
use crate::sanitize::{esc_html, kses, positive_id, strip_all_tags, LINKS_ONLY};
use crate::types::{FieldDescriptor, FieldType, MetaValue};

const FILE_PLACEHOLDER: &str = "http://";

type Widget = fn(&RenderContext<'_>, &FieldDescriptor) -> Result<String>;

fn builtin(type_: &FieldType) -> Option<Widget> {
    let widget: Widget = match type_ {
        FieldType::Text => text,
        FieldType::Textarea => textarea,
        FieldType::Select => select,
        FieldType::Multiselect => multiselect,
        FieldType::Checkbox => checkbox,
        FieldType::Radio => radio,
        FieldType::File => file,
        FieldType::Author => author,
        FieldType::Hidden | FieldType::Info => hidden,
        FieldType::Custom(_) => return None,
    };
    Some(widget)
}

/// Draw `field` with its built-in widget, or `None` when its type has none.
pub(crate) fn render_builtin(
    ctx: &RenderContext<'_>,
    field: &FieldDescriptor,
) -> Option<Result<String>> {
    builtin(&field.type_).map(|widget| widget(ctx, field))
}

fn text(ctx: &RenderContext<'_>, field: &FieldDescriptor) -> Result<String> {
    let value = ctx.value_or_stored(field)?;
    let input = format!(
        "<input type=\"text\" autocomplete=\"off\" name=\"{}\" class=\"{}\" id=\"{}\" placeholder=\"{}\" value=\"{}\" />",
        esc_html(field.input_name()),
        esc_html(&class_list(field)),
        esc_html(&field.key),
        esc_html(&field.placeholder),
        esc_html(&value.as_text()),
    );
    Ok(paragraph(
        "form-field",
        &format!("{}\n{input}", label_with_tip(field)),
    ))
}

fn textarea(ctx: &RenderContext<'_>, field: &FieldDescriptor) -> Result<String> {
    let value = ctx.value_or_stored(field)?;
    let input = format!(
        "<textarea name=\"{}\" id=\"{}\" placeholder=\"{}\">{}</textarea>",
        esc_html(field.input_name()),
        esc_html(&field.key),
        esc_html(&field.placeholder),
        esc_html(&value.as_text()),
    );
    Ok(paragraph(
        "form-field",
        &format!("{}\n{input}", label_with_tip(field)),
    ))
}

fn select(ctx: &RenderContext<'_>, field: &FieldDescriptor) -> Result<String> {
    let current = ctx.value_or_stored(field)?.as_text();
    let options: String = field
        .options
        .iter()
        .map(|(key, label)| {
            format!(
                "<option value=\"{}\"{}>{}</option>\n",
                esc_html(key),
                selected(*key == current),
                esc_html(label)
            )
        })
        .collect();
    Ok(paragraph(
        "form-field",
        &format!(
            "{}\n<select name=\"{}\" id=\"{}\">\n{options}</select>",
            label_with_tip(field),
            esc_html(field.input_name()),
            esc_html(&field.key),
        ),
    ))
}

fn multiselect(ctx: &RenderContext<'_>, field: &FieldDescriptor) -> Result<String> {
    let current = match ctx.value_or_stored(field)? {
        MetaValue::List(items) => items,
        _ => Vec::new(),
    };
    let options: String = field
        .options
        .iter()
        .map(|(key, label)| {
            format!(
                "<option value=\"{}\"{}>{}</option>\n",
                esc_html(key),
                selected(current.contains(key)),
                esc_html(label)
            )
        })
        .collect();
    Ok(paragraph(
        "form-field",
        &format!(
            "{}\n<select multiple=\"multiple\" name=\"{}[]\" id=\"{}\">\n{options}</select>",
            label_with_tip(field),
            esc_html(field.input_name()),
            esc_html(&field.key),
        ),
    ))
}

fn checkbox(ctx: &RenderContext<'_>, field: &FieldDescriptor) -> Result<String> {
    let value = ctx.truthy_or_stored(field)?;
    let body = format!(
        "<label for=\"{key}\">{label}</label>\n<input type=\"checkbox\" class=\"checkbox\" name=\"{name}\" id=\"{key}\" value=\"1\"{checked} />\n{description}",
        key = esc_html(&field.key),
        label = strip_all_tags(&field.label),
        name = esc_html(field.input_name()),
        checked = checked(value.as_text() == "1"),
        description = description_span(field),
    );
    Ok(paragraph("form-field form-field-checkbox", &body))
}

fn radio(ctx: &RenderContext<'_>, field: &FieldDescriptor) -> Result<String> {
    let current = ctx.truthy_or_stored(field)?.as_text();
    let name = esc_html(field.input_name());
    let options: String = field
        .options
        .iter()
        .map(|(key, label)| {
            format!(
                "<label><input type=\"radio\" class=\"radio\" name=\"{name}\" value=\"{}\"{} /> {}</label>\n",
                esc_html(key),
                checked(*key == current),
                esc_html(label)
            )
        })
        .collect();
    let body = format!(
        "<label>{}</label>\n{options}{}",
        strip_all_tags(&field.label),
        description_span(field)
    );
    Ok(paragraph("form-field form-field-checkbox", &body))
}

fn file_input(name: &str, id: Option<&str>, placeholder: &str, value: &str) -> String {
    let id = id
        .map(|id| format!(" id=\"{}\"", esc_html(id)))
        .unwrap_or_default();
    format!(
        "<span class=\"file_url\"><input type=\"text\" name=\"{}\"{id} placeholder=\"{}\" value=\"{}\" /><button class=\"button button-small wp_job_manager_upload_file_button\" data-uploader_button_text=\"Use file\">Upload</button><button class=\"button button-small wp_job_manager_view_file_button\">View</button></span>",
        esc_html(name),
        esc_html(placeholder),
        esc_html(value),
    )
}

fn file(ctx: &RenderContext<'_>, field: &FieldDescriptor) -> Result<String> {
    let value = ctx.value_or_stored(field)?;
    let placeholder = if field.placeholder.is_empty() {
        FILE_PLACEHOLDER
    } else {
        field.placeholder.as_str()
    };

    let mut body = label_with_tip(field);
    body.push('\n');
    if field.multiple {
        let name = format!("{}[]", field.input_name());
        for entry in value.to_list() {
            body.push_str(&file_input(&name, None, placeholder, &entry));
        }
        body.push_str(&format!(
            "<button class=\"button button-small wp_job_manager_add_another_file_button\" data-field_name=\"{}\" data-field_placeholder=\"{}\" data-uploader_button_text=\"Use file\" data-uploader_button=\"Upload\" data-view_button=\"View\">Add file</button>",
            esc_html(&field.key),
            esc_html(placeholder),
        ));
    } else {
        body.push_str(&file_input(
            field.input_name(),
            Some(&field.key),
            placeholder,
            &value.as_text(),
        ));
    }
    Ok(paragraph("form-field", &body))
}

fn author(ctx: &RenderContext<'_>, field: &FieldDescriptor) -> Result<String> {
    let author_id = match &field.value {
        Some(value) if !value.is_empty() => positive_id(&value.as_text()),
        _ => ctx.listing.author,
    };

    let current = match ctx.users.login(author_id).filter(|_| author_id > 0) {
        Some(login) => format!(
            "<a href=\"{}\">#{author_id} &ndash; {}</a>",
            esc_html(
                &ctx.config
                    .admin_url_for(&format!("user-edit.php?user_id={author_id}"))
            ),
            esc_html(&login)
        ),
        None => "Guest User".to_string(),
    };

    let body = format!(
        "<label for=\"{key}\">{label}:</label>\n<span class=\"current-author\">{current} <a href=\"#\" class=\"change-author button button-small\">Change</a></span>\n<span class=\"hidden change-author\"><input type=\"number\" name=\"{name}\" id=\"{key}\" step=\"1\" value=\"{author_id}\" style=\"width: 4em;\" /><span class=\"description\">Enter the ID of the user, or leave blank if submitted by a guest.</span></span>",
        key = esc_html(&field.key),
        label = strip_all_tags(&field.label),
        name = esc_html(field.input_name()),
    );
    Ok(paragraph("form-field form-field-author", &body))
}

/// Hidden inputs and display-only info blocks.
fn hidden(ctx: &RenderContext<'_>, field: &FieldDescriptor) -> Result<String> {
    let is_hidden = field.type_ == FieldType::Hidden;

    let mut hidden_input = String::new();
    if is_hidden {
        let value = ctx.value_or_stored(field)?;
        hidden_input = format!(
            "<input type=\"hidden\" name=\"{}\" class=\"{}\" id=\"{}\" value=\"{}\" />",
            esc_html(field.input_name()),
            esc_html(&class_list(field)),
            esc_html(&field.key),
            esc_html(&value.as_text()),
        );
        if field.label.is_empty() {
            return Ok(hidden_input);
        }
    }

    let information = match field.information.as_deref() {
        Some(info) if !info.is_empty() => format!(
            "<span class=\"information\">{}</span>\n",
            kses(info, LINKS_ONLY)
        ),
        _ => String::new(),
    };
    Ok(paragraph(
        "form-field",
        &format!("{}\n{information}{hidden_input}", label_with_tip(field)),
    ))
}
