//! Plain HTML render map producing markup strings
//!
//! Inputs carry their field path in `data-path`; add/remove buttons carry a
//! `data-action` so a host can route clicks back to the session.

use std::fmt::Display;

use crate::config::RenderConfig;
use crate::error::FormError;
use crate::path::FieldPath;
use crate::schema::{InputMeta, InputType, Mutate};

use super::{input_props, renderer, FieldView, InputProps, RenderContext, RenderMap};

/// Escape text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn section_title(config: &RenderConfig, meta: &InputMeta) -> String {
    match &meta.section_title {
        Some(title) if config.show_section_titles => format!("<h1>{}</h1>", escape(title)),
        _ => String::new(),
    }
}

fn label(meta: &InputMeta) -> String {
    meta.name
        .as_deref()
        .map(|name| format!("<p>{}</p>", escape(name)))
        .unwrap_or_default()
}

/// Field path as an escaped attribute value.
fn path_attr(path: &FieldPath) -> String {
    escape(&path.to_string())
}

fn common_attrs<E>(path: &FieldPath, props: &InputProps<E>) -> String {
    let path = path_attr(path);
    let mut attrs = format!(
        " id=\"{}\" name=\"{}\" data-path=\"{}\"",
        escape(&props.id),
        path,
        path
    );
    if let Some(placeholder) = &props.placeholder {
        attrs.push_str(&format!(" placeholder=\"{}\"", escape(placeholder)));
    }
    if props.disabled {
        attrs.push_str(" disabled");
    }
    if props.read_only {
        attrs.push_str(" readonly");
    }
    attrs
}

fn error_label<E: Display>(props: &InputProps<E>) -> String {
    let text = props
        .error
        .as_ref()
        .map(|e| escape(&e.to_string()))
        .unwrap_or_default();
    format!("<div class=\"ErrorLabel\">{}</div>", text)
}

type LeafParts<'v, E> = (&'v FieldPath, InputProps<E>, &'v InputMeta);

fn leaf_parts<'v, E: Clone>(view: &'v FieldView<'_, E>) -> Result<LeafParts<'v, E>, FormError> {
    match view {
        FieldView::Leaf {
            path,
            schema,
            state,
        } => Ok((path, input_props(path, schema, state), schema.meta())),
        _ => Err(FormError::InvalidPath(view.path().to_string())),
    }
}

fn basic_input<E: Clone + Display>(
    ctx: &RenderContext<String, E>,
    view: &FieldView<'_, E>,
) -> Result<String, FormError> {
    let (path, props, meta) = leaf_parts(view)?;
    let kind = match view.input_type() {
        InputType::Number => "text",
        other => other.as_str(),
    };
    let attrs = common_attrs(path, &props);
    Ok(format!(
        "{}<div class=\"InputWrapper\">{}<input type=\"{}\"{} value=\"{}\"/>{}</div>",
        section_title(ctx.config(), meta),
        label(meta),
        kind,
        attrs,
        escape(&props.value),
        error_label(&props)
    ))
}

fn textarea<E: Clone + Display>(
    ctx: &RenderContext<String, E>,
    view: &FieldView<'_, E>,
) -> Result<String, FormError> {
    let (path, props, meta) = leaf_parts(view)?;
    let attrs = common_attrs(path, &props);
    Ok(format!(
        "{}<div class=\"InputWrapper\">{}<textarea{}>{}</textarea>{}</div>",
        section_title(ctx.config(), meta),
        label(meta),
        attrs,
        escape(&props.value),
        error_label(&props)
    ))
}

fn radio<E: Clone + Display>(
    ctx: &RenderContext<String, E>,
    view: &FieldView<'_, E>,
) -> Result<String, FormError> {
    let (path, props, meta) = leaf_parts(view)?;
    let path = path_attr(path);
    let mut markup = section_title(ctx.config(), meta) + &label(meta);
    for option in &props.options {
        markup.push_str(&format!(
            "<div><input type=\"radio\" name=\"{}\" data-path=\"{}\" value=\"{}\"{}{}/>\
             <span>{}</span></div>",
            path,
            path,
            escape(&option.value),
            if option.checked { " checked" } else { "" },
            if props.disabled { " disabled" } else { "" },
            escape(&option.label)
        ));
    }
    markup.push_str(&error_label(&props));
    Ok(markup)
}

fn select<E: Clone + Display>(
    ctx: &RenderContext<String, E>,
    view: &FieldView<'_, E>,
) -> Result<String, FormError> {
    let (path, props, meta) = leaf_parts(view)?;
    let attrs = common_attrs(path, &props);
    let mut options = String::new();
    for option in &props.options {
        options.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            escape(&option.value),
            if option.checked { " selected" } else { "" },
            escape(&option.label)
        ));
    }
    Ok(format!(
        "{}<div class=\"InputWrapper\">{}<select{}>{}</select>{}</div>",
        section_title(ctx.config(), meta),
        label(meta),
        attrs,
        options,
        error_label(&props)
    ))
}

fn button(action: &str, path: &FieldPath, text: &str) -> String {
    format!(
        "<button type=\"button\" data-action=\"{}\" data-path=\"{}\">{}</button>",
        action,
        path_attr(path),
        escape(text)
    )
}

fn remove_button(config: &RenderConfig, mutate: Option<&Mutate>, path: &FieldPath) -> String {
    match mutate {
        Some(mutate) => {
            let text = mutate
                .remove_label
                .as_deref()
                .unwrap_or(&config.default_remove_label);
            button("remove", path, text)
        }
        None => String::new(),
    }
}

fn add_button(mutate: Option<&Mutate>, path: &FieldPath, count: usize) -> String {
    mutate
        .map(|mutate| button("add", path, mutate.add_label(count)))
        .unwrap_or_default()
}

fn list<E: Clone + Display>(
    ctx: &RenderContext<String, E>,
    view: &FieldView<'_, E>,
) -> Result<String, FormError> {
    let FieldView::List {
        path,
        schema,
        items,
    } = view
    else {
        return Err(FormError::InvalidPath(view.path().to_string()));
    };
    let mutate = schema.mutate.as_ref();
    let mut markup = format!(
        "<div class=\"ListInput\" data-path=\"{}\">{}{}",
        path_attr(path),
        section_title(ctx.config(), &schema.meta),
        label(&schema.meta)
    );
    for (i, state) in items.iter().enumerate() {
        let item_path = path.child_index(i);
        let item = ctx.render_field(&FieldView::Leaf {
            path: item_path.clone(),
            schema: &schema.field,
            state,
        })?;
        markup.push_str("<div class=\"ListItem\">");
        markup.push_str(&item);
        markup.push_str(&remove_button(ctx.config(), mutate, &item_path));
        markup.push_str("</div>");
    }
    markup.push_str(&add_button(mutate, path, items.len()));
    markup.push_str("</div>");
    Ok(markup)
}

fn collection<E: Clone + Display>(
    ctx: &RenderContext<String, E>,
    view: &FieldView<'_, E>,
) -> Result<String, FormError> {
    let FieldView::Collection {
        path,
        schema,
        items,
    } = view
    else {
        return Err(FormError::InvalidPath(view.path().to_string()));
    };
    let mutate = schema.mutate.as_ref();
    let mut markup = format!(
        "<div class=\"CollectionInput\" data-path=\"{}\">{}{}",
        path_attr(path),
        section_title(ctx.config(), &schema.meta),
        label(&schema.meta)
    );
    for (i, item) in items.iter().enumerate() {
        let item_path = path.child_index(i);
        let fields = ctx.render_form(&schema.fields, item, &item_path)?;
        markup.push_str("<fieldset>");
        markup.push_str(&fields.concat());
        markup.push_str(&remove_button(ctx.config(), mutate, &item_path));
        markup.push_str("</fieldset>");
    }
    markup.push_str(&add_button(mutate, path, items.len()));
    markup.push_str("</div>");
    Ok(markup)
}

/// The plain HTML render map.
///
/// `customBox`, `customOption` and `multiselect` have no HTML rendering and go
/// to the fallback, which prints the configured "not supported" text.
pub fn html_render_map<E>() -> RenderMap<String, E>
where
    E: Clone + Display + 'static,
{
    RenderMap::new(renderer(|ctx: &RenderContext<String, E>, view: &FieldView<'_, E>| {
        Ok(format!(
            "<pre data-path=\"{}\">{}: {}</pre>",
            path_attr(view.path()),
            escape(&ctx.config().not_supported_text),
            view.input_type()
        ))
    }))
    .with(InputType::Text, renderer(basic_input))
    .with(InputType::Email, renderer(basic_input))
    .with(InputType::Password, renderer(basic_input))
    .with(InputType::Number, renderer(basic_input))
    .with(InputType::Textarea, renderer(textarea))
    .with(InputType::Radio, renderer(radio))
    .with(InputType::Select, renderer(select))
    .with(InputType::Hidden, renderer(|_, _| Ok(String::new())))
    .with(InputType::List, renderer(list))
    .with(InputType::Collection, renderer(collection))
}

/// Render a whole form with the plain HTML map, a form element around it.
pub fn render_html_form<E>(
    schema: &crate::schema::FormSchema<E>,
    state: &crate::engine::FormState<E>,
    config: RenderConfig,
) -> Result<String, FormError>
where
    E: Clone + Display + 'static,
{
    let ctx = RenderContext::new(&html_render_map(), None, config);
    let fields = ctx.render_form(schema, state, &FieldPath::root())?;
    Ok(format!("<form>{}</form>", fields.concat()))
}
