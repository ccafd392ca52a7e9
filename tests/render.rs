use std::sync::Arc;

use formless::render::html::{html_render_map, render_html_form};
use formless::render::{renderer, FieldView, RenderContext, RenderOverrides};
use formless::validators::not_empty;
use formless::{
    to_form_state, CollectionInput, FieldPath, FormSchema, FormSession, InputType, ListInput,
    Mutate, OptionInput, RenderConfig, SimpleInput,
};
use serde_json::json;

fn profile_schema() -> FormSchema {
    FormSchema::new()
        .field(
            "name",
            SimpleInput::text("Name")
                .placeholder("Your <name>")
                .section_title("Profile")
                .validator(not_empty()),
        )
        .field("age", SimpleInput::number("Age"))
        .field("bio", SimpleInput::textarea("Bio"))
        .field(
            "role",
            OptionInput::select(
                "Role",
                vec![("Admin".into(), json!("admin")), ("User".into(), json!("user"))],
            ),
        )
        .field(
            "active",
            OptionInput::radio(
                "Active",
                vec![("Yes".into(), json!(true)), ("No".into(), json!(false))],
            ),
        )
        .field("id", SimpleInput::hidden("Id"))
}

#[test]
fn test_html_form_markup() -> anyhow::Result<()> {
    let schema = profile_schema();
    let state = to_form_state(
        &schema,
        &json!({
            "name": "Ann",
            "age": 30,
            "bio": "a & b",
            "role": "user",
            "active": false,
            "id": 7
        }),
    )?;

    let html = render_html_form(&schema, &state, RenderConfig::default())?;

    assert!(html.starts_with("<form><h1>Profile</h1>"));
    assert!(html.contains(
        "<input type=\"text\" id=\"name\" name=\"name\" data-path=\"name\" \
         placeholder=\"Your &lt;name&gt;\" value=\"Ann\"/>"
    ));
    assert!(html.contains(
        "<input type=\"text\" id=\"age\" name=\"age\" data-path=\"age\" value=\"30\"/>"
    ));
    assert!(html.contains(">a &amp; b</textarea>"));
    assert!(html.contains("<option value=\"user\" selected>User</option>"));
    assert!(html.contains("<option value=\"admin\">Admin</option>"));
    assert!(html.contains("value=\"false\" checked/><span>No</span>"));
    assert!(!html.contains("data-path=\"id\""));
    Ok(())
}

#[test]
fn test_errors_render_after_submit() -> anyhow::Result<()> {
    let schema = Arc::new(FormSchema::new().field(
        "name",
        SimpleInput::text("Name").validator(not_empty().with_message("Name is required")),
    ));
    let session = FormSession::new(schema, json!({}))?;

    let before = render_html_form(session.schema(), session.state(), RenderConfig::default())?;
    assert!(before.contains("<div class=\"ErrorLabel\"></div>"));

    let (submitted, _) = session.submit(None)?;
    let after = render_html_form(submitted.schema(), submitted.state(), RenderConfig::default())?;
    assert!(after.contains("<div class=\"ErrorLabel\">Name is required</div>"));
    Ok(())
}

#[test]
fn test_repeated_fields_render_buttons() -> anyhow::Result<()> {
    let schema: FormSchema = FormSchema::new()
        .field(
            "tags",
            ListInput::new("Tags", SimpleInput::text("Tag"))
                .mutate(Mutate::new("Add another tag", json!("")).add_first_label("Add a tag")),
        )
        .field(
            "skills",
            CollectionInput::new(
                "Skills",
                FormSchema::new().field("name", SimpleInput::text("Name")),
            )
                .mutate(Mutate::new("Add skill", json!({})).remove_label("Drop")),
        );

    let empty = to_form_state(&schema, &json!({}))?;
    let html = render_html_form(&schema, &empty, RenderConfig::default())?;
    assert!(html.contains(
        "<button type=\"button\" data-action=\"add\" data-path=\"tags\">Add a tag</button>"
    ));

    let filled = to_form_state(&schema, &json!({"tags": ["x"], "skills": [{"name": "go"}]}))?;
    let config = RenderConfig {
        default_remove_label: "Delete".into(),
        ..RenderConfig::default()
    };
    let html = render_html_form(&schema, &filled, config)?;
    assert!(html.contains("data-path=\"tags.0\" value=\"x\""));
    assert!(html.contains(
        "<button type=\"button\" data-action=\"remove\" data-path=\"tags.0\">Delete</button>"
    ));
    assert!(html.contains("Add another tag"));
    assert!(html.contains("<fieldset>"));
    assert!(html.contains("data-path=\"skills.0.name\" value=\"go\""));
    assert!(html.contains(
        "<button type=\"button\" data-action=\"remove\" data-path=\"skills.0\">Drop</button>"
    ));
    Ok(())
}

#[test]
fn test_unregistered_tags_fall_back() -> anyhow::Result<()> {
    let schema: FormSchema = FormSchema::new()
        .field("color", SimpleInput::custom_box("Color"))
        .field("name", SimpleInput::text("Name"));
    let state = to_form_state(&schema, &json!({}))?;

    let config = RenderConfig::from_json(r#"{"notSupportedText": "Unsupported"}"#)?;
    let html = render_html_form(&schema, &state, config)?;
    assert!(html.contains("<pre data-path=\"color\">Unsupported: customBox</pre>"));

    let overrides = RenderOverrides::new().with(
        InputType::CustomBox,
        renderer(|_: &RenderContext<String>, view: &FieldView<'_>| {
            Ok(format!("<color-picker data-path=\"{}\"/>", view.path()))
        }),
    );
    let ctx = RenderContext::new(&html_render_map(), Some(&overrides), RenderConfig::default());
    let parts = ctx.render_form(&schema, &state, &FieldPath::root())?;
    assert_eq!(parts[0], "<color-picker data-path=\"color\"/>");
    assert!(parts[1].contains("data-path=\"name\""));
    Ok(())
}
