use formless::engine::{collect_errors, form_state_to_form_result, mk_input_state};
use formless::validators::Validator;
use formless::{
    to_form_state, to_result, validate_form, CollectionInput, ErrorMap, FieldState, FormSchema,
    FormState, InputState, ListInput, OptionInput, SimpleInput, Validation,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn always_invalid() -> Validator {
    Validator::new(|v, _| Validation::invalid("generic_error".to_string(), v))
}

fn leaf(value: Value) -> Value {
    json!({"value": value, "active": false, "visited": false})
}

fn visited_ok(value: Value) -> Value {
    json!({
        "value": value,
        "active": false,
        "visited": true,
        "validationResult": {"type": "Ok", "value": value}
    })
}

fn state(json: Value) -> FormState {
    serde_json::from_value(json).expect("fixture state")
}

fn tag_schema() -> FormSchema {
    FormSchema::new().field("name", SimpleInput::text("Tag Name"))
}

fn skill_schema() -> FormSchema {
    FormSchema::new()
        .field("name", SimpleInput::text("Skill Name"))
        .field("level", SimpleInput::number("Level"))
}

fn nested_skill_schema() -> FormSchema {
    skill_schema().field("tags", CollectionInput::new("Tags", tag_schema()))
}

fn user_schema() -> FormSchema {
    FormSchema::new()
        .field("name", SimpleInput::text("Skill Name"))
        .field("skills", CollectionInput::new("Skills", skill_schema()))
}

fn nested_user_schema() -> FormSchema {
    FormSchema::new()
        .field("name", SimpleInput::text("Skill Name"))
        .field("skills", CollectionInput::new("Skills", nested_skill_schema()))
}

fn bag_multiselect_schema() -> FormSchema {
    FormSchema::new().field("items", SimpleInput::multiselect("Items"))
}

fn bag_list_schema() -> FormSchema {
    FormSchema::new().field("items", ListInput::new("Items", SimpleInput::text("Item")))
}

fn nested_user() -> Value {
    json!({
        "name": "User",
        "skills": [
            {"name": "datomic", "level": 1, "tags": [{"name": "db"}]},
            {"name": "react", "level": 10, "tags": [{"name": "tech"}, {"name": "FE"}]}
        ]
    })
}

fn nested_user_state() -> FormState {
    state(json!({
        "name": leaf(json!("User")),
        "skills": [
            {
                "name": leaf(json!("datomic")),
                "level": leaf(json!(1)),
                "tags": [{"name": leaf(json!("db"))}]
            },
            {
                "name": leaf(json!("react")),
                "level": leaf(json!(10)),
                "tags": [{"name": leaf(json!("tech"))}, {"name": leaf(json!("FE"))}]
            }
        ]
    }))
}

#[test]
fn test_input_state_construction() {
    let value: InputState = mk_input_state(json!(""), json!("foo"));
    assert_eq!(value, InputState::new(json!("foo")));

    let default: InputState = mk_input_state(json!("def"), json!(""));
    assert_eq!(default.value, json!("def"));

    let undefined: InputState = mk_input_state(json!("def"), Value::Null);
    assert_eq!(undefined.value, json!("def"));

    let active: InputState = mk_input_state::<String>(json!(""), json!("foo")).with_active(true);
    assert_eq!(
        serde_json::to_value(&active).unwrap(),
        json!({"value": "foo", "active": true, "visited": false})
    );
}

#[test]
fn test_state_of_flat_string() {
    let schema: FormSchema = FormSchema::new().field("name", SimpleInput::text("Skill Name"));
    let expected = state(json!({"name": leaf(json!("foo"))}));
    assert_eq!(to_form_state(&schema, &json!({"name": "foo"})).unwrap(), expected);
}

#[test]
fn test_state_of_boolean_radio() {
    let schema: FormSchema = FormSchema::new().field(
        "isActive",
        OptionInput::radio(
            "Is it Active",
            vec![("Active".into(), json!(true)), ("Inactive".into(), json!(false))],
        ),
    );
    let expected = state(json!({"isActive": leaf(json!("false"))}));
    let current = to_form_state(&schema, &json!({"isActive": false})).unwrap();
    assert_eq!(current, expected);

    // stored as a string, restored as the typed option value
    let restored = to_result(&schema, &current).unwrap();
    assert_eq!(restored, Validation::valid(json!({"isActive": false})));
}

#[test]
fn test_state_of_collection() -> anyhow::Result<()> {
    let user = json!({"name": "User", "skills": [{"name": "datomic", "level": 1}]});
    let expected = state(json!({
        "name": leaf(json!("User")),
        "skills": [{"name": leaf(json!("datomic")), "level": leaf(json!(1))}]
    }));
    assert_eq!(to_form_state(&user_schema(), &user)?, expected);

    let two = json!({
        "name": "User",
        "skills": [{"name": "datomic", "level": 1}, {"name": "react", "level": 10}]
    });
    let skills = to_form_state(&user_schema(), &two)?;
    assert_eq!(
        skills.get("skills").and_then(FieldState::as_collection).map(<[_]>::len),
        Some(2)
    );
    Ok(())
}

#[test]
fn test_state_of_multiselect_and_list() -> anyhow::Result<()> {
    let bag = json!({"items": ["item", "item2"]});

    let multiselect = to_form_state(&bag_multiselect_schema(), &bag)?;
    assert_eq!(multiselect, state(json!({"items": leaf(json!(["item", "item2"]))})));

    let list = to_form_state(&bag_list_schema(), &bag)?;
    assert_eq!(
        list,
        state(json!({"items": [leaf(json!("item")), leaf(json!("item2"))]}))
    );
    assert!(matches!(list.get("items"), Some(FieldState::List(_))));
    Ok(())
}

#[test]
fn test_state_of_nested_collections() -> anyhow::Result<()> {
    assert_eq!(to_form_state(&nested_user_schema(), &nested_user())?, nested_user_state());
    Ok(())
}

#[test]
fn test_restores_values() -> anyhow::Result<()> {
    let schema: FormSchema = FormSchema::new().field("name", SimpleInput::text("Skill Name"));
    let flat = to_result(&schema, &state(json!({"name": leaf(json!("foo"))})))?;
    assert_eq!(flat.value(), &json!({"name": "foo"}));

    let users = state(json!({
        "name": leaf(json!("User")),
        "skills": [
            {"name": leaf(json!("datomic")), "level": leaf(json!(1))},
            {"name": leaf(json!("react")), "level": leaf(json!(10))}
        ]
    }));
    assert_eq!(
        to_result(&user_schema(), &users)?,
        Validation::valid(json!({
            "name": "User",
            "skills": [{"name": "datomic", "level": 1}, {"name": "react", "level": 10}]
        }))
    );

    let multiselect = state(json!({"items": leaf(json!(["item", "item2"]))}));
    assert_eq!(
        to_result(&bag_multiselect_schema(), &multiselect)?.value(),
        &json!({"items": ["item", "item2"]})
    );

    let list = state(json!({"items": [leaf(json!("item")), leaf(json!("item2"))]}));
    assert_eq!(
        to_result(&bag_list_schema(), &list)?.value(),
        &json!({"items": ["item", "item2"]})
    );

    assert_eq!(
        to_result(&nested_user_schema(), &nested_user_state())?,
        Validation::valid(nested_user())
    );
    Ok(())
}

#[test]
fn test_round_trip_with_empty_collections() -> anyhow::Result<()> {
    let schema = nested_user_schema();
    let value = json!({"name": "Solo", "skills": [{"name": "go", "level": 3, "tags": []}]});
    let restored = to_result(&schema, &to_form_state(&schema, &value)?)?;
    assert_eq!(restored, Validation::valid(value));
    Ok(())
}

#[test]
fn test_touches_all_fields() -> anyhow::Result<()> {
    let schema: FormSchema = FormSchema::new().field("n", SimpleInput::text("Skill Name"));
    let flat = validate_form(&schema, &state(json!({"n": leaf(json!("User"))})))?;
    assert_eq!(flat, state(json!({"n": visited_ok(json!("User"))})));

    let multiselect = validate_form(
        &bag_multiselect_schema(),
        &state(json!({"items": leaf(json!(["item", "item2"]))})),
    )?;
    assert_eq!(
        multiselect,
        state(json!({"items": visited_ok(json!(["item", "item2"]))}))
    );

    let list = validate_form(
        &bag_list_schema(),
        &state(json!({"items": [leaf(json!("item")), leaf(json!("item2"))]})),
    )?;
    assert_eq!(
        list,
        state(json!({"items": [visited_ok(json!("item")), visited_ok(json!("item2"))]}))
    );

    let nested = validate_form(&nested_user_schema(), &nested_user_state())?;
    assert_eq!(
        nested,
        state(json!({
            "name": visited_ok(json!("User")),
            "skills": [
                {
                    "name": visited_ok(json!("datomic")),
                    "level": visited_ok(json!(1)),
                    "tags": [{"name": visited_ok(json!("db"))}]
                },
                {
                    "name": visited_ok(json!("react")),
                    "level": visited_ok(json!(10)),
                    "tags": [{"name": visited_ok(json!("tech"))}, {"name": visited_ok(json!("FE"))}]
                }
            ]
        }))
    );
    Ok(())
}

#[test]
fn test_errors_aggregate_under_top_level_key() -> anyhow::Result<()> {
    let invalid_skill: FormSchema = FormSchema::new()
        .field("name", SimpleInput::text("Skill Name").validator(always_invalid()))
        .field("level", SimpleInput::number("Level").validator(always_invalid()));
    let schema: FormSchema = FormSchema::new()
        .field("name", SimpleInput::text("Name"))
        .field("skills", CollectionInput::new("Skills", invalid_skill));

    let user = json!({"name": "User", "skills": [{"name": "datomic", "level": 1}]});
    let state = to_form_state(&schema, &user)?;

    let mut errors = ErrorMap::new();
    errors.insert("skills".to_string(), "generic_error".to_string());
    assert_eq!(to_result(&schema, &state)?, Validation::invalid(errors, user));

    let paths: Vec<String> = collect_errors(&schema, &form_state_to_form_result(&schema, &state)?)?
        .into_iter()
        .map(|e| e.path.to_string())
        .collect();
    assert_eq!(paths, vec!["skills.0.name", "skills.0.level"]);
    Ok(())
}

#[test]
fn test_error_keys_follow_schema_order() -> anyhow::Result<()> {
    let schema: FormSchema = FormSchema::new()
        .field("zeta", SimpleInput::text("Zeta").validator(always_invalid()))
        .field("alpha", SimpleInput::text("Alpha"))
        .field("mid", SimpleInput::text("Mid").validator(always_invalid()));
    let outcome = to_result(&schema, &to_form_state(&schema, &Value::Null)?)?;
    let keys: Vec<&String> = outcome.error().map(|m| m.keys().collect()).unwrap_or_default();
    assert_eq!(keys, vec!["zeta", "mid"]);
    assert_eq!(outcome.value(), &json!({"zeta": "", "alpha": "", "mid": ""}));
    Ok(())
}
