//! State trees and the forward transform (domain value → state tree)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{kind_name, FormError};
use crate::path::{FieldPath, PathSegment};
use crate::result::Validation;
use crate::schema::{FormSchema, InputSchema, InputType, LeafSchema};
use crate::validators::{is_empty, text_of};

/// UI-facing state of one leaf input
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "E: Deserialize<'de>"))]
pub struct InputState<E = String> {
    /// Current display value; `Null` when unset.
    pub value: Value,
    /// Focused right now.
    pub active: bool,
    /// Blurred at least once, or revealed by a submit.
    pub visited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_result: Option<Validation<Value, E>>,
}

impl<E> InputState<E> {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            active: false,
            visited: false,
            validation_result: None,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_visited(mut self, visited: bool) -> Self {
        self.visited = visited;
        self
    }

    pub fn with_result(mut self, result: Validation<Value, E>) -> Self {
        self.validation_result = Some(result);
        self
    }

    /// The error to show: only once visited and only when the last result failed.
    pub fn visible_error(&self) -> Option<&E> {
        match &self.validation_result {
            Some(result) if self.visited => result.error(),
            _ => None,
        }
    }
}

impl<E: Clone> InputState<E> {
    /// State after the input gains focus.
    pub fn focused(&self) -> Self {
        self.clone().with_active(true)
    }

    /// State after the input loses focus.
    pub fn blurred(&self) -> Self {
        self.clone().with_active(false).with_visited(true)
    }
}

/// State of one schema field, shaped like its descriptor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldState<E = String> {
    Leaf(InputState<E>),
    /// One flat leaf state per item.
    List(Vec<InputState<E>>),
    /// One nested state tree per item.
    Collection(Vec<FormState<E>>),
}

impl<E> FieldState<E> {
    pub fn shape(&self) -> &'static str {
        match self {
            FieldState::Leaf(_) => "leaf",
            FieldState::List(_) => "list",
            FieldState::Collection(_) => "collection",
        }
    }

    pub fn as_leaf(&self) -> Option<&InputState<E>> {
        match self {
            FieldState::Leaf(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[InputState<E>]> {
        match self {
            FieldState::List(items) => Some(items),
            _ => None,
        }
    }

    /// Collection items. An empty list also reads as an empty collection, since
    /// the two are indistinguishable once serialized.
    pub fn as_collection(&self) -> Option<&[FormState<E>]> {
        match self {
            FieldState::Collection(items) => Some(items),
            FieldState::List(items) if items.is_empty() => Some(&[]),
            _ => None,
        }
    }
}

/// Per-schema state tree, keyed like the schema
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState<E = String> {
    fields: IndexMap<String, FieldState<E>>,
}

impl<E> Default for FormState<E> {
    fn default() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }
}

impl<E> FormState<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, state: FieldState<E>) -> Self {
        self.fields.insert(key.into(), state);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldState<E>> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldState<E>)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn field_for(&self, key: &str) -> Result<&FieldState<E>, FormError> {
        self.get(key)
            .ok_or_else(|| FormError::MissingField(key.to_string()))
    }

    /// Leaf state at `path`.
    pub fn leaf_at(&self, path: &FieldPath) -> Result<&InputState<E>, FormError> {
        leaf_in_form(self, path.segments(), path)
    }
}

impl<E: Clone> FormState<E> {
    /// A copy with `key` replaced.
    pub fn with(&self, key: &str, state: FieldState<E>) -> Self {
        let mut next = self.clone();
        next.fields.insert(key.to_string(), state);
        next
    }

    /// A copy with the leaf at `path` replaced.
    pub fn replace_leaf(&self, path: &FieldPath, leaf: InputState<E>) -> Result<Self, FormError> {
        replace_in_form(self, path.segments(), path, leaf)
    }
}

fn leaf_in_form<'a, E>(
    state: &'a FormState<E>,
    segments: &[PathSegment],
    path: &FieldPath,
) -> Result<&'a InputState<E>, FormError> {
    let invalid = || FormError::InvalidPath(path.to_string());
    let (key, rest) = match segments.split_first() {
        Some((PathSegment::Key(key), rest)) => (key, rest),
        _ => return Err(invalid()),
    };
    match (state.field_for(key)?, rest) {
        (FieldState::Leaf(leaf), []) => Ok(leaf),
        (FieldState::List(items), [PathSegment::Index(i)]) => {
            items.get(*i).ok_or_else(|| out_of_bounds(key, *i, items.len()))
        }
        (FieldState::Collection(items), [PathSegment::Index(i), rest @ ..]) if !rest.is_empty() => {
            let item = items
                .get(*i)
                .ok_or_else(|| out_of_bounds(key, *i, items.len()))?;
            leaf_in_form(item, rest, path)
        }
        _ => Err(invalid()),
    }
}

fn replace_in_form<E: Clone>(
    state: &FormState<E>,
    segments: &[PathSegment],
    path: &FieldPath,
    leaf: InputState<E>,
) -> Result<FormState<E>, FormError> {
    let invalid = || FormError::InvalidPath(path.to_string());
    let (key, rest) = match segments.split_first() {
        Some((PathSegment::Key(key), rest)) => (key, rest),
        _ => return Err(invalid()),
    };
    let next = match (state.field_for(key)?, rest) {
        (FieldState::Leaf(_), []) => FieldState::Leaf(leaf),
        (FieldState::List(items), [PathSegment::Index(i)]) => {
            if *i >= items.len() {
                return Err(out_of_bounds(key, *i, items.len()));
            }
            FieldState::List(replace_at(items, *i, leaf))
        }
        (FieldState::Collection(items), [PathSegment::Index(i), rest @ ..]) if !rest.is_empty() => {
            let item = items
                .get(*i)
                .ok_or_else(|| out_of_bounds(key, *i, items.len()))?;
            let replaced = replace_in_form(item, rest, path, leaf)?;
            FieldState::Collection(replace_at(items, *i, replaced))
        }
        _ => return Err(invalid()),
    };
    Ok(state.with(key, next))
}

fn out_of_bounds(key: &str, index: usize, len: usize) -> FormError {
    FormError::IndexOutOfBounds {
        field: key.to_string(),
        index,
        len,
    }
}

/// Copy of `items` with `index` replaced; out-of-range indices leave it unchanged.
pub fn replace_at<T: Clone>(items: &[T], index: usize, item: T) -> Vec<T> {
    let mut next = items.to_vec();
    if let Some(slot) = next.get_mut(index) {
        *slot = item;
    }
    next
}

/// Copy of `items` without `index`; out-of-range indices leave it unchanged.
pub fn remove_at<T: Clone>(items: &[T], index: usize) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, item)| item.clone())
        .collect()
}

impl<E> FormSchema<E> {
    /// Leaf descriptor at `path`.
    pub fn leaf_at(&self, path: &FieldPath) -> Result<&LeafSchema<E>, FormError> {
        leaf_schema_in(self, path.segments(), path)
    }
}

fn leaf_schema_in<'a, E>(
    schema: &'a FormSchema<E>,
    segments: &[PathSegment],
    path: &FieldPath,
) -> Result<&'a LeafSchema<E>, FormError> {
    let (key, rest) = match segments.split_first() {
        Some((PathSegment::Key(key), rest)) => (key, rest),
        _ => return Err(FormError::InvalidPath(path.to_string())),
    };
    match (schema.try_get(key)?, rest) {
        (InputSchema::Leaf(leaf), []) => Ok(leaf),
        (InputSchema::List(list), [PathSegment::Index(_)]) => Ok(&list.field),
        (InputSchema::Collection(collection), [PathSegment::Index(_), rest @ ..])
            if !rest.is_empty() =>
        {
            leaf_schema_in(&collection.fields, rest, path)
        }
        _ => Err(FormError::InvalidPath(path.to_string())),
    }
}

/// Leaf state holding `value`, or `default` when `value` is empty.
pub fn mk_input_state<E>(default: Value, value: Value) -> InputState<E> {
    InputState::new(if is_empty(&value) { default } else { value })
}

/// Leaf state of a hidden input: never interacted with, so already visited.
pub fn mk_hidden_input_state<E>(value: Value) -> InputState<E> {
    InputState::new(value).with_visited(true)
}

/// String form under which option values are stored in state.
pub fn option_key(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(_) => value.clone(),
        other => Value::String(text_of(other).into_owned()),
    }
}

/// Wraps a domain value into the leaf state of `schema`.
pub fn to_input_state<E>(schema: &LeafSchema<E>, value: &Value) -> InputState<E> {
    let value = match schema.from_value() {
        Some(from_value) => from_value.apply(value),
        None => value.clone(),
    };
    let default = |fallback: Value| schema.default_value().cloned().unwrap_or(fallback);

    match (schema, schema.kind()) {
        (_, InputType::Hidden) => mk_hidden_input_state(value),
        (LeafSchema::Option(_), _) => mk_input_state(default(Value::from("")), option_key(&value)),
        (_, InputType::Multiselect) => {
            let items = match value {
                Value::Array(items) => Value::Array(items),
                other if is_empty(&other) => Value::Array(Vec::new()),
                other => Value::Array(vec![other]),
            };
            mk_input_state(default(Value::Array(Vec::new())), items)
        }
        (_, InputType::Number) => mk_input_state(default(Value::Null), value),
        _ => mk_input_state(default(Value::from("")), value),
    }
}

/// Items of a repeated field; empty values read as no items.
pub(crate) fn items_of<'a>(key: &str, value: &'a Value) -> Result<&'a [Value], FormError> {
    match value {
        Value::Array(items) => Ok(items),
        other if is_empty(other) => Ok(&[]),
        other => Err(FormError::ExpectedArray {
            field: key.to_string(),
            found: kind_name(other),
        }),
    }
}

/// Object fields of a form value; `Null` reads as `{}`.
pub(crate) fn object_of(value: &Value) -> Result<Option<&Map<String, Value>>, FormError> {
    match value {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        other => Err(FormError::NotAnObject(kind_name(other))),
    }
}

static NULL: Value = Value::Null;

/// Forward transform: builds the state tree of `value` under `schema`.
///
/// Fields missing from `value` start empty; keys the schema does not know
/// are rejected.
pub fn to_form_state<E>(schema: &FormSchema<E>, value: &Value) -> Result<FormState<E>, FormError> {
    let object = object_of(value)?;
    if let Some(unknown) = object.and_then(|map| map.keys().find(|k| !schema.contains(k))) {
        return Err(FormError::UnknownField(unknown.clone()));
    }

    let mut state = FormState::new();
    for (key, input) in schema.iter() {
        let field_value = object.and_then(|map| map.get(key)).unwrap_or(&NULL);
        state.fields.insert(key.clone(), to_field_state(key, input, field_value)?);
    }
    Ok(state)
}

fn to_field_state<E>(
    key: &str,
    schema: &InputSchema<E>,
    value: &Value,
) -> Result<FieldState<E>, FormError> {
    Ok(match schema {
        InputSchema::Leaf(leaf) => FieldState::Leaf(to_input_state(leaf, value)),
        InputSchema::List(list) => FieldState::List(
            items_of(key, value)?
                .iter()
                .map(|item| to_input_state(&list.field, item))
                .collect(),
        ),
        InputSchema::Collection(collection) => FieldState::Collection(
            items_of(key, value)?
                .iter()
                .map(|item| to_form_state(&collection.fields, item))
                .collect::<Result<_, _>>()?,
        ),
    })
}

/// Checks that `state` has exactly the schema's fields, each of the right shape.
pub fn check_form_state<E>(schema: &FormSchema<E>, state: &FormState<E>) -> Result<(), FormError> {
    if let Some(unknown) = state.fields.keys().find(|k| !schema.contains(k)) {
        return Err(FormError::UnknownField(unknown.clone()));
    }
    for (key, input) in schema.iter() {
        check_field_state(key, input, state.field_for(key)?)?;
    }
    Ok(())
}

/// Checks one field's state against its descriptor, recursing into collections.
pub fn check_field_state<E>(
    key: &str,
    schema: &InputSchema<E>,
    state: &FieldState<E>,
) -> Result<(), FormError> {
    match (schema, state) {
        (InputSchema::Leaf(_), FieldState::Leaf(_)) => Ok(()),
        (InputSchema::List(_), FieldState::List(_)) => Ok(()),
        (InputSchema::Collection(collection), state) => match state.as_collection() {
            Some(items) => items
                .iter()
                .try_for_each(|item| check_form_state(&collection.fields, item)),
            None => Err(shape_mismatch(key, "collection", state)),
        },
        (InputSchema::Leaf(_), state) => Err(shape_mismatch(key, "leaf", state)),
        (InputSchema::List(_), state) => Err(shape_mismatch(key, "list", state)),
    }
}

pub(crate) fn shape_mismatch<E>(
    key: &str,
    expected: &'static str,
    found: &FieldState<E>,
) -> FormError {
    FormError::ShapeMismatch {
        field: key.to_string(),
        expected,
        found: found.shape(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CollectionInput, ListInput, OptionInput, SimpleInput};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn leaf(value: Value) -> FieldState {
        FieldState::Leaf(InputState::new(value))
    }

    #[test]
    fn test_mk_input_state_defaults() {
        let s: InputState = mk_input_state(json!("def"), json!(""));
        assert_eq!(s, InputState::new(json!("def")));
        let s: InputState = mk_input_state(json!("def"), Value::Null);
        assert_eq!(s, InputState::new(json!("def")));
        let s: InputState = mk_input_state(json!(""), json!("foo"));
        assert_eq!(s, InputState::new(json!("foo")));
    }

    #[test]
    fn test_hidden_starts_visited() {
        let schema: LeafSchema = SimpleInput::hidden("Id").into();
        let state = to_input_state(&schema, &json!(7));
        assert!(state.visited);
        assert!(!state.active);
        assert_eq!(state.value, json!(7));
    }

    #[test]
    fn test_number_keeps_unset() {
        let schema: LeafSchema = SimpleInput::number("Level").into();
        assert_eq!(to_input_state(&schema, &Value::Null).value, Value::Null);
        assert_eq!(to_input_state(&schema, &json!(0)).value, json!(0));
    }

    #[test]
    fn test_declared_default_and_coercion() {
        let schema: LeafSchema = SimpleInput::text("Name")
            .default_value(json!("anonymous"))
            .from_value(|v| json!(text_of(v).to_uppercase()))
            .into();
        assert_eq!(to_input_state(&schema, &json!("ann")).value, json!("ANN"));
        assert_eq!(to_input_state(&schema, &Value::Null).value, json!("anonymous"));
    }

    #[test]
    fn test_option_values_are_stringified() {
        let schema: LeafSchema = OptionInput::radio(
            "Active",
            vec![("Yes".into(), json!(true)), ("No".into(), json!(false))],
        )
        .into();
        assert_eq!(to_input_state(&schema, &json!(false)).value, json!("false"));
        assert_eq!(to_input_state(&schema, &Value::Null).value, json!(""));
    }

    #[test]
    fn test_multiselect_arrifies() {
        let schema: LeafSchema = SimpleInput::multiselect("Tags").into();
        assert_eq!(to_input_state(&schema, &json!("a")).value, json!(["a"]));
        assert_eq!(to_input_state(&schema, &Value::Null).value, json!([]));
    }

    #[test]
    fn test_list_and_collection_shapes_differ() {
        let list: FormSchema = FormSchema::new().field(
            "items",
            ListInput::new("Items", SimpleInput::text("Item")),
        );
        let collection: FormSchema = FormSchema::new().field(
            "items",
            CollectionInput::new(
                "Items",
                FormSchema::new().field("name", SimpleInput::text("Name")),
            ),
        );

        let as_list = to_form_state(&list, &json!({"items": ["item", "item2"]})).unwrap();
        assert_eq!(
            as_list,
            FormState::new().field(
                "items",
                FieldState::List(vec![
                    InputState::new(json!("item")),
                    InputState::new(json!("item2"))
                ])
            )
        );

        let as_collection =
            to_form_state(&collection, &json!({"items": [{"name": "item"}]})).unwrap();
        assert_eq!(
            as_collection,
            FormState::new().field(
                "items",
                FieldState::Collection(vec![FormState::new().field("name", leaf(json!("item")))])
            )
        );
    }

    #[test]
    fn test_structural_mismatches() {
        let schema: FormSchema = FormSchema::new().field(
            "items",
            ListInput::new("Items", SimpleInput::text("Item")),
        );
        assert!(matches!(
            to_form_state(&schema, &json!({"items": 3})),
            Err(FormError::ExpectedArray { .. })
        ));
        assert!(matches!(
            to_form_state(&schema, &json!({"other": []})),
            Err(FormError::UnknownField(_))
        ));
        assert!(matches!(
            to_form_state(&schema, &json!("nope")),
            Err(FormError::NotAnObject("string"))
        ));
        assert_eq!(
            to_form_state(&schema, &Value::Null).unwrap(),
            FormState::new().field("items", FieldState::List(vec![]))
        );
    }

    #[test]
    fn test_replace_leaf_is_a_copy() {
        let schema: FormSchema = FormSchema::new().field(
            "skills",
            CollectionInput::new(
                "Skills",
                FormSchema::new().field("name", SimpleInput::text("Name")),
            ),
        );
        let value = json!({"skills": [{"name": "a"}, {"name": "b"}]});
        let state = to_form_state(&schema, &value).unwrap();
        let path: FieldPath = "skills.1.name".parse().unwrap();

        let next = state.replace_leaf(&path, InputState::new(json!("c"))).unwrap();

        assert_eq!(state.leaf_at(&path).unwrap().value, json!("b"));
        assert_eq!(next.leaf_at(&path).unwrap().value, json!("c"));
        assert!(schema.leaf_at(&path).is_ok());
        assert!(matches!(
            state.leaf_at(&"skills.5.name".parse().unwrap()),
            Err(FormError::IndexOutOfBounds { index: 5, len: 2, .. })
        ));
        assert!(state.leaf_at(&"skills.0".parse().unwrap()).is_err());
    }

    #[test]
    fn test_state_tree_from_json() {
        let state: FormState = serde_json::from_value(json!({
            "name": {"value": "a", "active": false, "visited": true,
                     "validationResult": {"type": "Err", "value": "bad", "obj": "a"}},
            "tags": [{"value": "x", "active": false, "visited": false}],
            "skills": [{"level": {"value": 1, "active": true, "visited": false}}]
        }))
        .unwrap();

        let name = state.get("name").and_then(FieldState::as_leaf).unwrap();
        assert_eq!(name.visible_error().map(String::as_str), Some("bad"));
        assert_eq!(state.get("tags").and_then(FieldState::as_list).map(<[_]>::len), Some(1));
        let skills = state.get("skills").and_then(FieldState::as_collection).unwrap();
        assert!(skills[0].get("level").and_then(FieldState::as_leaf).unwrap().active);
    }

    #[test]
    fn test_remove_and_replace_ignore_bad_indices() {
        assert_eq!(remove_at(&[1, 2, 3], 1), vec![1, 3]);
        assert_eq!(remove_at(&[1, 2, 3], 9), vec![1, 2, 3]);
        assert_eq!(replace_at(&[1, 2], 5, 9), vec![1, 2]);
    }
}
