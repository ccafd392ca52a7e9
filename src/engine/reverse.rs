//! Reverse transform: state tree → result tree → final result

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::FormError;
use crate::path::FieldPath;
use crate::result::Validation;
use crate::schema::{FormSchema, InputSchema, LeafSchema};
use crate::validators::run_validators;

use super::state::{shape_mismatch, FieldState, FormState, InputState};
use super::validate::typed_value;

/// Validation outcome of one leaf.
pub type InputResult<E = String> = Validation<Value, E>;

/// Top-level field → that field's error token.
pub type ErrorMap<E = String> = IndexMap<String, E>;

/// Final outcome of a form: the clean domain value, or every field error plus
/// a best-effort value assembled from the failing leaves' fallbacks.
pub type FormOutcome<E = String> = Validation<Value, ErrorMap<E>>;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldResult<E = String> {
    Leaf(InputResult<E>),
    List(Vec<InputResult<E>>),
    Collection(Vec<FormResult<E>>),
}

impl<E> FieldResult<E> {
    fn shape(&self) -> &'static str {
        match self {
            FieldResult::Leaf(_) => "leaf",
            FieldResult::List(_) => "list",
            FieldResult::Collection(_) => "collection",
        }
    }
}

/// Result tree, shaped like the state tree it was computed from
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormResult<E = String> {
    fields: IndexMap<String, FieldResult<E>>,
}

impl<E> FormResult<E> {
    pub fn get(&self, key: &str) -> Option<&FieldResult<E>> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldResult<E>)> {
        self.fields.iter()
    }
}

/// One failing leaf, addressed by its full path.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldError<E = String> {
    pub path: FieldPath,
    pub error: E,
}

/// Result of one leaf.
///
/// A leaf that was visited or is focused and already carries a result reuses
/// it; anything else is coerced and validated afresh.
pub fn input_state_to_result<E: Clone>(
    schema: &LeafSchema<E>,
    state: &InputState<E>,
) -> InputResult<E> {
    match &state.validation_result {
        Some(cached) if state.visited || state.active => cached.clone(),
        _ => run_validators(schema.validators(), typed_value(schema, &state.value)),
    }
}

/// Phase 1: validate every leaf of `state`.
pub fn form_state_to_form_result<E: Clone>(
    schema: &FormSchema<E>,
    state: &FormState<E>,
) -> Result<FormResult<E>, FormError> {
    let mut fields = IndexMap::with_capacity(schema.len());
    for (key, input) in schema.iter() {
        let field = state.field_for(key)?;
        let result = match (input, field) {
            (InputSchema::Leaf(leaf), FieldState::Leaf(item)) => {
                FieldResult::Leaf(input_state_to_result(leaf, item))
            }
            (InputSchema::List(list), FieldState::List(items)) => FieldResult::List(
                items
                    .iter()
                    .map(|item| input_state_to_result(&list.field, item))
                    .collect(),
            ),
            (InputSchema::Collection(collection), field) => match field.as_collection() {
                Some(items) => FieldResult::Collection(
                    items
                        .iter()
                        .map(|item| form_state_to_form_result(&collection.fields, item))
                        .collect::<Result<_, _>>()?,
                ),
                None => return Err(shape_mismatch(key, "collection", field)),
            },
            (input, field) => return Err(shape_mismatch(key, expected_shape(input), field)),
        };
        fields.insert(key.clone(), result);
    }
    Ok(FormResult { fields })
}

fn expected_shape<E>(input: &InputSchema<E>) -> &'static str {
    match input {
        InputSchema::Leaf(_) => "leaf",
        InputSchema::List(_) => "list",
        InputSchema::Collection(_) => "collection",
    }
}

/// Rebuilds the domain value under `path`, pushing each failing leaf's error.
fn reconstruct<E: Clone>(
    schema: &FormSchema<E>,
    result: &FormResult<E>,
    path: &FieldPath,
    errors: &mut Vec<FieldError<E>>,
) -> Result<Value, FormError> {
    let mut object = Map::new();
    for (key, input) in schema.iter() {
        let field = result
            .get(key)
            .ok_or_else(|| FormError::MissingField(key.clone()))?;
        let field_path = path.child_key(key.as_str());
        let value = match (input, field) {
            (InputSchema::Leaf(_), FieldResult::Leaf(leaf)) => leaf_value(leaf, field_path, errors),
            (InputSchema::List(_), FieldResult::List(items)) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, leaf)| leaf_value(leaf, field_path.child_index(i), errors))
                    .collect(),
            ),
            (InputSchema::Collection(collection), FieldResult::Collection(items)) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        reconstruct(&collection.fields, item, &field_path.child_index(i), errors)
                    })
                    .collect::<Result<_, _>>()?,
            ),
            (input, field) => {
                return Err(FormError::ShapeMismatch {
                    field: key.clone(),
                    expected: expected_shape(input),
                    found: field.shape(),
                })
            }
        };
        object.insert(key.clone(), value);
    }
    Ok(Value::Object(object))
}

fn leaf_value<E: Clone>(
    leaf: &InputResult<E>,
    path: FieldPath,
    errors: &mut Vec<FieldError<E>>,
) -> Value {
    if let Some(error) = leaf.error() {
        errors.push(FieldError {
            path,
            error: error.clone(),
        });
    }
    leaf.value().clone()
}

/// Every failing leaf of `result`, in schema order then index order.
pub fn collect_errors<E: Clone>(
    schema: &FormSchema<E>,
    result: &FormResult<E>,
) -> Result<Vec<FieldError<E>>, FormError> {
    let mut errors = Vec::new();
    reconstruct(schema, result, &FieldPath::root(), &mut errors)?;
    Ok(errors)
}

/// Phase 2: fold a result tree into the final outcome.
///
/// Errors are keyed by top-level field; when several leaves of one field fail
/// the last one in index order is kept.
pub fn form_result_to_result<E: Clone>(
    schema: &FormSchema<E>,
    result: &FormResult<E>,
) -> Result<FormOutcome<E>, FormError> {
    let mut errors = Vec::new();
    let value = reconstruct(schema, result, &FieldPath::root(), &mut errors)?;
    if errors.is_empty() {
        return Ok(Validation::Valid(value));
    }

    let mut map = ErrorMap::new();
    for FieldError { path, error } in errors {
        if let Some(key) = path.first_key() {
            map.insert(key.to_string(), error);
        }
    }
    Ok(Validation::invalid(map, value))
}

/// Both reverse phases in one go.
pub fn to_result<E: Clone>(
    schema: &FormSchema<E>,
    state: &FormState<E>,
) -> Result<FormOutcome<E>, FormError> {
    let result = form_state_to_form_result(schema, state)?;
    form_result_to_result(schema, &result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::to_form_state;
    use crate::schema::{CollectionInput, ListInput, SimpleInput};
    use crate::validators::{not_empty, Validator};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn tags_schema() -> FormSchema {
        FormSchema::new()
            .field("title", SimpleInput::text("Title").validator(not_empty()))
            .field(
                "tags",
                ListInput::new("Tags", SimpleInput::text("Tag").validator(not_empty())),
            )
    }

    #[test]
    fn test_last_error_of_a_list_wins() {
        let schema = tags_schema();
        let state = to_form_state(&schema, &json!({"title": "", "tags": ["", "ok", ""]})).unwrap();
        let result = form_state_to_form_result(&schema, &state).unwrap();

        let errors = collect_errors(&schema, &result).unwrap();
        let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["title", "tags.0", "tags.2"]);

        let outcome = form_result_to_result(&schema, &result).unwrap();
        let map = outcome.error().cloned().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["title", "tags"]);
        assert_eq!(outcome.value(), &json!({"title": "", "tags": ["", "ok", ""]}));
    }

    #[test]
    fn test_cached_result_is_reused_once_visited() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let spy = Validator::new(move |v, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Validation::Valid(v)
        });
        let schema: LeafSchema = SimpleInput::text("Name").validator(spy).into();

        let fresh = InputState::new(json!("a"));
        let first = input_state_to_result(&schema, &fresh);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let cached = fresh.with_visited(true).with_result(first.clone());
        assert_eq!(input_state_to_result(&schema, &cached), first);
        assert_eq!(input_state_to_result(&schema, &cached), first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let unvisited = InputState::new(json!("a")).with_result(first);
        input_state_to_result(&schema, &unvisited);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_focused_leaf_keeps_its_cached_result() {
        let schema: FormSchema = FormSchema::new().field("n", SimpleInput::text("N"));
        let focused = InputState::new(json!("now"))
            .with_active(true)
            .with_result(Validation::valid(json!("old")));
        let state = FormState::new().field("n", FieldState::Leaf(focused));

        assert_eq!(
            to_result(&schema, &state).unwrap(),
            Validation::valid(json!({"n": "old"}))
        );
    }

    #[test]
    fn test_wrong_shape_is_structural_error() {
        let schema: FormSchema = FormSchema::new().field(
            "items",
            CollectionInput::new(
                "Items",
                FormSchema::new().field("name", SimpleInput::text("Name")),
            ),
        );
        let state = FormState::new().field("items", FieldState::Leaf(InputState::new(json!("x"))));
        assert!(matches!(
            to_result(&schema, &state),
            Err(FormError::ShapeMismatch { expected: "collection", found: "leaf", .. })
        ));

        let missing: FormState = FormState::new();
        assert!(matches!(to_result(&schema, &missing), Err(FormError::MissingField(_))));
    }
}
