//! Live-edit validation and the submit-time marking pass

use serde_json::{Number, Value};

use crate::error::FormError;
use crate::schema::{FormSchema, InputSchema, InputType, LeafSchema};
use crate::validators::run_validators;

use super::state::{option_key, shape_mismatch, FieldState, FormState, InputState};

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Numeric reading of a raw edit.
///
/// `""` clears the value and a trailing `.` or `,` is kept as typed so the user
/// can finish the number. Anything unparsable is kept raw for the validators to
/// reject.
pub fn number_value(raw: &Value) -> Value {
    let text = match raw {
        Value::String(text) => text.trim(),
        other => return other.clone(),
    };
    if text.is_empty() {
        return Value::Null;
    }
    if text.ends_with('.') || text.ends_with(',') {
        return raw.clone();
    }
    match text.parse::<f64>() {
        Ok(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => Value::from(n as i64),
        Ok(n) => Number::from_f64(n).map(Value::Number).unwrap_or_else(|| raw.clone()),
        Err(_) => raw.clone(),
    }
}

/// Typed value the validators see for a stored leaf value.
///
/// A declared `to_value` wins. Option inputs store the string form of their
/// choice, which maps back to the typed value of the matching option.
pub(crate) fn typed_value<E>(schema: &LeafSchema<E>, raw: &Value) -> Value {
    if let Some(to_value) = schema.to_value() {
        return to_value.apply(raw);
    }
    match schema {
        LeafSchema::Option(input) => input
            .values
            .iter()
            .map(|(_, value)| value)
            .find(|value| &option_key(value) == raw)
            .cloned()
            .unwrap_or_else(|| raw.clone()),
        LeafSchema::Simple(input) if input.kind == InputType::Number => number_value(raw),
        LeafSchema::Simple(_) => raw.clone(),
    }
}

/// Applies a raw edit to one leaf and validates it.
///
/// Focus flags are left as they are; `focus`/`blur` own those.
pub fn validate<E: Clone>(
    schema: &LeafSchema<E>,
    state: &InputState<E>,
    raw: Value,
) -> InputState<E> {
    let typed = typed_value(schema, &raw);
    let value = match schema {
        LeafSchema::Option(_) => option_key(&raw),
        LeafSchema::Simple(_) => typed.clone(),
    };
    log::trace!("validating {} edit: {}", schema.kind(), value);
    InputState {
        value,
        validation_result: Some(run_validators(schema.validators(), typed)),
        ..state.clone()
    }
}

/// Picks `value` on an option input; a pick counts as a visit.
pub fn select_option<E: Clone>(
    schema: &LeafSchema<E>,
    state: &InputState<E>,
    value: &Value,
) -> InputState<E> {
    InputState {
        value: option_key(value),
        visited: true,
        validation_result: Some(run_validators(schema.validators(), value.clone())),
        ..state.clone()
    }
}

fn mark_input<E: Clone>(schema: &LeafSchema<E>, state: &InputState<E>) -> InputState<E> {
    InputState {
        visited: true,
        validation_result: Some(run_validators(
            schema.validators(),
            typed_value(schema, &state.value),
        )),
        ..state.clone()
    }
}

/// Revalidates every leaf from scratch and marks it visited, so all errors show.
pub fn validate_form<E: Clone>(
    schema: &FormSchema<E>,
    state: &FormState<E>,
) -> Result<FormState<E>, FormError> {
    let mut next = FormState::new();
    for (key, input) in schema.iter() {
        let field = state.field_for(key)?;
        let marked = match (input, field) {
            (InputSchema::Leaf(leaf), FieldState::Leaf(item)) => {
                FieldState::Leaf(mark_input(leaf, item))
            }
            (InputSchema::List(list), FieldState::List(items)) => FieldState::List(
                items.iter().map(|item| mark_input(&list.field, item)).collect(),
            ),
            (InputSchema::Collection(collection), field) => match field.as_collection() {
                Some(items) => FieldState::Collection(
                    items
                        .iter()
                        .map(|item| validate_form(&collection.fields, item))
                        .collect::<Result<_, _>>()?,
                ),
                None => return Err(shape_mismatch(key, "collection", field)),
            },
            (InputSchema::Leaf(_), field) => return Err(shape_mismatch(key, "leaf", field)),
            (InputSchema::List(_), field) => return Err(shape_mismatch(key, "list", field)),
        };
        next = next.field(key.clone(), marked);
    }
    Ok(next)
}
