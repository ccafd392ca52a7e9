//! Adding and removing items of repeated fields

use serde_json::Value;

use crate::error::FormError;
use crate::schema::{CollectionInput, FormSchema, InputSchema, ListInput, Mutate};

use super::state::{
    remove_at, replace_at, shape_mismatch, to_form_state, to_input_state, FieldState, FormState,
    InputState,
};

fn new_item_value(mutate: Option<&Mutate>) -> Value {
    mutate.map(Mutate::create_value).unwrap_or(Value::Null)
}

/// Items with a new one appended, built from the field's `create_value`.
pub fn push_list_item<E: Clone>(
    list: &ListInput<E>,
    items: &[InputState<E>],
) -> Vec<InputState<E>> {
    let mut next = items.to_vec();
    next.push(to_input_state(&list.field, &new_item_value(list.mutate.as_ref())));
    next
}

/// Items with a new nested form appended, built from the field's `create_value`.
pub fn push_collection_item<E: Clone>(
    collection: &CollectionInput<E>,
    items: &[FormState<E>],
) -> Result<Vec<FormState<E>>, FormError> {
    let value = new_item_value(collection.mutate.as_ref());
    let mut next = items.to_vec();
    next.push(to_form_state(&collection.fields, &value)?);
    Ok(next)
}

/// A copy of `state` with one item appended to the repeated field `key`.
pub fn push_item<E: Clone>(
    schema: &FormSchema<E>,
    state: &FormState<E>,
    key: &str,
) -> Result<FormState<E>, FormError> {
    let field = state.field_for(key)?;
    let next = match (schema.try_get(key)?, field) {
        (InputSchema::List(list), FieldState::List(items)) => {
            FieldState::List(push_list_item(list, items))
        }
        (InputSchema::Collection(collection), field) => {
            let items = field
                .as_collection()
                .ok_or_else(|| shape_mismatch(key, "collection", field))?;
            FieldState::Collection(push_collection_item(collection, items)?)
        }
        (_, field) => return Err(shape_mismatch(key, "list or collection", field)),
    };
    log::trace!("added item to {}", key);
    Ok(state.with(key, next))
}

/// A copy of `state` without item `index` of the repeated field `key`.
///
/// An index past the end leaves the items unchanged.
pub fn remove_item<E: Clone>(
    schema: &FormSchema<E>,
    state: &FormState<E>,
    key: &str,
    index: usize,
) -> Result<FormState<E>, FormError> {
    let field = state.field_for(key)?;
    let next = match (schema.try_get(key)?, field) {
        (InputSchema::List(_), FieldState::List(items)) => {
            FieldState::List(remove_at(items, index))
        }
        (InputSchema::Collection(_), field) => {
            let items = field
                .as_collection()
                .ok_or_else(|| shape_mismatch(key, "collection", field))?;
            FieldState::Collection(remove_at(items, index))
        }
        (_, field) => return Err(shape_mismatch(key, "list or collection", field)),
    };
    log::trace!("removed item {} from {}", index, key);
    Ok(state.with(key, next))
}

/// A copy of `state` with item `index` of the collection `key` replaced.
pub fn replace_collection_item<E: Clone>(
    state: &FormState<E>,
    key: &str,
    index: usize,
    item: FormState<E>,
) -> Result<FormState<E>, FormError> {
    let field = state.field_for(key)?;
    let items = field
        .as_collection()
        .ok_or_else(|| shape_mismatch(key, "collection", field))?;
    Ok(state.with(key, FieldState::Collection(replace_at(items, index, item))))
}

/// A copy of `state` with item `index` of the list `key` replaced.
pub fn replace_list_item<E: Clone>(
    state: &FormState<E>,
    key: &str,
    index: usize,
    item: InputState<E>,
) -> Result<FormState<E>, FormError> {
    match state.field_for(key)? {
        FieldState::List(items) => Ok(state.with(
            key,
            FieldState::List(replace_at(items, index, item)),
        )),
        field => Err(shape_mismatch(key, "list", field)),
    }
}
