use crate::error::FormError;
use crate::schema::{FormSchema, InputSchema};

use super::state::{shape_mismatch, FieldState, FormState};

/// True when any leaf of `state`, at any depth, is focused.
pub fn is_form_active<E>(schema: &FormSchema<E>, state: &FormState<E>) -> Result<bool, FormError> {
    for (key, input) in schema.iter() {
        let field = state.field_for(key)?;
        let active = match (input, field) {
            (InputSchema::Leaf(_), FieldState::Leaf(leaf)) => leaf.active,
            (InputSchema::List(_), FieldState::List(items)) => items.iter().any(|item| item.active),
            (InputSchema::Collection(collection), field) => {
                let items = field
                    .as_collection()
                    .ok_or_else(|| shape_mismatch(key, "collection", field))?;
                let mut any = false;
                for item in items {
                    if is_form_active(&collection.fields, item)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            (InputSchema::Leaf(_), field) => return Err(shape_mismatch(key, "leaf", field)),
            (InputSchema::List(_), field) => return Err(shape_mismatch(key, "list", field)),
        };
        if active {
            return Ok(true);
        }
    }
    Ok(false)
}
