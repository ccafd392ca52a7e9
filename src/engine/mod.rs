//! State transformation engine
//!
//! Pure transforms between domain values, state trees and results. Every
//! function returns a new tree; nothing is updated in place.

pub mod activity;
pub mod mutate;
pub mod reverse;
pub mod state;
pub mod validate;

pub use activity::is_form_active;
pub use mutate::{
    push_collection_item, push_item, push_list_item, remove_item, replace_collection_item,
    replace_list_item,
};
pub use reverse::{
    collect_errors, form_result_to_result, form_state_to_form_result, input_state_to_result,
    to_result, ErrorMap, FieldError, FieldResult, FormOutcome, FormResult, InputResult,
};
pub use state::{
    check_field_state, check_form_state, mk_hidden_input_state, mk_input_state, option_key,
    to_form_state, to_input_state, FieldState, FormState, InputState,
};
pub use validate::{number_value, select_option, validate, validate_form};
