//! session/mod.rs
//!
//! Form session controller: one form's lifecycle from its initial value through
//! edits, submit and reset. Every transition returns a new session.

mod handle;

pub use handle::SessionHandle;

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::engine::{
    check_field_state, check_form_state, is_form_active, push_item, remove_item, select_option,
    to_form_state, to_result, validate, validate_form, FieldState, FormOutcome, FormState,
};
use crate::error::FormError;
use crate::path::FieldPath;
use crate::result::Validation;
use crate::schema::FormSchema;

/// Lifecycle phase of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Initialized,
    Editing,
    SubmittedValid,
    SubmittedInvalid,
}

/// Host-side submit event whose default action the session suppresses.
pub trait SubmitEvent {
    fn prevent_default(&mut self);
}

type SubmitCallback = Arc<dyn Fn(&Value) + Send + Sync>;

pub struct FormSession<E = String> {
    id: Uuid,
    schema: Arc<FormSchema<E>>,
    initial_value: Value,
    state: FormState<E>,
    result: FormOutcome<E>,
    touched: bool,
    submitted: bool,
    phase: SessionPhase,
    on_submit: Option<SubmitCallback>,
}

impl<E: Clone> Clone for FormSession<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            schema: Arc::clone(&self.schema),
            initial_value: self.initial_value.clone(),
            state: self.state.clone(),
            result: self.result.clone(),
            touched: self.touched,
            submitted: self.submitted,
            phase: self.phase,
            on_submit: self.on_submit.clone(),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for FormSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSession")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("touched", &self.touched)
            .field("submitted", &self.submitted)
            .field("state", &self.state)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

impl<E: Clone> FormSession<E> {
    /// Create a new session from an initial domain value (`Null` reads as `{}`)
    pub fn new(schema: Arc<FormSchema<E>>, initial_value: Value) -> Result<Self, FormError> {
        let state = to_form_state(&schema, &initial_value)?;
        let result = to_result(&schema, &state)?;
        let id = Uuid::new_v4();
        log::debug!("session {} initialized with {} fields", id, schema.len());

        Ok(Self {
            id,
            schema,
            initial_value,
            state,
            result,
            touched: false,
            submitted: false,
            phase: SessionPhase::Initialized,
            on_submit: None,
        })
    }

    /// Create a new session from any serializable domain value
    pub fn from_typed<T: Serialize>(
        schema: Arc<FormSchema<E>>,
        initial_value: &T,
    ) -> Result<Self, FormError> {
        Self::new(schema, serde_json::to_value(initial_value)?)
    }

    /// Set the callback receiving the clean value of a valid submit
    pub fn with_on_submit(mut self, on_submit: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_submit = Some(Arc::new(on_submit));
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn schema(&self) -> &Arc<FormSchema<E>> {
        &self.schema
    }

    pub fn initial_value(&self) -> &Value {
        &self.initial_value
    }

    pub fn state(&self) -> &FormState<E> {
        &self.state
    }

    /// The live outcome, recomputed on every transition
    pub fn current_result(&self) -> &FormOutcome<E> {
        &self.result
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Whether any input of the form has focus
    pub fn is_active(&self) -> Result<bool, FormError> {
        is_form_active(&self.schema, &self.state)
    }

    /// Decode the current value into `T` when the form is valid
    pub fn valid_value<T: DeserializeOwned>(&self) -> Result<Option<T>, FormError> {
        match self.result.as_ref().into_result() {
            Ok(value) => Ok(Some(T::deserialize(value)?)),
            Err(_) => Ok(None),
        }
    }

    /// Session moved to `state` by a user edit
    fn edited(&self, state: FormState<E>) -> Result<Self, FormError> {
        let result = to_result(&self.schema, &state)?;
        if self.phase != SessionPhase::Editing {
            log::debug!("session {}: {:?} -> Editing", self.id, self.phase);
        }
        Ok(Self {
            state,
            result,
            touched: true,
            phase: SessionPhase::Editing,
            ..self.clone()
        })
    }

    /// Replace one top-level field's state
    pub fn apply_delta(&self, key: &str, delta: FieldState<E>) -> Result<Self, FormError> {
        let input = self.schema.try_get(key)?;
        check_field_state(key, input, &delta)?;
        log::trace!("session {}: delta on {}", self.id, key);
        self.edited(self.state.with(key, delta))
    }

    /// Replace the whole state tree
    pub fn set_state(&self, state: FormState<E>) -> Result<Self, FormError> {
        check_form_state(&self.schema, &state)?;
        self.edited(state)
    }

    /// Apply a raw edit to the input at `path` and validate it
    pub fn edit(&self, path: &FieldPath, raw: Value) -> Result<Self, FormError> {
        let schema = self.schema.leaf_at(path)?;
        let leaf = validate(schema, self.state.leaf_at(path)?, raw);
        log::trace!("session {}: edit at {}", self.id, path);
        self.edited(self.state.replace_leaf(path, leaf)?)
    }

    pub fn focus(&self, path: &FieldPath) -> Result<Self, FormError> {
        let leaf = self.state.leaf_at(path)?.focused();
        self.edited(self.state.replace_leaf(path, leaf)?)
    }

    pub fn blur(&self, path: &FieldPath) -> Result<Self, FormError> {
        let leaf = self.state.leaf_at(path)?.blurred();
        self.edited(self.state.replace_leaf(path, leaf)?)
    }

    /// Pick a typed option value on the option input at `path`
    pub fn select(&self, path: &FieldPath, value: &Value) -> Result<Self, FormError> {
        let schema = self.schema.leaf_at(path)?;
        let leaf = select_option(schema, self.state.leaf_at(path)?, value);
        self.edited(self.state.replace_leaf(path, leaf)?)
    }

    /// Append an item to the repeated field `key`
    pub fn push_item(&self, key: &str) -> Result<Self, FormError> {
        self.edited(push_item(&self.schema, &self.state, key)?)
    }

    /// Drop item `index` of the repeated field `key`
    pub fn remove_item(&self, key: &str, index: usize) -> Result<Self, FormError> {
        self.edited(remove_item(&self.schema, &self.state, key, index)?)
    }

    /// Rebuild the state from the initial value and clear the session flags
    pub fn reset_to_initial(&self) -> Result<Self, FormError> {
        let state = to_form_state(&self.schema, &self.initial_value)?;
        let result = to_result(&self.schema, &state)?;
        log::debug!("session {}: {:?} -> Initialized (reset)", self.id, self.phase);
        Ok(Self {
            state,
            result,
            touched: false,
            submitted: false,
            phase: SessionPhase::Initialized,
            ..self.clone()
        })
    }

    /// Submit the form.
    ///
    /// A valid form hands its clean value to the submit callback. An invalid one
    /// has every input revalidated and marked visited so all errors show.
    pub fn submit(
        &self,
        event: Option<&mut dyn SubmitEvent>,
    ) -> Result<(Self, FormOutcome<E>), FormError> {
        if let Some(event) = event {
            event.prevent_default();
        }
        let outcome = to_result(&self.schema, &self.state)?;
        let next = match &outcome {
            Validation::Valid(value) => {
                log::debug!("session {}: submit valid", self.id);
                if let Some(on_submit) = &self.on_submit {
                    on_submit(value);
                }
                Self {
                    result: outcome.clone(),
                    submitted: true,
                    touched: true,
                    phase: SessionPhase::SubmittedValid,
                    ..self.clone()
                }
            }
            Validation::Invalid { error, .. } => {
                log::debug!("session {}: submit rejected, {} field errors", self.id, error.len());
                let state = validate_form(&self.schema, &self.state)?;
                let result = to_result(&self.schema, &state)?;
                Self {
                    state,
                    result,
                    submitted: true,
                    touched: true,
                    phase: SessionPhase::SubmittedInvalid,
                    ..self.clone()
                }
            }
        };
        Ok((next, outcome))
    }

    /// Submit, then reset to the initial value whatever the outcome
    pub fn submit_and_reset(
        &self,
        event: Option<&mut dyn SubmitEvent>,
    ) -> Result<(Self, FormOutcome<E>), FormError> {
        let (submitted, outcome) = self.submit(event)?;
        Ok((submitted.reset_to_initial()?, outcome))
    }
}
