// Formless - Schema-driven form state and validation

pub mod config;
pub mod engine;
pub mod error;
pub mod path;
pub mod render;
pub mod result;
pub mod schema;
pub mod session;
pub mod validators;

pub use config::RenderConfig;
pub use engine::{
    is_form_active, to_form_state, to_result, validate_form, ErrorMap, FieldError, FieldState,
    FormOutcome, FormState, InputState,
};
pub use error::FormError;
pub use path::{FieldPath, PathSegment};
pub use result::Validation;
pub use schema::{
    CollectionInput, FormSchema, InputMeta, InputSchema, InputType, LeafSchema, ListInput, Mutate,
    OptionInput, SimpleInput,
};
pub use session::{FormSession, SessionHandle, SessionPhase, SubmitEvent};
pub use validators::{run_validators, Validator, Validators};
