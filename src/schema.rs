//! Schema definition for forms
//!
//! A schema maps each field name of a domain value to an input descriptor:
//! what kind of input edits it, how it is validated and coerced, and, for
//! repeated fields, what each item looks like.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormError;
use crate::validators::{Validator, Validators};

/// Closed set of input type tags, used for state encoding and render dispatch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputType {
    Text,
    Email,
    Number,
    Textarea,
    Password,
    CustomBox,
    Hidden,
    Multiselect,
    Radio,
    Select,
    CustomOption,
    List,
    Collection,
}

impl InputType {
    pub const ALL: [InputType; 13] = [
        InputType::Text,
        InputType::Email,
        InputType::Number,
        InputType::Textarea,
        InputType::Password,
        InputType::CustomBox,
        InputType::Hidden,
        InputType::Multiselect,
        InputType::Radio,
        InputType::Select,
        InputType::CustomOption,
        InputType::List,
        InputType::Collection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Email => "email",
            InputType::Number => "number",
            InputType::Textarea => "textarea",
            InputType::Password => "password",
            InputType::CustomBox => "customBox",
            InputType::Hidden => "hidden",
            InputType::Multiselect => "multiselect",
            InputType::Radio => "radio",
            InputType::Select => "select",
            InputType::CustomOption => "customOption",
            InputType::List => "list",
            InputType::Collection => "collection",
        }
    }

    /// Tags whose input picks one of an enumerated set of values.
    pub fn is_option(&self) -> bool {
        matches!(
            self,
            InputType::Radio | InputType::Select | InputType::CustomOption
        )
    }

    /// Tags of single-value box inputs.
    pub fn is_box(&self) -> bool {
        !self.is_option() && !matches!(self, InputType::List | InputType::Collection)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InputType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FormError::UnknownField(format!("input type '{}'", s)))
    }
}

/// Value coercion hook (raw edit → typed value, or typed value → display).
#[derive(Clone)]
pub struct Coercion(Arc<dyn Fn(&Value) -> Value + Send + Sync>);

impl Coercion {
    pub fn new(f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn apply(&self, value: &Value) -> Value {
        (self.0)(value)
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Coercion")
    }
}

/// Presentation attributes passed through to the rendered input
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputMeta {
    pub name: Option<String>,
    pub id: Option<String>,
    pub placeholder: Option<String>,
    pub disabled: bool,
    pub read_only: bool,
    pub section_title: Option<String>,
}

impl InputMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// A scalar box input (text, number, hidden, ...)
#[derive(Clone, Debug)]
pub struct SimpleInput<E = String> {
    pub kind: InputType,
    pub meta: InputMeta,
    pub validators: Validators<E>,
    pub to_value: Option<Coercion>,
    pub from_value: Option<Coercion>,
    pub default: Option<Value>,
}

/// An input choosing among labelled values (radio, select, ...)
#[derive(Clone, Debug)]
pub struct OptionInput<E = String> {
    pub kind: InputType,
    pub meta: InputMeta,
    pub validators: Validators<E>,
    pub to_value: Option<Coercion>,
    pub from_value: Option<Coercion>,
    pub default: Option<Value>,
    pub values: Vec<(String, Value)>,
}

macro_rules! leaf_builders {
    ($ty:ident) => {
        impl<E> $ty<E> {
            pub fn validator(mut self, validator: Validator<E>) -> Self {
                self.validators.push(validator);
                self
            }

            pub fn validators(mut self, validators: Validators<E>) -> Self {
                self.validators = validators;
                self
            }

            pub fn to_value(mut self, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
                self.to_value = Some(Coercion::new(f));
                self
            }

            pub fn from_value(
                mut self,
                f: impl Fn(&Value) -> Value + Send + Sync + 'static,
            ) -> Self {
                self.from_value = Some(Coercion::new(f));
                self
            }

            pub fn default_value(mut self, value: Value) -> Self {
                self.default = Some(value);
                self
            }

            pub fn id(mut self, id: impl Into<String>) -> Self {
                self.meta.id = Some(id.into());
                self
            }

            pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
                self.meta.placeholder = Some(placeholder.into());
                self
            }

            pub fn disabled(mut self, disabled: bool) -> Self {
                self.meta.disabled = disabled;
                self
            }

            pub fn read_only(mut self, read_only: bool) -> Self {
                self.meta.read_only = read_only;
                self
            }

            pub fn section_title(mut self, title: impl Into<String>) -> Self {
                self.meta.section_title = Some(title.into());
                self
            }
        }
    };
}

leaf_builders!(SimpleInput);
leaf_builders!(OptionInput);

impl<E> SimpleInput<E> {
    /// A box input of `kind`; option, list and collection tags are rejected.
    pub fn new(kind: InputType, name: impl Into<String>) -> Result<Self, FormError> {
        if !kind.is_box() {
            return Err(FormError::ShapeMismatch {
                field: name.into(),
                expected: "box input type",
                found: kind.as_str(),
            });
        }
        Ok(Self::of(kind, name))
    }

    fn of(kind: InputType, name: impl Into<String>) -> Self {
        Self {
            kind,
            meta: InputMeta::named(name),
            validators: Vec::new(),
            to_value: None,
            from_value: None,
            default: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::of(InputType::Text, name)
    }

    pub fn email(name: impl Into<String>) -> Self {
        Self::of(InputType::Email, name)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::of(InputType::Number, name)
    }

    pub fn textarea(name: impl Into<String>) -> Self {
        Self::of(InputType::Textarea, name)
    }

    pub fn password(name: impl Into<String>) -> Self {
        Self::of(InputType::Password, name)
    }

    pub fn hidden(name: impl Into<String>) -> Self {
        Self::of(InputType::Hidden, name)
    }

    pub fn custom_box(name: impl Into<String>) -> Self {
        Self::of(InputType::CustomBox, name)
    }

    pub fn multiselect(name: impl Into<String>) -> Self {
        Self::of(InputType::Multiselect, name)
    }
}

impl<E> OptionInput<E> {
    pub fn new(
        kind: InputType,
        name: impl Into<String>,
        values: Vec<(String, Value)>,
    ) -> Result<Self, FormError> {
        if !kind.is_option() {
            return Err(FormError::ShapeMismatch {
                field: name.into(),
                expected: "option input type",
                found: kind.as_str(),
            });
        }
        Ok(Self::of(kind, name, values))
    }

    fn of(kind: InputType, name: impl Into<String>, values: Vec<(String, Value)>) -> Self {
        Self {
            kind,
            meta: InputMeta::named(name),
            validators: Vec::new(),
            to_value: None,
            from_value: None,
            default: None,
            values,
        }
    }

    pub fn radio(name: impl Into<String>, values: Vec<(String, Value)>) -> Self {
        Self::of(InputType::Radio, name, values)
    }

    pub fn select(name: impl Into<String>, values: Vec<(String, Value)>) -> Self {
        Self::of(InputType::Select, name, values)
    }

    pub fn custom_option(name: impl Into<String>, values: Vec<(String, Value)>) -> Self {
        Self::of(InputType::CustomOption, name, values)
    }
}

/// A single-value field: the item shape of lists and the leaf of every schema
#[derive(Clone, Debug)]
pub enum LeafSchema<E = String> {
    Simple(SimpleInput<E>),
    Option(OptionInput<E>),
}

impl<E> LeafSchema<E> {
    pub fn kind(&self) -> InputType {
        match self {
            LeafSchema::Simple(s) => s.kind,
            LeafSchema::Option(o) => o.kind,
        }
    }

    pub fn meta(&self) -> &InputMeta {
        match self {
            LeafSchema::Simple(s) => &s.meta,
            LeafSchema::Option(o) => &o.meta,
        }
    }

    pub fn validators(&self) -> &[Validator<E>] {
        match self {
            LeafSchema::Simple(s) => &s.validators,
            LeafSchema::Option(o) => &o.validators,
        }
    }

    pub fn to_value(&self) -> Option<&Coercion> {
        match self {
            LeafSchema::Simple(s) => s.to_value.as_ref(),
            LeafSchema::Option(o) => o.to_value.as_ref(),
        }
    }

    pub fn from_value(&self) -> Option<&Coercion> {
        match self {
            LeafSchema::Simple(s) => s.from_value.as_ref(),
            LeafSchema::Option(o) => o.from_value.as_ref(),
        }
    }

    pub fn default_value(&self) -> Option<&Value> {
        match self {
            LeafSchema::Simple(s) => s.default.as_ref(),
            LeafSchema::Option(o) => o.default.as_ref(),
        }
    }

    /// Enumerated `(label, value)` choices; empty for box inputs.
    pub fn values(&self) -> &[(String, Value)] {
        match self {
            LeafSchema::Simple(_) => &[],
            LeafSchema::Option(o) => &o.values,
        }
    }
}

/// How repeated fields create new items, and the labels of their affordances
#[derive(Clone)]
pub struct Mutate {
    create_value: CreateValue,
    pub add_first_label: Option<String>,
    pub add_next_label: String,
    pub remove_label: Option<String>,
}

#[derive(Clone)]
enum CreateValue {
    Constant(Value),
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl Mutate {
    pub fn new(add_next_label: impl Into<String>, create_value: Value) -> Self {
        Self {
            create_value: CreateValue::Constant(create_value),
            add_first_label: None,
            add_next_label: add_next_label.into(),
            remove_label: None,
        }
    }

    pub fn with_factory(
        add_next_label: impl Into<String>,
        factory: impl Fn() -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            create_value: CreateValue::Factory(Arc::new(factory)),
            add_first_label: None,
            add_next_label: add_next_label.into(),
            remove_label: None,
        }
    }

    pub fn add_first_label(mut self, label: impl Into<String>) -> Self {
        self.add_first_label = Some(label.into());
        self
    }

    pub fn remove_label(mut self, label: impl Into<String>) -> Self {
        self.remove_label = Some(label.into());
        self
    }

    /// Domain value of a freshly added item.
    pub fn create_value(&self) -> Value {
        match &self.create_value {
            CreateValue::Constant(value) => value.clone(),
            CreateValue::Factory(factory) => factory(),
        }
    }

    /// Label of the add affordance given the current item count.
    pub fn add_label(&self, item_count: usize) -> &str {
        match (&self.add_first_label, item_count) {
            (Some(first), 0) => first.as_str(),
            _ => self.add_next_label.as_str(),
        }
    }
}

impl fmt::Debug for Mutate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutate")
            .field("add_first_label", &self.add_first_label)
            .field("add_next_label", &self.add_next_label)
            .field("remove_label", &self.remove_label)
            .finish_non_exhaustive()
    }
}

/// A dynamic-length sequence of one leaf input
#[derive(Clone, Debug)]
pub struct ListInput<E = String> {
    pub meta: InputMeta,
    pub field: LeafSchema<E>,
    pub mutate: Option<Mutate>,
}

impl<E> ListInput<E> {
    pub fn new(name: impl Into<String>, field: impl Into<LeafSchema<E>>) -> Self {
        Self {
            meta: InputMeta::named(name),
            field: field.into(),
            mutate: None,
        }
    }

    pub fn mutate(mut self, mutate: Mutate) -> Self {
        self.mutate = Some(mutate);
        self
    }
}

/// A dynamic-length sequence of nested forms
#[derive(Clone, Debug)]
pub struct CollectionInput<E = String> {
    pub meta: InputMeta,
    pub fields: FormSchema<E>,
    pub mutate: Option<Mutate>,
}

impl<E> CollectionInput<E> {
    pub fn new(name: impl Into<String>, fields: FormSchema<E>) -> Self {
        Self {
            meta: InputMeta::named(name),
            fields,
            mutate: None,
        }
    }

    pub fn mutate(mut self, mutate: Mutate) -> Self {
        self.mutate = Some(mutate);
        self
    }
}

/// Input descriptor of one schema field
#[derive(Clone, Debug)]
pub enum InputSchema<E = String> {
    Leaf(LeafSchema<E>),
    List(ListInput<E>),
    Collection(CollectionInput<E>),
}

impl<E> InputSchema<E> {
    pub fn input_type(&self) -> InputType {
        match self {
            InputSchema::Leaf(leaf) => leaf.kind(),
            InputSchema::List(_) => InputType::List,
            InputSchema::Collection(_) => InputType::Collection,
        }
    }

    pub fn meta(&self) -> &InputMeta {
        match self {
            InputSchema::Leaf(leaf) => leaf.meta(),
            InputSchema::List(list) => &list.meta,
            InputSchema::Collection(collection) => &collection.meta,
        }
    }
}

impl<E> From<SimpleInput<E>> for LeafSchema<E> {
    fn from(input: SimpleInput<E>) -> Self {
        LeafSchema::Simple(input)
    }
}

impl<E> From<OptionInput<E>> for LeafSchema<E> {
    fn from(input: OptionInput<E>) -> Self {
        LeafSchema::Option(input)
    }
}

impl<E> From<LeafSchema<E>> for InputSchema<E> {
    fn from(leaf: LeafSchema<E>) -> Self {
        InputSchema::Leaf(leaf)
    }
}

impl<E> From<SimpleInput<E>> for InputSchema<E> {
    fn from(input: SimpleInput<E>) -> Self {
        InputSchema::Leaf(LeafSchema::Simple(input))
    }
}

impl<E> From<OptionInput<E>> for InputSchema<E> {
    fn from(input: OptionInput<E>) -> Self {
        InputSchema::Leaf(LeafSchema::Option(input))
    }
}

impl<E> From<ListInput<E>> for InputSchema<E> {
    fn from(input: ListInput<E>) -> Self {
        InputSchema::List(input)
    }
}

impl<E> From<CollectionInput<E>> for InputSchema<E> {
    fn from(input: CollectionInput<E>) -> Self {
        InputSchema::Collection(input)
    }
}

/// Field name → descriptor, in declaration order.
#[derive(Clone, Debug)]
pub struct FormSchema<E = String> {
    fields: IndexMap<String, InputSchema<E>>,
}

impl<E> Default for FormSchema<E> {
    fn default() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }
}

impl<E> FormSchema<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, input: impl Into<InputSchema<E>>) -> Self {
        self.fields.insert(key.into(), input.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&InputSchema<E>> {
        self.fields.get(key)
    }

    pub fn try_get(&self, key: &str) -> Result<&InputSchema<E>, FormError> {
        self.get(key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InputSchema<E>)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
