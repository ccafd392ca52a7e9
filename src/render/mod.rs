//! Render dispatch layer
//!
//! Renderers are looked up by input type in a [`RenderMap`]. A caller may
//! override entries key by key with [`RenderOverrides`]; the merged table is
//! resolved once per render pass into a [`RenderContext`]. Tags with no entry
//! go to the map's fallback renderer.

pub mod html;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::RenderConfig;
use crate::engine::{option_key, FieldState, FormState, InputState};
use crate::error::FormError;
use crate::path::FieldPath;
use crate::schema::{
    CollectionInput, FormSchema, InputMeta, InputSchema, InputType, LeafSchema, ListInput,
};
use crate::validators::text_of;

/// One choice of an option input
#[derive(Clone, Debug, PartialEq)]
pub struct OptionProps {
    pub label: String,
    /// String form of the option's value, as stored in state.
    pub value: String,
    pub checked: bool,
}

/// Attributes of a rendered leaf input
#[derive(Clone, Debug, PartialEq)]
pub struct InputProps<E = String> {
    pub name: Option<String>,
    pub id: String,
    pub placeholder: Option<String>,
    /// Display value; unset values show as `""`.
    pub value: String,
    pub disabled: bool,
    pub read_only: bool,
    /// Shown only once the input was visited and its last result failed.
    pub error: Option<E>,
    pub options: Vec<OptionProps>,
}

/// Props of the leaf at `path`. Inputs without a declared id use the path.
pub fn input_props<E: Clone>(
    path: &FieldPath,
    schema: &LeafSchema<E>,
    state: &InputState<E>,
) -> InputProps<E> {
    let meta = schema.meta();
    let options = schema
        .values()
        .iter()
        .map(|(label, value)| {
            let key = option_key(value);
            OptionProps {
                label: label.clone(),
                value: text_of(&key).into_owned(),
                checked: key == state.value,
            }
        })
        .collect();

    InputProps {
        name: meta.name.clone(),
        id: meta.id.clone().unwrap_or_else(|| path.to_string()),
        placeholder: meta.placeholder.clone(),
        value: text_of(&state.value).into_owned(),
        disabled: meta.disabled,
        read_only: meta.read_only,
        error: state.visible_error().cloned(),
        options,
    }
}

/// A schema field paired with its state, ready to render
pub enum FieldView<'a, E = String> {
    Leaf {
        path: FieldPath,
        schema: &'a LeafSchema<E>,
        state: &'a InputState<E>,
    },
    List {
        path: FieldPath,
        schema: &'a ListInput<E>,
        items: &'a [InputState<E>],
    },
    Collection {
        path: FieldPath,
        schema: &'a CollectionInput<E>,
        items: &'a [FormState<E>],
    },
}

impl<'a, E> FieldView<'a, E> {
    /// Pairs `schema` and `state` of the field at `path`, checking their shapes agree.
    pub fn new(
        path: FieldPath,
        schema: &'a InputSchema<E>,
        state: &'a FieldState<E>,
    ) -> Result<Self, FormError> {
        let key = path.to_string();
        let mismatch = |expected| FormError::ShapeMismatch {
            field: key.clone(),
            expected,
            found: state.shape(),
        };
        match (schema, state) {
            (InputSchema::Leaf(schema), FieldState::Leaf(state)) => Ok(FieldView::Leaf {
                path,
                schema,
                state,
            }),
            (InputSchema::List(schema), FieldState::List(items)) => Ok(FieldView::List {
                path,
                schema,
                items,
            }),
            (InputSchema::Collection(schema), state) => match state.as_collection() {
                Some(items) => Ok(FieldView::Collection {
                    path,
                    schema,
                    items,
                }),
                None => Err(mismatch("collection")),
            },
            (InputSchema::Leaf(_), _) => Err(mismatch("leaf")),
            (InputSchema::List(_), _) => Err(mismatch("list")),
        }
    }

    pub fn path(&self) -> &FieldPath {
        match self {
            FieldView::Leaf { path, .. }
            | FieldView::List { path, .. }
            | FieldView::Collection { path, .. } => path,
        }
    }

    pub fn input_type(&self) -> InputType {
        match self {
            FieldView::Leaf { schema, .. } => schema.kind(),
            FieldView::List { .. } => InputType::List,
            FieldView::Collection { .. } => InputType::Collection,
        }
    }

    pub fn meta(&self) -> &InputMeta {
        match self {
            FieldView::Leaf { schema, .. } => schema.meta(),
            FieldView::List { schema, .. } => &schema.meta,
            FieldView::Collection { schema, .. } => &schema.meta,
        }
    }
}

impl<E: Clone> FieldView<'_, E> {
    /// Props of a leaf view; `None` for lists and collections.
    pub fn props(&self) -> Option<InputProps<E>> {
        match self {
            FieldView::Leaf { path, schema, state } => Some(input_props(path, schema, state)),
            _ => None,
        }
    }
}

/// Renders one field view into a UI value
pub type Renderer<Ui, E = String> =
    Arc<dyn Fn(&RenderContext<Ui, E>, &FieldView<'_, E>) -> Result<Ui, FormError> + Send + Sync>;

/// Make a [`Renderer`] from a closure
pub fn renderer<Ui, E>(
    f: impl Fn(&RenderContext<Ui, E>, &FieldView<'_, E>) -> Result<Ui, FormError>
        + Send
        + Sync
        + 'static,
) -> Renderer<Ui, E> {
    Arc::new(f)
}

/// Partial table of renderers layered over a [`RenderMap`]
pub struct RenderOverrides<Ui, E = String> {
    renderers: HashMap<InputType, Renderer<Ui, E>>,
}

impl<Ui, E> Default for RenderOverrides<Ui, E> {
    fn default() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }
}

impl<Ui, E> RenderOverrides<Ui, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: InputType, renderer: Renderer<Ui, E>) -> Self {
        self.renderers.insert(tag, renderer);
        self
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

/// Input type → renderer, with a fallback for tags that have no entry
pub struct RenderMap<Ui, E = String> {
    renderers: HashMap<InputType, Renderer<Ui, E>>,
    fallback: Renderer<Ui, E>,
}

impl<Ui, E> Clone for RenderMap<Ui, E> {
    fn clone(&self) -> Self {
        Self {
            renderers: self.renderers.clone(),
            fallback: Arc::clone(&self.fallback),
        }
    }
}

impl<Ui, E> fmt::Debug for RenderMap<Ui, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.renderers.keys().map(InputType::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("RenderMap").field("tags", &tags).finish_non_exhaustive()
    }
}

impl<Ui, E> RenderMap<Ui, E> {
    pub fn new(fallback: Renderer<Ui, E>) -> Self {
        Self {
            renderers: HashMap::new(),
            fallback,
        }
    }

    pub fn with(mut self, tag: InputType, renderer: Renderer<Ui, E>) -> Self {
        self.renderers.insert(tag, renderer);
        self
    }

    pub fn contains(&self, tag: InputType) -> bool {
        self.renderers.contains_key(&tag)
    }

    /// This map with every entry of `overrides` replacing its own.
    pub fn overridden_by(&self, overrides: &RenderOverrides<Ui, E>) -> Self {
        let mut merged = self.clone();
        for (tag, renderer) in &overrides.renderers {
            merged.renderers.insert(*tag, Arc::clone(renderer));
        }
        merged
    }

    /// Renderer for `tag`, or the fallback.
    pub fn resolve(&self, tag: InputType) -> &Renderer<Ui, E> {
        match self.renderers.get(&tag) {
            Some(renderer) => renderer,
            None => {
                log::warn!("no renderer registered for '{}', using fallback", tag);
                &self.fallback
            }
        }
    }
}

/// A resolved render map plus the settings of one render pass
pub struct RenderContext<Ui, E = String> {
    map: RenderMap<Ui, E>,
    config: RenderConfig,
}

impl<Ui, E> RenderContext<Ui, E> {
    pub fn new(
        map: &RenderMap<Ui, E>,
        overrides: Option<&RenderOverrides<Ui, E>>,
        config: RenderConfig,
    ) -> Self {
        let map = match overrides {
            Some(overrides) => map.overridden_by(overrides),
            None => map.clone(),
        };
        Self { map, config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn map(&self) -> &RenderMap<Ui, E> {
        &self.map
    }

    pub fn render_field(&self, view: &FieldView<'_, E>) -> Result<Ui, FormError> {
        let renderer = self.map.resolve(view.input_type());
        renderer(self, view)
    }

    /// Render every field of `state` in schema order; `prefix` locates nested forms.
    pub fn render_form(
        &self,
        schema: &FormSchema<E>,
        state: &FormState<E>,
        prefix: &FieldPath,
    ) -> Result<Vec<Ui>, FormError> {
        schema
            .iter()
            .map(|(key, input)| {
                let field = state
                    .get(key)
                    .ok_or_else(|| FormError::MissingField(key.clone()))?;
                self.render_field(&FieldView::new(prefix.child_key(key.as_str()), input, field)?)
            })
            .collect()
    }
}
