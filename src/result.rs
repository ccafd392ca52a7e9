//! The two-variant outcome carried through every validation step
//!
//! A failure keeps the value that failed next to its error token, so callers can
//! keep assembling a best-effort document even while some fields are invalid.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Outcome of running validators over a value.
#[derive(Clone, Debug, PartialEq)]
pub enum Validation<T, E = String> {
    /// The value passed, possibly after coercion.
    Valid(T),

    /// The value failed; `fallback` is what should be displayed instead.
    Invalid { error: E, fallback: T },
}

impl<T, E> Validation<T, E> {
    pub fn valid(value: T) -> Self {
        Validation::Valid(value)
    }

    pub fn invalid(error: E, fallback: T) -> Self {
        Validation::Invalid { error, fallback }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Validation::Invalid { .. })
    }

    /// The valid value, or the fallback of a failure.
    pub fn value(&self) -> &T {
        match self {
            Validation::Valid(value) => value,
            Validation::Invalid { fallback, .. } => fallback,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Validation::Valid(value) => value,
            Validation::Invalid { fallback, .. } => fallback,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Validation::Valid(_) => None,
            Validation::Invalid { error, .. } => Some(error),
        }
    }

    /// Maps the carried value of either variant.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validation<U, E> {
        match self {
            Validation::Valid(value) => Validation::Valid(f(value)),
            Validation::Invalid { error, fallback } => Validation::Invalid {
                error,
                fallback: f(fallback),
            },
        }
    }

    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> Validation<T, F> {
        match self {
            Validation::Valid(value) => Validation::Valid(value),
            Validation::Invalid { error, fallback } => Validation::Invalid {
                error: f(error),
                fallback,
            },
        }
    }

    /// Chains another step over a valid value; failures pass through untouched.
    pub fn and_then(self, f: impl FnOnce(T) -> Validation<T, E>) -> Validation<T, E> {
        match self {
            Validation::Valid(value) => f(value),
            invalid => invalid,
        }
    }

    pub fn as_ref(&self) -> Validation<&T, &E> {
        match self {
            Validation::Valid(value) => Validation::Valid(value),
            Validation::Invalid { error, fallback } => Validation::Invalid { error, fallback },
        }
    }

    pub fn into_result(self) -> Result<T, (E, T)> {
        match self {
            Validation::Valid(value) => Ok(value),
            Validation::Invalid { error, fallback } => Err((error, fallback)),
        }
    }
}

// Wire shape: {"type":"Ok","value":..} / {"type":"Err","value":<error>,"obj":<fallback>}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ReprRef<'a, T, E> {
    Ok { value: &'a T },
    Err { value: &'a E, obj: &'a T },
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Repr<T, E> {
    Ok { value: T },
    Err { value: E, obj: T },
}

impl<T: Serialize, E: Serialize> Serialize for Validation<T, E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr: ReprRef<'_, T, E> = match self {
            Validation::Valid(value) => ReprRef::Ok { value },
            Validation::Invalid { error, fallback } => ReprRef::Err {
                value: error,
                obj: fallback,
            },
        };
        repr.serialize(serializer)
    }
}

impl<'de, T, E> Deserialize<'de> for Validation<T, E>
where
    T: Deserialize<'de>,
    E: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Repr::<T, E>::deserialize(deserializer)? {
            Repr::Ok { value } => Validation::Valid(value),
            Repr::Err { value, obj } => Validation::Invalid {
                error: value,
                fallback: obj,
            },
        })
    }
}
