use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ListShape;

/// A list-shaped operation result.
///
/// `Bare` holds the entities themselves; `Envelope` holds the upstream object (or a synthesized
/// `{key: [...]}` wrapper) with its metadata intact.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Bare(Vec<Value>),
    Envelope(Map<String, Value>),
}

impl Listing {
    /// Reshapes an upstream response according to `shape`.
    ///
    /// A bare upstream array is used as-is by [`ListShape::Bare`] and wrapped as `{key: array}`
    /// by [`ListShape::Envelope`]. Anything that is neither an array nor an object yields the
    /// empty result for the shape.
    #[must_use]
    pub fn from_response(shape: ListShape, key: &str, response: Value) -> Self {
        match (shape, response) {
            (ListShape::Bare, Value::Array(items)) => Listing::Bare(items),
            (ListShape::Bare, Value::Object(mut object)) => match object.remove(key) {
                Some(Value::Array(items)) => Listing::Bare(items),
                _ => Listing::Bare(Vec::new()),
            },
            (ListShape::Envelope, Value::Object(object)) => Listing::Envelope(object),
            (ListShape::Envelope, Value::Array(items)) => {
                Listing::Envelope(Map::from_iter([(key.to_owned(), Value::Array(items))]))
            }
            (shape, _) => Listing::empty(shape, key),
        }
    }

    /// `[]` for bare results, `{key: []}` for envelopes.
    #[must_use]
    pub fn empty(shape: ListShape, key: &str) -> Self {
        match shape {
            ListShape::Bare => Listing::Bare(Vec::new()),
            ListShape::Envelope => {
                Listing::Envelope(Map::from_iter([(key.to_owned(), Value::Array(Vec::new()))]))
            }
        }
    }

    /// The entities under `key`, or none when the envelope does not carry a list there.
    #[must_use]
    pub fn entities(&self, key: &str) -> &[Value] {
        match self {
            Listing::Bare(items) => items,
            Listing::Envelope(object) => object
                .get(key)
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Listing::Bare(items) => Value::Array(items),
            Listing::Envelope(object) => Value::Object(object),
        }
    }
}

impl From<Listing> for Value {
    fn from(listing: Listing) -> Self {
        listing.into_value()
    }
}
