//! Serde helpers for flexible deserialization of tool arguments.

use std::any::type_name;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::Result;
use crate::error::Error;

/// A `serde_as` type that deserializes strings or numbers as `String`.
///
/// Identifiers arrive from assistants as either `"123"` or `123`; both map to the same string.
/// Use with `#[serde_as(as = "StringFromAny")]` for `String` fields
/// or `#[serde_as(as = "Option<StringFromAny>")]` for `Option<String>`.
pub struct StringFromAny;

impl<'de> serde_with::DeserializeAs<'de, String> for StringFromAny {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use std::fmt;

        use serde::de::{self, Visitor};

        struct StringOrNumberVisitor;

        impl Visitor<'_> for StringOrNumberVisitor {
            type Value = String;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("string or number")
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(v.to_owned())
            }

            fn visit_string<E>(self, v: String) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(v)
            }

            fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(v.to_string())
            }

            fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(v.to_string())
            }

            // Rendered the way JSON writes it, so `1.0` stays `1.0` rather than `1`.
            fn visit_f64<E>(self, v: f64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(serde_json::Number::from_f64(v)
                    .map_or_else(|| v.to_string(), |n| n.to_string()))
            }
        }

        deserializer.deserialize_any(StringOrNumberVisitor)
    }
}

impl serde_with::SerializeAs<String> for StringFromAny {
    fn serialize_as<S>(source: &String, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(source)
    }
}

/// Deserializes tool arguments into a typed request.
///
/// `null` is treated as an empty argument object. Unknown arguments are logged and ignored.
/// Failures become [`crate::error::Kind::Validation`] errors naming the offending argument.
pub(crate) fn deserialize_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    let arguments = if arguments.is_null() {
        Value::Object(Map::new())
    } else {
        arguments
    };

    let mut unknown_paths: Vec<String> = Vec::new();
    let mut track = |path: serde_ignored::Path<'_>| unknown_paths.push(path.to_string());
    let deserializer = serde_ignored::Deserializer::new(arguments, &mut track);

    let result: T = serde_path_to_error::deserialize(deserializer).map_err(|e| {
        let path = e.path().to_string();
        let inner = e.into_inner();

        tracing::debug!(
            type_name = %type_name::<T>(),
            path = %path,
            error = %inner,
            "argument deserialization failed"
        );

        if path == "." {
            Error::validation(format!("invalid arguments: {inner}"))
        } else {
            Error::validation(format!("invalid argument `{path}`: {inner}"))
        }
    })?;

    for path in unknown_paths {
        tracing::warn!(
            type_name = %type_name::<T>(),
            field = %path,
            "ignoring unknown argument"
        );
    }

    Ok(result)
}
