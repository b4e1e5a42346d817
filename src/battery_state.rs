use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::DecodeError;
use crate::message::SectionFields;
use crate::value::Value;

#[cfg(feature = "serde")]
mod util {
    use serde::{ser::SerializeMap, Serializer};
    use std::collections::BTreeMap;

    use crate::error::DecodeError;

    pub fn errors_as_strings<S>(errors: &BTreeMap<String, DecodeError>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = s.serialize_map(Some(errors.len()))?;
        for (field, err) in errors {
            map.serialize_entry(field, &err.to_string())?;
        }
        map.end()
    }
}

/// The reported state of the battery, accumulated section by section.
///
/// Fields are keyed by their register-map name (`voltage`, `cell_voltage_0`,
/// `charge_MOSFET`, ...). Once written a field is only ever overwritten by a
/// newer reading of the same section, never removed.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BatteryState {
    #[cfg_attr(feature = "serde", serde(flatten))]
    fields: BTreeMap<String, Value>,
    /// Fields whose raw bytes could not be interpreted, e.g. a malformed version.
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "BTreeMap::is_empty", serialize_with = "util::errors_as_strings")
    )]
    field_errors: BTreeMap<String, DecodeError>,
}

impl BatteryState {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_int(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_int)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_errors(&self) -> impl Iterator<Item = (&str, &DecodeError)> {
        self.field_errors.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn field_error(&self, field: &str) -> Option<&DecodeError> {
        self.field_errors.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Merge the output of one section. A field decoded successfully clears
    /// any error recorded against it by an earlier frame.
    pub(crate) fn merge(&mut self, section: SectionFields) {
        let (values, errors) = section.into_parts();
        for (field, value) in values {
            self.field_errors.remove(&field);
            self.fields.insert(field, value);
        }
        for (field, err) in errors {
            self.field_errors.insert(field, err);
        }
    }
}
