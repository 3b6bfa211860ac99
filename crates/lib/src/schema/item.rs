//! The form item sum type.
//!
//! Every node of a form schema is one of four kinds. The engine dispatches
//! on the kind exactly once per layout pass, by exhaustive match — there is
//! no "unsupported item" fallback anywhere downstream of construction,
//! because construction refuses unknown kinds outright.

use serde::{Deserialize, Serialize};

use super::{
    errors::SchemaError, field_set::FieldSet, input::Input, option_set::FormOptionSet,
    set::FormItemSet,
};

/// A node in the form schema tree.
///
/// Serializes as the tagged wrapper shape of the persisted schema format:
/// `{"Input": {...}}`, `{"FormItemSet": {...}}`, `{"FormOptionSet": {...}}`
/// or `{"FieldSet": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FormItem {
    Input(Input),
    FormItemSet(FormItemSet),
    FormOptionSet(FormOptionSet),
    FieldSet(FieldSet),
}

impl FormItem {
    /// The node's name.
    pub fn name(&self) -> &str {
        match self {
            FormItem::Input(input) => input.name(),
            FormItem::FormItemSet(set) => set.name(),
            FormItem::FormOptionSet(set) => set.name(),
            FormItem::FieldSet(field_set) => field_set.name(),
        }
    }

    /// The node's label.
    pub fn label(&self) -> &str {
        match self {
            FormItem::Input(input) => input.label(),
            FormItem::FormItemSet(set) => set.label(),
            FormItem::FormOptionSet(set) => set.label(),
            FormItem::FieldSet(field_set) => field_set.label(),
        }
    }

    /// Whether the node is a purely visual grouping that contributes no data
    /// path level.
    pub fn is_layout(&self) -> bool {
        matches!(self, FormItem::FieldSet(_))
    }

    /// The wrapper tag used in the serialized form.
    pub fn kind(&self) -> &'static str {
        match self {
            FormItem::Input(_) => "Input",
            FormItem::FormItemSet(_) => "FormItemSet",
            FormItem::FormOptionSet(_) => "FormOptionSet",
            FormItem::FieldSet(_) => "FieldSet",
        }
    }

    /// Builds a form item from its tagged-wrapper JSON form.
    ///
    /// # Errors
    /// [`SchemaError::UnknownItemType`] when the wrapper names a kind this
    /// engine does not implement; [`SchemaError::Malformed`] when the shape
    /// is not a single-key object or the body does not deserialize.
    pub fn from_value(value: &serde_json::Value) -> Result<FormItem, SchemaError> {
        Self::from_value_at(value, "")
    }

    pub(super) fn from_value_at(
        value: &serde_json::Value,
        path: &str,
    ) -> Result<FormItem, SchemaError> {
        let object = value.as_object().ok_or_else(|| SchemaError::Malformed {
            reason: format!("form item at '{path}' is not an object"),
        })?;
        if object.len() != 1 {
            return Err(SchemaError::Malformed {
                reason: format!(
                    "form item at '{path}' must be a single-key tagged wrapper, found {} keys",
                    object.len()
                ),
            });
        }
        let (kind, body) = object.iter().next().expect("single key checked above");
        let deserialize = |reason: serde_json::Error| SchemaError::Malformed {
            reason: format!("{kind} at '{path}': {reason}"),
        };
        match kind.as_str() {
            "Input" => Ok(FormItem::Input(
                serde_json::from_value(body.clone()).map_err(deserialize)?,
            )),
            "FormItemSet" => Ok(FormItem::FormItemSet(
                serde_json::from_value(body.clone()).map_err(deserialize)?,
            )),
            "FormOptionSet" => Ok(FormItem::FormOptionSet(
                serde_json::from_value(body.clone()).map_err(deserialize)?,
            )),
            "FieldSet" => Ok(FormItem::FieldSet(
                serde_json::from_value(body.clone()).map_err(deserialize)?,
            )),
            other => Err(SchemaError::UnknownItemType {
                kind: other.to_string(),
                path: path.to_string(),
            }),
        }
    }

    /// The tagged-wrapper JSON form of this item.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("schema items serialize infallibly")
    }
}

impl<'de> Deserialize<'de> for FormItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        FormItem::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl From<Input> for FormItem {
    fn from(input: Input) -> Self {
        FormItem::Input(input)
    }
}

impl From<FormItemSet> for FormItem {
    fn from(set: FormItemSet) -> Self {
        FormItem::FormItemSet(set)
    }
}

impl From<FormOptionSet> for FormItem {
    fn from(set: FormOptionSet) -> Self {
        FormItem::FormOptionSet(set)
    }
}

impl From<FieldSet> for FormItem {
    fn from(field_set: FieldSet) -> Self {
        FormItem::FieldSet(field_set)
    }
}
