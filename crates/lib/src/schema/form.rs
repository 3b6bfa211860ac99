//! The form root: an ordered list of top-level items, validated on
//! construction.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{errors::SchemaError, item::FormItem};

/// A complete, validated form schema.
///
/// Construction is the only gate: a `Form` that exists is structurally
/// sound. Validation checks, recursively:
///
/// - no empty names,
/// - data-level sibling names are unique, with field-set children hoisted
///   into their parent's namespace (a field set adds no data level),
/// - option names are unique within their option set.
///
/// The schema tree is immutable for the lifetime of a rendering session.
///
/// # Examples
///
/// ```
/// use formwork::schema::{Form, Input};
///
/// let form = Form::new(vec![Input::builder("title").build().into()])?;
/// let json = form.to_json();
/// let back = Form::from_value(&json)?;
/// assert_eq!(form, back);
/// # Ok::<(), formwork::schema::SchemaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawForm")]
pub struct Form {
    items: Vec<FormItem>,
}

/// Unvalidated wire form of [`Form`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawForm {
    #[serde(default)]
    items: Vec<FormItem>,
}

impl TryFrom<RawForm> for Form {
    type Error = SchemaError;

    fn try_from(raw: RawForm) -> Result<Self, Self::Error> {
        Form::new(raw.items)
    }
}

impl Form {
    /// Creates a form from its top-level items, validating the whole tree.
    pub fn new(items: Vec<FormItem>) -> Result<Self, SchemaError> {
        validate_level(&items, "")?;
        Ok(Self { items })
    }

    /// Parses and validates a form from its JSON string form.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| SchemaError::Malformed {
                reason: e.to_string(),
            })?;
        Self::from_value(&value)
    }

    /// Parses and validates a form from a JSON value.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, SchemaError> {
        let object = value.as_object().ok_or_else(|| SchemaError::Malformed {
            reason: "form definition is not an object".to_string(),
        })?;
        let raw_items = match object.get("items") {
            Some(serde_json::Value::Array(items)) => items.as_slice(),
            Some(_) => {
                return Err(SchemaError::Malformed {
                    reason: "'items' is not an array".to_string(),
                });
            }
            None => &[],
        };
        let items = raw_items
            .iter()
            .map(|item| FormItem::from_value_at(item, ""))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(items)
    }

    /// The top-level items, in layout order.
    pub fn items(&self) -> &[FormItem] {
        &self.items
    }

    /// The top-level item with the given name, if any.
    pub fn item(&self, name: &str) -> Option<&FormItem> {
        self.items.iter().find(|item| item.name() == name)
    }

    /// The JSON form: `{"items": [<tagged wrappers>]}`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("schema serializes infallibly")
    }

    /// The JSON string form.
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

/// Validates one data level: unique names with field-set hoisting, then
/// recursion into every nested level.
fn validate_level(items: &[FormItem], path: &str) -> Result<(), SchemaError> {
    let mut data_names = HashSet::new();
    let mut layout_names = HashSet::new();
    collect_level(items, path, &mut data_names, &mut layout_names)
}

fn collect_level<'a>(
    items: &'a [FormItem],
    path: &str,
    data_names: &mut HashSet<&'a str>,
    layout_names: &mut HashSet<&'a str>,
) -> Result<(), SchemaError> {
    for item in items {
        if item.name().is_empty() {
            return Err(SchemaError::EmptyName {
                path: path.to_string(),
            });
        }
        let child_path = if path.is_empty() {
            item.name().to_string()
        } else {
            format!("{path}.{}", item.name())
        };
        match item {
            FormItem::FieldSet(field_set) => {
                if !layout_names.insert(field_set.name()) {
                    return Err(SchemaError::DuplicateName {
                        name: field_set.name().to_string(),
                        path: path.to_string(),
                    });
                }
                // Field sets hoist their children into the parent namespace.
                collect_level(field_set.items(), path, data_names, layout_names)?;
            }
            FormItem::Input(input) => {
                insert_data_name(data_names, input.name(), path)?;
            }
            FormItem::FormItemSet(set) => {
                insert_data_name(data_names, set.name(), path)?;
                validate_level(set.items(), &child_path)?;
            }
            FormItem::FormOptionSet(option_set) => {
                insert_data_name(data_names, option_set.name(), path)?;
                let mut option_names = HashSet::new();
                for option in option_set.options() {
                    if option.name().is_empty() {
                        return Err(SchemaError::EmptyName {
                            path: child_path.clone(),
                        });
                    }
                    if !option_names.insert(option.name()) {
                        return Err(SchemaError::DuplicateName {
                            name: option.name().to_string(),
                            path: child_path.clone(),
                        });
                    }
                    let option_path = format!("{child_path}.{}", option.name());
                    validate_level(option.items(), &option_path)?;
                }
            }
        }
    }
    Ok(())
}

fn insert_data_name<'a>(
    data_names: &mut HashSet<&'a str>,
    name: &'a str,
    path: &str,
) -> Result<(), SchemaError> {
    if !data_names.insert(name) {
        return Err(SchemaError::DuplicateName {
            name: name.to_string(),
            path: path.to_string(),
        });
    }
    Ok(())
}
