//! Field sets: purely visual grouping of sibling items.

use serde::{Deserialize, Serialize};

use super::item::FormItem;

/// A non-repeating visual grouping of form items.
///
/// A field set contributes no data path level: its children are laid out
/// against the same property set as the field set's own parent, and their
/// names share the parent's namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldSet {
    name: String,
    #[serde(default)]
    label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    items: Vec<FormItem>,
}

impl FieldSet {
    /// Starts building a field set with the given name.
    pub fn builder(name: impl Into<String>) -> FieldSetBuilder {
        FieldSetBuilder {
            name: name.into(),
            label: None,
            items: Vec::new(),
        }
    }

    /// The field set's name (layout-only, not a data name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The grouped items, in layout order.
    pub fn items(&self) -> &[FormItem] {
        &self.items
    }
}

/// Builder for [`FieldSet`].
#[derive(Debug, Clone)]
pub struct FieldSetBuilder {
    name: String,
    label: Option<String>,
    items: Vec<FormItem>,
}

impl FieldSetBuilder {
    /// Sets the label. Defaults to the name.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Appends a grouped item.
    pub fn item(mut self, item: impl Into<FormItem>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Finalizes the field set.
    pub fn build(self) -> FieldSet {
        FieldSet {
            label: self.label.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            items: self.items,
        }
    }
}
