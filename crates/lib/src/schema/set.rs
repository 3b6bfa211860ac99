//! Repeatable sets of nested form items.

use serde::{Deserialize, Serialize};

use crate::occurrences::Occurrences;

use super::item::FormItem;

/// A repeatable group of nested form items, bound to a named array of
/// nested property sets.
///
/// Each repetition (occurrence) of the set owns one nested property set;
/// the nested items are laid out against it by a nested composition layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormItemSet {
    name: String,
    #[serde(default)]
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    help_text: Option<String>,
    #[serde(default)]
    occurrences: Occurrences,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    items: Vec<FormItem>,
}

impl FormItemSet {
    /// Starts building a set with the given name.
    pub fn builder(name: impl Into<String>) -> FormItemSetBuilder {
        FormItemSetBuilder {
            name: name.into(),
            label: None,
            help_text: None,
            occurrences: Occurrences::default(),
            items: Vec::new(),
        }
    }

    /// The set's name, unique among its data-level siblings.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The help text, if any.
    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    /// How many repetitions of this set may exist.
    pub fn occurrences(&self) -> &Occurrences {
        &self.occurrences
    }

    /// The nested schema items, in layout order.
    pub fn items(&self) -> &[FormItem] {
        &self.items
    }
}

/// Builder for [`FormItemSet`].
#[derive(Debug, Clone)]
pub struct FormItemSetBuilder {
    name: String,
    label: Option<String>,
    help_text: Option<String>,
    occurrences: Occurrences,
    items: Vec<FormItem>,
}

impl FormItemSetBuilder {
    /// Sets the label. Defaults to the name.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the help text.
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Sets the repetition cardinality. Defaults to optional-single.
    pub fn occurrences(mut self, occurrences: Occurrences) -> Self {
        self.occurrences = occurrences;
        self
    }

    /// Appends a nested item.
    pub fn item(mut self, item: impl Into<FormItem>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Replaces the nested items.
    pub fn items(mut self, items: Vec<FormItem>) -> Self {
        self.items = items;
        self
    }

    /// Finalizes the set.
    pub fn build(self) -> FormItemSet {
        FormItemSet {
            label: self.label.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            help_text: self.help_text,
            occurrences: self.occurrences,
            items: self.items,
        }
    }
}
