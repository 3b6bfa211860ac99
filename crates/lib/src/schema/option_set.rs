//! Option sets: repeatable groups where nested content is gated by
//! selectable options.

use serde::{Deserialize, Serialize};

use crate::occurrences::Occurrences;

use super::item::FormItem;

/// A repeatable set whose nested items are grouped under selectable options.
///
/// The `multiselection` policy governs how many options may be active at
/// once within one occurrence: `{1, 1}` gives exclusive (radio) semantics,
/// anything else gives checkbox semantics bounded by the policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormOptionSet {
    name: String,
    #[serde(default)]
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    help_text: Option<String>,
    #[serde(default)]
    occurrences: Occurrences,
    #[serde(default)]
    multiselection: Occurrences,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    options: Vec<FormOptionSetOption>,
}

impl FormOptionSet {
    /// Starts building an option set with the given name.
    pub fn builder(name: impl Into<String>) -> FormOptionSetBuilder {
        FormOptionSetBuilder {
            name: name.into(),
            label: None,
            help_text: None,
            occurrences: Occurrences::default(),
            multiselection: Occurrences::default(),
            options: Vec::new(),
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

    /// How many options may be simultaneously active in one occurrence.
    pub fn multiselection(&self) -> &Occurrences {
        &self.multiselection
    }

    /// The options, in declaration order.
    pub fn options(&self) -> &[FormOptionSetOption] {
        &self.options
    }

    /// Whether at most one option may be active (radio semantics).
    pub fn exclusive(&self) -> bool {
        self.multiselection.minimum() == 1 && self.multiselection.maximum() == 1
    }
}

/// Builder for [`FormOptionSet`].
#[derive(Debug, Clone)]
pub struct FormOptionSetBuilder {
    name: String,
    label: Option<String>,
    help_text: Option<String>,
    occurrences: Occurrences,
    multiselection: Occurrences,
    options: Vec<FormOptionSetOption>,
}

impl FormOptionSetBuilder {
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

    /// Sets the selection cardinality. Defaults to optional-single.
    pub fn multiselection(mut self, multiselection: Occurrences) -> Self {
        self.multiselection = multiselection;
        self
    }

    /// Appends an option.
    pub fn option(mut self, option: FormOptionSetOption) -> Self {
        self.options.push(option);
        self
    }

    /// Finalizes the option set.
    pub fn build(self) -> FormOptionSet {
        FormOptionSet {
            label: self.label.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            help_text: self.help_text,
            occurrences: self.occurrences,
            multiselection: self.multiselection,
            options: self.options,
        }
    }
}

/// One selectable option within a [`FormOptionSet`], owning its own nested
/// schema items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormOptionSetOption {
    name: String,
    #[serde(default)]
    label: String,
    #[serde(rename = "default", default, skip_serializing_if = "std::ops::Not::not")]
    default_option: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    items: Vec<FormItem>,
}

impl FormOptionSetOption {
    /// Starts building an option with the given name.
    pub fn builder(name: impl Into<String>) -> FormOptionSetOptionBuilder {
        FormOptionSetOptionBuilder {
            name: name.into(),
            label: None,
            default_option: false,
            help_text: None,
            items: Vec::new(),
        }
    }

    /// The option's name, unique among its sibling options.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the option is active by default in fresh data.
    pub fn default_option(&self) -> bool {
        self.default_option
    }

    /// The help text, if any.
    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    /// The option's nested schema items.
    pub fn items(&self) -> &[FormItem] {
        &self.items
    }
}

/// Builder for [`FormOptionSetOption`].
#[derive(Debug, Clone)]
pub struct FormOptionSetOptionBuilder {
    name: String,
    label: Option<String>,
    default_option: bool,
    help_text: Option<String>,
    items: Vec<FormItem>,
}

impl FormOptionSetOptionBuilder {
    /// Sets the label. Defaults to the name.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Marks the option as active by default in fresh data.
    pub fn default_option(mut self, default: bool) -> Self {
        self.default_option = default;
        self
    }

    /// Sets the help text.
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Appends a nested item.
    pub fn item(mut self, item: impl Into<FormItem>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Finalizes the option.
    pub fn build(self) -> FormOptionSetOption {
        FormOptionSetOption {
            label: self.label.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            default_option: self.default_option,
            help_text: self.help_text,
            items: self.items,
        }
    }
}
