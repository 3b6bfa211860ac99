//! The leaf form item: a single editable field.

use serde::{Deserialize, Serialize};

use crate::occurrences::Occurrences;

/// A leaf input field bound to a named property array.
///
/// The `input_type` is a free-form discriminator (`"TextLine"`,
/// `"TextArea"`, `"Long"`, ...) interpreted by the rendering layer; the
/// engine itself only cares about the value cardinality and the default.
///
/// # Examples
///
/// ```
/// use formwork::schema::Input;
/// use formwork::Occurrences;
///
/// let input = Input::builder("title")
///     .label("Title")
///     .input_type("TextLine")
///     .occurrences(Occurrences::required_one())
///     .build();
/// assert!(input.occurrences().required());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Input {
    name: String,
    #[serde(default)]
    label: String,
    input_type: String,
    #[serde(default)]
    occurrences: Occurrences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    help_text: Option<String>,
}

impl Input {
    /// Starts building an input with the given name.
    pub fn builder(name: impl Into<String>) -> InputBuilder {
        InputBuilder {
            name: name.into(),
            label: None,
            input_type: "TextLine".to_string(),
            occurrences: Occurrences::default(),
            default_value: None,
            help_text: None,
        }
    }

    /// The input's name, unique among its data-level siblings.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The rendering-layer type discriminator.
    pub fn input_type(&self) -> &str {
        &self.input_type
    }

    /// The value cardinality.
    pub fn occurrences(&self) -> &Occurrences {
        &self.occurrences
    }

    /// The default value applied to fresh data, if any.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// The help text, if any.
    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }
}

/// Builder for [`Input`].
#[derive(Debug, Clone)]
pub struct InputBuilder {
    name: String,
    label: Option<String>,
    input_type: String,
    occurrences: Occurrences,
    default_value: Option<String>,
    help_text: Option<String>,
}

impl InputBuilder {
    /// Sets the label. Defaults to the name.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the rendering-layer type discriminator. Defaults to `TextLine`.
    pub fn input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = input_type.into();
        self
    }

    /// Sets the value cardinality. Defaults to optional-single.
    pub fn occurrences(mut self, occurrences: Occurrences) -> Self {
        self.occurrences = occurrences;
        self
    }

    /// Sets the default value applied to fresh data.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets the help text.
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Finalizes the input.
    pub fn build(self) -> Input {
        Input {
            label: self.label.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            input_type: self.input_type,
            occurrences: self.occurrences,
            default_value: self.default_value,
            help_text: self.help_text,
        }
    }
}
