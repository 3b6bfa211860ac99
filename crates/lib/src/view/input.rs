//! The leaf view: one input bound to a named property array.

use crate::{
    Result,
    proptree::{PropertyPath, PropertySetHandle, Value},
    schema::Input,
    validation::{ValidationRecording, ValidationRecordingPath},
};

use super::{
    errors::ViewError,
    events::{FormContext, FormEvent},
};

/// A leaf input view.
///
/// The view binds to the property array named after its schema input inside
/// the parent's data set. Field-level validity is derived from the array's
/// live contents on every validation pass: the number of non-blank values is
/// checked against the input's cardinality, and numeric input types reject
/// unparseable strings with a field error.
#[derive(Debug)]
pub struct InputView {
    input: Input,
    ctx: FormContext,
    data: Option<PropertySetHandle>,
    next_focus: Option<String>,
    previous: Option<ValidationRecording>,
    laid_out: bool,
    hide_errors: bool,
    display_errors: bool,
}

impl InputView {
    /// Creates an unlaid view for the given schema input.
    pub fn new(input: Input, ctx: FormContext) -> Self {
        Self {
            input,
            ctx,
            data: None,
            next_focus: None,
            previous: None,
            laid_out: false,
            hide_errors: false,
            display_errors: true,
        }
    }

    /// The schema input this view renders.
    pub fn input(&self) -> &Input {
        &self.input
    }

    /// The input's name.
    pub fn name(&self) -> &str {
        self.input.name()
    }

    /// Whether layout has completed.
    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    /// Whether the view currently hides its own validation errors.
    pub fn hides_errors(&self) -> bool {
        self.hide_errors
    }

    pub(super) fn set_hide_errors(&mut self, hide: bool) {
        self.hide_errors = hide;
    }

    pub(super) fn clear_hide_errors(&mut self) {
        self.hide_errors = false;
    }

    /// Whether validation errors should be rendered inline.
    pub fn displays_errors(&self) -> bool {
        self.display_errors
    }

    pub(super) fn set_display_errors(&mut self, display: bool) {
        self.display_errors = display;
    }

    /// The name of the input that receives focus after this one, if any.
    pub fn next_focus(&self) -> Option<&str> {
        self.next_focus.as_deref()
    }

    pub(super) fn set_next_focus(&mut self, name: Option<String>) {
        self.next_focus = name;
    }

    /// Requests focus for the next input in the chain. Returns whether a
    /// next input exists.
    pub fn focus_next(&self, parent_path: &PropertyPath) -> bool {
        match &self.next_focus {
            Some(next) => {
                self.ctx.bus().emit(FormEvent::FocusRequested {
                    path: parent_path.join(next),
                });
                true
            }
            None => false,
        }
    }

    fn bound_data(&self) -> Result<&PropertySetHandle> {
        if !self.laid_out {
            return Err(ViewError::not_laid_out(self.name()).into());
        }
        self.data
            .as_ref()
            .ok_or_else(|| ViewError::not_laid_out(self.name()).into())
    }

    /// Binds the view to `data` and applies the default value to an empty
    /// array.
    pub async fn layout(
        &mut self,
        data: PropertySetHandle,
        parent_path: &PropertyPath,
        validate: bool,
    ) -> Result<()> {
        if self.laid_out {
            return Err(ViewError::AlreadyLaidOut {
                view: self.name().to_string(),
            }
            .into());
        }
        let empty = data.borrow().array_len(self.input.name()) == 0;
        if empty && let Some(default) = self.input.default_value() {
            data.borrow_mut().set_string(self.input.name(), default);
        }
        self.data = Some(data);
        self.laid_out = true;
        if validate {
            let recording = self.compute_recording(parent_path)?;
            self.previous = Some(recording);
        }
        Ok(())
    }

    /// Rebinds the view to `data`.
    ///
    /// With `unchanged_only`, a view whose current values differ from the
    /// incoming data keeps its binding — the user's in-progress edit wins.
    pub async fn update(
        &mut self,
        data: PropertySetHandle,
        _parent_path: &PropertyPath,
        unchanged_only: bool,
    ) -> Result<()> {
        let current = self.bound_data()?;
        let unchanged = {
            let old = current.borrow();
            let new = data.borrow();
            old.array(self.input.name()).map(|a| a.values().to_vec())
                == new.array(self.input.name()).map(|a| a.values().to_vec())
        };
        if !unchanged_only || unchanged {
            self.data = Some(data);
        }
        Ok(())
    }

    /// The value at `index` of the bound array.
    pub fn value(&self, index: usize) -> Result<Option<Value>> {
        Ok(self.bound_data()?.borrow().value(self.input.name(), index))
    }

    /// All current values of the bound array.
    pub fn values(&self) -> Result<Vec<Value>> {
        Ok(self
            .bound_data()?
            .borrow()
            .array(self.input.name())
            .map(|a| a.values().to_vec())
            .unwrap_or_default())
    }

    /// Sets the value at `index`, growing the array with blanks up to it.
    pub fn set_value(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        let data = self.bound_data()?.clone();
        let mut borrowed = data.borrow_mut();
        let name = self.input.name();
        while borrowed.array_len(name) <= index {
            borrowed.add_value(name, "");
        }
        borrowed.set_value(name, index, value);
        Ok(())
    }

    /// Restores the default value and clears the validation baseline.
    pub fn reset(&mut self) {
        if let Some(data) = &self.data {
            let mut borrowed = data.borrow_mut();
            borrowed.remove_array(self.input.name());
            if let Some(default) = self.input.default_value() {
                borrowed.set_string(self.input.name(), default);
            }
        }
        self.previous = None;
        self.hide_errors = false;
    }

    fn compute_recording(&self, parent_path: &PropertyPath) -> Result<ValidationRecording> {
        let data = self.bound_data()?;
        let borrowed = data.borrow();
        let name = self.input.name();
        let occurrences = self.input.occurrences();

        let mut recording = ValidationRecording::new();
        let parent = (!parent_path.is_root()).then(|| parent_path.clone());
        let vpath = ValidationRecordingPath::with_occurrences(
            parent.clone(),
            name,
            occurrences.minimum(),
            occurrences.maximum(),
        );

        let filled = borrowed.filled_count(name);
        if occurrences.minimum_breached(filled) {
            recording.breaks_minimum_occurrences(vpath.clone());
        }
        let total = borrowed.array_len(name);
        if occurrences.maximum_breached(total) {
            recording.breaks_maximum_occurrences(vpath);
        }

        // Numeric input types reject unparseable strings.
        let numeric = matches!(self.input.input_type(), "Long" | "Double");
        if numeric && let Some(array) = borrowed.array(name) {
            for (index, value) in array.values().iter().enumerate() {
                let Some(text) = value.as_string() else {
                    continue;
                };
                if text.is_empty() {
                    continue;
                }
                let parses = match self.input.input_type() {
                    "Long" => text.parse::<i64>().is_ok(),
                    _ => text.parse::<f64>().is_ok(),
                };
                if !parses {
                    let error_path =
                        ValidationRecordingPath::new_indexed(parent.clone(), name, index);
                    recording.add_error(
                        &error_path,
                        format!("Invalid {} value: '{text}'", self.input.input_type()),
                    );
                }
            }
        }
        Ok(recording)
    }

    /// Computes the view's recording, notifying on change unless `silent`.
    pub fn validate(
        &mut self,
        parent_path: &PropertyPath,
        silent: bool,
    ) -> Result<ValidationRecording> {
        let recording = self.compute_recording(parent_path)?;
        if !silent && recording.validity_changed(self.previous.as_ref()) {
            self.ctx.bus().emit(FormEvent::ValidityChanged {
                path: parent_path.join(self.input.name()),
                recording: recording.clone(),
                include_children: false,
            });
        }
        self.previous = Some(recording.clone());
        Ok(recording)
    }

    pub(super) fn dispose(&mut self) {
        self.laid_out = false;
        self.data = None;
    }
}
