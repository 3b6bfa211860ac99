//! The form facade: the engine's top-level entry point.

use std::{rc::Rc, sync::Arc};

use tokio::sync::mpsc;

use crate::{
    Result,
    proptree::{PropertyPath, PropertySetHandle},
    schema::Form,
    validation::ValidationRecording,
};

use super::{
    errors::ViewError,
    events::{EventBus, FormContext, FormEvent, ValidityHook, ValidityHookCollection},
    item::FormItemView,
    layer::FormItemLayer,
};

/// Configuration of a form view.
#[derive(Debug, Clone, Copy)]
pub struct FormViewConfig {
    /// Whether an optional repeatable node with no data still shows one
    /// blank occurrence.
    pub show_empty_occurrences: bool,
}

impl Default for FormViewConfig {
    fn default() -> Self {
        Self {
            show_empty_occurrences: true,
        }
    }
}

/// The top-level view of a form, the final authority for its validity.
///
/// Owns the root composition layer, the form's event channel, and the
/// registered validity hooks. Ordinary validation failures never surface as
/// errors — they are recorded facts; errors are reserved for programmer
/// misuse such as validating before layout completed.
///
/// Layout and update are exclusive-borrow operations: an update cannot race
/// a layout in flight, it queues behind it by construction.
pub struct FormView {
    form: Form,
    data: PropertySetHandle,
    layer: FormItemLayer,
    events: mpsc::UnboundedReceiver<FormEvent>,
    hooks: ValidityHookCollection,
    previous: Option<ValidationRecording>,
    display_errors: bool,
    laid_out: bool,
}

impl FormView {
    /// Creates an unlaid form view bound to `data`, with default
    /// configuration.
    pub fn new(form: Form, data: PropertySetHandle) -> Self {
        Self::with_config(form, data, FormViewConfig::default())
    }

    /// Creates an unlaid form view with explicit configuration.
    pub fn with_config(form: Form, data: PropertySetHandle, config: FormViewConfig) -> Self {
        let (bus, events) = EventBus::channel();
        let ctx = FormContext::new(bus, config.show_empty_occurrences);
        let layer = FormItemLayer::new(Rc::new(form.items().to_vec()), ctx);
        Self {
            form,
            data,
            layer,
            events,
            hooks: ValidityHookCollection::new(),
            previous: None,
            display_errors: true,
            laid_out: false,
        }
    }

    /// The schema this view renders.
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// The bound data root.
    pub fn data(&self) -> PropertySetHandle {
        self.data.clone()
    }

    /// Whether layout has completed.
    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    fn ensure_laid_out(&self) -> Result<()> {
        if !self.laid_out {
            return Err(ViewError::not_laid_out("form").into());
        }
        Ok(())
    }

    /// Walks the schema and creates the whole view tree against the bound
    /// data root.
    ///
    /// With `validate`, a silent validation pass runs once layout completes,
    /// establishing the baseline recordings at every level without
    /// notifying — the first explicit [`validate`](Self::validate) call is
    /// the one that notifies.
    pub async fn layout(&mut self, validate: bool) -> Result<()> {
        if self.laid_out {
            return Err(ViewError::AlreadyLaidOut {
                view: "form".to_string(),
            }
            .into());
        }
        let root = PropertyPath::root();
        self.layer
            .layout(self.data.clone(), &root, validate)
            .await?;
        self.laid_out = true;
        tracing::debug!(items = self.form.items().len(), "form laid out");
        self.layer_bus_emit(FormEvent::Rendered {
            path: PropertyPath::root(),
        });
        if validate {
            let recording = self.layer.validate(&root, true)?;
            self.previous = Some(recording);
        }
        Ok(())
    }

    /// Rebinds the whole view tree to a possibly different data root and
    /// reconciles every view in place.
    ///
    /// With `unchanged_only`, leaf views whose current values differ from
    /// the incoming data keep their binding.
    pub async fn update(&mut self, data: PropertySetHandle, unchanged_only: bool) -> Result<()> {
        self.ensure_laid_out()?;
        self.data = data.clone();
        self.layer
            .update(data, &PropertyPath::root(), unchanged_only)
            .await
    }

    /// Restores every input's default value and clears all validation
    /// baselines.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_laid_out()?;
        self.layer.reset();
        self.previous = None;
        Ok(())
    }

    /// Validates the whole tree bottom-up and returns the aggregate
    /// recording.
    ///
    /// An explicit validation pass un-hides the errors of freshly added
    /// occurrences. Unless `silent`, registered validity hooks fire when the
    /// aggregate recording changed since the previous pass; `force_notify`
    /// fires them regardless.
    ///
    /// # Errors
    /// [`ViewError::NotLaidOut`] when called before layout completed —
    /// downstream aggregation assumes the view tree is populated.
    pub fn validate(&mut self, silent: bool, force_notify: bool) -> Result<ValidationRecording> {
        self.ensure_laid_out()?;
        self.layer.clear_hide_errors();
        let root = PropertyPath::root();
        let recording = self.layer.validate(&root, silent)?;
        let changed = recording.validity_changed(self.previous.as_ref());
        if force_notify || (!silent && changed) {
            tracing::debug!(valid = recording.is_valid(), "form validity notified");
            self.hooks.execute(&recording);
            self.layer_bus_emit(FormEvent::ValidityChanged {
                path: root,
                recording: recording.clone(),
                include_children: true,
            });
        }
        self.previous = Some(recording.clone());
        Ok(recording)
    }

    fn layer_bus_emit(&self, event: FormEvent) {
        // The facade shares the views' channel so hosts can observe its
        // aggregate notifications in the same stream.
        self.layer_ctx().bus().emit(event);
    }

    fn layer_ctx(&self) -> &FormContext {
        self.layer.ctx()
    }

    /// Whether the last computed recording was valid. Meaningful after a
    /// validation pass; a never-validated form reports `false`.
    pub fn is_valid(&self) -> bool {
        self.previous
            .as_ref()
            .is_some_and(ValidationRecording::is_valid)
    }

    /// The recording produced by the last validation pass, if any.
    pub fn last_recording(&self) -> Option<&ValidationRecording> {
        self.previous.as_ref()
    }

    /// Sets whether validation errors are rendered inline, recursively.
    pub fn display_validation_errors(&mut self, display: bool) {
        self.display_errors = display;
        self.layer.set_display_errors(display);
    }

    /// Whether validation errors are rendered inline.
    pub fn displays_validation_errors(&self) -> bool {
        self.display_errors
    }

    /// Registers a hook fired when the form's aggregate validity changes.
    pub fn on_validity_changed(&mut self, hook: Arc<dyn ValidityHook>) {
        self.hooks.add_hook(hook);
    }

    /// Drains all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<FormEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }

    /// The root layer's views, in schema order.
    pub fn views(&self) -> &[FormItemView] {
        self.layer.views()
    }

    /// Mutable access to the root layer's views.
    pub fn views_mut(&mut self) -> &mut [FormItemView] {
        self.layer.views_mut()
    }

    /// The top-level view with the given name, if any.
    pub fn view(&self, name: &str) -> Option<&FormItemView> {
        self.layer.view(name)
    }

    /// Mutable access to the top-level view with the given name.
    pub fn view_mut(&mut self, name: &str) -> Option<&mut FormItemView> {
        self.layer.view_mut(name)
    }
}

impl std::fmt::Debug for FormView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormView")
            .field("items", &self.form.items().len())
            .field("laid_out", &self.laid_out)
            .field("valid", &self.is_valid())
            .finish()
    }
}
