//! The typed event channel shared by every view of one form.
//!
//! Views do not keep per-kind listener arrays; they push [`FormEvent`]s into
//! a single unbounded channel owned by the form facade, which drains it and
//! dispatches validity changes to registered [`ValidityHook`]s. The
//! "notify only on change" discipline is an explicit guard at every emitting
//! site, never an emergent property of listener ordering.

use std::{fmt, sync::Arc};

use tokio::sync::mpsc;

use crate::{proptree::PropertyPath, validation::ValidationRecording};

/// An event emitted by a view during layout, mutation, or validation.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// A view's aggregate validity changed. `include_children` tells a later
    /// retraction whether facts underneath the origin should go too.
    ValidityChanged {
        path: PropertyPath,
        recording: ValidationRecording,
        include_children: bool,
    },
    /// A new occurrence was inserted at `index`.
    OccurrenceAdded { path: PropertyPath, index: usize },
    /// The occurrence at `index` was removed.
    OccurrenceRemoved { path: PropertyPath, index: usize },
    /// An occurrence moved between positions.
    OccurrenceMoved {
        path: PropertyPath,
        from: usize,
        to: usize,
    },
    /// A view finished layout, after all of its children were appended.
    Rendered { path: PropertyPath },
    /// Focus should move to the view at `path`.
    FocusRequested { path: PropertyPath },
}

/// Cloneable sender half of a form's event channel.
///
/// Every view of one form holds a clone; the facade holds the receiver.
/// Emission never blocks and never fails the emitting operation — a closed
/// channel (facade dropped) is traced and ignored.
#[derive(Clone)]
pub struct EventBus {
    tx: mpsc::UnboundedSender<FormEvent>,
}

impl EventBus {
    /// Creates a connected bus and its receiver.
    pub fn channel() -> (EventBus, mpsc::UnboundedReceiver<FormEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventBus { tx }, rx)
    }

    /// Pushes an event onto the channel.
    pub fn emit(&self, event: FormEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("form event dropped: receiver closed");
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}

/// Trait for validity-change subscribers registered on the form facade.
pub trait ValidityHook {
    /// Called when the form's aggregate validity recording changed.
    ///
    /// Hook failures do not abort validation; they are logged and the first
    /// one is surfaced to the validating caller's event log.
    fn on_validity_changed(&self, recording: &ValidationRecording) -> crate::Result<()>;
}

/// A collection of validity hooks executed together.
#[derive(Default, Clone)]
pub struct ValidityHookCollection {
    hooks: Vec<Arc<dyn ValidityHook>>,
}

impl ValidityHookCollection {
    /// Create a new empty hook collection.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Add a hook to the collection.
    pub fn add_hook(&mut self, hook: Arc<dyn ValidityHook>) {
        self.hooks.push(hook);
    }

    /// Execute all hooks in registration order; failures are logged and do
    /// not stop the remaining hooks.
    pub fn execute(&self, recording: &ValidationRecording) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_validity_changed(recording) {
                tracing::error!("Validity hook failed: {e}");
            }
        }
    }

    /// Whether any hooks are registered.
    pub fn has_hooks(&self) -> bool {
        !self.hooks.is_empty()
    }

    /// The number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for ValidityHookCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidityHookCollection")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Shared per-form context cloned into every view.
#[derive(Debug, Clone)]
pub struct FormContext {
    bus: EventBus,
    show_empty_occurrences: bool,
}

impl FormContext {
    /// Creates a context wired to the given bus.
    pub fn new(bus: EventBus, show_empty_occurrences: bool) -> Self {
        Self {
            bus,
            show_empty_occurrences,
        }
    }

    /// The form's event channel.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Whether an optional repeatable node with no data still shows one
    /// blank occurrence.
    pub fn show_empty_occurrences(&self) -> bool {
        self.show_empty_occurrences
    }
}
