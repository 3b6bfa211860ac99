//! Change-notification hooks for property-tree mutations.
//!
//! Subscribers register a [`PropertyHook`] on the set they care about and
//! receive an event for every property added, removed, or changed in that
//! set. Hook failures never roll back the mutation; they are logged and
//! surfaced to the caller of [`PropertyHookCollection::execute`].

use std::{fmt, sync::Arc};

/// The kind of mutation that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyEventKind {
    Added,
    Removed,
    Changed,
}

/// Context describing one property mutation, local to the emitting set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEvent {
    /// What happened.
    pub kind: PropertyEventKind,
    /// The named array the mutation happened in.
    pub array: String,
    /// The index within that array.
    pub index: usize,
}

/// Trait for property-change subscribers.
pub trait PropertyHook {
    /// Called after a mutation has been applied to the subscribed set.
    ///
    /// Hook failures do not roll back the mutation.
    fn on_property_event(&self, event: &PropertyEvent) -> crate::Result<()>;
}

/// A collection of property hooks executed together.
#[derive(Default, Clone)]
pub struct PropertyHookCollection {
    hooks: Vec<Arc<dyn PropertyHook>>,
}

impl PropertyHookCollection {
    /// Create a new empty hook collection.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Add a hook to the collection.
    pub fn add_hook(&mut self, hook: Arc<dyn PropertyHook>) {
        self.hooks.push(hook);
    }

    /// Execute all hooks in registration order.
    ///
    /// If a hook fails, execution continues with the remaining hooks and the
    /// first error is returned.
    pub fn execute(&self, event: &PropertyEvent) -> crate::Result<()> {
        let mut first_error = None;

        for hook in &self.hooks {
            if let Err(e) = hook.on_property_event(event) {
                tracing::error!("Property hook failed: {e}");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
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

impl fmt::Debug for PropertyHookCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyHookCollection")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
