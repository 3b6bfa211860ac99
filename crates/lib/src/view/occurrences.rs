//! The occurrence controller: dynamic lists of repeated view instances
//! bound to a repeated data array.
//!
//! A [`FormSetOccurrences`] owns one view per repetition of a repeatable
//! schema node and keeps three things in lockstep under the node's
//! cardinality policy: the occurrence bookkeeping, the view list, and the
//! backing data array. Occurrences live in an index-stable arena — slots
//! keyed by [`OccurrenceId`] plus a derived ordering — and are renumbered
//! after every insert, remove, and move so that an occurrence's index always
//! equals its position.
//!
//! The data array's element order is the single source of truth for
//! eventual serialization; view order is derived from it, never the other
//! way around.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    Result,
    occurrences::Occurrences,
    proptree::{PropertyError, PropertyPath, PropertySetHandle, Value},
    validation::ValidationRecording,
};

use super::{
    errors::ViewError,
    events::{FormContext, FormEvent},
};

/// Stable identity of one occurrence, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OccurrenceId(Uuid);

impl OccurrenceId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lightweight index holder identifying "the Nth repetition" of a schema
/// node. Created and destroyed entirely by its owning controller.
#[derive(Debug, Clone)]
pub struct Occurrence {
    id: OccurrenceId,
    index: usize,
    allowed: Occurrences,
}

impl Occurrence {
    /// The occurrence's stable identity.
    pub fn id(&self) -> OccurrenceId {
        self.id
    }

    /// The occurrence's current position. Always equals its position in the
    /// controller's ordering.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The cardinality policy of the owning node.
    pub fn allowed_occurrences(&self) -> &Occurrences {
        &self.allowed
    }
}

/// One repetition's view, managed by a [`FormSetOccurrences`] controller.
///
/// The `path` argument of the lifecycle methods is the occurrence's own data
/// path (`parent.name[index]`), computed by the controller on every call —
/// views never store their absolute location.
#[async_trait(?Send)]
pub trait OccurrenceView {
    /// The view's current position.
    fn index(&self) -> usize;

    /// Renumbers the view after surrounding occurrences changed.
    fn set_index(&mut self, index: usize);

    /// Marks the view as hiding its own validation errors until the next
    /// explicit validation pass.
    fn set_hide_errors(&mut self, hide: bool);

    /// Whether the view currently hides its own validation errors.
    fn hides_errors(&self) -> bool;

    /// Lays out the view's content against its bound data.
    async fn layout(&mut self, path: &PropertyPath, validate: bool) -> Result<()>;

    /// Rebinds the view to `data` and updates its content in place.
    async fn update(
        &mut self,
        path: &PropertyPath,
        data: PropertySetHandle,
        unchanged_only: bool,
    ) -> Result<()>;

    /// Computes the view's validation recording, notifying on change unless
    /// `silent`.
    fn validate(&mut self, path: &PropertyPath, silent: bool) -> Result<ValidationRecording>;

    /// Restores default values and clears validation baselines.
    fn reset(&mut self);

    /// Recursively clears the hide-errors state.
    fn clear_hide_errors(&mut self);

    /// Recursively sets whether validation errors are displayed.
    fn set_display_errors(&mut self, display: bool);

    /// Detaches the view; it will not be used again.
    fn dispose(&mut self);
}

/// Creates the view for a fresh occurrence, bound to its data set.
pub type OccurrenceViewFactory<V> = Box<dyn Fn(&Occurrence, PropertySetHandle) -> V>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControllerState {
    Unlaid,
    LaidOut,
    Disposed,
}

struct OccurrenceEntry<V> {
    occurrence: Occurrence,
    view: V,
    data: PropertySetHandle,
}

/// Controller for the occurrences of one repeatable schema node.
pub struct FormSetOccurrences<V: OccurrenceView> {
    name: String,
    allowed: Occurrences,
    factory: OccurrenceViewFactory<V>,
    parent_data: Option<PropertySetHandle>,
    entries: HashMap<OccurrenceId, OccurrenceEntry<V>>,
    order: Vec<OccurrenceId>,
    state: ControllerState,
    ctx: FormContext,
}

impl<V: OccurrenceView> FormSetOccurrences<V> {
    /// Creates an unlaid controller for the named array under the given
    /// policy. The view factory is injected; the controller never knows the
    /// concrete view shape.
    pub fn new(
        name: impl Into<String>,
        allowed: Occurrences,
        factory: OccurrenceViewFactory<V>,
        ctx: FormContext,
    ) -> Self {
        Self {
            name: name.into(),
            allowed,
            factory,
            parent_data: None,
            entries: HashMap::new(),
            order: Vec::new(),
            state: ControllerState::Unlaid,
            ctx,
        }
    }

    /// The data array name this controller manages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The cardinality policy.
    pub fn allowed_occurrences(&self) -> &Occurrences {
        &self.allowed
    }

    /// The number of live occurrences.
    pub fn count(&self) -> usize {
        self.order.len()
    }

    /// The occurrence at `index`.
    pub fn occurrence(&self, index: usize) -> Option<&Occurrence> {
        let id = self.order.get(index)?;
        self.entries.get(id).map(|e| &e.occurrence)
    }

    /// All occurrences in index order.
    pub fn occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|e| &e.occurrence))
    }

    /// The view at `index`.
    pub fn view(&self, index: usize) -> Option<&V> {
        let id = self.order.get(index)?;
        self.entries.get(id).map(|e| &e.view)
    }

    /// Mutable access to the view at `index`.
    pub fn view_mut(&mut self, index: usize) -> Option<&mut V> {
        let id = self.order.get(index)?;
        self.entries.get_mut(id).map(|e| &mut e.view)
    }

    /// The stable ids in index order.
    pub fn ids(&self) -> &[OccurrenceId] {
        &self.order
    }

    /// The current size of the backing data array.
    pub fn data_len(&self) -> usize {
        self.parent_data
            .as_ref()
            .map_or(0, |data| data.borrow().array_len(&self.name))
    }

    fn ensure_laid_out(&self) -> Result<()> {
        if self.state != ControllerState::LaidOut {
            return Err(ViewError::not_laid_out(&self.name).into());
        }
        Ok(())
    }

    fn parent_data(&self) -> Result<PropertySetHandle> {
        self.parent_data
            .clone()
            .ok_or_else(|| ViewError::not_laid_out(&self.name).into())
    }

    /// The occurrence count a data array of `data_len` entries requires.
    fn needed_count(&self, data_len: usize) -> usize {
        let mut count = data_len.max(self.allowed.minimum() as usize);
        if count == 0 && self.ctx.show_empty_occurrences() {
            count = 1;
        }
        // Occurrences beyond the schema maximum are silently not created;
        // the surplus data stays and surfaces as a maximum breach.
        if !self.allowed.unbounded() {
            count = count.min(self.allowed.maximum() as usize);
        }
        count
    }

    /// Resolves or creates the nested data set at `index`.
    fn occurrence_data(&self, index: usize) -> Result<PropertySetHandle> {
        let parent = self.parent_data()?;
        let existing = {
            let borrowed = parent.borrow();
            match borrowed.array(&self.name).and_then(|a| a.get(index)) {
                Some(Value::Set(handle)) => Some(handle.clone()),
                Some(other) => {
                    return Err(PropertyError::TypeMismatch {
                        path: format!("{}[{index}]", self.name),
                        expected: "Set".to_string(),
                        actual: other.type_name().to_string(),
                    }
                    .into());
                }
                None => None,
            }
        };
        Ok(match existing {
            Some(handle) => handle,
            None => parent.borrow_mut().insert_set(&self.name, index),
        })
    }

    fn occurrence_path(&self, parent_path: &PropertyPath, index: usize) -> PropertyPath {
        parent_path.join_indexed(&self.name, index)
    }

    fn renumber(&mut self) {
        for index in 0..self.order.len() {
            let id = self.order[index];
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.occurrence.index = index;
                entry.view.set_index(index);
            }
        }
    }

    fn insert_entry(&mut self, index: usize) -> Result<OccurrenceId> {
        let data = self.occurrence_data(index)?;
        let occurrence = Occurrence {
            id: OccurrenceId::new(),
            index,
            allowed: self.allowed,
        };
        let id = occurrence.id;
        let view = (self.factory)(&occurrence, data.clone());
        self.entries.insert(
            id,
            OccurrenceEntry {
                occurrence,
                view,
                data,
            },
        );
        self.order.insert(index, id);
        self.renumber();
        Ok(id)
    }

    /// Lays out one view per computed occurrence, in ascending index order.
    ///
    /// The initial count is `max(data size, schema minimum)`; an empty array
    /// under a zero minimum yields one blank occurrence or none, depending
    /// on the context's show-empty flag. Missing data entries are created so
    /// every view has a set to bind to.
    pub async fn layout(
        &mut self,
        parent_data: PropertySetHandle,
        parent_path: &PropertyPath,
        validate: bool,
    ) -> Result<()> {
        if self.state == ControllerState::LaidOut {
            return Err(ViewError::AlreadyLaidOut {
                view: self.name.clone(),
            }
            .into());
        }
        self.parent_data = Some(parent_data);
        self.state = ControllerState::LaidOut;

        let data_len = self.data_len();
        let count = self.needed_count(data_len);
        tracing::debug!(
            name = %self.name,
            data_len,
            count,
            "laying out occurrences"
        );
        for index in 0..count {
            self.insert_entry(index)?;
        }
        for index in 0..self.order.len() {
            let path = self.occurrence_path(parent_path, index);
            let id = self.order[index];
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.view.layout(&path, validate).await?;
            }
        }
        Ok(())
    }

    /// Creates a new occurrence and view at `at_index`, shifting subsequent
    /// indices.
    ///
    /// Returns `Ok(None)` without side effects when the maximum is reached —
    /// callers must check before assuming a new block exists. The fresh view
    /// hides its own validation errors until the next explicit validation
    /// pass.
    pub async fn add_new_occurrence(
        &mut self,
        at_index: usize,
        validate: bool,
        parent_path: &PropertyPath,
    ) -> Result<Option<OccurrenceId>> {
        self.ensure_laid_out()?;
        if self.allowed.maximum_reached(self.order.len()) {
            tracing::debug!(name = %self.name, "occurrence maximum reached, add refused");
            return Ok(None);
        }
        let at_index = at_index.min(self.order.len());
        self.parent_data()?.borrow_mut().insert_set(&self.name, at_index);

        let id = self.insert_entry(at_index)?;
        let path = self.occurrence_path(parent_path, at_index);
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.view.set_hide_errors(true);
            entry.view.layout(&path, validate).await?;
        }
        self.ctx.bus().emit(FormEvent::OccurrenceAdded {
            path: parent_path.join(&self.name),
            index: at_index,
        });
        Ok(Some(id))
    }

    /// Removes the occurrence with the given identity: detaches its view,
    /// removes the backing data entry when it is still present, renumbers,
    /// and re-derives the required count from live data size vs. the schema
    /// minimum, re-adding a blank occurrence when the minimum demands one.
    pub async fn remove_occurrence_view(
        &mut self,
        id: OccurrenceId,
        parent_path: &PropertyPath,
    ) -> Result<()> {
        self.ensure_laid_out()?;
        let Some(mut entry) = self.entries.remove(&id) else {
            return Err(ViewError::OccurrenceNotFound {
                view: self.name.clone(),
                reference: id.to_string(),
            }
            .into());
        };
        let index = self
            .order
            .iter()
            .position(|candidate| *candidate == id)
            .expect("entry ids and order stay in lockstep");
        self.order.remove(index);
        entry.view.dispose();

        // The data entry may already be gone, or replaced if the caller
        // mutated the array directly; only remove what this view was bound
        // to.
        let parent = self.parent_data()?;
        let still_present = parent
            .borrow()
            .get_set(&self.name, index)
            .is_some_and(|handle| std::rc::Rc::ptr_eq(&handle, &entry.data));
        if still_present {
            parent.borrow_mut().remove_value(&self.name, index);
        }
        self.renumber();
        self.ctx.bus().emit(FormEvent::OccurrenceRemoved {
            path: parent_path.join(&self.name),
            index,
        });

        // Exactly-once cardinality correction: the minimum is re-derived
        // from the live state, not from what was just removed.
        while self.order.len() < self.allowed.minimum() as usize {
            let index = self.order.len();
            tracing::debug!(name = %self.name, index, "re-adding occurrence to satisfy minimum");
            let id = self.insert_entry(index)?;
            let path = self.occurrence_path(parent_path, index);
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.view.set_hide_errors(true);
                entry.view.layout(&path, false).await?;
            }
        }
        Ok(())
    }

    /// Reorders the occurrence at `from` to position `to`, moving the
    /// bookkeeping and the underlying data entry atomically.
    pub fn move_occurrence(
        &mut self,
        from: usize,
        to: usize,
        parent_path: &PropertyPath,
    ) -> Result<()> {
        self.ensure_laid_out()?;
        if from >= self.order.len() || to >= self.order.len() {
            return Err(ViewError::OccurrenceNotFound {
                view: self.name.clone(),
                reference: format!("move {from} -> {to} with {} occurrences", self.order.len()),
            }
            .into());
        }
        if from == to {
            return Ok(());
        }
        let id = self.order.remove(from);
        self.order.insert(to, id);
        self.parent_data()?.borrow_mut().move_value(&self.name, from, to);
        self.renumber();
        self.ctx.bus().emit(FormEvent::OccurrenceMoved {
            path: parent_path.join(&self.name),
            from,
            to,
        });
        Ok(())
    }

    /// Reconciles the view list against a possibly different data array.
    ///
    /// Excess views beyond the needed count are detached (the data is the
    /// source of truth and is never touched here), surviving views are
    /// rebound and updated in place, and new views are appended until the
    /// needed count is reached. Idempotent: a second call with the same
    /// array changes nothing.
    pub async fn update(
        &mut self,
        parent_data: PropertySetHandle,
        parent_path: &PropertyPath,
        unchanged_only: bool,
    ) -> Result<()> {
        self.ensure_laid_out()?;
        self.parent_data = Some(parent_data);
        let needed = self.needed_count(self.data_len());

        while self.order.len() > needed {
            let id = self.order.pop().expect("len checked above");
            if let Some(mut entry) = self.entries.remove(&id) {
                entry.view.dispose();
            }
        }
        self.renumber();

        for index in 0..self.order.len() {
            let data = self.occurrence_data(index)?;
            let path = self.occurrence_path(parent_path, index);
            let id = self.order[index];
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.data = data.clone();
                entry.view.update(&path, data, unchanged_only).await?;
            }
        }

        while self.order.len() < needed {
            let index = self.order.len();
            let id = self.insert_entry(index)?;
            let path = self.occurrence_path(parent_path, index);
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.view.layout(&path, false).await?;
            }
        }
        Ok(())
    }

    /// Validates every occurrence view, flattening their recordings.
    ///
    /// Returns the merged recording and the number of occurrences whose own
    /// recording is valid — the count the owning set's cardinality check
    /// runs against.
    pub fn validate_occurrences(
        &mut self,
        parent_path: &PropertyPath,
        silent: bool,
    ) -> Result<(ValidationRecording, usize)> {
        self.ensure_laid_out()?;
        let mut recording = ValidationRecording::new();
        let mut valid_count = 0;
        for index in 0..self.order.len() {
            let path = self.occurrence_path(parent_path, index);
            let id = self.order[index];
            if let Some(entry) = self.entries.get_mut(&id) {
                let child = entry.view.validate(&path, silent)?;
                if child.is_valid() {
                    valid_count += 1;
                }
                recording.flatten(&child);
            }
        }
        Ok((recording, valid_count))
    }

    /// Applies `f` to every view in index order.
    pub fn for_each_view_mut(&mut self, mut f: impl FnMut(&mut V)) {
        for id in &self.order {
            if let Some(entry) = self.entries.get_mut(id) {
                f(&mut entry.view);
            }
        }
    }

    /// Detaches all views; the controller will not be used again.
    pub fn dispose(&mut self) {
        for id in std::mem::take(&mut self.order) {
            if let Some(mut entry) = self.entries.remove(&id) {
                entry.view.dispose();
            }
        }
        self.state = ControllerState::Disposed;
    }
}

impl<V: OccurrenceView> std::fmt::Debug for FormSetOccurrences<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSetOccurrences")
            .field("name", &self.name)
            .field("allowed", &self.allowed)
            .field("count", &self.order.len())
            .field("state", &self.state)
            .finish()
    }
}
