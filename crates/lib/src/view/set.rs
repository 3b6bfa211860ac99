//! Views for repeatable item sets.

use std::rc::Rc;

use async_trait::async_trait;

use crate::{
    Result,
    proptree::{PropertyPath, PropertySetHandle},
    schema::{FormItem, FormItemSet},
    validation::{ValidationRecording, ValidationRecordingPath},
};

use super::{
    errors::ViewError,
    events::{FormContext, FormEvent},
    layer::FormItemLayer,
    occurrences::{FormSetOccurrences, OccurrenceId, OccurrenceView, OccurrenceViewFactory},
};

/// The view of a repeatable [`FormItemSet`].
///
/// Delegates repetition bookkeeping to an occurrence controller whose
/// per-occurrence views each own a nested composition layer over the set's
/// items. The set's own cardinality check runs against the number of *valid*
/// occurrences (minimum) and the live data size (maximum) — distinct from
/// per-occurrence field validity.
#[derive(Debug)]
pub struct FormItemSetView {
    set: Rc<FormItemSet>,
    occurrences: FormSetOccurrences<FormItemSetOccurrenceView>,
    ctx: FormContext,
    laid_out: bool,
    previous: Option<ValidationRecording>,
}

impl FormItemSetView {
    /// Creates an unlaid view for the given schema set.
    pub fn new(set: Rc<FormItemSet>, ctx: FormContext) -> Self {
        let items = Rc::new(set.items().to_vec());
        let factory_ctx = ctx.clone();
        let factory: OccurrenceViewFactory<FormItemSetOccurrenceView> =
            Box::new(move |occurrence, data| {
                FormItemSetOccurrenceView::new(
                    occurrence.index(),
                    items.clone(),
                    data,
                    factory_ctx.clone(),
                )
            });
        let occurrences =
            FormSetOccurrences::new(set.name(), *set.occurrences(), factory, ctx.clone());
        Self {
            set,
            occurrences,
            ctx,
            laid_out: false,
            previous: None,
        }
    }

    /// The set's name.
    pub fn name(&self) -> &str {
        self.set.name()
    }

    /// The schema set this view renders.
    pub fn set(&self) -> &FormItemSet {
        &self.set
    }

    /// Whether layout has completed.
    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    /// The occurrence controller.
    pub fn occurrences(&self) -> &FormSetOccurrences<FormItemSetOccurrenceView> {
        &self.occurrences
    }

    /// Mutable access to the occurrence controller.
    pub fn occurrences_mut(&mut self) -> &mut FormSetOccurrences<FormItemSetOccurrenceView> {
        &mut self.occurrences
    }

    fn ensure_laid_out(&self) -> Result<()> {
        if !self.laid_out {
            return Err(ViewError::not_laid_out(self.set.name()).into());
        }
        Ok(())
    }

    /// Lays out one occurrence view per computed repetition, then reports
    /// this view as rendered — once, after all children are in place.
    pub async fn layout(
        &mut self,
        data: PropertySetHandle,
        parent_path: &PropertyPath,
        validate: bool,
    ) -> Result<()> {
        self.occurrences.layout(data, parent_path, validate).await?;
        self.laid_out = true;
        self.ctx.bus().emit(FormEvent::Rendered {
            path: parent_path.join(self.set.name()),
        });
        if validate {
            self.validate(parent_path, true)?;
        }
        Ok(())
    }

    /// Reconciles against a possibly different data set.
    pub async fn update(
        &mut self,
        data: PropertySetHandle,
        parent_path: &PropertyPath,
        unchanged_only: bool,
    ) -> Result<()> {
        self.ensure_laid_out()?;
        self.occurrences.update(data, parent_path, unchanged_only).await
    }

    /// Adds a new occurrence at `at_index`; `Ok(None)` when the maximum is
    /// reached.
    pub async fn add_occurrence(
        &mut self,
        at_index: usize,
        validate: bool,
        parent_path: &PropertyPath,
    ) -> Result<Option<OccurrenceId>> {
        self.occurrences
            .add_new_occurrence(at_index, validate, parent_path)
            .await
    }

    /// Removes the occurrence with the given identity.
    pub async fn remove_occurrence(
        &mut self,
        id: OccurrenceId,
        parent_path: &PropertyPath,
    ) -> Result<()> {
        self.occurrences.remove_occurrence_view(id, parent_path).await
    }

    /// Moves an occurrence between positions.
    pub fn move_occurrence(
        &mut self,
        from: usize,
        to: usize,
        parent_path: &PropertyPath,
    ) -> Result<()> {
        self.occurrences.move_occurrence(from, to, parent_path)
    }

    /// Aggregates all occurrence recordings plus this set's own cardinality
    /// check, notifying upward only when validity changed.
    pub fn validate(
        &mut self,
        parent_path: &PropertyPath,
        silent: bool,
    ) -> Result<ValidationRecording> {
        self.ensure_laid_out()?;
        let (mut recording, valid_count) =
            self.occurrences.validate_occurrences(parent_path, silent)?;

        let allowed = self.set.occurrences();
        let parent = (!parent_path.is_root()).then(|| parent_path.clone());
        let vpath = ValidationRecordingPath::with_occurrences(
            parent,
            self.set.name(),
            allowed.minimum(),
            allowed.maximum(),
        );
        if allowed.minimum_breached(valid_count) {
            recording.breaks_minimum_occurrences(vpath.clone());
        }
        if allowed.maximum_breached(self.occurrences.data_len()) {
            recording.breaks_maximum_occurrences(vpath);
        }

        if !silent && recording.validity_changed(self.previous.as_ref()) {
            self.ctx.bus().emit(FormEvent::ValidityChanged {
                path: parent_path.join(self.set.name()),
                recording: recording.clone(),
                include_children: true,
            });
        }
        self.previous = Some(recording.clone());
        Ok(recording)
    }

    /// Restores defaults in every occurrence and clears baselines.
    pub fn reset(&mut self) {
        self.occurrences.for_each_view_mut(|view| view.reset());
        self.previous = None;
    }

    pub(super) fn clear_hide_errors(&mut self) {
        self.occurrences
            .for_each_view_mut(|view| view.clear_hide_errors());
    }

    pub(super) fn set_display_errors(&mut self, display: bool) {
        self.occurrences
            .for_each_view_mut(|view| view.set_display_errors(display));
    }

    pub(super) fn dispose(&mut self) {
        self.occurrences.dispose();
        self.laid_out = false;
    }
}

/// One repetition of an item set: a nested composition layer over the set's
/// items, bound to one entry of the repeated data array.
#[derive(Debug)]
pub struct FormItemSetOccurrenceView {
    index: usize,
    data: PropertySetHandle,
    layer: FormItemLayer,
    ctx: FormContext,
    laid_out: bool,
    hide_errors: bool,
    display_errors: bool,
    previous: Option<ValidationRecording>,
}

impl FormItemSetOccurrenceView {
    fn new(
        index: usize,
        items: Rc<Vec<FormItem>>,
        data: PropertySetHandle,
        ctx: FormContext,
    ) -> Self {
        let layer = FormItemLayer::new(items, ctx.clone());
        Self {
            index,
            data,
            layer,
            ctx,
            laid_out: false,
            hide_errors: false,
            display_errors: true,
            previous: None,
        }
    }

    /// The nested composition layer.
    pub fn layer(&self) -> &FormItemLayer {
        &self.layer
    }

    /// Mutable access to the nested composition layer.
    pub fn layer_mut(&mut self) -> &mut FormItemLayer {
        &mut self.layer
    }

    /// The data set this occurrence is bound to.
    pub fn data(&self) -> PropertySetHandle {
        self.data.clone()
    }

    /// Whether validation errors should be rendered inline.
    pub fn displays_errors(&self) -> bool {
        self.display_errors
    }

    fn ensure_laid_out(&self) -> Result<()> {
        if !self.laid_out {
            return Err(ViewError::not_laid_out(format!("occurrence {}", self.index)).into());
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl OccurrenceView for FormItemSetOccurrenceView {
    fn index(&self) -> usize {
        self.index
    }

    fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    fn set_hide_errors(&mut self, hide: bool) {
        self.hide_errors = hide;
    }

    fn hides_errors(&self) -> bool {
        self.hide_errors
    }

    async fn layout(&mut self, path: &PropertyPath, validate: bool) -> Result<()> {
        self.layer.layout(self.data.clone(), path, validate).await?;
        self.laid_out = true;
        if validate {
            self.validate(path, true)?;
        }
        Ok(())
    }

    async fn update(
        &mut self,
        path: &PropertyPath,
        data: PropertySetHandle,
        unchanged_only: bool,
    ) -> Result<()> {
        self.ensure_laid_out()?;
        self.data = data.clone();
        self.layer.update(data, path, unchanged_only).await
    }

    fn validate(&mut self, path: &PropertyPath, silent: bool) -> Result<ValidationRecording> {
        self.ensure_laid_out()?;
        let recording = self.layer.validate(path, silent)?;
        if !silent && recording.validity_changed(self.previous.as_ref()) {
            self.ctx.bus().emit(FormEvent::ValidityChanged {
                path: path.clone(),
                recording: recording.clone(),
                include_children: true,
            });
        }
        self.previous = Some(recording.clone());
        Ok(recording)
    }

    fn reset(&mut self) {
        self.layer.reset();
        self.previous = None;
        self.hide_errors = false;
    }

    fn clear_hide_errors(&mut self) {
        self.hide_errors = false;
        self.layer.clear_hide_errors();
    }

    fn set_display_errors(&mut self, display: bool) {
        self.display_errors = display;
        self.layer.set_display_errors(display);
    }

    fn dispose(&mut self) {
        self.layer.dispose();
        self.laid_out = false;
    }
}
