//! Views for option sets: selection topologies, stash/restore, cleanup.

use std::{collections::HashMap, rc::Rc};

use async_trait::async_trait;

use crate::{
    Result,
    proptree::{PropertyPath, PropertySet, PropertySetHandle, Value},
    schema::{FormItem, FormOptionSet, FormOptionSetOption},
    validation::{ValidationRecording, ValidationRecordingPath},
};

use super::{
    errors::ViewError,
    events::{FormContext, FormEvent},
    layer::FormItemLayer,
    occurrences::{FormSetOccurrences, OccurrenceId, OccurrenceView, OccurrenceViewFactory},
};

/// The array holding the names of the currently active options, stored
/// alongside the option set's own data.
pub const SELECTED_ARRAY: &str = "_selected";

/// Decides whether stashed data of an option confirmed to remain unselected
/// may be discarded during [`FormOptionSetOccurrenceView::clean`].
///
/// The engine is headless: warning the user about non-default values that
/// are about to be discarded belongs to the hosting UI, which expresses its
/// answer through this policy.
pub trait CleanupPolicy {
    /// Whether the stashed data of `option_name` may be discarded.
    fn confirm_discard(&self, option_name: &str) -> bool;
}

/// The default policy: never discard stashed data.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepStashedData;

impl CleanupPolicy for KeepStashedData {
    fn confirm_discard(&self, _option_name: &str) -> bool {
        false
    }
}

/// A policy that always confirms the discard.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardStashedData;

impl CleanupPolicy for DiscardStashedData {
    fn confirm_discard(&self, _option_name: &str) -> bool {
        true
    }
}

/// The view of a repeatable [`FormOptionSet`].
#[derive(Debug)]
pub struct FormOptionSetView {
    set: Rc<FormOptionSet>,
    occurrences: FormSetOccurrences<FormOptionSetOccurrenceView>,
    ctx: FormContext,
    laid_out: bool,
    previous: Option<ValidationRecording>,
}

impl FormOptionSetView {
    /// Creates an unlaid view for the given schema option set.
    pub fn new(set: Rc<FormOptionSet>, ctx: FormContext) -> Self {
        let factory_set = set.clone();
        let factory_ctx = ctx.clone();
        let factory: OccurrenceViewFactory<FormOptionSetOccurrenceView> =
            Box::new(move |occurrence, data| {
                FormOptionSetOccurrenceView::new(
                    occurrence.index(),
                    factory_set.clone(),
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

    /// The option set's name.
    pub fn name(&self) -> &str {
        self.set.name()
    }

    /// The schema option set this view renders.
    pub fn set(&self) -> &FormOptionSet {
        &self.set
    }

    /// Whether layout has completed.
    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    /// The occurrence controller.
    pub fn occurrences(&self) -> &FormSetOccurrences<FormOptionSetOccurrenceView> {
        &self.occurrences
    }

    /// Mutable access to the occurrence controller.
    pub fn occurrences_mut(&mut self) -> &mut FormSetOccurrences<FormOptionSetOccurrenceView> {
        &mut self.occurrences
    }

    fn ensure_laid_out(&self) -> Result<()> {
        if !self.laid_out {
            return Err(ViewError::not_laid_out(self.set.name()).into());
        }
        Ok(())
    }

    fn occurrence_path(&self, parent_path: &PropertyPath, index: usize) -> PropertyPath {
        parent_path.join_indexed(self.set.name(), index)
    }

    /// Lays out one occurrence view per computed repetition.
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

    /// Selects `option_name` in the occurrence at `occurrence_index`.
    pub async fn select_option(
        &mut self,
        occurrence_index: usize,
        option_name: &str,
        parent_path: &PropertyPath,
    ) -> Result<bool> {
        self.ensure_laid_out()?;
        let path = self.occurrence_path(parent_path, occurrence_index);
        let view = self.occurrences.view_mut(occurrence_index).ok_or_else(|| {
            crate::Error::View(ViewError::OccurrenceNotFound {
                view: self.set.name().to_string(),
                reference: occurrence_index.to_string(),
            })
        })?;
        view.select(&path, option_name).await
    }

    /// Deselects `option_name` in the occurrence at `occurrence_index`,
    /// stashing non-empty nested data.
    pub fn deselect_option(
        &mut self,
        occurrence_index: usize,
        option_name: &str,
        _parent_path: &PropertyPath,
    ) -> Result<()> {
        self.ensure_laid_out()?;
        let view = self.occurrences.view_mut(occurrence_index).ok_or_else(|| {
            crate::Error::View(ViewError::OccurrenceNotFound {
                view: self.set.name().to_string(),
                reference: occurrence_index.to_string(),
            })
        })?;
        view.deselect(option_name)
    }

    /// Runs cleanup on every occurrence under the given policy.
    pub fn clean(&mut self, policy: &dyn CleanupPolicy) -> Result<()> {
        self.ensure_laid_out()?;
        self.occurrences.for_each_view_mut(|view| view.clean(policy));
        Ok(())
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

/// One selectable option inside an option-set occurrence.
///
/// The nested composition layer exists only while the option is selected;
/// deselection hides it and stashes its data.
#[derive(Debug)]
pub struct FormOptionSetOptionView {
    option: FormOptionSetOption,
    items: Rc<Vec<FormItem>>,
    layer: Option<FormItemLayer>,
    selected: bool,
    enabled: bool,
}

impl FormOptionSetOptionView {
    fn new(option: FormOptionSetOption) -> Self {
        let items = Rc::new(option.items().to_vec());
        Self {
            option,
            items,
            layer: None,
            selected: false,
            enabled: true,
        }
    }

    /// The option's name.
    pub fn name(&self) -> &str {
        self.option.name()
    }

    /// The schema option this view renders.
    pub fn option(&self) -> &FormOptionSetOption {
        &self.option
    }

    /// Whether the option is currently active.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether the option may be toggled. An unchecked option is disabled
    /// while the selection maximum is reached.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the option's nested fields are currently shown.
    pub fn has_nested_view(&self) -> bool {
        self.layer.is_some()
    }

    /// The nested composition layer, while the option is selected.
    pub fn layer(&self) -> Option<&FormItemLayer> {
        self.layer.as_ref()
    }

    /// Mutable access to the nested composition layer.
    pub fn layer_mut(&mut self) -> Option<&mut FormItemLayer> {
        self.layer.as_mut()
    }
}

/// One repetition of an option set: option activation state, selection
/// topology, and the stash of deselected options' data.
#[derive(Debug)]
pub struct FormOptionSetOccurrenceView {
    index: usize,
    set: Rc<FormOptionSet>,
    data: PropertySetHandle,
    options: Vec<FormOptionSetOptionView>,
    stash: HashMap<String, PropertySet>,
    ctx: FormContext,
    laid_out: bool,
    hide_errors: bool,
    display_errors: bool,
    previous: Option<ValidationRecording>,
}

impl FormOptionSetOccurrenceView {
    fn new(index: usize, set: Rc<FormOptionSet>, data: PropertySetHandle, ctx: FormContext) -> Self {
        Self {
            index,
            set,
            data,
            options: Vec::new(),
            stash: HashMap::new(),
            ctx,
            laid_out: false,
            hide_errors: false,
            display_errors: true,
            previous: None,
        }
    }

    /// The option views, in declaration order.
    pub fn options(&self) -> &[FormOptionSetOptionView] {
        &self.options
    }

    /// The option view with the given name.
    pub fn option_view(&self, name: &str) -> Option<&FormOptionSetOptionView> {
        self.options.iter().find(|view| view.name() == name)
    }

    /// Mutable access to the option view with the given name.
    pub fn option_view_mut(&mut self, name: &str) -> Option<&mut FormOptionSetOptionView> {
        self.options.iter_mut().find(|view| view.name() == name)
    }

    /// The names of the currently active options, in declaration order.
    pub fn selected_names(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|view| view.selected)
            .map(FormOptionSetOptionView::name)
            .collect()
    }

    /// The number of currently active options.
    pub fn selected_count(&self) -> usize {
        self.options.iter().filter(|view| view.selected).count()
    }

    /// Whether a deselected option's data is currently stashed.
    pub fn is_stashed(&self, option_name: &str) -> bool {
        self.stash.contains_key(option_name)
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
            return Err(ViewError::not_laid_out(self.set.name()).into());
        }
        Ok(())
    }

    fn option_position(&self, name: &str) -> Result<usize> {
        self.options
            .iter()
            .position(|view| view.name() == name)
            .ok_or_else(|| {
                crate::Error::View(ViewError::UnknownOption {
                    view: self.set.name().to_string(),
                    option: name.to_string(),
                })
            })
    }

    /// Re-derives every option's enabled state from the current selection.
    fn recompute_enabled(&mut self) {
        let maximum_reached = self
            .set
            .multiselection()
            .maximum_reached(self.selected_count());
        for view in &mut self.options {
            view.enabled = view.selected || !maximum_reached;
        }
    }

    /// Selection derived from data, or from the declared defaults when the
    /// data set is completely fresh.
    fn initial_selection(&self) -> (Vec<String>, bool) {
        let borrowed = self.data.borrow();
        if borrowed.array_len(SELECTED_ARRAY) > 0 {
            let names = borrowed
                .array(SELECTED_ARRAY)
                .map(|array| {
                    array
                        .values()
                        .iter()
                        .filter_map(|value| value.as_string().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            (names, false)
        } else if borrowed.is_empty() {
            let multiselection = self.set.multiselection();
            let mut names: Vec<String> = self
                .set
                .options()
                .iter()
                .filter(|option| option.default_option())
                .map(|option| option.name().to_string())
                .collect();
            if !multiselection.unbounded() {
                names.truncate(multiselection.maximum() as usize);
            }
            (names, true)
        } else {
            (Vec::new(), false)
        }
    }

    async fn layout_option(
        &mut self,
        position: usize,
        path: &PropertyPath,
        validate: bool,
    ) -> Result<()> {
        let name = self.options[position].name().to_string();
        let nested = {
            let existing = self.data.borrow().get_set(&name, 0);
            match existing {
                Some(handle) => handle,
                None => self.data.borrow_mut().add_set(&name),
            }
        };
        let mut layer = FormItemLayer::new(self.options[position].items.clone(), self.ctx.clone());
        let option_path = path.join_indexed(&name, 0);
        layer.layout(nested, &option_path, validate).await?;
        self.options[position].layer = Some(layer);
        Ok(())
    }

    /// Activates `option_name`.
    ///
    /// Exclusive topology overwrites the single selection slot, running the
    /// deselect side effect on the previously active option first. Multi
    /// topology appends, refusing with `Ok(false)` when the selection
    /// maximum is reached. Reselecting a stashed option restores its prior
    /// nested values unchanged.
    pub async fn select(&mut self, path: &PropertyPath, option_name: &str) -> Result<bool> {
        self.ensure_laid_out()?;
        let position = self.option_position(option_name)?;
        if self.options[position].selected {
            return Ok(true);
        }

        if self.set.exclusive() {
            if let Some(current) = self.options.iter().position(|view| view.selected) {
                self.deselect_at(current);
            }
            let mut borrowed = self.data.borrow_mut();
            if borrowed.array_len(SELECTED_ARRAY) == 0 {
                borrowed.add_value(SELECTED_ARRAY, option_name);
            } else {
                borrowed.set_value(SELECTED_ARRAY, 0, option_name);
            }
        } else {
            let multiselection = self.set.multiselection();
            if multiselection.maximum_reached(self.selected_count()) {
                tracing::debug!(
                    option_set = %self.set.name(),
                    option = option_name,
                    "selection maximum reached, select refused"
                );
                return Ok(false);
            }
            self.data.borrow_mut().add_value(SELECTED_ARRAY, option_name);
        }

        self.options[position].selected = true;
        if let Some(stashed) = self.stash.remove(option_name) {
            tracing::debug!(
                option_set = %self.set.name(),
                option = option_name,
                "restoring stashed option data"
            );
            let handle = PropertySet::into_handle(stashed);
            let mut borrowed = self.data.borrow_mut();
            borrowed.remove_array(option_name);
            borrowed.add_value(option_name, Value::Set(handle));
        }
        self.layout_option(position, path, false).await?;
        self.recompute_enabled();
        Ok(true)
    }

    /// Deactivates `option_name`, stashing non-empty nested data so that a
    /// later reselection restores it. The nested view is hidden.
    pub fn deselect(&mut self, option_name: &str) -> Result<()> {
        self.ensure_laid_out()?;
        let position = self.option_position(option_name)?;
        if !self.options[position].selected {
            return Ok(());
        }
        self.deselect_at(position);
        self.recompute_enabled();
        Ok(())
    }

    fn deselect_at(&mut self, position: usize) {
        let name = self.options[position].name().to_string();

        {
            let mut borrowed = self.data.borrow_mut();
            let selected_index = borrowed.array(SELECTED_ARRAY).and_then(|array| {
                array
                    .values()
                    .iter()
                    .position(|value| value.as_string() == Some(name.as_str()))
            });
            if let Some(index) = selected_index {
                borrowed.remove_value(SELECTED_ARRAY, index);
            }
            if borrowed.array_len(SELECTED_ARRAY) == 0 {
                borrowed.remove_array(SELECTED_ARRAY);
            }
        }

        // Deselection must not silently delete typed-in data: non-empty
        // nested sets are stashed keyed by option name.
        let removed = self.data.borrow_mut().remove_array(&name);
        if let Some(array) = removed
            && let Some(handle) = array.get_set(0)
        {
            let snapshot = handle.borrow().deep_clone();
            if !snapshot.is_empty() {
                tracing::debug!(
                    option_set = %self.set.name(),
                    option = %name,
                    "stashing deselected option data"
                );
                self.stash.insert(name.clone(), snapshot);
            }
        }

        self.options[position].selected = false;
        self.options[position].layer = None;
    }

    /// Discards stashed data for options confirmed to remain unselected.
    ///
    /// Stashes holding only the options' declared defaults are dropped
    /// silently; anything else requires the policy's confirmation and is
    /// kept when the policy declines.
    pub fn clean(&mut self, policy: &dyn CleanupPolicy) {
        let names: Vec<String> = self.stash.keys().cloned().collect();
        for name in names {
            let reselected = self
                .option_view(&name)
                .is_some_and(FormOptionSetOptionView::is_selected);
            if reselected {
                continue;
            }
            let defaults_only = self
                .option_view(&name)
                .zip(self.stash.get(&name))
                .is_some_and(|(view, stashed)| *stashed == default_data(&view.items));
            if defaults_only || policy.confirm_discard(&name) {
                tracing::debug!(option_set = %self.set.name(), option = %name, "discarding stash");
                self.stash.remove(&name);
            }
        }
    }

    /// Re-derives the selection-count breaches from the multiselection
    /// policy, independent of nested field validity.
    fn extra_validation(&self, path: &PropertyPath, recording: &mut ValidationRecording) {
        let multiselection = self.set.multiselection();
        let Some(vpath) = ValidationRecordingPath::occurrences_at(
            path,
            multiselection.minimum(),
            multiselection.maximum(),
        ) else {
            return;
        };
        let selected = self.selected_count();
        if multiselection.minimum_breached(selected) {
            recording.breaks_minimum_occurrences(vpath.clone());
        }
        if multiselection.maximum_breached(selected) {
            recording.breaks_maximum_occurrences(vpath);
        }
    }
}

#[async_trait(?Send)]
impl OccurrenceView for FormOptionSetOccurrenceView {
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
        let (selected_names, from_defaults) = self.initial_selection();
        if from_defaults && !selected_names.is_empty() {
            let mut borrowed = self.data.borrow_mut();
            for name in &selected_names {
                borrowed.add_value(SELECTED_ARRAY, name.as_str());
            }
        }

        self.options = self
            .set
            .options()
            .iter()
            .map(|option| FormOptionSetOptionView::new(option.clone()))
            .collect();
        for view in &mut self.options {
            view.selected = selected_names.iter().any(|name| name == view.name());
        }
        self.laid_out = true;

        for position in 0..self.options.len() {
            if self.options[position].selected {
                self.layout_option(position, path, validate).await?;
            }
        }
        self.recompute_enabled();
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
        self.data = data;

        let (selected_names, _) = self.initial_selection();
        for position in 0..self.options.len() {
            let name = self.options[position].name().to_string();
            let now_selected = selected_names.iter().any(|candidate| *candidate == name);
            let was_selected = self.options[position].selected;
            self.options[position].selected = now_selected;
            match (was_selected, now_selected) {
                (false, true) | (true, true) if self.options[position].layer.is_none() => {
                    self.layout_option(position, path, false).await?;
                }
                (true, true) => {
                    let nested = {
                        let existing = self.data.borrow().get_set(&name, 0);
                        match existing {
                            Some(handle) => handle,
                            None => self.data.borrow_mut().add_set(&name),
                        }
                    };
                    let option_path = path.join_indexed(&name, 0);
                    if let Some(layer) = self.options[position].layer.as_mut() {
                        layer.update(nested, &option_path, unchanged_only).await?;
                    }
                }
                (true, false) => {
                    self.options[position].layer = None;
                }
                _ => {}
            }
        }
        self.recompute_enabled();
        Ok(())
    }

    fn validate(&mut self, path: &PropertyPath, silent: bool) -> Result<ValidationRecording> {
        self.ensure_laid_out()?;
        let mut recording = ValidationRecording::new();
        for position in 0..self.options.len() {
            if !self.options[position].selected {
                continue;
            }
            let name = self.options[position].name().to_string();
            let option_path = path.join_indexed(&name, 0);
            if let Some(layer) = self.options[position].layer.as_mut() {
                let child = layer.validate(&option_path, silent)?;
                recording.flatten(&child);
            }
        }
        self.extra_validation(path, &mut recording);

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
        for view in &mut self.options {
            if let Some(layer) = view.layer.as_mut() {
                layer.reset();
            }
        }
        self.previous = None;
        self.hide_errors = false;
    }

    fn clear_hide_errors(&mut self) {
        self.hide_errors = false;
        for view in &mut self.options {
            if let Some(layer) = view.layer.as_mut() {
                layer.clear_hide_errors();
            }
        }
    }

    fn set_display_errors(&mut self, display: bool) {
        self.display_errors = display;
        for view in &mut self.options {
            if let Some(layer) = view.layer.as_mut() {
                layer.set_display_errors(display);
            }
        }
    }

    fn dispose(&mut self) {
        for view in &mut self.options {
            if let Some(layer) = view.layer.as_mut() {
                layer.dispose();
            }
            view.layer = None;
        }
        self.laid_out = false;
    }
}

/// The data an option's nested items produce when only declared defaults are
/// applied. Field sets hoist into the same level; repeatable children
/// contribute nothing by default.
fn default_data(items: &[FormItem]) -> PropertySet {
    let mut set = PropertySet::new();
    fill_defaults(items, &mut set);
    set
}

fn fill_defaults(items: &[FormItem], set: &mut PropertySet) {
    for item in items {
        match item {
            FormItem::Input(input) => {
                if let Some(default) = input.default_value() {
                    set.set_string(input.name(), default);
                }
            }
            FormItem::FieldSet(field_set) => fill_defaults(field_set.items(), set),
            _ => {}
        }
    }
}
