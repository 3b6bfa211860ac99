//! The recursive composition layer.
//!
//! A [`FormItemLayer`] instantiates the correct view variant for each schema
//! node in a list and wires it to the corresponding data location. Dispatch
//! happens exactly once, at layout; updates go to the already-created views.
//! Nested sets recurse back into a fresh layer per occurrence, depth-first.

use std::rc::Rc;

use futures::future::try_join_all;

use crate::{
    Result,
    proptree::{PropertyPath, PropertySetHandle},
    schema::FormItem,
    validation::ValidationRecording,
};

use super::{
    errors::ViewError,
    events::FormContext,
    field_set::FieldSetView,
    input::InputView,
    item::FormItemView,
    option_set::FormOptionSetView,
    set::FormItemSetView,
};

/// Composes the views of one schema node list against one bound data set.
#[derive(Debug)]
pub struct FormItemLayer {
    items: Rc<Vec<FormItem>>,
    views: Vec<FormItemView>,
    ctx: FormContext,
    laid_out: bool,
}

impl FormItemLayer {
    /// Creates an unlaid layer over the given schema items.
    pub fn new(items: Rc<Vec<FormItem>>, ctx: FormContext) -> Self {
        Self {
            items,
            views: Vec::new(),
            ctx,
            laid_out: false,
        }
    }

    /// The schema items this layer composes.
    pub fn items(&self) -> &[FormItem] {
        &self.items
    }

    /// The created views, in schema order. Empty before layout; exactly one
    /// view per schema item afterwards.
    pub fn views(&self) -> &[FormItemView] {
        &self.views
    }

    /// Mutable access to the created views.
    pub fn views_mut(&mut self) -> &mut [FormItemView] {
        &mut self.views
    }

    /// The view with the given name, if any.
    pub fn view(&self, name: &str) -> Option<&FormItemView> {
        self.views.iter().find(|view| view.name() == name)
    }

    /// Mutable access to the view with the given name.
    pub fn view_mut(&mut self, name: &str) -> Option<&mut FormItemView> {
        self.views.iter_mut().find(|view| view.name() == name)
    }

    /// Whether layout has completed.
    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    pub(super) fn ctx(&self) -> &FormContext {
        &self.ctx
    }

    fn ensure_laid_out(&self) -> Result<()> {
        if !self.laid_out {
            return Err(ViewError::not_laid_out("layer").into());
        }
        Ok(())
    }

    fn create_view(item: &FormItem, ctx: &FormContext) -> FormItemView {
        match item {
            FormItem::Input(input) => {
                FormItemView::Input(InputView::new(input.clone(), ctx.clone()))
            }
            FormItem::FormItemSet(set) => {
                FormItemView::ItemSet(FormItemSetView::new(Rc::new(set.clone()), ctx.clone()))
            }
            FormItem::FormOptionSet(set) => {
                FormItemView::OptionSet(FormOptionSetView::new(Rc::new(set.clone()), ctx.clone()))
            }
            FormItem::FieldSet(field_set) => {
                FormItemView::FieldSet(FieldSetView::new(Rc::new(field_set.clone()), ctx.clone()))
            }
        }
    }

    /// Creates one view per schema item and lays them all out against
    /// `data`.
    ///
    /// Child layouts fan out as futures and the layer awaits them all before
    /// declaring itself laid out — callers that report "rendered" do so
    /// after this returns, once, not per child. Sequential inputs are
    /// chained for focus-next navigation.
    pub async fn layout(
        &mut self,
        data: PropertySetHandle,
        parent_path: &PropertyPath,
        validate: bool,
    ) -> Result<()> {
        if self.laid_out {
            return Err(ViewError::AlreadyLaidOut {
                view: "layer".to_string(),
            }
            .into());
        }
        self.views = self
            .items
            .iter()
            .map(|item| Self::create_view(item, &self.ctx))
            .collect();

        let input_positions: Vec<(usize, String)> = self
            .views
            .iter()
            .enumerate()
            .filter_map(|(position, view)| {
                view.as_input()
                    .map(|input| (position, input.name().to_string()))
            })
            .collect();
        for pair in input_positions.windows(2) {
            let position = pair[0].0;
            let next = pair[1].1.clone();
            if let Some(input) = self.views[position].as_input_mut() {
                input.set_next_focus(Some(next));
            }
        }

        try_join_all(
            self.views
                .iter_mut()
                .map(|view| view.layout(data.clone(), parent_path, validate)),
        )
        .await?;
        self.laid_out = true;
        tracing::trace!(path = %parent_path, views = self.views.len(), "layer laid out");
        Ok(())
    }

    /// Updates every view in place against a possibly different data set.
    ///
    /// The existing view instances are preserved; only their bindings and
    /// occurrence counts change.
    pub async fn update(
        &mut self,
        data: PropertySetHandle,
        parent_path: &PropertyPath,
        unchanged_only: bool,
    ) -> Result<()> {
        self.ensure_laid_out()?;
        try_join_all(
            self.views
                .iter_mut()
                .map(|view| view.update(data.clone(), parent_path, unchanged_only)),
        )
        .await?;
        Ok(())
    }

    /// Validates every view, flattening their recordings.
    pub fn validate(
        &mut self,
        parent_path: &PropertyPath,
        silent: bool,
    ) -> Result<ValidationRecording> {
        self.ensure_laid_out()?;
        let mut recording = ValidationRecording::new();
        for view in &mut self.views {
            let child = view.validate(parent_path, silent)?;
            recording.flatten(&child);
        }
        Ok(recording)
    }

    /// Restores defaults in every view.
    pub fn reset(&mut self) {
        for view in &mut self.views {
            view.reset();
        }
    }

    pub(super) fn clear_hide_errors(&mut self) {
        for view in &mut self.views {
            view.clear_hide_errors();
        }
    }

    pub(super) fn set_display_errors(&mut self, display: bool) {
        for view in &mut self.views {
            view.set_display_errors(display);
        }
    }

    pub(super) fn dispose(&mut self) {
        for view in &mut self.views {
            view.dispose();
        }
        self.views.clear();
        self.laid_out = false;
    }
}
