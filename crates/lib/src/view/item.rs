//! The view sum type: one variant per form item kind.

use futures::future::LocalBoxFuture;

use crate::{
    Result,
    proptree::{PropertyPath, PropertySetHandle},
    validation::ValidationRecording,
};

use super::{
    field_set::FieldSetView, input::InputView, option_set::FormOptionSetView,
    set::FormItemSetView,
};

/// The view of one schema node.
///
/// The composition layer picks the variant once per layout pass by
/// exhaustive match on the schema item; no re-dispatch happens on update.
/// Layout and update futures are boxed — the view tree is recursive (sets
/// own layers own views), and the indirection keeps the future types finite.
#[derive(Debug)]
pub enum FormItemView {
    Input(InputView),
    ItemSet(FormItemSetView),
    OptionSet(FormOptionSetView),
    FieldSet(FieldSetView),
}

impl FormItemView {
    /// The underlying schema node's name.
    pub fn name(&self) -> &str {
        match self {
            FormItemView::Input(view) => view.name(),
            FormItemView::ItemSet(view) => view.name(),
            FormItemView::OptionSet(view) => view.name(),
            FormItemView::FieldSet(view) => view.name(),
        }
    }

    /// Whether this view renders a purely visual grouping.
    pub fn is_layout(&self) -> bool {
        matches!(self, FormItemView::FieldSet(_))
    }

    /// Lays the view out against `data` under `parent_path`.
    pub fn layout<'a>(
        &'a mut self,
        data: PropertySetHandle,
        parent_path: &'a PropertyPath,
        validate: bool,
    ) -> LocalBoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match self {
                FormItemView::Input(view) => view.layout(data, parent_path, validate).await,
                FormItemView::ItemSet(view) => view.layout(data, parent_path, validate).await,
                FormItemView::OptionSet(view) => view.layout(data, parent_path, validate).await,
                FormItemView::FieldSet(view) => view.layout(data, parent_path, validate).await,
            }
        })
    }

    /// Rebinds the view to `data` and updates it in place.
    pub fn update<'a>(
        &'a mut self,
        data: PropertySetHandle,
        parent_path: &'a PropertyPath,
        unchanged_only: bool,
    ) -> LocalBoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match self {
                FormItemView::Input(view) => {
                    view.update(data, parent_path, unchanged_only).await
                }
                FormItemView::ItemSet(view) => {
                    view.update(data, parent_path, unchanged_only).await
                }
                FormItemView::OptionSet(view) => {
                    view.update(data, parent_path, unchanged_only).await
                }
                FormItemView::FieldSet(view) => {
                    view.update(data, parent_path, unchanged_only).await
                }
            }
        })
    }

    /// Computes the view's validation recording.
    pub fn validate(
        &mut self,
        parent_path: &PropertyPath,
        silent: bool,
    ) -> Result<ValidationRecording> {
        match self {
            FormItemView::Input(view) => view.validate(parent_path, silent),
            FormItemView::ItemSet(view) => view.validate(parent_path, silent),
            FormItemView::OptionSet(view) => view.validate(parent_path, silent),
            FormItemView::FieldSet(view) => view.validate(parent_path, silent),
        }
    }

    /// Restores defaults and clears validation baselines.
    pub fn reset(&mut self) {
        match self {
            FormItemView::Input(view) => view.reset(),
            FormItemView::ItemSet(view) => view.reset(),
            FormItemView::OptionSet(view) => view.reset(),
            FormItemView::FieldSet(view) => view.reset(),
        }
    }

    pub(super) fn clear_hide_errors(&mut self) {
        match self {
            FormItemView::Input(view) => view.clear_hide_errors(),
            FormItemView::ItemSet(view) => view.clear_hide_errors(),
            FormItemView::OptionSet(view) => view.clear_hide_errors(),
            FormItemView::FieldSet(view) => view.clear_hide_errors(),
        }
    }

    pub(super) fn set_display_errors(&mut self, display: bool) {
        match self {
            FormItemView::Input(view) => view.set_display_errors(display),
            FormItemView::ItemSet(view) => view.set_display_errors(display),
            FormItemView::OptionSet(view) => view.set_display_errors(display),
            FormItemView::FieldSet(view) => view.set_display_errors(display),
        }
    }

    pub(super) fn dispose(&mut self) {
        match self {
            FormItemView::Input(view) => view.dispose(),
            FormItemView::ItemSet(view) => view.dispose(),
            FormItemView::OptionSet(view) => view.dispose(),
            FormItemView::FieldSet(view) => view.dispose(),
        }
    }

    /// This view as an input view, if it is one.
    pub fn as_input(&self) -> Option<&InputView> {
        match self {
            FormItemView::Input(view) => Some(view),
            _ => None,
        }
    }

    /// This view as a mutable input view, if it is one.
    pub fn as_input_mut(&mut self) -> Option<&mut InputView> {
        match self {
            FormItemView::Input(view) => Some(view),
            _ => None,
        }
    }

    /// This view as an item-set view, if it is one.
    pub fn as_item_set(&self) -> Option<&FormItemSetView> {
        match self {
            FormItemView::ItemSet(view) => Some(view),
            _ => None,
        }
    }

    /// This view as a mutable item-set view, if it is one.
    pub fn as_item_set_mut(&mut self) -> Option<&mut FormItemSetView> {
        match self {
            FormItemView::ItemSet(view) => Some(view),
            _ => None,
        }
    }

    /// This view as an option-set view, if it is one.
    pub fn as_option_set(&self) -> Option<&FormOptionSetView> {
        match self {
            FormItemView::OptionSet(view) => Some(view),
            _ => None,
        }
    }

    /// This view as a mutable option-set view, if it is one.
    pub fn as_option_set_mut(&mut self) -> Option<&mut FormOptionSetView> {
        match self {
            FormItemView::OptionSet(view) => Some(view),
            _ => None,
        }
    }

    /// This view as a field-set view, if it is one.
    pub fn as_field_set(&self) -> Option<&FieldSetView> {
        match self {
            FormItemView::FieldSet(view) => Some(view),
            _ => None,
        }
    }

    /// This view as a mutable field-set view, if it is one.
    pub fn as_field_set_mut(&mut self) -> Option<&mut FieldSetView> {
        match self {
            FormItemView::FieldSet(view) => Some(view),
            _ => None,
        }
    }
}
