//! The view of a purely visual field-set grouping.

use std::rc::Rc;

use crate::{
    Result,
    proptree::{PropertyPath, PropertySetHandle},
    schema::FieldSet,
    validation::ValidationRecording,
};

use super::{
    errors::ViewError,
    events::{FormContext, FormEvent},
    layer::FormItemLayer,
};

/// A non-repeating visual grouping.
///
/// Lays out its children directly against the *same* data set and path as
/// its own parent — a field set contributes no new array or path level, and
/// its validation is a transparent pass-through of its children's.
#[derive(Debug)]
pub struct FieldSetView {
    field_set: Rc<FieldSet>,
    layer: FormItemLayer,
    ctx: FormContext,
    laid_out: bool,
}

impl FieldSetView {
    /// Creates an unlaid view for the given schema field set.
    pub fn new(field_set: Rc<FieldSet>, ctx: FormContext) -> Self {
        let layer = FormItemLayer::new(Rc::new(field_set.items().to_vec()), ctx.clone());
        Self {
            field_set,
            layer,
            ctx,
            laid_out: false,
        }
    }

    /// The field set's name.
    pub fn name(&self) -> &str {
        self.field_set.name()
    }

    /// Whether layout has completed.
    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    /// The grouped children's composition layer.
    pub fn layer(&self) -> &FormItemLayer {
        &self.layer
    }

    /// Mutable access to the grouped children's composition layer.
    pub fn layer_mut(&mut self) -> &mut FormItemLayer {
        &mut self.layer
    }

    fn ensure_laid_out(&self) -> Result<()> {
        if !self.laid_out {
            return Err(ViewError::not_laid_out(self.field_set.name()).into());
        }
        Ok(())
    }

    /// Lays out the grouped children against the parent's own data set.
    pub async fn layout(
        &mut self,
        data: PropertySetHandle,
        parent_path: &PropertyPath,
        validate: bool,
    ) -> Result<()> {
        self.layer.layout(data, parent_path, validate).await?;
        self.laid_out = true;
        self.ctx.bus().emit(FormEvent::Rendered {
            path: parent_path.join(self.field_set.name()),
        });
        Ok(())
    }

    /// Updates the grouped children in place.
    pub async fn update(
        &mut self,
        data: PropertySetHandle,
        parent_path: &PropertyPath,
        unchanged_only: bool,
    ) -> Result<()> {
        self.ensure_laid_out()?;
        self.layer.update(data, parent_path, unchanged_only).await
    }

    /// Transparent pass-through of the children's recordings.
    pub fn validate(
        &mut self,
        parent_path: &PropertyPath,
        silent: bool,
    ) -> Result<ValidationRecording> {
        self.ensure_laid_out()?;
        self.layer.validate(parent_path, silent)
    }

    /// Restores defaults in every grouped child.
    pub fn reset(&mut self) {
        self.layer.reset();
    }

    pub(super) fn clear_hide_errors(&mut self) {
        self.layer.clear_hide_errors();
    }

    pub(super) fn set_display_errors(&mut self, display: bool) {
        self.layer.set_display_errors(display);
    }

    pub(super) fn dispose(&mut self) {
        self.layer.dispose();
        self.laid_out = false;
    }
}
