//! The view layer: recursive composition, occurrence control, and
//! validation propagation.
//!
//! Control flow: schema + data root feed the [`FormView`] facade, whose root
//! [`FormItemLayer`] walks the schema nodes. Each repeatable node delegates
//! to a [`FormSetOccurrences`] controller, which creates per-occurrence
//! views that recurse back into a fresh layer for their nested items.
//!
//! Validation flows the other way, bottom-up: leaf field validity, then
//! occurrence validity, then set and option-set validity, then form
//! validity. Each level stores the recording it produced last time and
//! notifies — through the form's [`EventBus`] — only when the new recording
//! differs.
//!
//! Everything here is single-threaded and cooperative: layout and update
//! are futures so a parent can fan out its children's layouts and await them
//! all before declaring itself laid out, but there is no preemption and no
//! parallelism.

pub mod errors;
pub mod events;
pub mod field_set;
pub mod form;
pub mod input;
pub mod item;
pub mod layer;
pub mod occurrences;
pub mod option_set;
pub mod set;

pub use errors::ViewError;
pub use events::{EventBus, FormContext, FormEvent, ValidityHook, ValidityHookCollection};
pub use field_set::FieldSetView;
pub use form::{FormView, FormViewConfig};
pub use input::InputView;
pub use item::FormItemView;
pub use layer::FormItemLayer;
pub use occurrences::{
    FormSetOccurrences, Occurrence, OccurrenceId, OccurrenceView, OccurrenceViewFactory,
};
pub use option_set::{
    CleanupPolicy, DiscardStashedData, FormOptionSetOccurrenceView, FormOptionSetOptionView,
    FormOptionSetView, KeepStashedData, SELECTED_ARRAY,
};
pub use set::{FormItemSetOccurrenceView, FormItemSetView};
