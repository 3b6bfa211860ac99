//! The form item model: a tagged-variant schema tree.
//!
//! A form definition is an ordered tree of [`FormItem`] nodes: leaf
//! [`Input`]s, repeatable [`FormItemSet`]s, selectable [`FormOptionSet`]s,
//! and purely visual [`FieldSet`] groupings. Schema objects are constructed
//! once — from JSON via [`Form::from_json`] or programmatically via the
//! builders — validated eagerly, and immutable for the lifetime of a
//! rendering session.
//!
//! Serialization round-trips losslessly through the tagged-wrapper shape
//! (`{"Input": {...}}` and friends); see [`Form::to_json`].

pub mod errors;
pub mod field_set;
pub mod form;
pub mod input;
pub mod item;
pub mod option_set;
pub mod set;

pub use errors::SchemaError;
pub use field_set::{FieldSet, FieldSetBuilder};
pub use form::Form;
pub use input::{Input, InputBuilder};
pub use item::FormItem;
pub use option_set::{
    FormOptionSet, FormOptionSetBuilder, FormOptionSetOption, FormOptionSetOptionBuilder,
};
pub use set::{FormItemSet, FormItemSetBuilder};
