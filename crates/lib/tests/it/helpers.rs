//! Shared fixtures for the integration suite.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use formwork::{
    Occurrences,
    proptree::{PropertySet, PropertySetHandle},
    schema::{Form, FormItem, FormItemSet, FormOptionSet, FormOptionSetOption, Input},
    validation::ValidationRecording,
    view::ValidityHook,
};

/// A fresh, empty data root.
pub fn data_root() -> PropertySetHandle {
    PropertySet::new_handle()
}

/// A plain optional text input.
pub fn text_input(name: &str) -> Input {
    Input::builder(name).input_type("TextLine").build()
}

/// A required single-value text input.
pub fn required_input(name: &str) -> Input {
    Input::builder(name)
        .input_type("TextLine")
        .occurrences(Occurrences::required_one())
        .build()
}

/// A repeatable item set over the given nested items.
pub fn item_set(name: &str, minimum: u32, maximum: u32, items: Vec<FormItem>) -> FormItemSet {
    FormItemSet::builder(name)
        .occurrences(Occurrences::new(minimum, maximum).unwrap())
        .items(items)
        .build()
}

/// An exclusive (radio) option set with one text input per option.
pub fn exclusive_option_set(name: &str, option_names: &[&str]) -> FormOptionSet {
    let mut builder = FormOptionSet::builder(name)
        .occurrences(Occurrences::required_one())
        .multiselection(Occurrences::required_one());
    for option_name in option_names {
        builder = builder.option(
            FormOptionSetOption::builder(*option_name)
                .item(text_input(&format!("{option_name}_text")))
                .build(),
        );
    }
    builder.build()
}

/// A single-item form.
pub fn form_of(item: impl Into<FormItem>) -> Form {
    Form::new(vec![item.into()]).unwrap()
}

/// A validity hook counting its invocations.
pub struct CountingHook {
    calls: Arc<AtomicUsize>,
}

impl CountingHook {
    pub fn new() -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Arc::new(Self {
                calls: calls.clone(),
            }),
            calls,
        )
    }
}

impl ValidityHook for CountingHook {
    fn on_validity_changed(&self, _recording: &ValidationRecording) -> formwork::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
