//! Option sets: selection topologies, stash/restore, and cleanup.

use formwork::{
    FormView, Occurrences,
    proptree::PropertyPath,
    schema::{FormOptionSet, FormOptionSetOption},
    view::{DiscardStashedData, FormOptionSetView, KeepStashedData, SELECTED_ARRAY},
};

use crate::helpers::{data_root, exclusive_option_set, form_of, text_input};

fn option_set_view<'a>(form: &'a mut FormView, name: &str) -> &'a mut FormOptionSetView {
    form.view_mut(name)
        .and_then(|view| view.as_option_set_mut())
        .expect("option set view")
}

fn multi_option_set(maximum: u32) -> FormOptionSet {
    let mut builder = FormOptionSet::builder("choice")
        .occurrences(Occurrences::required_one())
        .multiselection(Occurrences::new(0, maximum).unwrap());
    for name in ["x", "y", "z"] {
        builder = builder.option(
            FormOptionSetOption::builder(name)
                .item(text_input(&format!("{name}_text")))
                .build(),
        );
    }
    builder.build()
}

#[tokio::test]
async fn test_exclusive_selection_keeps_single_slot() {
    let form = form_of(exclusive_option_set("choice", &["alpha", "beta"]));
    let data = data_root();
    let mut view = FormView::new(form, data.clone());
    view.layout(false).await.unwrap();
    let root = PropertyPath::root();

    let choice = option_set_view(&mut view, "choice");
    assert!(choice.select_option(0, "alpha", &root).await.unwrap());
    assert!(choice.select_option(0, "beta", &root).await.unwrap());

    let occurrence = choice.occurrences().view(0).unwrap();
    assert_eq!(occurrence.selected_names(), ["beta"]);
    // Exactly one entry in the selection slot.
    let selected = data.borrow().get_set("choice", 0).unwrap();
    assert_eq!(selected.borrow().array_len(SELECTED_ARRAY), 1);
    // The deselected option's nested view is hidden.
    let alpha = occurrence.option_view("alpha").unwrap();
    assert!(!alpha.is_selected());
    assert!(!alpha.has_nested_view());
    assert!(occurrence.option_view("beta").unwrap().has_nested_view());
}

#[tokio::test]
async fn test_stash_and_restore_preserves_typed_values() {
    let form = form_of(exclusive_option_set("choice", &["alpha", "beta"]));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();
    let root = PropertyPath::root();

    let choice = option_set_view(&mut view, "choice");
    choice.select_option(0, "alpha", &root).await.unwrap();
    choice
        .occurrences_mut()
        .view_mut(0)
        .unwrap()
        .option_view_mut("alpha")
        .unwrap()
        .layer_mut()
        .unwrap()
        .view_mut("alpha_text")
        .and_then(|v| v.as_input_mut())
        .unwrap()
        .set_value(0, "typed value")
        .unwrap();

    choice.select_option(0, "beta", &root).await.unwrap();
    assert!(choice.occurrences().view(0).unwrap().is_stashed("alpha"));

    choice.select_option(0, "alpha", &root).await.unwrap();
    let occurrence = choice.occurrences().view(0).unwrap();
    assert!(!occurrence.is_stashed("alpha"));
    let restored = occurrence
        .option_view("alpha")
        .unwrap()
        .layer()
        .unwrap()
        .view("alpha_text")
        .and_then(|v| v.as_input())
        .unwrap()
        .values()
        .unwrap();
    assert_eq!(restored[0].as_string(), Some("typed value"));
}

#[tokio::test]
async fn test_multi_selection_enforces_maximum() {
    let form = form_of(multi_option_set(2));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();
    let root = PropertyPath::root();

    let choice = option_set_view(&mut view, "choice");
    assert!(choice.select_option(0, "x", &root).await.unwrap());
    assert!(choice.select_option(0, "y", &root).await.unwrap());

    // The remaining unchecked option is disabled at the maximum.
    let occurrence = choice.occurrences().view(0).unwrap();
    assert!(!occurrence.option_view("z").unwrap().is_enabled());
    assert!(occurrence.option_view("x").unwrap().is_enabled());

    // And selecting it is refused.
    assert!(!choice.select_option(0, "z", &root).await.unwrap());
    assert_eq!(choice.occurrences().view(0).unwrap().selected_count(), 2);
}

#[tokio::test]
async fn test_deselect_reenables_disabled_options() {
    let form = form_of(multi_option_set(2));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();
    let root = PropertyPath::root();

    let choice = option_set_view(&mut view, "choice");
    choice.select_option(0, "x", &root).await.unwrap();
    choice.select_option(0, "y", &root).await.unwrap();
    choice.deselect_option(0, "x", &root).unwrap();

    let occurrence = choice.occurrences().view(0).unwrap();
    assert!(occurrence.option_view("z").unwrap().is_enabled());
    assert_eq!(occurrence.selected_names(), ["y"]);
}

#[tokio::test]
async fn test_default_options_selected_in_fresh_data() {
    let form = form_of(
        FormOptionSet::builder("choice")
            .multiselection(Occurrences::required_one())
            .option(FormOptionSetOption::builder("plain").build())
            .option(
                FormOptionSetOption::builder("fancy")
                    .default_option(true)
                    .build(),
            )
            .build(),
    );
    let data = data_root();
    let mut view = FormView::new(form, data.clone());
    view.layout(false).await.unwrap();

    let choice = option_set_view(&mut view, "choice");
    let occurrence = choice.occurrences().view(0).unwrap();
    assert_eq!(occurrence.selected_names(), ["fancy"]);
    // The derived default selection is written back to the data.
    let nested = data.borrow().get_set("choice", 0).unwrap();
    let selected = nested.borrow().string(SELECTED_ARRAY);
    assert_eq!(selected.as_deref(), Some("fancy"));
}

#[tokio::test]
async fn test_selection_count_validation() {
    let form = form_of(exclusive_option_set("choice", &["alpha", "beta"]));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();
    let root = PropertyPath::root();

    // Nothing selected under a min=1 multiselection: invalid.
    let recording = view.validate(true, false).unwrap();
    assert!(!recording.is_valid());
    assert!(recording.breaks_minimum_at("choice[0]"));

    let choice = option_set_view(&mut view, "choice");
    choice.select_option(0, "alpha", &root).await.unwrap();
    let recording = view.validate(true, false).unwrap();
    assert!(recording.is_valid());
}

#[tokio::test]
async fn test_clean_respects_policy() {
    let form = form_of(exclusive_option_set("choice", &["alpha", "beta"]));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();
    let root = PropertyPath::root();

    let choice = option_set_view(&mut view, "choice");
    choice.select_option(0, "alpha", &root).await.unwrap();
    choice
        .occurrences_mut()
        .view_mut(0)
        .unwrap()
        .option_view_mut("alpha")
        .unwrap()
        .layer_mut()
        .unwrap()
        .view_mut("alpha_text")
        .and_then(|v| v.as_input_mut())
        .unwrap()
        .set_value(0, "precious")
        .unwrap();
    choice.select_option(0, "beta", &root).await.unwrap();
    assert!(choice.occurrences().view(0).unwrap().is_stashed("alpha"));

    // The default policy keeps non-default data.
    choice.clean(&KeepStashedData).unwrap();
    assert!(choice.occurrences().view(0).unwrap().is_stashed("alpha"));

    // A confirming policy discards it.
    choice.clean(&DiscardStashedData).unwrap();
    assert!(!choice.occurrences().view(0).unwrap().is_stashed("alpha"));
}
