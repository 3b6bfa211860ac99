//! The facade: validation propagation, notification discipline, events.

use formwork::{
    FormView,
    proptree::PropertyPath,
    schema::{Form, Input},
    view::{FormEvent, FormViewConfig, OccurrenceView},
};

use crate::helpers::{
    CountingHook, data_root, form_of, item_set, required_input, text_input,
};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_validity_notified_at_most_once_without_change() {
    let form = form_of(required_input("title"));
    let mut view = FormView::new(form, data_root());
    let (hook, calls) = CountingHook::new();
    view.on_validity_changed(hook);
    view.layout(false).await.unwrap();

    view.validate(false, false).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // No intervening data change: the second pass stays silent.
    view.validate(false, false).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_validity_notified_again_on_change() {
    let form = form_of(required_input("title"));
    let mut view = FormView::new(form, data_root());
    let (hook, calls) = CountingHook::new();
    view.on_validity_changed(hook);
    view.layout(false).await.unwrap();

    assert!(!view.validate(false, false).unwrap().is_valid());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    view.view_mut("title")
        .and_then(|v| v.as_input_mut())
        .unwrap()
        .set_value(0, "filled in")
        .unwrap();
    assert!(view.validate(false, false).unwrap().is_valid());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_force_notify_overrides_suppression() {
    let form = form_of(text_input("title"));
    let mut view = FormView::new(form, data_root());
    let (hook, calls) = CountingHook::new();
    view.on_validity_changed(hook);
    view.layout(false).await.unwrap();

    view.validate(false, false).unwrap();
    view.validate(false, true).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_silent_validation_never_notifies() {
    let form = form_of(required_input("title"));
    let mut view = FormView::new(form, data_root());
    let (hook, calls) = CountingHook::new();
    view.on_validity_changed(hook);
    view.layout(false).await.unwrap();

    view.validate(true, false).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_layout_with_validation_establishes_baseline() {
    let form = form_of(required_input("title"));
    let mut view = FormView::new(form, data_root());
    let (hook, calls) = CountingHook::new();
    view.on_validity_changed(hook);

    // The layout pass validates silently; no spurious changed notification.
    view.layout(true).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!view.is_valid());

    // An unchanged explicit pass is then also quiet.
    view.validate(false, false).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_validate_before_layout_is_fatal() {
    let form = form_of(text_input("title"));
    let mut view = FormView::new(form, data_root());
    assert!(view.validate(false, false).unwrap_err().is_not_laid_out());
}

#[tokio::test]
async fn test_double_layout_is_fatal() {
    let form = form_of(text_input("title"));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();
    assert!(view.layout(false).await.is_err());
}

#[tokio::test]
async fn test_validity_aggregates_across_levels() {
    let form = Form::new(vec![
        required_input("title").into(),
        item_set("entries", 1, 3, vec![required_input("text").into()]).into(),
    ])
    .unwrap();
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();

    let recording = view.validate(true, false).unwrap();
    assert!(!recording.is_valid());
    assert!(recording.breaks_minimum_at("title"));
    assert!(recording.breaks_minimum_at("entries[0].text"));

    view.view_mut("title")
        .and_then(|v| v.as_input_mut())
        .unwrap()
        .set_value(0, "hello")
        .unwrap();
    view.view_mut("entries")
        .and_then(|v| v.as_item_set_mut())
        .unwrap()
        .occurrences_mut()
        .view_mut(0)
        .unwrap()
        .layer_mut()
        .view_mut("text")
        .and_then(|v| v.as_input_mut())
        .unwrap()
        .set_value(0, "world")
        .unwrap();

    assert!(view.validate(true, false).unwrap().is_valid());
    assert!(view.is_valid());
}

#[tokio::test]
async fn test_numeric_input_records_field_error() {
    let form = form_of(Input::builder("count").input_type("Long").build());
    let data = data_root();
    data.borrow_mut().set_string("count", "not a number");
    let mut view = FormView::new(form, data);
    view.layout(false).await.unwrap();

    let recording = view.validate(true, false).unwrap();
    assert!(!recording.is_valid());
    assert!(recording.error_at("count[0]").is_some());
}

#[tokio::test]
async fn test_fresh_occurrence_hides_errors_until_explicit_validate() {
    let form = form_of(item_set("entries", 0, 3, vec![required_input("text").into()]));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();
    let root = PropertyPath::root();

    let entries = view
        .view_mut("entries")
        .and_then(|v| v.as_item_set_mut())
        .unwrap();
    entries.add_occurrence(1, false, &root).await.unwrap();
    assert!(entries.occurrences().view(1).unwrap().hides_errors());

    // An explicit validation pass un-hides the fresh block.
    view.validate(false, false).unwrap();
    let entries = view.view("entries").and_then(|v| v.as_item_set()).unwrap();
    assert!(!entries.occurrences().view(1).unwrap().hides_errors());
}

#[tokio::test]
async fn test_events_report_lifecycle() {
    let form = form_of(item_set("entries", 0, 3, vec![text_input("text").into()]));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();
    let root = PropertyPath::root();

    let events = view.drain_events();
    // The set reports rendered once, after its children; the form root last.
    assert!(events.iter().any(|event| matches!(
        event,
        FormEvent::Rendered { path } if path.to_string() == "entries"
    )));
    assert!(matches!(
        events.last(),
        Some(FormEvent::Rendered { path }) if path.is_root()
    ));

    view.view_mut("entries")
        .and_then(|v| v.as_item_set_mut())
        .unwrap()
        .add_occurrence(1, false, &root)
        .await
        .unwrap();
    let events = view.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        FormEvent::OccurrenceAdded { index: 1, .. }
    )));
}

#[tokio::test]
async fn test_reset_restores_defaults() {
    let form = form_of(Input::builder("title").default_value("untitled").build());
    let data = data_root();
    let mut view = FormView::new(form, data.clone());
    view.layout(false).await.unwrap();

    view.view_mut("title")
        .and_then(|v| v.as_input_mut())
        .unwrap()
        .set_value(0, "changed")
        .unwrap();
    assert_eq!(data.borrow().string("title").as_deref(), Some("changed"));

    view.reset().unwrap();
    assert_eq!(data.borrow().string("title").as_deref(), Some("untitled"));
}

#[tokio::test]
async fn test_show_empty_occurrences_config() {
    let schema = || form_of(item_set("entries", 0, 3, vec![text_input("text").into()]));

    let mut shown = FormView::with_config(
        schema(),
        data_root(),
        FormViewConfig {
            show_empty_occurrences: true,
        },
    );
    shown.layout(false).await.unwrap();
    let entries = shown.view("entries").and_then(|v| v.as_item_set()).unwrap();
    assert_eq!(entries.occurrences().count(), 1);

    let mut hidden = FormView::with_config(
        schema(),
        data_root(),
        FormViewConfig {
            show_empty_occurrences: false,
        },
    );
    hidden.layout(false).await.unwrap();
    let entries = hidden.view("entries").and_then(|v| v.as_item_set()).unwrap();
    assert_eq!(entries.occurrences().count(), 0);
}

#[tokio::test]
async fn test_display_validation_errors_flag_recurses() {
    let form = form_of(text_input("title"));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();

    assert!(view.displays_validation_errors());
    view.display_validation_errors(false);
    assert!(!view.displays_validation_errors());
    let input = view.view("title").and_then(|v| v.as_input()).unwrap();
    assert!(!input.displays_errors());
}
