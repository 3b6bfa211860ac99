//! Occurrence controllers: cardinality enforcement and index bookkeeping.

use formwork::{FormView, proptree::PropertyPath, view::FormItemSetView};

use crate::helpers::{data_root, form_of, item_set, text_input};

fn set_view(form: &mut FormView) -> &mut FormItemSetView {
    form.view_mut("entries")
        .and_then(|view| view.as_item_set_mut())
        .expect("entries view")
}

#[tokio::test]
async fn test_layout_derives_count_from_minimum() {
    let form = form_of(item_set("entries", 1, 3, vec![text_input("text").into()]));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();

    let entries = set_view(&mut view);
    assert_eq!(entries.occurrences().count(), 1);
    // The backing array was grown to match.
    assert_eq!(entries.occurrences().data_len(), 1);
}

#[tokio::test]
async fn test_add_refused_at_maximum() {
    let form = form_of(item_set("entries", 1, 3, vec![text_input("text").into()]));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();
    let root = PropertyPath::root();

    let entries = set_view(&mut view);
    assert!(entries.add_occurrence(1, false, &root).await.unwrap().is_some());
    assert!(entries.add_occurrence(2, false, &root).await.unwrap().is_some());
    assert_eq!(entries.occurrences().count(), 3);

    // Capacity rejection is a checked no-op, not an error.
    assert!(entries.add_occurrence(3, false, &root).await.unwrap().is_none());
    assert_eq!(entries.occurrences().count(), 3);
}

#[tokio::test]
async fn test_indices_equal_positions_after_mutations() {
    let form = form_of(item_set("entries", 0, 0, vec![text_input("text").into()]));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();
    let root = PropertyPath::root();

    let entries = set_view(&mut view);
    for _ in 0..3 {
        entries
            .add_occurrence(entries.occurrences().count(), false, &root)
            .await
            .unwrap();
    }
    let id = entries.occurrences().occurrence(1).unwrap().id();
    entries.remove_occurrence(id, &root).await.unwrap();
    entries.move_occurrence(0, 2, &root).unwrap();

    let controller = entries.occurrences();
    for index in 0..controller.count() {
        assert_eq!(controller.occurrence(index).unwrap().index(), index);
    }
    assert_eq!(controller.count(), controller.ids().len());
    assert_eq!(controller.count(), controller.occurrences().count());
}

#[tokio::test]
async fn test_remove_below_minimum_re_adds_blank() {
    let form = form_of(item_set("entries", 1, 3, vec![text_input("text").into()]));
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();
    let root = PropertyPath::root();

    let entries = set_view(&mut view);
    let id = entries.occurrences().occurrence(0).unwrap().id();
    entries.remove_occurrence(id, &root).await.unwrap();

    // The minimum is re-derived from live data size vs. the schema minimum.
    assert_eq!(entries.occurrences().count(), 1);
    assert_ne!(entries.occurrences().occurrence(0).unwrap().id(), id);
}

#[tokio::test]
async fn test_move_reorders_data_array() {
    let form = form_of(item_set("entries", 0, 0, vec![text_input("text").into()]));
    let data = data_root();
    for value in ["first", "second", "third"] {
        let nested = data.borrow_mut().add_set("entries");
        nested.borrow_mut().set_string("text", value);
    }
    let mut view = FormView::new(form, data.clone());
    view.layout(false).await.unwrap();
    let root = PropertyPath::root();

    set_view(&mut view).move_occurrence(0, 2, &root).unwrap();

    let order: Vec<String> = (0..3)
        .map(|index| {
            data.borrow()
                .get_set("entries", index)
                .unwrap()
                .borrow()
                .string("text")
                .unwrap()
        })
        .collect();
    assert_eq!(order, ["second", "third", "first"]);
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let form = form_of(item_set("entries", 0, 0, vec![text_input("text").into()]));
    let data = data_root();
    for value in ["a", "b"] {
        let nested = data.borrow_mut().add_set("entries");
        nested.borrow_mut().set_string("text", value);
    }
    let mut view = FormView::new(form, data.clone());
    view.layout(false).await.unwrap();

    let ids_before = set_view(&mut view).occurrences().ids().to_vec();
    view.update(data.clone(), false).await.unwrap();
    let ids_between = set_view(&mut view).occurrences().ids().to_vec();
    view.update(data, false).await.unwrap();
    let ids_after = set_view(&mut view).occurrences().ids().to_vec();

    assert_eq!(ids_before, ids_between);
    assert_eq!(ids_between, ids_after);

    let first = view.validate(true, false).unwrap();
    let second = view.validate(true, false).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_update_reconciles_to_new_array_size() {
    let form = form_of(item_set("entries", 0, 0, vec![text_input("text").into()]));
    let data = data_root();
    for value in ["a", "b", "c"] {
        let nested = data.borrow_mut().add_set("entries");
        nested.borrow_mut().set_string("text", value);
    }
    let mut view = FormView::new(form, data.clone());
    view.layout(false).await.unwrap();
    assert_eq!(set_view(&mut view).occurrences().count(), 3);

    let smaller = data_root();
    let nested = smaller.borrow_mut().add_set("entries");
    nested.borrow_mut().set_string("text", "only");
    view.update(smaller, false).await.unwrap();

    let entries = set_view(&mut view);
    assert_eq!(entries.occurrences().count(), 1);
    let occurrence = entries.occurrences().view(0).unwrap();
    let text = occurrence
        .layer()
        .view("text")
        .and_then(|v| v.as_input())
        .unwrap()
        .values()
        .unwrap();
    assert_eq!(text[0].as_string(), Some("only"));
}

#[tokio::test]
async fn test_operations_before_layout_are_fatal() {
    let form = form_of(item_set("entries", 1, 3, vec![text_input("text").into()]));
    let mut view = FormView::new(form, data_root());

    let err = view.validate(false, false).unwrap_err();
    assert!(err.is_not_laid_out());

    let err = view.update(data_root(), false).await.unwrap_err();
    assert!(err.is_not_laid_out());
}
