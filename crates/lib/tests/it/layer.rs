//! The recursive composition layer: dispatch, field-set transparency, and
//! update semantics.

use formwork::{
    FormView,
    schema::{FieldSet, Form},
};

use crate::helpers::{data_root, form_of, item_set, text_input};

#[tokio::test]
async fn test_one_view_per_schema_item_in_order() {
    let form = Form::new(vec![
        text_input("title").into(),
        item_set("entries", 0, 2, vec![text_input("text").into()]).into(),
        FieldSet::builder("meta")
            .item(text_input("keywords"))
            .build()
            .into(),
    ])
    .unwrap();
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();

    let names: Vec<&str> = view.views().iter().map(|v| v.name()).collect();
    assert_eq!(names, ["title", "entries", "meta"]);
}

#[tokio::test]
async fn test_field_set_binds_to_parent_data_set() {
    let form = form_of(
        FieldSet::builder("meta")
            .item(text_input("keywords"))
            .build(),
    );
    let data = data_root();
    let mut view = FormView::new(form, data.clone());
    view.layout(false).await.unwrap();

    let input = view
        .view_mut("meta")
        .and_then(|v| v.as_field_set_mut())
        .and_then(|fs| fs.layer_mut().view_mut("keywords"))
        .and_then(|v| v.as_input_mut())
        .unwrap();
    input.set_value(0, "cms, forms").unwrap();

    // No new path level: the value lives directly on the root data set.
    assert_eq!(data.borrow().string("keywords").as_deref(), Some("cms, forms"));
}

#[tokio::test]
async fn test_sequential_inputs_are_focus_chained() {
    let form = Form::new(vec![
        text_input("first").into(),
        text_input("second").into(),
        text_input("third").into(),
    ])
    .unwrap();
    let mut view = FormView::new(form, data_root());
    view.layout(false).await.unwrap();

    let next: Vec<Option<&str>> = view
        .views()
        .iter()
        .map(|v| v.as_input().unwrap().next_focus())
        .collect();
    assert_eq!(next, [Some("second"), Some("third"), None]);
}

#[tokio::test]
async fn test_default_value_applied_to_fresh_data() {
    let form = form_of(
        formwork::schema::Input::builder("title")
            .default_value("untitled")
            .build(),
    );
    let data = data_root();
    let mut view = FormView::new(form, data.clone());
    view.layout(false).await.unwrap();

    assert_eq!(data.borrow().string("title").as_deref(), Some("untitled"));
}

#[tokio::test]
async fn test_update_rebinds_leaf_values() {
    let form = form_of(text_input("title"));
    let data = data_root();
    data.borrow_mut().set_string("title", "old");
    let mut view = FormView::new(form, data);
    view.layout(false).await.unwrap();

    let fresh = data_root();
    fresh.borrow_mut().set_string("title", "new");
    view.update(fresh, false).await.unwrap();

    let input = view.view("title").and_then(|v| v.as_input()).unwrap();
    assert_eq!(input.values().unwrap()[0].as_string(), Some("new"));
}

#[tokio::test]
async fn test_update_unchanged_only_preserves_edits() {
    let form = form_of(text_input("title"));
    let data = data_root();
    data.borrow_mut().set_string("title", "draft");
    let mut view = FormView::new(form, data);
    view.layout(false).await.unwrap();

    // The user keeps typing while a stale data set arrives.
    view.view_mut("title")
        .and_then(|v| v.as_input_mut())
        .unwrap()
        .set_value(0, "draft, edited")
        .unwrap();

    let stale = data_root();
    stale.borrow_mut().set_string("title", "server copy");
    view.update(stale, true).await.unwrap();

    let input = view.view("title").and_then(|v| v.as_input()).unwrap();
    assert_eq!(input.values().unwrap()[0].as_string(), Some("draft, edited"));
}
