//! Form construction and the tagged-wrapper JSON shape.

use formwork::{
    Occurrences,
    schema::{FieldSet, Form, FormItemSet, FormOptionSet, FormOptionSetOption, Input},
};

use crate::helpers::text_input;

fn complex_form() -> Form {
    Form::new(vec![
        Input::builder("title")
            .label("Title")
            .occurrences(Occurrences::required_one())
            .default_value("untitled")
            .build()
            .into(),
        FormItemSet::builder("links")
            .label("Links")
            .occurrences(Occurrences::new(0, 5).unwrap())
            .item(text_input("url"))
            .item(text_input("text"))
            .build()
            .into(),
        FormOptionSet::builder("media")
            .multiselection(Occurrences::required_one())
            .option(
                FormOptionSetOption::builder("image")
                    .item(text_input("caption"))
                    .build(),
            )
            .option(
                FormOptionSetOption::builder("video")
                    .default_option(true)
                    .item(text_input("duration"))
                    .build(),
            )
            .build()
            .into(),
        FieldSet::builder("metadata")
            .label("Metadata")
            .item(text_input("keywords"))
            .build()
            .into(),
    ])
    .unwrap()
}

#[test]
fn test_json_round_trip_preserves_schema() {
    let form = complex_form();
    let json = form.to_json();
    let back = Form::from_value(&json).unwrap();
    assert_eq!(form, back);
}

#[test]
fn test_json_round_trip_through_string_form() {
    let form = complex_form();
    let back = Form::from_json(&form.to_json_string()).unwrap();
    assert_eq!(form, back);
}

#[test]
fn test_tagged_wrapper_shape() {
    let form = complex_form();
    let json = form.to_json();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert!(items[0].get("Input").is_some());
    assert!(items[1].get("FormItemSet").is_some());
    assert!(items[2].get("FormOptionSet").is_some());
    assert!(items[3].get("FieldSet").is_some());

    // Occurrences serialize as the exact persisted shape.
    assert_eq!(
        items[1]["FormItemSet"]["occurrences"],
        serde_json::json!({"minimum": 0, "maximum": 5})
    );
}

#[test]
fn test_unknown_item_type_is_fatal() {
    let json = serde_json::json!({
        "items": [
            {"Input": {"name": "title", "inputType": "TextLine"}},
            {"Carousel": {"name": "gallery"}}
        ]
    });
    let err = Form::from_value(&json).unwrap_err();
    assert!(err.is_unknown_item_type());
}

#[test]
fn test_duplicate_sibling_name_is_fatal() {
    let json = serde_json::json!({
        "items": [
            {"Input": {"name": "title", "inputType": "TextLine"}},
            {"Input": {"name": "title", "inputType": "TextArea"}}
        ]
    });
    let err = Form::from_value(&json).unwrap_err();
    assert!(err.is_duplicate_name());
}

#[test]
fn test_invalid_occurrence_bounds_are_fatal() {
    let json = serde_json::json!({
        "items": [
            {"FormItemSet": {"name": "links", "occurrences": {"minimum": 4, "maximum": 2}}}
        ]
    });
    assert!(Form::from_value(&json).is_err());
}

#[test]
fn test_nested_levels_validated_recursively() {
    let json = serde_json::json!({
        "items": [
            {"FormItemSet": {"name": "links", "items": [
                {"Input": {"name": "url", "inputType": "TextLine"}},
                {"Input": {"name": "url", "inputType": "TextLine"}}
            ]}}
        ]
    });
    let err = Form::from_value(&json).unwrap_err();
    assert!(err.is_duplicate_name());
}
