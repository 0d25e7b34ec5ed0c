//! Form engine properties
//!
//! Rendering defaults, section add/order/remove, array item edits and the
//! two empty render states.

use examdesk_forms::{
    render, ArrayEdit, ArrayFieldControl, Control, FieldValue, FormData, FormRenderer,
    RenderOutcome, SectionInstance, SectionView, UploadStates,
};
use examdesk_schema::{FieldDef, SchemaRegistry};
use examdesk_test_utils::{intro_registry, intro_schema};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use proptest::sample::Index;

fn assert_blank(control: &Control) {
    match control.items() {
        Some(items) => assert!(items.is_empty()),
        None => assert_eq!(control.text(), Some("")),
    }
}

#[test]
fn test_empty_form_renders_blank_defaults() {
    let custom = intro_registry();
    let registries = [SchemaRegistry::builtin(), &custom];

    for registry in registries {
        for key in registry.keys() {
            let outcome = render(registry, Some(key), &FormData::new(), &UploadStates::new());
            let view = outcome.form().expect("registered page type renders a form");
            let schema = registry.get(key).unwrap();

            assert_eq!(view.fields.len(), schema.fields.len());
            for field in &view.fields {
                assert_blank(&field.control);
                assert!(!field.control.is_disabled());
            }
            assert_eq!(view.sections.len(), schema.sections.len());
            assert!(view.sections.iter().all(|s| !s.is_present()));
        }
    }
}

#[test]
fn test_add_section_appends_defaults() {
    let schema = intro_schema();
    let renderer = FormRenderer::new(&schema);

    let form = renderer.add_section(&FormData::new(), "cta").unwrap();
    let form = renderer.add_section(&form, "intro").unwrap();

    assert_eq!(form.sections.len(), 2);
    let intro = &form.sections[1];
    assert_eq!(intro.section_type, "intro");
    assert_eq!(intro.order, 1);

    let def = schema.section("intro").unwrap();
    let keys: Vec<_> = intro.content.keys().cloned().collect();
    let names: Vec<_> = def.fields.iter().map(|f| f.name.clone()).collect();
    assert_eq!(keys, names);
    assert_eq!(intro.value("heading"), Some(&FieldValue::text("")));
    assert_eq!(intro.value("background_image"), Some(&FieldValue::text("")));
    assert_eq!(intro.value("bullets"), Some(&FieldValue::Items(Vec::new())));
}

#[test]
fn test_add_section_leaves_input_untouched() {
    let schema = intro_schema();
    let renderer = FormRenderer::new(&schema);
    let before = FormData::new().with_field("title", FieldValue::text("Kept"));

    let after = renderer.add_section(&before, "intro").unwrap();
    assert!(before.sections.is_empty());
    assert_eq!(after.field("title"), before.field("title"));
}

#[test]
fn test_present_section_view() {
    let schema = intro_schema();
    let renderer = FormRenderer::new(&schema);
    let form = renderer.add_section(&FormData::new(), "intro").unwrap();
    let form = renderer.set_section_order(&form, 0, 9).unwrap();

    let view = renderer.view(&form, &UploadStates::new());
    match view.section("intro").unwrap() {
        SectionView::Present {
            index,
            order,
            label,
            fields,
            ..
        } => {
            assert_eq!((*index, *order), (0, 9));
            assert_eq!(label, "Intro");
            let paths: Vec<_> = fields.iter().map(|f| f.path.to_string()).collect();
            assert_eq!(
                paths,
                vec![
                    "sections[0].heading",
                    "sections[0].background_image",
                    "sections[0].bullets"
                ]
            );
        }
        other => panic!("expected present section, got {other:?}"),
    }
    assert!(matches!(
        view.section("cta"),
        Some(SectionView::Absent { add_label, .. }) if add_label == "Add Call to Action"
    ));
}

#[test]
fn test_no_type_and_unknown_type_are_distinct() {
    let registry = intro_registry();
    let form = FormData::new();
    let uploads = UploadStates::new();

    let none = render(&registry, None, &form, &uploads);
    let empty = render(&registry, Some(""), &form, &uploads);
    let unknown = render(&registry, Some("blog_post"), &form, &uploads);

    assert_eq!(none, RenderOutcome::NoTypeSelected);
    assert_eq!(empty, RenderOutcome::NoTypeSelected);
    assert_eq!(
        unknown,
        RenderOutcome::SchemaMissing {
            page_type: "blog_post".into()
        }
    );
    assert_ne!(none.placeholder(), unknown.placeholder());
    assert!(none.placeholder().unwrap().contains("select a page type"));
    assert!(unknown.placeholder().unwrap().contains("No schema found"));
    assert!(unknown.placeholder().unwrap().contains("blog_post"));
}

#[test]
fn test_array_item_edits_call_back_once_with_full_list() {
    let field = FieldDef::array(
        "rows",
        "Rows",
        vec![FieldDef::text("a", "A"), FieldDef::text("b", "B")],
    );

    let mut calls: Vec<FieldValue> = Vec::new();
    ArrayFieldControl::new(&field, None)
        .unwrap()
        .add_item(|_, value| calls.push(value));
    let value = calls.pop().unwrap();
    assert!(calls.is_empty());

    // grow to two items
    let mut value_two = None;
    ArrayFieldControl::new(&field, Some(&value))
        .unwrap()
        .add_item(|_, v| value_two = Some(v));
    let value = value_two.unwrap();
    assert_eq!(value.as_items().unwrap().len(), 2);

    let mut updates = Vec::new();
    ArrayFieldControl::new(&field, Some(&value))
        .unwrap()
        .update_item(1, "a", "x", |name, v| updates.push((name.to_string(), v)))
        .unwrap();
    assert_eq!(updates.len(), 1);
    let (name, updated) = updates.pop().unwrap();
    assert_eq!(name, "rows");
    let items = updated.as_items().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["a"], "");
    assert_eq!(items[1]["a"], "x");
    assert_eq!(items[1]["b"], "");

    let mut removals = Vec::new();
    ArrayFieldControl::new(&field, Some(&updated))
        .unwrap()
        .remove_item(0, |_, v| removals.push(v))
        .unwrap();
    assert_eq!(removals.len(), 1);
    let remaining = removals[0].as_items().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["a"], "x");
}

#[test]
fn test_intro_bullets_scenario() {
    let schema = intro_schema();
    let renderer = FormRenderer::new(&schema);

    let form = renderer.add_section(&FormData::new(), "intro").unwrap();
    let form = renderer
        .update_section_field(&form, 0, "heading", FieldValue::text("Welcome"))
        .unwrap();
    let form = renderer
        .edit_section_array(&form, 0, "bullets", ArrayEdit::Add)
        .unwrap();
    let form = renderer
        .edit_section_array(&form, 0, "bullets", ArrayEdit::Add)
        .unwrap();
    let form = renderer
        .edit_section_array(&form, 0, "bullets", ArrayEdit::update(0, "text", "Fast"))
        .unwrap();

    assert_eq!(form.sections.len(), 1);
    let intro = &form.sections[0];
    assert_eq!(intro.value("heading"), Some(&FieldValue::text("Welcome")));
    let bullets = intro.value("bullets").and_then(FieldValue::as_items).unwrap();
    assert_eq!(bullets.len(), 2);
    assert_eq!(bullets[0]["text"], "Fast");
    assert_eq!(bullets[1]["text"], "");

    let payload = form.to_payload(Some("intro_page"));
    assert_eq!(payload["sections"][0]["content"]["bullets"][1]["text"], "");
}

fn form_with_sections(count: usize) -> FormData {
    let schema = intro_schema();
    let mut form = FormData::new();
    for i in 0..count {
        // duplicates of one type are allowed when built directly
        let def = &schema.sections[i % schema.sections.len()];
        let mut instance = SectionInstance::from_def(def, i64::try_from(i).unwrap());
        if let Some(FieldValue::Text(text)) = instance.content.get_mut(&def.fields[0].name) {
            *text = format!("section {i}");
        }
        form.sections.push(instance);
    }
    form
}

proptest! {
    #[test]
    fn prop_set_order_touches_one_instance(
        count in 1..8usize,
        pick in any::<Index>(),
        order in any::<i64>(),
    ) {
        let schema = intro_schema();
        let renderer = FormRenderer::new(&schema);
        let before = form_with_sections(count);
        let index = pick.index(count);

        let after = renderer.set_section_order(&before, index, order).unwrap();

        prop_assert_eq!(after.sections.len(), before.sections.len());
        for (i, (a, b)) in after.sections.iter().zip(&before.sections).enumerate() {
            prop_assert_eq!(&a.content, &b.content);
            prop_assert_eq!(&a.section_type, &b.section_type);
            if i == index {
                prop_assert_eq!(a.order, order);
            } else {
                prop_assert_eq!(a.order, b.order);
            }
        }
    }

    #[test]
    fn prop_remove_shifts_later_sections(count in 1..8usize, pick in any::<Index>()) {
        let schema = intro_schema();
        let renderer = FormRenderer::new(&schema);
        let before = form_with_sections(count);
        let index = pick.index(count);

        let after = renderer.remove_section(&before, index).unwrap();

        prop_assert_eq!(after.sections.len(), count - 1);
        let mut expected = before.sections.clone();
        expected.remove(index);
        // orders are not renumbered
        prop_assert_eq!(after.sections, expected);
    }

    #[test]
    fn prop_out_of_range_section_index_is_rejected(count in 0..5usize, extra in 0..5usize) {
        let schema = intro_schema();
        let renderer = FormRenderer::new(&schema);
        let form = form_with_sections(count);
        let index = count + extra;

        prop_assert!(renderer.remove_section(&form, index).is_err());
        prop_assert!(renderer.set_section_order(&form, index, 1).is_err());
    }

    #[test]
    fn prop_array_remove_keeps_relative_order(len in 1..10usize, pick in any::<Index>()) {
        let field = FieldDef::array("rows", "Rows", vec![FieldDef::text("a", "A")]);
        let items: Vec<_> = (0..len)
            .map(|i| {
                let mut item = examdesk_forms::ArrayItem::new();
                item.insert("a".to_string(), i.to_string());
                item
            })
            .collect();
        let value = FieldValue::Items(items.clone());
        let index = pick.index(len);

        let mut out = Vec::new();
        ArrayFieldControl::new(&field, Some(&value))
            .unwrap()
            .remove_item(index, |_, v| out.push(v))
            .unwrap();

        prop_assert_eq!(out.len(), 1);
        let mut expected = items;
        expected.remove(index);
        prop_assert_eq!(out[0].as_items().unwrap(), expected.as_slice());
    }
}
