use qweb_dom::{Document, Host, Mutation, NodeKind};

#[test]
fn serializes_elements_text_and_comments() {
    let doc = Document::new();
    let root = doc.create_container();
    let div = doc.create_element("div");
    doc.set_attribute(&div, "class", "a'bc");
    doc.set_attribute(&div, "title", "say \"hi\" & go");
    let t = doc.create_text("1 < 2 & 3 > 2");
    let c = doc.create_comment(" note ");
    doc.insert_before(&div, &t, None);
    doc.insert_before(&div, &c, None);
    doc.insert_before(&root, &div, None);
    assert_eq!(
        doc.inner_html(root),
        r#"<div class="a'bc" title="say &quot;hi&quot; &amp; go">1 &lt; 2 &amp; 3 &gt; 2<!-- note --></div>"#
    );
    assert_eq!(doc.outer_html(root), doc.inner_html(root));
}

#[test]
fn void_elements_have_no_end_tag() {
    let doc = Document::new();
    let root = doc.create_container();
    let input = doc.create_element("input");
    doc.insert_before(&root, &input, None);
    assert_eq!(doc.inner_html(root), "<input>");
}

#[test]
fn insert_before_reference_and_remove() {
    let doc = Document::new();
    let root = doc.create_container();
    let a = doc.create_text("a");
    let b = doc.create_text("b");
    let c = doc.create_text("c");
    doc.insert_before(&root, &a, None);
    doc.insert_before(&root, &c, None);
    doc.insert_before(&root, &b, Some(&c));
    assert_eq!(doc.inner_html(root), "abc");
    assert_eq!(doc.children(root), vec![a, b, c]);
    assert_eq!(doc.parent(&b), Some(root));

    doc.remove(&b);
    assert_eq!(doc.inner_html(root), "ac");
    assert_eq!(doc.parent(&b), None);
    // removing a detached node is a no-op
    doc.remove(&b);
    assert_eq!(doc.children(root), vec![a, c]);
}

#[test]
fn set_text_updates_character_data() {
    let doc = Document::new();
    let root = doc.create_container();
    let t = doc.create_text("owl");
    doc.insert_before(&root, &t, None);
    doc.set_text(&t, "halloween");
    assert_eq!(doc.text(t).as_deref(), Some("halloween"));
    assert_eq!(doc.kind(t), Some(NodeKind::Text("halloween".into())));
}

#[test]
fn journal_records_mutations_in_order() {
    let doc = Document::new();
    let root = doc.create_container();
    let t = doc.create_text("x");
    doc.insert_before(&root, &t, None);
    doc.set_text(&t, "y");
    doc.remove(&t);
    assert_eq!(
        doc.take_mutations(),
        vec![
            Mutation::Insert { parent: root, node: t },
            Mutation::SetText { node: t },
            Mutation::Remove { parent: root, node: t },
        ]
    );
    assert!(doc.take_mutations().is_empty());
}

#[test]
fn only_roots_and_elements_are_containers() {
    let doc = Document::new();
    let root = doc.create_container();
    let div = doc.create_element("div");
    let t = doc.create_text("x");
    assert!(doc.is_container(&root));
    assert!(doc.is_container(&div));
    assert!(!doc.is_container(&t));
}
