use std::rc::Rc;

use qweb_dom::{
    BDom, Block, ChoiceBlock, ContractViolation, Document, Host, MultiBlock, Mutation, Shape,
    StaticBlock, child_slot, el, text, text_slot,
};

fn greeting() -> Rc<Shape> {
    Rc::new(Shape::new(el("div", &[], vec![text("hello "), text_slot(0)])))
}

fn static_block(shape: &Rc<Shape>, texts: &[&str]) -> Block<Document> {
    Block::Static(StaticBlock::new(
        Rc::clone(shape),
        texts.iter().map(|s| s.to_string()).collect(),
        Vec::new(),
    ))
}

#[test]
fn mounts_static_shell_with_text_slot() {
    let doc = Document::new();
    let fixture = doc.create_container();
    let mut tree = BDom::new(1, static_block(&greeting(), &["owl"]));
    tree.mount(&doc, &fixture).unwrap();
    assert!(tree.is_mounted());
    assert_eq!(tree.container(), Some(&fixture));
    assert_eq!(doc.inner_html(fixture), "<div>hello owl</div>");
}

#[test]
fn patch_only_touches_changed_text() {
    let doc = Document::new();
    let fixture = doc.create_container();
    let shape = greeting();
    let mut tree = BDom::new(1, static_block(&shape, &["owl"]));
    tree.mount(&doc, &fixture).unwrap();
    let div = doc.children(fixture)[0];
    let slot = doc.children(div)[1];
    doc.take_mutations();

    tree.patch(&doc, BDom::new(1, static_block(&shape, &["owl"]))).unwrap();
    assert!(doc.take_mutations().is_empty());

    tree.patch(&doc, BDom::new(1, static_block(&shape, &["world"]))).unwrap();
    assert_eq!(doc.take_mutations(), vec![Mutation::SetText { node: slot }]);
    assert_eq!(doc.inner_html(fixture), "<div>hello world</div>");
}

#[test]
fn structurally_equal_shapes_are_reused() {
    let doc = Document::new();
    let fixture = doc.create_container();
    let mut tree = BDom::new(1, static_block(&greeting(), &["a"]));
    tree.mount(&doc, &fixture).unwrap();
    let div = doc.children(fixture)[0];
    doc.take_mutations();

    tree.patch(&doc, BDom::new(1, static_block(&greeting(), &["b"]))).unwrap();
    assert_eq!(doc.children(fixture), vec![div]);
    assert_eq!(doc.take_mutations().len(), 1);
}

#[test]
fn different_shape_replaces_in_place() {
    let doc = Document::new();
    let fixture = doc.create_container();
    let before = doc.create_text("[");
    let after = doc.create_text("]");
    doc.insert_before(&fixture, &before, None);
    let mut tree = BDom::new(1, static_block(&greeting(), &["a"]));
    tree.mount(&doc, &fixture).unwrap();
    doc.insert_before(&fixture, &after, None);

    let span = Rc::new(Shape::new(el("span", &[], vec![text_slot(0)])));
    tree.patch(&doc, BDom::new(1, static_block(&span, &["b"]))).unwrap();
    assert_eq!(doc.inner_html(fixture), "[<span>b</span>]");
}

fn choice(selected: Option<(usize, &str)>) -> Block<Document> {
    let one = Rc::new(Shape::new(text("1")));
    let two = Rc::new(Shape::new(text("2")));
    let body = selected.map(|(i, _)| {
        let shape = if i == 0 { &one } else { &two };
        (i, static_block(shape, &[]))
    });
    Block::Choice(ChoiceBlock::new(body))
}

fn header_and_choice(selected: Option<(usize, &str)>) -> Block<Document> {
    let header = Rc::new(Shape::new(el("div", &[], vec![text("foo")])));
    Block::Multi(MultiBlock::new(vec![static_block(&header, &[]), choice(selected)]))
}

#[test]
fn choice_switches_branches_at_its_anchor() {
    let doc = Document::new();
    let fixture = doc.create_container();
    let mut tree = BDom::new(7, header_and_choice(Some((0, "1"))));
    tree.mount(&doc, &fixture).unwrap();
    assert_eq!(doc.inner_html(fixture), "<div>foo</div>1");

    tree.patch(&doc, BDom::new(7, header_and_choice(None))).unwrap();
    assert_eq!(doc.inner_html(fixture), "<div>foo</div>");

    tree.patch(&doc, BDom::new(7, header_and_choice(Some((1, "2"))))).unwrap();
    assert_eq!(doc.inner_html(fixture), "<div>foo</div>2");

    tree.patch(&doc, BDom::new(7, header_and_choice(Some((0, "1"))))).unwrap();
    assert_eq!(doc.inner_html(fixture), "<div>foo</div>1");
}

#[test]
fn choice_inside_element_keeps_siblings() {
    let shape = Rc::new(Shape::new(el("div", &[], vec![child_slot(0), text_slot(0)])));
    let make = |selected: Option<(usize, &str)>, value: &str| {
        Block::Static(StaticBlock::new(
            Rc::clone(&shape),
            vec![value.to_string()],
            vec![choice(selected)],
        ))
    };
    let doc = Document::new();
    let fixture = doc.create_container();
    let mut tree = BDom::new(3, make(Some((0, "1")), "owl"));
    tree.mount(&doc, &fixture).unwrap();
    assert_eq!(doc.inner_html(fixture), "<div>1owl</div>");
    let div = doc.children(fixture)[0];
    let kids = doc.children(div);
    doc.take_mutations();

    tree.patch(&doc, BDom::new(3, make(None, "owl"))).unwrap();
    assert_eq!(doc.inner_html(fixture), "<div>owl</div>");
    assert_eq!(
        doc.take_mutations(),
        vec![Mutation::Remove { parent: div, node: kids[0] }]
    );
}

#[test]
fn remove_detaches_everything_once() {
    let doc = Document::new();
    let fixture = doc.create_container();
    let mut tree = BDom::new(7, header_and_choice(Some((0, "1"))));
    tree.mount(&doc, &fixture).unwrap();
    tree.remove(&doc).unwrap();
    assert_eq!(doc.inner_html(fixture), "");
    assert!(doc.children(fixture).is_empty());
    assert_eq!(tree.remove(&doc), Err(ContractViolation::AlreadyRemoved));
}

#[test]
fn contract_violations() {
    let doc = Document::new();
    let fixture = doc.create_container();
    let stray = doc.create_text("x");

    let mut tree = BDom::new(1, static_block(&greeting(), &["a"]));
    assert_eq!(
        tree.mount(&doc, &stray),
        Err(ContractViolation::InvalidContainer)
    );
    assert_eq!(
        tree.patch(&doc, BDom::new(1, static_block(&greeting(), &["b"]))),
        Err(ContractViolation::NotMounted)
    );
    assert_eq!(tree.remove(&doc), Err(ContractViolation::NotMounted));

    tree.mount(&doc, &fixture).unwrap();
    assert_eq!(tree.mount(&doc, &fixture), Err(ContractViolation::AlreadyMounted));
    assert_eq!(
        tree.patch(&doc, BDom::new(2, static_block(&greeting(), &["b"]))),
        Err(ContractViolation::ForeignTree { expected: 1, found: 2 })
    );

    let other = doc.create_container();
    let mut mounted = BDom::new(1, static_block(&greeting(), &["c"]));
    mounted.mount(&doc, &other).unwrap();
    assert_eq!(tree.patch(&doc, mounted), Err(ContractViolation::NextAlreadyMounted));

    assert_eq!(
        tree.patch(&doc, BDom::new(1, choice(None))),
        Err(ContractViolation::IncompatibleTree)
    );
    assert_eq!(doc.inner_html(fixture), "<div>hello a</div>");

    tree.remove(&doc).unwrap();
    assert_eq!(tree.mount(&doc, &fixture), Err(ContractViolation::AlreadyRemoved));
}
