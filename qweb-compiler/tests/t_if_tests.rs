use qweb_compiler::{CompileError, ParseError, compile, parse};
use qweb_core::Context;
use qweb_dom::Document;
use rstest::rstest;
use serde_json::{Value, json};

fn render(src: &str, ctx: Value) -> String {
    let render = compile(src).unwrap();
    let doc = Document::new();
    let fixture = doc.create_container();
    let mut tree = render
        .render::<Document>(&Context::from_json(ctx).unwrap())
        .unwrap();
    tree.mount(&doc, &fixture).unwrap();
    doc.inner_html(fixture)
}

#[rstest]
#[case(json!({"condition": true}), "<div>ok</div>")]
#[case(json!({"condition": false}), "<div></div>")]
fn t_if_in_a_div(#[case] ctx: Value, #[case] expected: &str) {
    assert_eq!(render(r#"<div><t t-if="condition">ok</t></div>"#, ctx), expected);
}

#[rstest]
#[case(json!({"condition": true}), "ok")]
#[case(json!({"condition": false}), "")]
fn just_a_t_if(#[case] ctx: Value, #[case] expected: &str) {
    assert_eq!(render(r#"<t t-if="condition">ok</t>"#, ctx), expected);
}

#[rstest]
#[case(json!({"condition": true}), "<span>yip</span><div>yip</div>")]
#[case(json!({"condition": false}), "")]
fn t_if_with_two_inner_nodes(#[case] ctx: Value, #[case] expected: &str) {
    let src = r#"<t t-if="condition"><span>yip</span><div>yip</div></t>"#;
    assert_eq!(render(src, ctx.clone()), expected);
    let in_div = format!("<div>{src}</div>");
    assert_eq!(render(&in_div, ctx), format!("<div>{expected}</div>"));
}

#[rstest]
#[case(json!({"cond1": true, "cond2": true}), "12")]
#[case(json!({"cond1": false, "cond2": true}), "2")]
#[case(json!({"cond1": true, "cond2": false}), "1")]
fn two_consecutive_t_if(#[case] ctx: Value, #[case] expected: &str) {
    let src = r#"<t t-if="cond1">1</t><t t-if="cond2">2</t>"#;
    assert_eq!(render(src, ctx.clone()), expected);
    let in_div = format!("<div>{src}</div>");
    assert_eq!(render(&in_div, ctx), format!("<div>{expected}</div>"));
}

#[rstest]
#[case(json!({"cond": true}), "<div>foo</div>1")]
#[case(json!({"cond": false}), "<div>foo</div>")]
fn t_if_next_to_a_div(#[case] ctx: Value, #[case] expected: &str) {
    assert_eq!(render(r#"<div>foo</div><t t-if="cond">1</t>"#, ctx), expected);
}

#[rstest]
#[case(json!({"cond1": true, "cond2": true}), "<div><span>12</span></div>")]
#[case(json!({"cond1": true, "cond2": false}), "<div><span>1</span></div>")]
#[case(json!({"cond1": false, "cond2": true}), "<div></div>")]
#[case(json!({"cond1": false, "cond2": false}), "<div></div>")]
fn t_if_in_a_t_if(#[case] ctx: Value, #[case] expected: &str) {
    let src = r#"<div><t t-if="cond1"><span>1<t t-if="cond2">2</t></span></t></div>"#;
    assert_eq!(render(src, ctx), expected);
}

#[rstest]
#[case::empty_string(json!({"v": ""}), "no")]
#[case::zero(json!({"v": 0}), "no")]
#[case::null(json!({"v": null}), "no")]
#[case::missing(json!({}), "no")]
#[case::text(json!({"v": "x"}), "yes")]
#[case::number(json!({"v": 2}), "yes")]
#[case::empty_array(json!({"v": []}), "yes")]
#[case::empty_object(json!({"v": {}}), "yes")]
fn t_if_truthiness(#[case] ctx: Value, #[case] expected: &str) {
    assert_eq!(render(r#"<t t-if="v">yes</t><t t-else="">no</t>"#, ctx), expected);
}

#[test]
fn t_if_negation_and_literals() {
    assert_eq!(render(r#"<t t-if="!flag">off</t>"#, json!({"flag": false})), "off");
    assert_eq!(render(r#"<t t-if="!!flag">on</t>"#, json!({"flag": 1})), "on");
    assert_eq!(render(r#"<b t-if="true">t</b><i t-if="false">f</i>"#, json!({})), "<b>t</b>");
}

#[test]
fn t_if_on_element_keeps_attributes() {
    assert_eq!(
        render(r#"<p t-if="ok" class="note">hi</p>"#, json!({"ok": true})),
        r#"<p class="note">hi</p>"#
    );
}

#[test]
fn only_one_branch_is_ever_rendered() {
    let src = r#"<t t-if="a">A</t><t t-elif="b">B</t><t t-elif="c">C</t><t t-else="">D</t>"#;
    for (a, b, c) in [
        (true, true, true),
        (false, true, true),
        (false, false, true),
        (false, false, false),
    ] {
        let out = render(src, json!({"a": a, "b": b, "c": c}));
        assert_eq!(out.len(), 1, "got {out:?}");
    }
}

#[test]
fn t_if_attribute_needs_an_expression() {
    assert!(matches!(
        parse(r#"<t t-if="">x</t>"#),
        Err(CompileError::Expression { directive: "t-if", .. })
    ));
    assert!(matches!(
        parse(r#"<t t-if="a" t-if="b">x</t>"#),
        Err(CompileError::Parse(ParseError::ConflictingDirectives {
            first: "t-if",
            second: "t-if",
            ..
        }))
    ));
}
