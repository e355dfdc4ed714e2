use htmlx::compiler::{
    CompileError, IndentationError, Position, normalize_indentation, parse_document,
};
use htmlx::{Bundle, CompileOptions, compile};

fn build(source: &str) -> Bundle {
    compile(source, "index.htmlx", &CompileOptions::default()).unwrap()
}

#[test]
fn test_hello_world_document() {
    let bundle = build("div { Hello World }");
    assert!(bundle.html.starts_with("<!DOCTYPE html>\n"));
    assert!(bundle.html.contains("  <div>Hello World</div>\n"));
    assert!(bundle.html.contains(r#"<link rel="stylesheet" href="index.css">"#));
    assert!(bundle.html.contains(r#"<script src="index.js" defer></script>"#));
}

#[test]
fn test_id_and_class() {
    let bundle = build("div#main.container { Content }");
    assert!(
        bundle
            .html
            .contains(r#"<div id="main" class="container">Content</div>"#)
    );
}

#[test]
fn test_backend_call() {
    let bundle = build(r#"button(⚡-call: "getData") { Load Data }"#);
    assert!(
        bundle
            .html
            .contains(r#"<button data-api-call="getData">Load Data</button>"#)
    );
    assert!(bundle.js.contains("apiHandlers"));
    assert!(bundle.js.contains("\"getData\": function"));
}

#[test]
fn test_dynamic_data() {
    let bundle = build(r#"span(⚡-data: "username") { Guest }"#);
    assert!(
        bundle
            .html
            .contains(r#"<span data-dynamic="username">Guest</span>"#)
    );
    assert!(bundle.js.contains("dataBindings"));
    assert!(bundle.js.contains("\"username\": function"));
}

#[test]
fn test_animation() {
    let bundle = build(r#"div(animate: "fade 2s") { Animated }"#);
    assert!(bundle.css.contains("@keyframes fade"));
    assert!(bundle.css.contains("animation: fade 2s;"));
    assert!(bundle.html.contains(r#"<div class="hx-1-1">Animated</div>"#));
    assert!(!bundle.html.contains("animate="));
    assert_eq!(bundle.warnings.len(), 1);
    assert_eq!(bundle.warnings[0].rule, "reduced-motion");
}

#[test]
fn test_text_is_escaped() {
    let bundle = build(r#"div { <script>alert("XSS")</script> }"#);
    assert!(
        bundle
            .html
            .contains("<div>&lt;script&gt;alert(&quot;XSS&quot;)&lt;/script&gt;</div>")
    );
    assert!(!bundle.html.contains("<script>alert"));

    let bundle = build("p { Fish & Chips > Salad }");
    assert!(bundle.html.contains("<p>Fish &amp; Chips &gt; Salad</p>"));
}

#[test]
fn test_compilation_is_deterministic() {
    let source = r#"main
  section#hero.wide(style: "color: red; padding: 1rem", animate: "slide 500ms ease-out") {
    h1 { Welcome }
    button(⚡-call: "subscribe") { Subscribe }
  }
  footer
    span(⚡-data: "year") { 2024 }
"#;
    let first = build(source);
    let second = build(source);
    assert_eq!(first, second);
    assert_eq!(
        first.source_map.to_json().unwrap(),
        second.source_map.to_json().unwrap()
    );
}

#[test]
fn test_normalization_is_idempotent() {
    let source = "nav\n  ul\n    li { a(href: \"/\") { Home } }\n    li { About }\n";
    let once = parse_document(source, "nav.htmlx").unwrap();
    let twice = normalize_indentation(once.clone()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_keyframes_are_deduplicated() {
    let bundle = build(
        r#"div(animate: "fade 1s") { a }
div(animate: "fade 2s") { b }
div(animate: "pulse 3s ease infinite") { c }
"#,
    );
    assert_eq!(bundle.css.matches("@keyframes fade").count(), 1);
    assert_eq!(bundle.css.matches("@keyframes pulse").count(), 1);
    assert_eq!(bundle.css.matches("animation: ").count(), 3);
}

#[test]
fn test_identifier_rule() {
    for source in ["div#🎨 { Test }", "div#1st { Test }", "div.-x { Test }"] {
        let err = compile(source, "index.htmlx", &CompileOptions::default()).unwrap_err();
        let CompileError::Validation { validation } = &err else {
            panic!("expected a validation failure for {source:?}, got {err:?}");
        };
        assert!(!validation.ok());
        let value = source
            .trim_start_matches("div")
            .trim_start_matches(['#', '.'])
            .trim_end_matches(" { Test }");
        assert!(
            validation.errors[0].message.contains(&format!("\"{value}\"")),
            "message {:?} should quote {value:?}",
            validation.errors[0].message
        );
    }
}

#[test]
fn test_indentation_matches_braces() {
    let indented = build("div.card\n  h1 { Title }\n  p\n    Body text\n");
    let braced = build("div.card { h1 { Title } p { Body text } }");
    assert_eq!(indented.html, braced.html);
    assert!(indented.html.contains("  <div class=\"card\">\n    <h1>Title</h1>\n    <p>Body text</p>\n  </div>\n"));
}

#[test]
fn test_inconsistent_dedent_is_reported_at_its_line() {
    let err = compile(
        "main\n    section { a }\n  aside { b }\n",
        "index.htmlx",
        &CompileOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        CompileError::Indentation {
            file: "index.htmlx".to_string(),
            source: IndentationError::InconsistentDedent {
                width: 2,
                position: Position::new(3, 3),
            },
        }
    );
}

#[test]
fn test_source_map_points_back_to_source() {
    let bundle = build("section\n  p { First }\n  p { Second }\n");
    let html_lines: Vec<&str> = bundle.html.lines().collect();
    let second = html_lines
        .iter()
        .position(|line| line.contains("Second"))
        .unwrap();
    let original = bundle.source_map.original_for_line(second + 1).unwrap();
    assert_eq!(original, Position::new(3, 3));
}

#[test]
fn test_capitalized_word_stays_text() {
    let bundle = build("button {\n  Menu\n}\n");
    assert!(!bundle.html.contains("<Menu"));
    assert!(bundle.html.contains("<button>Menu</button>"));

    let bundle = build("details\n  Summary\n");
    assert!(bundle.html.contains("<details>Summary</details>"));
}

#[test]
fn test_animation_cannot_inject_css() {
    let err = compile(
        r#"div#x(animate: "fade 1s ;}body{display:none") { hi }"#,
        "index.htmlx",
        &CompileOptions::default(),
    )
    .unwrap_err();
    let CompileError::Validation { validation } = err else {
        panic!("expected a validation failure, got {err:?}");
    };
    assert_eq!(validation.errors[0].rule, "invalid-animation");
}

#[test]
fn test_deep_indentation_is_rejected() {
    let source: String = (0..2_000)
        .map(|level| format!("{}div\n", " ".repeat(level)))
        .collect();
    let err = compile(&source, "index.htmlx", &CompileOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Indentation {
            source: IndentationError::TooDeep { .. },
            ..
        }
    ));
}
