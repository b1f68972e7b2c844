use cblink::document::visit::visit_text;
use cblink::parser::Parser;
use cblink::{
    AcceptAll, Config, ConfigError, Document, DocumentNode, InlineNode, annotate,
    annotate_markdown,
};

const GOOD: &str = "cb7147879011ea207df5b35a24ca6f0859dcfb145999";
const BAD: &str = "cb7247879011ea207df5b35a24ca6f0859dcfb145999";

fn rejects_cb72(payload: &str, _strict: bool) -> bool {
    !payload.to_ascii_lowercase().starts_with("cb72")
}

fn run(source: &str) -> String {
    annotate_markdown(source, &Config::default(), &rejects_cb72)
}

fn parse(source: &str) -> Document {
    Parser::new(source.to_string(), 0).parse()
}

fn link(dest: &str, title: &str, label: &str) -> InlineNode {
    InlineNode::Link {
        dest: dest.to_string(),
        title: title.to_string(),
        content: vec![InlineNode::text(label)],
    }
}

// ---------------------------------------------------------------------------
// Annotating Markdown
// ---------------------------------------------------------------------------

#[test]
fn mainnet_address_in_paragraph() {
    let out = run(&format!("Sent to [{}@cb] today.\n", GOOD));
    assert_eq!(
        out,
        format!(
            "Sent to [CB71…5999@cb](https://blockindex.net/address/{} \"{}\") today.\n",
            GOOD,
            GOOD.to_uppercase()
        )
    );
}

#[test]
fn invalid_address_is_struck_through() {
    let out = run(&format!("Bad: [{}@cb]\n", BAD));
    assert_eq!(out, "Bad: ~~CB72…5999@cb~~\n");
}

#[test]
fn inside_emphasis_and_strong() {
    assert_eq!(
        run("*[5@cb]* and **x [6@cb]**\n"),
        "*[5@cb](https://blockindex.net/block/5 \"5\")* and **x [6@cb](https://blockindex.net/block/6 \"6\")**\n"
    );
}

#[test]
fn heading_list_and_table() {
    assert_eq!(
        run("## Block [5@cb]\n"),
        "## Block [5@cb](https://blockindex.net/block/5 \"5\")\n"
    );
    assert_eq!(
        run("- one [5@cb]\n- two\n"),
        "- one [5@cb](https://blockindex.net/block/5 \"5\")\n- two\n"
    );
    assert_eq!(
        run("| Block | Note |\n|---|---|\n| [5@cb] | first |\n"),
        "| Block | Note |\n|---|---|\n| [5@cb](https://blockindex.net/block/5 \"5\") | first |\n"
    );
}

#[test]
fn code_and_links_are_untouched() {
    assert_eq!(run("Use `[5@cb]` here.\n"), "Use `[5@cb]` here.\n");
    assert_eq!(
        run("```\n[5@cb]\n```\n"),
        "```\n[5@cb]\n```\n"
    );
    assert_eq!(
        run("[see [5@cb]](https://example.org)\n"),
        "[see [5@cb]](https://example.org)\n"
    );
}

#[test]
fn definitions_follow_the_document() {
    assert_eq!(run("> [ce:1@cb]\n"), "> [CE:1@cb]\n\n[CE:1@cb]: ce-1\n");
    assert_eq!(
        run("[ce:1@cb]\n\n[ce:2@cb] [ce:1@cb]\n"),
        "[CE:1@cb]\n\n[CE:2@cb] [CE:1@cb]\n\n[CE:1@cb]: ce-1\n[CE:2@cb]: ce-2\n"
    );
}

#[test]
fn plain_documents_round_trip() {
    let source = "# Title\n\nSome *text* with a [link](https://example.org \"t\").\n";
    assert_eq!(run(source), source);
    assert_eq!(run(""), "");
}

#[test]
fn nested_and_loose_lists_keep_their_shape() {
    assert_eq!(run("- a\n  - b\n"), "- a\n  - b\n");
    assert_eq!(run("- first\n\n  second para\n"), "- first\n\n  second para\n");
    assert_eq!(run("- a\n\n- b\n"), "- a\n\n- b\n");
    assert_eq!(
        run("3. one\n4. two [5@cb]\n   - deep\n"),
        "3. one\n4. two [5@cb](https://blockindex.net/block/5 \"5\")\n   - deep\n"
    );
}

#[test]
fn escaped_text_stays_text() {
    assert_eq!(run("\\*not emphasis\\*\n"), "\\*not emphasis\\*\n");
    assert_eq!(run("a \\[ b and c\\_d\n"), "a \\[ b and c\\_d\n");
    assert_eq!(
        run("\\`[5@cb]\\`\n"),
        "\\`[5@cb](https://blockindex.net/block/5 \"5\")\\`\n"
    );
}

#[test]
fn inline_html_is_verbatim() {
    assert_eq!(
        run("Hover <abbr title=\"[42@cb]\">here</abbr> or [42@cb].\n"),
        "Hover <abbr title=\"[42@cb]\">here</abbr> or [42@cb](https://blockindex.net/block/42 \"42\").\n"
    );
    let doc = parse("a <b>[5@cb]</b>\n");
    assert_eq!(
        doc.nodes,
        vec![DocumentNode::Paragraph(vec![
            InlineNode::text("a "),
            InlineNode::Html("<b>".to_string()),
            InlineNode::text("[5@cb]"),
            InlineNode::Html("</b>".to_string()),
        ])]
    );
}

#[test]
fn rendering_reparses_to_the_same_tree() {
    let sources = [
        "- a\n  - b\n    - c\n- d\n",
        "1. first\n\n   more\n\n2. second\n",
        "> - quoted\n>   - nested\n",
        "Stars \\* and \\_under\\_ and \\\\ slash.\n",
        "Open \\[ bracket, closed [pair].\n",
        "A <span title=\"x\">tag</span>.\n",
    ];
    for source in sources {
        let doc = parse(source);
        assert_eq!(parse(&doc.to_string()), doc, "source: {:?}", source);
    }
}

#[test]
fn annotation_is_deterministic() {
    let source = format!("[{}@cb] [ab:1@cb] [ce:2@cb] [{}@cb]\n", GOOD, BAD);
    assert_eq!(run(&source), run(&source));
}

// ---------------------------------------------------------------------------
// Tree walking
// ---------------------------------------------------------------------------

fn sample_document() -> Document {
    Document {
        nodes: vec![DocumentNode::Paragraph(vec![
            InlineNode::text("a [1@cb]"),
            link("https://example.org", "", "[2@cb]"),
            InlineNode::Strong(vec![InlineNode::text("[3@cb] b")]),
        ])],
    }
}

#[test]
fn annotate_splices_in_place() {
    let mut doc = sample_document();
    annotate(&mut doc, &Config::default(), &AcceptAll);
    assert_eq!(
        doc.nodes,
        vec![DocumentNode::Paragraph(vec![
            InlineNode::text("a "),
            link("https://blockindex.net/block/1", "1", "1@cb"),
            link("https://example.org", "", "[2@cb]"),
            InlineNode::Strong(vec![
                link("https://blockindex.net/block/3", "3", "3@cb"),
                InlineNode::text(" b"),
            ]),
        ])]
    );
}

#[test]
fn text_without_tokens_is_kept() {
    let mut doc = Document {
        nodes: vec![DocumentNode::Paragraph(vec![InlineNode::text("nothing here")])],
    };
    let before = doc.clone();
    annotate(&mut doc, &Config::default(), &AcceptAll);
    assert_eq!(doc, before);
}

#[test]
fn visitor_skips_replacements_and_can_remove() {
    let mut doc = sample_document();
    let mut seen = Vec::new();
    visit_text(&mut doc, &mut |i, parent: &mut Vec<InlineNode>| {
        if let InlineNode::Text(value) = &parent[i] {
            seen.push(value.clone());
        }
        parent.splice(i..=i, [InlineNode::text("x"), InlineNode::text("y")]);
        2
    });
    assert_eq!(seen, vec!["a [1@cb]".to_string(), "[3@cb] b".to_string()]);

    let mut doc = sample_document();
    visit_text(&mut doc, &mut |i, parent: &mut Vec<InlineNode>| {
        parent.remove(i);
        0
    });
    assert_eq!(
        doc.nodes,
        vec![DocumentNode::Paragraph(vec![
            link("https://example.org", "", "[2@cb]"),
            InlineNode::Strong(vec![]),
        ])]
    );
}

#[test]
fn parser_merges_split_text() {
    let doc = Parser::new(format!("x [{}@cb] y", GOOD), 0).parse();
    assert_eq!(
        doc.nodes,
        vec![DocumentNode::Paragraph(vec![InlineNode::text(format!(
            "x [{}@cb] y",
            GOOD
        ))])]
    );
}

// ---------------------------------------------------------------------------
// Linting
// ---------------------------------------------------------------------------

fn lint(source: &str, config: &Config) -> Vec<cblink::TokenDiagnostic> {
    Parser::new(source.to_string(), 0).lint(config, &rejects_cb72)
}

#[test]
fn lint_points_at_the_token() {
    let diagnostics = lint(&format!("x [{}@cb]\n", BAD), &Config::default());
    assert_eq!(diagnostics.len(), 1);
    let d = &diagnostics[0];
    assert!(d.is_warning());
    assert_eq!(d.span, 2..51);
    assert!(d.message.contains(BAD));
    assert_eq!(d.notes, vec!["rendered as ~~CB72…5999@cb~~ without a link".to_string()]);
    assert_eq!(d.to_diagnostic().labels[0].range, 2..51);
}

#[test]
fn lint_skips_code_links_and_good_addresses() {
    let config = Config::default();
    assert!(lint(&format!("```\n[{}@cb]\n```\n", BAD), &config).is_empty());
    assert!(lint(&format!("`[{}@cb]`\n", BAD), &config).is_empty());
    assert!(lint(&format!("[[{}@cb]](https://example.org)\n", BAD), &config).is_empty());
    assert!(lint(&format!("[{}@cb]\n", GOOD), &config).is_empty());
    assert!(lint(&format!("[!{}@cb]\n", BAD), &config).is_empty());
}

#[test]
fn lint_explains_ignored_skip_marker() {
    let config = Config {
        enable_skip_marker: false,
        ..Config::default()
    };
    let diagnostics = lint(&format!("[!{}@cb]\n", BAD), &config);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].span, 0..50);
    assert_eq!(diagnostics[0].notes.len(), 2);
}

#[test]
fn lint_spans_on_later_lines() {
    let source = format!("# Notes\n\n- first\n- bad [{}@cb]\n", BAD);
    let diagnostics = lint(&source, &Config::default());
    assert_eq!(diagnostics.len(), 1);
    let start = source.find('[').unwrap_or_default();
    assert_eq!(diagnostics[0].span, start..start + 49);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn default_config_is_valid() {
    assert!(Config::default().validate().is_ok());
    assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
}

#[test]
fn partial_config_keeps_defaults() {
    let config = Config::from_toml_str(
        "link_networks = false\nexplorer_url = \"https://explorer.example.org\"\n",
    )
    .unwrap();
    assert!(!config.link_networks);
    assert_eq!(config.explorer_url, "https://explorer.example.org");
    assert!(config.enable_validation);
    assert_eq!(config.url_path_address, "address/{id}");
}

#[test]
fn config_errors() {
    assert!(matches!(
        Config::from_toml_str("enable_validaton = true"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        Config::from_toml_str("explorer_url = \"blockindex.net\""),
        Err(ConfigError::InvalidUrl { field: "explorer_url", .. })
    ));
    assert!(matches!(
        Config::from_toml_str("url_path_block_hash = \"block/\""),
        Err(ConfigError::MissingPlaceholder { field: "url_path_block_hash", .. })
    ));
}

#[test]
fn config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cblink.toml");
    std::fs::write(&path, "check_block_hash = false\n").unwrap();
    let config = Config::load(&path).unwrap();
    assert!(!config.check_block_hash);

    let missing = Config::load(dir.path().join("absent.toml"));
    assert!(matches!(missing, Err(ConfigError::Io { .. })));
}
