use std::ops::Range;

use pulldown_cmark::{Event, Parser as CmarkParser, Tag, TagEnd};

use crate::config::Config;
use crate::diagnostic::TokenDiagnostic;
use crate::link;
use crate::network::Network;
use crate::parser::structural;
use crate::token;
use crate::validator::Validator;

/// A run of adjacent text events that map byte-for-byte onto the source.
struct TextRun {
    span: Range<usize>,
    text: String,
}

/// Report every address in `source` that annotation would mark invalid.
///
/// Only text that annotation itself would visit is scanned: code and link
/// content are skipped. Spans point into `source`.
pub fn lint(
    source: &str,
    file_id: usize,
    config: &Config,
    validator: &dyn Validator,
) -> Vec<TokenDiagnostic> {
    let mut diagnostics = Vec::new();
    let mut run: Option<TextRun> = None;
    // Depth of code blocks, links and images we are inside of.
    let mut opaque = 0usize;

    for (event, range) in CmarkParser::new_ext(source, structural::options()).into_offset_iter() {
        match &event {
            Event::Start(Tag::CodeBlock(_) | Tag::Link { .. } | Tag::Image { .. }) => {
                flush(&mut run, file_id, config, validator, &mut diagnostics);
                opaque += 1;
            }
            Event::End(TagEnd::CodeBlock | TagEnd::Link | TagEnd::Image) => {
                flush(&mut run, file_id, config, validator, &mut diagnostics);
                opaque = opaque.saturating_sub(1);
            }
            Event::Text(text) if opaque == 0 && source.get(range.clone()) == Some(&**text) => {
                let adjacent = matches!(&run, Some(current) if current.span.end == range.start);
                if adjacent {
                    if let Some(current) = run.as_mut() {
                        current.text.push_str(text);
                        current.span.end = range.end;
                    }
                } else {
                    flush(&mut run, file_id, config, validator, &mut diagnostics);
                    run = Some(TextRun {
                        span: range,
                        text: text.to_string(),
                    });
                }
            }
            _ => flush(&mut run, file_id, config, validator, &mut diagnostics),
        }
    }
    flush(&mut run, file_id, config, validator, &mut diagnostics);

    diagnostics
}

fn flush(
    run: &mut Option<TextRun>,
    file_id: usize,
    config: &Config,
    validator: &dyn Validator,
    out: &mut Vec<TokenDiagnostic>,
) {
    let Some(run) = run.take() else {
        return;
    };

    for token in token::extract(&run.text) {
        let network = Network::resolve(token.network.as_deref());
        let decision = link::decide(&token, &network, config, validator);
        if decision.validated {
            continue;
        }

        let span = run.span.start + token.span.start..run.span.start + token.span.end;
        let mut diagnostic = TokenDiagnostic::warning(
            format!("address {} fails checksum verification", token.payload),
            span,
            file_id,
        )
        .with_note(format!("rendered as ~~{}~~ without a link", decision.label()));
        if token.skip_validation && !config.enable_skip_marker {
            diagnostic = diagnostic.with_note("the `!` marker is ignored: enable_skip_marker is off");
        }
        out.push(diagnostic);
    }
}
