// Checks on the encoded letters of the scanned blocks and of the variant layers

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    diagnostics::{Diagnostics, Issue, Locator, Severity},
    document::Page,
    isame_txt::grammar::parse_dot_sequence,
};

const DECORATIONS: &str = "-!©↑↓↕←→↔≠";
const DECORATION_BASES: &str = "ᵘᵢᵃaiuˀ";
const DOTS_AND_HAMZA: &str = "ᵘᵢᵃaiuʷᴬˀ";

const ILLEGAL_SHAPES: [&str; 6] = ["Y→", "Y↓", "G←", "G↘", "ˀ˦", "ˀ˥"];
const FORBIDDEN_GLYPHS: [char; 4] = ['ᵟ', 'ᵒ', '°', 'ᵐ'];
const ERRONEOUS_SEQUENCES: [&str; 4] = ["ᵘ←", "ᵃ-", "ᵃ-!", "ᵃ-↕!"];

pub fn check_encoding(
    title: &str,
    folio: &str,
    page: &Page,
    dot_check: bool,
    diagnostics: &mut Diagnostics,
) {
    for (i, block) in page.blocks.iter().enumerate() {
        let locator = || Locator::new(folio, page.line_of(i));
        let tok = &block.tok;

        if let Some(ch) = y_without_tail(tok) {
            if !page.is_absent(i, ch) {
                diagnostics.warning(title, locator(), Issue::YWithoutTail(tok.clone()));
            }
        }
        if ILLEGAL_SHAPES.iter().any(|s| tok.contains(s)) {
            diagnostics.error(title, locator(), Issue::IllegalShape(tok.clone()));
        }

        if dot_check {
            for (severity, issue) in check_dots(tok, Severity::Error) {
                diagnostics.record(severity, title, locator(), issue);
            }
            if tok.contains(FORBIDDEN_GLYPHS) {
                diagnostics.error(title, locator(), Issue::ForbiddenGlyph(tok.clone()));
            }
        }
    }

    // layers are less carefully encoded: dot problems there are warnings only
    for variant in &page.variants {
        let Some(layer) = &variant.lay else {
            continue;
        };
        let locator = || Locator::new(folio, page.line_of(variant.span.inib));

        if y_without_tail(layer).is_some() && !page.is_absent(variant.span.inib, variant.span.inic)
        {
            diagnostics.warning(title, locator(), Issue::YWithoutTail(layer.clone()));
        }
        if dot_check {
            for (severity, issue) in check_dots(layer, Severity::Warning) {
                diagnostics.record(severity, title, locator(), issue);
            }
        }
    }
}

// char position of the first Y not followed by ⇓ or ⇒
fn y_without_tail(tok: &str) -> Option<usize> {
    let chars: Vec<char> = tok.chars().collect();
    (0..chars.len())
        .find(|&i| chars[i] == 'Y' && !matches!(chars.get(i + 1), Some('⇓' | '⇒')))
}

// dot sequences are checked at `level`; the other findings have a fixed severity
fn check_dots(token: &str, level: Severity) -> Vec<(Severity, Issue)> {
    static DOUBLED_VOWEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:ᵘᵘ|ᵃᵃ|ᵢᵢ)[A-Y]").unwrap());
    static DOT_SEQUENCE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"[ᵘᵢᵃaiuʷᴬ][^A-Y1-9ᵘᵃᵢaiuʷᴬ+#\[\{\}⟨―∅_)\^]*").unwrap()
    });

    let mut findings = Vec::new();

    if let Some(excerpt) = decoration_without_base(token) {
        findings.push((
            Severity::Error,
            Issue::DotWithoutBase {
                excerpt,
                token: token.to_owned(),
            },
        ));
    }
    if token.starts_with(|c: char| DOTS_AND_HAMZA.contains(c)) {
        findings.push((Severity::Warning, Issue::DotAtTokenStart(token.to_owned())));
    }
    if ERRONEOUS_SEQUENCES.iter().any(|s| token.contains(s)) {
        findings.push((Severity::Warning, Issue::ErroneousDotSequence(token.to_owned())));
    }
    if DOUBLED_VOWEL.is_match(token) {
        findings.push((Severity::Error, Issue::DoubledVowel(token.to_owned())));
    }

    if token.contains(|c: char| DOTS_AND_HAMZA.contains(c)) {
        for m in DOT_SEQUENCE.find_iter(token) {
            let sequence = m.as_str();
            if let Err(source) = parse_dot_sequence(sequence) {
                // a dot written as '.' is a known transcription shortcut
                let severity = if sequence.contains('.') {
                    Severity::Warning
                } else {
                    level
                };
                findings.push((
                    severity,
                    Issue::InvalidDotSyntax {
                        sequence: sequence.to_owned(),
                        token: token.to_owned(),
                        source,
                    },
                ));
            }
        }
    }

    findings
}

// a run of decoration symbols must follow a vowel or hamza sign; W-2r style estimates excepted
fn decoration_without_base(token: &str) -> Option<String> {
    let chars: Vec<char> = token.chars().collect();
    let is_decoration = |c: char| DECORATIONS.contains(c);

    let mut k = 1;
    while k < chars.len() {
        if !is_decoration(chars[k]) {
            k += 1;
            continue;
        }

        let run_end = k + chars[k..].iter().take_while(|&&c| is_decoration(c)).count();
        let previous = chars[k - 1];
        if !DECORATION_BASES.contains(previous) && !is_decoration(previous) {
            let estimate = run_end - k == 1
                && chars.get(run_end).is_some_and(|c| ('1'..='9').contains(c))
                && chars.get(run_end + 1) == Some(&'r');
            if !estimate {
                return Some(chars[k - 1..run_end].iter().collect());
            }
        }
        k = run_end;
    }
    None
}
