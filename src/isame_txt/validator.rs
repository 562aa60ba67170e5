// Checks on the raw lines of a page, before scanning

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    diagnostics::{Diagnostics, Issue, Locator},
    isame_txt::{
        record::{LineLabel, RawLine},
        span_tracker::SpanKind,
    },
};

pub fn check_lines(title: &str, folio: &str, lines: &[RawLine], diagnostics: &mut Diagnostics) {
    let mut numbers = Vec::with_capacity(lines.len());
    let mut previous = None;
    for line in lines {
        let num = line.number(previous);
        numbers.push(num);
        previous = Some(num);
    }

    let mut expected = 0;
    for (line, &num) in lines.iter().zip(&numbers) {
        let locator = || Locator::new(folio, Some(num));

        if let LineLabel::Number(found) = line.label {
            expected += 1;
            if found != expected {
                diagnostics.error(title, locator(), Issue::LineNumber { expected, found });
            }
        }

        if line.content.is_empty() {
            diagnostics.error(title, locator(), Issue::EmptyLine);
            continue;
        }

        for (severity_is_error, issue) in check_line(line.content) {
            if severity_is_error {
                diagnostics.error(title, locator(), issue);
            } else {
                diagnostics.warning(title, locator(), issue);
            }
        }
    }

    let joined: String = lines.iter().map(|l| l.content).collect();
    if has_lacuna_over_index(&joined) {
        diagnostics.error(title, Locator::new(folio, None), Issue::LacunaEnclosesIndex);
    }

    for (i, pair) in lines.windows(2).enumerate() {
        let (ends_word, continued) = (ends_word(pair[0].content), is_continued(pair[1].content));
        let locator = Locator::new(folio, Some(numbers[i]));
        if !ends_word && !continued {
            diagnostics.error(title, locator, Issue::MissingContinuation);
        } else if ends_word && continued {
            diagnostics.error(title, locator, Issue::UnexpectedContinuation);
        }
    }
}

// a page starting in the middle of a word starts with =
pub fn check_first_line(
    title: &str,
    folio: &str,
    first: &RawLine,
    start_block: u32,
    diagnostics: &mut Diagnostics,
) {
    static START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[⟦{(]?=").unwrap());

    let locator = Locator::new(folio, Some(first.number(None)));
    let continued = START.is_match(first.content);
    if continued && start_block == 1 {
        diagnostics.warning(title, locator, Issue::ContinuationOnFirstBlock);
    } else if !continued && start_block != 1 {
        diagnostics.error(title, locator, Issue::MissingContinuationOnFirstLine(start_block));
    }
}

// (is error, issue)
fn check_line(content: &str) -> Vec<(bool, Issue)> {
    static VARIANT_DIPLOMATIC: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\[(.+?)(?:[>^&].*?)*/.+?\]").unwrap());
    static NON_FINAL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[NQY][^#]*[ABGDRSCTEFQKLMNHWY]").unwrap());
    static SPLIT_BLOCK: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[BGSCTEFQKLMNHY][^ABGDRSCTEFQKLMNHWY#=]*$").unwrap());
    static UNBOUNDED_INDEX: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[^#\d]\d+:\d+#|#\d+:\d+[^#\d]").unwrap());
    static CLOSING_AFTER_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"#[}⟧⟩\]]").unwrap());
    static FASILA_SUBDIVISION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\[\*?∅(?:>\*[0-9A-Z]{5})?/\*=sub=fasila\]").unwrap()
    });
    static NOTE_AFTER_LAYER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[>&^][^/]*[()]").unwrap());
    static NOTE_IN_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/[^=]*[()]").unwrap());
    static CLOSING_INSIDE_CORRECTION: Lazy<[(SpanKind, Regex); 3]> = Lazy::new(|| {
        [
            (SpanKind::Unclear, Regex::new(r">[^/{]*\}").unwrap()),
            (SpanKind::Illegible, Regex::new(r">[^/⟨]*⟩").unwrap()),
            (SpanKind::Lacuna, Regex::new(r">[^/⟦]*⟧").unwrap()),
        ]
    });
    static DIVIDER_INSIDE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*xvc][{⟨⟦(]").unwrap());
    static UNBRACKETED_VARIANT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\[]+?/").unwrap());

    let mut issues = Vec::new();

    if content.contains(' ') {
        issues.push((true, Issue::Space));
    }
    if content.contains("##") {
        issues.push((true, Issue::DoubleSeparator));
    }
    if content.ends_with(['{', '⟦', '⟨', '[']) {
        issues.push((true, Issue::OpeningAtLineEnd));
    }
    if CLOSING_AFTER_SEPARATOR.is_match(content) {
        issues.push((true, Issue::ClosingAfterSeparator));
    }

    // the diplomatic text of a variant may show letters the reference does not have
    if NON_FINAL.is_match(&VARIANT_DIPLOMATIC.replace_all(content, "$1")) {
        issues.push((false, Issue::NonFinalLetter));
    }
    if SPLIT_BLOCK.is_match(content) {
        issues.push((true, Issue::BlockSplitAcrossLines));
    }
    if UNBOUNDED_INDEX.is_match(content) {
        issues.push((true, Issue::IndexNotBounded));
    }
    if content.contains("/=") {
        issues.push((true, Issue::EmptyReference));
    }
    if FASILA_SUBDIVISION.is_match(content) {
        issues.push((true, Issue::UnmarkedFasilaSubdivision));
    }

    if let Some(m) = NOTE_AFTER_LAYER.find(content) {
        issues.push((true, Issue::NoteAfterLayer(m.as_str().to_owned())));
    }
    if let Some(m) = NOTE_IN_REFERENCE.find(content) {
        issues.push((true, Issue::NoteInReference(m.as_str().to_owned())));
    }
    for (kind, pattern) in CLOSING_INSIDE_CORRECTION.iter() {
        if let Some(m) = pattern.find(content) {
            issues.push((
                true,
                Issue::ClosingInsideCorrection {
                    kind: *kind,
                    excerpt: m.as_str().to_owned(),
                },
            ));
        }
    }

    if DIVIDER_INSIDE_SPAN.is_match(content) {
        issues.push((true, Issue::DividerInsideSpan));
    }
    if UNBRACKETED_VARIANT.is_match(content) {
        issues.push((true, Issue::VariantWithoutBrackets));
    }

    issues
}

fn has_lacuna_over_index(text: &str) -> bool {
    static LACUNA_INDEX: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"⟦[^⟦]+?#\d+:\d+#[^⟦]+?⟧").unwrap());
    LACUNA_INDEX.is_match(text)
}

// ...#, ...#=ref=class] or ...#⟧, possibly inside a note
fn ends_word(content: &str) -> bool {
    static FINAL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"#(?:=.+?=.+?(?:;.+?=.+?)*\]|⟧)?\)*$").unwrap());
    FINAL.is_match(content)
}

// =..., ⟦=..., {=..., (=... or [X>=...
fn is_continued(content: &str) -> bool {
    static INITIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[^\]]+>|[⟦{(])?=").unwrap());
    INITIAL.is_match(content)
}
