use crate::{
    document::{LineNumber, Note, Page, Span},
    error::{NoteError, NoteProblem},
    isame_txt::record::Footnote,
};

// a note written in the text, waiting for its footnote
#[derive(Debug, Clone, Copy)]
struct Annotation {
    line: LineNumber,
    span: Option<Span>, // None: the whole line is a note
}

// pairs the annotations of a page, in reading order, with its footnotes
pub fn merge_notes(
    folio: &str,
    page: &Page,
    inline: &[Span],
    whole_lines: &[LineNumber],
    footnotes: &[Footnote],
) -> Result<Vec<Note>, NoteError> {
    let mut annotations: Vec<Annotation> = whole_lines
        .iter()
        .map(|&line| Annotation { line, span: None })
        .chain(inline.iter().map(|&span| Annotation {
            line: page.line_of(span.inib).unwrap_or(LineNumber::new(0)),
            span: Some(span),
        }))
        .collect();
    annotations.sort_by(|a, b| {
        a.line
            .value()
            .total_cmp(&b.line.value())
            .then_with(|| a.span.cmp(&b.span))
    });

    let mut problems = Vec::new();
    if annotations.len() != footnotes.len() {
        problems.push(NoteProblem::CountMismatch {
            annotations: annotations.len(),
            footnotes: footnotes.len(),
        });
    }

    let mut notes = Vec::with_capacity(footnotes.len());
    for (annotation, footnote) in annotations.iter().zip(footnotes) {
        if !annotation.line.is(footnote.start_line) {
            let mut excerpt: String = footnote.text.chars().take(20).collect();
            excerpt.push_str(" ...");
            problems.push(NoteProblem::LineMismatch {
                annotation: annotation.line,
                footnote: footnote.start_line,
                excerpt,
            });
        }

        let span = annotation
            .span
            .unwrap_or_else(|| whole_line_span(page, annotation.line, footnote.end_line));
        notes.push(Note {
            span,
            note_type: footnote.note_type.clone(),
            note: footnote.text.clone(),
        });
    }

    if problems.is_empty() {
        Ok(notes)
    } else {
        Err(NoteError {
            folio: folio.to_owned(),
            problems,
        })
    }
}

// from the first block of the line to the last block of the end line
fn whole_line_span(page: &Page, line: LineNumber, end_line: Option<u32>) -> Span {
    let inib = page
        .lines
        .iter()
        .find(|l| l.num == line)
        .or(page.lines.last())
        .map_or(0, |l| l.inib);

    let last_block = page.blocks.len().saturating_sub(1);
    let endb = match end_line.and_then(|end| page.lines.iter().position(|l| l.num.is(end))) {
        Some(i) if i + 1 < page.lines.len() => page.lines[i + 1].inib.saturating_sub(1),
        _ => last_block,
    };
    let endc = page
        .blocks
        .get(endb)
        .map_or(0, |b| b.tok.chars().count().saturating_sub(1));

    Span {
        inib,
        inic: 0,
        endb,
        endc,
    }
}
