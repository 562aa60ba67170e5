use crate::{
    diagnostics::{Diagnostics, Issue, Locator},
    document::{CanonicalIndex, Document, Meta},
    error::ParseError,
    isame_txt::{
        encoding::check_encoding,
        note_merger::merge_notes,
        record::{parse_footnotes, parse_line, parse_title, split_records, RawRecord, Title},
        scanner::scan_page,
        validator::{check_first_line, check_lines},
    },
    reference::StartIndexProvider,
};

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub dot_check: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { dot_check: true }
    }
}

#[derive(Debug)]
pub struct Parsed {
    pub documents: Vec<Document>,
    pub diagnostics: Diagnostics, // warnings only
}

// every record is parsed even after an error, so that all defects of the file are reported at once
pub fn parse_isame_txt(
    txt: &str,
    indexes: &impl StartIndexProvider,
    options: &ParseOptions,
) -> Result<Parsed, ParseError> {
    let txt = txt.replace("\r\n", "\n");
    let mut diagnostics = Diagnostics::new();

    let (records, titles) = split_records(&txt);
    if records.len() != titles {
        diagnostics.error("", Locator::new("?", None), Issue::UnrecognisedRecords);
    }

    let mut documents = Vec::with_capacity(records.len());
    for record in &records {
        documents.push(parse_record(record, indexes, options, &mut diagnostics));
    }

    if diagnostics.has_fatal() {
        return Err(ParseError::Syntax(diagnostics));
    }

    tracing::info!(pages = documents.len(), warnings = diagnostics.findings().len(), "parsed");
    Ok(Parsed {
        documents,
        diagnostics,
    })
}

fn parse_record(
    record: &RawRecord,
    indexes: &impl StartIndexProvider,
    options: &ParseOptions,
    diagnostics: &mut Diagnostics,
) -> Document {
    let title = parse_title(record.title);
    if title.is_none() {
        diagnostics.error(
            record.title,
            Locator::new("?", None),
            Issue::InvalidTitle(record.title.to_owned()),
        );
    }
    let Title {
        hist_id,
        location,
        signature,
        folio,
        side,
    } = title.unwrap_or_else(|| Title {
        hist_id: String::new(),
        location: String::new(),
        signature: String::new(),
        folio: "?".to_owned(),
        side: String::new(),
    });

    let start = if hist_id.is_empty() {
        None
    } else {
        match indexes.start_index(&hist_id, &signature, &folio) {
            Ok(start) => Some(start),
            Err(_) => {
                diagnostics.error(
                    record.title,
                    Locator::new(&folio, None),
                    Issue::StartIndexNotFound {
                        hist_id: hist_id.clone(),
                        signature: signature.clone(),
                        folio: folio.clone(),
                    },
                );
                None
            }
        }
    };
    tracing::debug!(title = record.title, ?start, "parsing page");

    let mut lines = Vec::new();
    for line in record.body.lines().filter(|l| !l.is_empty()) {
        match parse_line(line) {
            Some(line) => lines.push(line),
            None => diagnostics.error(
                record.title,
                Locator::new(&folio, None),
                Issue::InvalidLine(line.to_owned()),
            ),
        }
    }

    check_lines(record.title, &folio, &lines, diagnostics);
    if let (Some(first), Some(start)) = (lines.first(), start) {
        check_first_line(record.title, &folio, first, start.block, diagnostics);
    }

    // the counters still run from a placeholder so that the rest of the page gets checked
    let seed = start.unwrap_or(CanonicalIndex::new(1, 1, 1, 1));
    let scanned = scan_page(record.title, &folio, seed, &lines, diagnostics);
    let mut page = scanned.page;

    if record.notes.is_some() || !scanned.inline_notes.is_empty() || !scanned.line_notes.is_empty()
    {
        let footnotes = parse_footnotes(record.notes.unwrap_or_default());
        match merge_notes(
            &folio,
            &page,
            &scanned.inline_notes,
            &scanned.line_notes,
            &footnotes,
        ) {
            Ok(notes) => page.notes = notes,
            Err(error) => {
                for problem in error.problems {
                    diagnostics.error(record.title, Locator::new(&folio, None), problem.into());
                }
            }
        }
    }

    check_encoding(record.title, &folio, &page, options.dot_check, diagnostics);

    Document {
        meta: Meta {
            title: record.title.to_owned(),
            hist_id,
            location,
            signature,
            folio,
            side,
            ini_index: start,
            source: record.source.to_owned(),
        },
        page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::Severity, document::LineNumber, reference::StartIndexTable,
    };

    fn indexes() -> StartIndexTable {
        let mut table = StartIndexTable::default();
        table.insert("F001", "Sig1", "1r", CanonicalIndex::new(1, 1, 1, 1));
        table.insert("F001", "Sig1", "1v", CanonicalIndex::new(1, 2, 2, 2));
        table
    }

    fn parse(txt: &str) -> Result<Parsed, ParseError> {
        parse_isame_txt(txt, &indexes(), &ParseOptions::default())
    }

    fn errors(error: ParseError) -> Vec<Issue> {
        let ParseError::Syntax(diagnostics) = error;
        diagnostics.errors().map(|f| f.issue.clone()).collect()
    }

    #[test]
    fn pages_with_metadata() {
        let parsed = parse(
            "TITLE:F001_Q.1:1-1:2_Cairo_Sig1_f.1r_flesh\r
Source:photo\r
|1|BSM#ALLH#\r
|2|ALRHMN#\r
TITLE:F001_Q.1:2-1:3_Cairo_Sig1_f.1v_hair
Source:photo
|1|=LH#ALRB#
",
        )
        .unwrap();

        assert_eq!(parsed.documents.len(), 2);
        let meta = &parsed.documents[0].meta;
        assert_eq!(meta.hist_id, "F001");
        assert_eq!(meta.location, "Cairo");
        assert_eq!(meta.folio, "1r");
        assert_eq!(meta.side, "flesh");
        assert_eq!(meta.source, "photo");
        assert_eq!(meta.ini_index, Some(CanonicalIndex::new(1, 1, 1, 1)));

        let page = &parsed.documents[1].page;
        assert_eq!(page.blocks[0].tok, "LH");
        assert_eq!(page.blocks[0].ind, vec![CanonicalIndex::new(1, 2, 2, 2)]);
        assert_eq!(page.lines[0].num, LineNumber::new(1));
    }

    #[test]
    fn errors_are_collected_across_records() {
        let error = parse(
            "TITLE:F001_Q.1:1-1:2_Cairo_Sig1_f.1r_flesh
Source:photo
|1|BSM #
TITLE:F001_Q.1:1-1:2_Cairo_Sig1_f.9r_flesh
Source:photo
|1|BSM#
",
        )
        .unwrap_err();

        let issues = errors(error);
        assert!(issues.contains(&Issue::Space));
        assert!(issues.iter().any(|i| matches!(
            i,
            Issue::StartIndexNotFound { folio, .. } if folio == "9r"
        )));
    }

    #[test]
    fn invalid_title_and_line() {
        let issues = errors(
            parse(
                "TITLE:nonsense
Source:photo
|1|BSM#
1|BSM#
",
            )
            .unwrap_err(),
        );
        assert!(issues.contains(&Issue::InvalidTitle("nonsense".to_owned())));
        assert!(issues.contains(&Issue::InvalidLine("1|BSM#".to_owned())));
    }

    #[test]
    fn unrecognised_record() {
        let issues = errors(parse("TITLE:F001_Q.1:1-1:2_Cairo_Sig1_f.1r_flesh\n").unwrap_err());
        assert_eq!(issues, vec![Issue::UnrecognisedRecords]);
    }

    #[test]
    fn notes_are_merged() {
        let parsed = parse(
            "TITLE:F001_Q.1:1-1:2_Cairo_Sig1_f.1r_flesh
Source:photo
|1|BSM#(ALLH)#
(|2|ALRHMN#)
Notes:
|L1.ink|red ink
|L2.hand|later hand
",
        )
        .unwrap();

        let notes = &parsed.documents[0].page.notes;
        assert_eq!(notes.len(), 2);
        assert_eq!((notes[0].note_type.as_str(), notes[0].note.as_str()), ("ink", "red ink"));
        assert_eq!((notes[0].span.inib, notes[0].span.endb), (1, 2));
        assert_eq!(notes[1].note, "later hand");
        assert_eq!(notes[1].span.inib, 3);
    }

    #[test]
    fn note_count_mismatch_is_an_error() {
        let issues = errors(
            parse(
                "TITLE:F001_Q.1:1-1:2_Cairo_Sig1_f.1r_flesh
Source:photo
|1|BSM#(ALLH)#
Notes:
",
            )
            .unwrap_err(),
        );
        assert!(issues.iter().any(|i| matches!(i, Issue::Note(_))));
    }

    #[test]
    fn dot_check_can_be_disabled() {
        let txt = "TITLE:F001_Q.1:1-1:2_Cairo_Sig1_f.1r_flesh
Source:photo
|1|Bᵒ#
";
        assert!(parse(txt).is_err());

        let options = ParseOptions { dot_check: false };
        let parsed = parse_isame_txt(txt, &indexes(), &options).unwrap();
        assert!(parsed
            .diagnostics
            .findings()
            .iter()
            .all(|f| f.severity == Severity::Warning));
    }
}
