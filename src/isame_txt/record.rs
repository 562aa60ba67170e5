// Page records of an InterSaME text file
//
// TITLE:<title>
// Source:<source>
// <body>
// Notes:
// <footnotes>

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::LineNumber;

#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord<'a> {
    pub title: &'a str,
    pub source: &'a str,
    pub body: &'a str,
    pub notes: Option<&'a str>,
}

// records, and the number of "TITLE:" headers found; a header that does not
// start a well-formed record is not returned
pub fn split_records(txt: &str) -> (Vec<RawRecord>, usize) {
    let starts: Vec<usize> = txt.match_indices("TITLE:").map(|(i, _)| i).collect();

    let mut records = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(txt.len());
        if let Some(record) = parse_record(&txt[start + "TITLE:".len()..end]) {
            records.push(record);
        }
    }

    (records, starts.len())
}

fn parse_record(chunk: &str) -> Option<RawRecord> {
    let (title, rest) = chunk.split_once('\n')?;
    let rest = rest.strip_prefix("Source:")?;
    let (source, rest) = rest.split_once('\n')?;

    let (body, notes) = match rest.find("Notes:\n") {
        Some(i) => (&rest[..i], Some(&rest[i + "Notes:\n".len()..])),
        None => (rest, None),
    };

    let (title, source, body) = (title.trim(), source.trim(), body.trim());
    if title.is_empty() || source.is_empty() || body.is_empty() {
        return None;
    }

    Some(RawRecord {
        title,
        source,
        body,
        notes,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub hist_id: String,
    pub location: String,
    pub signature: String,
    pub folio: String,
    pub side: String,
}

// F001_Q.1:1-1:7_Cairo_Sig1_f.1r_flesh
pub fn parse_title(title: &str) -> Option<Title> {
    static TITLE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^([FDU][0-9]{3})_Q\.[0-9:\-]+?_(.+?)_(.+?)_f\.([0-9]{1,3}[rv])_((?:hair|flesh)\??|\?)$",
        )
        .unwrap()
    });

    let captures = TITLE.captures(title)?;
    Some(Title {
        hist_id: captures[1].to_owned(),
        location: captures[2].to_owned(),
        signature: captures[3].to_owned(),
        folio: captures[4].to_owned(),
        side: captures[5].to_owned(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLabel {
    Number(u32),
    Interlinear, // |-|
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawLine<'a> {
    pub label: LineLabel,
    pub whole_line_note: bool, // (|n|) or (|n|...)
    pub content: &'a str,
}

impl RawLine<'_> {
    pub fn number(&self, previous: Option<LineNumber>) -> LineNumber {
        match self.label {
            LineLabel::Number(n) => LineNumber::new(n),
            LineLabel::Interlinear => LineNumber::interlinear_after(previous),
        }
    }
}

// |n|content, |-|content, (|n|)content or (|n|content)
pub fn parse_line(line: &str) -> Option<RawLine> {
    static LINE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(\()?\|(-|[0-9]{1,2})\|(\))?([^|]*)$").unwrap());

    let captures = LINE.captures(line)?;
    let opened = captures.get(1).is_some();
    let closed = captures.get(3).is_some();
    let mut content = captures.get(4).map_or("", |m| m.as_str());

    match (opened, closed) {
        (true, false) => content = content.strip_suffix(')')?,
        (false, true) => return None,
        _ => {}
    }

    let label = match &captures[2] {
        "-" => LineLabel::Interlinear,
        n => LineLabel::Number(n.parse().ok()?),
    };

    Some(RawLine {
        label,
        whole_line_note: opened,
        content,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footnote {
    pub start_line: u32,
    pub end_line: Option<u32>,
    pub note_type: String,
    pub text: String,
}

// |L<n>[-<m>].<type>|<text>, the text runs until the next footnote
pub fn parse_footnotes(notes: &str) -> Vec<Footnote> {
    static HEADER: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\|L([0-9]{1,2})(?:-([0-9]{1,2}))?\.([^|]+)\|").unwrap());

    let headers: Vec<_> = HEADER.captures_iter(notes).collect();

    let mut footnotes = Vec::new();
    for (i, captures) in headers.iter().enumerate() {
        let (Some(header), Ok(start_line)) = (captures.get(0), captures[1].parse::<u32>()) else {
            continue;
        };
        let text_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(notes.len(), |m| m.start());

        footnotes.push(Footnote {
            start_line,
            end_line: captures.get(2).and_then(|m| m.as_str().parse().ok()),
            note_type: captures[3].to_owned(),
            text: notes[header.end()..text_end].trim().to_owned(),
        });
    }
    footnotes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_split_at_titles() {
        let txt = "TITLE:F001_Q.1:1-1:7_Cairo_Sig1_f.1r_flesh
Source:example
|1|=ABGDR#
TITLE:F001_Q.1:7-2:3_Cairo_Sig1_f.1v_hair
Source:example2
|1|ALM#
Notes:
|L1.dots|dotted
";
        let (records, titles) = split_records(txt);
        assert_eq!(titles, 2);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].body, "|1|=ABGDR#");
        assert_eq!(records[0].notes, None);
        assert_eq!(records[1].source, "example2");
        assert_eq!(records[1].body, "|1|ALM#");
        assert_eq!(records[1].notes, Some("|L1.dots|dotted\n"));
    }

    #[test]
    fn record_without_source_is_not_recognised() {
        let (records, titles) = split_records("TITLE:F001_x\n|1|ALM#\n");
        assert_eq!(titles, 1);
        assert!(records.is_empty());
    }

    #[test]
    fn title() {
        let title = parse_title("F001_Q.1:1-1:7_Cairo_Sig1_f.1r_flesh").unwrap();
        assert_eq!(
            title,
            Title {
                hist_id: "F001".to_owned(),
                location: "Cairo".to_owned(),
                signature: "Sig1".to_owned(),
                folio: "1r".to_owned(),
                side: "flesh".to_owned(),
            }
        );
        assert_eq!(
            parse_title("D012_Q.2:1-2:9_Paris_BnF.Ar.330b_f.12v_?")
                .unwrap()
                .side,
            "?"
        );
        assert!(parse_title("X001_Q.1:1_Cairo_Sig1_f.1r_flesh").is_none());
        assert!(parse_title("F001_Q.1:1_Cairo_Sig1_f.1r_paper").is_none());
    }

    #[test]
    fn lines() {
        let line = parse_line("|12|=ABG#").unwrap();
        assert_eq!(line.label, LineLabel::Number(12));
        assert!(!line.whole_line_note);
        assert_eq!(line.content, "=ABG#");

        let line = parse_line("(|3|)ALM#").unwrap();
        assert!(line.whole_line_note);
        assert_eq!(line.content, "ALM#");

        let line = parse_line("(|3|ALM#)").unwrap();
        assert!(line.whole_line_note);
        assert_eq!(line.content, "ALM#");

        let line = parse_line("|-|ALM#").unwrap();
        assert_eq!(
            line.number(Some(LineNumber::new(4))),
            LineNumber::interlinear_after(Some(LineNumber::new(4)))
        );

        assert!(parse_line("ALM#").is_none());
        assert!(parse_line("|1|)ALM#").is_none());
        assert!(parse_line("|123|ALM#").is_none());
    }

    #[test]
    fn footnotes() {
        let footnotes = parse_footnotes("|L2.dots|first note\n|L3-5.layers|second\nnote|L7.reading|x");
        assert_eq!(footnotes.len(), 3);
        assert_eq!(
            footnotes[0],
            Footnote {
                start_line: 2,
                end_line: None,
                note_type: "dots".to_owned(),
                text: "first note".to_owned(),
            }
        );
        assert_eq!(footnotes[1].end_line, Some(5));
        assert_eq!(footnotes[1].text, "second\nnote");
        assert_eq!(footnotes[2].text, "x");
    }
}
