use std::fmt;

use thiserror::Error;

use crate::{
    document::LineNumber,
    error::NoteProblem,
    isame_txt::{grammar::GrammarError, span_tracker::SpanKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

// [[folio.Lline]]
#[derive(Debug, Clone, PartialEq)]
pub struct Locator {
    pub folio: String,
    pub line: Option<LineNumber>,
}

impl Locator {
    pub fn new(folio: &str, line: Option<LineNumber>) -> Self {
        Self {
            folio: folio.to_owned(),
            line,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[[{}.L{}]]", self.folio, line),
            None => write!(f, "[[{}.L?]]", self.folio),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Issue {
    // records
    #[error("one or more records not recognised in file")]
    UnrecognisedRecords,
    #[error("invalid syntax for title {0:?}")]
    InvalidTitle(String),
    #[error("start index not found for hist_id={hist_id:?} signature={signature:?} folio={folio:?}")]
    StartIndexNotFound {
        hist_id: String,
        signature: String,
        folio: String,
    },

    // lines
    #[error("invalid syntax for line {0:?}")]
    InvalidLine(String),
    #[error("line without content")]
    EmptyLine,
    #[error("invalid line number {found}, expected {expected}")]
    LineNumber { expected: u32, found: u32 },
    #[error("line missing final # or next line missing =")]
    MissingContinuation,
    #[error("line ending in # and next line starting with =")]
    UnexpectedContinuation,
    #[error("start block is 1 but first line starts with =")]
    ContinuationOnFirstBlock,
    #[error("start block is {0} but first line does not start with =")]
    MissingContinuationOnFirstLine(u32),

    // validation
    #[error("space found")]
    Space,
    #[error("concatenated # found")]
    DoubleSeparator,
    #[error("opening {{, ⟦, ⟨ or [ found at the end of line")]
    OpeningAtLineEnd,
    #[error("closing }}, ⟧, ⟩ or ] found just after a word separator")]
    ClosingAfterSeparator,
    #[error("an index must always be surrounded by #")]
    IndexNotBounded,
    #[error("reference text empty (\"/=\")")]
    EmptyReference,
    #[error("there might be N, Q or Y in non-final position")]
    NonFinalLetter,
    #[error("letter block split between two lines")]
    BlockSplitAcrossLines,
    #[error("a lacuna cannot include a Quranic index")]
    LacunaEnclosesIndex,
    #[error("subdivision variant without marking the fasila")]
    UnmarkedFasilaSubdivision,
    #[error("note tags cannot appear after a > & or ^, {0:?}")]
    NoteAfterLayer(String),
    #[error("note tags cannot appear within the reference text, {0:?}")]
    NoteInReference(String),
    #[error("{kind} closing tag cannot be inside a correction unless opened there, {excerpt:?}")]
    ClosingInsideCorrection { kind: SpanKind, excerpt: String },
    #[error("unclear/illegible/lacuna/note must wrap the divider, not the other way round")]
    DividerInsideSpan,
    #[error("variant without brackets")]
    VariantWithoutBrackets,

    // scanner
    #[error("{0} opened while already open")]
    AlreadyOpen(SpanKind),
    #[error("{0} closed while not open")]
    NotOpen(SpanKind),
    #[error("{0} without content")]
    EmptySpan(SpanKind),
    #[error("{0} still open at the end of the page")]
    UnclosedSpan(SpanKind),
    #[error("malformed variant, the expected format is [A/B=C=D]")]
    MalformedVariant,
    #[error("character = found in illegal position")]
    MisplacedEqual,
    #[error("unexpected number found")]
    UnexpectedNumber,
    #[error("invalid syntax following {divider} {excerpt:?}: {source}")]
    InvalidDivider {
        divider: &'static str,
        excerpt: String,
        source: GrammarError,
    },
    #[error("invalid sura number {0}, there are 114 suras in the reference text")]
    InvalidSura(u32),
    #[error("invalid verse number: sura {sura} has only {count} verses but {verse} found")]
    InvalidVerse { sura: u32, verse: u32, count: u32 },

    // encoding
    #[error("Y found without ⇓⇒ in tok={0:?}")]
    YWithoutTail(String),
    #[error("illegal Y or G shape symbol or ˀ in tok={0:?}")]
    IllegalShape(String),
    #[error("any of ᵟᵒ°ᵐ found in tok={0:?}")]
    ForbiddenGlyph(String),
    #[error("dot attribute symbols {excerpt:?} found without any preceding ᵘᵢᵃ in tok={token:?}")]
    DotWithoutBase { excerpt: String, token: String },
    #[error("dot/hamza at the beginning of tok={0:?}")]
    DotAtTokenStart(String),
    #[error("erroneous dot sequence in tok={0:?}")]
    ErroneousDotSequence(String),
    #[error("invalid sequence ᵘᵘ, ᵃᵃ or ᵢᵢ in tok={0:?}")]
    DoubledVowel(String),
    #[error("invalid dot syntax {sequence:?} in tok={token:?}: {source}")]
    InvalidDotSyntax {
        sequence: String,
        token: String,
        source: GrammarError,
    },

    #[error(transparent)]
    Note(#[from] NoteProblem),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    pub title: String,
    pub locator: Locator,
    pub issue: Issue,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "Warning",
            Severity::Error => "Fatal error",
        };
        write!(f, "{}: {} in {:?} {}", label, self.issue, self.title, self.locator)
    }
}

// findings across a whole input file
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    findings: Vec<Finding>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, severity: Severity, title: &str, locator: Locator, issue: Issue) {
        let finding = Finding {
            severity,
            title: title.to_owned(),
            locator,
            issue,
        };
        match severity {
            Severity::Warning => tracing::warn!("{}", finding),
            Severity::Error => tracing::error!("{}", finding),
        }
        self.findings.push(finding);
    }

    pub fn error(&mut self, title: &str, locator: Locator, issue: Issue) {
        self.record(Severity::Error, title, locator, issue);
    }

    pub fn warning(&mut self, title: &str, locator: Locator, issue: Issue) {
        self.record(Severity::Warning, title, locator, issue);
    }

    pub fn has_fatal(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}
