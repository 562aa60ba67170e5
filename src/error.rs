use thiserror::Error;

use crate::{
    diagnostics::Diagnostics,
    document::{CanonicalIndex, LineNumber},
};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("parsing aborted, {} error(s) found", .0.error_count())]
    Syntax(Diagnostics),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoteProblem {
    #[error("mismatch in the number of note annotations ({annotations}) and footnotes ({footnotes})")]
    CountMismatch { annotations: usize, footnotes: usize },
    #[error("note annotation on line {annotation} and footnote {excerpt:?} for line {footnote} refer to different lines")]
    LineMismatch {
        annotation: LineNumber,
        footnote: u32,
        excerpt: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("error merging notes in {folio}")]
pub struct NoteError {
    pub folio: String,
    pub problems: Vec<NoteProblem>,
}

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("inconsistent mapping against the reference text in [[{folio}.L{line}]] bloc={token}")]
    Inconsistent {
        folio: String,
        line: String,
        token: String,
    },
    #[error("reference text exhausted in [[{folio}.L{line}]] bloc={token}")]
    ReferenceExhausted {
        folio: String,
        line: String,
        token: String,
    },
    #[error("page {0} has no indexed block")]
    UnindexedPage(String),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReferenceError {
    #[error("start index not found for hist_id={hist_id:?} signature={signature:?} folio={folio:?}")]
    StartIndexNotFound {
        hist_id: String,
        signature: String,
        folio: String,
    },
    #[error("invalid index range {start} .. {end}")]
    InvalidRange {
        start: CanonicalIndex,
        end: CanonicalIndex,
    },
}
