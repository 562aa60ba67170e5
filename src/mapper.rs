// Alignment of parsed pages with the reference text
//
// The indices counted while scanning follow the words of the manuscript. Here every content block
// is matched against the reference tokens instead, so that blocks end up with the canonical
// indices of the reference edition even where the manuscript has variants, gaps or
// transpositions.

mod context;
mod rules;
mod variant;

pub use context::{Assignment, MatchContext, Neighbour, Outcome, Previous};
pub use rules::{Rule, CASCADE};
pub use variant::resolve_variant;

use crate::{
    document::{Document, Page},
    error::AlignmentError,
    rasm::skeleton,
    reference::{IndexRange, ReferenceProvider},
};

#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    pub debug: bool,
}

// one matched block, recorded in debug mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub folio: String,
    pub block: usize,
    pub token: String,
    pub rule: &'static str,
    pub manuscript: (usize, usize), // cursor before, after
    pub reference: (usize, usize),
}

pub fn map_documents(
    documents: &mut [Document],
    provider: &impl ReferenceProvider,
    options: &MapOptions,
) -> Result<Vec<AuditEntry>, AlignmentError> {
    let mut audit = Vec::new();
    for i in 0..documents.len() {
        audit.extend(map_document_at(documents, i, provider, options)?);
    }
    Ok(audit)
}

// pages are mapped in order: a word cut by a page break is matched with the neighbouring pages
// of the same manuscript
pub fn map_document_at(
    documents: &mut [Document],
    i: usize,
    provider: &impl ReferenceProvider,
    options: &MapOptions,
) -> Result<Vec<AuditEntry>, AlignmentError> {
    let hist_id = documents[i].meta.hist_id.clone();
    let same_manuscript = |d: &&Document| d.meta.hist_id == hist_id;

    let next_page_first = documents
        .get(i + 1)
        .filter(same_manuscript)
        .and_then(|d| d.page.blocks.first())
        .map(|b| skeleton(&b.tok));
    let previous_page_last = i
        .checked_sub(1)
        .and_then(|j| documents.get(j))
        .filter(same_manuscript)
        .and_then(|d| d.page.blocks.last())
        .map(|b| skeleton(&b.tok));

    let document = &mut documents[i];
    document.meta.ini_index = None;
    let folio = document.meta.folio.clone();
    let page = &mut document.page;

    let range = page_range(page, &folio)?;
    let reference = provider.tokens(&range)?;
    tracing::debug!(
        folio = %folio,
        start = %range.start,
        end = %range.end,
        tokens = reference.len(),
        "mapping page"
    );

    let mut audit = Vec::new();
    let (mut ibloc, mut iref) = (0, 0);
    let mut previous: Option<Previous> = None;

    while ibloc < page.blocks.len() {
        // dividers are not part of the reference text
        if page.is_unindexed(ibloc) {
            page.blocks[ibloc].ind.clear();
            ibloc += 1;
            continue;
        }

        while reference.get(iref).is_some_and(|t| t.is_ornament()) {
            iref += 1;
        }
        if reference.len() <= iref {
            return Err(AlignmentError::ReferenceExhausted {
                folio,
                line: line_label(page, ibloc),
                token: page.blocks[ibloc].tok.clone(),
            });
        }

        let context = MatchContext::new(
            page,
            ibloc,
            &reference,
            iref,
            previous.as_ref(),
            next_page_first.as_deref(),
            previous_page_last.as_deref(),
        );
        let matched = CASCADE
            .iter()
            .find_map(|(name, rule)| rule(&context).map(|outcome| (*name, outcome)));
        let Some((rule, outcome)) = matched else {
            tracing::debug!(
                block = ibloc,
                tok = context.raw,
                skeleton = %context.skeleton,
                resolved = %context.resolved,
                reference = %reference[iref].rasm,
                "no rule matched"
            );
            return Err(AlignmentError::Inconsistent {
                folio,
                line: line_label(page, ibloc),
                token: page.blocks[ibloc].tok.clone(),
            });
        };
        let current = Previous {
            index: ibloc,
            skeleton: context.skeleton.clone(),
            resolved_skeleton: context.resolved_skeleton.clone(),
        };

        for assignment in outcome.assignments {
            match assignment {
                Assignment::Set { offset, indices } => {
                    if page.is_unindexed(ibloc + offset) {
                        continue;
                    }
                    if let Some(block) = page.blocks.get_mut(ibloc + offset) {
                        block.ind = indices;
                    }
                }
                Assignment::AppendToPrevious(index) => {
                    if let Some(previous) = &previous {
                        page.blocks[previous.index].ind.push(index);
                    }
                }
            }
        }

        let (next_ibloc, next_iref) = match (
            ibloc.checked_add_signed(outcome.manuscript_step),
            iref.checked_add_signed(outcome.reference_step),
        ) {
            (Some(b), Some(r)) => (b, r),
            _ => {
                return Err(AlignmentError::Inconsistent {
                    folio,
                    line: line_label(page, ibloc),
                    token: page.blocks[ibloc].tok.clone(),
                })
            }
        };

        tracing::debug!(
            block = ibloc,
            tok = %page.blocks[ibloc].tok,
            rule,
            reference = %reference[iref].rasm,
            ind = ?page.blocks[ibloc].ind,
            "matched"
        );
        if options.debug {
            audit.push(AuditEntry {
                folio: folio.clone(),
                block: ibloc,
                token: page.blocks[ibloc].tok.clone(),
                rule,
                manuscript: (ibloc, next_ibloc),
                reference: (iref, next_iref),
            });
        }

        // a block tried again keeps the same previous block
        if outcome.manuscript_step != 0 {
            previous = Some(current);
        }
        ibloc = next_ibloc;
        iref = next_iref;
    }

    Ok(audit)
}

// from the first indexed block to the start of the sura after the last one
fn page_range(page: &Page, folio: &str) -> Result<IndexRange, AlignmentError> {
    let first = page.blocks.iter().find_map(|b| b.ind.first().copied());
    let last = page.blocks.iter().rev().find_map(|b| b.ind.first().copied());
    match (first, last) {
        (Some(first), Some(last)) => Ok(IndexRange::through_sura(first, last.sura)?),
        _ => Err(AlignmentError::UnindexedPage(folio.to_owned())),
    }
}

fn line_label(page: &Page, block: usize) -> String {
    page.line_of(block)
        .map_or_else(|| "?".to_owned(), |line| line.to_string())
}
