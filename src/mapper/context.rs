use crate::{
    document::{CanonicalIndex, Page},
    rasm::{skeleton, EMPTY_SET},
    reference::ReferenceToken,
};

use super::variant::resolve_variant;

#[derive(Debug, Clone, PartialEq)]
pub struct Neighbour {
    pub raw: String,
    pub skeleton: String,
    pub resolved_skeleton: String,
}

// last content block that moved the manuscript cursor
#[derive(Debug, Clone, PartialEq)]
pub struct Previous {
    pub index: usize,
    pub skeleton: String,
    pub resolved_skeleton: String,
}

// what a rule may look at when matching one block against the reference stream
#[derive(Debug)]
pub struct MatchContext<'a> {
    pub raw: &'a str,
    pub skeleton: String,
    pub resolved: String,
    pub resolved_skeleton: String,

    // following content blocks, None at a divider
    pub next: Option<Neighbour>,
    pub next2: Option<Neighbour>,
    pub previous: Option<&'a Previous>,

    pub word_subdivision: bool, // ∅ under a [∅/#...] variant
    pub is_first: bool,
    pub is_last: bool,
    pub next_page_first: Option<&'a str>, // skeletons
    pub previous_page_last: Option<&'a str>,

    reference: &'a [ReferenceToken],
    cursor: usize,
}

impl<'a> MatchContext<'a> {
    pub fn new(
        page: &'a Page,
        block: usize,
        reference: &'a [ReferenceToken],
        cursor: usize,
        previous: Option<&'a Previous>,
        next_page_first: Option<&'a str>,
        previous_page_last: Option<&'a str>,
    ) -> Self {
        let raw = page.blocks[block].tok.as_str();
        let resolved = resolve_variant(&page.variants, raw, block);

        let neighbour = |i: usize| {
            if page.is_unindexed(i) {
                return None;
            }
            page.blocks.get(i).map(|b| Neighbour {
                raw: b.tok.clone(),
                skeleton: skeleton(&b.tok),
                resolved_skeleton: skeleton(&resolve_variant(&page.variants, &b.tok, i)),
            })
        };

        let word_subdivision = raw
            .chars()
            .position(|c| c == EMPTY_SET)
            .is_some_and(|ch| page.variants.iter().any(|v| v.is_word_subdivision_at(block, ch)));

        Self {
            raw,
            skeleton: skeleton(raw),
            resolved_skeleton: skeleton(&resolved),
            resolved,
            next: neighbour(block + 1),
            next2: neighbour(block + 2),
            previous,
            word_subdivision,
            is_first: block == 0,
            is_last: block + 1 == page.blocks.len(),
            next_page_first,
            previous_page_last,
            reference,
            cursor,
        }
    }

    pub fn current(&self) -> Option<&'a ReferenceToken> {
        self.reference.get(self.cursor)
    }

    pub fn ahead(&self, n: usize) -> Option<&'a ReferenceToken> {
        self.reference.get(self.cursor + n)
    }

    // the last word before the cursor, ornaments skipped
    pub fn behind(&self) -> Option<&'a ReferenceToken> {
        self.reference[..self.cursor.min(self.reference.len())]
            .iter()
            .rev()
            .find(|t| !t.is_ornament())
    }

    // the reference tokens from the cursor on, at most n
    pub fn run(&self, n: usize) -> &'a [ReferenceToken] {
        let start = self.cursor.min(self.reference.len());
        let end = (self.cursor + n).min(self.reference.len());
        &self.reference[start..end]
    }
}

pub enum Assignment {
    Set {
        offset: usize, // from the current block
        indices: Vec<CanonicalIndex>,
    },
    AppendToPrevious(CanonicalIndex),
}

pub struct Outcome {
    pub assignments: Vec<Assignment>,
    pub manuscript_step: isize,
    pub reference_step: isize,
}

impl Outcome {
    pub fn set(indices: Vec<CanonicalIndex>, manuscript_step: isize, reference_step: isize) -> Self {
        Self {
            assignments: vec![Assignment::Set { offset: 0, indices }],
            manuscript_step,
            reference_step,
        }
    }

    // same index on the current and the next block
    pub fn set_both(index: CanonicalIndex, reference_step: isize) -> Self {
        Self {
            assignments: vec![
                Assignment::Set {
                    offset: 0,
                    indices: vec![index],
                },
                Assignment::Set {
                    offset: 1,
                    indices: vec![index],
                },
            ],
            manuscript_step: 2,
            reference_step,
        }
    }
}
