use crate::{
    document::Variant,
    rasm::{is_archigrapheme, is_block_final, EMPTY_SET, WORD_SEPARATOR},
};

// The reference reading of a block: the block text with the diplomatic text of every variant
// touching it replaced by the reading of the reference edition.
//
// A variant spanning several blocks has its reference text cut into letter blocks, one per
// block of the span. Extra pieces go to the last block of the span.
pub fn resolve_variant(variants: &[Variant], tok: &str, block: usize) -> String {
    let mut chars: Vec<char> = tok.chars().collect();
    let len = chars.len();

    // [from, to) of tok replaced by the text
    let mut edits: Vec<(usize, usize, String)> = Vec::new();
    for variant in variants {
        let span = variant.span;
        if block < span.inib || span.endb < block {
            continue;
        }

        let edit = if span.inib == span.endb {
            let text = variant
                .reference
                .chars()
                .filter(|&c| c != WORD_SEPARATOR)
                .collect();
            (span.inic, span.endc + 1, text)
        } else {
            let pieces = reference_pieces(&variant.reference);
            let piece = distribute(&pieces, span.endb - span.inib + 1, block - span.inib);
            if block == span.inib {
                (span.inic, len, piece)
            } else if block == span.endb {
                (0, span.endc + 1, piece)
            } else {
                (0, len, piece)
            }
        };
        edits.push(edit);
    }

    // back to front so that the earlier positions stay valid
    edits.sort_by(|a, b| b.0.cmp(&a.0));
    let mut limit = len;
    for (from, to, text) in edits {
        let (from, to) = (from.min(len), to.min(len));
        // overlapping edits: the later one in the text wins
        if limit < to || to < from {
            continue;
        }
        chars.splice(from..to, text.chars());
        limit = from;
    }

    chars.into_iter().collect()
}

// the reference text cut into letter blocks the way the manuscript text is
fn reference_pieces(reference: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut block_final_seen = false;

    for c in reference.chars() {
        if c == WORD_SEPARATOR {
            if !piece.is_empty() {
                pieces.push(std::mem::take(&mut piece));
            }
            block_final_seen = false;
            continue;
        }
        if (is_archigrapheme(c) || c == EMPTY_SET) && block_final_seen && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            block_final_seen = false;
        }
        piece.push(c);
        if is_block_final(c) {
            block_final_seen = true;
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

// piece for the k-th of n blocks
fn distribute(pieces: &[String], n: usize, k: usize) -> String {
    if pieces.len() <= n || k + 1 < n {
        pieces.get(k).cloned().unwrap_or_default()
    } else {
        pieces[n - 1..].concat()
    }
}
