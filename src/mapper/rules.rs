// Matching rules, tried in order on every content block
//
// Each rule looks at the current block (raw and with variants resolved), its neighbours and the
// reference tokens around the cursor. The first rule returning an outcome wins.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::rasm::{split_blocks, strip_final_alif};

use super::context::{Assignment, MatchContext, Outcome};

pub type Rule = fn(&MatchContext) -> Option<Outcome>;

pub static CASCADE: &[(&str, Rule)] = &[
    ("exact", exact),
    ("word_subdivision", word_subdivision),
    ("split", split),
    ("resolved", resolved),
    ("resolved_two", resolved_two),
    ("glide", glide),
    ("lookahead", lookahead),
    ("lookbehind_append", lookbehind_append),
    ("lookbehind_concat", lookbehind_concat),
    ("transposition", transposition),
    ("lookbehind_suffix", lookbehind_suffix),
    ("elided_glide", elided_glide),
    ("estimate", estimate),
    ("trailing_alif", trailing_alif),
    ("cross_page", cross_page),
    ("multi_block", multi_block),
];

fn exact(ctx: &MatchContext) -> Option<Outcome> {
    let current = ctx.current()?;
    (ctx.skeleton == current.rasm).then(|| Outcome::set(vec![current.index], 1, 1))
}

// #KL∅MA# with [∅/#=sub=words]: two reference words written as one
fn word_subdivision(ctx: &MatchContext) -> Option<Outcome> {
    if !ctx.word_subdivision {
        return None;
    }
    let (current, next) = (ctx.current()?, ctx.ahead(1)?);
    Some(Outcome::set(vec![current.index, next.index], 1, 2))
}

// #KLᵃ©→↕[#/∅=sub=words]MA#: one reference word written as two
fn split(ctx: &MatchContext) -> Option<Outcome> {
    let (current, next) = (ctx.current()?, ctx.next.as_ref()?);
    (ctx.raw != "∅" && format!("{}{}", ctx.skeleton, next.skeleton) == current.rasm)
        .then(|| Outcome::set_both(current.index, 1))
}

// [B/S=...]
fn resolved(ctx: &MatchContext) -> Option<Outcome> {
    let current = ctx.current()?;
    (ctx.resolved_skeleton == current.rasm).then(|| Outcome::set(vec![current.index], 1, 1))
}

// #E[∅/A=r=long.vwl.noun]LBA#
fn resolved_two(ctx: &MatchContext) -> Option<Outcome> {
    let (current, next) = (ctx.current()?, ctx.ahead(1)?);
    (ctx.resolved_skeleton == format!("{}{}", current.rasm, next.rasm))
        .then(|| Outcome::set(vec![current.index, next.index], 1, 2))
}

// #W[(A)>∅/∅=r=synt.sg.pl.dual]EᵢB...#: the alif belongs to the word already matched
fn glide(ctx: &MatchContext) -> Option<Outcome> {
    let (current, behind, next) = (ctx.current()?, ctx.behind()?, ctx.next.as_ref()?);
    (ctx.raw == "A" && ctx.resolved == "∅A" && next.skeleton == current.rasm)
        .then(|| Outcome::set(vec![behind.index], 1, 0))
}

// #S,,,B,,+,,[A/B=r=hamza]+ˀ˦H#
fn lookahead(ctx: &MatchContext) -> Option<Outcome> {
    let (current, next) = (ctx.current()?, ctx.next.as_ref()?);
    (format!("{}{}", ctx.resolved_skeleton, next.resolved_skeleton) == current.rasm)
        .then(|| Outcome::set_both(current.index, 1))
}

// [⟨1-2r⟩>∅/∅=r=unknown]D’[⟨1-2r⟩>LKM/LKM=r=unknown]#: the previous block already holds the
// reference word, the current block is tried again against the next one
fn lookbehind_append(ctx: &MatchContext) -> Option<Outcome> {
    let (current, previous) = (ctx.current()?, ctx.previous?);
    (!current.rasm.is_empty() && previous.resolved_skeleton.ends_with(&current.rasm)).then(|| {
        Outcome {
            assignments: vec![Assignment::AppendToPrevious(current.index)],
            manuscript_step: 0,
            reference_step: 1,
        }
    })
}

// #A[⟨1-2r⟩>S+,,,/S=r=unknown]B’’HR’
fn lookbehind_concat(ctx: &MatchContext) -> Option<Outcome> {
    let (current, previous) = (ctx.current()?, ctx.previous?);
    let joined = format!("{}{}", previous.resolved_skeleton, ctx.resolved_skeleton);
    (!current.rasm.is_empty() && joined.ends_with(&current.rasm))
        .then(|| Outcome::set(vec![current.index], 1, 1))
}

// D[WA/AW=r=spell.vwl.AYW]Dᵃ←+a#
fn transposition(ctx: &MatchContext) -> Option<Outcome> {
    let (current, ahead, next) = (ctx.current()?, ctx.ahead(1)?, ctx.next.as_ref()?);
    (ctx.skeleton == ahead.rasm && next.skeleton == current.rasm).then(|| Outcome {
        assignments: vec![
            Assignment::Set {
                offset: 0,
                indices: vec![ahead.index],
            },
            Assignment::Set {
                offset: 1,
                indices: vec![current.index],
            },
        ],
        manuscript_step: 2,
        reference_step: 2,
    })
}

// #SBᵢ→≠![AB’’H>B’’ᵘ→©Hᵘ©/BˀᵘHᵘʷ=r=ta.marb]#: the block repeats the end of the previous one
fn lookbehind_suffix(ctx: &MatchContext) -> Option<Outcome> {
    let (behind, previous) = (ctx.behind()?, ctx.previous?);
    (!ctx.skeleton.is_empty() && previous.skeleton.ends_with(&ctx.skeleton))
        .then(|| Outcome::set(vec![behind.index], 1, 0))
}

// #RE[{MWA}>MB’’Mᵘ/MᵒB’’ᵘM=r=synt.pron]#MN#
fn elided_glide(ctx: &MatchContext) -> Option<Outcome> {
    let (current, ahead) = (ctx.current()?, ctx.ahead(1)?);
    let (next, next2) = (ctx.next.as_ref()?, ctx.next2.as_ref()?);
    (next.raw == "A" && next2.skeleton == ahead.rasm)
        .then(|| Outcome::set_both(current.index, 1))
}

// #BG[5-6r>BKM#: letters lost in a gap whose size is estimated
fn estimate(ctx: &MatchContext) -> Option<Outcome> {
    static ESTIMATE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[1-9][0-9]*(?:-[1-9][0-9]*)?r").unwrap());

    let (current, ahead, next) = (ctx.current()?, ctx.ahead(1)?, ctx.next.as_ref()?);
    (ESTIMATE.is_match(ctx.raw)
        && current.rasm.starts_with(&ctx.skeleton)
        && next.skeleton == ahead.rasm)
        .then(|| Outcome::set(vec![current.index], 1, 1))
}

// #G,[Aᵢ←↑B/ᵢBˀᵒ=r=hamza]B’’ᵢ!+i#
fn trailing_alif(ctx: &MatchContext) -> Option<Outcome> {
    let (current, next) = (ctx.current()?, ctx.next.as_ref()?);
    let stem = strip_final_alif(&ctx.skeleton)?;
    (format!("{}{}", stem, next.skeleton) == current.rasm
        && current.rasm.starts_with(&ctx.resolved_skeleton))
        .then(|| Outcome::set_both(current.index, 1))
}

// a word cut by the page break, with its alif elided:
// #ALF[A/∅ᵃᴬ=r=spell.vwl.AYW] | (=S)FWNᵃ#
fn cross_page(ctx: &MatchContext) -> Option<Outcome> {
    let current = ctx.current()?;

    let with_next_page = ctx.is_last
        && ctx.next_page_first.is_some_and(|first| {
            strip_final_alif(&ctx.skeleton)
                .is_some_and(|stem| format!("{}{}", stem, first) == current.rasm)
        });
    let with_previous_page = ctx.is_first
        && ctx.previous_page_last.is_some_and(|last| {
            strip_final_alif(last)
                .is_some_and(|stem| format!("{}{}", stem, ctx.skeleton) == current.rasm)
        });

    (with_next_page || with_previous_page).then(|| Outcome::set(vec![current.index], 1, 1))
}

// [∅>WAᵃ©→↑M⟨BEB⟩ᵢ⟨KM⟩/WᵃAˀᵃMᵒB’’ᵢEᵃB’’ᵢKᵘMᵒ=r=mech.haplog]
fn multi_block(ctx: &MatchContext) -> Option<Outcome> {
    let blocks = split_blocks(&ctx.resolved_skeleton);
    if blocks.is_empty() {
        return None;
    }

    let run = ctx.run(blocks.len());
    let matches = run.len() == blocks.len() && run.iter().zip(&blocks).all(|(r, b)| r.rasm == *b);
    matches.then(|| {
        Outcome::set(
            run.iter().map(|r| r.index).collect(),
            1,
            blocks.len() as isize,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        document::{Block, CanonicalIndex, Page, Span, Variant},
        mapper::context::Previous,
        reference::ReferenceToken,
    };

    fn page(toks: &[&str]) -> Page {
        Page {
            blocks: toks
                .iter()
                .map(|tok| Block {
                    tok: tok.to_string(),
                    ind: vec![CanonicalIndex::new(1, 1, 1, 1)],
                    end: true,
                })
                .collect(),
            ..Page::default()
        }
    }

    fn variant(inib: usize, inic: usize, endb: usize, endc: usize, reference: &str) -> Variant {
        Variant {
            span: Span {
                inib,
                inic,
                endb,
                endc,
            },
            reference: reference.to_owned(),
            stc: "r".to_owned(),
            typ: "x".to_owned(),
            lay: None,
        }
    }

    // one reference token per word: (1, 1, word, 1)
    fn reference(rasms: &[&str]) -> Vec<ReferenceToken> {
        rasms
            .iter()
            .enumerate()
            .map(|(i, rasm)| ReferenceToken {
                rasm: rasm.to_string(),
                paleo: rasm.to_string(),
                index: CanonicalIndex::new(1, 1, i as u32 + 1, 1),
            })
            .collect()
    }

    fn word(n: u32) -> CanonicalIndex {
        CanonicalIndex::new(1, 1, n, 1)
    }

    fn previous(page: &Page, index: usize) -> Previous {
        let tok = &page.blocks[index].tok;
        Previous {
            index,
            skeleton: crate::rasm::skeleton(tok),
            resolved_skeleton: crate::rasm::skeleton(&crate::mapper::resolve_variant(
                &page.variants,
                tok,
                index,
            )),
        }
    }

    // (offset, indices) of every Set, (offset usize::MAX) for an append
    fn summary(outcome: &Outcome) -> (Vec<(usize, Vec<CanonicalIndex>)>, isize, isize) {
        let assignments = outcome
            .assignments
            .iter()
            .map(|a| match a {
                Assignment::Set { offset, indices } => (*offset, indices.clone()),
                Assignment::AppendToPrevious(index) => (usize::MAX, vec![*index]),
            })
            .collect();
        (assignments, outcome.manuscript_step, outcome.reference_step)
    }

    fn first_rule(ctx: &MatchContext) -> Option<&'static str> {
        CASCADE
            .iter()
            .find(|(_, rule)| rule(ctx).is_some())
            .map(|(name, _)| *name)
    }

    #[test]
    fn exact_match() {
        let page = page(&["BSM", "ALLH"]);
        let reference = reference(&["BSM", "ALLH"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert_eq!(
            summary(&exact(&ctx).unwrap()),
            (vec![(0, vec![word(1)])], 1, 1)
        );
        assert_eq!(first_rule(&ctx), Some("exact"));
    }

    #[test]
    fn word_subdivision_takes_two_words() {
        let mut page = page(&["KL∅MA"]);
        page.variants.push(variant(0, 2, 0, 2, "#"));
        let reference = reference(&["KL", "MA"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert!(ctx.word_subdivision);
        assert_eq!(
            summary(&word_subdivision(&ctx).unwrap()),
            (vec![(0, vec![word(1), word(2)])], 1, 2)
        );
    }

    #[test]
    fn split_word() {
        let page = page(&["AB", "G"]);
        let reference = reference(&["ABG"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert_eq!(
            summary(&split(&ctx).unwrap()),
            (vec![(0, vec![word(1)]), (1, vec![word(1)])], 2, 1)
        );
        assert_eq!(first_rule(&ctx), Some("split"));

        let page = self::page(&["∅", "ABG"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert!(split(&ctx).is_none());
    }

    #[test]
    fn resolved_variant() {
        let mut page = page(&["BLM"]);
        page.variants.push(variant(0, 0, 0, 0, "S"));
        let reference = reference(&["SLM"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert_eq!(first_rule(&ctx), Some("resolved"));
    }

    #[test]
    fn resolved_into_two_words() {
        let mut page = page(&["E∅LBA"]);
        page.variants.push(variant(0, 1, 0, 1, "A#"));
        let reference = reference(&["EA", "LBA"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert_eq!(
            summary(&resolved_two(&ctx).unwrap()),
            (vec![(0, vec![word(1), word(2)])], 1, 2)
        );
        assert_eq!(first_rule(&ctx), Some("resolved_two"));
    }

    #[test]
    fn glide_takes_the_previous_word() {
        let mut page = page(&["W", "A", "EBB"]);
        page.variants.push(variant(1, 0, 1, 0, "∅A"));
        let reference = reference(&["W", "EBB"]);
        let ctx = MatchContext::new(&page, 1, &reference, 1, None, None, None);
        assert_eq!(ctx.resolved, "∅A");
        assert_eq!(
            summary(&glide(&ctx).unwrap()),
            (vec![(0, vec![word(1)])], 1, 0)
        );
    }

    #[test]
    fn lookahead_on_resolved_blocks() {
        let mut page = page(&["SB", "AH"]);
        page.variants.push(variant(1, 0, 1, 0, "B"));
        let reference = reference(&["SBBH"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert_eq!(first_rule(&ctx), Some("lookahead"));
        assert_eq!(
            summary(&lookahead(&ctx).unwrap()),
            (vec![(0, vec![word(1)]), (1, vec![word(1)])], 2, 1)
        );
    }

    #[test]
    fn lookbehind_append_to_previous() {
        let page = page(&["DLKM", "B"]);
        let reference = reference(&["D", "LKM", "B"]);
        let previous = previous(&page, 0);
        let ctx = MatchContext::new(&page, 1, &reference, 1, Some(&previous), None, None);
        assert_eq!(
            summary(&lookbehind_append(&ctx).unwrap()),
            (vec![(usize::MAX, vec![word(2)])], 0, 1)
        );
        assert_eq!(first_rule(&ctx), Some("lookbehind_append"));
    }

    #[test]
    fn lookbehind_concat_with_previous() {
        let page = page(&["AS", "BHR"]);
        let reference = reference(&["A", "SBHR"]);
        let previous = previous(&page, 0);
        let ctx = MatchContext::new(&page, 1, &reference, 1, Some(&previous), None, None);
        assert_eq!(first_rule(&ctx), Some("lookbehind_concat"));
        assert_eq!(
            summary(&lookbehind_concat(&ctx).unwrap()),
            (vec![(0, vec![word(2)])], 1, 1)
        );
    }

    #[test]
    fn transposed_words() {
        let page = page(&["W", "BA"]);
        let reference = reference(&["BA", "W"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert_eq!(first_rule(&ctx), Some("transposition"));
        assert_eq!(
            summary(&transposition(&ctx).unwrap()),
            (vec![(0, vec![word(2)]), (1, vec![word(1)])], 2, 2)
        );
    }

    #[test]
    fn lookbehind_suffix_repeats_previous_word() {
        let page = page(&["SBH", "BH"]);
        let reference = reference(&["SBH", "KL"]);
        let previous = previous(&page, 0);
        let ctx = MatchContext::new(&page, 1, &reference, 1, Some(&previous), None, None);
        assert_eq!(first_rule(&ctx), Some("lookbehind_suffix"));
        assert_eq!(
            summary(&lookbehind_suffix(&ctx).unwrap()),
            (vec![(0, vec![word(1)])], 1, 0)
        );
    }

    #[test]
    fn elided_glide_before_next_word() {
        let page = page(&["REM", "A", "MN"]);
        let reference = reference(&["REMB", "MN"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert_eq!(first_rule(&ctx), Some("elided_glide"));
        assert_eq!(
            summary(&elided_glide(&ctx).unwrap()),
            (vec![(0, vec![word(1)]), (1, vec![word(1)])], 2, 1)
        );
    }

    #[test]
    fn elided_glide_needs_a_bare_alif() {
        let page = page(&["REM", "Aᵃ", "MN"]);
        let reference = reference(&["REMB", "MN"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert!(elided_glide(&ctx).is_none());
    }

    #[test]
    fn dividers_are_not_neighbours() {
        // x1A leaves the token 1A, whose skeleton is a bare alif
        let mut page = page(&["BEM", "1A", "MN"]);
        page.awashir.push(1);
        let reference = reference(&["BEMB", "MN"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert!(ctx.next.is_none());
        assert_eq!(first_rule(&ctx), None);
    }

    #[test]
    fn lookbehind_suffix_steps_over_ornaments() {
        let page = page(&["SBH", "BH", "KL"]);
        let mut reference = reference(&["SBH", "", "KL"]);
        reference[1].paleo = "۞".to_owned();
        let previous = previous(&page, 0);
        let ctx = MatchContext::new(&page, 1, &reference, 2, Some(&previous), None, None);
        assert_eq!(ctx.behind().map(|t| t.index), Some(word(1)));
        assert_eq!(first_rule(&ctx), Some("lookbehind_suffix"));
        assert_eq!(
            summary(&lookbehind_suffix(&ctx).unwrap()),
            (vec![(0, vec![word(1)])], 1, 0)
        );
    }

    #[test]
    fn estimated_gap() {
        let page = page(&["BG5-6r", "KL"]);
        let reference = reference(&["BGBKM", "KL"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert_eq!(first_rule(&ctx), Some("estimate"));
        assert_eq!(
            summary(&estimate(&ctx).unwrap()),
            (vec![(0, vec![word(1)])], 1, 1)
        );
    }

    #[test]
    fn trailing_alif_dropped() {
        let mut page = page(&["GA", "BB"]);
        page.variants.push(variant(0, 1, 0, 1, "ᵢB"));
        let reference = reference(&["GBBK"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert!(trailing_alif(&ctx).is_none());

        let reference = self::reference(&["GBB"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert_eq!(
            summary(&trailing_alif(&ctx).unwrap()),
            (vec![(0, vec![word(1)]), (1, vec![word(1)])], 2, 1)
        );
    }

    #[test]
    fn word_across_pages() {
        let page = page(&["BSM", "LFA"]);
        let reference = reference(&["BSM", "LFSFW"]);
        let ctx = MatchContext::new(&page, 1, &reference, 1, None, Some("SFW"), None);
        assert_eq!(first_rule(&ctx), Some("cross_page"));

        let page = self::page(&["SFW", "N"]);
        let reference = self::reference(&["LFSFW"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, Some("LFA"));
        assert_eq!(first_rule(&ctx), Some("cross_page"));

        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert_eq!(first_rule(&ctx), None);
    }

    #[test]
    fn multi_block_variant() {
        let mut page = page(&["∅"]);
        page.variants.push(variant(0, 0, 0, 0, "WAMBEBKM"));
        let reference = reference(&["W", "A", "MBEBKM", "HW"]);
        let ctx = MatchContext::new(&page, 0, &reference, 0, None, None, None);
        assert_eq!(first_rule(&ctx), Some("multi_block"));
        assert_eq!(
            summary(&multi_block(&ctx).unwrap()),
            (vec![(0, vec![word(1), word(2), word(3)])], 1, 3)
        );
    }
}
