// Character scanner of a page body
//
// Keeps running (sura, verse, word, block) counters seeded with the start index of the page.
// Positions of spans are (block, char) pairs over the content characters of the blocks;
// markers are never content.

use std::mem;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    diagnostics::{Diagnostics, Issue, Locator},
    document::{Block, CanonicalIndex, Line, LineNumber, Page, Span, Variant},
    isame_txt::{
        grammar::{parse_divider, DividerKind},
        record::RawLine,
        span_tracker::{Position, SpanError, SpanKind, SpanTracker},
    },
    quran, rasm,
};

#[derive(Debug)]
pub struct ScannedPage {
    pub page: Page,
    pub inline_notes: Vec<Span>,
    pub line_notes: Vec<LineNumber>, // lines written (|n|)
}

pub fn scan_page(
    title: &str,
    folio: &str,
    start: CanonicalIndex,
    lines: &[RawLine],
    diagnostics: &mut Diagnostics,
) -> ScannedPage {
    let mut scanner = Scanner {
        title,
        folio,
        diagnostics,
        page: Page::default(),
        inline_notes: Vec::new(),
        line_notes: Vec::new(),
        index: start,
        block: String::new(),
        block_len: 0,
        block_final_seen: false,
        divider: None,
        in_sura_title: false,
        layers: None,
        spans: SpanTracker::new(),
        last_content: None,
        line: None,
        line_start: 0,
    };

    for line in lines {
        let num = line.number(scanner.line);
        scanner.line = Some(num);
        if line.whole_line_note {
            scanner.line_notes.push(num);
        }

        scanner.scan_line(line.content);

        scanner.page.lines.push(Line {
            num,
            inib: scanner.line_start,
        });
        scanner.line_start = scanner.page.blocks.len() + usize::from(!scanner.block.is_empty());
    }

    scanner.finish()
}

struct Scanner<'a> {
    title: &'a str,
    folio: &'a str,
    diagnostics: &'a mut Diagnostics,

    page: Page,
    inline_notes: Vec<Span>,
    line_notes: Vec<LineNumber>,

    index: CanonicalIndex,
    block: String,
    block_len: usize,
    block_final_seen: bool, // A R D W seen in the current block
    divider: Option<DividerKind>,
    in_sura_title: bool, // %...%
    layers: Option<String>,

    spans: SpanTracker,
    last_content: Option<Position>,

    line: Option<LineNumber>,
    line_start: usize,
}

impl Scanner<'_> {
    fn error(&mut self, issue: Issue) {
        let locator = Locator::new(self.folio, self.line);
        self.diagnostics.error(self.title, locator, issue);
    }

    fn warning(&mut self, issue: Issue) {
        let locator = Locator::new(self.folio, self.line);
        self.diagnostics.warning(self.title, locator, issue);
    }

    fn scan_line(&mut self, content: &str) {
        let chars: Vec<char> = content.chars().collect();

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];

            // sura titles are not transcribed text
            if c == '%' {
                self.in_sura_title = !self.in_sura_title;
                i += 1;
                continue;
            }
            if self.in_sura_title {
                i += 1;
                continue;
            }

            match c {
                '[' => self.open(SpanKind::Variant),
                '>' | '&' | '^' => {
                    // other layers: [>&^][^(/)]+
                    let len = chars[i + 1..]
                        .iter()
                        .take_while(|&&d| !matches!(d, '(' | '/' | ')'))
                        .count();
                    if 0 < len {
                        self.layers = Some(chars[i..=i + len].iter().collect());
                        i += len;
                    }
                }
                '/' => i += self.close_variant(&chars[i..]) - 1,
                ']' => self.error(Issue::MalformedVariant),
                '#' => self.end_word(),
                '=' => {
                    if !is_equal_allowed(&chars, i) {
                        self.error(Issue::MisplacedEqual);
                    }
                }
                '(' | '{' | '⟦' | '⟨' => {
                    if let Some(kind) = SpanKind::from_opening(c) {
                        self.open(kind);
                    }
                }
                ')' | '}' | '⟧' | '⟩' => {
                    if let Some(kind) = SpanKind::from_closing(c) {
                        self.close(kind);
                    }
                }
                '*' | 'x' | 'v' | 'c' => {
                    let kind = DividerKind::from_marker(c);
                    self.divider = kind.or(self.divider);
                    match (kind, chars.get(i + 1)) {
                        // *⟩ *⟧: the marker itself is the surviving content
                        (_, Some('⟩' | '⟧')) => self.push_content(c),
                        (Some(kind), _) => self.check_divider(kind, &chars[i..]),
                        (None, _) => self.push_content(c),
                    }
                }
                '1'..='9' if self.divider.is_none() && !is_estimate(&chars[i..]) => {
                    i += self.verse_marker(&chars[i..]) - 1;
                }
                _ => self.push_content(c),
            }

            i += 1;
        }
    }

    fn open(&mut self, kind: SpanKind) {
        if let Err(SpanError::AlreadyOpen(kind)) = self.spans.open(kind) {
            self.error(Issue::AlreadyOpen(kind));
        }
    }

    fn close(&mut self, kind: SpanKind) {
        match self.spans.close(kind, self.last_content) {
            Ok(Some(span)) => match kind {
                SpanKind::Unclear => self.page.unclear.push(span),
                SpanKind::Lacuna => self.page.lacunas.push(span),
                SpanKind::Illegible => self.page.illegible.push(span),
                SpanKind::Note => self.inline_notes.push(span),
                SpanKind::Variant => {}
            },
            Ok(None) => self.error(Issue::EmptySpan(kind)),
            Err(SpanError::NotOpen(kind) | SpanError::AlreadyOpen(kind)) => {
                self.error(Issue::NotOpen(kind))
            }
        }
    }

    // /reference=structural=typology]; returns the number of chars consumed
    fn close_variant(&mut self, rest: &[char]) -> usize {
        static VARIANT: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^/(.+?)=(.+?)=(.+?)\]").unwrap());

        let rest: String = rest.iter().collect();
        let Some(captures) = VARIANT.captures(&rest) else {
            self.error(Issue::MalformedVariant);
            self.spans.discard(SpanKind::Variant);
            self.layers = None;
            return 1;
        };

        let span = match self.spans.close(SpanKind::Variant, self.last_content) {
            Ok(Some(span)) => Some(span),
            // nothing transcribed (e.g. [#/∅=sub=words]): anchored right after the last content
            Ok(None) => Some(match self.last_content {
                Some((block, ch)) => Span {
                    inib: block,
                    inic: ch + 1,
                    endb: block,
                    endc: ch + 1,
                },
                None => Span {
                    inib: self.page.blocks.len(),
                    inic: self.block_len,
                    endb: self.page.blocks.len(),
                    endc: self.block_len,
                },
            }),
            Err(_) => {
                self.error(Issue::NotOpen(SpanKind::Variant));
                None
            }
        };

        if let Some(span) = span {
            let variant = Variant {
                span,
                reference: captures[1].to_owned(),
                stc: captures[2].to_owned(),
                typ: captures[3].to_owned(),
                lay: self.layers.take(),
            };
            tracing::debug!(?variant, "variant");
            self.page.variants.push(variant);
        }
        self.layers = None;

        captures[0].chars().count()
    }

    fn check_divider(&mut self, kind: DividerKind, rest: &[char]) {
        if let Err(source) = parse_divider(kind, rest) {
            let excerpt = rest.iter().take_while(|&&c| c != '#').collect();
            self.error(Issue::InvalidDivider {
                divider: kind.name(),
                excerpt,
                source,
            });
        }
    }

    // i:j# ; returns the number of chars consumed
    fn verse_marker(&mut self, rest: &[char]) -> usize {
        static VERSE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^([1-9][0-9]*):([1-9][0-9]*)#?").unwrap());

        let rest: String = rest.iter().collect();
        let Some(captures) = VERSE.captures(&rest) else {
            self.error(Issue::UnexpectedNumber);
            return 1;
        };
        let consumed = captures[0].chars().count();

        let (Ok(sura), Ok(verse)) = (captures[1].parse::<u32>(), captures[2].parse::<u32>())
        else {
            self.error(Issue::UnexpectedNumber);
            return consumed;
        };

        match quran::verse_count(sura) {
            None => self.error(Issue::InvalidSura(sura)),
            Some(count) if count < verse => {
                self.error(Issue::InvalidVerse { sura, verse, count });
                self.index = CanonicalIndex::new(sura + 1, 1, 1, 1);
            }
            // last verse of the sura
            Some(count) if count == verse => {
                if quran::SURA_COUNT < sura + 1 {
                    self.warning(Issue::InvalidSura(sura + 1));
                }
                self.index = CanonicalIndex::new(sura + 1, 1, 1, 1);
            }
            Some(_) => self.index = CanonicalIndex::new(sura, verse + 1, 1, 1),
        }

        consumed
    }

    fn push_content(&mut self, c: char) {
        // a letter after A R D W starts a new block of the same word; so does an estimate like W2-3r
        let starts_block = rasm::is_archigrapheme(c) || c == rasm::EMPTY_SET || ('1'..='9').contains(&c);
        if starts_block && self.block_final_seen && !self.block.is_empty() && self.divider.is_none() {
            self.push_block(false);
            self.index.block += 1;
        }

        self.block.push(c);
        self.block_len += 1;
        if rasm::is_block_final(c) {
            self.block_final_seen = true;
        }

        let position = (self.page.blocks.len(), self.block_len - 1);
        self.last_content = Some(position);
        self.spans.anchor(position);
    }

    fn push_block(&mut self, end: bool) {
        let block = Block {
            tok: mem::take(&mut self.block),
            ind: vec![self.index],
            end,
        };
        tracing::trace!(tok = %block.tok, index = %self.index, end, "block");
        self.page.blocks.push(block);
        self.block_len = 0;
        self.block_final_seen = false;
    }

    fn record_divider(&mut self) {
        if let Some(kind) = self.divider.take() {
            let block = self.page.blocks.len();
            match kind {
                DividerKind::Fasila => self.page.fasilas.push(block),
                DividerKind::Awashir => self.page.awashir.push(block),
                DividerKind::Khawamis => self.page.khawamis.push(block),
                DividerKind::Miaa => self.page.miaa.push(block),
            }
        }
    }

    // #
    fn end_word(&mut self) {
        if !self.block.is_empty() {
            self.record_divider();
            self.push_block(true);
            self.index.word += 1;
            self.index.block = 1;
        }
    }

    fn finish(mut self) -> ScannedPage {
        // no final #: the word goes on in the next page
        if !self.block.is_empty() {
            self.record_divider();
            self.push_block(false);
        }

        for kind in self.spans.unclosed() {
            self.error(Issue::UnclosedSpan(kind));
        }

        ScannedPage {
            page: self.page,
            inline_notes: self.inline_notes,
            line_notes: self.line_notes,
        }
    }
}

// =LM..., ⟦=LM..., {=LM..., (=LM... or after a layer prefix [X>=...
fn is_equal_allowed(chars: &[char], i: usize) -> bool {
    if i == 0 || (i == 1 && matches!(chars[0], '⟦' | '{' | '(')) {
        return true;
    }
    let before = &chars[..i];
    match before.iter().position(|&c| c == '>') {
        Some(p) => !before[..p].contains(&']'),
        None => false,
    }
}

// 2r, 1-2r
fn is_estimate(rest: &[char]) -> bool {
    static ESTIMATE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[1-9][0-9]*(?:-[1-9][0-9]*)?r").unwrap());

    let rest: String = rest.iter().take(16).collect();
    ESTIMATE.is_match(&rest)
}
