use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::rasm::LINE_FILLER;

// (sura, verse, word, block), 1-based; serialized as [s, v, w, b]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct CanonicalIndex {
    pub sura: u32,
    pub verse: u32,
    pub word: u32,
    pub block: u32,
}

impl CanonicalIndex {
    pub fn new(sura: u32, verse: u32, word: u32, block: u32) -> Self {
        Self {
            sura,
            verse,
            word,
            block,
        }
    }
}

impl From<[u32; 4]> for CanonicalIndex {
    fn from([sura, verse, word, block]: [u32; 4]) -> Self {
        Self::new(sura, verse, word, block)
    }
}

impl From<CanonicalIndex> for [u32; 4] {
    fn from(index: CanonicalIndex) -> Self {
        [index.sura, index.verse, index.word, index.block]
    }
}

impl fmt::Display for CanonicalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.sura, self.verse, self.word, self.block)
    }
}

// 1, 2, 3, ... or 1.5 for interlinear text written between lines 1 and 2
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(transparent)]
pub struct LineNumber(f64);

impl LineNumber {
    pub fn new(number: u32) -> Self {
        Self(number as f64)
    }

    pub fn interlinear_after(previous: Option<LineNumber>) -> Self {
        Self(previous.map_or(0.0, |l| l.0) + 0.5)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_interlinear(self) -> bool {
        self.0.fract() != 0.0
    }

    pub fn is(self, number: u32) -> bool {
        self.0 == number as f64
    }
}

impl Serialize for LineNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_interlinear() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.serialize_u64(self.0 as u64)
        }
    }
}

impl fmt::Display for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_interlinear() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "{}", self.0 as u64)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub meta: Meta,
    pub page: Page,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub title: String,
    pub hist_id: String,
    pub location: String,
    pub signature: String,
    pub folio: String,
    pub side: String, // hair / flesh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ini_index: Option<CanonicalIndex>, // removed once the page is mapped
    pub source: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    pub blocks: Vec<Block>,
    pub lines: Vec<Line>,
    pub unclear: Vec<Span>,
    pub lacunas: Vec<Span>,
    pub illegible: Vec<Span>,
    pub variants: Vec<Variant>,
    pub fasilas: Vec<usize>,
    pub awashir: Vec<usize>,
    pub khawamis: Vec<usize>,
    pub miaa: Vec<usize>,
    pub sura_div: Vec<usize>,
    pub notes: Vec<Note>,
}

impl Page {
    pub fn is_divider(&self, block: usize) -> bool {
        self.fasilas.contains(&block)
            || self.awashir.contains(&block)
            || self.khawamis.contains(&block)
            || self.miaa.contains(&block)
            || self.sura_div.contains(&block)
    }

    // dividers and line fillers take no canonical index
    pub fn is_unindexed(&self, block: usize) -> bool {
        self.is_divider(block)
            || self
                .blocks
                .get(block)
                .is_some_and(|b| b.tok.chars().eq([LINE_FILLER]))
    }

    // the line a block belongs to: the last line starting at or before it
    pub fn line_of(&self, block: usize) -> Option<LineNumber> {
        let mut found = None;
        for line in &self.lines {
            if block < line.inib {
                break;
            }
            found = Some(line.num);
        }
        found
    }

    // whether the position is covered by a lacuna or an illegible span
    pub fn is_absent(&self, block: usize, ch: usize) -> bool {
        self.illegible
            .iter()
            .chain(self.lacunas.iter())
            .any(|span| span.contains(block, ch))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub tok: String,
    pub ind: Vec<CanonicalIndex>,
    pub end: bool, // last block of a word
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub num: LineNumber,
    pub inib: usize, // first block of the line
}

// inclusive: (inib, inic) .. (endb, endc)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub inib: usize,
    pub inic: usize,
    pub endb: usize,
    pub endc: usize,
}

impl Span {
    pub fn contains(&self, block: usize, ch: usize) -> bool {
        (self.inib, self.inic) <= (block, ch) && (block, ch) <= (self.endb, self.endc)
    }

    pub fn is_within_block(&self, block: usize) -> bool {
        self.inib == block && self.endb == block
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(flatten)]
    pub span: Span,
    #[serde(rename = "ref")]
    pub reference: String, // reading of the reference edition
    pub stc: String, // structural class
    pub typ: String, // typology class
    pub lay: Option<String>, // other layers of text (^ & >)
}

impl Variant {
    // [∅/#=sub=words]: the scribe joined two words the reference keeps apart
    pub fn is_word_subdivision_at(&self, block: usize, ch: usize) -> bool {
        self.span.is_within_block(block)
            && self.span.inic == ch
            && self.span.endc == ch
            && self.reference == "#"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(flatten)]
    pub span: Span,
    #[serde(rename = "type")]
    pub note_type: String,
    pub note: String,
}
