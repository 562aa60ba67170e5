use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::{document::CanonicalIndex, error::ReferenceError, quran};

use super::{IndexRange, ReferenceProvider, ReferenceToken};

#[derive(Debug, Deserialize)]
struct CorpusRecord {
    sura: u32,
    verse: u32,
    word: u32,
    block: u32,
    rasm: String,
    paleo: String,
}

// one row per letter block of the reference text, ordered by canonical index
#[derive(Debug, Default)]
pub struct ReferenceCorpus {
    tokens: Vec<ReferenceToken>,
}

impl ReferenceCorpus {
    pub fn new(mut tokens: Vec<ReferenceToken>) -> Self {
        tokens.sort_by_key(|t| t.index);
        Self { tokens }
    }

    // sura,verse,word,block,rasm,paleo
    pub fn from_csv(data: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(data.as_bytes());

        let mut tokens = Vec::new();
        for (i, record) in reader.deserialize::<CorpusRecord>().enumerate() {
            let record = record.with_context(|| format!("Invalid reference row: {}", i + 1))?;
            ensure!(
                quran::is_valid_position(record.sura, record.verse),
                "Invalid reference position {}:{} at row {}",
                record.sura,
                record.verse,
                i + 1
            );
            tokens.push(ReferenceToken {
                rasm: record.rasm,
                paleo: record.paleo,
                index: CanonicalIndex::new(record.sura, record.verse, record.word, record.block),
            });
        }

        Ok(Self::new(tokens))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read reference corpus: {}", path.display()))?;
        Self::from_csv(&data)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl ReferenceProvider for ReferenceCorpus {
    fn tokens(&self, range: &IndexRange) -> Result<Vec<ReferenceToken>, ReferenceError> {
        let from = self.tokens.partition_point(|t| t.index < range.start);
        let to = self.tokens.partition_point(|t| t.index < range.end);
        Ok(self.tokens[from..to.max(from)].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static CSV: &str = "sura,verse,word,block,rasm,paleo
1,1,1,2,SM,SM
1,1,1,1,B,B
1,1,2,1,A,A
1,2,1,1,ALHMD,ALHMD
2,1,1,1,ALM,ALM
";

    #[test]
    fn range_query() {
        let corpus = ReferenceCorpus::from_csv(CSV).unwrap();
        assert_eq!(corpus.len(), 5);

        let range = IndexRange::through_sura(CanonicalIndex::new(1, 1, 1, 2), 1).unwrap();
        let tokens = corpus.tokens(&range).unwrap();
        let rasm: Vec<_> = tokens.iter().map(|t| t.rasm.as_str()).collect();
        assert_eq!(rasm, vec!["SM", "A", "ALHMD"]);
    }

    #[test]
    fn rejects_positions_outside_the_text() {
        let csv = "sura,verse,word,block,rasm,paleo\n1,8,1,1,B,B\n";
        assert!(ReferenceCorpus::from_csv(csv).is_err());
    }
}
