// Collaborators answering where a page starts and what the reference text says

mod cache;
mod corpus;
mod start_index;

pub use cache::CachedProvider;
pub use corpus::ReferenceCorpus;
pub use start_index::StartIndexTable;

use serde::{Deserialize, Serialize};

use crate::{document::CanonicalIndex, error::ReferenceError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceToken {
    pub rasm: String,
    pub paleo: String,
    pub index: CanonicalIndex,
}

impl ReferenceToken {
    // ۞ and ۩ mark divisions, they are not words of the text
    pub fn is_ornament(&self) -> bool {
        !self.paleo.is_empty() && self.paleo.chars().all(|c| c == '۞' || c == '۩')
    }
}

// [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexRange {
    pub start: CanonicalIndex,
    pub end: CanonicalIndex,
}

impl IndexRange {
    pub fn new(start: CanonicalIndex, end: CanonicalIndex) -> Result<Self, ReferenceError> {
        if end <= start {
            return Err(ReferenceError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    // from start to the beginning of the sura after the last one
    pub fn through_sura(start: CanonicalIndex, last_sura: u32) -> Result<Self, ReferenceError> {
        Self::new(start, CanonicalIndex::new(last_sura + 1, 1, 1, 1))
    }
}

pub trait StartIndexProvider {
    fn start_index(
        &self,
        hist_id: &str,
        signature: &str,
        folio: &str,
    ) -> Result<CanonicalIndex, ReferenceError>;
}

pub trait ReferenceProvider {
    fn tokens(&self, range: &IndexRange) -> Result<Vec<ReferenceToken>, ReferenceError>;
}

impl<P: ReferenceProvider + ?Sized> ReferenceProvider for &P {
    fn tokens(&self, range: &IndexRange) -> Result<Vec<ReferenceToken>, ReferenceError> {
        (**self).tokens(range)
    }
}
