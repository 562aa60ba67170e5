use std::{cell::RefCell, collections::HashMap};

use crate::error::ReferenceError;

use super::{IndexRange, ReferenceProvider, ReferenceToken};

// pages of the same sura ask for the same range again and again
pub struct CachedProvider<P> {
    inner: P,
    cache: RefCell<HashMap<IndexRange, Vec<ReferenceToken>>>,
}

impl<P: ReferenceProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached_ranges(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<P: ReferenceProvider> ReferenceProvider for CachedProvider<P> {
    fn tokens(&self, range: &IndexRange) -> Result<Vec<ReferenceToken>, ReferenceError> {
        if let Some(tokens) = self.cache.borrow().get(range) {
            return Ok(tokens.clone());
        }

        let tokens = self.inner.tokens(range)?;
        self.cache.borrow_mut().insert(*range, tokens.clone());
        Ok(tokens)
    }
}
