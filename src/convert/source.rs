//! Streaming token intake and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::model::PageTokens;

/// A producer of pages of tokens, such as a PDF text extractor.
///
/// Pages may be yielded in any order; the converter restores page order
/// from [`PageTokens::index`]. Any iterator over `Result<PageTokens>` is a
/// source.
pub trait TokenSource {
    /// The next page, `None` when the source is exhausted.
    fn next_page(&mut self) -> Option<Result<PageTokens>>;
}

impl<I> TokenSource for I
where
    I: Iterator<Item = Result<PageTokens>>,
{
    fn next_page(&mut self) -> Option<Result<PageTokens>> {
        self.next()
    }
}

/// Shared flag for stopping a running conversion.
///
/// Clones share the same flag. Once cancelled, a conversion returns
/// [`Error::Cancelled`](crate::Error::Cancelled) at its next page stage.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_iterator_is_source() {
        let mut source = vec![Ok(PageTokens::new(3, vec![]))].into_iter();
        let page = source.next_page().unwrap().unwrap();
        assert_eq!(page.index, 3);
        assert!(source.next_page().is_none());
    }
}
