use crate::collection::Document;
use crate::errors::StickyResult;

/// Iterator over documents returned by a store driver.
pub struct DocumentStream {
    inner: Box<dyn Iterator<Item = StickyResult<Document>> + Send>,
}

impl DocumentStream {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = StickyResult<Document>> + Send + 'static,
    {
        DocumentStream {
            inner: Box::new(iter),
        }
    }

    /// Creates a stream over already materialized documents.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        DocumentStream::new(documents.into_iter().map(Ok))
    }

    pub fn empty() -> Self {
        DocumentStream::from_documents(Vec::new())
    }
}

impl Iterator for DocumentStream {
    type Item = StickyResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
