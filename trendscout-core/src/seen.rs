use std::collections::HashSet;

/// Record of post ids already observed.
///
/// The pipeline only needs membership and insertion; the backing store decides
/// how long ids survive. The bundled store lives for a single run.
pub trait SeenStore {
    fn has(&self, id: &str) -> bool;

    /// Returns `true` when the id was not already present.
    fn mark(&mut self, id: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemorySeenStore {
    ids: HashSet<String>,
}

impl InMemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeenStore for InMemorySeenStore {
    fn has(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn mark(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}
