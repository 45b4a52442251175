use reqwest::Url;

/// Session history of page links, with the usual back/forward semantics:
/// pushing after going back discards the entries ahead of the cursor.
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: Vec<Url>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, url: Url) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(url);
        self.cursor = self.entries.len() - 1;
    }

    pub fn current(&self) -> Option<&Url> {
        self.entries.get(self.cursor)
    }

    pub fn back(&mut self) -> Option<&Url> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    pub fn forward(&mut self) -> Option<&Url> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Url] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(q: &str) -> Url {
        Url::parse(&format!("http://h/?query={q}")).unwrap()
    }

    #[test]
    fn back_and_forward_walk_the_entries() {
        let mut h = History::new();
        assert!(h.current().is_none());
        assert!(h.back().is_none());
        h.push(u("a"));
        h.push(u("b"));
        h.push(u("c"));
        assert_eq!(h.back().cloned(), Some(u("b")));
        assert_eq!(h.back().cloned(), Some(u("a")));
        assert!(h.back().is_none());
        assert_eq!(h.forward().cloned(), Some(u("b")));
        assert_eq!(h.current().cloned(), Some(u("b")));
    }

    #[test]
    fn push_after_back_drops_forward_entries() {
        let mut h = History::new();
        h.push(u("a"));
        h.push(u("b"));
        h.back();
        h.push(u("c"));
        assert_eq!(h.len(), 2);
        assert!(h.forward().is_none());
        assert_eq!(h.entries(), &[u("a"), u("c")]);
    }
}
