//! Substring filter over the panel entries.
//!
//! Rebuilt from scratch with every panel; there is no ranking and no
//! debounce, each input event filters synchronously.

/// Case-insensitive filter over the display texts of one panel instance.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    haystacks: Vec<String>,
    term: String,
    visible: Vec<bool>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the filterable set. The current term is re-applied.
    pub fn set_items<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.haystacks = items
            .into_iter()
            .map(|s| s.as_ref().to_lowercase())
            .collect();
        self.recompute();
    }

    /// Filter on `term`; returns the visibility of every item.
    pub fn filter(&mut self, term: &str) -> &[bool] {
        self.term = term.to_string();
        self.recompute();
        &self.visible
    }

    pub fn clear(&mut self) -> &[bool] {
        self.filter("")
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// The clear control is shown whenever the raw input is non-empty.
    pub fn clear_visible(&self) -> bool {
        !self.term.is_empty()
    }

    pub fn visible(&self) -> &[bool] {
        &self.visible
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }

    fn recompute(&mut self) {
        let needle = self.term.trim().to_lowercase();
        self.visible = self
            .haystacks
            .iter()
            .map(|text| needle.is_empty() || text.contains(&needle))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SearchIndex {
        let mut idx = SearchIndex::new();
        idx.set_items(["Hello world", "Goodbye", "hello again"]);
        idx
    }

    #[test]
    fn filter_is_case_insensitive() {
        let mut idx = index();
        assert_eq!(idx.filter("hello"), [true, false, true]);
        assert_eq!(idx.filter("HELLO"), [true, false, true]);
        assert_eq!(idx.clear(), [true, true, true]);
    }

    #[test]
    fn empty_and_blank_terms_show_all() {
        let mut idx = index();
        assert_eq!(idx.filter(""), [true, true, true]);
        assert_eq!(idx.filter("   "), [true, true, true]);
        assert!(idx.clear_visible());
    }

    #[test]
    fn term_is_trimmed() {
        let mut idx = index();
        assert_eq!(idx.filter("  bye "), [false, true, false]);
        assert_eq!(idx.visible_count(), 1);
    }

    #[test]
    fn replacing_items_reapplies_term() {
        let mut idx = index();
        idx.filter("again");
        idx.set_items(["again and again", "nope"]);
        assert_eq!(idx.visible(), [true, false]);
    }

    #[test]
    fn unicode_lowercasing() {
        let mut idx = SearchIndex::new();
        idx.set_items(["Ärger im Büro", "東京の天気"]);
        assert_eq!(idx.filter("ärger"), [true, false]);
        assert_eq!(idx.filter("東京"), [false, true]);
    }
}
