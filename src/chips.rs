//! Chip input state: candidate pool, committed chips and the text buffer.
//!
//! Everything here is plain owned data. Terminal concerns live in `app`.

use serde::Serialize;
use std::fmt;

/// Identifier of a live chip. Allocated from a per-instance counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChipId(u64);

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub id: ChipId,
    pub label: String,
}

/// Two-step backspace gesture state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    Idle,
    Armed(ChipId),
}

/// What a single keystroke did to the state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Edited,
    Committed(ChipId),
    Armed(ChipId),
    Removed(Chip),
}

/// Called after every change to the chip sequence.
pub trait MutationHook {
    fn chips_changed(&mut self);
}

impl MutationHook for () {
    fn chips_changed(&mut self) {}
}

pub struct ChipInput<H: MutationHook = ()> {
    pool: Vec<String>,
    chips: Vec<Chip>,
    input: String,
    highlight: Highlight,
    next_id: u64,
    hook: H,
}

impl<H: MutationHook> ChipInput<H> {
    pub fn new<I, S>(pool: I, hook: H) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pool: pool.into_iter().map(Into::into).collect(),
            chips: Vec::new(),
            input: String::new(),
            highlight: Highlight::Idle,
            next_id: 1,
            hook,
        }
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn highlight(&self) -> Highlight {
        self.highlight
    }

    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    pub fn into_chips(self) -> Vec<Chip> {
        self.chips
    }

    /// Replace the buffer ("text changed" event)
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.highlight = Highlight::Idle;
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
        self.highlight = Highlight::Idle;
    }

    /// Enter: commit the trimmed buffer as a chip and clear the buffer.
    /// Whitespace-only buffers are left untouched.
    pub fn commit(&mut self) -> KeyOutcome {
        let label = self.input.trim();
        if label.is_empty() {
            return KeyOutcome::Ignored;
        }
        let label = label.to_string();
        let id = self.insert_chip(label);
        self.input.clear();
        KeyOutcome::Committed(id)
    }

    /// Candidate click. Same effect as `commit` but the buffer is not touched.
    pub fn add_chip(&mut self, label: &str) -> ChipId {
        self.insert_chip(label.to_string())
    }

    /// Remove a chip and give its label back to the end of the pool.
    pub fn remove_chip(&mut self, id: ChipId) -> Option<Chip> {
        let idx = self.chips.iter().position(|c| c.id == id)?;
        let chip = self.chips.remove(idx);
        self.pool.push(chip.label.clone());
        self.highlight = Highlight::Idle;
        tracing::debug!("removed chip {} ({})", chip.id, chip.label);
        self.hook.chips_changed();
        Some(chip)
    }

    /// Backspace: edit the buffer, or run the arm-then-remove gesture when
    /// the buffer is empty.
    pub fn backspace(&mut self) -> KeyOutcome {
        if !self.input.is_empty() {
            self.input.pop();
            self.highlight = Highlight::Idle;
            return KeyOutcome::Edited;
        }

        match self.highlight {
            Highlight::Armed(id) => match self.remove_chip(id) {
                Some(chip) => KeyOutcome::Removed(chip),
                None => {
                    // Stale reference, the chip is already gone
                    self.highlight = Highlight::Idle;
                    KeyOutcome::Ignored
                }
            },
            Highlight::Idle => match self.chips.last() {
                Some(last) => {
                    self.highlight = Highlight::Armed(last.id);
                    KeyOutcome::Armed(last.id)
                }
                None => KeyOutcome::Ignored,
            },
        }
    }

    /// Pool entries containing the buffer text, ignoring case.
    pub fn visible_candidates(&self) -> Vec<&str> {
        let needle = self.input.to_lowercase();
        self.pool
            .iter()
            .filter(|item| item.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    fn insert_chip(&mut self, label: String) -> ChipId {
        let id = ChipId(self.next_id);
        self.next_id += 1;

        // Free text not in the pool is allowed; only the first match goes
        if let Some(pos) = self.pool.iter().position(|item| *item == label) {
            self.pool.remove(pos);
        }

        tracing::debug!("added chip {} ({})", id, label);
        self.chips.push(Chip { id, label });
        self.highlight = Highlight::Idle;
        self.hook.chips_changed();
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const FRUITS: [&str; 5] = ["Apple", "Orange", "Mango", "Lichi", "Guava"];

    #[derive(Default)]
    struct Counter(usize);

    impl MutationHook for Counter {
        fn chips_changed(&mut self) {
            self.0 += 1;
        }
    }

    fn fruits() -> ChipInput<Counter> {
        ChipInput::new(FRUITS, Counter::default())
    }

    fn labels(input: &ChipInput<Counter>) -> Vec<&str> {
        input.chips().iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_typing_filters_candidates() {
        let mut input = fruits();
        input.set_input("Ma");
        assert_eq!(input.visible_candidates(), vec!["Mango"]);

        input.set_input("AN");
        assert_eq!(input.visible_candidates(), vec!["Orange", "Mango"]);

        // Filtering never mutates the pool
        assert_eq!(input.pool().len(), 5);
    }

    #[test]
    fn test_empty_buffer_shows_whole_pool() {
        let input = fruits();
        assert_eq!(input.visible_candidates(), FRUITS.to_vec());
    }

    #[test]
    fn test_click_candidate_keeps_buffer() {
        let mut input = fruits();
        input.set_input("Ma");
        input.add_chip("Mango");

        assert_eq!(labels(&input), vec!["Mango"]);
        assert_eq!(input.pool(), ["Apple", "Orange", "Lichi", "Guava"]);
        assert_eq!(input.input(), "Ma");
        assert!(input.visible_candidates().is_empty());
        assert_eq!(input.hook_mut().0, 1);
    }

    #[test]
    fn test_every_candidate_moves_exactly_once() {
        for label in FRUITS {
            let mut input = fruits();
            input.add_chip(label);
            assert_eq!(labels(&input), vec![label]);
            assert!(!input.pool().iter().any(|item| item == label));
            assert!(!input.visible_candidates().contains(&label));
        }
    }

    #[test]
    fn test_commit_free_text_leaves_pool() {
        let mut input = fruits();
        input.set_input("Kiwi");
        let outcome = input.commit();

        assert!(matches!(outcome, KeyOutcome::Committed(_)));
        assert_eq!(labels(&input), vec!["Kiwi"]);
        assert_eq!(input.pool(), FRUITS);
        assert_eq!(input.input(), "");
    }

    #[test]
    fn test_commit_trims_and_removes_pool_match() {
        let mut input = fruits();
        input.set_input("  Guava  ");
        input.commit();
        assert_eq!(labels(&input), vec!["Guava"]);
        assert_eq!(input.pool(), ["Apple", "Orange", "Mango", "Lichi"]);
    }

    #[test]
    fn test_commit_match_is_case_sensitive() {
        let mut input = fruits();
        input.set_input("apple");
        input.commit();
        assert_eq!(labels(&input), vec!["apple"]);
        assert_eq!(input.pool().len(), 5);
    }

    #[test]
    fn test_whitespace_commit_is_noop() {
        for text in ["", "   ", "\t"] {
            let mut input = fruits();
            input.set_input(text);
            assert_eq!(input.commit(), KeyOutcome::Ignored);
            assert!(input.chips().is_empty());
            assert_eq!(input.pool(), FRUITS);
            assert_eq!(input.input(), text);
            assert_eq!(input.hook_mut().0, 0);
        }
    }

    #[test]
    fn test_remove_appends_label_to_pool() {
        let mut input = fruits();
        input.set_input("Apple");
        let KeyOutcome::Committed(id) = input.commit() else {
            panic!("expected a commit");
        };

        let removed = input.remove_chip(id).unwrap();
        assert_eq!(removed.label, "Apple");
        assert!(input.chips().is_empty());
        assert_eq!(input.pool(), ["Orange", "Mango", "Lichi", "Guava", "Apple"]);

        let before: BTreeSet<&str> = FRUITS.into_iter().collect();
        let after: BTreeSet<&str> = input.pool().iter().map(String::as_str).collect();
        assert_eq!(before, after);
        assert_eq!(input.hook_mut().0, 2);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut input = fruits();
        let id = input.add_chip("Lichi");
        input.remove_chip(id);
        assert!(input.remove_chip(id).is_none());
        assert_eq!(input.pool().len(), 5);
        assert_eq!(input.hook_mut().0, 2);
    }

    #[test]
    fn test_ids_stay_unique() {
        let mut input = fruits();
        let a = input.add_chip("Apple");
        let b = input.add_chip("Apple");
        input.remove_chip(a);
        let c = input.add_chip("Mango");
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_two_step_backspace() {
        let mut input = fruits();
        input.add_chip("Apple");
        let last = input.add_chip("Mango");

        assert_eq!(input.backspace(), KeyOutcome::Armed(last));
        assert_eq!(input.highlight(), Highlight::Armed(last));
        assert_eq!(input.chips().len(), 2);

        let KeyOutcome::Removed(chip) = input.backspace() else {
            panic!("expected removal");
        };
        assert_eq!(chip.id, last);
        assert_eq!(labels(&input), vec!["Apple"]);
        assert_eq!(input.highlight(), Highlight::Idle);

        // Next backspace arms the new last chip instead of deleting it
        assert!(matches!(input.backspace(), KeyOutcome::Armed(_)));
        assert_eq!(input.chips().len(), 1);
    }

    #[test]
    fn test_backspace_edits_buffer_first() {
        let mut input = fruits();
        input.add_chip("Apple");
        input.set_input("ab");
        assert_eq!(input.backspace(), KeyOutcome::Edited);
        assert_eq!(input.input(), "a");
        assert_eq!(input.highlight(), Highlight::Idle);
        assert_eq!(input.chips().len(), 1);
    }

    #[test]
    fn test_backspace_without_chips_is_noop() {
        let mut input = fruits();
        assert_eq!(input.backspace(), KeyOutcome::Ignored);
        assert_eq!(input.highlight(), Highlight::Idle);
    }

    #[test]
    fn test_typing_disarms_highlight() {
        let mut input = fruits();
        input.add_chip("Apple");
        input.backspace();
        input.push_char('x');
        assert_eq!(input.highlight(), Highlight::Idle);

        input.backspace();
        // Buffer is empty again, but the gesture starts over
        assert!(matches!(input.backspace(), KeyOutcome::Armed(_)));
        assert_eq!(input.chips().len(), 1);
    }

    #[test]
    fn test_clicking_armed_chip_away_disarms() {
        let mut input = fruits();
        let id = input.add_chip("Apple");
        input.backspace();
        input.remove_chip(id);
        assert_eq!(input.highlight(), Highlight::Idle);
        assert_eq!(input.backspace(), KeyOutcome::Ignored);
    }
}
