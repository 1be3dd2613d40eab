use std::ops::Range;

use crate::model::Entry;

/// Stable per-session identifier handed out by the bag on insert.
/// Selection is tracked by id, not by position, so it survives refilters
/// and deletions of other entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

struct Slot {
    id: EntryId,
    entry: Entry,
}

/// Owns the working collection and everything derived from it: the query,
/// the filtered view (newest entry first), the selection, and the scroll
/// offset of the visible window. Every operation is total; none fail.
pub struct Bag {
    entries: Vec<Slot>,
    next_id: u64,
    query: String,
    tokens: Vec<String>,
    filtered: Vec<usize>,
    selected: Option<EntryId>,
    offset: usize,
}

impl Bag {
    pub fn new(entries: Vec<Entry>) -> Self {
        let mut bag = Self {
            entries: Vec::new(),
            next_id: 0,
            query: String::new(),
            tokens: Vec::new(),
            filtered: Vec::new(),
            selected: None,
            offset: 0,
        };
        for entry in entries {
            bag.push(entry);
        }
        bag.refilter();
        bag
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order, for persistence.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().map(|slot| &slot.entry)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
        self.refilter();
    }

    pub fn add(&mut self, entry: Entry) -> EntryId {
        let id = self.push(entry);
        self.selected = Some(id);
        self.refilter();
        id
    }

    /// Removes the entry if it is still present; a stale or absent id is a
    /// no-op. The refilter pass performs the selection fix-up.
    pub fn delete(&mut self, id: EntryId) {
        self.entries.retain(|slot| slot.id != id);
        self.refilter();
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected {
            self.delete(id);
        }
    }

    pub fn selected(&self) -> Option<EntryId> {
        self.selected
    }

    /// Position of the selection within the filtered view.
    pub fn selected_position(&self) -> Option<usize> {
        let id = self.selected?;
        self.filtered
            .iter()
            .position(|&index| self.entries[index].id == id)
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// The filtered view, newest entry first.
    pub fn filtered(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.filtered
            .iter()
            .map(|&index| (self.entries[index].id, &self.entries[index].entry))
    }

    pub fn select_next(&mut self) {
        let Some(pos) = self.selected_position() else {
            self.select_first();
            return;
        };
        let next = if pos + 1 >= self.filtered.len() { 0 } else { pos + 1 };
        self.selected = Some(self.entries[self.filtered[next]].id);
    }

    pub fn select_prev(&mut self) {
        let Some(pos) = self.selected_position() else {
            self.select_first();
            return;
        };
        let prev = if pos == 0 {
            self.filtered.len() - 1
        } else {
            pos - 1
        };
        self.selected = Some(self.entries[self.filtered[prev]].id);
    }

    /// The `[start, end)` slice of the filtered view that fits in `rows`
    /// display rows. The window stays put while the selection is inside
    /// it, slides forward so the selection becomes the last visible row
    /// when it moved past the end, and slides backward so it becomes the
    /// first visible row when it moved before the start.
    pub fn visible_window(&mut self, rows: usize) -> Range<usize> {
        let total = self.filtered.len();
        if total == 0 || rows == 0 {
            self.offset = 0;
            return 0..0;
        }

        let Some(selected) = self.selected_position() else {
            self.offset = 0;
            return 0..total.min(rows);
        };

        let mut offset = self.offset.min(total - 1);
        if selected < offset {
            offset = selected;
        } else if selected >= offset + rows {
            offset = selected + 1 - rows;
        }
        let max_offset = total.saturating_sub(rows);
        if offset > max_offset {
            offset = max_offset;
        }

        self.offset = offset;
        offset..(offset + rows).min(total)
    }

    fn push(&mut self, entry: Entry) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Slot { id, entry });
        id
    }

    fn select_first(&mut self) {
        self.selected = self.filtered.first().map(|&index| self.entries[index].id);
    }

    /// Recomputes the filtered view by scanning the collection in reverse
    /// insertion order, keeping an entry iff every query token is a
    /// substring of its display text. A selection that no longer matches
    /// resets to the first element of the new view.
    fn refilter(&mut self) {
        self.tokens = self.query.split_whitespace().map(str::to_string).collect();

        let mut filtered = Vec::with_capacity(self.entries.len());
        for index in (0..self.entries.len()).rev() {
            let text = self.entries[index].entry.display();
            if self.tokens.iter().all(|token| text.contains(token.as_str())) {
                filtered.push(index);
            }
        }
        self.filtered = filtered;

        let still_visible = match self.selected {
            Some(id) => self
                .filtered
                .iter()
                .any(|&index| self.entries[index].id == id),
            None => false,
        };
        if !still_visible {
            self.select_first();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(project: &str, tags: &[&str]) -> Entry {
        let mut entry = Entry::new(project);
        for tag in tags {
            entry.add_tag(tag);
        }
        entry
    }

    fn projects(bag: &Bag) -> Vec<String> {
        bag.filtered()
            .map(|(_, entry)| entry.project().to_string())
            .collect()
    }

    fn bag_of(names: &[&str]) -> Bag {
        Bag::new(names.iter().map(|name| entry(name, &[])).collect())
    }

    #[test]
    fn empty_query_lists_newest_first() {
        let bag = bag_of(&["first", "second", "third"]);
        assert_eq!(projects(&bag), ["third", "second", "first"]);
    }

    #[test]
    fn every_token_must_match() {
        let mut bag = Bag::new(vec![
            entry("backend service", &["rust"]),
            entry("frontend app", &["rust"]),
            entry("backend tool", &["go"]),
        ]);
        bag.set_query("backend #rust");
        assert_eq!(projects(&bag), ["backend service"]);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let mut bag = bag_of(&["Backend", "backend"]);
        bag.set_query("Back");
        assert_eq!(projects(&bag), ["Backend"]);
    }

    #[test]
    fn tokens_match_tags_and_tools_too() {
        let mut bag = Bag::new(vec![entry("a", &["fun"]), entry("b", &["work"])]);
        bag.set_query("#fun");
        assert_eq!(projects(&bag), ["a"]);
    }

    #[test]
    fn add_selects_the_new_entry() {
        let mut bag = bag_of(&["old"]);
        let id = bag.add(entry("new", &[]));
        assert_eq!(bag.selected(), Some(id));
        assert_eq!(bag.selected_position(), Some(0));
    }

    #[test]
    fn selection_survives_a_narrowing_query_it_still_matches() {
        let mut bag = bag_of(&["alpha", "beta", "alphabet"]);
        bag.select_next(); // newest first, so position 1 is "beta"
        let selected = bag.selected();
        bag.set_query("bet");
        assert_eq!(bag.selected(), selected);
        assert_eq!(projects(&bag), ["alphabet", "beta"]);
    }

    #[test]
    fn selection_resets_when_filtered_out() {
        let mut bag = bag_of(&["alpha", "beta"]);
        // Newest first: select "alpha" (position 1).
        bag.select_next();
        bag.set_query("beta");
        assert_eq!(projects(&bag), ["beta"]);
        assert_eq!(bag.selected_position(), Some(0));
    }

    #[test]
    fn selection_clears_when_nothing_matches() {
        let mut bag = bag_of(&["alpha"]);
        bag.set_query("zzz");
        assert_eq!(bag.selected(), None);
        assert_eq!(bag.filtered_len(), 0);
    }

    #[test]
    fn select_wraps_around_both_ways() {
        let mut bag = bag_of(&["a", "b", "c"]);
        assert_eq!(bag.selected_position(), Some(0));
        bag.select_prev();
        assert_eq!(bag.selected_position(), Some(2));
        bag.select_next();
        assert_eq!(bag.selected_position(), Some(0));
    }

    #[test]
    fn select_on_empty_view_is_a_no_op() {
        let mut bag = Bag::new(Vec::new());
        bag.select_next();
        bag.select_prev();
        assert_eq!(bag.selected(), None);
    }

    #[test]
    fn delete_selected_removes_and_reselects() {
        let mut bag = bag_of(&["a", "b", "c"]);
        bag.delete_selected(); // "c", the newest
        assert_eq!(projects(&bag), ["b", "a"]);
        assert_eq!(bag.selected_position(), Some(0));
    }

    #[test]
    fn delete_with_stale_id_is_a_no_op() {
        let mut bag = bag_of(&["a"]);
        let id = bag.add(entry("b", &[]));
        bag.delete(id);
        bag.delete(id);
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn window_covers_short_views_entirely() {
        let mut bag = bag_of(&["a", "b"]);
        assert_eq!(bag.visible_window(10), 0..2);
    }

    #[test]
    fn window_slides_forward_to_keep_selection_last() {
        let mut bag = bag_of(&["a", "b", "c", "d", "e"]);
        for _ in 0..3 {
            bag.select_next();
        }
        // Selection at index 3, three rows: window ends just past it.
        assert_eq!(bag.visible_window(3), 1..4);
    }

    #[test]
    fn window_slides_backward_to_keep_selection_first() {
        let mut bag = bag_of(&["a", "b", "c", "d", "e"]);
        for _ in 0..4 {
            bag.select_next();
        }
        assert_eq!(bag.visible_window(3), 2..5);
        bag.select_next(); // wraps to index 0
        assert_eq!(bag.visible_window(3), 0..3);
    }

    #[test]
    fn window_stays_put_while_selection_is_inside() {
        let mut bag = bag_of(&["a", "b", "c", "d", "e"]);
        for _ in 0..3 {
            bag.select_next();
        }
        assert_eq!(bag.visible_window(3), 1..4);
        bag.select_prev();
        assert_eq!(bag.visible_window(3), 1..4);
    }

    #[test]
    fn window_invariants_hold_across_mutations() {
        let mut bag = bag_of(&["a", "ab", "abc", "abcd", "b", "bc"]);
        for rows in 1..4 {
            for step in 0..8 {
                if step % 3 == 0 {
                    bag.select_next();
                } else {
                    bag.select_prev();
                }
                let window = bag.visible_window(rows);
                assert!(window.len() <= rows);
                if let Some(selected) = bag.selected_position() {
                    assert!(window.contains(&selected));
                }
            }
        }
    }

    #[test]
    fn empty_view_yields_empty_window() {
        let mut bag = bag_of(&["a"]);
        bag.set_query("zzz");
        assert_eq!(bag.visible_window(5), 0..0);
    }
}
