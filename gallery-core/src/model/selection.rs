//! src/model/selection.rs
//! ============================================================================
//! # Selection
//!
//! A set of item ids scoped to the currently loaded item list. Cleared on
//! every folder change or full reload; items are wholesale replaced, not
//! diffed, so selection never survives a load.

use indexmap::IndexSet;

use crate::model::item::{Id, Item};

#[derive(Debug, Default, Clone)]
pub struct Selection {
    ids: IndexSet<Id>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.ids.contains(id)
    }

    /// Click semantics. A plain (non-multi) click replaces the whole
    /// selection with the clicked item, unless that item was already the
    /// sole selected one, in which case the click deselects it. A
    /// multi-modifier click toggles membership without touching the rest.
    ///
    /// Returns `true` when the selection changed.
    pub fn toggle(&mut self, id: Id, multi: bool) -> bool {
        if !multi {
            let was_sole = self.ids.len() == 1 && self.ids.contains(&id);
            self.ids.clear();
            if was_sole {
                return true;
            }
            self.ids.insert(id);
            return true;
        }

        if !self.ids.shift_remove(&id) {
            self.ids.insert(id);
        }
        true
    }

    /// Select every item in the given list.
    pub fn select_all(&mut self, items: &[Item]) {
        for item in items {
            self.ids.insert(item.id.clone());
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Selected items in the original item-list order.
    pub fn selected_items<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        items.iter().filter(|i| self.ids.contains(&i.id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::MediaKind;

    fn items(ids: &[i64]) -> Vec<Item> {
        ids.iter()
            .map(|&n| Item::new(n, format!("item-{n}"), MediaKind::Image))
            .collect()
    }

    #[test]
    fn plain_click_replaces_selection() {
        let mut sel = Selection::new();
        sel.toggle(Id::from(1), false);
        sel.toggle(Id::from(2), false);
        assert!(sel.contains(&Id::from(2)));
        assert!(!sel.contains(&Id::from(1)));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn plain_click_on_sole_selected_deselects() {
        let mut sel = Selection::new();
        sel.toggle(Id::from(1), false);
        sel.toggle(Id::from(1), false);
        assert!(sel.is_empty());
    }

    #[test]
    fn plain_click_collapses_multi_selection_to_clicked() {
        let mut sel = Selection::new();
        sel.toggle(Id::from(1), true);
        sel.toggle(Id::from(2), true);
        // Item 1 is selected but not *solely* selected, so the plain click
        // re-selects it alone instead of deselecting.
        sel.toggle(Id::from(1), false);
        assert_eq!(sel.len(), 1);
        assert!(sel.contains(&Id::from(1)));
    }

    #[test]
    fn multi_click_toggles_membership_only() {
        let mut sel = Selection::new();
        sel.toggle(Id::from(1), true);
        sel.toggle(Id::from(2), true);
        assert_eq!(sel.len(), 2);
        sel.toggle(Id::from(1), true);
        assert_eq!(sel.len(), 1);
        assert!(sel.contains(&Id::from(2)));
    }

    #[test]
    fn selected_items_follow_list_order() {
        let list = items(&[10, 20, 30, 40]);
        let mut sel = Selection::new();
        sel.toggle(Id::from(40), true);
        sel.toggle(Id::from(10), true);
        let picked: Vec<i64> = sel
            .selected_items(&list)
            .iter()
            .map(|i| match &i.id {
                Id::Number(n) => *n,
                Id::Text(_) => unreachable!(),
            })
            .collect();
        assert_eq!(picked, vec![10, 40]);
    }

    #[test]
    fn select_all_matches_current_list() {
        let list = items(&[1, 2, 3]);
        let mut sel = Selection::new();
        sel.select_all(&list);
        assert_eq!(sel.len(), 3);
    }
}
