use slint::{SharedString, VecModel};

/// Ordered set of selected node ids.
///
/// Order matters: the most recently selected node is the anchor new shapes
/// are placed next to, so re-selecting an id moves it to the end.
#[derive(Debug, Default, Clone)]
pub struct SelectionManager {
    selected: Vec<String>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a select/deselect record. Last write per id wins.
    pub fn set(&mut self, id: &str, selected: bool) {
        self.selected.retain(|s| s != id);
        if selected {
            self.selected.push(id.to_string());
        }
    }

    /// Handle a click on `id` based on interaction modifiers
    pub fn handle_interaction(&mut self, id: &str, shift_held: bool) {
        if shift_held {
            if self.contains(id) {
                self.set(id, false);
            } else {
                self.set(id, true);
            }
        } else {
            if self.selected.len() == 1 && self.contains(id) {
                return;
            }
            self.selected.clear();
            self.selected.push(id.to_string());
        }
    }

    /// Clear the current selection
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replace the current selection with a new sequence of ids
    pub fn replace_selection<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected.clear();
        for id in ids {
            let id = id.into();
            self.set(&id, true);
        }
    }

    /// Drop ids for which `keep` returns false.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.selected.retain(|id| keep(id));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    /// The most recently selected id.
    pub fn last(&self) -> Option<&str> {
        self.selected.last().map(String::as_str)
    }

    /// Selected ids, oldest selection first.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.selected.iter().map(String::as_str)
    }

    pub fn ids(&self) -> Vec<String> {
        self.selected.clone()
    }

    /// Sync the selection to a Slint VecModel
    pub fn sync_to_model(&self, model: &VecModel<SharedString>) {
        model.set_vec(
            self.selected
                .iter()
                .map(|id| SharedString::from(id.as_str()))
                .collect::<Vec<_>>(),
        );
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
