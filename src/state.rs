use std::sync::Arc;

use crate::color::CategoryColors;
use crate::data::filter::{FilteredView, SelectionState, filtered_indices};
use crate::data::loader::LoadError;
use crate::data::model::SalaryDataset;
use crate::data::stats::Aggregates;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None when the startup fetch failed).
    pub dataset: Option<Arc<SalaryDataset>>,

    /// Why the dataset is unavailable, for the fatal error screen.
    pub load_error: Option<String>,

    /// Per-column filter selections.
    pub selection: SelectionState,

    /// Indices of rows passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Chart inputs derived from the visible rows (cached).
    pub aggregates: Aggregates,

    /// Stable colours for experience levels.
    pub level_colors: CategoryColors,

    /// Stable colours for remote-work categories.
    pub remote_colors: CategoryColors,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            load_error: None,
            selection: SelectionState::default(),
            visible_indices: Vec::new(),
            aggregates: Aggregates::default(),
            level_colors: CategoryColors::default(),
            remote_colors: CategoryColors::default(),
        }
    }
}

impl AppState {
    /// Build the state from the one-shot startup load.
    pub fn new(loaded: Result<Arc<SalaryDataset>, LoadError>) -> Self {
        let mut state = AppState::default();
        match loaded {
            Ok(dataset) => state.set_dataset(dataset),
            Err(err) => state.load_error = Some(err.to_string()),
        }
        state
    }

    /// Ingest the loaded dataset, initialise selections and colours.
    pub fn set_dataset(&mut self, dataset: Arc<SalaryDataset>) {
        self.selection = SelectionState::defaults(&dataset);
        self.level_colors = CategoryColors::new(&dataset.levels);
        self.remote_colors = CategoryColors::new(&dataset.remote_ratios);
        self.dataset = Some(dataset);
        self.load_error = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and `aggregates` after a selection change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.selection);
            let view = FilteredView::new(ds, &self.visible_indices);
            self.aggregates = Aggregates::compute(&view);
            log::debug!(
                "selection matches {} of {} rows",
                self.visible_indices.len(),
                ds.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::testutil::scenario_dataset;

    #[test]
    fn new_applies_default_selection_and_shows_all_matching_rows() {
        let state = AppState::new(Ok(Arc::new(scenario_dataset())));

        assert!(state.dataset.is_some());
        assert!(state.load_error.is_none());
        // Both dataset titles are preselected defaults, so every row matches.
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert!(state.aggregates.summary.is_some());
    }

    #[test]
    fn refilter_tracks_selection_changes() {
        let mut state = AppState::new(Ok(Arc::new(scenario_dataset())));

        state.selection.years = [2023].into_iter().collect();
        state.refilter();
        assert_eq!(state.visible_indices, vec![0, 1]);

        state.selection.years.clear();
        state.refilter();
        assert!(state.visible_indices.is_empty());
        assert!(state.aggregates.summary.is_none());
    }

    #[test]
    fn failed_load_leaves_an_error_and_no_dataset() {
        let state = AppState::new(Err(LoadError::Parse {
            cause: anyhow::anyhow!("boom"),
        }));

        assert!(state.dataset.is_none());
        let msg = state.load_error.unwrap();
        assert!(msg.contains("boom"), "unexpected message: {msg}");
        assert!(state.visible_indices.is_empty());
        assert!(state.aggregates.summary.is_none());
    }
}
