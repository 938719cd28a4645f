use std::path::Path;

use crate::data::filter::FilterSelection;
use crate::data::loader::load_file;
use crate::data::model::Table;
use crate::data::pipeline::{handle_selection, DashboardResponse};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded survey table.
    pub table: Table,

    /// Current filter choice (None while the table is empty).
    pub selection: Option<FilterSelection>,

    /// Result of the last filter change, kept for redrawing.
    pub response: Option<DashboardResponse>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(table: Table) -> Self {
        let mut state = Self::default();
        state.set_table(table);
        state
    }

    /// Ingest a newly loaded table and reset the filters.
    pub fn set_table(&mut self, table: Table) {
        self.selection = FilterSelection::initial(&table);
        self.table = table;
        self.status_message = None;
        self.refresh();
    }

    /// Replace the table with the contents of `path`. On failure the current
    /// table stays and the error is shown in the status bar.
    pub fn open(&mut self, path: &Path) {
        match load_file(path) {
            Ok(table) => self.set_table(table),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Re-run the pipeline for the current selection.  A failed request
    /// clears the charts and reports the error instead.
    pub fn refresh(&mut self) {
        let Some(sel) = &self.selection else {
            self.response = None;
            return;
        };
        match handle_selection(&self.table, sel) {
            Ok(response) => self.response = Some(response),
            Err(e) => {
                log::error!("Dashboard request failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.response = None;
            }
        }
    }

    /// Pick a year; region falls back to the first one surveyed that year.
    pub fn set_year(&mut self, year: i32) {
        let Some(region) = self.table.regions_in_year(year).into_iter().next() else {
            return;
        };
        if let Some(sel) = &mut self.selection {
            sel.year = year;
        }
        self.set_region(&region);
    }

    /// Pick a region and select all of its districts.
    pub fn set_region(&mut self, region: &str) {
        let districts = self.table.districts_in_region(region).into_iter().collect();
        if let Some(sel) = &mut self.selection {
            sel.region = region.to_string();
            sel.districts = districts;
        }
        self.refresh();
    }

    /// Toggle a single district.
    pub fn toggle_district(&mut self, district: &str) {
        if let Some(sel) = &mut self.selection {
            if !sel.districts.remove(district) {
                sel.districts.insert(district.to_string());
            }
        }
        self.refresh();
    }

    /// Select all districts of the current region.
    pub fn select_all(&mut self) {
        if let Some(region) = self.selection.as_ref().map(|s| s.region.clone()) {
            self.set_region(&region);
        }
    }

    /// Deselect all districts.
    pub fn select_none(&mut self) {
        if let Some(sel) = &mut self.selection {
            sel.districts.clear();
        }
        self.refresh();
    }

    /// `(first, last)` survey year, for the page subtitle.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let years = self.table.years();
        Some((*years.first()?, *years.last()?))
    }
}
