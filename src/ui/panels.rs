use std::collections::BTreeSet;
use std::fmt::Display;
use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.heading("Filters");
    ui.separator();

    // Clone the Arc so the selection sets can be mutated below.
    let dataset = match &state.dataset {
        Some(ds) => Arc::clone(ds),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    let mut changed = false;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            changed |= filter_section(
                ui,
                "Year",
                true,
                &dataset.years,
                &mut state.selection.years,
            );
            changed |= filter_section(
                ui,
                "Job Title",
                false,
                &dataset.titles,
                &mut state.selection.titles,
            );
            changed |= filter_section(
                ui,
                "Seniority",
                true,
                &dataset.levels,
                &mut state.selection.levels,
            );
            changed |= filter_section(
                ui,
                "Company Location",
                false,
                &dataset.locations,
                &mut state.selection.locations,
            );
        });

    // Recompute the visible rows only when a checkbox actually flipped.
    if changed {
        state.refilter();
    }
}

/// One collapsible filter section with All/None buttons and a checkbox per
/// value. Returns whether the selection changed this frame.
fn filter_section<T: Clone + Display + Ord>(
    ui: &mut Ui,
    title: &str,
    default_open: bool,
    available: &BTreeSet<T>,
    selected: &mut BTreeSet<T>,
) -> bool {
    let mut changed = false;

    // Show count of selected / total in the header
    let header_text = format!("{title}  ({}/{})", selected.len(), available.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(default_open)
        .show(ui, |ui: &mut Ui| {
            // Select all / none buttons
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *selected = available.clone();
                    changed = true;
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                    changed = true;
                }
            });

            for value in available {
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, value.to_string()).changed() {
                    if checked {
                        selected.insert(value.clone());
                    } else {
                        selected.remove(value);
                    }
                    changed = true;
                }
            }
        });

    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with row counts.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Data Jobs Salary Dashboard");
        ui.separator();

        match &state.dataset {
            Some(ds) => {
                ui.label(format!(
                    "{} rows loaded, {} matching",
                    ds.len(),
                    state.visible_indices.len()
                ));
                if ds.skipped_rows > 0 {
                    ui.weak(format!("({} malformed rows skipped)", ds.skipped_rows));
                }
            }
            None => {
                ui.label(RichText::new("Dataset unavailable").color(Color32::RED));
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Fatal load error screen
// ---------------------------------------------------------------------------

/// Full-window notice shown when the startup fetch failed.
pub fn load_error_screen(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(120.0);
        ui.heading(RichText::new("Could not load the salary dataset").color(Color32::RED));
        ui.add_space(8.0);
        if let Some(msg) = &state.load_error {
            ui.label(msg);
        }
        ui.add_space(8.0);
        ui.weak("Check your network connection and restart the application.");
    });
}
