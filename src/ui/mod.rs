//! Dashboard rendering: filter panel, KPI tiles and charts.

pub mod charts;
pub mod panels;
