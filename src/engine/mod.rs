//! Core engines: the bet slip and the weekly market chart.

pub mod wager;
pub mod slip;
pub mod weekly;
pub mod chart;
