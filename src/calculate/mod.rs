//! Derived metrics computed in-service.
//!
//! Tackle efficiency is not stored, so the defender ranking is computed and
//! sorted here after the store returns every eligible defender.

use std::cmp::Ordering;

use crate::models::{DefenderEntry, DefenderLine};

/// Won tackles over attempted tackles, as a percentage.
pub fn tackle_efficiency(won: f64, attempted: f64) -> f64 {
    if attempted == 0.0 {
        0.0
    } else {
        won / attempted * 100.0
    }
}

/// Fixed two-decimal rendering, e.g. `40.00`. Halves round away from zero,
/// so `3.125` renders as `3.13`.
pub fn format_efficiency(pct: f64) -> String {
    format!("{:.2}", (pct * 100.0).round() / 100.0)
}

/// Derive efficiency for every line, sort descending by the rounded value, keep `cap`.
///
/// The sort is stable, so equal efficiencies keep store order.
pub fn rank_defenders(lines: Vec<DefenderLine>, cap: usize) -> Vec<DefenderEntry> {
    let mut ranked: Vec<(f64, DefenderEntry)> = lines
        .into_iter()
        .map(|line| {
            let pct = tackle_efficiency(
                line.tkl_w.as_f64().unwrap_or(0.0),
                line.tkl.as_f64().unwrap_or(0.0),
            );
            let rendered = format_efficiency(pct);
            let key = rendered.parse::<f64>().unwrap_or(pct);
            (
                key,
                DefenderEntry {
                    str_player: line.str_player,
                    str_cutout: line.str_cutout,
                    tackle_efficiency: rendered,
                    tkl: line.tkl,
                    tkl_w: line.tkl_w,
                    str_position: line.str_position,
                },
            )
        })
        .collect();

    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    ranked.into_iter().take(cap).map(|(_, entry)| entry).collect()
}
