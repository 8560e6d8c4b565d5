//! Plain-text rendering of the dashboard panels.

use std::fmt::Write;

use catalog::timeline::TimelineData;
use compute::analysis::statistics::{Statistics, TimelineSummary};
use compute::analysis::temporal::{ChartPoint, TimelineChart};
use session::dashboard::{Dashboard, TimelinePanel};
use session::popular::PopularState;
use session::search::PanelView;
use streaming::compositor::{CompositeTile, MapView};

const BAR_WIDTH: u64 = 40;

pub fn search_panel(dashboard: &Dashboard) -> String {
    let search = dashboard.search();
    let mut out = String::new();
    let _ = writeln!(out, "search: {:?}", search.query());
    if search.is_loading() {
        let _ = writeln!(out, "  searching...");
    }
    match search.panel() {
        PanelView::Hidden => {}
        PanelView::NoMatches { query } => {
            let _ = writeln!(out, "  No species found for \"{query}\"");
        }
        PanelView::Results(results) => {
            for (i, species) in results.iter().enumerate() {
                let _ = write!(out, "  [{i}] {}", species.display_name());
                if species.display_name() != species.scientific_name {
                    let _ = write!(out, " ({})", species.scientific_name);
                }
                let badges = species.taxonomy_badges();
                if !badges.is_empty() {
                    let _ = write!(out, "  {}", badges.join(" / "));
                }
                out.push('\n');
            }
        }
    }
    out
}

pub fn popular_list(dashboard: &Dashboard) -> String {
    let mut out = String::from("popular species:\n");
    match dashboard.popular().state() {
        PopularState::Idle | PopularState::Loading => out.push_str("  loading...\n"),
        PopularState::Failed(message) => {
            let _ = writeln!(out, "  {message}");
        }
        PopularState::Ready(list) => {
            for (i, entry) in list.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  [{i}] {} - {} observations",
                    entry.species.display_name(),
                    entry.observation_count
                );
            }
        }
    }
    out
}

/// Species header, timeline card and map for the current selection.
pub fn selection(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let selection = dashboard.selection();
    if let Some(species) = selection.species() {
        let _ = writeln!(out, "{} ({})", species.display_name(), species.scientific_name);
        let badges = species.taxonomy_badges();
        if !badges.is_empty() {
            let _ = writeln!(out, "  {}", badges.join(" / "));
        }
        if let Some(short) = species.short_dataset_key() {
            let _ = writeln!(out, "  dataset {short}");
        }
    }
    if let Some(error) = selection.error() {
        let _ = writeln!(out, "! {error}");
    }

    out.push_str(&timeline(dashboard));
    out.push_str(&map(dashboard.map().view()));
    out
}

fn timeline(dashboard: &Dashboard) -> String {
    let panel = dashboard.timeline_panel();
    let mut out = String::from("timeline:\n");
    if let Some(message) = panel.message() {
        let _ = writeln!(out, "  {message}");
        return out;
    }
    let TimelinePanel::Chart(TimelineChart::Series(series)) = panel else {
        return out;
    };

    if let Some(data) = dashboard.selection().timeline() {
        out.push_str(&summary_line(&series.summary, data));
    }

    out.push_str("  by year\n");
    out.push_str(&bars(&series.yearly));
    if !series.monthly.is_empty() {
        out.push_str("  by month\n");
        out.push_str(&bars(&series.monthly));
    }
    out
}

/// Totals as the service reported them. A total below the yearly sum is
/// shown next to it, not corrected.
fn summary_line(summary: &TimelineSummary, data: &TimelineData) -> String {
    let mut out = format!("  {} observations", summary.total_observations);
    if let (Some(earliest), Some(latest)) = (summary.earliest, summary.latest) {
        let _ = write!(out, ", {earliest}-{latest}");
    }
    if let Some((year, count)) = Statistics::peak_year(data) {
        let _ = write!(out, ", peak {year} ({count})");
    }
    if !Statistics::total_covers_yearly(data) {
        let _ = write!(out, " [yearly records sum to {}]", Statistics::yearly_sum(data));
    }
    out.push('\n');
    out
}

fn bars(points: &[ChartPoint]) -> String {
    let max = points.iter().map(|p| p.observations).max().unwrap_or(0).max(1);
    let mut out = String::new();
    for p in points {
        let len = (p.observations * BAR_WIDTH).div_ceil(max);
        let _ = writeln!(
            out,
            "  {:>5} {} {}",
            p.label,
            "#".repeat(len as usize),
            p.observations
        );
    }
    out
}

fn map(view: &MapView) -> String {
    let mut out = String::from("map:\n");
    match view {
        MapView::Placeholder(placeholder) => {
            let _ = writeln!(out, "  {}", placeholder.message());
        }
        MapView::Mosaic(mosaic) => {
            let _ = writeln!(
                out,
                "  zoom {}, {}/{} tiles settled",
                mosaic.zoom,
                mosaic.settled_count(),
                mosaic.tiles.len()
            );
            for row in mosaic.tiles.chunks(mosaic.columns.max(1)) {
                out.push_str("  ");
                out.extend(row.iter().map(glyph));
                out.push('\n');
            }
        }
    }
    out
}

/// Filtered base: `#` with overlay, `+` without.
/// Neutral fill: `%` unfiltered base with overlay, `~` unfiltered base only,
/// `*` overlay only, `-` nothing drawable. `.` is still loading.
fn glyph(tile: &CompositeTile) -> char {
    if !tile.is_settled() {
        return '.';
    }
    let overlay = tile.overlay.has_image();
    if !tile.neutral_fill() {
        return if overlay { '#' } else { '+' };
    }
    match (tile.base.has_image(), overlay) {
        (true, true) => '%',
        (true, false) => '~',
        (false, true) => '*',
        (false, false) => '-',
    }
}
