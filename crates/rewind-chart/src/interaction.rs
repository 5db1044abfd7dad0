use thiserror::Error;

use crate::layout::GRID_TICKS;
use crate::layout::LABEL_OFFSET;
use crate::layout::Layout;
use crate::layout::MAX_WIDTH;
use crate::layout::PADDING;
use crate::layout::chart_width;
use crate::series::ChartSeries;
use crate::series::DEFAULT_SERIES;
use crate::series::SeriesId;

pub const STROKE_WIDTH: f64 = 3.5;
pub const EMPHASIZED_STROKE_WIDTH: f64 = 5.0;
pub const DIMMED_OPACITY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No chart series with id {0}")]
pub struct UnknownSeries(pub SeriesId);

/// Hover and selection state of the chart, plus its current width.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartState {
    series: Vec<ChartSeries>,
    hovered: Option<SeriesId>,
    selected: Option<SeriesId>,
    width: f64,
}

impl Default for ChartState {
    fn default() -> Self {
        ChartState::new(DEFAULT_SERIES.to_vec())
    }
}

impl ChartState {
    pub fn new(series: Vec<ChartSeries>) -> Self {
        ChartState {
            series,
            hovered: None,
            selected: None,
            width: MAX_WIDTH,
        }
    }

    pub fn series(&self) -> &[ChartSeries] {
        &self.series
    }

    pub fn hovered(&self) -> Option<SeriesId> {
        self.hovered
    }

    pub fn selected(&self) -> Option<SeriesId> {
        self.selected
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    fn check(&self, id: SeriesId) -> Result<SeriesId, UnknownSeries> {
        if self.series.iter().any(|s| s.id == id) {
            Ok(id)
        } else {
            Err(UnknownSeries(id))
        }
    }

    pub fn hover(&mut self, id: SeriesId) -> Result<(), UnknownSeries> {
        self.hovered = Some(self.check(id)?);
        Ok(())
    }

    pub fn leave(&mut self) {
        self.hovered = None;
    }

    /// Select `id`, or clear the selection if `id` is already selected.
    pub fn toggle_selection(&mut self, id: SeriesId) -> Result<Option<SeriesId>, UnknownSeries> {
        let id = self.check(id)?;
        self.selected = if self.selected == Some(id) {
            None
        } else {
            Some(id)
        };
        Ok(self.selected)
    }

    /// Recompute the width for a new container width. Returns whether it changed.
    pub fn resize(&mut self, container_width: f64) -> bool {
        let width = chart_width(container_width);
        let changed = width != self.width;
        self.width = width;
        changed
    }

    /// With a selection active only the selected series is drawn.
    pub fn is_visible(&self, id: SeriesId) -> bool {
        self.selected.is_none() || self.selected == Some(id)
    }

    pub fn shows_labels(&self, id: SeriesId) -> bool {
        self.selected == Some(id)
    }

    pub fn stroke_width(&self, id: SeriesId) -> f64 {
        if self.selected == Some(id) || self.hovered == Some(id) {
            EMPHASIZED_STROKE_WIDTH
        } else {
            STROKE_WIDTH
        }
    }

    pub fn legend_opacity(&self, id: SeriesId) -> f64 {
        let idle = self.selected.is_none() && self.hovered.is_none();
        if idle || self.selected == Some(id) || self.hovered == Some(id) {
            1.0
        } else {
            DIMMED_OPACITY
        }
    }

    pub fn render(&self) -> RenderedChart {
        let layout = Layout::new(self.width);
        let count = self.series.iter().map(|s| s.values.len()).max().unwrap_or(0);
        let xs = layout.x_points(count);

        let grid = GRID_TICKS
            .iter()
            .map(|&tick| GridLine {
                value: tick,
                y: layout.y(f64::from(tick)),
                x1: PADDING,
                x2: layout.width() - PADDING,
            })
            .collect();

        let lines = self
            .series
            .iter()
            .filter(|s| self.is_visible(s.id))
            .map(|s| {
                let points: Vec<_> = s
                    .values
                    .iter()
                    .zip(&xs)
                    .map(|(&value, &x)| Point {
                        x,
                        y: layout.y(f64::from(value)),
                        value,
                    })
                    .collect();
                let show_labels = self.shows_labels(s.id);
                RenderedLine {
                    id: s.id,
                    color: s.color,
                    stroke_width: self.stroke_width(s.id),
                    path: path_data(&points),
                    labels: if show_labels {
                        points
                            .iter()
                            .map(|p| Label {
                                x: p.x,
                                y: p.y - LABEL_OFFSET,
                                value: p.value,
                            })
                            .collect()
                    } else {
                        Vec::new()
                    },
                    points,
                }
            })
            .collect();

        let legend = self
            .series
            .iter()
            .map(|s| LegendEntry {
                id: s.id,
                label: s.label,
                color: s.color,
                selected: self.selected == Some(s.id),
                opacity: self.legend_opacity(s.id),
            })
            .collect();

        RenderedChart {
            width: layout.width(),
            height: layout.height(),
            grid,
            lines,
            legend,
        }
    }
}

/// Straight segments through every point: `M x y L x y ...`.
fn path_data(points: &[Point]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let cmd = if i == 0 { 'M' } else { 'L' };
            format!("{} {} {}", cmd, num(p.x), num(p.y))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Two decimals at most, without trailing zeros.
pub fn num(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub width: f64,
    pub height: f64,
    pub grid: Vec<GridLine>,
    pub lines: Vec<RenderedLine>,
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub value: u8,
    pub y: f64,
    pub x1: f64,
    pub x2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    pub id: SeriesId,
    pub color: &'static str,
    pub stroke_width: f64,
    pub path: String,
    pub points: Vec<Point>,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub id: SeriesId,
    pub label: &'static str,
    pub color: &'static str,
    pub selected: bool,
    pub opacity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible_ids(state: &ChartState) -> Vec<u8> {
        state.render().lines.iter().map(|l| l.id.0).collect()
    }

    #[test]
    fn everything_is_visible_without_selection() {
        let state = ChartState::default();
        assert_eq!(visible_ids(&state), [1, 2, 3, 4, 5]);
        assert!(state.render().lines.iter().all(|l| l.labels.is_empty()));
        assert!(state.render().legend.iter().all(|e| e.opacity == 1.0));
    }

    #[test]
    fn selecting_twice_restores_all_series() {
        let mut state = ChartState::default();
        let before = state.render();

        assert_eq!(state.toggle_selection(SeriesId(3)), Ok(Some(SeriesId(3))));
        assert_eq!(visible_ids(&state), [3]);

        assert_eq!(state.toggle_selection(SeriesId(3)), Ok(None));
        assert_eq!(state.render(), before);
    }

    #[test]
    fn selecting_another_series_replaces_the_selection() {
        let mut state = ChartState::default();
        state.toggle_selection(SeriesId(1)).unwrap();
        state.toggle_selection(SeriesId(4)).unwrap();

        assert_eq!(state.selected(), Some(SeriesId(4)));
        assert_eq!(visible_ids(&state), [4]);
    }

    #[test]
    fn labels_only_on_the_selected_series() {
        let mut state = ChartState::default();
        state.hover(SeriesId(2)).unwrap();
        assert!(state.render().lines.iter().all(|l| l.labels.is_empty()));

        state.toggle_selection(SeriesId(2)).unwrap();
        let chart = state.render();
        let line = &chart.lines[0];
        assert_eq!(line.labels.len(), 7);
        assert_eq!(line.labels[0].value, 28);
        assert_eq!(line.labels[0].y, line.points[0].y - 20.0);
    }

    #[test]
    fn hover_and_selection_thicken_the_line() {
        let mut state = ChartState::default();
        state.hover(SeriesId(5)).unwrap();

        assert_eq!(state.stroke_width(SeriesId(5)), 5.0);
        assert_eq!(state.stroke_width(SeriesId(1)), 3.5);
        assert_eq!(state.legend_opacity(SeriesId(1)), DIMMED_OPACITY);
        assert_eq!(state.legend_opacity(SeriesId(5)), 1.0);

        state.leave();
        state.toggle_selection(SeriesId(1)).unwrap();
        assert_eq!(state.stroke_width(SeriesId(1)), 5.0);
        assert_eq!(state.stroke_width(SeriesId(5)), 3.5);
    }

    #[test]
    fn unknown_series_are_rejected() {
        let mut state = ChartState::default();
        assert_eq!(state.hover(SeriesId(9)), Err(UnknownSeries(SeriesId(9))));
        assert_eq!(
            state.toggle_selection(SeriesId(0)),
            Err(UnknownSeries(SeriesId(0)))
        );
        assert_eq!(state.hovered(), None);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn resize_reports_changes_and_clamps() {
        let mut state = ChartState::default();
        assert_eq!(state.width(), 600.0);
        assert!(!state.resize(2000.0));
        assert!(state.resize(100.0));
        assert_eq!(state.width(), 320.0);
        assert_eq!(state.render().width, 320.0);
    }

    #[test]
    fn path_uses_straight_segments() {
        let state = ChartState::default();
        let chart = state.render();
        let path = &chart.lines[0].path;

        assert!(path.starts_with("M 40 "));
        assert_eq!(path.matches('L').count(), 6);
        assert!(!path.contains('C') && !path.contains('Q'));
    }

    #[test]
    fn num_trims_trailing_zeros() {
        assert_eq!(num(40.0), "40");
        assert_eq!(num(113.333333), "113.33");
        assert_eq!(num(0.5), "0.5");
    }
}
