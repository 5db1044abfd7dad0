pub const HEIGHT: f64 = 400.0;
/// Inner margin between the SVG edge and the plot area.
pub const PADDING: f64 = 40.0;
/// Horizontal padding of the container the chart sits in.
pub const CONTAINER_PADDING: f64 = 40.0;
pub const MIN_WIDTH: f64 = 320.0;
pub const MAX_WIDTH: f64 = 600.0;
pub const LABEL_OFFSET: f64 = 20.0;
pub const GRID_TICKS: [u8; 5] = [0, 25, 50, 75, 100];

/// Chart width for a container of the given pixel width.
pub fn chart_width(container_width: f64) -> f64 {
    if !container_width.is_finite() {
        return MIN_WIDTH;
    }
    (container_width - CONTAINER_PADDING).clamp(MIN_WIDTH, MAX_WIDTH)
}

/// Maps sample index and value to SVG coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    width: f64,
}

impl Layout {
    pub fn new(width: f64) -> Self {
        Layout { width }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        HEIGHT
    }

    pub fn plot_width(&self) -> f64 {
        self.width - PADDING * 2.0
    }

    pub fn plot_height(&self) -> f64 {
        HEIGHT - PADDING * 2.0
    }

    pub fn x(&self, index: usize, count: usize) -> f64 {
        if count < 2 {
            return PADDING;
        }
        PADDING + index as f64 * (self.plot_width() / (count - 1) as f64)
    }

    pub fn y(&self, value: f64) -> f64 {
        PADDING + self.plot_height() - (value / 100.0 * self.plot_height())
    }

    pub fn x_points(&self, count: usize) -> Vec<f64> {
        (0..count).map(|i| self.x(i, count)).collect()
    }
}
