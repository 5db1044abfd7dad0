
pub const SAMPLES: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesId(pub u8);

impl std::fmt::Display for SeriesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line of the chart. Values are percentages in `0..=100`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub id: SeriesId,
    pub label: &'static str,
    pub color: &'static str,
    pub values: [u8; SAMPLES],
}

/// Illustrative personality-trait scores; not derived from any listening data.
pub const DEFAULT_SERIES: [ChartSeries; 5] = [
    ChartSeries {
        id: SeriesId(1),
        label: "Openness",
        color: "#FFE469",
        values: [65, 59, 80, 81, 56, 55, 40],
    },
    ChartSeries {
        id: SeriesId(2),
        label: "Conscientiousness",
        color: "#FFCC90",
        values: [28, 48, 40, 19, 86, 27, 90],
    },
    ChartSeries {
        id: SeriesId(3),
        label: "Extraversion",
        color: "#BAE28C",
        values: [80, 40, 32, 45, 78, 52, 63],
    },
    ChartSeries {
        id: SeriesId(4),
        label: "Agreeableness",
        color: "#F4BDFF",
        values: [45, 70, 75, 38, 25, 60, 85],
    },
    ChartSeries {
        id: SeriesId(5),
        label: "Neuroticism",
        color: "#9ED9FF",
        values: [20, 35, 60, 90, 50, 75, 30],
    },
];
