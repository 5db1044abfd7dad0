pub mod interaction;
pub mod layout;
pub mod series;
pub mod svg;

pub use interaction::ChartState;
pub use interaction::UnknownSeries;
pub use series::SeriesId;
