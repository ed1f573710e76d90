/// Модели дашборда

pub mod age_bands;
pub mod charts;
pub mod dashboard;
pub mod filtering;
pub mod summary;

pub use age_bands::{synthesize_age_bands, AgeBandGroup, AgeBandTable};
pub use charts::ChartBuilder;
pub use dashboard::DashboardView;
pub use filtering::{filter, FilterCriteria};
pub use summary::SummaryCalculator;
