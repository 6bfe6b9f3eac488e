pub mod compare;
pub mod frequency;
pub mod periods;
pub mod series;

pub use compare::Comparison;
pub use frequency::{FrequencyEntry, FrequencyTable, field_distribution};
pub use periods::{Growth, PeriodReport, PeriodResult, analyze_periods};
pub use series::{
    AnalysisError, DailySeries, MonthlyPoint, build_daily_series, build_monthly_series,
};
