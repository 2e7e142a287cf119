pub mod aggregation;
pub mod debounce;
pub mod emphasis;
pub mod models;
pub mod year_selector;

// 重新导出常用类型
pub use aggregation::{
    language_distribution, rating_histogram, tag_frequency, weekly_dataset, weekly_series,
    Aggregates,
};
pub use debounce::{Clock, Debouncer, ManualClock, SystemClock, TimerHandle};
pub use emphasis::{compute_emphasis, EmphasisParams, ItemEmphasis, ItemPosition, ViewportGeometry};
pub use models::{ChartDataset, ChartKind, FrequencyEntry, RatingBucket, WeeklyBucket};
pub use year_selector::{GeometrySnapshot, SelectorState, YearScroller, YearSelector};
