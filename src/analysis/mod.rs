//! Filtering and the aggregates shown on the dashboard.

pub mod aggregate;
mod dashboard;
mod filter;

pub use aggregate::{
    daily_counts, done_split, group_counts, is_done, map_points, recent_count, status_counts,
    type_counts, DailyCount, DoneSplit, GroupCount, LabelCount,
};
pub use dashboard::{key_figures, Dashboard, KeyFigures};
pub use filter::{filter, filter_options, Filters};
