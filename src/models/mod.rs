pub mod due;
pub mod review_session;
pub mod scheduler;
pub mod study_item;

pub use due::{StudyStats, select_due, summarize};
pub use review_session::ReviewSession;
pub use scheduler::{
    ReviewSchedule, SchedulerPolicy, compute_next_review, compute_next_review_date,
    format_interval, next_review_date_from_now, preview_intervals,
};
pub use study_item::{ContentType, ReviewUpdate, StudyItem};
