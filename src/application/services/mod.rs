pub mod calendar_service;
pub mod dashboard_service;
pub mod notification_center;

pub use calendar_service::{TimeWindow, day_window, group_by_day, month_window};
pub use dashboard_service::{
    DailyReport, DashboardService, DayPerformance, daily_report, weekly_performance,
};
pub use notification_center::NotificationCenter;
