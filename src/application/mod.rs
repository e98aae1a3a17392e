//! Application layer with the reconciler, views and services.

/// Optimistic mutation reconciler.
pub mod reconciler;
/// Stateless services and notification queue.
pub mod services;
/// Per-screen state containers.
pub mod views;

pub use reconciler::{ItemCollection, Reconciler, Reconciliation};
pub use services::{DashboardService, NotificationCenter};
pub use views::{HabitList, KanbanBoard, PlanCalendar, TodoList, VisionBoard};
