//! View state containers, one per screen.
//!
//! Each view owns a [`Reconciler`](super::reconciler::Reconciler) for its
//! collection and exposes the operations of that screen.

mod habit_list;
mod kanban_board;
mod plan_calendar;
mod todo_list;
mod vision_board;

pub use habit_list::HabitList;
pub use kanban_board::KanbanBoard;
pub use plan_calendar::PlanCalendar;
pub use todo_list::TodoList;
pub use vision_board::VisionBoard;
