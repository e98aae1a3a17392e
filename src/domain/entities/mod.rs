//! Domain entity definitions.

mod board;
mod credentials;
mod habit;
mod item;
mod plan;
mod record;
mod todo;
mod vision;

pub use board::{BoardCard, BoardColumn, ColumnChange};
pub use credentials::ApiKey;
pub use habit::{HabitDraft, HabitLogRecord, HabitPatch, HabitRecord};
pub use item::{ItemId, ItemKey, TempId, Tracked};
pub use plan::{PlanCategory, PlanDraft, PlanPatch, PlanRecord};
pub use record::{
    Draft, FromRow, InsertPosition, Patch, Record, Row, decode_row, require_label,
};
pub use todo::{TodoDraft, TodoPatch, TodoRecord, Urgency};
pub use vision::{VisionDraft, VisionItem, VisionPatch};
