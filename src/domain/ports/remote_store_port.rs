//! Remote data store port.

use async_trait::async_trait;

use crate::domain::entities::{ItemId, Row};
use crate::domain::errors::StoreError;

/// Named collections of the hosted data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Tasks, shared by the todo list and the kanban board.
    Todos,
    /// Daily habits.
    Habits,
    /// One row per habit per completion day.
    HabitLogs,
    /// Scheduled calendar blocks.
    CalendarPlans,
    /// Ordered inspiration images.
    VisionBoard,
}

impl Collection {
    /// Table name on the store.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Todos => "todos",
            Self::Habits => "habits",
            Self::HabitLogs => "habit_logs",
            Self::CalendarPlans => "calendar_plans",
            Self::VisionBoard => "vision_board_items",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Comparison applied by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

impl FilterOp {
    /// Operator keyword as written in the store's query string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gte => "gte",
            Self::Lte => "lte",
        }
    }
}

/// One column comparison of a list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Column compared.
    pub column: String,
    /// Comparison applied.
    pub op: FilterOp,
    /// Right-hand side, already rendered as text.
    pub value: String,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Sort order of a list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Column sorted on.
    pub column: String,
    /// Ascending or descending.
    pub direction: Direction,
}

/// Filter and ordering of a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    #[must_use]
    pub fn gte(self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    #[must_use]
    pub fn lte(self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filter(column, FilterOp::Lte, value)
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.into(),
            direction,
        });
        self
    }

    fn filter(mut self, column: impl Into<String>, op: FilterOp, value: impl ToString) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op,
            value: value.to_string(),
        });
        self
    }
}

/// Port for create/read/update/delete calls against the hosted data store.
#[async_trait]
pub trait RemoteStorePort: Send + Sync {
    /// Inserts a row and returns it as stored, including its durable id.
    async fn create(&self, collection: Collection, row: Row) -> Result<Row, StoreError>;

    /// Updates the given fields of one row.
    async fn update(&self, collection: Collection, id: &ItemId, row: Row)
    -> Result<(), StoreError>;

    /// Deletes one row.
    async fn delete(&self, collection: Collection, id: &ItemId) -> Result<(), StoreError>;

    /// Lists rows matching the query.
    async fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Row>, StoreError>;
}
