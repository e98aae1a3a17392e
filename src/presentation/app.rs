//! Runs one command against the store and writes the resulting view.

use std::io::Write;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use thiserror::Error;
use tracing::{debug, info};

use super::cli::{BoardCommand, Command, HabitCommand, PlanCommand, TodoCommand, VisionCommand};
use super::render;
use crate::application::{
    DashboardService, HabitList, KanbanBoard, NotificationCenter, PlanCalendar, Reconciliation,
    TodoList, VisionBoard,
};
use crate::domain::entities::{PlanDraft, PlanPatch};
use crate::domain::errors::{ReconcileError, StoreError, ValidationError};
use crate::domain::ports::{NotificationPort, RemoteStorePort};

#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum CommandError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("store request failed: {0}")]
    Store(#[from] StoreError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Command runner sharing one store and one notification queue.
pub struct App {
    store: Arc<dyn RemoteStorePort>,
    notifications: Arc<NotificationCenter>,
}

impl App {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStorePort>, notifications: Arc<NotificationCenter>) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Loads the affected view, applies the command, waits for every call to settle
    /// and writes the view followed by the queued notifications.
    ///
    /// # Errors
    /// Returns `CommandError` when the command is rejected before reaching the store,
    /// the report cannot be fetched, or `out` cannot be written.
    pub async fn run(&self, command: Command, out: &mut impl Write) -> Result<(), CommandError> {
        info!(?command, "Running command");
        let result = match command {
            Command::Todo(command) => self.todo(command, out).await,
            Command::Board(command) => self.board(command, out).await,
            Command::Habit(command) => self.habit(command, out).await,
            Command::Plan(command) => self.plan(command, out).await,
            Command::Vision(command) => self.vision(command, out).await,
            Command::Report => self.report(out).await,
        };
        out.write_all(render::notifications(&self.notifications.drain()).as_bytes())?;
        result
    }

    fn notifier(&self) -> Arc<dyn NotificationPort> {
        self.notifications.clone()
    }

    async fn todo(&self, command: TodoCommand, out: &mut impl Write) -> Result<(), CommandError> {
        let mut list = TodoList::new(self.store.clone(), self.notifier());
        list.load();
        settled(list.settle_all().await);

        match command {
            TodoCommand::List => {}
            TodoCommand::Add { title, urgency } => {
                list.add(title, urgency)?;
            }
            TodoCommand::Toggle { id, undo } => list.toggle(&id, !undo)?,
            TodoCommand::Rename { id, title } => list.rename(&id, title)?,
            TodoCommand::Rm { id } => list.remove(&id)?,
        }
        settled(list.settle_all().await);

        out.write_all(render::todos(list.items()).as_bytes())?;
        Ok(())
    }

    async fn board(&self, command: BoardCommand, out: &mut impl Write) -> Result<(), CommandError> {
        let mut board = KanbanBoard::new(self.store.clone(), self.notifier());
        board.load();
        settled(board.settle_all().await);

        match command {
            BoardCommand::Show => {}
            BoardCommand::Add { title, urgency } => {
                board.quick_add(title, urgency)?;
            }
            BoardCommand::Move { id, column, index } => {
                if !board.move_card(&id, column, index)? {
                    debug!(%id, %column, index, "Card already in place");
                }
            }
            BoardCommand::Rm { id } => board.remove(&id)?,
        }
        settled(board.settle_all().await);

        out.write_all(render::board(board.items()).as_bytes())?;
        Ok(())
    }

    async fn habit(&self, command: HabitCommand, out: &mut impl Write) -> Result<(), CommandError> {
        let mut habits = HabitList::new(self.store.clone(), self.notifier());
        habits.load();
        settled(habits.settle_all().await);
        if habits.refresh_if_new_day(Utc::now().date_naive()) {
            settled(habits.settle_all().await);
        }

        match command {
            HabitCommand::List => {}
            HabitCommand::Add { name } => {
                habits.add(name)?;
            }
            HabitCommand::Toggle { id } => habits.toggle(&id)?,
            HabitCommand::Rename { id, name } => habits.rename(&id, name)?,
            HabitCommand::Rm { id } => habits.remove(&id)?,
        }
        settled(habits.settle_all().await);

        out.write_all(render::habits(habits.items(), habits.report()).as_bytes())?;
        Ok(())
    }

    async fn plan(&self, command: PlanCommand, out: &mut impl Write) -> Result<(), CommandError> {
        let mut calendar = PlanCalendar::new(self.store.clone(), self.notifier());
        let today = Utc::now().date_naive();

        match command {
            PlanCommand::List { month, day } => {
                let (year, month) = match (month, day) {
                    (Some(month), _) => month,
                    (None, Some(day)) => (day.year(), day.month()),
                    (None, None) => (today.year(), today.month()),
                };
                calendar.load_month(year, month)?;
                settled(calendar.settle_all().await);

                let text = match day {
                    Some(day) => render::plans_on(day, calendar.plans_on(day)),
                    None => render::plans(calendar.items()),
                };
                out.write_all(text.as_bytes())?;
                return Ok(());
            }
            PlanCommand::Add {
                title,
                start,
                end,
                category,
            } => {
                calendar.load_month(start.year(), start.month())?;
                settled(calendar.settle_all().await);
                calendar.add(PlanDraft {
                    title,
                    start_time: start,
                    end_time: end,
                    category,
                })?;
            }
            PlanCommand::Edit {
                id,
                title,
                start,
                end,
                category,
            } => {
                calendar.load_plan(&id);
                settled(calendar.settle_all().await);
                calendar.edit(
                    &id,
                    PlanPatch {
                        title,
                        category,
                        start_time: start,
                        end_time: end,
                    },
                )?;
            }
            PlanCommand::Rm { id } => {
                calendar.load_plan(&id);
                settled(calendar.settle_all().await);
                calendar.remove(&id)?;
            }
        }
        settled(calendar.settle_all().await);

        out.write_all(render::plans(calendar.items()).as_bytes())?;
        Ok(())
    }

    async fn vision(&self, command: VisionCommand, out: &mut impl Write) -> Result<(), CommandError> {
        let mut board = VisionBoard::new(self.store.clone(), self.notifier());
        board.load();
        settled(board.settle_all().await);

        match command {
            VisionCommand::List => {}
            VisionCommand::Add { url, caption } => {
                board.add(url, caption)?;
            }
            VisionCommand::Rm { id } => board.remove(&id)?,
        }
        settled(board.settle_all().await);

        out.write_all(render::vision(board.items()).as_bytes())?;
        Ok(())
    }

    async fn report(&self, out: &mut impl Write) -> Result<(), CommandError> {
        let service = DashboardService::new(self.store.clone());
        let today = Utc::now().date_naive();
        let (daily, week) = tokio::try_join!(
            service.daily_report(),
            service.weekly_performance(today)
        )?;

        out.write_all(render::daily(daily).as_bytes())?;
        out.write_all(render::weekly(&week).as_bytes())?;
        Ok(())
    }
}

fn settled(outcomes: Vec<Reconciliation>) {
    if !outcomes.is_empty() {
        debug!(?outcomes, "Settled");
    }
}
