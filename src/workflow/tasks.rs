use crate::api::{PortalApi, TaskQuery};
use crate::error::PortalError;
use crate::model::task::{Task, TaskStatus};
use crate::workflow::toast::Notifier;
use crate::workflow::{ActionOutcome, ViewState};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

struct BoardState {
    view: ViewState<Task>,
    pending: u64,
    in_flight: HashSet<u64>,
}

/// Staff task queue. Start acts only on `pending` items and Complete only on
/// `in-progress`; anything else is a request-free no-op (the action simply
/// is not available in that state). The server confirms before the local
/// list is touched, the pending counter saturates at zero, and every
/// mutation ends in an authoritative re-fetch.
pub struct TaskBoard {
    api: Arc<dyn PortalApi>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<BoardState>,
}

impl TaskBoard {
    pub fn new(api: Arc<dyn PortalApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            state: Mutex::new(BoardState {
                view: ViewState::Loading,
                pending: 0,
                in_flight: HashSet::new(),
            }),
        }
    }

    pub fn tasks(&self) -> ViewState<Task> {
        self.state.lock().unwrap().view.clone()
    }

    pub fn pending_count(&self) -> u64 {
        self.state.lock().unwrap().pending
    }

    pub async fn refresh(&self) -> Result<(), PortalError> {
        match self.api.tasks(TaskQuery::default()).await {
            Ok(page) => {
                let pending = page
                    .data
                    .iter()
                    .filter(|t| t.status == TaskStatus::Pending)
                    .count() as u64;
                let mut state = self.state.lock().unwrap();
                state.view = ViewState::Loaded(page.data);
                state.pending = pending;
                Ok(())
            }
            Err(e) => {
                self.state.lock().unwrap().view = ViewState::Failed(e.to_string());
                self.notifier.error(&format!("Could not load tasks: {e}"));
                Err(e)
            }
        }
    }

    pub async fn start(&self, id: u64) -> Result<ActionOutcome, PortalError> {
        self.transition(id, TaskStatus::Pending, "start").await
    }

    pub async fn complete(&self, id: u64) -> Result<ActionOutcome, PortalError> {
        self.transition(id, TaskStatus::InProgress, "complete").await
    }

    async fn transition(
        &self,
        id: u64,
        from: TaskStatus,
        action: &str,
    ) -> Result<ActionOutcome, PortalError> {
        {
            let mut state = self.state.lock().unwrap();
            let eligible = state
                .view
                .items()
                .iter()
                .any(|t| t.id == id && t.status == from);
            if !eligible || !state.in_flight.insert(id) {
                return Ok(ActionOutcome::Skipped);
            }
        }

        let result = match from {
            TaskStatus::Pending => self.api.start_task(id).await,
            _ => self.api.complete_task(id).await,
        };
        self.state.lock().unwrap().in_flight.remove(&id);

        match result {
            Ok(updated) => {
                {
                    let mut state = self.state.lock().unwrap();
                    if let ViewState::Loaded(items) = &mut state.view {
                        if let Some(task) = items.iter_mut().find(|t| t.id == id) {
                            *task = updated;
                        }
                    }
                    if from == TaskStatus::Pending {
                        state.pending = state.pending.saturating_sub(1);
                    }
                }
                self.notifier.success(&format!("Task {action}ed"));
                // Converge on the server's view rather than trusting the
                // optimistic counter long-term.
                self.refresh().await?;
                Ok(ActionOutcome::Done)
            }
            Err(e) => {
                self.notifier
                    .error(&format!("Could not {action} task: {e}"));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixtures::FixtureApi;
    use crate::workflow::toast::BufferedNotifier;

    fn board() -> (Arc<FixtureApi>, TaskBoard) {
        let api = Arc::new(FixtureApi::seeded());
        let board = TaskBoard::new(api.clone(), Arc::new(BufferedNotifier::new()));
        (api, board)
    }

    #[tokio::test]
    async fn start_moves_pending_task_and_decrements_counter() {
        let (_api, board) = board();
        board.refresh().await.unwrap();
        assert_eq!(board.pending_count(), 1);

        let outcome = board.start(5).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Done);
        assert_eq!(board.pending_count(), 0);

        let task = board
            .tasks()
            .items()
            .iter()
            .find(|t| t.id == 5)
            .cloned()
            .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn start_on_non_pending_task_sends_no_request() {
        let (api, board) = board();
        board.refresh().await.unwrap();

        // Task 6 is already in progress.
        let outcome = board.start(6).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Skipped);
        assert_eq!(
            api.calls().iter().filter(|c| *c == "start_task").count(),
            0
        );
    }

    #[tokio::test]
    async fn counter_never_goes_below_zero() {
        let (_api, board) = board();
        board.refresh().await.unwrap();

        board.start(5).await.unwrap();
        assert_eq!(board.pending_count(), 0);

        // A second start on the same task is a no-op in every respect.
        let outcome = board.start(5).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Skipped);
        assert_eq!(board.pending_count(), 0);
    }

    #[tokio::test]
    async fn complete_finishes_in_progress_task() {
        let (_api, board) = board();
        board.refresh().await.unwrap();

        let outcome = board.complete(6).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Done);
        let task = board
            .tasks()
            .items()
            .iter()
            .find(|t| t.id == 6)
            .cloned()
            .unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn failed_fetch_is_an_error_state_not_an_empty_list() {
        let (api, board) = board();
        api.set_offline(true);

        assert!(board.refresh().await.is_err());
        assert!(board.tasks().is_failed());
    }
}
