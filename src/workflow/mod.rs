pub mod attendance;
pub mod confirm;
pub mod dashboard;
pub mod kyc;
pub mod notifications;
pub mod tasks;
pub mod toast;

/// What became of a user action. `Skipped` means no request was sent: the
/// action was unavailable in the current state, a duplicate submission was
/// blocked, or the user declined the confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    Skipped,
}

/// List view state. A failed fetch is kept apart from an empty result so the
/// UI never renders an error as "no data".
#[derive(Debug, Clone)]
pub enum ViewState<T> {
    Loading,
    Loaded(Vec<T>),
    Failed(String),
}

impl<T> ViewState<T> {
    pub fn items(&self) -> &[T] {
        match self {
            ViewState::Loaded(items) => items,
            _ => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ViewState::Failed(_))
    }
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Loading
    }
}
