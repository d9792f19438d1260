use std::sync::Mutex;

/// Blocking confirmation dialog seam. Destructive or hard-to-undo actions
/// (check-out, KYC assist) go through this before any request is sent;
/// declining is a no-op, not an error.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Always proceeds. Used by the headless agent where nobody can answer.
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Fixed answer, remembering every prompt it was shown.
pub struct StaticConfirm {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl StaticConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Confirm for StaticConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }
}
