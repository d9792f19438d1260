use std::sync::Mutex;

/// Toast sink: transient, non-blocking success/failure feedback. Workflows
/// never render; they hand the message to whatever notifier the embedder
/// wired in.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Notifier that writes toasts to the log, used by the headless agent.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        tracing::info!(toast = message, "success");
    }

    fn error(&self, message: &str) {
        tracing::error!(toast = message, "error");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toast {
    Success(String),
    Error(String),
}

/// Notifier that buffers toasts for a UI (or a test) to drain.
#[derive(Default)]
pub struct BufferedNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl BufferedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts.lock().unwrap())
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }
}

impl Notifier for BufferedNotifier {
    fn success(&self, message: &str) {
        self.toasts
            .lock()
            .unwrap()
            .push(Toast::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.toasts
            .lock()
            .unwrap()
            .push(Toast::Error(message.to_string()));
    }
}
