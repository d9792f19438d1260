use crate::api::PortalApi;
use crate::error::PortalError;
use crate::model::kyc::KycAssistanceRequest;
use crate::workflow::confirm::Confirm;
use crate::workflow::toast::Notifier;
use crate::workflow::{ActionOutcome, ViewState};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

struct QueueState {
    view: ViewState<KycAssistanceRequest>,
    pending: u64,
    assisted: u64,
    in_flight: HashSet<u64>,
}

/// Queue of patients waiting for help with document verification.
///
/// Assist is terminal: the confirmed item leaves the pending queue, the
/// counters move by exactly one each, and the queue is then re-fetched.
pub struct KycQueue {
    api: Arc<dyn PortalApi>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    state: Mutex<QueueState>,
}

impl KycQueue {
    pub fn new(
        api: Arc<dyn PortalApi>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            api,
            notifier,
            confirm,
            state: Mutex::new(QueueState {
                view: ViewState::Loading,
                pending: 0,
                assisted: 0,
                in_flight: HashSet::new(),
            }),
        }
    }

    pub fn queue(&self) -> ViewState<KycAssistanceRequest> {
        self.state.lock().unwrap().view.clone()
    }

    pub fn pending_count(&self) -> u64 {
        self.state.lock().unwrap().pending
    }

    pub fn assisted_count(&self) -> u64 {
        self.state.lock().unwrap().assisted
    }

    pub async fn refresh(&self) -> Result<(), PortalError> {
        match self.api.kyc_queue().await {
            Ok(items) => {
                let mut state = self.state.lock().unwrap();
                state.pending = items.len() as u64;
                state.view = ViewState::Loaded(items);
                Ok(())
            }
            Err(e) => {
                self.state.lock().unwrap().view = ViewState::Failed(e.to_string());
                self.notifier
                    .error(&format!("Could not load KYC queue: {e}"));
                Err(e)
            }
        }
    }

    /// Assist one request. The confirmation prompt shows who the patient is
    /// and which documents they submitted, so the staff member approves the
    /// right one.
    pub async fn assist(
        &self,
        id: u64,
        notes: Option<&str>,
    ) -> Result<ActionOutcome, PortalError> {
        let item = {
            let state = self.state.lock().unwrap();
            match state.view.items().iter().find(|k| k.id == id) {
                Some(item) => item.clone(),
                None => return Ok(ActionOutcome::Skipped),
            }
        };

        let prompt = format!(
            "Assist {} (patient #{}) with documents: {}?",
            item.patient,
            item.patient_id,
            item.documents.join(", ")
        );
        if !self.confirm.confirm(&prompt) {
            return Ok(ActionOutcome::Skipped);
        }
        if !self.state.lock().unwrap().in_flight.insert(id) {
            return Ok(ActionOutcome::Skipped);
        }

        let result = self.api.assist_kyc(id, notes).await;
        self.state.lock().unwrap().in_flight.remove(&id);

        match result {
            Ok(()) => {
                {
                    let mut state = self.state.lock().unwrap();
                    if let ViewState::Loaded(items) = &mut state.view {
                        items.retain(|k| k.id != id);
                    }
                    state.pending = state.pending.saturating_sub(1);
                    state.assisted += 1;
                }
                self.notifier
                    .success(&format!("Assisted {} with KYC verification", item.patient));
                self.refresh().await?;
                Ok(ActionOutcome::Done)
            }
            Err(e) => {
                self.notifier.error(&format!("KYC assist failed: {e}"));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixtures::FixtureApi;
    use crate::workflow::confirm::{AutoConfirm, StaticConfirm};
    use crate::workflow::toast::BufferedNotifier;

    fn queue(confirm: Arc<dyn Confirm>) -> (Arc<FixtureApi>, KycQueue) {
        let api = Arc::new(FixtureApi::seeded());
        let queue = KycQueue::new(api.clone(), Arc::new(BufferedNotifier::new()), confirm);
        (api, queue)
    }

    #[tokio::test]
    async fn assist_removes_exactly_the_assisted_item() {
        let (_api, queue) = queue(Arc::new(AutoConfirm));
        queue.refresh().await.unwrap();
        assert_eq!(queue.pending_count(), 2);

        let outcome = queue.assist(7, None).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Done);

        let remaining: Vec<u64> = queue.queue().items().iter().map(|k| k.id).collect();
        assert_eq!(remaining, vec![9]);
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(queue.assisted_count(), 1);
    }

    #[tokio::test]
    async fn prompt_names_the_patient_and_documents() {
        let confirm = Arc::new(StaticConfirm::new(true));
        let (_api, queue) = {
            let api = Arc::new(FixtureApi::seeded());
            let q = KycQueue::new(
                api.clone(),
                Arc::new(BufferedNotifier::new()),
                confirm.clone(),
            );
            (api, q)
        };
        queue.refresh().await.unwrap();
        queue.assist(7, Some("walked patient through upload")).await.unwrap();

        let prompts = confirm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Arjun Mehta"));
        assert!(prompts[0].contains("passport"));
    }

    #[tokio::test]
    async fn declined_assist_leaves_queue_untouched() {
        let (api, queue) = queue(Arc::new(StaticConfirm::new(false)));
        queue.refresh().await.unwrap();

        let outcome = queue.assist(7, None).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Skipped);
        assert_eq!(queue.queue().items().len(), 2);
        assert_eq!(
            api.calls().iter().filter(|c| *c == "assist_kyc").count(),
            0
        );
    }

    #[tokio::test]
    async fn unknown_id_is_skipped() {
        let (_api, queue) = queue(Arc::new(AutoConfirm));
        queue.refresh().await.unwrap();
        assert_eq!(queue.assist(999, None).await.unwrap(), ActionOutcome::Skipped);
    }
}
