use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::actions::Action;
use super::effects::{run_effects, EffectContext};
use super::reducer::{reduce, AppState, Notice};
use crate::auth::Subscription;
use crate::domain::UserData;

/// Upper bound on actions handled by one [`Dispatcher::run_until_idle`] call.
const MAX_STEPS: usize = 10_000;

type Inbox = Arc<Mutex<VecDeque<Action>>>;

/// Owns the application state and drains an explicit FIFO of actions.
///
/// Each step reduces one action and then runs its effects, whose follow-up
/// actions join the back of the queue. Auth subject changes arrive through an
/// inbox fed by the provider subscription and are picked up between steps.
pub struct Dispatcher {
    state: AppState,
    queue: VecDeque<Action>,
    inbox: Inbox,
    effects: EffectContext,
    _auth: Subscription,
}

impl Dispatcher {
    pub fn new(effects: EffectContext) -> Self {
        let inbox: Inbox = Arc::new(Mutex::new(VecDeque::new()));
        let sink = Arc::clone(&inbox);
        let subscription = effects.auth.subscribe(Arc::new(move |user: &UserData| {
            let mut pending = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            pending.push_back(Action::SetUser(user.clone()));
        }));
        Self {
            state: AppState::default(),
            queue: VecDeque::new(),
            inbox,
            effects,
            _auth: subscription,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queues `action`; a queued request with the same coalescing key is dropped.
    pub fn dispatch(&mut self, action: Action) {
        if let Some(key) = action.coalesce_key() {
            let before = self.queue.len();
            self.queue
                .retain(|queued| queued.coalesce_key().as_deref() != Some(key.as_str()));
            if self.queue.len() != before {
                debug!(key = %key, "superseded queued request");
            }
        }
        self.queue.push_back(action);
    }

    /// Handles the next action, returning it, or `None` when idle.
    ///
    /// The outcome of a request is reduced before this returns, so the next
    /// queued request always sees the state the previous one produced.
    pub fn step(&mut self) -> Option<Action> {
        self.drain_inbox();
        let action = self.queue.pop_front()?;
        self.apply(&action);
        self.drain_inbox();
        Some(action)
    }

    fn apply(&mut self, action: &Action) {
        reduce(&mut self.state, action);
        for follow_up in run_effects(&self.effects, &self.state, action) {
            if follow_up.is_outcome() {
                self.apply(&follow_up);
            } else {
                self.dispatch(follow_up);
            }
        }
    }

    /// Steps until the queue is empty and returns how many actions ran.
    pub fn run_until_idle(&mut self) -> usize {
        let mut steps = 0;
        while self.step().is_some() {
            steps += 1;
            if steps >= MAX_STEPS {
                warn!(steps, pending = self.queue.len(), "dispatcher did not settle");
                break;
            }
        }
        steps
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.state.notices)
    }

    fn drain_inbox(&mut self) {
        let arrived: Vec<Action> = {
            let mut inbox = self.inbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            inbox.drain(..).collect()
        };
        for action in arrived {
            self.dispatch(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthProvider, LocalAuth};
    use crate::calc::BudgetCalculator;
    use crate::storage::MemoryStore;

    fn dispatcher() -> (Dispatcher, Arc<LocalAuth>) {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(LocalAuth::with_store(store.clone()));
        let ctx = EffectContext::new(store, auth.clone(), BudgetCalculator::default());
        (Dispatcher::new(ctx), auth)
    }

    #[test]
    fn latest_queued_request_wins() {
        let (mut dispatcher, _) = dispatcher();
        dispatcher.run_until_idle();
        dispatcher.dispatch(Action::CompareBalance { fact: 1 });
        dispatcher.dispatch(Action::LoadBudgetTitles);
        dispatcher.dispatch(Action::CompareBalance { fact: 2 });
        assert_eq!(dispatcher.pending(), 2);
        assert_eq!(dispatcher.step(), Some(Action::LoadBudgetTitles));
        assert_eq!(dispatcher.step(), Some(Action::CompareBalance { fact: 2 }));
    }

    #[test]
    fn auth_changes_flow_into_state() {
        let (mut dispatcher, auth) = dispatcher();
        auth.sign_up("d@e.f", "secret1", "Dee").unwrap();
        dispatcher.run_until_idle();
        assert!(dispatcher.state().user.is_signed_in());
        assert_eq!(dispatcher.state().spinner.active_requests, 0);

        dispatcher.dispatch(Action::SignOut);
        dispatcher.run_until_idle();
        assert!(!dispatcher.state().user.is_signed_in());
    }

    #[test]
    fn outcome_is_reduced_before_next_request_runs() {
        let (mut dispatcher, _) = dispatcher();
        dispatcher.run_until_idle();
        dispatcher.dispatch(Action::LoadBudgetTitles);
        dispatcher.dispatch(Action::CompareBalance { fact: 5 });
        assert_eq!(dispatcher.step(), Some(Action::LoadBudgetTitles));
        assert_eq!(dispatcher.state().notices, vec![Notice::error("no_user")]);
        assert_eq!(dispatcher.state().spinner.active_requests, 0);
        assert_eq!(dispatcher.pending(), 1);
    }

    #[test]
    fn requests_without_user_fail_with_code() {
        let (mut dispatcher, _) = dispatcher();
        dispatcher.dispatch(Action::LoadBudget {
            budget_id: "b".into(),
        });
        dispatcher.run_until_idle();
        let notices = dispatcher.take_notices();
        assert_eq!(notices, vec![Notice::error("no_user")]);
        assert!(dispatcher.take_notices().is_empty());
    }
}
