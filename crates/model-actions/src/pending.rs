use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use futures::future::BoxFuture;

use crate::entity::Entity;
use crate::transport::{ActionResponse, TransportError};
use crate::types::{ChangeSet, MutationState};

/// What a settled [`PendingAction`] yields: the transport's own result.
pub type ActionOutcome = std::result::Result<ActionResponse, TransportError>;

// ─── Rollback ─────────────────────────────────────────────────────────────

/// Restores an entity's attributes if the action it is attached to fails.
pub(crate) struct Rollback {
    entity: Arc<dyn Entity>,
    changes: ChangeSet,
}

impl Rollback {
    pub(crate) fn new(entity: Arc<dyn Entity>, changes: ChangeSet) -> Self {
        Rollback { entity, changes }
    }

    /// Put the old values back without touching the dirty flag.
    fn revert(self) {
        let was_dirty = self.entity.is_dirty();
        self.changes.revert(self.entity.as_ref());
        self.entity.set_dirty(was_dirty);
    }
}

// ─── PendingAction ────────────────────────────────────────────────────────

/// An in-flight action.
///
/// Resolves to exactly the [`ActionOutcome`] the transport produced. If an
/// optimistic change set was attached with
/// [`apply_optimistic`](crate::apply_optimistic), it is reverted when the
/// outcome is an error and dropped when it is a success. Either happens once.
///
/// Like any future, nothing is sent until the action is awaited. Dropping it
/// before it settles (never awaited, or cancelled by a timeout or `select!`)
/// counts as a failure: attached changes are reverted.
///
/// Polling again after completion yields the same outcome.
pub struct PendingAction {
    action: String,
    request: Option<BoxFuture<'static, ActionOutcome>>,
    outcome: Option<ActionOutcome>,
    rollback: Option<Rollback>,
    state: MutationState,
}

impl PendingAction {
    pub fn new(action: impl Into<String>, request: BoxFuture<'static, ActionOutcome>) -> Self {
        PendingAction {
            action: action.into(),
            request: Some(request),
            outcome: None,
            rollback: None,
            state: MutationState::Clean,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    pub fn has_rollback(&self) -> bool {
        self.rollback.is_some()
    }

    /// True once the transport has produced an outcome.
    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }

    pub(crate) fn attach_rollback(&mut self, rollback: Rollback) {
        self.rollback = Some(rollback);
        self.state = MutationState::Mutated;
    }

    fn settle(&mut self, outcome: &ActionOutcome) {
        let Some(rollback) = self.rollback.take() else {
            return;
        };
        match outcome {
            Ok(response) => {
                tracing::debug!(
                    action = %self.action,
                    status = response.status,
                    changes = rollback.changes.len(),
                    "optimistic changes committed"
                );
                self.state = MutationState::Committed;
            }
            Err(e) => {
                tracing::warn!(
                    action = %self.action,
                    changes = rollback.changes.len(),
                    error = %e,
                    "action failed; reverting optimistic changes"
                );
                rollback.revert();
                self.state = MutationState::Reverted;
            }
        }
    }
}

impl Future for PendingAction {
    type Output = ActionOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = &self.outcome {
            return Poll::Ready(outcome.clone());
        }
        let Some(request) = self.request.as_mut() else {
            return Poll::Ready(Err(TransportError::network("action request abandoned")));
        };
        let outcome = ready!(request.as_mut().poll(cx));
        self.request = None;
        self.settle(&outcome);
        self.outcome = Some(outcome.clone());
        Poll::Ready(outcome)
    }
}

impl Drop for PendingAction {
    fn drop(&mut self) {
        let Some(rollback) = self.rollback.take() else {
            return;
        };
        tracing::warn!(
            action = %self.action,
            changes = rollback.changes.len(),
            "action dropped before settling; reverting optimistic changes"
        );
        rollback.revert();
    }
}

impl fmt::Debug for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAction")
            .field("action", &self.action)
            .field("state", &self.state)
            .field("settled", &self.outcome.is_some())
            .field("has_rollback", &self.rollback.is_some())
            .finish()
    }
}
