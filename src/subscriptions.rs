//! Board change subscriptions.
//!
//! After every command that takes effect, the facade publishes one
//! [`BoardChange`] carrying the complete new snapshot to every subscriber,
//! in registration order. Subscribers receive a shared `Arc<Board>` and
//! cannot mutate it.

use crate::command::Command;
use crate::types::Board;
use std::sync::Arc;

/// Categories of mutations.
///
/// Subscribers can use the kind to skip work: a renderer only needs to lay
/// out columns again for [`MutationKind::affects_layout`] changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    TaskAdded,
    TaskDeleted,
    /// Title or description changed.
    TaskUpdated,
    /// A task changed column or position.
    TaskMoved,
    /// A review was added or removed.
    ReviewChanged,
    /// A subtask was added, edited, toggled, removed or reordered.
    SubtaskChanged,
    /// A subtask report was added or removed.
    ReportChanged,
    /// An image was attached or removed.
    ImageChanged,
    /// The whole board was replaced.
    BoardReplaced,
}

impl MutationKind {
    /// Classify a command.
    pub fn of(command: &Command) -> Self {
        match command {
            Command::AddTask { .. } => MutationKind::TaskAdded,
            Command::DeleteTask { .. } => MutationKind::TaskDeleted,
            Command::UpdateTask { .. } => MutationKind::TaskUpdated,
            Command::MoveTask { .. } => MutationKind::TaskMoved,
            Command::AddReview { .. } | Command::DeleteReview { .. } => {
                MutationKind::ReviewChanged
            }
            Command::AddSubtask { .. }
            | Command::UpdateSubtask { .. }
            | Command::DeleteSubtask { .. }
            | Command::ToggleSubtask { .. }
            | Command::ReorderSubtasks { .. } => MutationKind::SubtaskChanged,
            Command::AddSubtaskReport { .. } | Command::DeleteSubtaskReport { .. } => {
                MutationKind::ReportChanged
            }
            Command::AddImage { .. } | Command::DeleteImage { .. } => MutationKind::ImageChanged,
            Command::SetBoard { .. } => MutationKind::BoardReplaced,
        }
    }

    /// Whether column membership or order may have changed.
    pub fn affects_layout(&self) -> bool {
        matches!(
            self,
            MutationKind::TaskAdded
                | MutationKind::TaskDeleted
                | MutationKind::TaskMoved
                | MutationKind::BoardReplaced
        )
    }
}

/// One published change.
#[derive(Debug, Clone)]
pub struct BoardChange {
    pub kind: MutationKind,
    /// Task the command targeted, if any.
    pub task_id: Option<String>,
    pub snapshot: Arc<Board>,
}

/// Handle returned by [`SubscriptionManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&BoardChange) + Send>;

/// Registered subscribers, notified in registration order.
#[derive(Default)]
pub struct SubscriptionManager {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

impl SubscriptionManager {
    /// Create a new empty subscription manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&BoardChange) + Send + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn has_subscriptions(&self) -> bool {
        !self.subscribers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Deliver a change to every subscriber.
    pub fn publish(&mut self, change: &BoardChange) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(change);
        }
    }
}

impl std::fmt::Debug for SubscriptionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionManager")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
