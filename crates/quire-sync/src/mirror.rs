//! Local-first mirroring of store mutations to a repository.
//!
//! The page store never waits for persistence. [`SyncMirror::attach`]
//! registers a store callback that turns every block mutation into a
//! [`RemoteCall`] and queues it; a background task drains the queue in order
//! against the repository. A failed call is logged and broadcast as a
//! [`SyncFailure`]. Local state is never rolled back: the UI already shows
//! the change.
//!
//! ```text
//! PageStore ──subscribe──▶ queue (mpsc) ──worker──▶ BlockRepository
//!                                            │
//!                                            └─ Err ──▶ broadcast<SyncFailure>
//! ```

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc, oneshot};

use quire_doc::{PageStore, StoreEvent, SubscriptionId};
use quire_types::{Block, BlockId, PageId, UserId};

use crate::error::{Result, SyncError};
use crate::repository::BlockRepository;

/// Which remote operation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOp {
    Create,
    Update,
    Delete,
    Reorder,
}

impl std::fmt::Display for SyncOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncOp::Create => "create",
            SyncOp::Update => "update",
            SyncOp::Delete => "delete",
            SyncOp::Reorder => "reorder",
        };
        f.write_str(name)
    }
}

/// A mirrored call that the repository rejected.
#[derive(Clone, Debug)]
pub struct SyncFailure {
    pub page_id: PageId,
    pub op: SyncOp,
    pub error: SyncError,
}

/// One queued repository call.
#[derive(Clone, Debug, PartialEq)]
pub enum RemoteCall {
    Create(Block),
    Update {
        page_id: PageId,
        block_id: BlockId,
        content: serde_json::Value,
    },
    Delete {
        page_id: PageId,
        block_id: BlockId,
    },
    Reorder {
        page_id: PageId,
        block_ids: Vec<BlockId>,
    },
}

impl RemoteCall {
    /// The call mirroring `event`, if the event needs one.
    ///
    /// Whole-page replacement and store resets come from (or stay in) the
    /// local session and are not mirrored.
    ///
    /// A reorder renumbers only the listed ids remotely. Blocks a partial
    /// local reorder dropped stay in the repository and return on the next
    /// [`hydrate_page`](crate::hydrate_page).
    pub fn from_event(event: &StoreEvent) -> Option<Self> {
        match event {
            StoreEvent::BlockAdded { block } => Some(RemoteCall::Create(block.clone())),
            StoreEvent::BlockUpdated { block } => Some(RemoteCall::Update {
                page_id: block.page_id,
                block_id: block.id,
                content: block.content.to_value(),
            }),
            StoreEvent::BlockDeleted { page_id, block_id } => Some(RemoteCall::Delete {
                page_id: *page_id,
                block_id: *block_id,
            }),
            StoreEvent::BlocksReordered { page_id, block_ids } => Some(RemoteCall::Reorder {
                page_id: *page_id,
                block_ids: block_ids.clone(),
            }),
            StoreEvent::PageReplaced { .. } | StoreEvent::StoreReset => None,
        }
    }

    pub fn page_id(&self) -> PageId {
        match self {
            RemoteCall::Create(block) => block.page_id,
            RemoteCall::Update { page_id, .. }
            | RemoteCall::Delete { page_id, .. }
            | RemoteCall::Reorder { page_id, .. } => *page_id,
        }
    }

    pub fn op(&self) -> SyncOp {
        match self {
            RemoteCall::Create(_) => SyncOp::Create,
            RemoteCall::Update { .. } => SyncOp::Update,
            RemoteCall::Delete { .. } => SyncOp::Delete,
            RemoteCall::Reorder { .. } => SyncOp::Reorder,
        }
    }

    async fn execute(self, repo: &dyn BlockRepository, user: UserId) -> Result<()> {
        match self {
            RemoteCall::Create(block) => repo.create_block(user, &block).await,
            RemoteCall::Update {
                page_id,
                block_id,
                content,
            } => repo.update_block(user, page_id, block_id, content).await,
            RemoteCall::Delete { page_id, block_id } => {
                repo.delete_block(user, page_id, block_id).await
            }
            RemoteCall::Reorder { page_id, block_ids } => {
                repo.reorder_blocks(user, page_id, &block_ids).await
            }
        }
    }
}

enum Job {
    Call(RemoteCall),
    Flush(oneshot::Sender<()>),
}

/// Mirrors one user's store mutations to a repository.
pub struct SyncMirror {
    user: UserId,
    queue: mpsc::UnboundedSender<Job>,
    failures: broadcast::Sender<SyncFailure>,
}

impl SyncMirror {
    /// Start the background worker on `runtime`.
    pub fn new(repo: Arc<dyn BlockRepository>, user: UserId, runtime: &Handle) -> Self {
        let (queue, mut jobs) = mpsc::unbounded_channel::<Job>();
        let (failures, _) = broadcast::channel(256);

        let failure_tx = failures.clone();
        runtime.spawn(async move {
            while let Some(job) = jobs.recv().await {
                match job {
                    Job::Call(call) => {
                        let page_id = call.page_id();
                        let op = call.op();
                        if let Err(error) = call.execute(repo.as_ref(), user).await {
                            tracing::warn!(page = %page_id, %op, %error, "remote sync failed; keeping local state");
                            let _ = failure_tx.send(SyncFailure { page_id, op, error });
                        } else {
                            tracing::trace!(page = %page_id, %op, "remote sync ok");
                        }
                    }
                    Job::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            tracing::debug!("sync mirror worker stopped");
        });

        Self {
            user,
            queue,
            failures,
        }
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    /// Start mirroring `store`. Detach with [`detach`](Self::detach).
    pub fn attach(&self, store: &mut PageStore) -> SubscriptionId {
        let queue = self.queue.clone();
        store.subscribe(move |event| {
            if let Some(call) = RemoteCall::from_event(event)
                && queue.send(Job::Call(call)).is_err()
            {
                tracing::warn!("sync mirror worker is gone; dropping remote call");
            }
        })
    }

    pub fn detach(&self, store: &mut PageStore, subscription: SubscriptionId) -> bool {
        store.unsubscribe(subscription)
    }

    /// Receive failures from now on.
    pub fn failures(&self) -> broadcast::Receiver<SyncFailure> {
        self.failures.subscribe()
    }

    /// Wait until every call queued so far has been attempted.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.queue.send(Job::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

impl std::fmt::Debug for SyncMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncMirror")
            .field("user", &self.user)
            .field("failure_receivers", &self.failures.receiver_count())
            .finish()
    }
}
