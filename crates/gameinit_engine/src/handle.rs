use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use engine_logging::{engine_debug, engine_info};
use tokio_util::sync::CancellationToken;

use crate::shutdown::{HookToken, ShutdownRegistry};
use crate::FetchId;

/// Lifecycle of one fetch. Only ever moves forward:
/// `Active -> Cancelled`, or `Active -> Finishing -> Completed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Active,
    /// Transfer done, committing the file. Cancel is a no-op from here on.
    Finishing,
    Completed,
    Failed,
    Cancelled,
}

impl FetchPhase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => FetchPhase::Active,
            1 => FetchPhase::Finishing,
            2 => FetchPhase::Completed,
            3 => FetchPhase::Failed,
            _ => FetchPhase::Cancelled,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            FetchPhase::Active => 0,
            FetchPhase::Finishing => 1,
            FetchPhase::Completed => 2,
            FetchPhase::Failed => 3,
            FetchPhase::Cancelled => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FetchPhase::Completed | FetchPhase::Failed | FetchPhase::Cancelled
        )
    }
}

struct FetchShared {
    fetch_id: FetchId,
    phase: AtomicU8,
    token: CancellationToken,
    hook: Mutex<Option<HookToken>>,
    registry: Arc<dyn ShutdownRegistry>,
}

impl FetchShared {
    fn phase(&self) -> FetchPhase {
        FetchPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    fn transition(&self, from: FetchPhase, to: FetchPhase) -> bool {
        self.phase
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release_hook(&self) {
        let token = self
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(token) = token {
            self.registry.unregister(token);
        }
    }

    fn cancel(&self) -> bool {
        if !self.transition(FetchPhase::Active, FetchPhase::Cancelled) {
            return false;
        }
        self.token.cancel();
        self.release_hook();
        engine_info!("fetch {} cancelled", self.fetch_id);
        true
    }
}

/// Handle to one in-flight download.
///
/// Clones share the same transfer. Once the fetch reached a terminal phase the
/// handle is inert: [`FetchHandle::cancel`] does nothing and returns `false`.
#[derive(Clone)]
pub struct FetchHandle {
    shared: Arc<FetchShared>,
}

impl std::fmt::Debug for FetchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchHandle")
            .field("fetch_id", &self.shared.fetch_id)
            .field("phase", &self.phase())
            .finish()
    }
}

impl FetchHandle {
    /// Creates the handle and registers its shutdown auto-cancel.
    pub(crate) fn new(fetch_id: FetchId, registry: Arc<dyn ShutdownRegistry>) -> Self {
        let shared = Arc::new(FetchShared {
            fetch_id,
            phase: AtomicU8::new(FetchPhase::Active.as_u8()),
            token: CancellationToken::new(),
            hook: Mutex::new(None),
            registry: registry.clone(),
        });
        let weak: Weak<FetchShared> = Arc::downgrade(&shared);
        let token = registry.register(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                engine_debug!("shutdown cancelling fetch {}", shared.fetch_id);
                shared.cancel();
            }
        }));
        *shared.hook.lock().unwrap_or_else(PoisonError::into_inner) = Some(token);
        // Shutdown may already have run and cancelled us during `register`.
        if shared.phase() != FetchPhase::Active {
            shared.release_hook();
        }
        Self { shared }
    }

    pub fn id(&self) -> FetchId {
        self.shared.fetch_id
    }

    pub fn phase(&self) -> FetchPhase {
        self.shared.phase()
    }

    pub fn is_active(&self) -> bool {
        self.phase() == FetchPhase::Active
    }

    /// Requests cooperative cancellation. Safe to call any number of times;
    /// returns `true` only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        self.shared.cancel()
    }

    pub(crate) fn cancellation(&self) -> &CancellationToken {
        &self.shared.token
    }

    /// Claims the right to report success or failure. Fails if cancelled.
    pub(crate) fn begin_finish(&self) -> bool {
        self.shared
            .transition(FetchPhase::Active, FetchPhase::Finishing)
    }

    pub(crate) fn finish(&self, succeeded: bool) {
        let to = if succeeded {
            FetchPhase::Completed
        } else {
            FetchPhase::Failed
        };
        self.shared.transition(FetchPhase::Finishing, to);
        self.shared.release_hook();
    }
}
