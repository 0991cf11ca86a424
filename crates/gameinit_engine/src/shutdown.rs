//! Process-wide cleanup hooks, run once when the application exits.
//!
//! Registration hands back a [`HookToken`]; unregistering takes that token, so
//! a hook can always be removed no matter how its closure was built.
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use engine_logging::{engine_debug, engine_info};

pub type ShutdownHook = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookToken(u64);

pub trait ShutdownRegistry: Send + Sync {
    fn register(&self, hook: ShutdownHook) -> HookToken;
    /// Returns `false` if the token was unknown or its hook already ran.
    fn unregister(&self, token: HookToken) -> bool;
}

#[derive(Default)]
struct Hooks {
    next_token: u64,
    pending: BTreeMap<u64, ShutdownHook>,
    ran: bool,
}

#[derive(Default)]
pub struct ShutdownHooks {
    inner: Mutex<Hooks>,
}

impl ShutdownHooks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Hooks> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_run(&self) -> bool {
        self.lock().ran
    }

    /// Runs every pending hook in registration order. Later calls run nothing.
    ///
    /// Hooks run without the lock held, so they may unregister themselves.
    pub fn run_all(&self) -> usize {
        let hooks = {
            let mut guard = self.lock();
            if guard.ran {
                return 0;
            }
            guard.ran = true;
            std::mem::take(&mut guard.pending)
        };
        let count = hooks.len();
        engine_info!("running {} shutdown hook(s)", count);
        for (_, hook) in hooks {
            hook();
        }
        count
    }
}

impl ShutdownRegistry for ShutdownHooks {
    /// Once shutdown has run, a late registration is executed immediately.
    fn register(&self, hook: ShutdownHook) -> HookToken {
        let (token, late) = {
            let mut guard = self.lock();
            guard.next_token += 1;
            let token = guard.next_token;
            if guard.ran {
                (token, Some(hook))
            } else {
                guard.pending.insert(token, hook);
                (token, None)
            }
        };
        if let Some(hook) = late {
            engine_debug!("shutdown already ran; running hook {} now", token);
            hook();
        }
        HookToken(token)
    }

    fn unregister(&self, token: HookToken) -> bool {
        self.lock().pending.remove(&token.0).is_some()
    }
}
