// Copyright 2025 Cowboy AI, LLC.

//! Adapter handles and the initialization state machine
//!
//! A factory wraps every adapter it constructs in an [`AdapterHandle`]. The
//! handle tracks initialization through an explicit state machine
//! (`Constructed -> Initializing -> Ready | Failed`) published on a watch
//! channel, so the default fire-and-forget initialization stays observable:
//! callers that want to block can await [`AdapterHandle::wait_ready`] instead
//! of racing a background task.
//!
//! `Failed` is terminal. Nothing at this layer retries; a replacement handle
//! comes from reconfiguring the factory.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error};
use uuid::Uuid;

use crate::adapter::{DomainService, PlatformAdapter};
use crate::entity::DomainRecord;
use crate::platform::{Platform, PlatformConfig};

/// Initialization state of an adapter held by a factory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// Constructed; initialization not yet attempted
    Constructed,
    /// An `initialize` call is in flight
    Initializing,
    /// `initialize` returned `true`
    Ready,
    /// `initialize` returned `false`; terminal, never retried here
    Failed,
}

impl InitState {
    /// Whether the state machine has reached `Ready` or `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, InitState::Ready | InitState::Failed)
    }
}

/// A cached adapter instance plus its observable initialization state
///
/// Handles are cheap to clone; clones share the adapter and the state
/// channel. Handle identity (`id`) changes only when a factory constructs a
/// replacement, which is what the reconfiguration contract is expressed in.
pub struct AdapterHandle<T: DomainRecord> {
    id: Uuid,
    platform: Platform,
    adapter: Arc<dyn PlatformAdapter<T>>,
    state_tx: Arc<watch::Sender<InitState>>,
    state_rx: watch::Receiver<InitState>,
    created_at: DateTime<Utc>,
}

impl<T: DomainRecord> Clone for AdapterHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            platform: self.platform,
            adapter: self.adapter.clone(),
            state_tx: self.state_tx.clone(),
            state_rx: self.state_rx.clone(),
            created_at: self.created_at,
        }
    }
}

impl<T: DomainRecord> std::fmt::Debug for AdapterHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterHandle")
            .field("id", &self.id)
            .field("platform", &self.platform)
            .field("state", &self.state())
            .finish()
    }
}

impl<T: DomainRecord> AdapterHandle<T> {
    /// Wrap a freshly constructed adapter
    pub fn new(platform: Platform, adapter: Arc<dyn PlatformAdapter<T>>) -> Self {
        let (state_tx, state_rx) = watch::channel(InitState::Constructed);
        Self {
            id: Uuid::new_v4(),
            platform,
            adapter,
            state_tx: Arc::new(state_tx),
            state_rx,
            created_at: Utc::now(),
        }
    }

    /// Identity of this handle; replaced wholesale on reconfiguration
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Platform the wrapped adapter talks to
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The wrapped adapter
    pub fn adapter(&self) -> Arc<dyn PlatformAdapter<T>> {
        self.adapter.clone()
    }

    /// When the handle was constructed
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current initialization state
    pub fn state(&self) -> InitState {
        *self.state_rx.borrow()
    }

    /// Whether the adapter initialized successfully
    pub fn is_ready(&self) -> bool {
        self.state() == InitState::Ready
    }

    /// Run initialization to completion, once
    ///
    /// Exactly one caller performs the `initialize` call; concurrent callers
    /// in `Initializing` wait for its outcome. `Ready`/`Failed` return
    /// immediately. An adapter that already reports `is_initialized()` is
    /// promoted to `Ready` without another `initialize` attempt.
    pub async fn initialize_now(&self, config: &PlatformConfig) -> bool {
        match self.state() {
            InitState::Ready => return true,
            InitState::Failed => return false,
            InitState::Initializing => return self.wait_ready().await,
            InitState::Constructed => {}
        }

        if self.adapter.is_initialized() {
            self.publish(InitState::Ready);
            return true;
        }

        let claimed = self.state_tx.send_if_modified(|state| {
            if *state == InitState::Constructed {
                *state = InitState::Initializing;
                true
            } else {
                false
            }
        });
        if !claimed {
            return self.wait_ready().await;
        }

        debug!(platform = %self.platform, "initializing adapter");
        let ok = self.adapter.initialize(config).await;
        if ok {
            self.publish(InitState::Ready);
        } else {
            error!(platform = %self.platform, "adapter initialization failed");
            self.publish(InitState::Failed);
        }
        ok
    }

    /// Start initialization in the background (fire-and-forget)
    ///
    /// The outcome is observable through [`AdapterHandle::state`] and
    /// [`AdapterHandle::wait_ready`]; failures are logged by the background
    /// task.
    pub fn start_initialize(&self, config: PlatformConfig) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            // No runtime on this thread; initialization stays deferred until
            // the first composite call or an explicit initialize_now.
            debug!(platform = %self.platform, "no tokio runtime; deferring initialization");
            return;
        };
        let handle = self.clone();
        runtime.spawn(async move {
            handle.initialize_now(&config).await;
        });
    }

    /// Wait for initialization to reach a terminal state
    ///
    /// Returns `true` when the adapter ended up `Ready`. Completes
    /// immediately if initialization already finished; if it was never
    /// started, this waits until someone starts it.
    pub async fn wait_ready(&self) -> bool {
        let mut rx = self.state_rx.clone();
        let result = match rx.wait_for(InitState::is_terminal).await {
            Ok(state) => *state == InitState::Ready,
            // Sender kept alive by this handle; unreachable in practice.
            Err(_) => self.is_ready(),
        };
        result
    }

    fn publish(&self, state: InitState) {
        self.state_tx.send_replace(state);
    }
}
