//! Client sessions: root contexts over a shared store.
//!
//! A session holds a lease on its store and hands out root contexts that each
//! carry their own lease. The store is closed once the session and every
//! context it handed out have released their leases.

use crate::config::NamingConfig;
use crate::context::{Context, Environment, LeakWarning, RemoteContext, StoreLease};
use crate::error::NamingError;
use crate::store::NamingStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An open client session
pub struct NamingSession {
    store: Arc<dyn NamingStore>,
    environment: Environment,
    lease: StoreLease,
    root: Arc<RemoteContext>,
    warn_on_leak: bool,
}

impl NamingSession {
    /// Open a session over `store` using the initial environment from `config`
    pub fn open(store: Arc<dyn NamingStore>, config: &NamingConfig) -> Result<Self, NamingError> {
        config.ensure_valid()?;

        let environment = Environment::from_map(config.environment.clone());
        let lease = StoreLease::acquire(Arc::clone(&store));
        let warn_on_leak = config.close.warn_on_leak;
        let root = Arc::new(Self::leased_root(
            &store,
            &environment,
            &lease,
            warn_on_leak,
        ));

        info!(
            environment_keys = environment.len(),
            warn_on_leak, "Naming session opened"
        );

        Ok(Self {
            store,
            environment,
            lease,
            root,
            warn_on_leak,
        })
    }

    /// The session's root context
    pub fn context(&self) -> Arc<RemoteContext> {
        Arc::clone(&self.root)
    }

    /// Another root context over the same store and environment, with its own
    /// lease and close tasks.
    pub fn derive_context(&self) -> RemoteContext {
        debug!("Deriving additional root context");
        Self::leased_root(&self.store, &self.environment, &self.lease, self.warn_on_leak)
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Leases outstanding on the store, including the session's own
    pub fn store_holders(&self) -> usize {
        self.lease.holders()
    }

    /// Close the root context and release the session's lease.
    ///
    /// Contexts handed out earlier keep the store open until they close too.
    pub fn shutdown(self) {
        self.root.close();
        if let Err(err) = self.lease.release() {
            warn!(error = %err, "Failed to close store at session shutdown");
        }
        info!("Naming session shut down");
    }

    fn leased_root(
        store: &Arc<dyn NamingStore>,
        environment: &Environment,
        lease: &StoreLease,
        warn_on_leak: bool,
    ) -> RemoteContext {
        let mut builder = RemoteContext::builder(Arc::clone(store))
            .environment(environment.clone())
            .close_task(lease.clone());
        if warn_on_leak {
            builder = builder.close_task(LeakWarning::new("session root"));
        }
        builder.build()
    }
}
