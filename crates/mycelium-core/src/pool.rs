//! Worker pool running deployment units.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use mycelium_config::PoolConfig;
use mycelium_protocols::KernelError;

/// A dedicated multi-threaded runtime sized from [`PoolConfig`].
///
/// Units run here instead of on the caller's runtime, so a unit that blocks
/// a worker thread never stalls the thread driving the kernel.
pub struct WorkerPool {
    name: String,
    workers: usize,
    config: PoolConfig,
    runtime: Mutex<Option<Runtime>>,
    spawned: AtomicU64,
}

impl WorkerPool {
    pub fn new(name: impl Into<String>, config: PoolConfig) -> Self {
        Self {
            name: name.into(),
            workers: config.workers(),
            config,
            runtime: Mutex::new(None),
            spawned: AtomicU64::new(0),
        }
    }

    /// Build the runtime. Starting a running pool is a no-op.
    pub fn start(&self) -> Result<(), KernelError> {
        let mut runtime = self.runtime.lock();
        if runtime.is_some() {
            return Ok(());
        }

        let built = Builder::new_multi_thread()
            .worker_threads(self.workers)
            .thread_name(format!("{}-worker", self.name))
            .thread_keep_alive(self.config.keep_alive())
            .enable_all()
            .build()
            .map_err(|e| KernelError::Environment(format!("cannot build worker pool: {e}")))?;
        *runtime = Some(built);
        info!("Worker pool started with {} workers", self.workers);
        Ok(())
    }

    /// Spawn `future` onto the pool.
    pub fn spawn<F>(&self, future: F) -> Result<JoinHandle<F::Output>, KernelError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let runtime = self.runtime.lock();
        let runtime = runtime.as_ref().ok_or(KernelError::PoolNotRunning)?;
        self.spawned.fetch_add(1, Ordering::Relaxed);
        Ok(runtime.spawn(future))
    }

    /// Stop accepting work. In-flight tasks are detached, not awaited.
    pub fn shutdown(&self) {
        if let Some(runtime) = self.runtime.lock().take() {
            runtime.shutdown_background();
            info!("Worker pool stopped");
        } else {
            debug!("Worker pool was not running");
        }
    }

    pub fn is_running(&self) -> bool {
        self.runtime.lock().is_some()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Total tasks ever spawned.
    pub fn tasks_spawned(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Dropping a runtime from async context panics.
        if let Some(runtime) = self.runtime.get_mut().take() {
            runtime.shutdown_background();
        }
    }
}
