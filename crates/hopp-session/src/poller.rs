//! Periodic list refresh
//!
//! [`ListPoller`] fetches a list from a [`ListSource`] right away and then
//! once per interval, publishing the result, a loading flag and the last
//! error as subjects. Stopping is idempotent and may happen at any point,
//! including before the first fetch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hopp_config::AppConfig;
use hopp_store::{BehaviorSubject, Observable};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[async_trait]
pub trait ListSource<T>: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<Vec<T>>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollerError {
    #[error("poller already initialized")]
    AlreadyInitialized,

    #[error("poller has been disposed")]
    Disposed,
}

struct Outputs<T> {
    items: BehaviorSubject<Arc<Vec<T>>>,
    loading: BehaviorSubject<bool>,
    error: BehaviorSubject<Option<String>>,
}

impl<T> Clone for Outputs<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            loading: self.loading.clone(),
            error: self.error.clone(),
        }
    }
}

pub struct ListPoller<T> {
    outputs: Outputs<T>,
    source: Arc<dyn ListSource<T>>,
    interval: Duration,
    shutdown_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
    disposed: bool,
}

impl<T: Clone + Send + Sync + 'static> ListPoller<T> {
    pub fn new(source: Arc<dyn ListSource<T>>, interval: Duration) -> Self {
        Self {
            outputs: Outputs {
                items: BehaviorSubject::new(Arc::new(Vec::new())),
                loading: BehaviorSubject::new(false),
                error: BehaviorSubject::new(None),
            },
            source,
            interval,
            shutdown_tx: None,
            task: None,
            disposed: false,
        }
    }

    /// Poller refreshing at the configured `poll_interval_secs`
    pub fn from_config(source: Arc<dyn ListSource<T>>, config: &AppConfig) -> Self {
        Self::new(source, config.poll_interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn items(&self) -> Observable<Arc<Vec<T>>> {
        self.outputs.items.observable()
    }

    pub fn loading(&self) -> Observable<bool> {
        self.outputs.loading.observable()
    }

    pub fn error(&self) -> Observable<Option<String>> {
        self.outputs.error.observable()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Start polling; must be called from within a tokio runtime
    pub fn initialize(&mut self) -> Result<(), PollerError> {
        if self.disposed {
            return Err(PollerError::Disposed);
        }
        if self.task.is_some() {
            return Err(PollerError::AlreadyInitialized);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            self.outputs.clone(),
            self.interval,
            shutdown_rx,
        ));
        self.shutdown_tx = Some(shutdown_tx);
        self.task = Some(task);
        log::info!("List poller started, interval {:?}", self.interval);
        Ok(())
    }

    /// Stop polling; calling it again is a no-op
    ///
    /// A fetch in flight is abandoned and `loading` drops back to `false`.
    pub fn dispose(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }
        if self.task.take().is_some() {
            log::info!("List poller stopped");
        }
        self.disposed = true;
    }
}

impl<T> Drop for ListPoller<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn poll_loop<T: Send + Sync + 'static>(
    source: Arc<dyn ListSource<T>>,
    outputs: Outputs<T>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            return;
        }

        outputs.loading.next(true);
        tokio::select! {
            result = source.fetch() => match result {
                Ok(items) => {
                    log::debug!("List poller fetched {} item(s)", items.len());
                    outputs.items.next(Arc::new(items));
                    outputs.error.next(None);
                }
                Err(e) => {
                    log::warn!("List poller fetch failed: {:#}", e);
                    outputs.error.next(Some(format!("{:#}", e)));
                }
            },
            _ = shutdown_rx.changed() => {
                outputs.loading.next(false);
                return;
            }
        }
        outputs.loading.next(false);

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown_rx.changed() => return,
        }
    }
}
