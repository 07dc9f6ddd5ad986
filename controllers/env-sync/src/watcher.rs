//! Kubernetes resource watchers.
//!
//! One `EventWatcher` per watched resource kind and namespace, consuming a
//! raw watch stream and dispatching Added/Modified/Deleted events to its
//! operator. Per-event failures are logged and never escalate; a terminated
//! stream is re-established with Fibonacci backoff.

use futures::{StreamExt, TryStreamExt};
use kube::api::{Api, WatchEvent, WatchParams};
use kube::{Resource, ResourceExt};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::backoff::FibonacciBackoff;
use crate::error::OperatorError;
use crate::labels::LabelPredicate;
use crate::operator::EnvVarOperator;

/// Watch actions dispatched to an operator.
#[derive(Debug, Clone, Copy)]
enum Action {
    Added,
    Modified,
    Deleted,
}

/// Watches one resource kind for changes and pushes them to an
/// [`EnvVarOperator`].
pub struct EventWatcher<K, O> {
    api: Api<K>,
    operator: O,
    /// Label filter evaluated before dispatch; events on objects that do not
    /// match are dropped.
    predicate: Option<LabelPredicate>,
    kind: &'static str,
}

impl<K, O> EventWatcher<K, O>
where
    K: Resource<DynamicType = ()>
        + Clone
        + DeserializeOwned
        + std::fmt::Debug
        + Send
        + Sync
        + 'static,
    O: EnvVarOperator<K>,
{
    /// Creates a new watcher instance.
    pub fn new(
        api: Api<K>,
        operator: O,
        predicate: Option<LabelPredicate>,
        kind: &'static str,
    ) -> Self {
        Self {
            api,
            operator,
            predicate,
            kind,
        }
    }

    /// Runs until `shutdown` fires, re-establishing the watch stream with
    /// backoff whenever it terminates.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), OperatorError> {
        info!("Starting {} watcher", self.kind);

        let mut backoff = FibonacciBackoff::new(1, 60);

        loop {
            // resourceVersion "0" surfaces existing objects as synthetic
            // Added events, so state converges on startup and reconnect.
            let mut stream = match self.api.watch(&WatchParams::default(), "0").await {
                Ok(stream) => {
                    backoff.reset();
                    stream.boxed()
                }
                Err(error) => {
                    warn!("{} watch failed to establish: {}", self.kind, error);
                    if !self.sleep_or_close(&mut backoff, &shutdown).await {
                        return Ok(());
                    }
                    continue;
                }
            };

            loop {
                let event = tokio::select! {
                    event = stream.try_next() => event,
                    () = shutdown.cancelled() => {
                        info!("Closing {} watcher", self.kind);
                        return Ok(());
                    }
                };
                match event {
                    Ok(Some(event)) => self.dispatch(event).await,
                    Ok(None) => {
                        warn!("{} watch stream ended", self.kind);
                        break;
                    }
                    Err(error) => {
                        warn!("{} watch stream error: {}", self.kind, error);
                        break;
                    }
                }
            }

            if !self.sleep_or_close(&mut backoff, &shutdown).await {
                return Ok(());
            }
        }
    }

    /// Backs off before a reconnect. False when shutdown fired instead.
    async fn sleep_or_close(
        &self,
        backoff: &mut FibonacciBackoff,
        shutdown: &CancellationToken,
    ) -> bool {
        let delay = backoff.next_backoff();
        debug!("Re-establishing {} watch in {:?}", self.kind, delay);
        tokio::select! {
            () = tokio::time::sleep(delay) => true,
            () = shutdown.cancelled() => {
                info!("Closing {} watcher", self.kind);
                false
            }
        }
    }

    async fn dispatch(&self, event: WatchEvent<K>) {
        match event {
            WatchEvent::Added(object) => self.handle(Action::Added, &object).await,
            WatchEvent::Modified(object) => self.handle(Action::Modified, &object).await,
            WatchEvent::Deleted(object) => self.handle(Action::Deleted, &object).await,
            WatchEvent::Bookmark(_) => trace!("{} watch bookmark", self.kind),
            // An ERROR event is logged and skipped; the stream decides
            // whether it also terminates.
            WatchEvent::Error(response) => {
                warn!("{} watch received action=ERROR: {}", self.kind, response);
            }
        }
    }

    /// Filters one event through the predicate and routes it to the
    /// operator. Every failure is isolated to this event.
    async fn handle(&self, action: Action, object: &K) {
        if let Some(predicate) = &self.predicate {
            if !predicate.matches(object.labels()) {
                trace!(
                    "{} {} does not match {}, dropping event",
                    self.kind,
                    object.name_any(),
                    predicate
                );
                return;
            }
        }

        debug!(
            "{} watch received event {:?} on {} with labels {:?}",
            self.kind,
            action,
            object.name_any(),
            object.labels()
        );

        let result = match action {
            Action::Added => self.operator.on_added(object).await,
            Action::Modified => self.operator.on_modified(object).await,
            Action::Deleted => self.operator.on_deleted(object).await,
        };

        match result {
            Ok(()) => {}
            Err(OperatorError::NoTargetLabel(message)) => warn!("{message}"),
            Err(error) => {
                error!(
                    "{} reconciliation failed for {}: {}",
                    self.kind,
                    object.name_any(),
                    error
                );
            }
        }
    }
}
