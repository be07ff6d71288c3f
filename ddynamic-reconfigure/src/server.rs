//! Request queue between the transport layer and the registry owner.
//!
//! The transport receives set-configuration requests on its own thread and
//! forwards them through a [`ReconfigureHandle`]; the owning side drains
//! them with a [`ReconfigureServer`] and replies with the post-apply
//! snapshot, which the transport returns as the response payload.

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::registry::DDynamicReconfigure;

/// A pending set-configuration request paired with its reply channel.
///
/// Obtained from [`ReconfigureServer::take_request`] when the owner wants to
/// handle requests itself instead of letting the server dispatch them.
pub struct ReconfigureRequest {
    config: Config,
    reply_tx: flume::Sender<Config>,
}

impl ReconfigureRequest {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Send the response snapshot back to the requester.
    pub fn reply(self, snapshot: Config) {
        // The requester may have gone away; the changes stand either way.
        let _ = self.reply_tx.send(snapshot);
    }
}

/// Clonable sender side, handed to the transport's request-handling thread.
#[derive(Clone)]
pub struct ReconfigureHandle {
    tx: flume::Sender<ReconfigureRequest>,
}

impl ReconfigureHandle {
    /// Enqueue a request and block until the resulting snapshot arrives.
    pub fn reconfigure(&self, config: Config) -> Result<Config> {
        let (reply_tx, reply_rx) = flume::bounded(1);
        self.tx
            .send(ReconfigureRequest { config, reply_tx })
            .map_err(|_| Error::ChannelClosed)?;
        reply_rx.recv().map_err(|_| Error::ChannelClosed)
    }

    /// Enqueue a request and await the resulting snapshot.
    pub async fn reconfigure_async(&self, config: Config) -> Result<Config> {
        let (reply_tx, reply_rx) = flume::bounded(1);
        self.tx
            .send_async(ReconfigureRequest { config, reply_tx })
            .await
            .map_err(|_| Error::ChannelClosed)?;
        reply_rx.recv_async().await.map_err(|_| Error::ChannelClosed)
    }
}

/// Drains queued requests into a registry.
pub struct ReconfigureServer {
    registry: Arc<DDynamicReconfigure>,
    rx: flume::Receiver<ReconfigureRequest>,
}

impl ReconfigureServer {
    pub fn new(registry: Arc<DDynamicReconfigure>) -> (Self, ReconfigureHandle) {
        let (tx, rx) = flume::unbounded();
        (Self { registry, rx }, ReconfigureHandle { tx })
    }

    pub fn registry(&self) -> &Arc<DDynamicReconfigure> {
        &self.registry
    }

    /// Retrieve the next request without applying it.
    ///
    /// Useful when the owner wants to inspect or route requests itself; the
    /// request must then be answered with [`ReconfigureRequest::reply`].
    pub fn take_request(&self) -> Result<ReconfigureRequest> {
        self.rx.recv().map_err(|_| Error::ChannelClosed)
    }

    /// Block waiting for the next request, apply it, and reply with the
    /// snapshot. Fails with [`Error::ChannelClosed`] once every handle has
    /// been dropped.
    pub fn process_one(&self) -> Result<Config> {
        let request = self.rx.recv().map_err(|_| Error::ChannelClosed)?;
        Ok(self.dispatch(request))
    }

    /// Apply the next request if one is queued.
    pub fn try_process(&self) -> Result<Option<Config>> {
        match self.rx.try_recv() {
            Ok(request) => Ok(Some(self.dispatch(request))),
            Err(flume::TryRecvError::Empty) => Ok(None),
            Err(flume::TryRecvError::Disconnected) => Err(Error::ChannelClosed),
        }
    }

    /// Await the next request, apply it, and reply with the snapshot.
    pub async fn process_one_async(&self) -> Result<Config> {
        let request = self
            .rx
            .recv_async()
            .await
            .map_err(|_| Error::ChannelClosed)?;
        Ok(self.dispatch(request))
    }

    fn dispatch(&self, request: ReconfigureRequest) -> Config {
        debug!(
            "Handling reconfigure request with {} change(s)",
            request.config.len()
        );
        let snapshot = self.registry.apply_changes(&request.config);
        request.reply(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Binding, SharedVar};

    #[test]
    fn test_try_process_empty_queue() {
        let registry = Arc::new(DDynamicReconfigure::new());
        let (server, _handle) = ReconfigureServer::new(registry);
        assert!(server.try_process().unwrap().is_none());
    }

    #[test]
    fn test_closed_channel_reported() {
        let registry = Arc::new(DDynamicReconfigure::new());
        let (server, handle) = ReconfigureServer::new(registry);
        drop(handle);
        assert!(matches!(server.process_one(), Err(Error::ChannelClosed)));
        assert!(matches!(server.try_process(), Err(Error::ChannelClosed)));
    }

    #[test]
    fn test_try_process_applies_queued_request() {
        let registry = Arc::new(DDynamicReconfigure::new());
        let speed = SharedVar::new(0i64);
        registry
            .register_variable("speed", Binding::var(&speed), "")
            .unwrap();

        let (server, handle) = ReconfigureServer::new(registry);
        let worker = std::thread::spawn(move || {
            handle
                .reconfigure(Config::default().with("speed", 6i64))
                .unwrap()
        });

        // Spin until the request shows up in the queue
        let snapshot = loop {
            if let Some(snapshot) = server.try_process().unwrap() {
                break snapshot;
            }
            std::thread::yield_now();
        };
        assert_eq!(snapshot.get::<i64>("speed"), Some(6));
        assert_eq!(speed.get(), 6);
        assert_eq!(worker.join().unwrap(), snapshot);
    }

    #[test]
    fn test_take_request_with_manual_reply() {
        let registry = Arc::new(DDynamicReconfigure::new());
        let speed = SharedVar::new(0i64);
        registry
            .register_variable("speed", Binding::var(&speed), "")
            .unwrap();

        let (server, handle) = ReconfigureServer::new(registry.clone());
        let worker = std::thread::spawn(move || {
            handle
                .reconfigure(Config::default().with("speed", 4i64))
                .unwrap()
        });

        let request = server.take_request().unwrap();
        assert_eq!(request.config().get::<i64>("speed"), Some(4));
        let snapshot = registry.apply_changes(request.config());
        request.reply(snapshot.clone());
        assert_eq!(worker.join().unwrap(), snapshot);
        assert_eq!(speed.get(), 4);
    }

    #[test]
    fn test_request_reply_round_trip() {
        let registry = Arc::new(DDynamicReconfigure::new());
        let speed = SharedVar::new(0i64);
        registry
            .register_variable("speed", Binding::var(&speed), "")
            .unwrap();

        let (server, handle) = ReconfigureServer::new(registry);
        let worker = std::thread::spawn(move || handle.reconfigure(Config::default().with("speed", 9i64)));
        let snapshot = server.process_one().unwrap();
        assert_eq!(snapshot.get::<i64>("speed"), Some(9));
        assert_eq!(worker.join().unwrap().unwrap(), snapshot);
        assert_eq!(speed.get(), 9);
    }
}
