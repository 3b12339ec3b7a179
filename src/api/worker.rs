//! Background thread for server requests.
//!
//! `RequestThread` owns the backend on a dedicated thread so network calls
//! and preview decoding never block the thread that owns the viewer state.
//! Commands go in through one channel; completions come back as
//! [`BackendMessage`]s, polled with [`RequestThread::take_one_result`].

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::message::{BackendMessage, Command};
use crate::state::Frame;

use super::{ApiError, MeasurementClient, SeriesSource};

/// Message sent to the request thread.
enum ThreadMessage {
    /// Run a command
    Run(Command),
    /// Shutdown the thread
    Shutdown,
}

/// Run one command against a backend, synchronously.
pub fn execute<B>(backend: &B, command: Command) -> BackendMessage
where
    B: MeasurementClient + SeriesSource + ?Sized,
{
    match command {
        Command::LoadInstances { series } => {
            let result = backend.instances(&series);
            BackendMessage::InstancesLoaded { series, result }
        }
        Command::FetchPreview {
            ticket,
            series,
            instance_id,
            window,
        } => {
            let result = backend
                .preview(&series, &instance_id, window)
                .and_then(|bytes| Frame::decode(instance_id.clone(), &bytes).map_err(ApiError::from));
            BackendMessage::PreviewLoaded {
                ticket,
                instance_id,
                result,
            }
        }
        Command::Measure { ticket, request } => BackendMessage::MeasurementCompleted {
            ticket,
            kind: request.kind(),
            result: backend.measure(&request),
        },
    }
}

/// Manages a background thread that executes backend commands in order.
pub struct RequestThread {
    /// Sender for requests to the background thread
    request_tx: Sender<ThreadMessage>,
    /// Receiver for results from the background thread
    result_rx: Receiver<BackendMessage>,
    /// Handle to the background thread (for joining on drop)
    thread_handle: Option<JoinHandle<()>>,
    /// Commands sent but not yet answered
    pending: usize,
}

impl RequestThread {
    /// Spawn a new request thread owning `backend`.
    pub fn spawn<B>(backend: B) -> std::io::Result<Self>
    where
        B: MeasurementClient + SeriesSource + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (result_tx, result_rx) = mpsc::channel::<BackendMessage>();

        let thread_handle = thread::Builder::new()
            .name("request-worker".to_string())
            .spawn(move || {
                log::info!("Request thread started");
                Self::thread_loop(&backend, request_rx, result_tx);
                log::info!("Request thread exiting");
            })?;

        Ok(Self {
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
            pending: 0,
        })
    }

    /// Background thread main loop.
    fn thread_loop<B>(backend: &B, request_rx: Receiver<ThreadMessage>, result_tx: Sender<BackendMessage>)
    where
        B: MeasurementClient + SeriesSource,
    {
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Run(command)) => {
                    log::debug!("Running: {}", command.describe());
                    let result = execute(backend, command);
                    if result_tx.send(result).is_err() {
                        log::warn!("Result channel closed, request thread exiting");
                        break;
                    }
                }
                Ok(ThreadMessage::Shutdown) => {
                    log::debug!("Received shutdown signal");
                    break;
                }
                Err(_) => {
                    log::debug!("Request channel closed, request thread exiting");
                    break;
                }
            }
        }
    }

    /// Queue a command. Returns false if the thread is gone.
    pub fn submit(&mut self, command: Command) -> bool {
        let description = command.describe();
        if self.request_tx.send(ThreadMessage::Run(command)).is_err() {
            log::error!("Failed to send '{}': request thread is gone", description);
            return false;
        }
        self.pending += 1;
        log::debug!("Queued: {}", description);
        true
    }

    /// Take one completed result, if any. Non-blocking.
    pub fn take_one_result(&mut self) -> Option<BackendMessage> {
        match self.result_rx.try_recv() {
            Ok(result) => {
                self.pending = self.pending.saturating_sub(1);
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Request thread disconnected");
                None
            }
        }
    }

    /// Wait up to `timeout` for one completed result.
    pub fn wait_result(&mut self, timeout: Duration) -> Option<BackendMessage> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => {
                self.pending = self.pending.saturating_sub(1);
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Request thread disconnected");
                None
            }
        }
    }

    /// Get the number of commands still awaiting a result.
    pub fn pending_count(&self) -> usize {
        self.pending
    }
}

impl Drop for RequestThread {
    fn drop(&mut self) {
        log::debug!("Shutting down request thread");

        let _ = self.request_tx.send(ThreadMessage::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Request thread panicked: {:?}", e);
            }
        }
    }
}
