// SPDX-License-Identifier: GPL-3.0-only

//! Task execution
//!
//! Single-threaded event loop core. The runtime owns the model and every
//! piece of pending work (timers and device calls) as futures in one
//! `FuturesUnordered`. Nothing is spawned: whoever drives the runtime polls
//! the pending work on its own task, and each completion is dispatched back
//! into the model before the next one is looked at.

use crate::app::AppModel;
use crate::app::state::{Message, Task};
use crate::backends::camera::CaptureDevice;
use crate::errors::RecordingError;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

pub struct Runtime {
    model: AppModel,
    device: Arc<dyn CaptureDevice>,
    pending: FuturesUnordered<BoxFuture<'static, Message>>,
}

impl Runtime {
    pub fn new(model: AppModel, device: Arc<dyn CaptureDevice>) -> Self {
        Self {
            model,
            device,
            pending: FuturesUnordered::new(),
        }
    }

    pub fn model(&self) -> &AppModel {
        &self.model
    }

    /// Number of timers and device calls still outstanding
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Run a message through the model, along with every message its tasks
    /// produce synchronously
    pub fn dispatch(&mut self, message: Message) {
        let mut queue = VecDeque::from([message]);
        while let Some(message) = queue.pop_front() {
            let task = self.model.update(message);
            self.execute(task, &mut queue);
        }
    }

    /// Wait for the next completed piece of pending work.
    /// Resolves to `None` when nothing is pending.
    pub async fn next_message(&mut self) -> Option<Message> {
        self.pending.next().await
    }

    /// Dispatch completions as they arrive for `duration`
    pub async fn run_for(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            tokio::select! {
                biased;
                Some(message) = self.pending.next() => self.dispatch(message),
                _ = tokio::time::sleep_until(deadline) => return,
            }
        }
    }

    /// Dispatch completions until nothing is pending
    pub async fn run_until_idle(&mut self) {
        while let Some(message) = self.pending.next().await {
            self.dispatch(message);
        }
    }

    fn execute(&mut self, task: Task, queue: &mut VecDeque<Message>) {
        match task {
            Task::None => {}
            Task::Done(message) => queue.push_back(message),
            Task::Delay { after, message } => {
                self.pending.push(
                    async move {
                        tokio::time::sleep(after).await;
                        message
                    }
                    .boxed(),
                );
            }
            Task::RequestPermission(kind) => {
                let request = self.device.request_permission(kind);
                self.pending.push(
                    request
                        .map(move |status| Message::PermissionResolved(kind, status))
                        .boxed(),
                );
            }
            Task::OpenSettings => self.device.open_settings(),
            Task::StartRecording { recording, options } => {
                debug!(recording = %recording, device = %options.device_id, "Starting recording");
                match self.device.start_recording(options) {
                    Ok(outcome) => {
                        queue.push_back(Message::RecordingStarted(recording));
                        self.pending.push(
                            async move {
                                let result = outcome.await.unwrap_or_else(|_| {
                                    warn!(recording = %recording, "Device dropped the recording");
                                    Err(RecordingError::Interrupted)
                                });
                                Message::RecordingFinished(recording, result)
                            }
                            .boxed(),
                        );
                    }
                    Err(error) => queue.push_back(Message::RecordingStartFailed(recording, error)),
                }
            }
            Task::StopRecording { recording } => {
                debug!(recording = %recording, "Stopping recording");
                let stop = self.device.stop_recording();
                self.pending.push(
                    stop.map(move |result| Message::StopResolved(recording, result))
                        .boxed(),
                );
            }
            Task::Batch(tasks) => {
                for task in tasks {
                    self.execute(task, queue);
                }
            }
        }
    }
}
