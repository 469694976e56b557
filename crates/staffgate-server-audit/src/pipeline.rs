// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{instrument, warn};

use crate::error::{AuditError, AuditResult};
use crate::event::AuditLogEntry;
use crate::sink::AuditSink;

pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

enum Message {
	Entry(AuditLogEntry),
	Flush(oneshot::Sender<()>),
}

/// Queues audit entries and publishes them to every sink in the background.
///
/// Sink failures are logged and never reach the caller.
pub struct AuditService {
	tx: mpsc::Sender<Message>,
}

impl AuditService {
	/// Must be called from within a tokio runtime.
	pub fn new(queue_capacity: usize, sinks: Vec<Arc<dyn AuditSink>>) -> Self {
		let (tx, rx) = mpsc::channel(queue_capacity.max(1));

		tokio::spawn(Self::background_task(rx, sinks));

		Self { tx }
	}

	/// A service with no sinks; entries are accepted and discarded.
	pub fn disabled() -> Self {
		Self::new(1, Vec::new())
	}

	async fn background_task(mut rx: mpsc::Receiver<Message>, sinks: Vec<Arc<dyn AuditSink>>) {
		while let Some(message) = rx.recv().await {
			match message {
				Message::Entry(entry) => {
					let entry = Arc::new(entry);
					for sink in &sinks {
						if let Err(e) = sink.publish(Arc::clone(&entry)).await {
							warn!(sink = sink.name(), error = %e, "audit sink publish failed");
						}
					}
				}
				Message::Flush(done) => {
					let _ = done.send(());
				}
			}
		}
	}

	/// Queue an entry without waiting.
	///
	/// Returns `false` if the queue is full and the entry was dropped.
	#[instrument(skip(self, entry), fields(event_type = %entry.event_type))]
	pub fn log(&self, entry: AuditLogEntry) -> bool {
		let queued = self.tx.try_send(Message::Entry(entry)).is_ok();
		if !queued {
			warn!("audit queue full, entry dropped");
		}
		queued
	}

	/// Queue an entry, waiting for space.
	pub async fn log_blocking(&self, entry: AuditLogEntry) -> AuditResult<()> {
		self
			.tx
			.send(Message::Entry(entry))
			.await
			.map_err(|_| AuditError::Shutdown)
	}

	/// Wait until every entry queued before this call has been published.
	pub async fn flush(&self) -> AuditResult<()> {
		let (done_tx, done_rx) = oneshot::channel();
		self
			.tx
			.send(Message::Flush(done_tx))
			.await
			.map_err(|_| AuditError::Shutdown)?;
		done_rx.await.map_err(|_| AuditError::Shutdown)
	}
}
