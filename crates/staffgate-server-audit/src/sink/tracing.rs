// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuditSinkError;
use crate::event::{AuditLogEntry, AuditSeverity};
use crate::sink::AuditSink;

/// Emits each entry as a structured event on the `audit` target.
pub struct TracingAuditSink {
	name: String,
}

impl TracingAuditSink {
	pub fn new() -> Self {
		Self {
			name: "tracing".to_string(),
		}
	}
}

impl Default for TracingAuditSink {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl AuditSink for TracingAuditSink {
	fn name(&self) -> &str {
		&self.name
	}

	async fn publish(&self, entry: Arc<AuditLogEntry>) -> Result<(), AuditSinkError> {
		let actor = entry.actor_user_id.map(|id| id.to_string());
		match entry.severity {
			AuditSeverity::Warning => tracing::warn!(
				target: "audit",
				event_type = %entry.event_type,
				actor = actor.as_deref(),
				resource_type = entry.resource_type.as_deref(),
				resource_id = entry.resource_id.as_deref(),
				action = %entry.action,
				"audit event"
			),
			AuditSeverity::Info | AuditSeverity::Notice => tracing::info!(
				target: "audit",
				event_type = %entry.event_type,
				severity = %entry.severity,
				actor = actor.as_deref(),
				resource_type = entry.resource_type.as_deref(),
				resource_id = entry.resource_id.as_deref(),
				action = %entry.action,
				"audit event"
			),
		}
		Ok(())
	}
}
