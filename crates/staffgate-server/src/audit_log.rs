// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Administrator access to the audit log.

use staffgate_server_audit::AuditLogEntry;
use staffgate_server_auth::{Action, ResourceAttrs, ResourceKind, UserId};
use staffgate_server_db::{AuditQuery, AuditStats};

use crate::error::Result;
use crate::state::AppState;

/// One page of audit entries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditPage {
	pub entries: Vec<AuditLogEntry>,
	pub total: i64,
}

#[derive(Clone)]
pub struct AuditLogService {
	state: AppState,
}

impl AuditLogService {
	pub fn new(state: AppState) -> Self {
		Self { state }
	}

	/// Filtered entries, newest first.
	#[tracing::instrument(skip(self, query), fields(user_id = %actor))]
	pub async fn query(&self, actor: UserId, query: &AuditQuery) -> Result<AuditPage> {
		self.require_read(actor).await?;
		let (entries, total) = self.state.stores.audit_logs.query_logs(query).await?;
		Ok(AuditPage { entries, total })
	}

	#[tracing::instrument(skip(self), fields(user_id = %actor))]
	pub async fn statistics(&self, actor: UserId) -> Result<AuditStats> {
		self.require_read(actor).await?;
		Ok(self.state.stores.audit_logs.statistics().await?)
	}

	/// Only administrators hold audit log access; no seeded role grants it.
	async fn require_read(&self, actor: UserId) -> Result<()> {
		let subject = self.state.authz.subject(actor).await?;
		self.state.authz.require(
			&subject,
			Action::Read,
			&ResourceAttrs::collection(ResourceKind::AuditLog),
		)
	}
}
