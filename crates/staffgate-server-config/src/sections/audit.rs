// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit logging configuration section.

use serde::{Deserialize, Serialize};

const DEFAULT_RETENTION_DAYS: i64 = 90;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuditConfigLayer {
	pub enabled: Option<bool>,
	pub tracing_sink: Option<bool>,
	pub sqlite_sink: Option<bool>,
	pub retention_days: Option<i64>,
}

impl AuditConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.tracing_sink.is_some() {
			self.tracing_sink = other.tracing_sink;
		}
		if other.sqlite_sink.is_some() {
			self.sqlite_sink = other.sqlite_sink;
		}
		if other.retention_days.is_some() {
			self.retention_days = other.retention_days;
		}
	}

	pub fn finalize(self) -> AuditConfig {
		AuditConfig {
			enabled: self.enabled.unwrap_or(true),
			tracing_sink: self.tracing_sink.unwrap_or(true),
			sqlite_sink: self.sqlite_sink.unwrap_or(true),
			retention_days: self.retention_days.unwrap_or(DEFAULT_RETENTION_DAYS),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditConfig {
	pub enabled: bool,
	/// Emit every audit entry as a structured tracing event.
	pub tracing_sink: bool,
	/// Persist every audit entry to the `audit_logs` table.
	pub sqlite_sink: bool,
	/// Entries older than this are eligible for pruning. Zero keeps everything.
	pub retention_days: i64,
}

impl Default for AuditConfig {
	fn default() -> Self {
		AuditConfigLayer::default().finalize()
	}
}
