// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit logging for the staffgate directory.
//!
//! Every authorization outcome and every directory mutation is recorded as an
//! [`AuditLogEntry`] and fanned out by [`AuditService`] to its sinks.

pub mod error;
pub mod event;
pub mod pipeline;
pub mod sink;

pub use error::{AuditError, AuditResult, AuditSinkError};
pub use event::{
	AuditEventType, AuditLogBuilder, AuditLogEntry, AuditSeverity, DEFAULT_AUDIT_RETENTION_DAYS,
};
pub use pipeline::{AuditService, DEFAULT_QUEUE_CAPACITY};
pub use sink::AuditSink;

#[cfg(feature = "sink-sqlite")]
pub use sink::sqlite::SqliteAuditSink;

#[cfg(feature = "sink-tracing")]
pub use sink::tracing::TracingAuditSink;
