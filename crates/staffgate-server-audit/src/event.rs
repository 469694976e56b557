// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core event types for audit logging.
//!
//! - [`AuditEventType`]: Enumeration of all auditable events
//! - [`AuditSeverity`]: RFC 5424-compatible severity levels
//! - [`AuditLogEntry`]: Complete audit record
//! - [`AuditLogBuilder`]: Fluent API for constructing entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use staffgate_server_auth::{ParseError, UserId};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Default retention period for audit logs in days.
pub const DEFAULT_AUDIT_RETENTION_DAYS: i64 = 90;

/// Types of events that can be recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
	// Authorization outcomes
	AccessGranted,
	AccessDenied,

	// Employee lifecycle
	EmployeeCreated,
	EmployeeUpdated,
	EmployeeDeleted,

	// Department lifecycle
	DepartmentCreated,
	DepartmentUpdated,
	DepartmentDeleted,

	// Manager assignment
	ManagerAssigned,
	ManagerCleared,
	ManagerAssignmentRejected,

	// User and role administration
	UserCreated,
	UserUpdated,
	UserDeleted,
	RoleCreated,
	RoleUpdated,
	RoleDeleted,
	RoleAssigned,
	RoleRevoked,
}

impl AuditEventType {
	pub fn all() -> &'static [AuditEventType] {
		&[
			AuditEventType::AccessGranted,
			AuditEventType::AccessDenied,
			AuditEventType::EmployeeCreated,
			AuditEventType::EmployeeUpdated,
			AuditEventType::EmployeeDeleted,
			AuditEventType::DepartmentCreated,
			AuditEventType::DepartmentUpdated,
			AuditEventType::DepartmentDeleted,
			AuditEventType::ManagerAssigned,
			AuditEventType::ManagerCleared,
			AuditEventType::ManagerAssignmentRejected,
			AuditEventType::UserCreated,
			AuditEventType::UserUpdated,
			AuditEventType::UserDeleted,
			AuditEventType::RoleCreated,
			AuditEventType::RoleUpdated,
			AuditEventType::RoleDeleted,
			AuditEventType::RoleAssigned,
			AuditEventType::RoleRevoked,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			AuditEventType::AccessGranted => "access_granted",
			AuditEventType::AccessDenied => "access_denied",
			AuditEventType::EmployeeCreated => "employee_created",
			AuditEventType::EmployeeUpdated => "employee_updated",
			AuditEventType::EmployeeDeleted => "employee_deleted",
			AuditEventType::DepartmentCreated => "department_created",
			AuditEventType::DepartmentUpdated => "department_updated",
			AuditEventType::DepartmentDeleted => "department_deleted",
			AuditEventType::ManagerAssigned => "manager_assigned",
			AuditEventType::ManagerCleared => "manager_cleared",
			AuditEventType::ManagerAssignmentRejected => "manager_assignment_rejected",
			AuditEventType::UserCreated => "user_created",
			AuditEventType::UserUpdated => "user_updated",
			AuditEventType::UserDeleted => "user_deleted",
			AuditEventType::RoleCreated => "role_created",
			AuditEventType::RoleUpdated => "role_updated",
			AuditEventType::RoleDeleted => "role_deleted",
			AuditEventType::RoleAssigned => "role_assigned",
			AuditEventType::RoleRevoked => "role_revoked",
		}
	}

	/// Returns the default severity for this event type.
	///
	/// - `Info`: Normal operations (access granted, records created or updated)
	/// - `Notice`: Administrative actions (deletions, manager and role changes)
	/// - `Warning`: Security-relevant refusals (access denied, rejected assignment)
	pub fn default_severity(&self) -> AuditSeverity {
		match self {
			AuditEventType::AccessGranted
			| AuditEventType::EmployeeCreated
			| AuditEventType::EmployeeUpdated
			| AuditEventType::DepartmentCreated
			| AuditEventType::DepartmentUpdated
			| AuditEventType::UserCreated
			| AuditEventType::UserUpdated
			| AuditEventType::RoleCreated => AuditSeverity::Info,

			AuditEventType::EmployeeDeleted
			| AuditEventType::DepartmentDeleted
			| AuditEventType::ManagerAssigned
			| AuditEventType::ManagerCleared
			| AuditEventType::UserDeleted
			| AuditEventType::RoleUpdated
			| AuditEventType::RoleDeleted
			| AuditEventType::RoleAssigned
			| AuditEventType::RoleRevoked => AuditSeverity::Notice,

			AuditEventType::AccessDenied | AuditEventType::ManagerAssignmentRejected => {
				AuditSeverity::Warning
			}
		}
	}
}

impl fmt::Display for AuditEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for AuditEventType {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		AuditEventType::all()
			.iter()
			.copied()
			.find(|t| t.as_str() == s)
			.ok_or_else(|| ParseError {
				kind: "audit event type",
				value: s.to_string(),
			})
	}
}

/// Severity levels following RFC 5424 (syslog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
	#[default]
	Info = 6,
	Notice = 5,
	Warning = 4,
}

impl PartialOrd for AuditSeverity {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for AuditSeverity {
	fn cmp(&self, other: &Self) -> Ordering {
		// Lower numeric value = higher severity
		(*other as u8).cmp(&(*self as u8))
	}
}

impl fmt::Display for AuditSeverity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			AuditSeverity::Info => "info",
			AuditSeverity::Notice => "notice",
			AuditSeverity::Warning => "warning",
		};
		write!(f, "{s}")
	}
}

impl FromStr for AuditSeverity {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"info" => Ok(AuditSeverity::Info),
			"notice" => Ok(AuditSeverity::Notice),
			"warning" => Ok(AuditSeverity::Warning),
			_ => Err(ParseError {
				kind: "audit severity",
				value: s.to_string(),
			}),
		}
	}
}

/// An entry in the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
	pub id: Uuid,
	pub timestamp: DateTime<Utc>,
	pub event_type: AuditEventType,
	pub severity: AuditSeverity,

	/// The user who performed the action (if known).
	pub actor_user_id: Option<UserId>,

	/// The kind of record affected (e.g., "employee", "department").
	pub resource_type: Option<String>,
	pub resource_id: Option<String>,

	/// Short action label, e.g. "update" or "assign_manager".
	pub action: String,
	pub ip_address: Option<String>,
	/// Additional event-specific details.
	pub details: serde_json::Value,
}

impl AuditLogEntry {
	/// Create a new audit log builder for the given event type.
	pub fn builder(event_type: AuditEventType) -> AuditLogBuilder {
		AuditLogBuilder::new(event_type)
	}
}

/// Builder for constructing audit log entries with a fluent API.
#[derive(Debug, Clone)]
pub struct AuditLogBuilder {
	event_type: AuditEventType,
	severity: Option<AuditSeverity>,
	actor_user_id: Option<UserId>,
	resource_type: Option<String>,
	resource_id: Option<String>,
	action: Option<String>,
	ip_address: Option<String>,
	details: serde_json::Value,
}

impl AuditLogBuilder {
	pub fn new(event_type: AuditEventType) -> Self {
		Self {
			event_type,
			severity: None,
			actor_user_id: None,
			resource_type: None,
			resource_id: None,
			action: None,
			ip_address: None,
			details: serde_json::Value::Null,
		}
	}

	/// Set the severity level. Defaults to the event type's default severity.
	pub fn severity(mut self, severity: AuditSeverity) -> Self {
		self.severity = Some(severity);
		self
	}

	pub fn actor(mut self, user_id: UserId) -> Self {
		self.actor_user_id = Some(user_id);
		self
	}

	/// Set the resource type and ID affected by this event.
	pub fn resource(
		mut self,
		resource_type: impl Into<String>,
		resource_id: impl Into<String>,
	) -> Self {
		self.resource_type = Some(resource_type.into());
		self.resource_id = Some(resource_id.into());
		self
	}

	/// Set only the resource type, for collection-level events.
	pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
		self.resource_type = Some(resource_type.into());
		self
	}

	pub fn action(mut self, action: impl Into<String>) -> Self {
		self.action = Some(action.into());
		self
	}

	pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
		self.ip_address = Some(ip.into());
		self
	}

	pub fn details(mut self, details: serde_json::Value) -> Self {
		self.details = details;
		self
	}

	pub fn build(self) -> AuditLogEntry {
		AuditLogEntry {
			id: Uuid::new_v4(),
			timestamp: Utc::now(),
			event_type: self.event_type,
			severity: self
				.severity
				.unwrap_or_else(|| self.event_type.default_severity()),
			actor_user_id: self.actor_user_id,
			resource_type: self.resource_type,
			resource_id: self.resource_id,
			action: self.action.unwrap_or_else(|| self.event_type.to_string()),
			ip_address: self.ip_address,
			details: self.details,
		}
	}
}
