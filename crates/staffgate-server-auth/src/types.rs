// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for the staffgate authorization system.
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs for directory entities
//!   ([`UserId`], [`EmployeeId`], [`DepartmentId`], etc.) preventing accidental mixing
//! - **Role archetypes**: [`RoleType`], the behavioral tag every role carries
//! - **Grant vocabulary**: [`ResourceKind`] and [`Action`], the two halves of a
//!   coarse (resource, action) permission
//!
//! All ID types implement transparent serde serialization (as UUID strings) and
//! provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user account.");
define_id_type!(RoleId, "Unique identifier for a role.");
define_id_type!(PermissionId, "Unique identifier for a permission.");
define_id_type!(EmployeeId, "Unique identifier for an employee record.");
define_id_type!(DepartmentId, "Unique identifier for a department.");

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
	pub kind: &'static str,
	pub value: String,
}

impl ParseError {
	fn new(kind: &'static str, value: &str) -> Self {
		Self {
			kind,
			value: value.to_string(),
		}
	}
}

// =============================================================================
// Role Archetypes
// =============================================================================

/// The behavioral archetype of a role.
///
/// Scoping rules dispatch on this tag, never on the role's name. The tag is
/// stored data and may change; the evaluator always reads the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
	/// Universal bypass.
	Admin,
	/// Line manager of one or more departments.
	Manager,
	/// Rank-and-file staff.
	Employee,
	/// Member of the HR department.
	#[serde(alias = "hr_employee")]
	HrStaff,
	/// Head of the HR department.
	HrManager,
	/// Member of the Accounting department.
	Accounting,
}

impl RoleType {
	/// Returns all role archetypes.
	pub fn all() -> &'static [RoleType] {
		&[
			RoleType::Admin,
			RoleType::Manager,
			RoleType::Employee,
			RoleType::HrStaff,
			RoleType::HrManager,
			RoleType::Accounting,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			RoleType::Admin => "admin",
			RoleType::Manager => "manager",
			RoleType::Employee => "employee",
			RoleType::HrStaff => "hr_staff",
			RoleType::HrManager => "hr_manager",
			RoleType::Accounting => "accounting",
		}
	}
}

impl fmt::Display for RoleType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RoleType {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"admin" => Ok(RoleType::Admin),
			"manager" => Ok(RoleType::Manager),
			"employee" => Ok(RoleType::Employee),
			"hr_staff" | "hr_employee" => Ok(RoleType::HrStaff),
			"hr_manager" => Ok(RoleType::HrManager),
			"accounting" => Ok(RoleType::Accounting),
			_ => Err(ParseError::new("role type", s)),
		}
	}
}

// =============================================================================
// Resources and Actions
// =============================================================================

/// Kinds of resource a permission can name.
///
/// `EmployeeSalary` is deliberately distinct from `Employee`: read access to
/// identity fields and read access to compensation are gated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
	User,
	Role,
	Employee,
	EmployeeSalary,
	Department,
	AuditLog,
}

impl ResourceKind {
	pub fn all() -> &'static [ResourceKind] {
		&[
			ResourceKind::User,
			ResourceKind::Role,
			ResourceKind::Employee,
			ResourceKind::EmployeeSalary,
			ResourceKind::Department,
			ResourceKind::AuditLog,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ResourceKind::User => "user",
			ResourceKind::Role => "role",
			ResourceKind::Employee => "employee",
			ResourceKind::EmployeeSalary => "employee_salary",
			ResourceKind::Department => "department",
			ResourceKind::AuditLog => "audit_log",
		}
	}
}

impl fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ResourceKind {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ResourceKind::all()
			.iter()
			.copied()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| ParseError::new("resource", s))
	}
}

/// Actions that can be performed on resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	Create,
	Read,
	Update,
	Delete,
}

impl Action {
	pub fn all() -> &'static [Action] {
		&[Action::Create, Action::Read, Action::Update, Action::Delete]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Action::Create => "create",
			Action::Read => "read",
			Action::Update => "update",
			Action::Delete => "delete",
		}
	}

	/// Returns true for actions that modify state.
	pub fn is_write(&self) -> bool {
		!matches!(self, Action::Read)
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Action {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Action::all()
			.iter()
			.copied()
			.find(|action| action.as_str() == s)
			.ok_or_else(|| ParseError::new("action", s))
	}
}

/// A coarse (resource, action) grant with no target awareness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
	pub resource: ResourceKind,
	pub action: Action,
}

impl Grant {
	pub const fn new(resource: ResourceKind, action: Action) -> Self {
		Self { resource, action }
	}

	/// Conventional permission name, e.g. `employee_salary_read`.
	pub fn name(&self) -> String {
		format!("{}_{}", self.resource, self.action)
	}
}

impl fmt::Display for Grant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.resource, self.action)
	}
}
