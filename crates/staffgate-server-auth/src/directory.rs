// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Directory entities: users, roles, permissions, employees and departments.
//!
//! These are plain data. Relationship queries such as "departments managed by
//! employee X" are answered by the store (by `manager_id`), never kept as a
//! separately maintained collection on [`Employee`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
	Action, DepartmentId, EmployeeId, Grant, PermissionId, ResourceKind, RoleId, RoleType, UserId,
};

/// A login identity.
///
/// Not every user represents staff: `employee_id` is `None` for bare
/// administrative accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub username: String,
	pub email: String,
	pub is_active: bool,
	pub employee_id: Option<EmployeeId>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl User {
	pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			id: UserId::generate(),
			username: username.into(),
			email: email.into(),
			is_active: true,
			employee_id: None,
			created_at: now,
			updated_at: now,
		}
	}

	/// Builder: link this user to an employee record.
	pub fn with_employee(mut self, employee_id: EmployeeId) -> Self {
		self.employee_id = Some(employee_id);
		self
	}
}

/// A named (resource, action) permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
	pub id: PermissionId,
	pub name: String,
	pub description: Option<String>,
	pub resource: ResourceKind,
	pub action: Action,
}

impl Permission {
	/// Creates a permission named after its grant, e.g. `employee_read`.
	pub fn for_grant(grant: Grant) -> Self {
		Self {
			id: PermissionId::generate(),
			name: grant.name(),
			description: None,
			resource: grant.resource,
			action: grant.action,
		}
	}

	pub fn grant(&self) -> Grant {
		Grant::new(self.resource, self.action)
	}
}

/// A role: a name, exactly one archetype and a set of permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
	pub id: RoleId,
	pub name: String,
	pub description: Option<String>,
	pub role_type: RoleType,
	pub permissions: Vec<Permission>,
}

impl Role {
	pub fn new(name: impl Into<String>, role_type: RoleType) -> Self {
		Self {
			id: RoleId::generate(),
			name: name.into(),
			description: None,
			role_type,
			permissions: Vec::new(),
		}
	}

	/// Builder: attach permissions for the given grants.
	pub fn with_grants(mut self, grants: impl IntoIterator<Item = Grant>) -> Self {
		self
			.permissions
			.extend(grants.into_iter().map(Permission::for_grant));
		self
	}

	pub fn grants(&self) -> impl Iterator<Item = Grant> + '_ {
		self.permissions.iter().map(Permission::grant)
	}
}

/// A staff record. Belongs to exactly one department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
	pub id: EmployeeId,
	pub employee_code: String,
	pub full_name: String,
	pub birth_date: NaiveDate,
	pub email: String,
	/// Compensation in whole currency units.
	pub salary: i64,
	pub tax_code: String,
	pub department_id: DepartmentId,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Employee {
	pub fn new(
		employee_code: impl Into<String>,
		full_name: impl Into<String>,
		email: impl Into<String>,
		department_id: DepartmentId,
	) -> Self {
		let now = Utc::now();
		Self {
			id: EmployeeId::generate(),
			employee_code: employee_code.into(),
			full_name: full_name.into(),
			birth_date: NaiveDate::default(),
			email: email.into(),
			salary: 0,
			tax_code: String::new(),
			department_id,
			created_at: now,
			updated_at: now,
		}
	}
}

/// A department. `manager_id`, when set, must name one of its own members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
	pub id: DepartmentId,
	pub name: String,
	pub description: Option<String>,
	pub manager_id: Option<EmployeeId>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Department {
	pub fn new(name: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			id: DepartmentId::generate(),
			name: name.into(),
			description: None,
			manager_id: None,
			created_at: now,
			updated_at: now,
		}
	}
}
