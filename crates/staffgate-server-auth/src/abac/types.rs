// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type definitions for ABAC policy evaluation.
//!
//! - [`SubjectAttrs`]: The capability snapshot of the acting user (role
//!   archetypes with their grants, own department, managed departments)
//! - [`ResourceAttrs`]: The resource kind and, optionally, the target record
//! - [`DepartmentUnits`]: Which department names denote HR and Accounting
//!
//! # Design Principles
//!
//! 1. **Immutable evaluation**: All attributes are computed once per decision
//! 2. **No database access**: Policy functions are pure; all data is pre-loaded
//! 3. **Explicit attributes**: Every relevant fact is an explicit field

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::{Department, Employee, Role, User};
use crate::types::{Action, DepartmentId, EmployeeId, Grant, ResourceKind, RoleId, RoleType, UserId};

/// Functional classification of a department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentUnit {
	HumanResources,
	Accounting,
	Other,
}

/// Maps department names onto [`DepartmentUnit`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentUnits {
	pub hr: String,
	pub accounting: String,
}

impl Default for DepartmentUnits {
	fn default() -> Self {
		Self {
			hr: "HR".to_string(),
			accounting: "Accounting".to_string(),
		}
	}
}

impl DepartmentUnits {
	pub fn new(hr: impl Into<String>, accounting: impl Into<String>) -> Self {
		Self {
			hr: hr.into(),
			accounting: accounting.into(),
		}
	}

	/// Names are matched exactly.
	pub fn classify(&self, department_name: &str) -> DepartmentUnit {
		if department_name == self.hr {
			DepartmentUnit::HumanResources
		} else if department_name == self.accounting {
			DepartmentUnit::Accounting
		} else {
			DepartmentUnit::Other
		}
	}
}

/// One role held by the subject: its archetype and coarse grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAttr {
	pub role_id: RoleId,
	pub role_type: RoleType,
	pub grants: Vec<Grant>,
}

impl RoleAttr {
	pub fn from_role(role: &Role) -> Self {
		Self {
			role_id: role.id,
			role_type: role.role_type,
			grants: role.grants().collect(),
		}
	}

	pub fn has_grant(&self, resource: ResourceKind, action: Action) -> bool {
		self.grants.contains(&Grant::new(resource, action))
	}
}

/// The subject's own employee profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeAttr {
	pub employee_id: EmployeeId,
	pub department_id: DepartmentId,
	pub unit: DepartmentUnit,
}

/// Capability snapshot of the user requesting access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAttrs {
	pub user_id: UserId,
	pub roles: Vec<RoleAttr>,
	pub employee: Option<EmployeeAttr>,
	pub managed_departments: Vec<DepartmentId>,
}

impl SubjectAttrs {
	/// Creates a subject with no roles and no employee profile.
	pub fn new(user_id: UserId) -> Self {
		Self {
			user_id,
			roles: Vec::new(),
			employee: None,
			managed_departments: Vec::new(),
		}
	}

	/// Builds the snapshot from directory records fetched for one decision.
	///
	/// An inactive user carries no roles. Roles are de-duplicated by ID.
	pub fn from_directory(
		user: &User,
		roles: &[Role],
		profile: Option<(&Employee, &Department)>,
		managed: &[Department],
		units: &DepartmentUnits,
	) -> Self {
		let mut subject = Self::new(user.id);

		if user.is_active {
			for role in roles {
				if !subject.roles.iter().any(|r| r.role_id == role.id) {
					subject.roles.push(RoleAttr::from_role(role));
				}
			}
		}

		if let Some((employee, department)) = profile {
			subject.employee = Some(EmployeeAttr {
				employee_id: employee.id,
				department_id: employee.department_id,
				unit: units.classify(&department.name),
			});
			subject.managed_departments = managed.iter().map(|d| d.id).collect();
		}

		subject
	}

	/// Builder: add a role with the given archetype and grants.
	pub fn with_role(mut self, role_type: RoleType, grants: impl IntoIterator<Item = Grant>) -> Self {
		self.roles.push(RoleAttr {
			role_id: RoleId::generate(),
			role_type,
			grants: grants.into_iter().collect(),
		});
		self
	}

	/// Builder: set the employee profile.
	pub fn with_employee(
		mut self,
		employee_id: EmployeeId,
		department_id: DepartmentId,
		unit: DepartmentUnit,
	) -> Self {
		self.employee = Some(EmployeeAttr {
			employee_id,
			department_id,
			unit,
		});
		self
	}

	/// Builder: record a managed department.
	pub fn managing(mut self, department_id: DepartmentId) -> Self {
		self.managed_departments.push(department_id);
		self
	}

	/// Returns true if the subject holds a role of the given archetype.
	pub fn has_role_type(&self, role_type: RoleType) -> bool {
		self.roles.iter().any(|r| r.role_type == role_type)
	}

	/// Returns true if the subject is an administrator.
	pub fn is_admin(&self) -> bool {
		self.has_role_type(RoleType::Admin)
	}

	/// Archetypes of the roles that carry the (resource, action) grant.
	pub fn roles_granting(
		&self,
		resource: ResourceKind,
		action: Action,
	) -> impl Iterator<Item = RoleType> + '_ {
		self
			.roles
			.iter()
			.filter(move |r| r.has_grant(resource, action))
			.map(|r| r.role_type)
	}

	/// Returns true if the subject manages the given department.
	pub fn manages(&self, department_id: DepartmentId) -> bool {
		self.managed_departments.contains(&department_id)
	}
}

/// The record an action is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
	Employee {
		employee_id: EmployeeId,
		department_id: DepartmentId,
	},
	Department {
		department_id: DepartmentId,
	},
	/// Any other record; no relationship attributes apply.
	Record { id: Uuid },
}

impl Target {
	/// The department whose relationship to the subject decides access.
	pub fn department_id(&self) -> Option<DepartmentId> {
		match self {
			Target::Employee { department_id, .. } | Target::Department { department_id } => {
				Some(*department_id)
			}
			Target::Record { .. } => None,
		}
	}
}

/// Attributes describing the resource being accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAttrs {
	pub kind: ResourceKind,
	pub target: Option<Target>,
}

impl ResourceAttrs {
	/// A list-level or creation-level resource with no target.
	pub fn collection(kind: ResourceKind) -> Self {
		Self { kind, target: None }
	}

	/// The identity fields of an employee record.
	pub fn employee(employee: &Employee) -> Self {
		Self {
			kind: ResourceKind::Employee,
			target: Some(Target::Employee {
				employee_id: employee.id,
				department_id: employee.department_id,
			}),
		}
	}

	/// The compensation fields of an employee record.
	pub fn employee_salary(employee: &Employee) -> Self {
		Self {
			kind: ResourceKind::EmployeeSalary,
			target: Some(Target::Employee {
				employee_id: employee.id,
				department_id: employee.department_id,
			}),
		}
	}

	pub fn department(department_id: DepartmentId) -> Self {
		Self {
			kind: ResourceKind::Department,
			target: Some(Target::Department { department_id }),
		}
	}

	pub fn record(kind: ResourceKind, id: Uuid) -> Self {
		Self {
			kind,
			target: Some(Target::Record { id }),
		}
	}
}
