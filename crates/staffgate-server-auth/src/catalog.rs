// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The seeded role catalog.
//!
//! One role per archetype with its standard coarse grants. No role other than
//! Admin carries a department write grant, which is how department
//! administration stays Admin-only without a scoping rule of its own.

use crate::directory::{Permission, Role};
use crate::types::{Action, Grant, ResourceKind, RoleType};

const EMPLOYEE_GRANTS: &[Grant] = &[
	Grant::new(ResourceKind::Employee, Action::Read),
	Grant::new(ResourceKind::Department, Action::Read),
];

const MANAGER_GRANTS: &[Grant] = &[
	Grant::new(ResourceKind::Employee, Action::Read),
	Grant::new(ResourceKind::EmployeeSalary, Action::Read),
	Grant::new(ResourceKind::Department, Action::Read),
];

// Salary read is narrowed to other departments by the salary rules.
const HR_STAFF_GRANTS: &[Grant] = &[
	Grant::new(ResourceKind::Employee, Action::Read),
	Grant::new(ResourceKind::Employee, Action::Update),
	Grant::new(ResourceKind::Employee, Action::Create),
	Grant::new(ResourceKind::Employee, Action::Delete),
	Grant::new(ResourceKind::EmployeeSalary, Action::Read),
	Grant::new(ResourceKind::Department, Action::Read),
];

const HR_MANAGER_GRANTS: &[Grant] = &[
	Grant::new(ResourceKind::Employee, Action::Read),
	Grant::new(ResourceKind::Employee, Action::Update),
	Grant::new(ResourceKind::Employee, Action::Create),
	Grant::new(ResourceKind::Employee, Action::Delete),
	Grant::new(ResourceKind::EmployeeSalary, Action::Read),
	Grant::new(ResourceKind::Department, Action::Read),
	Grant::new(ResourceKind::User, Action::Read),
	Grant::new(ResourceKind::User, Action::Update),
];

const ACCOUNTING_GRANTS: &[Grant] = &[
	Grant::new(ResourceKind::Employee, Action::Read),
	Grant::new(ResourceKind::EmployeeSalary, Action::Read),
	Grant::new(ResourceKind::Department, Action::Read),
];

/// Every permission the catalog defines: CRUD on user, role, employee and
/// department, plus read on employee_salary.
pub fn standard_grants() -> Vec<Grant> {
	let mut grants = Vec::new();
	for resource in [
		ResourceKind::User,
		ResourceKind::Role,
		ResourceKind::Employee,
		ResourceKind::Department,
	] {
		for action in Action::all() {
			grants.push(Grant::new(resource, *action));
		}
	}
	grants.push(Grant::new(ResourceKind::EmployeeSalary, Action::Read));
	grants
}

/// The standard grants for a role archetype.
pub fn grants_for(role_type: RoleType) -> Vec<Grant> {
	match role_type {
		RoleType::Admin => standard_grants(),
		RoleType::Employee => EMPLOYEE_GRANTS.to_vec(),
		RoleType::Manager => MANAGER_GRANTS.to_vec(),
		RoleType::HrStaff => HR_STAFF_GRANTS.to_vec(),
		RoleType::HrManager => HR_MANAGER_GRANTS.to_vec(),
		RoleType::Accounting => ACCOUNTING_GRANTS.to_vec(),
	}
}

/// Display name and description of the seeded role for an archetype.
pub fn role_name(role_type: RoleType) -> (&'static str, &'static str) {
	match role_type {
		RoleType::Admin => ("Admin", "System administrator"),
		RoleType::Employee => ("Employee", "Rank-and-file employee"),
		RoleType::Manager => ("Manager", "Department manager"),
		RoleType::HrStaff => ("HR Staff", "Human resources staff"),
		RoleType::HrManager => ("HR Manager", "Head of human resources"),
		RoleType::Accounting => ("Accounting", "Accounting staff"),
	}
}

/// Builds the permissions of the catalog, one per standard grant.
pub fn seeded_permissions() -> Vec<Permission> {
	standard_grants()
		.into_iter()
		.map(Permission::for_grant)
		.collect()
}

/// Builds one role per archetype with fresh IDs.
pub fn seeded_roles() -> Vec<Role> {
	RoleType::all()
		.iter()
		.map(|role_type| {
			let (name, description) = role_name(*role_type);
			let mut role = Role::new(name, *role_type).with_grants(grants_for(*role_type));
			role.description = Some(description.to_string());
			role
		})
		.collect()
}
