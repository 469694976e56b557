// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Department manager invariant.
//!
//! A department's manager, when set, must be a member of that department.
//! [`validate_manager_assignment`] is the pure check; stores re-check it
//! atomically when they write `manager_id`.

use crate::directory::{Department, Employee};
use crate::types::{DepartmentId, EmployeeId};

/// A manager candidate who is not a member of the department.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("employee {employee_id} belongs to department {member_of}, not {department_id}")]
pub struct InvalidAssignment {
	pub department_id: DepartmentId,
	pub employee_id: EmployeeId,
	pub member_of: DepartmentId,
}

/// Checks that `candidate` may manage `department`.
///
/// Clearing the manager (`None`) is always valid.
pub fn validate_manager_assignment(
	department: &Department,
	candidate: Option<&Employee>,
) -> Result<(), InvalidAssignment> {
	match candidate {
		None => Ok(()),
		Some(employee) if employee.department_id == department.id => Ok(()),
		Some(employee) => Err(InvalidAssignment {
			department_id: department.id,
			employee_id: employee.id,
			member_of: employee.department_id,
		}),
	}
}
