// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Compensation redaction for serialized employee records.
//!
//! Redaction never blocks a read; it only hides `salary` and `tax_code`. The
//! decision is made per row, so one listing may mix redacted and unredacted
//! records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::abac::policies::{salary, Relationship};
use crate::abac::types::SubjectAttrs;
use crate::directory::Employee;
use crate::types::{Action, DepartmentId, EmployeeId};

/// Returns true if `viewer` may see the compensation fields of `target`.
///
/// Evaluates the salary rule table for every role the viewer holds.
#[instrument(
    level = "trace",
    skip(viewer, target),
    fields(user_id = %viewer.user_id, employee_id = %target.id)
)]
pub fn include_salary(viewer: &SubjectAttrs, target: &Employee) -> bool {
	if viewer.is_admin() {
		return true;
	}
	let Some(rel) = Relationship::between(viewer, target.department_id) else {
		return false;
	};
	viewer
		.roles
		.iter()
		.any(|role| salary::can_view_salary(role.role_type, &rel, Action::Read))
}

/// An employee record as returned to a particular viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeView {
	pub id: EmployeeId,
	pub employee_code: String,
	pub full_name: String,
	pub birth_date: NaiveDate,
	pub email: String,
	pub department_id: DepartmentId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub department_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub salary: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tax_code: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl EmployeeView {
	/// Full record including compensation.
	pub fn unredacted(employee: &Employee) -> Self {
		Self {
			id: employee.id,
			employee_code: employee.employee_code.clone(),
			full_name: employee.full_name.clone(),
			birth_date: employee.birth_date,
			email: employee.email.clone(),
			department_id: employee.department_id,
			department_name: None,
			salary: Some(employee.salary),
			tax_code: Some(employee.tax_code.clone()),
			created_at: employee.created_at,
			updated_at: employee.updated_at,
		}
	}

	/// The record as `viewer` is allowed to see it.
	pub fn for_viewer(viewer: &SubjectAttrs, employee: &Employee) -> Self {
		let view = Self::unredacted(employee);
		if include_salary(viewer, employee) {
			view
		} else {
			view.redacted()
		}
	}

	/// Builder: attach the department's display name.
	pub fn with_department_name(mut self, name: impl Into<String>) -> Self {
		self.department_name = Some(name.into());
		self
	}

	pub fn redacted(mut self) -> Self {
		self.salary = None;
		self.tax_code = None;
		self
	}

	pub fn is_redacted(&self) -> bool {
		self.salary.is_none()
	}
}

/// Applies [`EmployeeView::for_viewer`] to every row.
pub fn redact_all<'a>(
	viewer: &SubjectAttrs,
	employees: impl IntoIterator<Item = &'a Employee>,
) -> Vec<EmployeeView> {
	employees
		.into_iter()
		.map(|employee| EmployeeView::for_viewer(viewer, employee))
		.collect()
}
