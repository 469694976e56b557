// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Actor-aware employee operations.
//!
//! Every read is authorized per row and every returned record is redacted per
//! row, so one listing can mix full and compensation-free views.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use staffgate_server_audit::{AuditEventType, AuditLogEntry};
use staffgate_server_auth::{
	is_allowed, Action, DepartmentId, Employee, EmployeeId, EmployeeView, ResourceAttrs,
	ResourceKind, SubjectAttrs, UserId,
};
use staffgate_server_db::EmployeeFilter;

use crate::error::{DirectoryError, Result};
use crate::state::AppState;

/// Input for [`EmployeeService::create_employee`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployee {
	pub employee_code: String,
	pub full_name: String,
	pub birth_date: NaiveDate,
	pub email: String,
	pub salary: i64,
	pub tax_code: String,
	pub department_id: DepartmentId,
}

/// Partial update for [`EmployeeService::update_employee`]. Unset fields are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeePatch {
	pub employee_code: Option<String>,
	pub full_name: Option<String>,
	pub birth_date: Option<NaiveDate>,
	pub email: Option<String>,
	pub salary: Option<i64>,
	pub tax_code: Option<String>,
	pub department_id: Option<DepartmentId>,
}

#[derive(Clone)]
pub struct EmployeeService {
	state: AppState,
}

impl EmployeeService {
	pub fn new(state: AppState) -> Self {
		Self { state }
	}

	/// Every employee the actor may read.
	#[tracing::instrument(skip(self), fields(user_id = %actor))]
	pub async fn list_employees(&self, actor: UserId) -> Result<Vec<EmployeeView>> {
		let subject = self.state.authz.subject(actor).await?;
		self
			.state
			.authz
			.require(&subject, Action::Read, &ResourceAttrs::collection(ResourceKind::Employee))?;

		let rows = self
			.state
			.stores
			.employees
			.list_employees(&EmployeeFilter::default())
			.await?;
		self.visible_views(&subject, rows).await
	}

	#[tracing::instrument(skip(self), fields(user_id = %actor, employee_id = %id))]
	pub async fn get_employee(&self, actor: UserId, id: EmployeeId) -> Result<EmployeeView> {
		let subject = self.state.authz.subject(actor).await?;
		let employee = self.state.authz.load_employee(id).await?;
		self
			.state
			.authz
			.require(&subject, Action::Read, &ResourceAttrs::employee(&employee))?;

		let names = self.department_names().await?;
		Ok(view(&subject, &employee, &names))
	}

	/// Case-insensitive search on name, code and email, optionally within one
	/// department the actor may read.
	#[tracing::instrument(skip(self), fields(user_id = %actor))]
	pub async fn search_employees(
		&self,
		actor: UserId,
		query: &str,
		department_id: Option<DepartmentId>,
	) -> Result<Vec<EmployeeView>> {
		let subject = self.state.authz.subject(actor).await?;
		self
			.state
			.authz
			.require(&subject, Action::Read, &ResourceAttrs::collection(ResourceKind::Employee))?;

		if let Some(department_id) = department_id {
			self
				.state
				.stores
				.departments
				.get_department(department_id)
				.await?
				.ok_or_else(|| DirectoryError::not_found("department", department_id))?;
			self
				.state
				.authz
				.require(&subject, Action::Read, &ResourceAttrs::department(department_id))?;
		}

		let filter = EmployeeFilter {
			department_id,
			query: Some(query.to_string()),
		};
		let rows = self.state.stores.employees.list_employees(&filter).await?;
		self.visible_views(&subject, rows).await
	}

	#[tracing::instrument(skip(self, input), fields(user_id = %actor, code = %input.employee_code))]
	pub async fn create_employee(&self, actor: UserId, input: NewEmployee) -> Result<EmployeeView> {
		let subject = self.state.authz.subject(actor).await?;
		self
			.state
			.authz
			.require(&subject, Action::Create, &ResourceAttrs::collection(ResourceKind::Employee))?;

		let department = self
			.state
			.stores
			.departments
			.get_department(input.department_id)
			.await?
			.ok_or_else(|| DirectoryError::not_found("department", input.department_id))?;

		let now = Utc::now();
		let employee = Employee {
			id: EmployeeId::generate(),
			employee_code: input.employee_code.trim().to_string(),
			full_name: input.full_name.trim().to_string(),
			birth_date: input.birth_date,
			email: input.email.trim().to_string(),
			salary: input.salary,
			tax_code: input.tax_code.trim().to_string(),
			department_id: department.id,
			created_at: now,
			updated_at: now,
		};
		validate(&employee)?;

		self.state.stores.employees.create_employee(&employee).await?;
		tracing::info!(employee_id = %employee.id, department = %department.name, "employee created");
		self.record(AuditEventType::EmployeeCreated, actor, &employee, json!({
			"department_id": department.id,
		}));

		Ok(view_in(&subject, &employee, &department.name))
	}

	#[tracing::instrument(skip(self, patch), fields(user_id = %actor, employee_id = %id))]
	pub async fn update_employee(
		&self,
		actor: UserId,
		id: EmployeeId,
		patch: EmployeePatch,
	) -> Result<EmployeeView> {
		let subject = self.state.authz.subject(actor).await?;
		let mut employee = self.state.authz.load_employee(id).await?;
		self
			.state
			.authz
			.require(&subject, Action::Update, &ResourceAttrs::employee(&employee))?;

		let previous_department = employee.department_id;
		apply(&mut employee, patch);
		validate(&employee)?;

		self.state.stores.employees.update_employee(&employee).await?;
		let stored = self.state.authz.load_employee(id).await?;
		tracing::info!(employee_id = %id, "employee updated");
		self.record(AuditEventType::EmployeeUpdated, actor, &stored, json!({
			"previous_department_id": previous_department,
			"department_id": stored.department_id,
		}));

		let names = self.department_names().await?;
		Ok(view(&subject, &stored, &names))
	}

	/// Deletes the employee and clears every department they managed.
	#[tracing::instrument(skip(self), fields(user_id = %actor, employee_id = %id))]
	pub async fn delete_employee(&self, actor: UserId, id: EmployeeId) -> Result<()> {
		let subject = self.state.authz.subject(actor).await?;
		let employee = self.state.authz.load_employee(id).await?;
		self
			.state
			.authz
			.require(&subject, Action::Delete, &ResourceAttrs::employee(&employee))?;

		let cleared = self.state.stores.employees.delete_employee(id).await?;
		tracing::info!(employee_id = %id, cleared_departments = cleared.len(), "employee deleted");
		self.record(AuditEventType::EmployeeDeleted, actor, &employee, json!({
			"cleared_departments": &cleared,
		}));

		for department_id in cleared {
			self.state.audit.log(
				AuditLogEntry::builder(AuditEventType::ManagerCleared)
					.actor(actor)
					.resource("department", department_id.to_string())
					.action("update")
					.details(json!({ "employee_id": id, "reason": "employee_deleted" }))
					.build(),
			);
		}
		Ok(())
	}

	async fn visible_views(
		&self,
		subject: &SubjectAttrs,
		rows: Vec<Employee>,
	) -> Result<Vec<EmployeeView>> {
		let names = self.department_names().await?;
		let views: Vec<EmployeeView> = rows
			.iter()
			.filter(|e| is_allowed(subject, Action::Read, &ResourceAttrs::employee(e)))
			.map(|e| view(subject, e, &names))
			.collect();
		tracing::debug!(total = rows.len(), visible = views.len(), "employee rows filtered");
		Ok(views)
	}

	async fn department_names(&self) -> Result<HashMap<DepartmentId, String>> {
		Ok(self
			.state
			.stores
			.departments
			.list_departments()
			.await?
			.into_iter()
			.map(|d| (d.id, d.name))
			.collect())
	}

	fn record(
		&self,
		event: AuditEventType,
		actor: UserId,
		employee: &Employee,
		details: serde_json::Value,
	) {
		self.state.audit.log(
			AuditLogEntry::builder(event)
				.actor(actor)
				.resource("employee", employee.id.to_string())
				.action(match event {
					AuditEventType::EmployeeCreated => "create",
					AuditEventType::EmployeeDeleted => "delete",
					_ => "update",
				})
				.details(details)
				.build(),
		);
	}
}

fn view(
	subject: &SubjectAttrs,
	employee: &Employee,
	names: &HashMap<DepartmentId, String>,
) -> EmployeeView {
	let view = EmployeeView::for_viewer(subject, employee);
	match names.get(&employee.department_id) {
		Some(name) => view.with_department_name(name.as_str()),
		None => view,
	}
}

fn view_in(subject: &SubjectAttrs, employee: &Employee, department_name: &str) -> EmployeeView {
	EmployeeView::for_viewer(subject, employee).with_department_name(department_name)
}

fn apply(employee: &mut Employee, patch: EmployeePatch) {
	if let Some(code) = patch.employee_code {
		employee.employee_code = code.trim().to_string();
	}
	if let Some(name) = patch.full_name {
		employee.full_name = name.trim().to_string();
	}
	if let Some(birth_date) = patch.birth_date {
		employee.birth_date = birth_date;
	}
	if let Some(email) = patch.email {
		employee.email = email.trim().to_string();
	}
	if let Some(salary) = patch.salary {
		employee.salary = salary;
	}
	if let Some(tax_code) = patch.tax_code {
		employee.tax_code = tax_code.trim().to_string();
	}
	if let Some(department_id) = patch.department_id {
		employee.department_id = department_id;
	}
}

fn validate(employee: &Employee) -> Result<()> {
	for (field, value) in [
		("employee_code", &employee.employee_code),
		("full_name", &employee.full_name),
		("email", &employee.email),
		("tax_code", &employee.tax_code),
	] {
		if value.is_empty() {
			return Err(DirectoryError::validation(format!("{field} must not be empty")));
		}
	}
	if !employee.email.contains('@') {
		return Err(DirectoryError::validation("email must contain '@'"));
	}
	if employee.salary < 0 {
		return Err(DirectoryError::validation("salary must not be negative"));
	}
	Ok(())
}
