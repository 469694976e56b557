// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Actor-aware department operations.
//!
//! Every path that sets a manager runs [`validate_manager_assignment`] first
//! and then lets the store re-check membership in the same statement that
//! writes `manager_id`.

use serde::{Deserialize, Serialize};
use serde_json::json;
use staffgate_server_audit::{AuditEventType, AuditLogEntry};
use staffgate_server_auth::{
	is_allowed, redact_all, validate_manager_assignment, Action, Department, DepartmentId, EmployeeId,
	EmployeeView, InvalidAssignment, ResourceAttrs, ResourceKind, UserId,
};
use staffgate_server_db::{DepartmentStats, EmployeeFilter, ManagerAssignment, ManagerChange};

use crate::error::{DirectoryError, Result};
use crate::state::AppState;

/// Input for [`DepartmentService::create_department`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDepartment {
	pub name: String,
	pub description: Option<String>,
	pub manager_id: Option<EmployeeId>,
}

/// Partial update for [`DepartmentService::update_department`].
///
/// `manager_id: Some(None)` clears the manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentPatch {
	pub name: Option<String>,
	pub description: Option<Option<String>>,
	pub manager_id: Option<Option<EmployeeId>>,
}

#[derive(Clone)]
pub struct DepartmentService {
	state: AppState,
}

impl DepartmentService {
	pub fn new(state: AppState) -> Self {
		Self { state }
	}

	/// Every department the actor may read.
	#[tracing::instrument(skip(self), fields(user_id = %actor))]
	pub async fn list_departments(&self, actor: UserId) -> Result<Vec<Department>> {
		let subject = self.state.authz.subject(actor).await?;
		self.state.authz.require(
			&subject,
			Action::Read,
			&ResourceAttrs::collection(ResourceKind::Department),
		)?;

		let departments = self.state.stores.departments.list_departments().await?;
		Ok(departments
			.into_iter()
			.filter(|d| is_allowed(&subject, Action::Read, &ResourceAttrs::department(d.id)))
			.collect())
	}

	#[tracing::instrument(skip(self), fields(user_id = %actor, department_id = %id))]
	pub async fn get_department(&self, actor: UserId, id: DepartmentId) -> Result<Department> {
		let subject = self.state.authz.subject(actor).await?;
		let department = self.load(id).await?;
		self
			.state
			.authz
			.require(&subject, Action::Read, &ResourceAttrs::department(id))?;
		Ok(department)
	}

	/// Members of a department the actor may read, redacted per row.
	#[tracing::instrument(skip(self), fields(user_id = %actor, department_id = %id))]
	pub async fn list_department_employees(
		&self,
		actor: UserId,
		id: DepartmentId,
	) -> Result<Vec<EmployeeView>> {
		let subject = self.state.authz.subject(actor).await?;
		let department = self.load(id).await?;
		self
			.state
			.authz
			.require(&subject, Action::Read, &ResourceAttrs::department(id))?;

		let members = self
			.state
			.stores
			.employees
			.list_employees(&EmployeeFilter::in_department(id))
			.await?;
		Ok(redact_all(&subject, &members)
			.into_iter()
			.map(|v| v.with_department_name(department.name.as_str()))
			.collect())
	}

	/// A new department has no members, so a requested manager is always rejected.
	#[tracing::instrument(skip(self, input), fields(user_id = %actor, name = %input.name))]
	pub async fn create_department(&self, actor: UserId, input: NewDepartment) -> Result<Department> {
		let subject = self.state.authz.subject(actor).await?;
		self.state.authz.require(
			&subject,
			Action::Create,
			&ResourceAttrs::collection(ResourceKind::Department),
		)?;

		let mut department = Department::new(validated_name(&input.name)?);
		department.description = input.description;

		if let Some(candidate) = input.manager_id {
			let employee = self.state.authz.load_employee(candidate).await?;
			if let Err(e) = validate_manager_assignment(&department, Some(&employee)) {
				return Err(self.rejected(actor, e));
			}
		}

		self.state.stores.departments.create_department(&department).await?;
		tracing::info!(department_id = %department.id, "department created");
		self.record(AuditEventType::DepartmentCreated, actor, department.id, "create", json!({
			"name": department.name,
		}));
		Ok(department)
	}

	/// Applies the patch in one store transaction. A rejected manager leaves
	/// the department unchanged.
	#[tracing::instrument(skip(self, patch), fields(user_id = %actor, department_id = %id))]
	pub async fn update_department(
		&self,
		actor: UserId,
		id: DepartmentId,
		patch: DepartmentPatch,
	) -> Result<Department> {
		let subject = self.state.authz.subject(actor).await?;
		let mut department = self.load(id).await?;
		self
			.state
			.authz
			.require(&subject, Action::Update, &ResourceAttrs::department(id))?;

		let previous = department.clone();
		let fields_changed = patch.name.is_some() || patch.description.is_some();
		if let Some(name) = patch.name {
			department.name = validated_name(&name)?;
		}
		if let Some(description) = patch.description {
			department.description = description;
		}

		let change = match patch.manager_id {
			None => ManagerChange::Keep,
			Some(None) => ManagerChange::Clear,
			Some(Some(candidate)) => {
				let employee = self.state.authz.load_employee(candidate).await?;
				if let Err(e) = validate_manager_assignment(&department, Some(&employee)) {
					return Err(self.rejected(actor, e));
				}
				ManagerChange::Assign(candidate)
			}
		};

		let outcome = self
			.state
			.stores
			.departments
			.update_department(&department, change)
			.await?;
		// Membership changed between the check and the write.
		if let (ManagerChange::Assign(candidate), ManagerAssignment::NotMember { member_of }) =
			(change, outcome)
		{
			return Err(self.rejected(
				actor,
				InvalidAssignment {
					department_id: id,
					employee_id: candidate,
					member_of,
				},
			));
		}

		if fields_changed {
			self.record(AuditEventType::DepartmentUpdated, actor, id, "update", json!({
				"name": department.name,
				"previous_name": previous.name,
			}));
		}
		self.manager_changed(actor, &previous, change);

		tracing::info!(department_id = %id, "department updated");
		self.load(id).await
	}

	/// Deletes an empty department.
	#[tracing::instrument(skip(self), fields(user_id = %actor, department_id = %id))]
	pub async fn delete_department(&self, actor: UserId, id: DepartmentId) -> Result<()> {
		let subject = self.state.authz.subject(actor).await?;
		let department = self.load(id).await?;
		self
			.state
			.authz
			.require(&subject, Action::Delete, &ResourceAttrs::department(id))?;

		self.state.stores.departments.delete_department(id).await?;
		tracing::info!(department_id = %id, "department deleted");
		self.record(AuditEventType::DepartmentDeleted, actor, id, "delete", json!({
			"name": department.name,
		}));
		Ok(())
	}

	/// Sets or clears the manager.
	#[tracing::instrument(skip(self), fields(user_id = %actor, department_id = %id))]
	pub async fn assign_manager(
		&self,
		actor: UserId,
		id: DepartmentId,
		manager_id: Option<EmployeeId>,
	) -> Result<Department> {
		let subject = self.state.authz.subject(actor).await?;
		let department = self.load(id).await?;
		self
			.state
			.authz
			.require(&subject, Action::Update, &ResourceAttrs::department(id))?;

		self.set_manager(actor, &department, manager_id).await?;
		self.load(id).await
	}

	/// Headcount and payroll per department. Administrators only.
	#[tracing::instrument(skip(self), fields(user_id = %actor))]
	pub async fn department_statistics(&self, actor: UserId) -> Result<Vec<DepartmentStats>> {
		let subject = self.state.authz.subject(actor).await?;
		self
			.state
			.authz
			.require_admin(&subject, ResourceKind::Department)?;
		Ok(self.state.stores.departments.department_statistics().await?)
	}

	async fn set_manager(
		&self,
		actor: UserId,
		department: &Department,
		manager_id: Option<EmployeeId>,
	) -> Result<()> {
		let Some(candidate) = manager_id else {
			self.state.stores.departments.clear_manager(department.id).await?;
			self.manager_changed(actor, department, ManagerChange::Clear);
			return Ok(());
		};

		let employee = self.state.authz.load_employee(candidate).await?;
		if let Err(e) = validate_manager_assignment(department, Some(&employee)) {
			return Err(self.rejected(actor, e));
		}

		match self
			.state
			.stores
			.departments
			.assign_manager_if_member(department.id, candidate)
			.await?
		{
			ManagerAssignment::Assigned => {
				self.manager_changed(actor, department, ManagerChange::Assign(candidate));
				Ok(())
			}
			// Membership changed between the check and the write.
			ManagerAssignment::NotMember { member_of } => Err(self.rejected(
				actor,
				InvalidAssignment {
					department_id: department.id,
					employee_id: candidate,
					member_of,
				},
			)),
		}
	}

	/// Logs and audits an applied manager change. `previous` is the department
	/// as it was before the change.
	fn manager_changed(&self, actor: UserId, previous: &Department, change: ManagerChange) {
		match change {
			ManagerChange::Keep => {}
			ManagerChange::Clear => {
				tracing::info!(department_id = %previous.id, "manager cleared");
				self.record(
					AuditEventType::ManagerCleared,
					actor,
					previous.id,
					"update",
					json!({ "previous_manager_id": previous.manager_id }),
				);
			}
			ManagerChange::Assign(candidate) => {
				tracing::info!(department_id = %previous.id, employee_id = %candidate, "manager assigned");
				self.record(
					AuditEventType::ManagerAssigned,
					actor,
					previous.id,
					"update",
					json!({
						"employee_id": candidate,
						"previous_manager_id": previous.manager_id,
					}),
				);
			}
		}
	}

	fn rejected(&self, actor: UserId, e: InvalidAssignment) -> DirectoryError {
		tracing::info!(
			department_id = %e.department_id,
			employee_id = %e.employee_id,
			member_of = %e.member_of,
			"manager assignment rejected"
		);
		self.record(
			AuditEventType::ManagerAssignmentRejected,
			actor,
			e.department_id,
			"update",
			json!({ "employee_id": e.employee_id, "member_of": e.member_of }),
		);
		DirectoryError::InvalidAssignment(e)
	}

	async fn load(&self, id: DepartmentId) -> Result<Department> {
		self
			.state
			.stores
			.departments
			.get_department(id)
			.await?
			.ok_or_else(|| DirectoryError::not_found("department", id))
	}

	fn record(
		&self,
		event: AuditEventType,
		actor: UserId,
		department_id: DepartmentId,
		action: &str,
		details: serde_json::Value,
	) {
		self.state.audit.log(
			AuditLogEntry::builder(event)
				.actor(actor)
				.resource("department", department_id.to_string())
				.action(action)
				.details(details)
				.build(),
		);
	}
}

fn validated_name(name: &str) -> Result<String> {
	let name = name.trim();
	if name.is_empty() {
		return Err(DirectoryError::validation("department name must not be empty"));
	}
	Ok(name.to_string())
}
