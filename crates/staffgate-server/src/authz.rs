// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Store-backed authorization.
//!
//! The [`Authorizer`] loads a [`SubjectAttrs`] snapshot and the target once
//! per decision, hands both to the pure evaluator, then logs and audits the
//! outcome. Missing actors and targets surface as
//! [`DirectoryError::NotFound`] before the evaluator runs.

use std::sync::Arc;

use serde_json::json;
use staffgate_server_audit::{AuditEventType, AuditLogEntry, AuditService};
use staffgate_server_auth::{
	include_salary, is_allowed, Action, DepartmentId, DepartmentUnits, Employee, EmployeeId,
	ResourceAttrs, ResourceKind, RoleId, SubjectAttrs, Target, UserId,
};
use uuid::Uuid;

use crate::error::{DirectoryError, Result};
use crate::state::Stores;

#[derive(Clone)]
pub struct Authorizer {
	stores: Stores,
	units: DepartmentUnits,
	audit: Arc<AuditService>,
}

impl Authorizer {
	pub fn new(stores: Stores, units: DepartmentUnits, audit: Arc<AuditService>) -> Self {
		Self {
			stores,
			units,
			audit,
		}
	}

	pub fn units(&self) -> &DepartmentUnits {
		&self.units
	}

	/// Builds the capability snapshot for `user_id`.
	#[tracing::instrument(level = "debug", skip(self), fields(user_id = %user_id))]
	pub async fn subject(&self, user_id: UserId) -> Result<SubjectAttrs> {
		let user = self
			.stores
			.users
			.get_user(user_id)
			.await?
			.ok_or_else(|| DirectoryError::not_found("user", user_id))?;

		let roles = self.stores.users.list_roles_for_user(user.id).await?;

		let mut profile = None;
		let mut managed = Vec::new();
		if let Some(employee_id) = user.employee_id {
			if let Some(employee) = self.stores.employees.get_employee(employee_id).await? {
				let department = self
					.stores
					.departments
					.get_department(employee.department_id)
					.await?
					.ok_or_else(|| DirectoryError::not_found("department", employee.department_id))?;
				managed = self
					.stores
					.departments
					.list_departments_managed_by(employee.id)
					.await?;
				profile = Some((employee, department));
			}
		}

		Ok(SubjectAttrs::from_directory(
			&user,
			&roles,
			profile.as_ref().map(|(e, d)| (e, d)),
			&managed,
			&self.units,
		))
	}

	/// Resolves a target ID into resource attributes.
	///
	/// Audit log records are not individually addressable and are never looked up.
	pub async fn resolve(&self, kind: ResourceKind, target: Option<Uuid>) -> Result<ResourceAttrs> {
		let Some(id) = target else {
			return Ok(ResourceAttrs::collection(kind));
		};

		match kind {
			ResourceKind::Employee | ResourceKind::EmployeeSalary => {
				let employee = self.load_employee(EmployeeId::new(id)).await?;
				Ok(if kind == ResourceKind::Employee {
					ResourceAttrs::employee(&employee)
				} else {
					ResourceAttrs::employee_salary(&employee)
				})
			}
			ResourceKind::Department => {
				let department_id = DepartmentId::new(id);
				self
					.stores
					.departments
					.get_department(department_id)
					.await?
					.ok_or_else(|| DirectoryError::not_found("department", department_id))?;
				Ok(ResourceAttrs::department(department_id))
			}
			ResourceKind::User => {
				self
					.stores
					.users
					.get_user(UserId::new(id))
					.await?
					.ok_or_else(|| DirectoryError::not_found("user", id))?;
				Ok(ResourceAttrs::record(kind, id))
			}
			ResourceKind::Role => {
				self
					.stores
					.users
					.get_role(RoleId::new(id))
					.await?
					.ok_or_else(|| DirectoryError::not_found("role", id))?;
				Ok(ResourceAttrs::record(kind, id))
			}
			ResourceKind::AuditLog => Ok(ResourceAttrs::record(kind, id)),
		}
	}

	/// Evaluates a decision and records its outcome.
	pub fn decide(&self, subject: &SubjectAttrs, action: Action, resource: &ResourceAttrs) -> bool {
		let allowed = is_allowed(subject, action, resource);

		if allowed {
			tracing::debug!(
				user_id = %subject.user_id,
				action = %action,
				resource = %resource.kind,
				"access granted"
			);
		} else {
			tracing::info!(
				user_id = %subject.user_id,
				action = %action,
				resource = %resource.kind,
				"access denied"
			);
		}

		let event = if allowed {
			AuditEventType::AccessGranted
		} else {
			AuditEventType::AccessDenied
		};
		let mut builder = AuditLogEntry::builder(event)
			.actor(subject.user_id)
			.action(action.as_str())
			.details(decision_details(subject));
		builder = match resource.target.as_ref().map(target_id) {
			Some(id) => builder.resource(resource.kind.as_str(), id),
			None => builder.resource_type(resource.kind.as_str()),
		};
		self.audit.log(builder.build());

		allowed
	}

	/// Like [`Self::decide`], returning [`DirectoryError::Forbidden`] on deny.
	pub fn require(
		&self,
		subject: &SubjectAttrs,
		action: Action,
		resource: &ResourceAttrs,
	) -> Result<()> {
		if self.decide(subject, action, resource) {
			Ok(())
		} else {
			Err(DirectoryError::Forbidden)
		}
	}

	/// Allows administrators only, auditing the outcome against `kind`.
	pub fn require_admin(&self, subject: &SubjectAttrs, kind: ResourceKind) -> Result<()> {
		let allowed = subject.is_admin();
		let event = if allowed {
			AuditEventType::AccessGranted
		} else {
			tracing::info!(user_id = %subject.user_id, resource = %kind, "admin access denied");
			AuditEventType::AccessDenied
		};
		self.audit.log(
			AuditLogEntry::builder(event)
				.actor(subject.user_id)
				.resource_type(kind.as_str())
				.action("admin")
				.build(),
		);
		if allowed {
			Ok(())
		} else {
			Err(DirectoryError::Forbidden)
		}
	}

	/// Loads the actor and target, then decides whether `action` is allowed.
	#[tracing::instrument(skip(self), fields(user_id = %actor, resource = %kind, action = %action))]
	pub async fn authorize(
		&self,
		actor: UserId,
		kind: ResourceKind,
		action: Action,
		target: Option<Uuid>,
	) -> Result<bool> {
		let subject = self.subject(actor).await?;
		let resource = self.resolve(kind, target).await?;
		Ok(self.decide(&subject, action, &resource))
	}

	/// Whether `viewer` may see the compensation fields of `target`.
	#[tracing::instrument(skip(self), fields(user_id = %viewer, employee_id = %target))]
	pub async fn include_salary(&self, viewer: UserId, target: EmployeeId) -> Result<bool> {
		let subject = self.subject(viewer).await?;
		let employee = self.load_employee(target).await?;
		Ok(include_salary(&subject, &employee))
	}

	pub(crate) async fn load_employee(&self, id: EmployeeId) -> Result<Employee> {
		self
			.stores
			.employees
			.get_employee(id)
			.await?
			.ok_or_else(|| DirectoryError::not_found("employee", id))
	}
}

fn target_id(target: &Target) -> String {
	match target {
		Target::Employee { employee_id, .. } => employee_id.to_string(),
		Target::Department { department_id } => department_id.to_string(),
		Target::Record { id } => id.to_string(),
	}
}

fn decision_details(subject: &SubjectAttrs) -> serde_json::Value {
	json!({ "roles": subject.roles.iter().map(|r| r.role_type.as_str()).collect::<Vec<_>>() })
}
