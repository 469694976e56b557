// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User account administration.
//!
//! Listing accounts is a collection-level read. Every operation on one
//! account targets a user record, which carries no relationship scope, so
//! only administrators pass those checks.
//!
//! Administration entries wait for audit queue space instead of being
//! dropped when the queue is full.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use staffgate_server_audit::{AuditEventType, AuditLogEntry};
use staffgate_server_auth::{
	Action, EmployeeId, ResourceAttrs, ResourceKind, Role, RoleId, SubjectAttrs, User, UserId,
};

use crate::error::{DirectoryError, Result};
use crate::state::AppState;

/// Input for [`UserService::create_user`]. New accounts are active.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
	pub username: String,
	pub email: String,
	pub employee_id: Option<EmployeeId>,
}

/// Partial update for [`UserService::update_user`].
///
/// `employee_id: Some(None)` unlinks the employee record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
	pub username: Option<String>,
	pub email: Option<String>,
	pub is_active: Option<bool>,
	pub employee_id: Option<Option<EmployeeId>>,
}

#[derive(Clone)]
pub struct UserService {
	state: AppState,
}

impl UserService {
	pub fn new(state: AppState) -> Self {
		Self { state }
	}

	#[tracing::instrument(skip(self), fields(user_id = %actor))]
	pub async fn list_users(&self, actor: UserId) -> Result<Vec<User>> {
		let subject = self.state.authz.subject(actor).await?;
		self
			.state
			.authz
			.require(&subject, Action::Read, &ResourceAttrs::collection(ResourceKind::User))?;
		Ok(self.state.stores.users.list_users().await?)
	}

	#[tracing::instrument(skip(self), fields(user_id = %actor, target = %id))]
	pub async fn get_user(&self, actor: UserId, id: UserId) -> Result<User> {
		let subject = self.state.authz.subject(actor).await?;
		self.require_target(&subject, Action::Read, id).await?;
		self.load(id).await
	}

	#[tracing::instrument(skip(self, input), fields(user_id = %actor, username = %input.username))]
	pub async fn create_user(&self, actor: UserId, input: NewUser) -> Result<User> {
		let subject = self.state.authz.subject(actor).await?;
		self
			.state
			.authz
			.require(&subject, Action::Create, &ResourceAttrs::collection(ResourceKind::User))?;

		let mut user = User::new(input.username.trim(), input.email.trim());
		user.employee_id = input.employee_id;
		validate(&user)?;
		if let Some(employee_id) = user.employee_id {
			self.state.authz.load_employee(employee_id).await?;
		}

		self.state.stores.users.create_user(&user).await?;
		tracing::info!(target_user = %user.id, "user created");
		let details = json!({
			"username": user.username,
			"employee_id": user.employee_id,
		});
		self.record(AuditEventType::UserCreated, actor, user.id, "create", details).await;
		Ok(user)
	}

	#[tracing::instrument(skip(self, patch), fields(user_id = %actor, target = %id))]
	pub async fn update_user(&self, actor: UserId, id: UserId, patch: UserPatch) -> Result<User> {
		let subject = self.state.authz.subject(actor).await?;
		self.require_target(&subject, Action::Update, id).await?;

		let mut user = self.load(id).await?;
		if let Some(username) = patch.username {
			user.username = username.trim().to_string();
		}
		if let Some(email) = patch.email {
			user.email = email.trim().to_string();
		}
		if let Some(is_active) = patch.is_active {
			user.is_active = is_active;
		}
		if let Some(employee_id) = patch.employee_id {
			if let Some(employee_id) = employee_id {
				self.state.authz.load_employee(employee_id).await?;
			}
			user.employee_id = employee_id;
		}
		validate(&user)?;
		user.updated_at = Utc::now();

		self.state.stores.users.update_user(&user).await?;
		tracing::info!(target_user = %id, is_active = user.is_active, "user updated");
		let details = json!({
			"username": user.username,
			"is_active": user.is_active,
			"employee_id": user.employee_id,
		});
		self.record(AuditEventType::UserUpdated, actor, id, "update", details).await;
		self.load(id).await
	}

	/// Deletes the account and its role assignments. The linked employee
	/// record is kept.
	#[tracing::instrument(skip(self), fields(user_id = %actor, target = %id))]
	pub async fn delete_user(&self, actor: UserId, id: UserId) -> Result<()> {
		let subject = self.state.authz.subject(actor).await?;
		self.require_target(&subject, Action::Delete, id).await?;

		let user = self.load(id).await?;
		self.state.stores.users.delete_user(id).await?;
		tracing::info!(target_user = %id, "user deleted");
		let details = json!({
			"username": user.username,
		});
		self.record(AuditEventType::UserDeleted, actor, id, "delete", details).await;
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %actor, target = %id))]
	pub async fn list_user_roles(&self, actor: UserId, id: UserId) -> Result<Vec<Role>> {
		let subject = self.state.authz.subject(actor).await?;
		self.require_target(&subject, Action::Read, id).await?;
		Ok(self.state.stores.users.list_roles_for_user(id).await?)
	}

	/// Grants a role. Assigning a role the user already holds is a conflict.
	#[tracing::instrument(skip(self), fields(user_id = %actor, target = %id, role_id = %role_id))]
	pub async fn assign_role(&self, actor: UserId, id: UserId, role_id: RoleId) -> Result<()> {
		let subject = self.state.authz.subject(actor).await?;
		self.require_target(&subject, Action::Update, id).await?;
		let role = self.load_role(role_id).await?;

		if !self.state.stores.users.assign_role(id, role_id).await? {
			return Err(DirectoryError::Conflict(format!(
				"user {id} already holds role '{}'",
				role.name
			)));
		}
		tracing::info!(target_user = %id, role = %role.name, "role assigned");
		let details = json!({
			"role_id": role.id,
			"role_name": role.name,
		});
		self.record(AuditEventType::RoleAssigned, actor, id, "update", details).await;
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %actor, target = %id, role_id = %role_id))]
	pub async fn revoke_role(&self, actor: UserId, id: UserId, role_id: RoleId) -> Result<()> {
		let subject = self.state.authz.subject(actor).await?;
		self.require_target(&subject, Action::Update, id).await?;
		let role = self.load_role(role_id).await?;

		if !self.state.stores.users.remove_role(id, role_id).await? {
			return Err(DirectoryError::not_found("role assignment", role_id));
		}
		tracing::info!(target_user = %id, role = %role.name, "role revoked");
		let details = json!({
			"role_id": role.id,
			"role_name": role.name,
		});
		self.record(AuditEventType::RoleRevoked, actor, id, "update", details).await;
		Ok(())
	}

	async fn require_target(&self, subject: &SubjectAttrs, action: Action, id: UserId) -> Result<()> {
		let resource = self
			.state
			.authz
			.resolve(ResourceKind::User, Some(id.into_inner()))
			.await?;
		self.state.authz.require(subject, action, &resource)
	}

	async fn load(&self, id: UserId) -> Result<User> {
		self
			.state
			.stores
			.users
			.get_user(id)
			.await?
			.ok_or_else(|| DirectoryError::not_found("user", id))
	}

	async fn load_role(&self, id: RoleId) -> Result<Role> {
		self
			.state
			.stores
			.users
			.get_role(id)
			.await?
			.ok_or_else(|| DirectoryError::not_found("role", id))
	}

	async fn record(
		&self,
		event: AuditEventType,
		actor: UserId,
		target: UserId,
		action: &str,
		details: serde_json::Value,
	) {
		let entry = AuditLogEntry::builder(event)
			.actor(actor)
			.resource("user", target.to_string())
			.action(action)
			.details(details)
			.build();
		if let Err(e) = self.state.audit.log_blocking(entry).await {
			tracing::warn!(error = %e, event = %event, "audit entry not recorded");
		}
	}
}

fn validate(user: &User) -> Result<()> {
	if user.username.is_empty() {
		return Err(DirectoryError::validation("username must not be empty"));
	}
	if !user.email.contains('@') {
		return Err(DirectoryError::validation("email must contain '@'"));
	}
	Ok(())
}
