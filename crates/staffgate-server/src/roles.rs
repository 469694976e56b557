// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role and permission administration.
//!
//! A role's grants are limited to the standard permission catalog. Changes
//! take effect on the next decision, since every operation builds a fresh
//! capability snapshot. Audit entries wait for queue space like
//! [`crate::users`] entries do.

use serde::{Deserialize, Serialize};
use serde_json::json;
use staffgate_server_audit::{AuditEventType, AuditLogEntry};
use staffgate_server_auth::{
	catalog, Action, Grant, Permission, ResourceAttrs, ResourceKind, Role, RoleId, RoleType,
	SubjectAttrs, UserId,
};

use crate::error::{DirectoryError, Result};
use crate::state::AppState;

/// Input for [`RoleService::create_role`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRole {
	pub name: String,
	pub description: Option<String>,
	pub role_type: RoleType,
	pub grants: Vec<Grant>,
}

/// Partial update for [`RoleService::update_role`]. `grants` replaces the
/// whole permission set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RolePatch {
	pub name: Option<String>,
	pub description: Option<Option<String>>,
	pub role_type: Option<RoleType>,
	pub grants: Option<Vec<Grant>>,
}

#[derive(Clone)]
pub struct RoleService {
	state: AppState,
}

impl RoleService {
	pub fn new(state: AppState) -> Self {
		Self { state }
	}

	#[tracing::instrument(skip(self), fields(user_id = %actor))]
	pub async fn list_roles(&self, actor: UserId) -> Result<Vec<Role>> {
		self.require_collection(actor, Action::Read).await?;
		Ok(self.state.stores.users.list_roles().await?)
	}

	#[tracing::instrument(skip(self), fields(user_id = %actor, role_id = %id))]
	pub async fn get_role(&self, actor: UserId, id: RoleId) -> Result<Role> {
		let subject = self.state.authz.subject(actor).await?;
		self.require_target(&subject, Action::Read, id).await?;
		self.load(id).await
	}

	#[tracing::instrument(skip(self, input), fields(user_id = %actor, name = %input.name))]
	pub async fn create_role(&self, actor: UserId, input: NewRole) -> Result<Role> {
		self.require_collection(actor, Action::Create).await?;

		let grants = checked_grants(input.grants)?;
		let mut role = Role::new(validated_name(&input.name)?, input.role_type).with_grants(grants);
		role.description = input.description;

		self.state.stores.users.create_role(&role).await?;
		tracing::info!(role_id = %role.id, role_type = %role.role_type, "role created");
		self.record(AuditEventType::RoleCreated, actor, &role, "create").await;
		self.load(role.id).await
	}

	#[tracing::instrument(skip(self, patch), fields(user_id = %actor, role_id = %id))]
	pub async fn update_role(&self, actor: UserId, id: RoleId, patch: RolePatch) -> Result<Role> {
		let subject = self.state.authz.subject(actor).await?;
		self.require_target(&subject, Action::Update, id).await?;

		let mut role = self.load(id).await?;
		if let Some(name) = patch.name {
			role.name = validated_name(&name)?;
		}
		if let Some(description) = patch.description {
			role.description = description;
		}
		if let Some(role_type) = patch.role_type {
			role.role_type = role_type;
		}
		if let Some(grants) = patch.grants {
			let grants = checked_grants(grants)?;
			role.permissions.clear();
			role = role.with_grants(grants);
		}

		self.state.stores.users.update_role(&role).await?;
		tracing::info!(role_id = %id, role_type = %role.role_type, "role updated");
		self.record(AuditEventType::RoleUpdated, actor, &role, "update").await;
		self.load(id).await
	}

	/// Deletes a role no user holds.
	#[tracing::instrument(skip(self), fields(user_id = %actor, role_id = %id))]
	pub async fn delete_role(&self, actor: UserId, id: RoleId) -> Result<()> {
		let subject = self.state.authz.subject(actor).await?;
		self.require_target(&subject, Action::Delete, id).await?;

		let role = self.load(id).await?;
		self.state.stores.users.delete_role(id).await?;
		tracing::info!(role_id = %id, "role deleted");
		self.record(AuditEventType::RoleDeleted, actor, &role, "delete").await;
		Ok(())
	}

	/// The permission catalog as stored.
	#[tracing::instrument(skip(self), fields(user_id = %actor))]
	pub async fn list_permissions(&self, actor: UserId) -> Result<Vec<Permission>> {
		self.require_collection(actor, Action::Read).await?;
		Ok(self.state.stores.users.list_permissions().await?)
	}

	async fn require_collection(&self, actor: UserId, action: Action) -> Result<()> {
		let subject = self.state.authz.subject(actor).await?;
		self
			.state
			.authz
			.require(&subject, action, &ResourceAttrs::collection(ResourceKind::Role))
	}

	async fn require_target(&self, subject: &SubjectAttrs, action: Action, id: RoleId) -> Result<()> {
		let resource = self
			.state
			.authz
			.resolve(ResourceKind::Role, Some(id.into_inner()))
			.await?;
		self.state.authz.require(subject, action, &resource)
	}

	async fn load(&self, id: RoleId) -> Result<Role> {
		self
			.state
			.stores
			.users
			.get_role(id)
			.await?
			.ok_or_else(|| DirectoryError::not_found("role", id))
	}

	async fn record(&self, event: AuditEventType, actor: UserId, role: &Role, action: &str) {
		let grants: Vec<String> = role.grants().map(|g| g.name()).collect();
		let entry = AuditLogEntry::builder(event)
			.actor(actor)
			.resource("role", role.id.to_string())
			.action(action)
			.details(json!({
				"name": role.name,
				"role_type": role.role_type.as_str(),
				"grants": grants,
			}))
			.build();
		if let Err(e) = self.state.audit.log_blocking(entry).await {
			tracing::warn!(error = %e, event = %event, "audit entry not recorded");
		}
	}
}

fn validated_name(name: &str) -> Result<String> {
	let name = name.trim();
	if name.is_empty() {
		return Err(DirectoryError::validation("role name must not be empty"));
	}
	Ok(name.to_string())
}

/// Rejects grants outside the standard catalog and drops duplicates.
fn checked_grants(grants: Vec<Grant>) -> Result<Vec<Grant>> {
	let standard = catalog::standard_grants();
	let mut checked: Vec<Grant> = Vec::with_capacity(grants.len());
	for grant in grants {
		if !standard.contains(&grant) {
			return Err(DirectoryError::validation(format!("unknown permission {grant}")));
		}
		if !checked.contains(&grant) {
			checked.push(grant);
		}
	}
	Ok(checked)
}
