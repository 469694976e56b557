// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User, role and permission repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use staffgate_server_auth::{catalog, EmployeeId, Permission, PermissionId, Role, RoleId, User, UserId};

use crate::error::{DbError, Result};
use crate::row;

/// What [`UserStore::seed_catalog`] inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
	pub roles_created: usize,
	pub permissions_created: usize,
}

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn get_user(&self, id: UserId) -> Result<Option<User>>;
	async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
	async fn list_users(&self) -> Result<Vec<User>>;
	async fn create_user(&self, user: &User) -> Result<()>;
	async fn update_user(&self, user: &User) -> Result<()>;
	async fn delete_user(&self, id: UserId) -> Result<()>;
	async fn list_roles_for_user(&self, user_id: UserId) -> Result<Vec<Role>>;
	async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool>;
	async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool>;
	async fn get_role(&self, id: RoleId) -> Result<Option<Role>>;
	async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>>;
	async fn list_roles(&self) -> Result<Vec<Role>>;
	async fn create_role(&self, role: &Role) -> Result<()>;
	async fn update_role(&self, role: &Role) -> Result<()>;
	async fn delete_role(&self, id: RoleId) -> Result<()>;
	async fn list_permissions(&self) -> Result<Vec<Permission>>;
	async fn seed_catalog(&self) -> Result<SeedReport>;
}

#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
		let row = sqlx::query(
			r#"
			SELECT id, username, email, is_active, employee_id, created_at, updated_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
		let row = sqlx::query(
			r#"
			SELECT id, username, email, is_active, employee_id, created_at, updated_at
			FROM users
			WHERE username = ?
			"#,
		)
		.bind(username)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_users(&self) -> Result<Vec<User>> {
		let rows = sqlx::query(
			r#"
			SELECT id, username, email, is_active, employee_id, created_at, updated_at
			FROM users
			ORDER BY username
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_user).collect()
	}

	#[tracing::instrument(skip(self, user), fields(user_id = %user.id, username = %user.username))]
	pub async fn create_user(&self, user: &User) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO users (id, username, email, is_active, employee_id, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(user.id.to_string())
		.bind(&user.username)
		.bind(&user.email)
		.bind(user.is_active)
		.bind(user.employee_id.map(|id| id.to_string()))
		.bind(user.created_at.to_rfc3339())
		.bind(user.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| {
			DbError::constraint_or(
				e,
				|| format!("username, email or employee link already in use ({})", user.username),
				|| "linked employee".to_string(),
			)
		})?;

		tracing::debug!(user_id = %user.id, "user created");
		Ok(())
	}

	/// Writes username, email, active flag and employee link.
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
	pub async fn update_user(&self, user: &User) -> Result<()> {
		let result = sqlx::query(
			r#"
			UPDATE users
			SET username = ?, email = ?, is_active = ?, employee_id = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&user.username)
		.bind(&user.email)
		.bind(user.is_active)
		.bind(user.employee_id.map(|id| id.to_string()))
		.bind(Utc::now().to_rfc3339())
		.bind(user.id.to_string())
		.execute(&self.pool)
		.await
		.map_err(|e| {
			DbError::constraint_or(
				e,
				|| format!("username, email or employee link already in use ({})", user.username),
				|| "linked employee".to_string(),
			)
		})?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("user {}", user.id)));
		}
		Ok(())
	}

	/// Deletes the user together with its role assignments.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn delete_user(&self, id: UserId) -> Result<()> {
		let result = sqlx::query("DELETE FROM users WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("user {id}")));
		}
		tracing::debug!(user_id = %id, "user deleted");
		Ok(())
	}

	/// Roles held by the user, each with its permissions.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn list_roles_for_user(&self, user_id: UserId) -> Result<Vec<Role>> {
		let rows = sqlx::query(
			r#"
			SELECT r.id, r.name, r.description, r.role_type
			FROM roles r
			JOIN user_roles ur ON ur.role_id = r.id
			WHERE ur.user_id = ?
			ORDER BY r.name
			"#,
		)
		.bind(user_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		self.hydrate_roles(&rows).await
	}

	/// Returns whether the role was newly assigned.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, role_id = %role_id))]
	pub async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool> {
		let result = sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)")
			.bind(user_id.to_string())
			.bind(role_id.to_string())
			.execute(&self.pool)
			.await
			.map_err(|e| {
				DbError::constraint_or(e, String::new, || format!("user {user_id} or role {role_id}"))
			})?;
		Ok(result.rows_affected() > 0)
	}

	/// Returns whether the user held the role.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, role_id = %role_id))]
	pub async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool> {
		let result = sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role_id = ?")
			.bind(user_id.to_string())
			.bind(role_id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(skip(self), fields(role_id = %id))]
	pub async fn get_role(&self, id: RoleId) -> Result<Option<Role>> {
		let rows = sqlx::query("SELECT id, name, description, role_type FROM roles WHERE id = ?")
			.bind(id.to_string())
			.fetch_all(&self.pool)
			.await?;

		Ok(self.hydrate_roles(&rows).await?.into_iter().next())
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
		let rows = sqlx::query("SELECT id, name, description, role_type FROM roles WHERE name = ?")
			.bind(name)
			.fetch_all(&self.pool)
			.await?;

		Ok(self.hydrate_roles(&rows).await?.into_iter().next())
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_roles(&self) -> Result<Vec<Role>> {
		let rows = sqlx::query("SELECT id, name, description, role_type FROM roles ORDER BY name")
			.fetch_all(&self.pool)
			.await?;

		self.hydrate_roles(&rows).await
	}

	/// Inserts the role and links its permissions, creating any that are missing.
	#[tracing::instrument(skip(self, role), fields(role_id = %role.id, name = %role.name))]
	pub async fn create_role(&self, role: &Role) -> Result<()> {
		let mut tx = self.pool.begin().await?;

		sqlx::query("INSERT INTO roles (id, name, description, role_type) VALUES (?, ?, ?, ?)")
			.bind(role.id.to_string())
			.bind(&role.name)
			.bind(&role.description)
			.bind(role.role_type.as_str())
			.execute(&mut *tx)
			.await
			.map_err(|e| DbError::unique_or(e, || format!("role '{}' already exists", role.name)))?;

		link_permissions(&mut tx, role).await?;

		tx.commit().await?;
		tracing::debug!(role_id = %role.id, permissions = role.permissions.len(), "role created");
		Ok(())
	}

	/// Writes name, description and archetype, and replaces the role's
	/// permissions with `role.permissions`.
	#[tracing::instrument(skip(self, role), fields(role_id = %role.id, role_type = %role.role_type))]
	pub async fn update_role(&self, role: &Role) -> Result<()> {
		let mut tx = self.pool.begin().await?;

		let result = sqlx::query("UPDATE roles SET name = ?, description = ?, role_type = ? WHERE id = ?")
			.bind(&role.name)
			.bind(&role.description)
			.bind(role.role_type.as_str())
			.bind(role.id.to_string())
			.execute(&mut *tx)
			.await
			.map_err(|e| DbError::unique_or(e, || format!("role '{}' already exists", role.name)))?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("role {}", role.id)));
		}

		sqlx::query("DELETE FROM role_permissions WHERE role_id = ?")
			.bind(role.id.to_string())
			.execute(&mut *tx)
			.await?;
		link_permissions(&mut tx, role).await?;

		tx.commit().await?;
		Ok(())
	}

	/// Deletes a role no user holds.
	#[tracing::instrument(skip(self), fields(role_id = %id))]
	pub async fn delete_role(&self, id: RoleId) -> Result<()> {
		let result = sqlx::query(
			r#"
			DELETE FROM roles
			WHERE id = ?1
			  AND NOT EXISTS (SELECT 1 FROM user_roles WHERE role_id = ?1)
			"#,
		)
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			if self.get_role(id).await?.is_none() {
				return Err(DbError::NotFound(format!("role {id}")));
			}
			return Err(DbError::Conflict(format!("role {id} is still assigned to users")));
		}
		tracing::debug!(role_id = %id, "role deleted");
		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_permissions(&self) -> Result<Vec<Permission>> {
		let rows = sqlx::query(
			"SELECT id, name, description, resource, action FROM permissions ORDER BY name",
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_permission).collect()
	}

	/// Writes the standard permissions and one role per archetype. Existing
	/// rows, matched by name, are left untouched.
	#[tracing::instrument(skip(self))]
	pub async fn seed_catalog(&self) -> Result<SeedReport> {
		let mut report = SeedReport::default();

		let mut tx = self.pool.begin().await?;
		for permission in catalog::seeded_permissions() {
			if insert_permission(&mut tx, &permission).await? {
				report.permissions_created += 1;
			}
		}
		tx.commit().await?;

		for role in catalog::seeded_roles() {
			if self.get_role_by_name(&role.name).await?.is_some() {
				continue;
			}
			self.create_role(&role).await?;
			report.roles_created += 1;
		}

		tracing::info!(
			roles_created = report.roles_created,
			permissions_created = report.permissions_created,
			"role catalog seeded"
		);
		Ok(report)
	}

	async fn hydrate_roles(&self, rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Role>> {
		let mut roles = Vec::with_capacity(rows.len());
		for r in rows {
			let id = RoleId::new(row::uuid(r, "id")?);
			let permissions = self.permissions_for_role(id).await?;
			roles.push(Role {
				id,
				name: r.get("name"),
				description: r.get("description"),
				role_type: row::parsed(r, "role_type")?,
				permissions,
			});
		}
		Ok(roles)
	}

	async fn permissions_for_role(&self, role_id: RoleId) -> Result<Vec<Permission>> {
		let rows = sqlx::query(
			r#"
			SELECT p.id, p.name, p.description, p.resource, p.action
			FROM permissions p
			JOIN role_permissions rp ON rp.permission_id = p.id
			WHERE rp.role_id = ?
			ORDER BY p.name
			"#,
		)
		.bind(role_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_permission).collect()
	}
}

/// Inserts the permission unless its name or (resource, action) already exists.
async fn insert_permission(
	tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
	permission: &Permission,
) -> Result<bool> {
	let result = sqlx::query(
		r#"
		INSERT OR IGNORE INTO permissions (id, name, description, resource, action)
		VALUES (?, ?, ?, ?, ?)
		"#,
	)
	.bind(permission.id.to_string())
	.bind(&permission.name)
	.bind(&permission.description)
	.bind(permission.resource.as_str())
	.bind(permission.action.as_str())
	.execute(&mut **tx)
	.await?;
	Ok(result.rows_affected() > 0)
}

/// Links every permission of `role` by (resource, action), creating any that
/// are missing.
async fn link_permissions(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, role: &Role) -> Result<()> {
	for permission in &role.permissions {
		insert_permission(tx, permission).await?;
		sqlx::query(
			r#"
			INSERT OR IGNORE INTO role_permissions (role_id, permission_id)
			SELECT ?, id FROM permissions WHERE resource = ? AND action = ?
			"#,
		)
		.bind(role.id.to_string())
		.bind(permission.resource.as_str())
		.bind(permission.action.as_str())
		.execute(&mut **tx)
		.await?;
	}
	Ok(())
}

fn row_to_permission(r: &sqlx::sqlite::SqliteRow) -> Result<Permission> {
	Ok(Permission {
		id: PermissionId::new(row::uuid(r, "id")?),
		name: r.get("name"),
		description: r.get("description"),
		resource: row::parsed(r, "resource")?,
		action: row::parsed(r, "action")?,
	})
}

fn row_to_user(r: &sqlx::sqlite::SqliteRow) -> Result<User> {
	Ok(User {
		id: UserId::new(row::uuid(r, "id")?),
		username: r.get("username"),
		email: r.get("email"),
		is_active: r.get("is_active"),
		employee_id: row::opt_uuid(r, "employee_id")?.map(EmployeeId::new),
		created_at: row::timestamp(r, "created_at")?,
		updated_at: row::timestamp(r, "updated_at")?,
	})
}

#[async_trait]
impl UserStore for UserRepository {
	async fn get_user(&self, id: UserId) -> Result<Option<User>> {
		self.get_user(id).await
	}

	async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
		self.get_user_by_username(username).await
	}

	async fn list_users(&self) -> Result<Vec<User>> {
		self.list_users().await
	}

	async fn create_user(&self, user: &User) -> Result<()> {
		self.create_user(user).await
	}

	async fn update_user(&self, user: &User) -> Result<()> {
		self.update_user(user).await
	}

	async fn delete_user(&self, id: UserId) -> Result<()> {
		self.delete_user(id).await
	}

	async fn list_roles_for_user(&self, user_id: UserId) -> Result<Vec<Role>> {
		self.list_roles_for_user(user_id).await
	}

	async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool> {
		self.assign_role(user_id, role_id).await
	}

	async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool> {
		self.remove_role(user_id, role_id).await
	}

	async fn get_role(&self, id: RoleId) -> Result<Option<Role>> {
		self.get_role(id).await
	}

	async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
		self.get_role_by_name(name).await
	}

	async fn list_roles(&self) -> Result<Vec<Role>> {
		self.list_roles().await
	}

	async fn create_role(&self, role: &Role) -> Result<()> {
		self.create_role(role).await
	}

	async fn update_role(&self, role: &Role) -> Result<()> {
		self.update_role(role).await
	}

	async fn delete_role(&self, id: RoleId) -> Result<()> {
		self.delete_role(id).await
	}

	async fn list_permissions(&self) -> Result<Vec<Permission>> {
		self.list_permissions().await
	}

	async fn seed_catalog(&self) -> Result<SeedReport> {
		self.seed_catalog().await
	}
}
