// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Department repository.
//!
//! Manager assignment is a single conditional `UPDATE` so membership is
//! checked and the manager written atomically. A department update that also
//! changes the manager runs both writes in one transaction.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePool, Row};
use staffgate_server_auth::{Department, DepartmentId, EmployeeId};

use crate::error::{DbError, Result};
use crate::row;

/// Result of [`DepartmentStore::assign_manager_if_member`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerAssignment {
	Assigned,
	/// The candidate exists but belongs to another department.
	NotMember { member_of: DepartmentId },
}

/// Manager change applied together with a department update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagerChange {
	#[default]
	Keep,
	Clear,
	Assign(EmployeeId),
}

/// Headcount and payroll for one department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentStats {
	pub department_id: DepartmentId,
	pub name: String,
	pub manager_id: Option<EmployeeId>,
	pub manager_name: Option<String>,
	pub employee_count: i64,
	pub total_salary: i64,
	pub average_salary: f64,
}

#[async_trait]
pub trait DepartmentStore: Send + Sync {
	async fn get_department(&self, id: DepartmentId) -> Result<Option<Department>>;
	async fn get_department_by_name(&self, name: &str) -> Result<Option<Department>>;
	async fn list_departments(&self) -> Result<Vec<Department>>;
	async fn list_departments_managed_by(&self, employee_id: EmployeeId) -> Result<Vec<Department>>;
	async fn create_department(&self, department: &Department) -> Result<()>;
	async fn update_department(
		&self,
		department: &Department,
		manager: ManagerChange,
	) -> Result<ManagerAssignment>;
	async fn delete_department(&self, id: DepartmentId) -> Result<()>;
	async fn assign_manager_if_member(
		&self,
		department_id: DepartmentId,
		employee_id: EmployeeId,
	) -> Result<ManagerAssignment>;
	async fn clear_manager(&self, department_id: DepartmentId) -> Result<()>;
	async fn count_members(&self, department_id: DepartmentId) -> Result<i64>;
	async fn department_statistics(&self) -> Result<Vec<DepartmentStats>>;
}

#[derive(Clone)]
pub struct DepartmentRepository {
	pool: SqlitePool,
}

impl DepartmentRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self), fields(department_id = %id))]
	pub async fn get_department(&self, id: DepartmentId) -> Result<Option<Department>> {
		let row = sqlx::query(
			r#"
			SELECT id, name, description, manager_id, created_at, updated_at
			FROM departments
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_department(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_department_by_name(&self, name: &str) -> Result<Option<Department>> {
		let row = sqlx::query(
			r#"
			SELECT id, name, description, manager_id, created_at, updated_at
			FROM departments
			WHERE name = ?
			"#,
		)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_department(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_departments(&self) -> Result<Vec<Department>> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, description, manager_id, created_at, updated_at
			FROM departments
			ORDER BY name
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_department).collect()
	}

	/// Departments whose `manager_id` is the given employee.
	#[tracing::instrument(skip(self), fields(employee_id = %employee_id))]
	pub async fn list_departments_managed_by(
		&self,
		employee_id: EmployeeId,
	) -> Result<Vec<Department>> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, description, manager_id, created_at, updated_at
			FROM departments
			WHERE manager_id = ?
			ORDER BY name
			"#,
		)
		.bind(employee_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_department).collect()
	}

	#[tracing::instrument(skip(self, department), fields(department_id = %department.id, name = %department.name))]
	pub async fn create_department(&self, department: &Department) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO departments (id, name, description, manager_id, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(department.id.to_string())
		.bind(&department.name)
		.bind(&department.description)
		.bind(department.manager_id.map(|id| id.to_string()))
		.bind(department.created_at.to_rfc3339())
		.bind(department.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| {
			DbError::unique_or(e, || format!("department '{}' already exists", department.name))
		})?;

		tracing::debug!(department_id = %department.id, "department created");
		Ok(())
	}

	/// Writes name and description, then applies `manager`.
	///
	/// If the manager candidate is not a member of the department nothing is
	/// written and [`ManagerAssignment::NotMember`] is returned.
	#[tracing::instrument(skip(self, department), fields(department_id = %department.id))]
	pub async fn update_department(
		&self,
		department: &Department,
		manager: ManagerChange,
	) -> Result<ManagerAssignment> {
		let mut tx = self.pool.begin().await?;

		let result = sqlx::query(
			r#"
			UPDATE departments
			SET name = ?1, description = ?2, updated_at = ?3
			WHERE id = ?4
			"#,
		)
		.bind(&department.name)
		.bind(&department.description)
		.bind(Utc::now().to_rfc3339())
		.bind(department.id.to_string())
		.execute(&mut *tx)
		.await
		.map_err(|e| {
			DbError::unique_or(e, || format!("department '{}' already exists", department.name))
		})?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("department {}", department.id)));
		}

		match manager {
			ManagerChange::Keep => {}
			ManagerChange::Clear => {
				sqlx::query("UPDATE departments SET manager_id = NULL WHERE id = ?")
					.bind(department.id.to_string())
					.execute(&mut *tx)
					.await?;
			}
			ManagerChange::Assign(employee_id) => {
				let assigned = sqlx::query(
					r#"
					UPDATE departments
					SET manager_id = ?1
					WHERE id = ?2
					  AND EXISTS (SELECT 1 FROM employees WHERE id = ?1 AND department_id = ?2)
					"#,
				)
				.bind(employee_id.to_string())
				.bind(department.id.to_string())
				.execute(&mut *tx)
				.await?;

				if assigned.rows_affected() == 0 {
					let row = sqlx::query("SELECT department_id FROM employees WHERE id = ?")
						.bind(employee_id.to_string())
						.fetch_optional(&mut *tx)
						.await?;
					tx.rollback().await?;
					return match row {
						None => Err(DbError::NotFound(format!("employee {employee_id}"))),
						Some(r) => Ok(ManagerAssignment::NotMember {
							member_of: DepartmentId::new(row::uuid(&r, "department_id")?),
						}),
					};
				}
			}
		}

		tx.commit().await?;
		Ok(ManagerAssignment::Assigned)
	}

	/// Deletes a department that has no members.
	#[tracing::instrument(skip(self), fields(department_id = %id))]
	pub async fn delete_department(&self, id: DepartmentId) -> Result<()> {
		let result = sqlx::query(
			r#"
			DELETE FROM departments
			WHERE id = ?1
			  AND NOT EXISTS (SELECT 1 FROM employees WHERE department_id = ?1)
			"#,
		)
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			if self.get_department(id).await?.is_none() {
				return Err(DbError::NotFound(format!("department {id}")));
			}
			let members = self.count_members(id).await?;
			return Err(DbError::Conflict(format!(
				"department {id} still has {members} employee(s)"
			)));
		}

		tracing::debug!(department_id = %id, "department deleted");
		Ok(())
	}

	/// Sets the manager only if the employee is currently a member.
	#[tracing::instrument(skip(self), fields(department_id = %department_id, employee_id = %employee_id))]
	pub async fn assign_manager_if_member(
		&self,
		department_id: DepartmentId,
		employee_id: EmployeeId,
	) -> Result<ManagerAssignment> {
		let result = sqlx::query(
			r#"
			UPDATE departments
			SET manager_id = ?1, updated_at = ?2
			WHERE id = ?3
			  AND EXISTS (SELECT 1 FROM employees WHERE id = ?1 AND department_id = ?3)
			"#,
		)
		.bind(employee_id.to_string())
		.bind(Utc::now().to_rfc3339())
		.bind(department_id.to_string())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() > 0 {
			return Ok(ManagerAssignment::Assigned);
		}

		if self.get_department(department_id).await?.is_none() {
			return Err(DbError::NotFound(format!("department {department_id}")));
		}

		let row = sqlx::query("SELECT department_id FROM employees WHERE id = ?")
			.bind(employee_id.to_string())
			.fetch_optional(&self.pool)
			.await?;
		match row {
			None => Err(DbError::NotFound(format!("employee {employee_id}"))),
			Some(r) => Ok(ManagerAssignment::NotMember {
				member_of: DepartmentId::new(row::uuid(&r, "department_id")?),
			}),
		}
	}

	#[tracing::instrument(skip(self), fields(department_id = %department_id))]
	pub async fn clear_manager(&self, department_id: DepartmentId) -> Result<()> {
		let result = sqlx::query(
			r#"
			UPDATE departments
			SET manager_id = NULL, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(Utc::now().to_rfc3339())
		.bind(department_id.to_string())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("department {department_id}")));
		}
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(department_id = %department_id))]
	pub async fn count_members(&self, department_id: DepartmentId) -> Result<i64> {
		let row = sqlx::query("SELECT COUNT(*) AS cnt FROM employees WHERE department_id = ?")
			.bind(department_id.to_string())
			.fetch_one(&self.pool)
			.await?;
		Ok(row.get("cnt"))
	}

	#[tracing::instrument(skip(self))]
	pub async fn department_statistics(&self) -> Result<Vec<DepartmentStats>> {
		let rows = sqlx::query(
			r#"
			SELECT d.id, d.name, d.manager_id, m.full_name AS manager_name,
			       COUNT(e.id) AS employee_count,
			       COALESCE(SUM(e.salary), 0) AS total_salary
			FROM departments d
			LEFT JOIN employees e ON e.department_id = d.id
			LEFT JOIN employees m ON m.id = d.manager_id
			GROUP BY d.id
			ORDER BY d.name
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows
			.iter()
			.map(|r| {
				let employee_count: i64 = r.get("employee_count");
				let total_salary: i64 = r.get("total_salary");
				let average_salary = if employee_count > 0 {
					total_salary as f64 / employee_count as f64
				} else {
					0.0
				};
				Ok(DepartmentStats {
					department_id: DepartmentId::new(row::uuid(r, "id")?),
					name: r.get("name"),
					manager_id: row::opt_uuid(r, "manager_id")?.map(EmployeeId::new),
					manager_name: r.get("manager_name"),
					employee_count,
					total_salary,
					average_salary,
				})
			})
			.collect()
	}
}

fn row_to_department(r: &sqlx::sqlite::SqliteRow) -> Result<Department> {
	Ok(Department {
		id: DepartmentId::new(row::uuid(r, "id")?),
		name: r.get("name"),
		description: r.get("description"),
		manager_id: row::opt_uuid(r, "manager_id")?.map(EmployeeId::new),
		created_at: row::timestamp(r, "created_at")?,
		updated_at: row::timestamp(r, "updated_at")?,
	})
}

#[async_trait]
impl DepartmentStore for DepartmentRepository {
	async fn get_department(&self, id: DepartmentId) -> Result<Option<Department>> {
		self.get_department(id).await
	}

	async fn get_department_by_name(&self, name: &str) -> Result<Option<Department>> {
		self.get_department_by_name(name).await
	}

	async fn list_departments(&self) -> Result<Vec<Department>> {
		self.list_departments().await
	}

	async fn list_departments_managed_by(&self, employee_id: EmployeeId) -> Result<Vec<Department>> {
		self.list_departments_managed_by(employee_id).await
	}

	async fn create_department(&self, department: &Department) -> Result<()> {
		self.create_department(department).await
	}

	async fn update_department(
		&self,
		department: &Department,
		manager: ManagerChange,
	) -> Result<ManagerAssignment> {
		self.update_department(department, manager).await
	}

	async fn delete_department(&self, id: DepartmentId) -> Result<()> {
		self.delete_department(id).await
	}

	async fn assign_manager_if_member(
		&self,
		department_id: DepartmentId,
		employee_id: EmployeeId,
	) -> Result<ManagerAssignment> {
		self.assign_manager_if_member(department_id, employee_id).await
	}

	async fn clear_manager(&self, department_id: DepartmentId) -> Result<()> {
		self.clear_manager(department_id).await
	}

	async fn count_members(&self, department_id: DepartmentId) -> Result<i64> {
		self.count_members(department_id).await
	}

	async fn department_statistics(&self) -> Result<Vec<DepartmentStats>> {
		self.department_statistics().await
	}
}
