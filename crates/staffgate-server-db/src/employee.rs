// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Employee repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use staffgate_server_auth::{DepartmentId, Employee, EmployeeId};

use crate::error::{DbError, Result};
use crate::row::{self, DATE_FORMAT};

/// Narrows [`EmployeeStore::list_employees`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
	pub department_id: Option<DepartmentId>,
	/// Case-insensitive substring of name, code or email.
	pub query: Option<String>,
}

impl EmployeeFilter {
	pub fn in_department(department_id: DepartmentId) -> Self {
		Self {
			department_id: Some(department_id),
			query: None,
		}
	}

	pub fn matching(query: impl Into<String>) -> Self {
		Self {
			department_id: None,
			query: Some(query.into()),
		}
	}
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
	async fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>>;
	async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>>;
	async fn create_employee(&self, employee: &Employee) -> Result<()>;
	async fn update_employee(&self, employee: &Employee) -> Result<()>;
	async fn delete_employee(&self, id: EmployeeId) -> Result<Vec<DepartmentId>>;
}

#[derive(Clone)]
pub struct EmployeeRepository {
	pool: SqlitePool,
}

impl EmployeeRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self), fields(employee_id = %id))]
	pub async fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>> {
		let row = sqlx::query(
			r#"
			SELECT id, employee_code, full_name, birth_date, email, salary, tax_code,
			       department_id, created_at, updated_at
			FROM employees
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_employee(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>> {
		let pattern = filter
			.query
			.as_deref()
			.map(str::trim)
			.filter(|q| !q.is_empty())
			.map(|q| format!("%{}%", escape_like(&q.to_lowercase())));

		let rows = sqlx::query(
			r#"
			SELECT id, employee_code, full_name, birth_date, email, salary, tax_code,
			       department_id, created_at, updated_at
			FROM employees
			WHERE (?1 IS NULL OR department_id = ?1)
			  AND (?2 IS NULL
			       OR LOWER(full_name) LIKE ?2 ESCAPE '\'
			       OR LOWER(employee_code) LIKE ?2 ESCAPE '\'
			       OR LOWER(email) LIKE ?2 ESCAPE '\')
			ORDER BY employee_code
			"#,
		)
		.bind(filter.department_id.map(|id| id.to_string()))
		.bind(pattern)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_employee).collect()
	}

	#[tracing::instrument(skip(self, employee), fields(employee_id = %employee.id, code = %employee.employee_code))]
	pub async fn create_employee(&self, employee: &Employee) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO employees (id, employee_code, full_name, birth_date, email, salary,
			                       tax_code, department_id, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(employee.id.to_string())
		.bind(&employee.employee_code)
		.bind(&employee.full_name)
		.bind(employee.birth_date.format(DATE_FORMAT).to_string())
		.bind(&employee.email)
		.bind(employee.salary)
		.bind(&employee.tax_code)
		.bind(employee.department_id.to_string())
		.bind(employee.created_at.to_rfc3339())
		.bind(employee.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| {
			DbError::constraint_or(
				e,
				|| {
					format!(
						"employee code, email or tax code already in use ({})",
						employee.employee_code
					)
				},
				|| format!("department {}", employee.department_id),
			)
		})?;

		tracing::debug!(employee_id = %employee.id, "employee created");
		Ok(())
	}

	/// Writes every mutable field.
	///
	/// Moving an employee out of a department they manage is refused in the
	/// same statement that performs the write.
	#[tracing::instrument(skip(self, employee), fields(employee_id = %employee.id))]
	pub async fn update_employee(&self, employee: &Employee) -> Result<()> {
		let result = sqlx::query(
			r#"
			UPDATE employees
			SET employee_code = ?1, full_name = ?2, birth_date = ?3, email = ?4,
			    salary = ?5, tax_code = ?6, department_id = ?7, updated_at = ?8
			WHERE id = ?9
			  AND NOT EXISTS (
			      SELECT 1 FROM departments WHERE manager_id = ?9 AND id != ?7
			  )
			"#,
		)
		.bind(&employee.employee_code)
		.bind(&employee.full_name)
		.bind(employee.birth_date.format(DATE_FORMAT).to_string())
		.bind(&employee.email)
		.bind(employee.salary)
		.bind(&employee.tax_code)
		.bind(employee.department_id.to_string())
		.bind(Utc::now().to_rfc3339())
		.bind(employee.id.to_string())
		.execute(&self.pool)
		.await
		.map_err(|e| {
			DbError::constraint_or(
				e,
				|| {
					format!(
						"employee code, email or tax code already in use ({})",
						employee.employee_code
					)
				},
				|| format!("department {}", employee.department_id),
			)
		})?;

		if result.rows_affected() == 0 {
			if self.get_employee(employee.id).await?.is_none() {
				return Err(DbError::NotFound(format!("employee {}", employee.id)));
			}
			return Err(DbError::Conflict(format!(
				"employee {} manages a department and cannot leave it",
				employee.id
			)));
		}
		Ok(())
	}

	/// Deletes an employee, clearing every reference to them first.
	///
	/// Returns the departments whose manager was cleared.
	#[tracing::instrument(skip(self), fields(employee_id = %id))]
	pub async fn delete_employee(&self, id: EmployeeId) -> Result<Vec<DepartmentId>> {
		let mut tx = self.pool.begin().await?;

		let managed = sqlx::query("SELECT id FROM departments WHERE manager_id = ?")
			.bind(id.to_string())
			.fetch_all(&mut *tx)
			.await?;
		let cleared = managed
			.iter()
			.map(|r| row::uuid(r, "id").map(DepartmentId::new))
			.collect::<Result<Vec<_>>>()?;

		let now = Utc::now().to_rfc3339();
		sqlx::query("UPDATE departments SET manager_id = NULL, updated_at = ? WHERE manager_id = ?")
			.bind(&now)
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		sqlx::query("UPDATE users SET employee_id = NULL, updated_at = ? WHERE employee_id = ?")
			.bind(&now)
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		let result = sqlx::query("DELETE FROM employees WHERE id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		if result.rows_affected() == 0 {
			tx.rollback().await?;
			return Err(DbError::NotFound(format!("employee {id}")));
		}

		tx.commit().await?;
		tracing::debug!(employee_id = %id, cleared = cleared.len(), "employee deleted");
		Ok(cleared)
	}
}

fn row_to_employee(r: &sqlx::sqlite::SqliteRow) -> Result<Employee> {
	Ok(Employee {
		id: EmployeeId::new(row::uuid(r, "id")?),
		employee_code: r.get("employee_code"),
		full_name: r.get("full_name"),
		birth_date: row::date(r, "birth_date")?,
		email: r.get("email"),
		salary: r.get("salary"),
		tax_code: r.get("tax_code"),
		department_id: DepartmentId::new(row::uuid(r, "department_id")?),
		created_at: row::timestamp(r, "created_at")?,
		updated_at: row::timestamp(r, "updated_at")?,
	})
}

#[async_trait]
impl EmployeeStore for EmployeeRepository {
	async fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>> {
		self.get_employee(id).await
	}

	async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>> {
		self.list_employees(filter).await
	}

	async fn create_employee(&self, employee: &Employee) -> Result<()> {
		self.create_employee(employee).await
	}

	async fn update_employee(&self, employee: &Employee) -> Result<()> {
		self.update_employee(employee).await
	}

	async fn delete_employee(&self, id: EmployeeId) -> Result<Vec<DepartmentId>> {
		self.delete_employee(id).await
	}
}

/// Escapes `LIKE` wildcards so a search query matches literally.
fn escape_like(query: &str) -> String {
	let mut escaped = String::with_capacity(query.len());
	for c in query.chars() {
		if matches!(c, '\\' | '%' | '_') {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped
}
