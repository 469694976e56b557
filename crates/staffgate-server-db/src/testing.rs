// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helpers for tests that need a database.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use staffgate_server_auth::{Department, DepartmentId, Employee};

use crate::department::DepartmentRepository;
use crate::employee::EmployeeRepository;

/// A single-connection in-memory pool with the full schema applied.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.foreign_keys(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.expect("Failed to create test pool");

	crate::schema::ensure_schema(&pool)
		.await
		.expect("Failed to create schema");
	pool
}

/// Inserts a department with the given name.
pub async fn insert_department(pool: &SqlitePool, name: &str) -> Department {
	let department = Department::new(name);
	DepartmentRepository::new(pool.clone())
		.create_department(&department)
		.await
		.unwrap();
	department
}

/// Inserts an employee with unique code, email and tax code derived from `code`.
pub async fn insert_employee(
	pool: &SqlitePool,
	code: &str,
	department_id: DepartmentId,
	salary: i64,
) -> Employee {
	let mut employee = Employee::new(
		code,
		format!("Employee {code}"),
		format!("{}@example.com", code.to_lowercase()),
		department_id,
	);
	employee.salary = salary;
	employee.tax_code = format!("TAX-{code}");
	EmployeeRepository::new(pool.clone())
		.create_employee(&employee)
		.await
		.unwrap();
	employee
}
