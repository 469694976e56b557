// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use sqlx::SqlitePool;
use staffgate_server::{
	initialize, AdminAccount, AppState, AuditLogService, DepartmentService, EmployeeService,
	RoleService, Stores, UserService,
};
use staffgate_server_audit::{AuditService, SqliteAuditSink};
use staffgate_server_auth::{
	catalog, Department, DepartmentId, DepartmentUnits, Employee, Role, RoleType, User, UserId,
};
use staffgate_server_db::testing::{create_test_pool, insert_department, insert_employee};
use staffgate_server_db::ManagerAssignment;
use uuid::Uuid;

/// A seeded in-memory directory whose audit entries land in SQLite.
pub struct Fixture {
	pub pool: SqlitePool,
	pub state: AppState,
	pub employees: EmployeeService,
	pub departments: DepartmentService,
	pub audit_log: AuditLogService,
	pub users: UserService,
	pub roles: RoleService,
	pub admin: UserId,
}

impl Fixture {
	pub async fn new() -> Self {
		let pool = create_test_pool().await;
		let audit = Arc::new(AuditService::new(
			256,
			vec![Arc::new(SqliteAuditSink::new(pool.clone()))],
		));
		let state = AppState::new(
			Stores::sqlite(pool.clone()),
			DepartmentUnits::default(),
			audit,
		);

		let admin = AdminAccount {
			username: "admin".to_string(),
			email: "admin@example.com".to_string(),
		};
		let report = initialize(&state.stores, 90, Some(&admin)).await.unwrap();
		assert!(report.admin_created);
		let admin = state
			.stores
			.users
			.get_user_by_username("admin")
			.await
			.unwrap()
			.unwrap()
			.id;

		Self {
			employees: EmployeeService::new(state.clone()),
			departments: DepartmentService::new(state.clone()),
			audit_log: AuditLogService::new(state.clone()),
			users: UserService::new(state.clone()),
			roles: RoleService::new(state.clone()),
			pool,
			state,
			admin,
		}
	}

	pub async fn department(&self, name: &str) -> Department {
		insert_department(&self.pool, name).await
	}

	pub async fn employee(&self, code: &str, department_id: DepartmentId, salary: i64) -> Employee {
		insert_employee(&self.pool, code, department_id, salary).await
	}

	/// A user linked to `employee` holding the seeded roles of `role_types`.
	pub async fn user(
		&self,
		username: &str,
		employee: Option<&Employee>,
		role_types: &[RoleType],
	) -> UserId {
		let mut user = User::new(username, format!("{username}@users.example.com"));
		user.employee_id = employee.map(|e| e.id);
		self.state.stores.users.create_user(&user).await.unwrap();

		for role_type in role_types {
			let role = self.role(*role_type).await;
			self.state.stores.users.assign_role(user.id, role.id).await.unwrap();
		}
		user.id
	}

	/// The seeded role of `role_type`.
	pub async fn role(&self, role_type: RoleType) -> Role {
		let (name, _) = catalog::role_name(role_type);
		self
			.state
			.stores
			.users
			.get_role_by_name(name)
			.await
			.unwrap()
			.unwrap()
	}

	pub async fn make_manager(&self, department: &Department, employee: &Employee) {
		let outcome = self
			.state
			.stores
			.departments
			.assign_manager_if_member(department.id, employee.id)
			.await
			.unwrap();
		assert_eq!(outcome, ManagerAssignment::Assigned);
	}

	pub async fn flush_audit(&self) {
		self.state.audit.flush().await.unwrap();
	}
}

pub fn id<T: Into<Uuid>>(id: T) -> Option<Uuid> {
	Some(id.into())
}
