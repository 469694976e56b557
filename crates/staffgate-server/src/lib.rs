// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Employee directory services.
//!
//! Each service takes the acting [`UserId`](staffgate_server_auth::UserId),
//! builds one capability snapshot per operation through the
//! [`Authorizer`], and audits every decision and mutation.

pub mod audit_log;
pub mod authz;
pub mod departments;
pub mod employees;
pub mod error;
pub mod roles;
pub mod setup;
pub mod state;
pub mod users;
pub mod version;

pub use audit_log::{AuditLogService, AuditPage};
pub use authz::Authorizer;
pub use departments::{DepartmentPatch, DepartmentService, NewDepartment};
pub use employees::{EmployeePatch, EmployeeService, NewEmployee};
pub use error::{DirectoryError, Result};
pub use roles::{NewRole, RolePatch, RoleService};
pub use setup::{initialize, AdminAccount, InitReport};
pub use state::{build_audit_service, department_units, AppState, Stores};
pub use users::{NewUser, UserPatch, UserService};
