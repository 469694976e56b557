// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the staffgate directory.
//!
//! Each entity family has a `*Store` trait (the seam services depend on) and a
//! `*Repository` implementing it over a [`sqlx::SqlitePool`]. IDs are stored as
//! UUID strings, timestamps as RFC 3339 and dates as `YYYY-MM-DD`.

pub mod audit;
pub mod department;
pub mod employee;
pub mod error;
pub mod pool;
mod row;
pub mod schema;
pub mod testing;
pub mod user;

pub use audit::{AuditQuery, AuditRepository, AuditStats, AuditStore};
pub use department::{
	DepartmentRepository, DepartmentStats, DepartmentStore, ManagerAssignment, ManagerChange,
};
pub use employee::{EmployeeFilter, EmployeeRepository, EmployeeStore};
pub use error::{DbError, Result};
pub use pool::create_pool;
pub use schema::ensure_schema;
pub use user::{SeedReport, UserRepository, UserStore};
