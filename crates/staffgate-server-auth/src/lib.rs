// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization core for the staffgate employee directory.
//!
//! - [`abac`]: coarse grants plus relationship-scoped rule tables
//! - [`redaction`]: per-row compensation redaction
//! - [`manager`]: the department manager membership invariant
//! - [`catalog`]: the seeded role archetypes and their grants
//! - [`directory`]: the records decisions are made about
//!
//! Nothing in this crate performs I/O. Callers load a [`SubjectAttrs`]
//! snapshot and the target once per decision.

pub mod abac;
pub mod catalog;
pub mod directory;
pub mod manager;
pub mod redaction;
pub mod types;

pub use abac::{
	has_coarse_grant, is_allowed, DepartmentUnit, DepartmentUnits, EmployeeAttr, ResourceAttrs,
	SubjectAttrs, Target,
};
pub use directory::{Department, Employee, Permission, Role, User};
pub use manager::{validate_manager_assignment, InvalidAssignment};
pub use redaction::{include_salary, redact_all, EmployeeView};
pub use types::{
	Action, DepartmentId, EmployeeId, Grant, ParseError, PermissionId, ResourceKind, RoleId,
	RoleType, UserId,
};
