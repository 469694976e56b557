// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute-based access control for directory records.
//!
//! A decision is made in two phases: the coarse grant table
//! ([`has_coarse_grant`]) followed, when a target is named, by the
//! relationship-scoped rule tables in [`policies`]. Everything here is pure;
//! callers fetch the subject snapshot and target once and pass them in.

pub mod engine;
pub mod grants;
pub mod policies;
pub mod types;

pub use engine::is_allowed;
pub use grants::has_coarse_grant;
pub use policies::{Condition, Relationship, ScopeRule};
pub use types::{
	DepartmentUnit, DepartmentUnits, EmployeeAttr, ResourceAttrs, RoleAttr, SubjectAttrs, Target,
};
