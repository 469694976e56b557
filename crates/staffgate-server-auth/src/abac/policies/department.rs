// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Department record scoping.
//!
//! Read-only for every archetype. Writes and manager assignment are reserved
//! to Admin through the grant catalog.

use super::{evaluate_table, Condition, Relationship, ScopeRule, READ_ONLY};
use crate::types::{Action, RoleType};

pub const RULES: &[ScopeRule] = &[
	ScopeRule::only(RoleType::Manager, Condition::TargetManaged, READ_ONLY),
	ScopeRule::only(RoleType::HrStaff, Condition::ActorInHr, READ_ONLY),
	ScopeRule::only(RoleType::HrManager, Condition::ActorInHr, READ_ONLY),
	ScopeRule::any(Condition::TargetInOwnDepartment, READ_ONLY),
];

pub fn can_access_department(role: RoleType, rel: &Relationship, action: Action) -> bool {
	evaluate_table(RULES, role, rel, action)
}
