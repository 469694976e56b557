// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Coarse (resource, action) grant lookup.

use tracing::instrument;

use super::types::SubjectAttrs;
use crate::types::{Action, ResourceKind};

/// Returns true if the subject may perform `action` on `resource` ignoring
/// any target.
///
/// Admin short-circuits. Otherwise some role must carry a permission matching
/// the pair exactly.
#[instrument(
    level = "trace",
    skip(subject),
    fields(user_id = %subject.user_id, resource = %resource, action = %action)
)]
pub fn has_coarse_grant(subject: &SubjectAttrs, resource: ResourceKind, action: Action) -> bool {
	if subject.is_admin() {
		return true;
	}
	subject.roles.iter().any(|role| role.has_grant(resource, action))
}
