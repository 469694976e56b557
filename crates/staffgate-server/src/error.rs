// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use staffgate_server_auth::InvalidAssignment;
use staffgate_server_db::DbError;

/// Errors returned by the directory services.
///
/// A policy denial is always [`DirectoryError::Forbidden`]; a store failure is
/// always [`DirectoryError::Unavailable`]. The two are never conflated.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
	#[error("{kind} not found: {id}")]
	NotFound { kind: &'static str, id: String },

	#[error("insufficient permissions")]
	Forbidden,

	#[error(transparent)]
	InvalidAssignment(#[from] InvalidAssignment),

	#[error("conflict: {0}")]
	Conflict(String),

	#[error("invalid input: {0}")]
	Validation(String),

	#[error("directory store unavailable")]
	Unavailable(#[source] DbError),
}

impl DirectoryError {
	pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
		DirectoryError::NotFound {
			kind,
			id: id.to_string(),
		}
	}

	pub fn validation(message: impl Into<String>) -> Self {
		DirectoryError::Validation(message.into())
	}
}

impl From<DbError> for DirectoryError {
	fn from(e: DbError) -> Self {
		match e {
			DbError::NotFound(what) => DirectoryError::NotFound {
				kind: "record",
				id: what,
			},
			DbError::Conflict(message) => DirectoryError::Conflict(message),
			other => DirectoryError::Unavailable(other),
		}
	}
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
