// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl DbError {
	/// Maps a unique-constraint violation to [`DbError::Conflict`].
	pub(crate) fn unique_or(e: sqlx::Error, conflict: impl FnOnce() -> String) -> Self {
		match e {
			sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
				DbError::Conflict(conflict())
			}
			_ => DbError::Sqlx(e),
		}
	}

	/// Like [`DbError::unique_or`], also mapping a foreign-key violation to
	/// [`DbError::NotFound`].
	pub(crate) fn constraint_or(
		e: sqlx::Error,
		conflict: impl FnOnce() -> String,
		missing: impl FnOnce() -> String,
	) -> Self {
		match e {
			sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
				DbError::NotFound(missing())
			}
			_ => DbError::unique_or(e, conflict),
		}
	}
}

pub type Result<T> = std::result::Result<T, DbError>;
