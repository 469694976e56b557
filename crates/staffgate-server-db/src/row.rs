// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Column decoding shared by the repositories.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::error::DbError;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn uuid(row: &SqliteRow, column: &str) -> Result<Uuid, DbError> {
	let value: String = row.get(column);
	Uuid::parse_str(&value).map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

pub(crate) fn opt_uuid(row: &SqliteRow, column: &str) -> Result<Option<Uuid>, DbError> {
	let value: Option<String> = row.get(column);
	value
		.map(|v| Uuid::parse_str(&v))
		.transpose()
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

pub(crate) fn timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, DbError> {
	let value: String = row.get(column);
	DateTime::parse_from_rfc3339(&value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

pub(crate) fn date(row: &SqliteRow, column: &str) -> Result<NaiveDate, DbError> {
	let value: String = row.get(column);
	NaiveDate::parse_from_str(&value, DATE_FORMAT)
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

pub(crate) fn parsed<T>(row: &SqliteRow, column: &str) -> Result<T, DbError>
where
	T: std::str::FromStr,
	T::Err: std::fmt::Display,
{
	let value: String = row.get(column);
	value
		.parse()
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}
