// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization policy configuration.
//!
//! Names the departments whose members get HR and Accounting scoping.
//! Department names are matched exactly, so only surrounding whitespace is
//! normalized here.

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_HR_DEPARTMENT: &str = "HR";
const DEFAULT_ACCOUNTING_DEPARTMENT: &str = "Accounting";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
	pub hr_department: String,
	pub accounting_department: String,
}

impl Default for PolicyConfig {
	fn default() -> Self {
		Self {
			hr_department: DEFAULT_HR_DEPARTMENT.to_string(),
			accounting_department: DEFAULT_ACCOUNTING_DEPARTMENT.to_string(),
		}
	}
}

impl PolicyConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.hr_department.trim().is_empty() {
			return Err(ConfigError::InvalidValue {
				key: "policy.hr_department".to_string(),
				message: "must not be empty".to_string(),
			});
		}
		if self.accounting_department.trim().is_empty() {
			return Err(ConfigError::InvalidValue {
				key: "policy.accounting_department".to_string(),
				message: "must not be empty".to_string(),
			});
		}
		if self.hr_department == self.accounting_department {
			return Err(ConfigError::Validation(format!(
				"HR and Accounting departments must differ (both are '{}')",
				self.hr_department
			)));
		}
		Ok(())
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfigLayer {
	#[serde(default)]
	pub hr_department: Option<String>,
	#[serde(default)]
	pub accounting_department: Option<String>,
}

impl PolicyConfigLayer {
	pub fn merge(&mut self, other: PolicyConfigLayer) {
		if other.hr_department.is_some() {
			self.hr_department = other.hr_department;
		}
		if other.accounting_department.is_some() {
			self.accounting_department = other.accounting_department;
		}
	}

	pub fn finalize(self) -> PolicyConfig {
		PolicyConfig {
			hr_department: self
				.hr_department
				.map(|name| name.trim().to_string())
				.unwrap_or_else(|| DEFAULT_HR_DEPARTMENT.to_string()),
			accounting_department: self
				.accounting_department
				.map(|name| name.trim().to_string())
				.unwrap_or_else(|| DEFAULT_ACCOUNTING_DEPARTMENT.to_string()),
		}
	}
}
