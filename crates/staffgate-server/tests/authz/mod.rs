// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod audit_log;
mod departments;
mod employees;
mod scenarios;
mod support;
mod users;
