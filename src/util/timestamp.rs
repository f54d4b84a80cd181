// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UTC timestamps in ISO 8601 form (`2025-01-31T12:00:00.000Z`).

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::SystemTime;

pub fn iso8601(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}
