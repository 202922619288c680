// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Time related utils.

use chrono::Datelike;
use chrono::NaiveDateTime;
use chrono::SecondsFormat;
use chrono::Timelike;
use chrono::Utc;

use crate::Error;
use crate::Result;

/// DateTime used across apisig, always in UTC.
pub type DateTime = chrono::DateTime<Utc>;

/// Date format: "20220313"
const DATE: &str = "%Y%m%d";

/// Time format for ISO 8601 basic: "20220313T072004Z"
const ISO8601: &str = "%Y%m%dT%H%M%SZ";

/// Create a new DateTime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into date: "20220313"
pub fn format_date(t: DateTime) -> String {
    t.format(DATE).to_string()
}

/// Format time into ISO 8601 basic format: "20220313T072004Z"
pub fn format_iso8601(t: DateTime) -> String {
    t.format(ISO8601).to_string()
}

/// Format time into RFC 3339: "2022-03-13T07:20:04Z"
pub fn format_rfc3339(t: DateTime) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse time from ISO 8601 basic format: "20220313T072004Z"
pub fn parse_iso8601(s: &str) -> Result<DateTime> {
    Ok(NaiveDateTime::parse_from_str(s, ISO8601)?.and_utc())
}

/// Parse time from RFC 3339: "2022-03-13T07:20:04Z"
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    Ok(chrono::DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

/// Normalize a signing time.
///
/// SigV4 carries whole seconds and a four digit year, anything else can't be
/// represented in `X-Amz-Date` or the credential scope.
pub fn normalize(t: DateTime) -> Result<DateTime> {
    if !(1..=9999).contains(&t.year()) {
        return Err(Error::clock_invalid(format!(
            "year {} can't be represented in SigV4 timestamps",
            t.year()
        )));
    }

    t.with_nanosecond(0)
        .ok_or_else(|| Error::clock_invalid("failed to truncate signing time to seconds"))
}
