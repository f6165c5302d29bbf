// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{Result, UnknownKesImageSnafu};
use chrono::NaiveDateTime;
use regex::Regex;
use snafu::OptionExt;
use std::sync::LazyLock;
use strum::Display;

/// Releases before this one read the v1 configuration layout.
const FIRST_V2_RELEASE: semver::Version = semver::Version::new(0, 22, 0);

static RELEASE_DATE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}-\d{2}-\d{2}Z)(-.*)?$").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SchemaVersion {
    #[strum(to_string = "v1")]
    V1,
    #[strum(to_string = "v2")]
    V2,
}

/// Picks the configuration layout from the tag of a KES image.
pub fn select(image: &str) -> Result<SchemaVersion> {
    let unknown = || UnknownKesImageSnafu { image };

    // the tag follows the last ':' so registry ports are skipped
    let (_, tag) = image.rsplit_once(':').context(unknown())?;
    if tag.contains('/') {
        return unknown().fail();
    }

    if tag == "latest" || tag == "edge" {
        return Ok(SchemaVersion::V2);
    }

    if let Some(version) = tag.strip_prefix('v') {
        let version = semver::Version::parse(version).ok().context(unknown())?;
        return Ok(if version < FIRST_V2_RELEASE {
            SchemaVersion::V1
        } else {
            SchemaVersion::V2
        });
    }

    let captures = RELEASE_DATE
        .as_ref()
        .and_then(|re| re.captures(tag))
        .context(unknown())?;
    let date = captures.get(1).map(|m| m.as_str()).context(unknown())?;
    NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H-%M-%SZ")
        .ok()
        .context(unknown())?;

    Ok(SchemaVersion::V2)
}
