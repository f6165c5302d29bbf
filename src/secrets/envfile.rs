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

//! The `config.env` file: one `export KEY="VALUE"` line per entry.

use std::collections::BTreeMap;

pub const CONFIG_ENV_KEY: &str = "config.env";

/// Renders entries sorted by key. Values are not escaped.
pub fn render(config: &BTreeMap<String, String>) -> String {
    config
        .iter()
        .map(|(key, value)| format!("export {}=\"{}\"\n", key, value))
        .collect()
}

/// Reads every `export` line, ignoring comments and anything else.
pub fn parse(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .filter_map(|line| line.trim().strip_prefix("export "))
        .filter_map(|assignment| assignment.split_once('='))
        .map(|(key, value)| {
            (
                key.trim().to_string(),
                value.trim().trim_matches('"').to_string(),
            )
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
