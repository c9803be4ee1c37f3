//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::auth_common::file_utils::expand_user_home;
use crate::error::{config_err, AstraError};
use ini::Ini;
use std::collections::HashMap;

pub(crate) const DEFAULT_CONFIG_FILE_PATH: &str = "~/.astrarc";
pub(crate) const DEFAULT_SECTION: &str = "default";
// Environment variable naming the section to read when none is given
pub(crate) const SECTION_ENV: &str = "ASTRA_RC_SECTION";

/// Read all `key=value` settings of one section of an astrarc-style ini file.
///
/// The file has the form:
/// ```ini
/// [default]
/// ASTRA_DB_ID=<database id>
/// ASTRA_DB_REGION=<database region>
/// ASTRA_DB_APPLICATION_TOKEN=<token>
/// ```
pub(crate) fn load_section(
    config_file_path: &str,
    section: &str,
) -> Result<HashMap<String, String>, AstraError> {
    tracing::debug!(
        "Reading settings from file {} and section {}",
        config_file_path,
        section
    );
    let file_path = expand_user_home(config_file_path);
    let config = match Ini::load_from_file(&file_path) {
        Ok(c) => c,
        Err(e) => {
            return config_err!("error reading config file '{}': {}", file_path, e);
        }
    };
    let props = match config.section(Some(section)) {
        Some(p) => p,
        None => {
            return config_err!(
                "error reading config file '{}': missing section '{}'",
                file_path,
                section
            );
        }
    };
    let mut settings = HashMap::new();
    for (k, v) in props.iter() {
        settings.insert(k.trim().to_string(), v.trim().to_string());
    }
    Ok(settings)
}

/// The section to use when the caller doesn't name one.
pub(crate) fn default_section() -> String {
    std::env::var(SECTION_ENV).unwrap_or_else(|_| DEFAULT_SECTION.to_string())
}
