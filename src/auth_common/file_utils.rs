//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use dirs;
use std::path::PathBuf;

/// Generates the absolute file path of the path provided based on the underlying platform
///
/// A leading `~/` is replaced with the current user's home directory. If the home
/// directory cannot be determined the path is returned unchanged, and the subsequent
/// file open will report the error.
pub(crate) fn expand_user_home(file_path: &str) -> String {
    if file_path.starts_with("~/") || file_path.starts_with("~\\") {
        if let Some(home_dir) = dirs::home_dir() {
            let full_path = home_dir.join(PathBuf::from(correct_path(&file_path[2..])));
            return format!("{}", full_path.display());
        }
        tracing::debug!("could not determine home directory to expand {}", file_path);
    }
    String::from(file_path)
}

/// Generates the correct file path based on the platform
fn correct_path(file_path: &str) -> String {
    if cfg!(target_os = "windows") {
        file_path.replace("/", "\\")
    } else {
        String::from(file_path)
    }
}
