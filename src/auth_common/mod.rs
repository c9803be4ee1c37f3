//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
pub(crate) mod config_file;
pub(crate) mod credentials;
pub(crate) mod file_utils;
pub mod token_provider;
