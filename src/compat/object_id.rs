//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// Generate a new 24-character lowercase hex object id.
///
/// The id is made of a 4-byte big-endian seconds timestamp, 5 random bytes chosen
/// once per process, and a 3-byte counter, so ids created by one process sort by
/// creation time.
pub fn new_object_id() -> String {
    let ts = chrono::Utc::now().timestamp() as u32;
    let unique = PROCESS_UNIQUE.get_or_init(|| rand::thread_rng().gen());
    let counter = COUNTER
        .get_or_init(|| AtomicU32::new(rand::thread_rng().gen_range(0..0x00ff_ffff)))
        .fetch_add(1, Ordering::Relaxed)
        & 0x00ff_ffff;

    let mut bytes = [0u8; 12];
    bytes[0..4].copy_from_slice(&ts.to_be_bytes());
    bytes[4..9].copy_from_slice(unique);
    bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
