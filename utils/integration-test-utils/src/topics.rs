/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/


/// A small topic hierarchy shared by scenario tests.
pub const FEED_TOPICS: [&str; 6] = [
    "feed/weather/berlin",
    "feed/weather/oslo",
    "feed/traffic/berlin",
    "feed/traffic/oslo",
    "news/sports",
    "news/politics",
];

/// `count` distinct topics below `prefix`, e.g. `prefix/00000042`.
pub fn numbered_topics(prefix: &str, count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|index| format!("{prefix}/{index:08}").into_bytes())
        .collect()
}
