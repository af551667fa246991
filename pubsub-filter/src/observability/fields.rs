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

//! Values for the `reason` field and value-format helpers.

pub const REASON_PURE_PUBLISHER: &str = "pure_publisher";
pub const REASON_NO_MATCH: &str = "no_match";
pub const REASON_PEER_DEPARTED: &str = "peer_departed";

const MAX_RULE_CHARS: usize = 64;

/// Renders rule bytes for logs: printable ASCII verbatim, everything else escaped,
/// truncated to a bounded length.
pub fn format_rule(rule: &[u8]) -> String {
    let mut out = String::with_capacity(rule.len().min(MAX_RULE_CHARS) + 2);
    out.push('"');
    for (index, byte) in rule.iter().enumerate() {
        if index == MAX_RULE_CHARS {
            out.push_str("...");
            break;
        }
        out.extend(std::ascii::escape_default(*byte).map(char::from));
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::format_rule;

    #[test]
    fn format_rule_escapes_binary() {
        assert_eq!(format_rule(b"weather"), "\"weather\"");
        assert_eq!(format_rule(&[0x00, b'a', 0xff]), "\"\\x00a\\xff\"");
        assert_eq!(format_rule(b""), "\"\"");
    }

    #[test]
    fn format_rule_truncates_long_rules() {
        let rule = vec![b'x'; 100];
        let formatted = format_rule(&rule);

        assert!(formatted.ends_with("...\""));
        assert_eq!(formatted.len(), 64 + 3 + 2);
    }
}
