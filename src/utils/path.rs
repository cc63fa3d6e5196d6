// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Path manipulation utilities shared between the compiler and state lookup

/// Component of a state path: a field of a composite node, or a position in
/// a list when it parses as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment<'a>(pub &'a str);

impl<'a> PathSegment<'a> {
    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// The list index this segment names, if it is a plain decimal number.
    pub fn as_index(&self) -> Option<usize> {
        let s = self.as_str();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    }
}

/// Parse a slash-delimited state path ("a/b/0/c") into segments.
/// Empty segments are skipped, so leading and trailing slashes are harmless.
pub fn parse_state_path(path: &str) -> Vec<PathSegment<'_>> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(PathSegment)
        .collect()
}

/// Append a child segment to a path. The root path is "/".
pub fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() || parent == "/" {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}
