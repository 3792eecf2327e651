//! Delta representation, application and inversion.

use serde::{Deserialize, Serialize};

use docman_core::error::AppError;
use docman_core::result::AppResult;

use super::lcs::{diff_lines, split_lines};

/// A contiguous run of changed lines.
///
/// Positions are 0-based line indexes. `old_start` points into the base
/// text, `new_start` into the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// First replaced line in the base.
    pub old_start: usize,
    /// First inserted line in the result.
    pub new_start: usize,
    /// Lines removed from the base, terminators included.
    pub old_lines: Vec<String>,
    /// Lines inserted into the result, terminators included.
    pub new_lines: Vec<String>,
}

/// What a hunk does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HunkKind {
    /// Only adds lines.
    Insert,
    /// Only removes lines.
    Delete,
    /// Removes and adds lines.
    Replace,
}

impl Hunk {
    /// Kind derived from which sides are non-empty.
    pub fn kind(&self) -> HunkKind {
        match (self.old_lines.is_empty(), self.new_lines.is_empty()) {
            (true, _) => HunkKind::Insert,
            (false, true) => HunkKind::Delete,
            (false, false) => HunkKind::Replace,
        }
    }

    fn inverted(&self) -> Self {
        Self {
            old_start: self.new_start,
            new_start: self.old_start,
            old_lines: self.new_lines.clone(),
            new_lines: self.old_lines.clone(),
        }
    }
}

/// Changes between two versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeltaBody {
    /// Line hunks, ascending by position.
    Text {
        /// The hunks.
        hunks: Vec<Hunk>,
    },
    /// Whole-file replacement for content that is not text.
    Binary {
        /// Base bytes.
        #[serde(with = "base64_bytes")]
        old: Vec<u8>,
        /// Result bytes.
        #[serde(with = "base64_bytes")]
        new: Vec<u8>,
    },
}

/// Delta from `from_version` to `to_version` of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    /// Version the delta applies to.
    pub from_version: i32,
    /// Version the delta produces.
    pub to_version: i32,
    /// The changes.
    pub body: DeltaBody,
}

/// Line counts of a delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Lines added.
    pub insertions: usize,
    /// Lines removed.
    pub deletions: usize,
    /// Number of hunks.
    pub hunks: usize,
    /// Whether the delta is a whole-file binary replacement.
    pub binary: bool,
}

impl Delta {
    /// Compute the delta turning `old` into `new`.
    ///
    /// Content that is not valid UTF-8 or contains a NUL byte on either side
    /// is diffed as a single binary replacement.
    pub fn compute(
        old: &[u8],
        new: &[u8],
        from_version: i32,
        to_version: i32,
        max_cells: u64,
    ) -> Self {
        let body = match (as_text(old), as_text(new)) {
            (Some(old_text), Some(new_text)) => DeltaBody::Text {
                hunks: diff_lines(&split_lines(old_text), &split_lines(new_text), max_cells),
            },
            _ => DeltaBody::Binary {
                old: old.to_vec(),
                new: new.to_vec(),
            },
        };
        Self {
            from_version,
            to_version,
            body,
        }
    }

    /// Whether the two sides are identical.
    pub fn is_empty(&self) -> bool {
        match &self.body {
            DeltaBody::Text { hunks } => hunks.is_empty(),
            DeltaBody::Binary { old, new } => old == new,
        }
    }

    /// Reconstruct the target from `base`.
    ///
    /// Every removed line is checked against the base; a delta computed
    /// against different content fails with `Validation`.
    pub fn apply(&self, base: &[u8]) -> AppResult<Vec<u8>> {
        match &self.body {
            DeltaBody::Binary { old, new } => {
                if base != old.as_slice() {
                    return Err(AppError::validation(
                        "Delta does not apply: base content differs",
                    ));
                }
                Ok(new.clone())
            }
            DeltaBody::Text { hunks } => {
                let text = std::str::from_utf8(base).map_err(|_| {
                    AppError::validation("Delta does not apply: base content is not text")
                })?;
                apply_hunks(&split_lines(text), hunks).map(String::into_bytes)
            }
        }
    }

    /// The delta going the other way.
    pub fn invert(&self) -> Self {
        let body = match &self.body {
            DeltaBody::Text { hunks } => DeltaBody::Text {
                hunks: hunks.iter().map(Hunk::inverted).collect(),
            },
            DeltaBody::Binary { old, new } => DeltaBody::Binary {
                old: new.clone(),
                new: old.clone(),
            },
        };
        Self {
            from_version: self.to_version,
            to_version: self.from_version,
            body,
        }
    }

    /// Line counts.
    pub fn stats(&self) -> DiffStats {
        match &self.body {
            DeltaBody::Text { hunks } => DiffStats {
                insertions: hunks.iter().map(|h| h.new_lines.len()).sum(),
                deletions: hunks.iter().map(|h| h.old_lines.len()).sum(),
                hunks: hunks.len(),
                binary: false,
            },
            DeltaBody::Binary { .. } => DiffStats {
                binary: true,
                hunks: usize::from(!self.is_empty()),
                ..DiffStats::default()
            },
        }
    }
}

fn as_text(bytes: &[u8]) -> Option<&str> {
    if bytes.contains(&0) {
        return None;
    }
    std::str::from_utf8(bytes).ok()
}

fn apply_hunks(base: &[&str], hunks: &[Hunk]) -> AppResult<String> {
    let mut out = String::new();
    let mut cursor = 0usize;
    let mut emitted = 0usize;

    for hunk in hunks {
        let end = hunk.old_start + hunk.old_lines.len();
        if hunk.old_start < cursor || end > base.len() {
            return Err(AppError::validation(format!(
                "Delta does not apply: hunk at line {} is out of range",
                hunk.old_start + 1
            )));
        }

        for line in &base[cursor..hunk.old_start] {
            out.push_str(line);
        }
        emitted += hunk.old_start - cursor;

        if emitted != hunk.new_start {
            return Err(AppError::validation(format!(
                "Delta does not apply: hunk expected at result line {}",
                hunk.new_start + 1
            )));
        }
        if base[hunk.old_start..end]
            .iter()
            .zip(&hunk.old_lines)
            .any(|(have, want)| *have != want.as_str())
        {
            return Err(AppError::validation(format!(
                "Delta does not apply: content differs at line {}",
                hunk.old_start + 1
            )));
        }

        for line in &hunk.new_lines {
            out.push_str(line);
        }
        emitted += hunk.new_lines.len();
        cursor = end;
    }

    for line in &base[cursor..] {
        out.push_str(line);
    }
    Ok(out)
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docman_core::ErrorKind;

    fn roundtrip(a: &[u8], b: &[u8]) {
        let forward = Delta::compute(a, b, 1, 2, u64::MAX);
        let backward = Delta::compute(b, a, 2, 1, u64::MAX);
        assert_eq!(forward.apply(a).unwrap(), b);
        assert_eq!(backward.apply(&forward.apply(a).unwrap()).unwrap(), a);
        assert_eq!(forward.invert().apply(b).unwrap(), a);
    }

    #[test]
    fn test_text_deltas_are_inverse() {
        roundtrip(b"alpha\nbeta\ngamma\n", b"alpha\nBETA\ngamma\ndelta\n");
        roundtrip(b"", b"first line\n");
        roundtrip(b"no newline", b"no newline\n");
        roundtrip(b"a\nb\nc\nd\ne\n", b"e\nd\nc\nb\na\n");
    }

    #[test]
    fn test_binary_falls_back_to_whole_replace() {
        let old = [0u8, 159, 146, 150];
        let new = b"now text\n";
        let delta = Delta::compute(&old, new, 1, 2, u64::MAX);
        assert!(matches!(delta.body, DeltaBody::Binary { .. }));
        assert!(delta.stats().binary);
        roundtrip(&old, new);
    }

    #[test]
    fn test_apply_rejects_wrong_base() {
        let delta = Delta::compute(b"a\nb\n", b"a\nc\n", 1, 2, u64::MAX);
        let err = delta.apply(b"a\nz\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let binary = Delta::compute(b"\0old", b"\0new", 1, 2, u64::MAX);
        assert!(binary.apply(b"\0other").is_err());
    }

    #[test]
    fn test_stats_and_kinds() {
        let delta = Delta::compute(b"a\nb\nc\n", b"a\nc\nd\n", 1, 2, u64::MAX);
        let stats = delta.stats();
        assert_eq!((stats.insertions, stats.deletions), (1, 1));
        let DeltaBody::Text { hunks } = &delta.body else {
            panic!("expected text delta");
        };
        assert_eq!(hunks[0].kind(), HunkKind::Delete);
        assert_eq!(hunks[1].kind(), HunkKind::Insert);
    }

    #[test]
    fn test_binary_body_serializes_as_base64() {
        let delta = Delta::compute(b"\0", b"\0\x01", 3, 4, u64::MAX);
        let json = serde_json::to_value(&delta).unwrap();
        assert_eq!(json["body"]["kind"], "binary");
        assert_eq!(json["body"]["old"], "AA==");
        assert_eq!(json["body"]["new"], "AAE=");
        let back: Delta = serde_json::from_value(json).unwrap();
        assert_eq!(back, delta);
    }
}
