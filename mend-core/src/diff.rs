//! Positional line diff.
//!
//! Pairs line *i* of the original against line *i* of the fixed text and
//! reports the differing pairs. Lines beyond the shorter sequence are not
//! compared - this is a deliberate precision limit of the reference
//! behavior, not a full alignment algorithm.

/// Sentinel returned when every compared line pair matches.
pub const NO_CHANGES: &str = "No changes";

/// Generate a line-by-line description of changes.
///
/// An empty original returns the fixed text verbatim (there is nothing to
/// compare against). Differing pairs are reported as:
///
/// ```text
/// Line N:
/// - <old>
/// + <new>
/// ```
pub fn generate(original: &str, fixed: &str) -> String {
    if original.is_empty() {
        return fixed.to_string();
    }

    let mut diff = Vec::new();
    for (i, (old, new)) in original.lines().zip(fixed.lines()).enumerate() {
        if old != new {
            diff.push(format!("Line {}:", i + 1));
            diff.push(format!("- {old}"));
            diff.push(format!("+ {new}"));
        }
    }

    if diff.is_empty() {
        NO_CHANGES.to_string()
    } else {
        diff.join("\n")
    }
}
