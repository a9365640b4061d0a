//! Pure formatting functions for run output.
//!
//! Nothing here touches the filesystem; the caller decides where the text goes.

/// Collapsible markdown block wrapping a git diff
pub fn diff_details(diff: &str) -> String {
    let mut block = String::from("<details><summary>Git Diff</summary>\n\n```diff\n");
    block.push_str(diff);
    if !diff.is_empty() && !diff.ends_with('\n') {
        block.push('\n');
    }
    block.push_str("```\n\n</details>\n");
    block
}

/// A `name=value` line for the step output file.
///
/// Multi-line values use the heredoc form the runner expects.
pub fn output_entry(name: &str, value: &str) -> String {
    if value.contains('\n') {
        let delimiter = format!("ghadelimiter_{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default());
        format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
    } else {
        format!("{}={}\n", name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_details_wraps_diff() {
        let block = diff_details("-a\n+b\n");
        assert_eq!(
            block,
            "<details><summary>Git Diff</summary>\n\n```diff\n-a\n+b\n```\n\n</details>\n"
        );
    }

    #[test]
    fn test_diff_details_adds_missing_newline() {
        assert!(diff_details("+b").contains("+b\n```"));
    }

    #[test]
    fn test_single_line_output() {
        assert_eq!(output_entry("GHA_UPDATE_PR_NUMBER", "42"), "GHA_UPDATE_PR_NUMBER=42\n");
    }

    #[test]
    fn test_multi_line_output_uses_delimiter() {
        let entry = output_entry("BODY", "a\nb");
        let first_line = entry.lines().next().unwrap();
        assert!(first_line.starts_with("BODY<<ghadelimiter_"));
        let delimiter = first_line.trim_start_matches("BODY<<");
        assert!(entry.ends_with(&format!("a\nb\n{}\n", delimiter)));
    }
}
