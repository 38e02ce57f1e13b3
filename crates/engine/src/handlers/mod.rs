// SPDX-License-Identifier: MIT

//! One handler module per workflow phase (§4.E). Each handler is a pure
//! async function of a [`HandlerContext`](crate::types::HandlerContext) to
//! a [`HandlerOutcome`](crate::types::HandlerOutcome) — no handler ever
//! returns `Err`; every internal failure is folded into an escalating
//! outcome by the handler itself (§7).

pub mod fixing;
pub mod preflight;
pub mod repo_setup;
pub mod reproducing;
pub mod shipping;

/// Shared helper: write `content` to `path` inside the session via a
/// quoted heredoc. The path is embedded in a single-quoted shell argument
/// and escaped accordingly; the heredoc body itself, bounded by the quoted
/// delimiter `ENDXX`, is never expanded by the shell.
pub(crate) fn heredoc_write_cmd(path: &str, content: &str) -> String {
    let escaped_path = bf_core::escape::escape_single_quoted(path);
    format!("cat > '{escaped_path}' << 'ENDXX'\n{content}\nENDXX\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heredoc_escapes_single_quotes_in_path_only() {
        let cmd = heredoc_write_cmd("test/it's.test", "body with 'quotes'");
        assert!(cmd.contains("'test/it'\\''s.test'"));
        assert!(cmd.contains("body with 'quotes'"));
    }
}
