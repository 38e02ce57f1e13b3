// SPDX-License-Identifier: MIT

use crate::data::PanicContextData;

/// Render the initial `panic_context.md` written by `repo_setup`: fixed
/// section headers followed by a single fenced JSON block carrying the
/// three fields known at creation time.
pub fn generate_initial(panic_location: &str, panic_message: &str, sql_statements: &[String], tcl_test_file: &str) -> String {
    let data = PanicContextData {
        panic_location: Some(panic_location.to_string()),
        panic_message: Some(panic_message.to_string()),
        tcl_test_file: Some(tcl_test_file.to_string()),
        ..Default::default()
    };
    // unwrap: PanicContextData serializes infallibly (no maps with non-string keys, no floats)
    #[allow(clippy::expect_used)]
    let json = serde_json::to_string_pretty(&data).expect("PanicContextData always serializes");

    let sql_block = if sql_statements.is_empty() {
        "(none)".to_string()
    } else {
        sql_statements.iter().map(|s| format!("- `{s}`")).collect::<Vec<_>>().join("\n")
    };

    format!(
        "# Panic Info\n\n\
         - **Location:** {panic_location}\n\
         - **Message:** {panic_message}\n\n\
         # SQL Statements\n\n\
         {sql_block}\n\n\
         # Reproducer Notes\n\n\
         _(filled in by the reproducer agent)_\n\n\
         # Fixer Notes\n\n\
         _(filled in by the fixer agent)_\n\n\
         ```json\n{json}\n```\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    #[test]
    fn generated_document_has_all_four_sections() {
        let doc = generate_initial("loc", "msg", &["SELECT 1;".to_string()], "test/x.test");
        for heading in ["# Panic Info", "# SQL Statements", "# Reproducer Notes", "# Fixer Notes"] {
            assert!(doc.contains(heading), "missing section: {heading}");
        }
    }

    #[test]
    fn generated_document_parses_back_to_initial_fields() {
        let doc = generate_initial("src/vdbe.c:1234", "assertion failed", &["CREATE TABLE t1(a INTEGER);".to_string()], "test/panic-src-vdbe-c-1234.test");
        let data = parse(&doc).unwrap();
        assert_eq!(data.panic_location.as_deref(), Some("src/vdbe.c:1234"));
        assert_eq!(data.panic_message.as_deref(), Some("assertion failed"));
        assert_eq!(data.tcl_test_file.as_deref(), Some("test/panic-src-vdbe-c-1234.test"));
        assert!(data.failing_seed.is_none());
    }

    #[test]
    fn empty_sql_statements_renders_placeholder() {
        let doc = generate_initial("loc", "msg", &[], "test/x.test");
        assert!(doc.contains("(none)"));
    }
}
