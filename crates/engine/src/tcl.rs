// SPDX-License-Identifier: MIT

//! Synthesizes the TCL regression test that reproduces a panic from its
//! reported SQL statements, in the `execsql {...} {...}` idiom shared by
//! the target program's existing test suite.

/// One `execsql { <stmt> } {}` line per non-empty trimmed SQL statement,
/// each asserting empty expected output — the point of this test is that
/// the target program crashes before any output could be compared.
pub fn generate_tcl_test(panic_location: &str, sql_statements: &[String]) -> String {
    let body: String = sql_statements
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| format!("execsql {{{s}}} {{}}\n"))
        .collect();

    format!(
        "# Reproduces the crash reported at {panic_location}.\n\
         # Generated by the bug-remediation orchestrator; do not hand-edit.\n\n\
         {body}\n\
         finish_test\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_execsql_line_per_nonempty_statement() {
        let tcl = generate_tcl_test(
            "src/vdbe.c:1234",
            &["CREATE TABLE t1(a INTEGER);".to_string(), "  ".to_string(), "SELECT * FROM t1;".to_string()],
        );
        assert_eq!(tcl.matches("execsql").count(), 2);
        assert!(tcl.contains("execsql {CREATE TABLE t1(a INTEGER);} {}"));
        assert!(tcl.contains("execsql {SELECT * FROM t1;} {}"));
    }

    #[test]
    fn trims_each_statement() {
        let tcl = generate_tcl_test("loc", &["   SELECT 1;   ".to_string()]);
        assert!(tcl.contains("execsql {SELECT 1;} {}"));
    }

    #[test]
    fn ends_with_finish_test() {
        let tcl = generate_tcl_test("loc", &["SELECT 1;".to_string()]);
        assert!(tcl.trim_end().ends_with("finish_test"));
    }

    #[test]
    fn empty_sql_statements_still_produces_a_valid_file() {
        let tcl = generate_tcl_test("loc", &[]);
        assert!(!tcl.contains("execsql"));
        assert!(tcl.contains("finish_test"));
    }
}
