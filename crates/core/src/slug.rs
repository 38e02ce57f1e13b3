// SPDX-License-Identifier: MIT

//! Deterministic slug transform for panic locations.
//!
//! Used to derive session names, branch suffixes, and TCL test filenames
//! from a `panic_location` such as `src/vdbe.c:1234`.

/// Lowercase, collapse runs of non-`[a-z0-9]` into a single `-`, trim
/// leading/trailing `-`.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut last_was_dash = false;
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_dash = false;
        } else if !last_was_dash {
            out.push('-');
            last_was_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

/// `fix/panic-<slug>` branch name for a panic location.
pub fn branch_name(panic_location: &str) -> String {
    format!("fix/panic-{}", slugify(panic_location))
}

/// `test/panic-<slug>.test` TCL test file path for a panic location.
pub fn tcl_test_path(panic_location: &str) -> String {
    format!("test/panic-{}.test", slugify(panic_location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("src/vdbe.c:1234"), "src-vdbe-c-1234");
    }

    #[test]
    fn slugify_lowercases() {
        assert_eq!(slugify("SRC/VDBE.C"), "src-vdbe-c");
    }

    #[test]
    fn slugify_collapses_runs() {
        assert_eq!(slugify("a///b   c"), "a-b-c");
    }

    #[test]
    fn slugify_trims_leading_trailing_dashes() {
        assert_eq!(slugify("///a///"), "a");
    }

    #[test]
    fn slugify_empty_input() {
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn slugify_all_punctuation() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn branch_name_format() {
        assert_eq!(branch_name("src/vdbe.c:1234"), "fix/panic-src-vdbe-c-1234");
    }

    #[test]
    fn tcl_test_path_format() {
        assert_eq!(tcl_test_path("src/vdbe.c:1234"), "test/panic-src-vdbe-c-1234.test");
    }

    proptest! {
        #[test]
        fn slugify_is_idempotent(s in ".{0,64}") {
            let once = slugify(&s);
            let twice = slugify(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn slugify_output_charset(s in ".{0,64}") {
            let slug = slugify(&s);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
        }
    }
}
