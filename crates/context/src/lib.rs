// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The `panic_context.md` protocol: a markdown document carrying a single
//! fenced JSON block that accumulates fields as a panic moves through the
//! workflow's phases.

mod data;
mod error;
mod generate;
mod parse;

pub use data::{PanicContextData, ValidationPhase};
pub use error::ContextError;
pub use generate::generate_initial;
pub use parse::{extract_fence, parse, parse_and_validate};

#[cfg(test)]
mod roundtrip_proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// For any location/message/tcl_test_file triple, generating the
        /// initial document and parsing it back yields those same three
        /// core fields verbatim.
        #[test]
        fn generate_then_parse_round_trips_core_fields(
            location in "[a-zA-Z0-9/_.:-]{1,40}",
            message in "[a-zA-Z0-9 ,._-]{1,80}",
            tcl_test_file in "[a-zA-Z0-9/_.-]{1,60}",
        ) {
            let doc = generate_initial(&location, &message, &[], &tcl_test_file);
            let data = parse(&doc).unwrap();
            prop_assert_eq!(data.panic_location.as_deref(), Some(location.as_str()));
            prop_assert_eq!(data.panic_message.as_deref(), Some(message.as_str()));
            prop_assert_eq!(data.tcl_test_file.as_deref(), Some(tcl_test_file.as_str()));
        }
    }
}
