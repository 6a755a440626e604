//! Errors raised by the maze library.
//!
//! `error_chain!` creates the `Error`, `ErrorKind`, `ResultExt` and `Result` types.
//! `Result` is a typedef of std `Result` with our own `Error` as the error type.
#![allow(deprecated)]

use error_chain::error_chain;

error_chain! {
    errors {
        /// Both grid dimensions have to be greater than zero.
        InvalidDimensions(rows: usize, columns: usize) {
            description("invalid maze dimensions")
            display("maze dimensions must be greater than zero, got {} rows by {} columns",
                    rows, columns)
        }
    }
}
