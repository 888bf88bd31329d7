//! Typed errors callers may want to match on

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutoExecError {
    /// `initialize` may only run once per context.
    #[error("AUTOEXEC.BAT generation was already initialized")]
    AlreadyInitialized,

    /// The code page identifier is not known to the encoder.
    #[error("unsupported code page: {code_page}")]
    InvalidCodePage {
        /// The rejected identifier.
        code_page: u16,
    },

    /// The text could not be converted without loss.
    #[error("text cannot be represented in code page {code_page}")]
    UnencodableText {
        /// The target code page.
        code_page: u16,
    },
}
