//! Keeps the DOS-side AUTOEXEC.BAT in the active code page

use crate::error::AutoExecError;
use crate::vfile::{VirtualFiles, AUTOEXEC_FILE_NAME};
use anyhow::Result;
use tracing::debug;

/// Converts canonical UTF-8 text into a single-byte DOS code page
pub trait CodePageEncoder {
    fn encode(&self, text: &str, code_page: u16) -> Result<Vec<u8>>;
}

/// Fallback converter that only knows the 7-bit ASCII subset shared by all
/// DOS code pages
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiEncoder {
    /// Fail instead of substituting `?` for characters outside ASCII
    pub strict: bool,
}

impl AsciiEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }
}

impl CodePageEncoder for AsciiEncoder {
    fn encode(&self, text: &str, code_page: u16) -> Result<Vec<u8>> {
        if code_page == 0 {
            return Err(AutoExecError::InvalidCodePage { code_page }.into());
        }

        let mut output = Vec::with_capacity(text.len());
        for character in text.chars() {
            if character.is_ascii() {
                output.push(character as u8);
            } else if self.strict {
                return Err(AutoExecError::UnencodableText { code_page }.into());
            } else {
                output.push(b'?');
            }
        }
        Ok(output)
    }
}

/// Generation state: last canonical text, registration flag and the code
/// page used for the last DOS-side conversion
#[derive(Debug, Clone, Default)]
pub struct CodePageSync {
    canonical: String,
    registered: bool,
    code_page: u16,
}

impl CodePageSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert `canonical` for `code_page` and register or refresh the file
    pub fn sync<E, F>(
        &mut self,
        canonical: String,
        code_page: u16,
        encoder: &E,
        files: &mut F,
    ) -> Result<()>
    where
        E: CodePageEncoder + ?Sized,
        F: VirtualFiles + ?Sized,
    {
        let data = encoder.encode(&canonical, code_page)?;

        if self.registered {
            debug!(
                file = AUTOEXEC_FILE_NAME,
                code_page,
                bytes = data.len(),
                "updating virtual file"
            );
            files.update(AUTOEXEC_FILE_NAME, data)?;
        } else {
            debug!(
                file = AUTOEXEC_FILE_NAME,
                code_page,
                bytes = data.len(),
                "registering virtual file"
            );
            files.register(AUTOEXEC_FILE_NAME, data)?;
            self.registered = true;
        }

        self.canonical = canonical;
        self.code_page = code_page;
        Ok(())
    }

    /// Re-encode the last canonical text if the active code page changed
    ///
    /// Returns `true` if the file was regenerated.
    pub fn notify_code_page_changed<E, F>(
        &mut self,
        code_page: u16,
        shutting_down: bool,
        encoder: &E,
        files: &mut F,
    ) -> Result<bool>
    where
        E: CodePageEncoder + ?Sized,
        F: VirtualFiles + ?Sized,
    {
        if shutting_down || !self.registered || code_page == self.code_page {
            return Ok(false);
        }

        debug!(
            from = self.code_page,
            to = code_page,
            "code page changed, re-encoding AUTOEXEC.BAT"
        );
        let canonical = self.canonical.clone();
        self.sync(canonical, code_page, encoder, files)?;
        Ok(true)
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn code_page(&self) -> u16 {
        self.code_page
    }
}
