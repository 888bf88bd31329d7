//! Generated AUTOEXEC.BAT: owns all generation state and exposes the
//! operations the rest of the emulator calls

use crate::codepage::{CodePageEncoder, CodePageSync};
use crate::config::{AutoexecMode, Config};
use crate::drives::AutoMounter;
use crate::encoder::Encoder;
use crate::error::AutoExecError;
use crate::launch::{LaunchArgs, LaunchInterpreter, LaunchOutcome};
use crate::messages::Messages;
use crate::sections::SectionBuffer;
use crate::variables::VariableRegistry;
use crate::vfile::VirtualFiles;
use anyhow::Result;
use tracing::info;

/// Live environment of an already running command shell
pub trait ShellEnvironment {
    fn set_env(&mut self, name: &str, value: &str);
}

/// Everything `initialize` reads to populate the script
pub struct Startup<'a> {
    pub config: &'a Config,
    pub args: &'a LaunchArgs,
    pub interpreter: &'a LaunchInterpreter,
    pub mounter: &'a AutoMounter<'a>,
}

/// AUTOEXEC.BAT generator state
pub struct AutoExec<E, F> {
    sections: SectionBuffer,
    variables: VariableRegistry,
    echo_off: bool,
    state: CodePageSync,
    renderer: Encoder,
    encoder: E,
    files: F,
    code_page: u16,
    shell: Option<Box<dyn ShellEnvironment>>,
    initialized: bool,
    shutdown_requested: bool,
}

impl<E: CodePageEncoder, F: VirtualFiles> AutoExec<E, F> {
    /// Create an empty generator for the given active code page
    pub fn new(encoder: E, files: F, code_page: u16) -> Self {
        Self::with_messages(encoder, files, code_page, &Messages::new())
    }

    pub fn with_messages(encoder: E, files: F, code_page: u16, messages: &Messages) -> Self {
        Self {
            sections: SectionBuffer::new(),
            variables: VariableRegistry::new(),
            echo_off: false,
            state: CodePageSync::new(),
            renderer: Encoder::with_messages(messages),
            encoder,
            files,
            code_page,
            shell: None,
            initialized: false,
            shutdown_requested: false,
        }
    }

    /// Build the script from configuration and launch arguments, then
    /// register `AUTOEXEC.BAT`
    pub fn initialize(&mut self, startup: &Startup<'_>) -> Result<LaunchOutcome> {
        if self.initialized {
            return Err(AutoExecError::AlreadyInitialized.into());
        }
        self.initialized = true;

        let config = startup.config;
        let args = startup.args;

        // Auto-mount drives (except for Z:) prior to [autoexec]
        if config.automount {
            startup.mounter.scan(&mut self.sections);
        }

        let outcome = startup.interpreter.interpret(args, &mut self.sections);

        if !args.noautoexec {
            match config.autoexec_section {
                AutoexecMode::Join => {
                    let joined = config.joined_autoexec();
                    self.process_config_section(&joined, "one or more joined sections");
                }
                AutoexecMode::Overwrite if outcome.dispatched => {
                    info!("AUTOEXEC: Using commands provided on the command line");
                }
                AutoexecMode::Overwrite => {
                    if let Some(section) = config.overwritten_autoexec() {
                        self.process_config_section(&section.text, &section.source);
                    }
                }
            }
        }

        self.register_file()?;
        Ok(outcome)
    }

    fn process_config_section(&mut self, text: &str, source: &str) {
        if text.is_empty() {
            return;
        }

        info!("AUTOEXEC: Using autoexec from {}", source);

        let mut lines = text
            .lines()
            .map(|line| line.trim_matches(|c: char| c.is_ascii_whitespace()));

        // A leading 'echo off' is replaced with the generated one
        if let Some(first) = lines.next() {
            if is_echo_off(first) {
                self.echo_off = true;
            } else {
                self.sections.add_autoexec_line(first);
            }
        }

        for line in lines {
            self.sections.add_autoexec_line(line);
        }
    }

    /// Set (or, with an empty value, remove) a variable exported at the top
    /// of the script, then regenerate the file
    ///
    /// # Panics
    ///
    /// In debug builds, if `name` or `value` is not printable ASCII.
    pub fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        #[cfg(debug_assertions)]
        {
            if !crate::variables::is_printable_ascii(name) {
                panic!("AUTOEXEC: Variable name is not a printable ASCII");
            }
            if !crate::variables::is_printable_ascii(value) {
                panic!("AUTOEXEC: Variable value is not a printable ASCII");
            }
        }

        let name = self.variables.set(name, value);

        if let Some(shell) = self.shell.as_mut() {
            shell.set_env(&name, value);
        }

        self.register_file()
    }

    /// Re-render the script and register or refresh `AUTOEXEC.BAT`
    pub fn register_file(&mut self) -> Result<()> {
        let canonical = self.render();
        self.state
            .sync(canonical, self.code_page, &self.encoder, &mut self.files)
    }

    /// Record the newly active code page and re-encode the file if needed
    ///
    /// Returns `true` if the DOS-side file was regenerated.
    pub fn notify_code_page_changed(&mut self, code_page: u16) -> Result<bool> {
        self.code_page = code_page;
        self.state.notify_code_page_changed(
            code_page,
            self.shutdown_requested,
            &self.encoder,
            &mut self.files,
        )
    }

    /// Canonical text for the current sections, variables and echo-off flag
    pub fn render(&self) -> String {
        self.renderer
            .render(&self.sections, &self.variables, self.echo_off)
    }

    /// Mark the command shell as running; variables are forwarded to it
    pub fn attach_shell(&mut self, shell: Box<dyn ShellEnvironment>) {
        self.shell = Some(shell);
    }

    pub fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
    }

    pub fn sections(&self) -> &SectionBuffer {
        &self.sections
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    pub fn echo_off(&self) -> bool {
        self.echo_off
    }

    /// Canonical text as last registered
    pub fn canonical(&self) -> &str {
        self.state.canonical()
    }

    /// Code page used for the registered file
    pub fn file_code_page(&self) -> u16 {
        self.state.code_page()
    }

    pub fn is_registered(&self) -> bool {
        self.state.is_registered()
    }

    pub fn files(&self) -> &F {
        &self.files
    }
}

/// `echo off` with an optional `@`, any case, ASCII whitespace in between
pub fn is_echo_off(line: &str) -> bool {
    let command = line.strip_prefix('@').unwrap_or(line);
    if command.len() < 8 {
        return false;
    }

    let command = command.to_ascii_lowercase();
    if !command.starts_with("echo") || !command.ends_with("off") {
        return false;
    }

    command[4..command.len() - 3]
        .chars()
        .all(|c| c.is_ascii_whitespace())
}
