//! Launch-argument interpreter
//!
//! Turns the way the emulator was started (inline `-c` commands, a target
//! directory, batch file, boot image, CD images or a raw command) into
//! commands placed around the `[autoexec]` content.
//!
//! Positional arguments are matched in priority order, first match wins:
//!
//! 1. an existing directory is mounted as `C:` and made current
//! 2. a `.BAT` file is run with `CALL`
//! 3. a `.IMG`/`.IMA` floppy image is booted
//! 4. `.ISO`/`.CUE` images are collected and scanning continues
//! 5. anything else is run as a command
//!
//! Collected CD images are mounted as `D:` right before whatever is
//! dispatched, or at the end if nothing was.

use crate::sections::SectionBuffer;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const COMMAND_SECURE_MODE: &str = "@Z:\\CONFIG.COM -securemode";
pub const COMMAND_EXIT: &str = "@EXIT";
pub const COMMAND_SWITCH_TO_C: &str = "@C:";

const QUOTE: &str = "\"";

/// Launch switches and positional arguments relevant to AUTOEXEC.BAT
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArgs {
    /// Values of the repeatable `-c` switch, in command-line order
    pub commands: Vec<String>,
    /// `-exit`: quit once AUTOEXEC.BAT finishes
    pub exit: bool,
    /// `-securemode`: disable mounting once AUTOEXEC.BAT finishes
    pub securemode: bool,
    /// `-noautoexec`: skip the `[autoexec]` section(s)
    pub noautoexec: bool,
    /// Startup runs the target program without any interaction
    pub instant_launch: bool,
    /// Executable, directory, image or command arguments
    pub positionals: Vec<String>,
}

impl LaunchArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the command line names something to launch
    pub fn has_executable_name(&self) -> bool {
        !self.positionals.is_empty()
    }
}

/// Result of interpreting the launch arguments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchOutcome {
    /// A positional argument was dispatched (directory, batch, boot image
    /// or command)
    pub dispatched: bool,
    /// `@EXIT` was appended to the generated commands
    pub exit_added: bool,
}

/// What a positional argument refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    Directory,
    BatchFile,
    BootImage,
    CdImage,
    Command,
}

pub struct LaunchInterpreter {
    working_dir: PathBuf,
}

impl LaunchInterpreter {
    /// Resolve relative directories against the process working directory
    pub fn new() -> Result<Self> {
        let working_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self { working_dir })
    }

    pub fn with_working_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Classify a positional argument, checks evaluated in priority order
    pub fn classify(&self, argument: &str) -> LaunchTarget {
        let path = Path::new(argument);
        if path.is_dir() || self.working_dir.join(path).is_dir() {
            return LaunchTarget::Directory;
        }

        let upper = argument.to_ascii_uppercase();
        if upper.ends_with(".BAT") {
            LaunchTarget::BatchFile
        } else if upper.ends_with(".IMG") || upper.ends_with(".IMA") {
            LaunchTarget::BootImage
        } else if upper.ends_with(".ISO") || upper.ends_with(".CUE") {
            LaunchTarget::CdImage
        } else {
            LaunchTarget::Command
        }
    }

    /// Place the commands derived from `args` into `sections`
    pub fn interpret(&self, args: &LaunchArgs, sections: &mut SectionBuffer) -> LaunchOutcome {
        let exit_call_exists = queue_inline_commands(args, sections);

        let should_add_exit = exit_call_exists
            || args.exit
            || (args.instant_launch && args.has_executable_name());

        let mut cdrom_images = String::new();
        let mut dispatched = false;

        for argument in &args.positionals {
            let target = self.classify(argument);
            debug!(argument = %argument, ?target, "launch argument");

            match target {
                LaunchTarget::Directory => {
                    mount_cdrom_images(sections, &cdrom_images);
                    sections
                        .add_command_before(format!("@Z:\\MOUNT.COM C {QUOTE}{argument}{QUOTE}"));
                    sections.add_command_before(COMMAND_SWITCH_TO_C);
                    if args.securemode {
                        sections.add_command_before(COMMAND_SECURE_MODE);
                    }
                }
                LaunchTarget::BatchFile => {
                    mount_cdrom_images(sections, &cdrom_images);
                    if args.securemode {
                        sections.add_command_before(COMMAND_SECURE_MODE);
                    }
                    // Without CALL the trailing @EXIT would never run
                    sections.add_command_before(format!("CALL {argument}"));
                }
                LaunchTarget::BootImage => {
                    mount_cdrom_images(sections, &cdrom_images);
                    // Secure mode disables BOOT, so it is never added here
                    sections.add_command_before(format!("BOOT {QUOTE}{argument}{QUOTE}"));
                }
                LaunchTarget::CdImage => {
                    if !cdrom_images.is_empty() {
                        cdrom_images.push(' ');
                    }
                    cdrom_images.push_str(&format!("{QUOTE}{argument}{QUOTE}"));
                    continue;
                }
                LaunchTarget::Command => {
                    mount_cdrom_images(sections, &cdrom_images);
                    if args.securemode {
                        sections.add_command_before(COMMAND_SECURE_MODE);
                    }
                    sections.add_command_before(argument.clone());
                }
            }

            dispatched = true;
            break;
        }

        if !dispatched {
            mount_cdrom_images(sections, &cdrom_images);
            // Nothing launched: seal the configuration after [autoexec]
            if args.securemode {
                sections.add_command_after(COMMAND_SECURE_MODE);
            }
        }

        if should_add_exit {
            sections.add_command_after(COMMAND_EXIT);
        }

        LaunchOutcome {
            dispatched,
            exit_added: should_add_exit,
        }
    }
}

/// Queue the `-c` commands; returns true if one of them was `exit`
fn queue_inline_commands(args: &LaunchArgs, sections: &mut SectionBuffer) -> bool {
    let mut exit_call_exists = false;

    for command in &args.commands {
        let command = normalize_quotes(command);

        // Stored instead of queued, otherwise it would run before [autoexec]
        if command == "exit" || command == "\"exit\"" {
            exit_call_exists = true;
            continue;
        }
        sections.add_command_before(command);
    }

    exit_call_exists
}

/// Windows shells cannot easily pass double quotes, so single quotes stand in
#[cfg(windows)]
fn normalize_quotes(command: &str) -> String {
    command.replace('\'', "\"")
}

#[cfg(not(windows))]
fn normalize_quotes(command: &str) -> String {
    command.to_string()
}

fn mount_cdrom_images(sections: &mut SectionBuffer, targets: &str) {
    if targets.is_empty() {
        return;
    }
    sections.add_command_before(format!("@Z:\\IMGMOUNT.COM D {targets} -t iso"));
}
