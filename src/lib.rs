//! # dos-autoexec
//!
//! Generated `AUTOEXEC.BAT` for a DOS-compatible runtime environment.
//!
//! The script is assembled once at startup from three sources and exposed
//! on the emulated `Z:` drive as if the user had written it:
//!
//! - environment variables set by other parts of the emulator
//! - the `[autoexec]` section(s) of the configuration file(s)
//! - commands derived from how the emulator was launched (target
//!   directory, batch file, boot image, CD images, `-c` commands) and from
//!   the auto-mounted `drives/<letter>` directories
//!
//! ## Layout
//!
//! ```text
//! :: autogenerated
//!
//! @ECHO OFF
//!
//! @SET BLASTER=A220 I7 D1 H5 T6
//!
//! @Z:\MOUNT.COM C "games"
//! @C:
//!
//! :: from [autoexec] section
//!
//! keen4e.exe
//!
//! :: autogenerated
//!
//! @EXIT
//! ```
//!
//! Lines end with CR+LF. Autogenerated commands always come before and
//! after the configuration content; a header comment is only printed when
//! the origin of the lines changes.
//!
//! ## Code pages
//!
//! The script is kept internally as UTF-8 and converted to the active DOS
//! code page through a [`CodePageEncoder`]. The converted file is cached
//! and only regenerated when
//! [`AutoExec::notify_code_page_changed`] reports a different code page.

pub mod autoexec;
pub mod codepage;
pub mod config;
pub mod drives;
pub mod encoder;
pub mod error;
pub mod launch;
pub mod messages;
pub mod sections;
pub mod variables;
pub mod vfile;

pub use autoexec::{is_echo_off, AutoExec, ShellEnvironment, Startup};
pub use codepage::{AsciiEncoder, CodePageEncoder, CodePageSync};
pub use config::{AutoexecMode, AutoexecSection, Config};
pub use drives::{
    AutoMounter, DriveConf, DriveConfParser, ResourceDirs, ResourceResolver, TomlDriveConf,
};
pub use encoder::Encoder;
pub use error::AutoExecError;
pub use launch::{LaunchArgs, LaunchInterpreter, LaunchOutcome, LaunchTarget};
pub use messages::Messages;
pub use sections::{Location, Provenance, SectionBuffer};
pub use variables::VariableRegistry;
pub use vfile::{MemoryFiles, VirtualFiles, AUTOEXEC_FILE_NAME};
