//! dos-autoexec CLI
//!
//! Print the AUTOEXEC.BAT that would be generated for a given set of
//! config files and launch arguments.

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use dos_autoexec::variables::is_printable_ascii;
use dos_autoexec::{
    AsciiEncoder, AutoExec, AutoMounter, Config, LaunchArgs, LaunchInterpreter, MemoryFiles,
    ResourceDirs, Startup, TomlDriveConf, AUTOEXEC_FILE_NAME,
};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "dos-autoexec")]
#[command(version)]
#[command(about = "Generate AUTOEXEC.BAT from configuration and launch arguments")]
struct Cli {
    /// Directory, batch file, disk image or command to launch
    targets: Vec<String>,

    /// Command to run before the [autoexec] section (repeatable)
    #[arg(short = 'c', value_name = "COMMAND")]
    commands: Vec<String>,

    /// Exit once AUTOEXEC.BAT has finished
    #[arg(long)]
    exit: bool,

    /// Disable MOUNT, IMGMOUNT and BOOT after AUTOEXEC.BAT has run
    #[arg(long)]
    securemode: bool,

    /// Ignore the [autoexec] section(s)
    #[arg(long)]
    noautoexec: bool,

    /// Start the launch target without any interaction
    #[arg(long)]
    instant_launch: bool,

    /// Config file to load, later files take precedence (repeatable)
    #[arg(long = "conf", value_name = "FILE")]
    configs: Vec<PathBuf>,

    /// Resource directory searched for drives/<letter> (repeatable)
    #[arg(long = "resources", value_name = "DIR")]
    resource_dirs: Vec<PathBuf>,

    /// Environment variable to export, as NAME=VALUE (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    variables: Vec<String>,

    /// DOS code page of the generated file
    #[arg(long, default_value_t = 437)]
    code_page: u16,

    /// Write the file here instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Print the canonical UTF-8 text instead of the code page bytes
    #[arg(long)]
    utf8: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load(&cli.configs)?;

    let args = LaunchArgs {
        commands: cli.commands,
        exit: cli.exit,
        securemode: cli.securemode,
        noautoexec: cli.noautoexec,
        instant_launch: cli.instant_launch,
        positionals: cli.targets,
    };

    let resource_dirs = if cli.resource_dirs.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.resource_dirs
    };
    let resolver = ResourceDirs::new(resource_dirs);
    let mounter = AutoMounter::new(&resolver, &TomlDriveConf);
    let interpreter = LaunchInterpreter::new()?;

    let mut autoexec = AutoExec::new(AsciiEncoder::new(), MemoryFiles::new(), cli.code_page);
    for assignment in &cli.variables {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected NAME=VALUE, got: {}", assignment))?;
        if !is_printable_ascii(name) || !is_printable_ascii(value) {
            bail!("Variable must be printable ASCII: {}", assignment);
        }
        autoexec.set_variable(name, value)?;
    }

    autoexec.initialize(&Startup {
        config: &config,
        args: &args,
        interpreter: &interpreter,
        mounter: &mounter,
    })?;

    let content = if cli.utf8 {
        autoexec.canonical().as_bytes().to_vec()
    } else {
        autoexec
            .files()
            .get(AUTOEXEC_FILE_NAME)
            .ok_or_else(|| anyhow!("{} was not registered", AUTOEXEC_FILE_NAME))?
            .to_vec()
    };

    if let Some(output_path) = cli.output {
        fs::write(&output_path, &content)
            .with_context(|| format!("Failed to write: {}", output_path.display()))?;
    } else {
        io::stdout().write_all(&content)?;
    }

    Ok(())
}
