//! Automatic mounting of `drives/<letter>` resource directories

use crate::sections::SectionBuffer;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Resource subdirectory holding the per-letter drive directories
pub const DRIVES_DIR: &str = "drives";

/// Locates bundled or user resources
pub trait ResourceResolver {
    fn resource_path(&self, subdir: &str, name: &str) -> PathBuf;
}

/// Resource roots searched in order; the first root containing the
/// resource wins
#[derive(Debug, Clone, Default)]
pub struct ResourceDirs {
    roots: Vec<PathBuf>,
}

impl ResourceDirs {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl ResourceResolver for ResourceDirs {
    fn resource_path(&self, subdir: &str, name: &str) -> PathBuf {
        let candidates = self.roots.iter().map(|root| root.join(subdir).join(name));
        let mut fallback = None;
        for candidate in candidates {
            if candidate.exists() {
                return candidate;
            }
            if fallback.is_none() {
                fallback = Some(candidate);
            }
        }
        fallback.unwrap_or_else(|| Path::new(subdir).join(name))
    }
}

/// Mount settings for one auto-mounted drive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveConf {
    /// Drive letter to mount as, upper case
    pub drive_letter: String,
    /// Extra `MOUNT` arguments, each with a leading space
    pub mount_args: String,
    /// Value for `PATH`, empty if the drive should not change it
    pub path: String,
}

impl DriveConf {
    pub fn for_letter(dir_letter: &str) -> Self {
        Self {
            drive_letter: dir_letter.to_ascii_uppercase(),
            mount_args: String::new(),
            path: String::new(),
        }
    }
}

/// Reads the optional `<letter>.conf` next to a drive directory
pub trait DriveConfParser {
    /// Never fails: problems fall back to the defaults for `dir_letter`
    fn parse(&self, dir_letter: &str, conf_path: &Path) -> DriveConf;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DriveType {
    Dir,
    Floppy,
    Cdrom,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DriveConfFile {
    drive: DriveTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DriveTable {
    #[serde(rename = "type")]
    drive_type: Option<DriveType>,
    label: Option<String>,
    path: Option<String>,
    override_drive: Option<String>,
    readonly: bool,
}

/// `<letter>.conf` files in TOML with a single `[drive]` table
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlDriveConf;

impl TomlDriveConf {
    fn build(dir_letter: &str, table: DriveTable) -> DriveConf {
        let mut conf = DriveConf::for_letter(dir_letter);

        if let Some(letter) = table.override_drive {
            if letter.len() == 1 && letter.chars().all(|c| c.is_ascii_alphabetic()) {
                conf.drive_letter = letter.to_ascii_uppercase();
            } else {
                warn!(
                    drive = dir_letter,
                    override_drive = %letter,
                    "ignoring invalid override_drive"
                );
            }
        }

        match table.drive_type {
            Some(DriveType::Floppy) => conf.mount_args.push_str(" -t floppy"),
            Some(DriveType::Cdrom) => conf.mount_args.push_str(" -t cdrom"),
            Some(DriveType::Dir) | None => {}
        }
        if let Some(label) = table.label.filter(|label| !label.is_empty()) {
            conf.mount_args.push_str(&format!(" -label {label}"));
        }
        if table.readonly {
            conf.mount_args.push_str(" -ro");
        }
        if let Some(path) = table.path {
            conf.path = path;
        }

        conf
    }
}

impl DriveConfParser for TomlDriveConf {
    fn parse(&self, dir_letter: &str, conf_path: &Path) -> DriveConf {
        if !conf_path.is_file() {
            return DriveConf::for_letter(dir_letter);
        }

        let parsed = fs::read_to_string(conf_path)
            .map_err(anyhow::Error::from)
            .and_then(|contents| {
                toml::from_str::<DriveConfFile>(&contents).map_err(anyhow::Error::from)
            });

        match parsed {
            Ok(file) => Self::build(dir_letter, file.drive),
            Err(err) => {
                warn!(
                    conf = %conf_path.display(),
                    error = %err,
                    "unusable drive config, using defaults"
                );
                DriveConf::for_letter(dir_letter)
            }
        }
    }
}

/// Scans `drives/a` .. `drives/z` and emits mount commands for those present
pub struct AutoMounter<'a> {
    resolver: &'a dyn ResourceResolver,
    parser: &'a dyn DriveConfParser,
}

impl<'a> AutoMounter<'a> {
    pub fn new(resolver: &'a dyn ResourceResolver, parser: &'a dyn DriveConfParser) -> Self {
        Self { resolver, parser }
    }

    pub fn scan(&self, sections: &mut SectionBuffer) {
        for letter in 'a'..='z' {
            self.mount_drive(&letter.to_string(), sections);
        }
    }

    /// Mount `drives/<dir_letter>` if it exists, extending PATH if configured
    pub fn mount_drive(&self, dir_letter: &str, sections: &mut SectionBuffer) {
        let drive_path = self.resolver.resource_path(DRIVES_DIR, dir_letter);
        if !drive_path.exists() {
            return;
        }

        let mut conf_path = drive_path.clone().into_os_string();
        conf_path.push(".conf");
        let conf = self.parser.parse(dir_letter, Path::new(&conf_path));

        let mount_path = simplify_path(&drive_path);
        info!(drive = %conf.drive_letter, path = %mount_path.display(), "auto-mounting drive");
        sections.add_command_before(format!(
            "@Z:\\MOUNT.COM {} \"{}\"{}",
            conf.drive_letter,
            mount_path.display(),
            conf.mount_args
        ));

        if !conf.path.is_empty() {
            sections.add_command_before(format!("@SET PATH={}", conf.path));
        }
    }
}

/// Absolute form of `path` without `.`/`..` or symlinks, or `path` itself
/// if it cannot be resolved
fn simplify_path(path: &Path) -> PathBuf {
    match fs::canonicalize(path) {
        Ok(resolved) => strip_verbatim_prefix(resolved),
        Err(_) => path.to_path_buf(),
    }
}

/// `canonicalize` yields `\\?\C:\...` on Windows, which MOUNT cannot parse
#[cfg(windows)]
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    let stripped = path
        .to_str()
        .and_then(|text| text.strip_prefix(r"\\?\"))
        .filter(|rest| !rest.starts_with("UNC"))
        .map(PathBuf::from);
    stripped.unwrap_or(path)
}

#[cfg(not(windows))]
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::Location;
    use tempfile::TempDir;

    fn setup_drives(letters: &[&str]) -> TempDir {
        let root = TempDir::new().unwrap();
        for letter in letters {
            fs::create_dir_all(root.path().join(DRIVES_DIR).join(letter)).unwrap();
        }
        root
    }

    fn drives_dir(root: &TempDir) -> PathBuf {
        simplify_path(root.path()).join(DRIVES_DIR)
    }

    fn scan(root: &TempDir) -> SectionBuffer {
        let resolver = ResourceDirs::new(vec![root.path().to_path_buf()]);
        let mut sections = SectionBuffer::new();
        AutoMounter::new(&resolver, &TomlDriveConf).scan(&mut sections);
        sections
    }

    #[test]
    fn test_scan_in_letter_order() {
        let root = setup_drives(&["d", "c"]);
        let sections = scan(&root);
        let drives = drives_dir(&root);

        assert_eq!(
            sections.lines(Location::Before),
            [
                format!("@Z:\\MOUNT.COM C \"{}\"", drives.join("c").display()),
                format!("@Z:\\MOUNT.COM D \"{}\"", drives.join("d").display()),
            ]
        );
    }

    #[test]
    fn test_no_drives() {
        let root = TempDir::new().unwrap();
        assert!(scan(&root).is_empty());
    }

    #[test]
    fn test_drive_conf_applied() {
        let root = setup_drives(&["e"]);
        let drives = drives_dir(&root);
        fs::write(
            drives.join("e.conf"),
            "[drive]\ntype = \"cdrom\"\nlabel = \"GAMES\"\n\
             path = \"E:\\\\BIN;Z:\\\\\"\noverride_drive = \"g\"\nreadonly = true\n",
        )
        .unwrap();

        let sections = scan(&root);
        assert_eq!(
            sections.lines(Location::Before),
            [
                format!(
                    "@Z:\\MOUNT.COM G \"{}\" -t cdrom -label GAMES -ro",
                    drives_dir(&root).join("e").display()
                ),
                "@SET PATH=E:\\BIN;Z:\\".to_string(),
            ]
        );
    }

    #[test]
    fn test_broken_conf_falls_back_to_defaults() {
        let root = setup_drives(&["f"]);
        let drives = drives_dir(&root);
        fs::write(drives.join("f.conf"), "[drive\ntype = ").unwrap();

        let sections = scan(&root);
        assert_eq!(
            sections.lines(Location::Before),
            [format!("@Z:\\MOUNT.COM F \"{}\"", drives.join("f").display())]
        );
    }

    #[test]
    fn test_mount_path_is_simplified() {
        let root = setup_drives(&["c"]);
        fs::create_dir(root.path().join("sub")).unwrap();
        let unsimplified = root.path().join("sub").join("..").join(".");
        let resolver = ResourceDirs::new(vec![unsimplified]);
        let mut sections = SectionBuffer::new();
        AutoMounter::new(&resolver, &TomlDriveConf).scan(&mut sections);

        assert_eq!(
            sections.lines(Location::Before),
            [format!("@Z:\\MOUNT.COM C \"{}\"", drives_dir(&root).join("c").display())]
        );
    }

    #[test]
    fn test_unresolvable_path_kept_as_is() {
        let missing = Path::new("no-such-dir").join("drives").join("c");
        assert_eq!(simplify_path(&missing), missing);
    }

    #[test]
    fn test_invalid_override_ignored() {
        let conf = TomlDriveConf::build(
            "c",
            DriveTable {
                override_drive: Some("cd".into()),
                ..DriveTable::default()
            },
        );
        assert_eq!(conf, DriveConf::for_letter("c"));
    }

    #[test]
    fn test_resource_dirs_first_existing_root() {
        let empty = TempDir::new().unwrap();
        let full = setup_drives(&["c"]);
        let resolver =
            ResourceDirs::new(vec![empty.path().to_path_buf(), full.path().to_path_buf()]);

        assert_eq!(
            resolver.resource_path(DRIVES_DIR, "c"),
            full.path().join(DRIVES_DIR).join("c")
        );
        assert_eq!(
            resolver.resource_path(DRIVES_DIR, "x"),
            empty.path().join(DRIVES_DIR).join("x")
        );
    }
}
