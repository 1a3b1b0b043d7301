//! Compiles Java sources with a local `javac` into a class directory, so
//! completion from bytecode can be checked against real compiler output.
//!
//! Tests using it are `#[ignore]`d and skip when `javac` is missing.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use nova_classpath::ClasspathEntry;
use tempfile::TempDir;

#[derive(Debug, Clone, Default)]
pub struct JavacOptions {
    /// Maps to `javac --release`.
    pub release: Option<u32>,
    /// Extra classpath entries. The classpath is always set explicitly so
    /// `CLASSPATH` from the environment is never inherited.
    pub classpath: Vec<PathBuf>,
    pub extra_args: Vec<String>,
}

/// Classes written by one `javac` run. The directory lives as long as this
/// value.
#[derive(Debug)]
pub struct CompiledClasses {
    dir: TempDir,
    pub stderr: String,
}

impl CompiledClasses {
    pub fn classes_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn classpath_entry(&self) -> ClasspathEntry {
        ClasspathEntry::ClassDir(self.classes_dir())
    }
}

/// Compiles `files` (relative path, source) and returns the class output.
/// A failed compilation is an `io::Error` carrying javac's stderr.
pub fn compile_classes(files: &[(&str, &str)], opts: &JavacOptions) -> io::Result<CompiledClasses> {
    let dir = TempDir::new()?;
    for (name, source) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, source)?;
    }

    let out_dir = dir.path().join("out");
    std::fs::create_dir_all(&out_dir)?;
    let mut cmd = Command::new("javac");
    cmd.current_dir(dir.path());
    cmd.args(["-encoding", "UTF-8"]);
    if let Some(release) = opts.release {
        cmd.arg("--release");
        cmd.arg(release.to_string());
    }
    cmd.arg("-classpath");
    cmd.arg(join_classpath(dir.path(), &opts.classpath)?);
    cmd.args(&opts.extra_args);
    cmd.arg("-d");
    cmd.arg(&out_dir);
    for (name, _) in files {
        cmd.arg(name);
    }

    let output = cmd.output()?;
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    if !output.status.success() {
        return Err(io::Error::new(io::ErrorKind::Other, format!("javac failed:\n{stderr}")));
    }
    tracing::debug!(target: "nova.test_utils", files = files.len(), "compiled java fixtures");
    Ok(CompiledClasses { dir, stderr })
}

fn join_classpath(base: &Path, extra: &[PathBuf]) -> io::Result<std::ffi::OsString> {
    let mut entries = Vec::with_capacity(1 + extra.len());
    entries.push(base.to_path_buf());
    entries.extend(extra.iter().cloned());
    std::env::join_paths(entries).map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
}

pub fn javac_available() -> bool {
    Command::new("javac")
        .arg("-version")
        .output()
        .is_ok_and(|out| out.status.success())
}

/// Feature release of the local `javac` (8, 11, 17, 21, ...).
pub fn javac_version() -> Option<u32> {
    static VERSION: OnceLock<Option<u32>> = OnceLock::new();
    *VERSION.get_or_init(|| {
        let out = match Command::new("javac").arg("-version").output() {
            Ok(out) if out.status.success() => out,
            Ok(_) => return None,
            Err(err) => {
                tracing::debug!(target: "nova.test_utils", error = %err, "failed to run `javac -version`");
                return None;
            }
        };
        let text = if out.stderr.is_empty() { out.stdout } else { out.stderr };
        parse_javac_version(&String::from_utf8_lossy(&text))
    })
}

fn parse_javac_version(output: &str) -> Option<u32> {
    // `Picked up _JAVA_OPTIONS...` and similar noise may precede the version.
    let version = output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("javac"))
        .map(str::trim_start)
        .find(|rest| !rest.is_empty())?
        .split_whitespace()
        .next()?;

    let mut parts = version.split(['.', '_']);
    let first: String = parts.next()?.chars().take_while(char::is_ascii_digit).collect();
    match first.parse::<u32>().ok()? {
        1 => parts.next()?.parse().ok(),
        feature => Some(feature),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_javac_version;

    #[test]
    fn parses_modern_versions() {
        assert_eq!(parse_javac_version("javac 21.0.9\n"), Some(21));
        assert_eq!(parse_javac_version("javac 21-ea"), Some(21));
    }

    #[test]
    fn parses_legacy_versions() {
        assert_eq!(parse_javac_version("javac 1.8.0_392"), Some(8));
    }

    #[test]
    fn skips_java_options_noise() {
        assert_eq!(
            parse_javac_version("Picked up _JAVA_OPTIONS: -Dfoo=bar\njavac 17.0.2\n"),
            Some(17)
        );
        assert_eq!(parse_javac_version("no compiler here"), None);
    }
}
