use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// RAII guard for test .netrc files
///
/// Creates a temporary home directory containing a `.netrc` file with the
/// given content. The directory and file are removed when the guard is
/// dropped. Credential stores under test should be pointed at
/// [`NetrcGuard::home_dir`] instead of the real home directory.
pub struct NetrcGuard {
  temp_dir: TempDir,
  netrc_path: PathBuf,
}

impl NetrcGuard {
  /// Create a new NetrcGuard with the given content
  pub fn new(content: &str) -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let netrc_path = temp_dir.path().join(".netrc");

    let mut file = fs::File::create(&netrc_path).expect("Failed to create test .netrc");
    file.write_all(content.as_bytes()).expect("Failed to write test .netrc");

    Self { temp_dir, netrc_path }
  }

  /// Create a guard whose home directory has no `.netrc` file at all
  pub fn empty_home() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let netrc_path = temp_dir.path().join(".netrc");
    Self { temp_dir, netrc_path }
  }

  /// Get the path to the .netrc file
  pub fn netrc_path(&self) -> &Path {
    &self.netrc_path
  }

  /// Get the path to the temporary home directory
  pub fn home_dir(&self) -> &Path {
    self.temp_dir.path()
  }
}

/// Builds `.netrc` content with one multi-line entry per `(machine, login, password)`
pub fn netrc_content(entries: &[(&str, &str, &str)]) -> String {
  entries
    .iter()
    .map(|(machine, login, password)| format!("machine {machine}\n  login {login}\n  password {password}\n"))
    .collect::<Vec<_>>()
    .join("\n")
}
