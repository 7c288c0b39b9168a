// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./file_system_test.rs"]
mod file_system_test;

use anyhow::anyhow;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

//
// FileSystem
//

/// Whole-file reads and writes used to persist documents. Writes replace any existing content.
pub trait FileSystem: Send + Sync {
  fn exists(&self, path: &Path) -> anyhow::Result<bool>;

  fn read_file(&self, path: &Path) -> anyhow::Result<Vec<u8>>;

  fn write_file(&self, path: &Path, data: &[u8]) -> anyhow::Result<()>;

  /// Deletes the file if it exists.
  fn delete_file(&self, path: &Path) -> anyhow::Result<()>;
}

//
// RealFileSystem
//

/// Delegates to `std::fs`, joining the paths provided in the calls with a root directory. The
/// default root is the process working directory.
#[derive(Debug, Default)]
pub struct RealFileSystem {
  directory: PathBuf,
}

impl RealFileSystem {
  #[must_use]
  pub const fn new(directory: PathBuf) -> Self {
    Self { directory }
  }
}

impl FileSystem for RealFileSystem {
  fn exists(&self, path: &Path) -> anyhow::Result<bool> {
    match std::fs::metadata(self.directory.join(path)) {
      Ok(_) => Ok(true),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
      Err(e) => Err(e.into()),
    }
  }

  fn read_file(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
    let file_path = self.directory.join(path);
    std::fs::read(&file_path)
      .map_err(|e| anyhow!("failed to read file {}: {}", file_path.display(), e))
  }

  fn write_file(&self, path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let file_path = self.directory.join(path);
    std::fs::write(&file_path, data)
      .map_err(|e| anyhow!("failed to write file {}: {}", file_path.display(), e))
  }

  fn delete_file(&self, path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(self.directory.join(path)) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

//
// MemoryFileSystem
//

/// An in-memory file system. Setting `disk_full` makes every write fail, which is how tests
/// exercise persistence failures.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
  files: Mutex<HashMap<PathBuf, Vec<u8>>>,
  pub disk_full: AtomicBool,
}

impl FileSystem for MemoryFileSystem {
  fn exists(&self, path: &Path) -> anyhow::Result<bool> {
    Ok(self.files.lock().contains_key(path))
  }

  fn read_file(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
    self
      .files
      .lock()
      .get(path)
      .cloned()
      .ok_or_else(|| anyhow!("no such file: {}", path.display()))
  }

  fn write_file(&self, path: &Path, data: &[u8]) -> anyhow::Result<()> {
    if self.disk_full.load(Ordering::Relaxed) {
      anyhow::bail!("disk full");
    }

    self.files.lock().insert(path.to_path_buf(), data.to_vec());
    Ok(())
  }

  fn delete_file(&self, path: &Path) -> anyhow::Result<()> {
    self.files.lock().remove(path);
    Ok(())
  }
}
