// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./facade_test.rs"]
mod facade_test;

use crate::document::nesting_depth;
use crate::file_system::{FileSystem, RealFileSystem};
use crate::{Document, Error, Format, Result, Sink, Source, ValueRef, codec};
use serde::de::DeserializeOwned;
use std::path::Path;

// The deepest container nesting accepted when parsing.
pub const DEFAULT_NESTING_LIMIT: u8 = 10;

//
// DeserializeOptions
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeserializeOptions {
  pub nesting_limit: u8,
}

impl Default for DeserializeOptions {
  fn default() -> Self {
    Self {
      nesting_limit: DEFAULT_NESTING_LIMIT,
    }
  }
}

// Every fallible operation below comes in two forms. The `try_` form reports why it failed; the
// plain form logs the reason and collapses it into `0` or `false`, leaving the caller's document or
// output untouched.

pub fn try_measure(document: &Document, format: Format) -> Result<usize> {
  codec::measure(document.as_value(), format)
}

/// Returns the number of bytes `document` occupies when encoded as `format`, without writing it
/// anywhere.
#[must_use]
pub fn measure(document: &Document, format: Format) -> usize {
  try_measure(document, format).unwrap_or_else(|e| {
    log::debug!("failed to measure document as {format}: {e}");
    0
  })
}

pub fn try_serialize<S: Sink>(document: &Document, sink: S, format: Format) -> Result<usize> {
  let written = sink.write_document(document.as_value(), format)?;
  log::trace!("serialized {written} bytes as {format}");
  Ok(written)
}

/// Encodes `document` into `sink` and returns the number of bytes written. An absent sink, a
/// buffer that is too small or a write failure all yield 0.
pub fn serialize<S: Sink>(document: &Document, sink: S, format: Format) -> usize {
  try_serialize(document, sink, format).unwrap_or_else(|e| {
    log::debug!("failed to serialize document as {format}: {e}");
    0
  })
}

#[must_use]
pub fn serialize_to_string(document: &Document, format: Format) -> String {
  let mut s = String::new();
  serialize(document, &mut s, format);
  s
}

pub fn try_deserialize<S: Source>(
  document: &mut Document,
  source: S,
  format: Format,
) -> Result<()> {
  try_deserialize_with(document, source, format, &DeserializeOptions::default())
}

pub fn try_deserialize_with<S: Source>(
  document: &mut Document,
  source: S,
  format: Format,
  options: &DeserializeOptions,
) -> Result<()> {
  let value = source.read_document(format, options)?;

  if nesting_depth(&value) > usize::from(options.nesting_limit) {
    return Err(Error::TooDeep {
      limit: options.nesting_limit,
    });
  }

  document.replace(value)
}

/// Parses `source` into `document`, replacing its contents. Returns false and leaves the document
/// as it was if the source is absent, malformed, too deeply nested or too large for the document.
pub fn deserialize<S: Source>(document: &mut Document, source: S, format: Format) -> bool {
  deserialize_with(document, source, format, &DeserializeOptions::default())
}

pub fn deserialize_with<S: Source>(
  document: &mut Document,
  source: S,
  format: Format,
  options: &DeserializeOptions,
) -> bool {
  match try_deserialize_with(document, source, format, options) {
    Ok(()) => true,
    Err(e) => {
      log::debug!("failed to deserialize document as {format}: {e}");
      false
    },
  }
}

pub fn try_save_to_file(
  file_system: &dyn FileSystem,
  document: &Document,
  path: &Path,
  format: Format,
) -> Result<usize> {
  let bytes = codec::encode_to_vec(document.as_value(), format)?;
  file_system.write_file(path, &bytes)?;
  Ok(bytes.len())
}

pub fn save_to_file_in(
  file_system: &dyn FileSystem,
  document: &Document,
  path: impl AsRef<Path>,
  format: Format,
) -> bool {
  let path = path.as_ref();
  match try_save_to_file(file_system, document, path, format) {
    Ok(written) => {
      log::trace!("saved {written} bytes to {}", path.display());
      true
    },
    Err(e) => {
      log::debug!("failed to save document to {}: {e}", path.display());
      false
    },
  }
}

/// Writes `document` to `path` (relative to the working directory), replacing the file.
pub fn save_to_file(document: &Document, path: impl AsRef<Path>, format: Format) -> bool {
  save_to_file_in(&RealFileSystem::default(), document, path, format)
}

pub fn try_load_from_file(
  file_system: &dyn FileSystem,
  document: &mut Document,
  path: &Path,
  format: Format,
) -> Result<()> {
  let bytes = file_system.read_file(path)?;
  try_deserialize(document, bytes.as_slice(), format)
}

pub fn load_from_file_in(
  file_system: &dyn FileSystem,
  document: &mut Document,
  path: impl AsRef<Path>,
  format: Format,
) -> bool {
  let path = path.as_ref();
  match try_load_from_file(file_system, document, path, format) {
    Ok(()) => true,
    Err(e) => {
      log::debug!("failed to load document from {}: {e}", path.display());
      false
    },
  }
}

pub fn load_from_file(document: &mut Document, path: impl AsRef<Path>, format: Format) -> bool {
  load_from_file_in(&RealFileSystem::default(), document, path, format)
}

/// Reads the referenced value into `out`. Returns false and leaves `out` untouched if the value is
/// missing or cannot be converted to `T`.
pub fn get_value<T: DeserializeOwned>(value: ValueRef<'_>, out: &mut T) -> bool {
  match value.read() {
    Ok(read) => {
      *out = read;
      true
    },
    Err(e) => {
      log::debug!("failed to read value: {e}");
      false
    },
  }
}
