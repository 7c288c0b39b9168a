// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use crate::facade::DeserializeOptions;
use crate::sink::Stream;
use crate::{Error, Format, Result, codec};
use serde_json::Value;
use std::io::Read;

/// An origin of an encoded document.
pub trait Source {
  /// Decodes one value. `options` bounds the container nesting accepted by the decoder.
  fn read_document(self, format: Format, options: &DeserializeOptions) -> Result<Value>;
}

impl Source for &str {
  fn read_document(self, format: Format, options: &DeserializeOptions) -> Result<Value> {
    codec::decode_slice(self.as_bytes(), format, options.nesting_limit)
  }
}

impl Source for &String {
  fn read_document(self, format: Format, options: &DeserializeOptions) -> Result<Value> {
    self.as_str().read_document(format, options)
  }
}

impl Source for &[u8] {
  fn read_document(self, format: Format, options: &DeserializeOptions) -> Result<Value> {
    codec::decode_slice(self, format, options.nesting_limit)
  }
}

impl Source for &Vec<u8> {
  fn read_document(self, format: Format, options: &DeserializeOptions) -> Result<Value> {
    self.as_slice().read_document(format, options)
  }
}

impl<R: Read> Source for Stream<R> {
  fn read_document(self, format: Format, options: &DeserializeOptions) -> Result<Value> {
    codec::decode_reader(self.0, format, options.nesting_limit)
  }
}

impl<S: Source> Source for Option<S> {
  fn read_document(self, format: Format, options: &DeserializeOptions) -> Result<Value> {
    self
      .ok_or(Error::Missing)
      .and_then(|source| source.read_document(format, options))
  }
}
