// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./sink_test.rs"]
mod sink_test;

use crate::{Error, Format, Result, codec};
use serde_json::Value;
use std::io::Write;

//
// Stream
//

/// Marks a byte stream as a destination (`W: Write`) or an origin (`R: Read`). Wrapping keeps
/// streams apart from `Vec<u8>` and `&[u8]`, which are themselves `Write`/`Read` but are handled as
/// whole buffers.
#[derive(Debug)]
pub struct Stream<T>(pub T);

//
// Sink
//

/// A destination for an encoded document.
pub trait Sink {
  /// Writes `value` encoded as `format`, returning the number of bytes written.
  fn write_document(self, value: &Value, format: Format) -> Result<usize>;
}

// The string is replaced. Binary output that is not valid UTF-8 is rejected and leaves the string
// as it was.
impl Sink for &mut String {
  fn write_document(self, value: &Value, format: Format) -> Result<usize> {
    let encoded = String::from_utf8(codec::encode_to_vec(value, format)?)?;
    *self = encoded;
    Ok(self.len())
  }
}

impl Sink for &mut Vec<u8> {
  fn write_document(self, value: &Value, format: Format) -> Result<usize> {
    *self = codec::encode_to_vec(value, format)?;
    Ok(self.len())
  }
}

// A fixed buffer is never partially written: the encoding is measured first and nothing is written
// unless all of it fits. Bytes past the encoding are left untouched.
impl Sink for &mut [u8] {
  fn write_document(self, value: &Value, format: Format) -> Result<usize> {
    let required = codec::measure(value, format)?;
    if required > self.len() {
      return Err(Error::BufferTooSmall {
        required,
        available: self.len(),
      });
    }

    codec::encode(value, format, &mut self[.. required])
  }
}

impl<const N: usize> Sink for &mut [u8; N] {
  fn write_document(self, value: &Value, format: Format) -> Result<usize> {
    self.as_mut_slice().write_document(value, format)
  }
}

impl<W: Write> Sink for Stream<W> {
  fn write_document(self, value: &Value, format: Format) -> Result<usize> {
    codec::encode(value, format, self.0)
  }
}

impl<S: Sink> Sink for Option<S> {
  fn write_document(self, value: &Value, format: Format) -> Result<usize> {
    self
      .ok_or(Error::Missing)
      .and_then(|sink| sink.write_document(value, format))
  }
}
