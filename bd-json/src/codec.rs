// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./codec_test.rs"]
mod codec_test;

use crate::format::CrlfPrettyFormatter;
use crate::{Error, Format, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{Read, Write};

//
// CountingWriter
//

/// Wraps a writer and counts the bytes that pass through it. Wrapping `std::io::sink()` measures an
/// encoding without storing it.
pub struct CountingWriter<W> {
  inner: W,
  count: usize,
}

impl<W: Write> CountingWriter<W> {
  pub const fn new(inner: W) -> Self {
    Self { inner, count: 0 }
  }

  #[must_use]
  pub const fn count(&self) -> usize {
    self.count
  }
}

impl<W: Write> Write for CountingWriter<W> {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    let written = self.inner.write(buf)?;
    self.count += written;
    Ok(written)
  }

  fn flush(&mut self) -> std::io::Result<()> {
    self.inner.flush()
  }
}

/// Encodes `value` into `writer`, returning the number of bytes written.
pub fn encode<W: Write>(value: &Value, format: Format, writer: W) -> Result<usize> {
  let mut writer = CountingWriter::new(writer);

  match format {
    Format::Compact => serde_json::to_writer(&mut writer, value)?,
    Format::Pretty => {
      let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, CrlfPrettyFormatter::default());
      value.serialize(&mut serializer)?;
    },
    Format::MessagePack => rmp_serde::encode::write(&mut writer, value)?,
  }

  writer.flush()?;
  Ok(writer.count())
}

/// Computes the encoded size of `value` without allocating output storage.
pub fn measure(value: &Value, format: Format) -> Result<usize> {
  encode(value, format, std::io::sink())
}

pub fn encode_to_vec(value: &Value, format: Format) -> Result<Vec<u8>> {
  let mut bytes = Vec::with_capacity(measure(value, format)?);
  encode(value, format, &mut bytes)?;
  Ok(bytes)
}

/// Decodes a single value from an in-memory encoding. Text input must contain exactly one JSON
/// value, optionally surrounded by whitespace. MessagePack containers nested deeper than
/// `nesting_limit` are rejected while decoding.
pub fn decode_slice(bytes: &[u8], format: Format, nesting_limit: u8) -> Result<Value> {
  match format {
    Format::Compact | Format::Pretty => Ok(serde_json::from_slice(bytes)?),
    Format::MessagePack => decode_message_pack(bytes, nesting_limit),
  }
}

/// Decodes a single value from a reader. Text formats consume the reader to its end, while
/// MessagePack stops after the first complete value.
pub fn decode_reader<R: Read>(reader: R, format: Format, nesting_limit: u8) -> Result<Value> {
  match format {
    Format::Compact | Format::Pretty => Ok(serde_json::from_reader(reader)?),
    Format::MessagePack => decode_message_pack(reader, nesting_limit),
  }
}

// The decoder recurses once per container, so the limit has to be enforced while decoding and not
// on the finished value.
fn decode_message_pack<R: Read>(reader: R, nesting_limit: u8) -> Result<Value> {
  let mut deserializer = rmp_serde::Deserializer::new(reader);
  deserializer.set_max_depth(usize::from(nesting_limit) + 1);

  Value::deserialize(&mut deserializer).map_err(|e| match e {
    rmp_serde::decode::Error::DepthLimitExceeded => Error::TooDeep {
      limit: nesting_limit,
    },
    e => e.into(),
  })
}
