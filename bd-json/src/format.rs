// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./format_test.rs"]
mod format_test;

use crate::Error;
use serde_json::ser::Formatter;
use std::io;

//
// Format
//

/// The wire formats a document can be serialized to. The ordinals are stable and ordered so that
/// iterating `Format::ALL` visits every format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Format {
  /// JSON text without insignificant whitespace.
  #[default]
  Compact = 0,
  /// JSON text indented with two spaces and CRLF line breaks.
  Pretty = 1,
  MessagePack = 2,
}

impl Format {
  pub const ALL: [Self; 3] = [Self::Compact, Self::Pretty, Self::MessagePack];

  pub fn iter() -> impl Iterator<Item = Self> {
    Self::ALL.into_iter()
  }

  #[must_use]
  pub const fn ordinal(self) -> u8 {
    self as u8
  }

  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Compact => "Compact",
      Self::Pretty => "Pretty",
      Self::MessagePack => "MessagePack",
    }
  }

  #[must_use]
  pub const fn is_text(self) -> bool {
    matches!(self, Self::Compact | Self::Pretty)
  }
}

impl TryFrom<u8> for Format {
  type Error = Error;

  fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
    Self::ALL
      .get(usize::from(ordinal))
      .copied()
      .ok_or(Error::UnknownFormat(ordinal))
  }
}

impl std::str::FromStr for Format {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::iter()
      .find(|format| format.name().eq_ignore_ascii_case(s))
      .ok_or_else(|| Error::UnknownFormatName(s.to_string()))
  }
}

impl std::fmt::Display for Format {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

//
// CrlfPrettyFormatter
//

// Same layout rules as `serde_json::ser::PrettyFormatter` with a fixed two space indent, but lines
// are terminated with CRLF to stay byte compatible with documents written by device firmware.
#[derive(Debug, Default)]
pub(crate) struct CrlfPrettyFormatter {
  current_indent: usize,
  has_value: bool,
}

const INDENT: &[u8] = b"  ";

fn indent<W: ?Sized + io::Write>(writer: &mut W, depth: usize) -> io::Result<()> {
  for _ in 0 .. depth {
    writer.write_all(INDENT)?;
  }
  Ok(())
}

impl CrlfPrettyFormatter {
  fn begin_container<W: ?Sized + io::Write>(
    &mut self,
    writer: &mut W,
    open: &[u8],
  ) -> io::Result<()> {
    self.current_indent += 1;
    self.has_value = false;
    writer.write_all(open)
  }

  fn end_container<W: ?Sized + io::Write>(
    &mut self,
    writer: &mut W,
    close: &[u8],
  ) -> io::Result<()> {
    self.current_indent -= 1;

    if self.has_value {
      writer.write_all(b"\r\n")?;
      indent(writer, self.current_indent)?;
    }

    writer.write_all(close)
  }

  fn begin_entry<W: ?Sized + io::Write>(&self, writer: &mut W, first: bool) -> io::Result<()> {
    let separator: &[u8] = if first { b"\r\n" } else { b",\r\n" };
    writer.write_all(separator)?;
    indent(writer, self.current_indent)
  }
}

impl Formatter for CrlfPrettyFormatter {
  fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
    self.begin_container(writer, b"[")
  }

  fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
    self.end_container(writer, b"]")
  }

  fn begin_array_value<W: ?Sized + io::Write>(
    &mut self,
    writer: &mut W,
    first: bool,
  ) -> io::Result<()> {
    self.begin_entry(writer, first)
  }

  fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
    self.has_value = true;
    Ok(())
  }

  fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
    self.begin_container(writer, b"{")
  }

  fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
    self.end_container(writer, b"}")
  }

  fn begin_object_key<W: ?Sized + io::Write>(
    &mut self,
    writer: &mut W,
    first: bool,
  ) -> io::Result<()> {
    self.begin_entry(writer, first)
  }

  fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
    writer.write_all(b": ")
  }

  fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
    self.has_value = true;
    Ok(())
  }
}
