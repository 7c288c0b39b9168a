// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[derive(thiserror::Error, Debug)]
pub enum Error {
  // The caller passed an absent stream, buffer or string.
  #[error("no source or destination provided")]
  Missing,
  #[error("document capacity exceeded: {required} bytes required, capacity is {capacity} bytes")]
  NoMemory { capacity: usize, required: usize },
  #[error("output buffer too small: {required} bytes required, {available} bytes available")]
  BufferTooSmall { required: usize, available: usize },
  #[error("nesting limit of {limit} exceeded")]
  TooDeep { limit: u8 },
  #[error("value is not {expected}")]
  IncompatibleType { expected: &'static str },
  #[error("unknown format: {0}")]
  UnknownFormat(u8),
  #[error("unknown format name: {0:?}")]
  UnknownFormatName(String),
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
  #[error("msgpack encode error: {0}")]
  Encode(#[from] rmp_serde::encode::Error),
  #[error("msgpack decode error: {0}")]
  Decode(#[from] rmp_serde::decode::Error),
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("encoded output is not valid UTF-8: {0}")]
  NotUtf8(#[from] std::string::FromUtf8Error),
  #[error(transparent)]
  FileSystem(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
