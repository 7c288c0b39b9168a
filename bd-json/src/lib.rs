// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#![deny(
  clippy::expect_used,
  clippy::panic,
  clippy::todo,
  clippy::unimplemented,
  clippy::unreachable,
  clippy::unwrap_used
)]

//! Bounded JSON documents plus a small façade that serializes them to, and parses them from,
//! strings, buffers, streams and files in compact JSON, pretty JSON or MessagePack.

pub mod codec;
pub mod document;
pub mod error;
pub mod facade;
pub mod file_system;
pub mod format;
pub mod sink;
pub mod source;

pub use crate::document::{ArrayMut, Document, ObjectMut, ValueRef};
pub use crate::error::{Error, Result};
pub use crate::facade::{
  DEFAULT_NESTING_LIMIT,
  DeserializeOptions,
  deserialize,
  deserialize_with,
  get_value,
  load_from_file,
  load_from_file_in,
  measure,
  save_to_file,
  save_to_file_in,
  serialize,
  serialize_to_string,
  try_deserialize,
  try_deserialize_with,
  try_load_from_file,
  try_measure,
  try_save_to_file,
  try_serialize,
};
pub use crate::format::Format;
pub use crate::sink::{Sink, Stream};
pub use crate::source::Source;
pub use serde_json::{Value, json};

#[cfg(test)]
#[ctor::ctor]
fn test_global_init() {
  // Another test binary in the same process may have installed a subscriber already.
  let _ignored = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").as_deref().unwrap_or("info"),
    ))
    .with_test_writer()
    .with_line_number(true)
    .compact()
    .try_init();
}
