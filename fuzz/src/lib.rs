// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use arbitrary::{Arbitrary, Unstructured};
use bd_json::Format;
use serde_json::{Map, Number, Value};

pub mod deserialize_fuzz_test;
pub mod document_fuzz_test;

#[cfg(test)]
#[ctor::ctor]
fn test_global_init() {
  let _ignored = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
    ))
    .with_test_writer()
    .compact()
    .try_init();
}

const MAX_DEPTH: usize = 4;

//
// FuzzValue
//

// Floats are left out as text round trips do not guarantee bit exact doubles.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzValue(pub Value);

impl FuzzValue {
  fn arbitrary_at(u: &mut Unstructured<'_>, depth: usize) -> arbitrary::Result<Value> {
    let variant: u8 = u.arbitrary()?;
    let choices = if depth >= MAX_DEPTH { 5 } else { 7 };
    Ok(match variant % choices {
      0 => Value::Null,
      1 => Value::Bool(u.arbitrary()?),
      2 => Value::Number(Number::from(u.arbitrary::<i64>()?)),
      3 => Value::Number(Number::from(u.arbitrary::<u64>()?)),
      4 => Value::String(u.arbitrary()?),
      5 => {
        let len = u.int_in_range(0 ..= 5)?;
        let mut array = Vec::with_capacity(len);
        for _ in 0 .. len {
          array.push(Self::arbitrary_at(u, depth + 1)?);
        }
        Value::Array(array)
      },
      _ => {
        let len = u.int_in_range(0 ..= 3)?;
        let mut object = Map::new();
        for _ in 0 .. len {
          let key: String = u.arbitrary()?;
          object.insert(key, Self::arbitrary_at(u, depth + 1)?);
        }
        Value::Object(object)
      },
    })
  }
}

impl<'a> Arbitrary<'a> for FuzzValue {
  fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
    Ok(Self(Self::arbitrary_at(u, 0)?))
  }
}

//
// FuzzFormat
//

// Picks from `Format::ALL` so every format the library knows about is exercised.
#[derive(Debug, Clone, Copy)]
pub struct FuzzFormat(pub Format);

impl<'a> Arbitrary<'a> for FuzzFormat {
  fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
    Ok(Self(*u.choose(&Format::ALL)?))
  }
}

/// Decodes a test case from raw bytes and runs it, used to replay fixed inputs from unit tests.
pub fn run_bytes<T: for<'a> Arbitrary<'a>>(bytes: &[u8], fuzzer: impl Fn(T)) {
  match T::arbitrary(&mut Unstructured::new(bytes)) {
    Ok(input) => fuzzer(input),
    Err(e) => log::info!("skipping input that does not decode: {e}"),
  }
}
