// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use crate::FuzzFormat;
use bd_json::{
  DeserializeOptions,
  Document,
  Format,
  deserialize_with,
  json,
  measure,
  serialize,
};

#[derive(arbitrary::Arbitrary, Debug)]
pub struct DeserializeFuzzTestCase {
  format: FuzzFormat,
  nesting_limit: u8,
  capacity: u16,
  data: Vec<u8>,
}

pub struct DeserializeFuzzTest {
  test_case: DeserializeFuzzTestCase,
}

impl DeserializeFuzzTest {
  #[must_use]
  pub const fn new(test_case: DeserializeFuzzTestCase) -> Self {
    Self { test_case }
  }

  pub fn run(self) {
    let format = self.test_case.format.0;
    let options = DeserializeOptions {
      nesting_limit: self.test_case.nesting_limit,
    };

    let mut document = Document::new(usize::from(self.test_case.capacity));
    let _ignored = document.set("previous", true);
    let before = document.clone();

    if !deserialize_with(&mut document, self.test_case.data.as_slice(), format, &options) {
      assert_eq!(before, document);
      return;
    }
    assert!(document.memory_usage() <= document.capacity());

    let mut bytes = Vec::new();
    let written = serialize(&document, &mut bytes, format);
    assert_eq!(written, bytes.len());
    assert_eq!(written, measure(&document, format));

    // Only the binary encoding round trips doubles exactly.
    if format == Format::MessagePack {
      let mut reparsed = Document::new(document.capacity());
      let _ignored = reparsed.set("placeholder", json!(null));
      assert!(deserialize_with(&mut reparsed, &bytes, format, &options));
      assert_eq!(document, reparsed);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{DeserializeFuzzTest, DeserializeFuzzTestCase};

  #[test]
  fn fixed_inputs() {
    let inputs: [&[u8]; 4] = [
      &[],
      &[0, 10, 0, 2, 5, b'[', b'1', b',', b'"', b'x', b'"', b']'],
      &[2, 10, 0, 1, 4, 0x81, 0xa1, b'a', 0xc3],
      &[1, 1, 0, 1, 6, b'[', b'[', b'[', b']', b']', b']'],
    ];

    for input in inputs {
      crate::run_bytes(input, |test_case: DeserializeFuzzTestCase| {
        DeserializeFuzzTest::new(test_case).run();
      });
    }
  }
}
