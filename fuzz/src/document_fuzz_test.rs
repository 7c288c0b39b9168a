// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use crate::{FuzzFormat, FuzzValue};
use bd_json::{
  Document,
  Error,
  Format,
  measure,
  serialize_to_string,
  try_deserialize,
  try_serialize,
};

#[derive(arbitrary::Arbitrary, Debug)]
pub struct DocumentFuzzTestCase {
  value: FuzzValue,
  format: FuzzFormat,
  capacity: u16,
}

pub struct DocumentFuzzTest {
  test_case: DocumentFuzzTestCase,
}

impl DocumentFuzzTest {
  #[must_use]
  pub const fn new(test_case: DocumentFuzzTestCase) -> Self {
    Self { test_case }
  }

  pub fn run(self) {
    let format = self.test_case.format.0;
    let value = self.test_case.value.0;
    let document = match Document::from_value(usize::MAX, value.clone()) {
      Ok(document) => document,
      Err(e) => panic!("unbounded document should accept any value: {e}"),
    };

    let mut bytes = Vec::new();
    let written = match try_serialize(&document, &mut bytes, format) {
      Ok(written) => written,
      Err(e) => panic!("serialization should succeed: {e}"),
    };
    assert_eq!(written, bytes.len());
    assert_eq!(written, measure(&document, format));
    if format.is_text() {
      assert_eq!(bytes, serialize_to_string(&document, format).into_bytes());
    }

    let capacity = usize::from(self.test_case.capacity);
    let mut target = Document::new(capacity);
    let result = try_deserialize(&mut target, bytes.as_slice(), format);
    if document.memory_usage() <= capacity {
      assert!(result.is_ok(), "{result:?}");
      assert_eq!(value, *target.as_value());
      assert_eq!(document.memory_usage(), target.memory_usage());
    } else {
      assert!(matches!(result, Err(Error::NoMemory { .. })), "{result:?}");
      assert!(target.is_null());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{DocumentFuzzTest, DocumentFuzzTestCase};

  #[test]
  fn fixed_inputs() {
    let inputs: [&[u8]; 4] = [
      &[],
      &[6, 3, 5, 4, 4, b'a', b'b', b'c', 0, 2, 0xff, 0xff, 0, 0, 0x40, 0],
      &[5, 5, 3, 1, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 2, 16, 0],
      &[6, 1, 4, 1, b'k', 6, 0, 1, 0, 0, 0, 0],
    ];

    for input in inputs {
      crate::run_bytes(input, |test_case: DocumentFuzzTestCase| {
        DocumentFuzzTest::new(test_case).run();
      });
    }
  }
}
