// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./document_test.rs"]
mod document_test;

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

// Accounting cost of one value stored inside an object or an array. Owned strings (keys and string
// values) are charged on top of this at their length plus a terminator.
pub const SLOT_SIZE: usize = 16;

const fn string_cost(s: &str) -> usize {
  s.len() + 1
}

// Bytes charged for the contents of `value`, not counting the slot that holds it.
pub(crate) fn payload_cost(value: &Value) -> usize {
  match value {
    Value::String(s) => string_cost(s),
    Value::Array(array) => array.iter().map(element_cost).sum(),
    Value::Object(map) => map.iter().map(|(key, value)| member_cost(key, value)).sum(),
    Value::Null | Value::Bool(_) | Value::Number(_) => 0,
  }
}

fn element_cost(value: &Value) -> usize {
  SLOT_SIZE + payload_cost(value)
}

fn member_cost(key: &str, value: &Value) -> usize {
  SLOT_SIZE + string_cost(key) + payload_cost(value)
}

// The number of containers on the deepest path through `value`. Scalars have depth 0.
pub(crate) fn nesting_depth(value: &Value) -> usize {
  match value {
    Value::Array(array) => 1 + array.iter().map(nesting_depth).max().unwrap_or(0),
    Value::Object(map) => 1 + map.values().map(nesting_depth).max().unwrap_or(0),
    Value::Null | Value::Bool(_) | Value::String(_) | Value::Number(_) => 0,
  }
}

//
// Budget
//

// Tracks how much of a document's capacity is in use. Handles into the document share the budget
// through a mutable borrow so that nested assignments are charged against the same total.
#[derive(Debug)]
struct Budget<'a> {
  used: &'a mut usize,
  capacity: usize,
}

impl Budget<'_> {
  fn reborrow(&mut self) -> Budget<'_> {
    Budget {
      used: &mut *self.used,
      capacity: self.capacity,
    }
  }

  // Charges `acquire` bytes after crediting `release` bytes that are about to be replaced. Nothing
  // is charged if the result would exceed the capacity.
  fn reserve(&mut self, acquire: usize, release: usize) -> Result<()> {
    let required = self.used.saturating_sub(release) + acquire;
    if required > self.capacity {
      log::trace!(
        "cannot reserve {acquire} bytes: {} of {} bytes in use",
        self.used,
        self.capacity
      );
      return Err(Error::NoMemory {
        capacity: self.capacity,
        required,
      });
    }

    *self.used = required;
    Ok(())
  }

  fn release(&mut self, amount: usize) {
    *self.used = self.used.saturating_sub(amount);
  }
}

//
// Document
//

/// A JSON value tree with a fixed memory budget. The budget is set at construction and every
/// assignment is charged against it, so a document never grows past the capacity it was created
/// with.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  root: Value,
  used: usize,
  capacity: usize,
}

impl Document {
  /// Creates an empty (null) document with a budget of `capacity` bytes.
  #[must_use]
  pub const fn new(capacity: usize) -> Self {
    Self {
      root: Value::Null,
      used: 0,
      capacity,
    }
  }

  /// Creates a document holding `value`, failing if the value does not fit in `capacity`.
  pub fn from_value(capacity: usize, value: Value) -> Result<Self> {
    let mut document = Self::new(capacity);
    document.replace(value)?;
    Ok(document)
  }

  #[must_use]
  pub const fn capacity(&self) -> usize {
    self.capacity
  }

  #[must_use]
  pub const fn memory_usage(&self) -> usize {
    self.used
  }

  #[must_use]
  pub const fn as_value(&self) -> &Value {
    &self.root
  }

  #[must_use]
  pub fn into_value(self) -> Value {
    self.root
  }

  #[must_use]
  pub fn is_null(&self) -> bool {
    self.root.is_null()
  }

  pub fn clear(&mut self) {
    self.root = Value::Null;
    self.used = 0;
  }

  // Swaps in a whole new tree. The document is left untouched if the tree does not fit.
  pub(crate) fn replace(&mut self, value: Value) -> Result<()> {
    let required = payload_cost(&value);
    if required > self.capacity {
      return Err(Error::NoMemory {
        capacity: self.capacity,
        required,
      });
    }

    self.root = value;
    self.used = required;
    Ok(())
  }

  #[must_use]
  pub const fn root(&self) -> ValueRef<'_> {
    ValueRef::new(Some(&self.root))
  }

  #[must_use]
  pub fn get(&self, key: &str) -> ValueRef<'_> {
    self.root().get(key)
  }

  #[must_use]
  pub fn at(&self, index: usize) -> ValueRef<'_> {
    self.root().at(index)
  }

  /// Returns the root as an object, turning a null root into an empty object first.
  pub fn as_object_mut(&mut self) -> Result<ObjectMut<'_>> {
    if self.root.is_null() {
      self.root = Value::Object(Map::new());
    }

    match &mut self.root {
      Value::Object(map) => Ok(ObjectMut {
        map,
        budget: Budget {
          used: &mut self.used,
          capacity: self.capacity,
        },
      }),
      _ => Err(Error::IncompatibleType {
        expected: "an object",
      }),
    }
  }

  /// Returns the root as an array, turning a null root into an empty array first.
  pub fn as_array_mut(&mut self) -> Result<ArrayMut<'_>> {
    if self.root.is_null() {
      self.root = Value::Array(Vec::new());
    }

    match &mut self.root {
      Value::Array(array) => Ok(ArrayMut {
        array,
        budget: Budget {
          used: &mut self.used,
          capacity: self.capacity,
        },
      }),
      _ => Err(Error::IncompatibleType {
        expected: "an array",
      }),
    }
  }

  /// Discards the current contents and makes the root an empty object.
  pub fn to_object(&mut self) -> Result<ObjectMut<'_>> {
    self.clear();
    self.as_object_mut()
  }

  /// Discards the current contents and makes the root an empty array.
  pub fn to_array(&mut self) -> Result<ArrayMut<'_>> {
    self.clear();
    self.as_array_mut()
  }

  // A null root is only converted into a container once the first entry is known to fit, so a
  // failed assignment leaves a null document null.
  fn check_first_entry(&self, acquire: usize) -> Result<()> {
    if self.root.is_null() && acquire > self.capacity {
      return Err(Error::NoMemory {
        capacity: self.capacity,
        required: acquire,
      });
    }
    Ok(())
  }

  pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
    let value = value.into();
    self.check_first_entry(member_cost(key, &value))?;
    self.as_object_mut()?.set(key, value)
  }

  pub fn add(&mut self, value: impl Into<Value>) -> Result<()> {
    let value = value.into();
    self.check_first_entry(element_cost(&value))?;
    self.as_array_mut()?.add(value)
  }

  pub fn remove(&mut self, key: &str) -> Option<Value> {
    match &mut self.root {
      Value::Object(map) => remove_member(
        map,
        &mut Budget {
          used: &mut self.used,
          capacity: self.capacity,
        },
        key,
      ),
      _ => None,
    }
  }

  pub fn create_nested_array(&mut self, key: &str) -> Result<ArrayMut<'_>> {
    self.check_first_entry(SLOT_SIZE + string_cost(key))?;
    self.as_object_mut()?.into_nested_array(key)
  }

  pub fn create_nested_object(&mut self, key: &str) -> Result<ObjectMut<'_>> {
    self.check_first_entry(SLOT_SIZE + string_cost(key))?;
    self.as_object_mut()?.into_nested_object(key)
  }
}

fn remove_member(
  map: &mut Map<String, Value>,
  budget: &mut Budget<'_>,
  key: &str,
) -> Option<Value> {
  let removed = map.shift_remove(key)?;
  budget.release(member_cost(key, &removed));
  Some(removed)
}

fn nested_array<'a>(
  map: &'a mut Map<String, Value>,
  mut budget: Budget<'a>,
  key: &str,
) -> Result<ArrayMut<'a>> {
  let release = map.get(key).map_or(0, |old| member_cost(key, old));
  budget.reserve(SLOT_SIZE + string_cost(key), release)?;
  map.insert(key.to_string(), Value::Array(Vec::new()));

  match map.get_mut(key) {
    Some(Value::Array(array)) => Ok(ArrayMut { array, budget }),
    _ => Err(Error::IncompatibleType {
      expected: "an array",
    }),
  }
}

fn nested_object<'a>(
  map: &'a mut Map<String, Value>,
  mut budget: Budget<'a>,
  key: &str,
) -> Result<ObjectMut<'a>> {
  let release = map.get(key).map_or(0, |old| member_cost(key, old));
  budget.reserve(SLOT_SIZE + string_cost(key), release)?;
  map.insert(key.to_string(), Value::Object(Map::new()));

  match map.get_mut(key) {
    Some(Value::Object(nested)) => Ok(ObjectMut {
      map: nested,
      budget,
    }),
    _ => Err(Error::IncompatibleType {
      expected: "an object",
    }),
  }
}

//
// ObjectMut
//

/// A mutable handle to an object inside a document. Assignments are charged against the owning
/// document's capacity.
#[derive(Debug)]
pub struct ObjectMut<'a> {
  map: &'a mut Map<String, Value>,
  budget: Budget<'a>,
}

impl<'a> ObjectMut<'a> {
  /// Sets `key` to `value`, replacing any previous value in place.
  pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
    let value = value.into();
    let release = self.map.get(key).map_or(0, |old| member_cost(key, old));
    self.budget.reserve(member_cost(key, &value), release)?;
    self.map.insert(key.to_string(), value);
    Ok(())
  }

  pub fn remove(&mut self, key: &str) -> Option<Value> {
    remove_member(self.map, &mut self.budget, key)
  }

  #[must_use]
  pub fn get(&self, key: &str) -> ValueRef<'_> {
    ValueRef::new(self.map.get(key))
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.map.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }

  pub fn create_nested_array(&mut self, key: &str) -> Result<ArrayMut<'_>> {
    nested_array(self.map, self.budget.reborrow(), key)
  }

  pub fn create_nested_object(&mut self, key: &str) -> Result<ObjectMut<'_>> {
    nested_object(self.map, self.budget.reborrow(), key)
  }

  pub fn into_nested_array(self, key: &str) -> Result<ArrayMut<'a>> {
    nested_array(self.map, self.budget, key)
  }

  pub fn into_nested_object(self, key: &str) -> Result<ObjectMut<'a>> {
    nested_object(self.map, self.budget, key)
  }
}

//
// ArrayMut
//

/// A mutable handle to an array inside a document.
#[derive(Debug)]
pub struct ArrayMut<'a> {
  array: &'a mut Vec<Value>,
  budget: Budget<'a>,
}

impl ArrayMut<'_> {
  pub fn add(&mut self, value: impl Into<Value>) -> Result<()> {
    let value = value.into();
    self.budget.reserve(element_cost(&value), 0)?;
    self.array.push(value);
    Ok(())
  }

  #[must_use]
  pub fn get(&self, index: usize) -> ValueRef<'_> {
    ValueRef::new(self.array.get(index))
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.array.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.array.is_empty()
  }

  pub fn create_nested_array(&mut self) -> Result<ArrayMut<'_>> {
    self.budget.reserve(SLOT_SIZE, 0)?;
    self.array.push(Value::Array(Vec::new()));

    match self.array.last_mut() {
      Some(Value::Array(array)) => Ok(ArrayMut {
        array,
        budget: self.budget.reborrow(),
      }),
      _ => Err(Error::IncompatibleType {
        expected: "an array",
      }),
    }
  }

  pub fn create_nested_object(&mut self) -> Result<ObjectMut<'_>> {
    self.budget.reserve(SLOT_SIZE, 0)?;
    self.array.push(Value::Object(Map::new()));

    match self.array.last_mut() {
      Some(Value::Object(map)) => Ok(ObjectMut {
        map,
        budget: self.budget.reborrow(),
      }),
      _ => Err(Error::IncompatibleType {
        expected: "an object",
      }),
    }
  }
}

//
// ValueRef
//

/// A read-only view of a position inside a document. Looking up a key or index that does not
/// exist yields an empty reference rather than failing, so lookups can be chained freely.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValueRef<'a> {
  value: Option<&'a Value>,
}

impl<'a> ValueRef<'a> {
  #[must_use]
  pub const fn new(value: Option<&'a Value>) -> Self {
    Self { value }
  }

  #[must_use]
  pub fn get(self, key: &str) -> Self {
    Self::new(self.value.and_then(|value| value.get(key)))
  }

  #[must_use]
  pub fn at(self, index: usize) -> Self {
    Self::new(self.value.and_then(|value| value.get(index)))
  }

  #[must_use]
  pub const fn exists(self) -> bool {
    self.value.is_some()
  }

  #[must_use]
  pub const fn value(self) -> Option<&'a Value> {
    self.value
  }

  /// Converts the referenced value into `T`. Conversions are strict: numbers are not read as
  /// strings, strings are not parsed as numbers, and integers must fit the target type.
  pub fn read<T: DeserializeOwned>(self) -> Result<T> {
    let value = self.value.ok_or(Error::Missing)?;
    Ok(<T as serde::Deserialize>::deserialize(value)?)
  }
}

impl PartialEq<u64> for ValueRef<'_> {
  fn eq(&self, other: &u64) -> bool {
    self.value.and_then(Value::as_u64) == Some(*other)
  }
}

impl PartialEq<i64> for ValueRef<'_> {
  fn eq(&self, other: &i64) -> bool {
    self.value.and_then(Value::as_i64) == Some(*other)
  }
}

impl PartialEq<&str> for ValueRef<'_> {
  fn eq(&self, other: &&str) -> bool {
    self.value.and_then(Value::as_str) == Some(*other)
  }
}
