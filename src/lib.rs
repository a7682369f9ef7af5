//! A hash map that remembers the order its keys were first inserted in, and
//! that round-trips through JSON objects without losing that order.
//!
//! ```
//! use orderedmap::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//! map.set(8, "x");
//! map.set(1, "y");
//! map.set(8, "z");
//!
//! // updating a key leaves it where it was
//! assert_eq!(vec![&8, &1], map.keys().collect::<Vec<_>>());
//!
//! let json = orderedmap::to_string(&map).unwrap();
//! assert_eq!(r#"{"8":"z","1":"y"}"#, json);
//!
//! let back: OrderedMap<i32, String> = orderedmap::from_str(&json).unwrap();
//! assert_eq!(vec![&8, &1], back.keys().collect::<Vec<_>>());
//! ```
//!
//! Keys are written as JSON member names through the [`KeyText`] trait and
//! read back through [`FromKeyText`]: integers in base-10, strings verbatim,
//! and custom key types however their own implementation says.

mod de;
mod error;
mod key;
mod linked_list;
mod ordered_map;
mod ser;
#[cfg(feature = "shared_map")]
mod shared_map;

pub use de::{from_reader, from_slice, from_str};
pub use error::{Category, Error, Result};
pub use key::{FromKeyText, KeyError, KeyKind, KeyText};
pub use ordered_map::{IntoIter, Iter, Keys, OrderedMap, Values};
pub use ser::{to_string, to_vec, to_writer};
#[cfg(feature = "shared_map")]
pub use shared_map::SharedOrderedMap;
