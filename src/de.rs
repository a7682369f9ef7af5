//! Decoding JSON objects into [`OrderedMap`]s, keeping members in the order
//! they appear in the source text.

use std::{
    fmt,
    hash::{BuildHasher, Hash},
    io,
    marker::PhantomData,
};

use serde::de::{self, Deserialize, DeserializeOwned, Deserializer, MapAccess, Visitor};
use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    key::{FromKeyText, KeyError, KeyKind},
    ordered_map::OrderedMap,
};

/// Upper bound on the entries reserved up front from a format's size hint.
const MAX_PREALLOCATED_ENTRIES: usize = 4096;

/// Why the visitor gave up on an object that serde_json itself had no
/// problem with. The visitor can only hand serde a stringly error, so the
/// real cause is parked here and picked up again once serde_json has attached
/// a position to it.
enum Rejection {
    Key {
        name: String,
        kind: KeyKind,
        source: KeyError,
    },
    Duplicate {
        name: String,
    },
}

struct OrderedMapVisitor<'a, K, V, S> {
    rejection: &'a mut Option<Rejection>,
    marker: PhantomData<fn() -> OrderedMap<K, V, S>>,
}

impl<'a, K, V, S> OrderedMapVisitor<'a, K, V, S> {
    fn new(rejection: &'a mut Option<Rejection>) -> Self {
        OrderedMapVisitor {
            rejection,
            marker: PhantomData,
        }
    }
}

impl<'de, 'a, K, V, S> Visitor<'de> for OrderedMapVisitor<'a, K, V, S>
where
    K: FromKeyText + Eq + Hash + Clone,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    type Value = OrderedMap<K, V, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        // the hint comes from the input, so don't trust it with an allocation
        let capacity = access.size_hint().unwrap_or(0).min(MAX_PREALLOCATED_ENTRIES);
        let mut map = OrderedMap::with_capacity_and_hasher(capacity, S::default());

        while let Some(name) = access.next_key::<String>()? {
            let key = match K::decode_key_text(&name) {
                Ok(key) => key,
                Err(source) => {
                    let err = de::Error::custom(format_args!(
                        "invalid {} key {:?}: {}",
                        K::KIND,
                        name,
                        source
                    ));
                    *self.rejection = Some(Rejection::Key {
                        name,
                        kind: K::KIND,
                        source,
                    });
                    return Err(err);
                }
            };

            if map.contains_key(&key) {
                if cfg!(feature = "no_duplicate_keys") {
                    let err = de::Error::custom(format_args!("duplicate member name {:?}", name));
                    *self.rejection = Some(Rejection::Duplicate { name });
                    return Err(err);
                }

                // the value is overwritten, the position stays with the first
                // occurrence
                debug!(member = %name, "duplicate member name");
            }

            let value = access.next_value()?;
            map.set(key, value);
        }

        Ok(map)
    }
}

/// Deserializes from any serde map. Member names go through [`FromKeyText`], so
/// formats whose map keys are not strings will be rejected.
impl<'de, K, V, S> Deserialize<'de> for OrderedMap<K, V, S>
where
    K: FromKeyText + Eq + Hash + Clone,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut rejection = None;
        deserializer.deserialize_map(OrderedMapVisitor::new(&mut rejection))
    }
}

/// Checks that the first significant byte opens an object. serde_json would
/// happily hand a visitor a number or an array; this rejects them up front
/// with a syntax error. Empty input falls through so that serde_json reports
/// it as EOF.
fn expect_object_open(bytes: &[u8]) -> Result<()> {
    let mut line = 1;
    let mut column = 0;

    for &b in bytes {
        match b {
            b'\n' => {
                line += 1;
                column = 0;
            }
            b' ' | b'\t' | b'\r' => column += 1,
            b'{' => return Ok(()),
            _ => {
                return Err(Error::NotAnObject {
                    line,
                    column: column + 1,
                })
            }
        }
    }

    Ok(())
}

/// Decodes a JSON object from a byte slice. Members are set into the map in
/// the order they appear; a repeated member overwrites the earlier value but
/// keeps the earlier position.
///
/// ```
/// let map: orderedmap::OrderedMap<u32, String> =
///     orderedmap::from_slice(br#"{"7":"baz","1":"bar"}"#).unwrap();
///
/// assert_eq!(vec![&7, &1], map.keys().collect::<Vec<_>>());
/// ```
pub fn from_slice<'a, K, V>(bytes: &'a [u8]) -> Result<OrderedMap<K, V>>
where
    K: FromKeyText + Eq + Hash + Clone,
    V: Deserialize<'a>,
{
    expect_object_open(bytes)?;

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let mut rejection = None;

    let decoded = Deserializer::deserialize_map(
        &mut deserializer,
        OrderedMapVisitor::new(&mut rejection),
    );

    let map = match decoded {
        Ok(map) => map,
        Err(err) => return Err(locate(err, rejection)),
    };

    // anything but whitespace after the closing brace is an error
    deserializer.end()?;

    trace!(entries = map.len(), "decoded ordered map");

    Ok(map)
}

/// Decodes a JSON object from a string. See [`from_slice`].
pub fn from_str<'a, K, V>(s: &'a str) -> Result<OrderedMap<K, V>>
where
    K: FromKeyText + Eq + Hash + Clone,
    V: Deserialize<'a>,
{
    from_slice(s.as_bytes())
}

/// Reads the whole of `reader` into memory, then decodes it with
/// [`from_slice`].
pub fn from_reader<R, K, V>(mut reader: R) -> Result<OrderedMap<K, V>>
where
    R: io::Read,
    K: FromKeyText + Eq + Hash + Clone,
    V: DeserializeOwned,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    from_slice(&bytes)
}

/// Turns the error serde_json surfaced into ours, swapping in the real cause
/// if the visitor parked one.
fn locate(err: serde_json::Error, rejection: Option<Rejection>) -> Error {
    match rejection {
        Some(Rejection::Key { name, kind, source }) => Error::KeyDecode {
            name,
            kind,
            line: err.line(),
            column: err.column(),
            source,
        },
        Some(Rejection::Duplicate { name }) => Error::DuplicateKey {
            name,
            line: err.line(),
            column: err.column(),
        },
        None => Error::Json(err),
    }
}

#[cfg(test)]
mod tests {
    use super::expect_object_open;
    use crate::{error::Error, ordered_map::OrderedMap};
    use serde::{
        de::value::{self, MapDeserializer},
        Deserialize,
    };

    #[test]
    fn test_expect_object_open() {
        assert!(expect_object_open(b"{}").is_ok());
        assert!(expect_object_open(b" \r\n\t{").is_ok());
        assert!(expect_object_open(b"").is_ok());
        assert!(expect_object_open(b"   ").is_ok());

        assert!(matches!(
            expect_object_open(b"true"),
            Err(Error::NotAnObject { line: 1, column: 1 })
        ));
        assert!(matches!(
            expect_object_open(b"\n  [1]"),
            Err(Error::NotAnObject { line: 2, column: 3 })
        ));
    }

    #[test]
    fn test_key_decode_error_has_position() {
        let err = super::from_str::<u8, u8>("{\"1\":1,\n\"x\":2}").unwrap_err();

        match err {
            Error::KeyDecode { name, line, .. } => {
                assert_eq!("x", name);
                assert_eq!(2, line);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_nested_in_serde_struct() {
        #[derive(Deserialize)]
        struct Config {
            name: String,
            ports: OrderedMap<String, u16>,
        }

        let config: Config =
            serde_json::from_str(r#"{"name":"edge","ports":{"https":443,"http":80}}"#).unwrap();

        assert_eq!("edge", config.name);
        assert_eq!(
            vec!["https", "http"],
            config.ports.keys().map(String::as_str).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_serde_impl_rejects_non_maps() {
        let err = serde_json::from_str::<OrderedMap<String, u8>>("[1]").unwrap_err();
        assert!(err.is_data());
        assert!(err.to_string().contains("a JSON object"));
    }

    /// Yields a single entry while claiming to hold far more than could ever
    /// be allocated.
    struct Overstated(Option<(String, u8)>);

    impl Iterator for Overstated {
        type Item = (String, u8);

        fn next(&mut self) -> Option<Self::Item> {
            self.0.take()
        }

        fn size_hint(&self) -> (usize, Option<usize>) {
            (usize::MAX / 2, Some(usize::MAX / 2))
        }
    }

    #[test]
    fn test_overstated_size_hint_is_capped() {
        let entries = Overstated(Some((String::from("only"), 1)));
        let deserializer = MapDeserializer::<_, value::Error>::new(entries);

        let map = OrderedMap::<String, u8>::deserialize(deserializer).unwrap();

        assert_eq!(1, map.len());
        assert_eq!(Some(&1), map.get("only"));
        assert!(map.capacity() <= super::MAX_PREALLOCATED_ENTRIES);
    }
}
