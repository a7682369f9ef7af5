//! Encoding [`OrderedMap`]s as compact JSON objects whose members follow the
//! map's insertion order.

use std::io;

use serde::ser::{self, Serialize, SerializeMap, Serializer};
use tracing::trace;

use crate::{
    error::{Error, Result},
    key::KeyText,
    ordered_map::OrderedMap,
};

/// Serializes as a serde map, entries in insertion order and keys rendered
/// through [`KeyText`]. Handy for maps nested inside other serde data; for a
/// top-level map prefer [`to_writer`] and friends, which report key failures
/// as [`Error::KeyEncode`] instead of a format-specific message.
impl<K, V, H> Serialize for OrderedMap<K, V, H>
where
    K: KeyText,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            let name = k.encode_key_text().map_err(|err| {
                <S::Error as ser::Error>::custom(format_args!(
                    "cannot encode {} key: {}",
                    K::KIND,
                    err
                ))
            })?;
            map.serialize_entry(&*name, v)?;
        }
        map.end()
    }
}

/// Writes `map` to `writer` as a compact JSON object. Members appear in the
/// map's insertion order; an empty map is written as `{}`.
///
/// On error, whatever was written before the failing entry stays written.
pub fn to_writer<W, K, V, S>(mut writer: W, map: &OrderedMap<K, V, S>) -> Result<()>
where
    W: io::Write,
    K: KeyText,
    V: Serialize,
{
    writer.write_all(b"{")?;

    for (i, (k, v)) in map.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }

        let name = k.encode_key_text().map_err(|source| Error::KeyEncode {
            kind: K::KIND,
            source,
        })?;

        // serde_json takes care of quoting and escaping the member name
        serde_json::to_writer(&mut writer, &*name)?;
        writer.write_all(b":")?;
        serde_json::to_writer(&mut writer, v)?;
    }

    writer.write_all(b"}")?;

    trace!(entries = map.len(), "encoded ordered map");

    Ok(())
}

/// Encodes `map` as a compact JSON object in a byte vector.
///
/// ```
/// let mut map = orderedmap::OrderedMap::new();
/// map.set(7, "baz");
/// map.set(1, "bar");
///
/// assert_eq!(br#"{"7":"baz","1":"bar"}"#.to_vec(), orderedmap::to_vec(&map).unwrap());
/// ```
pub fn to_vec<K, V, S>(map: &OrderedMap<K, V, S>) -> Result<Vec<u8>>
where
    K: KeyText,
    V: Serialize,
{
    let mut bytes = Vec::with_capacity(128);
    to_writer(&mut bytes, map)?;
    Ok(bytes)
}

/// Encodes `map` as a compact JSON object in a string.
pub fn to_string<K, V, S>(map: &OrderedMap<K, V, S>) -> Result<String>
where
    K: KeyText,
    V: Serialize,
{
    let bytes = to_vec(map)?;
    String::from_utf8(bytes)
        .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

#[cfg(test)]
mod tests {
    use crate::{
        error::Error,
        key::{KeyError, KeyKind, KeyText},
        ordered_map::OrderedMap,
    };
    use serde::Serialize;
    use std::{borrow::Cow, io};

    /// A key whose text form can't be produced for odd numbers.
    #[derive(Clone, PartialEq, Eq, Hash)]
    struct EvenOnly(u32);

    impl KeyText for EvenOnly {
        const KIND: KeyKind = KeyKind::Text;

        fn encode_key_text(&self) -> Result<Cow<'_, str>, KeyError> {
            if self.0 % 2 == 1 {
                return Err(KeyError::custom("odd"));
            }
            Ok(Cow::Owned(self.0.to_string()))
        }
    }

    #[test]
    fn test_member_names_are_escaped() {
        let mut map = OrderedMap::new();
        map.set(String::from("say \"hi\"\n"), 1);
        map.set(String::from("back\\slash"), 2);

        assert_eq!(
            r#"{"say \"hi\"\n":1,"back\\slash":2}"#,
            super::to_string(&map).unwrap()
        );
    }

    #[test]
    fn test_key_encode_failure() {
        let mut map = OrderedMap::new();
        map.set(EvenOnly(2), "fine");
        map.set(EvenOnly(3), "not fine");

        let err = super::to_vec(&map).unwrap_err();
        assert!(err.is_key_encode());
        assert!(matches!(
            err,
            Error::KeyEncode {
                kind: KeyKind::Text,
                ..
            }
        ));

        // nested inside serde data the failure is a serde_json error instead
        let err = serde_json::to_string(&vec![map]).unwrap_err();
        assert!(err.to_string().contains("cannot encode text key: odd"));
    }

    #[test]
    fn test_nested_in_serde_struct() {
        #[derive(Serialize)]
        struct Config {
            name: &'static str,
            ports: OrderedMap<&'static str, u16>,
        }

        let mut ports = OrderedMap::new();
        ports.set("https", 443);
        ports.set("http", 80);

        let config = Config {
            name: "edge",
            ports,
        };

        assert_eq!(
            r#"{"name":"edge","ports":{"https":443,"http":80}}"#,
            serde_json::to_string(&config).unwrap()
        );
    }

    struct BrokenWriter;

    impl io::Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_failure_is_io() {
        let mut map = OrderedMap::new();
        map.set(1u8, true);

        let err = super::to_writer(BrokenWriter, &map).unwrap_err();
        assert!(err.is_io());
    }
}
