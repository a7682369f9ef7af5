//! How keys become JSON object member names, and how member names become keys
//! again.
//!
//! JSON only has string member names, so every key type that can be written
//! as JSON implements [`KeyText`], and every key type that can be read back
//! also implements [`FromKeyText`]. Integers render in plain base-10, strings
//! render verbatim, and any other type brings its own text form by
//! implementing the traits itself. Borrowed strings such as `&str` can be
//! written but not read. Types without an implementation simply cannot be
//! used as keys of a serialized map.

use std::{
    borrow::Cow,
    fmt::{self, Display},
    num::ParseIntError,
    rc::Rc,
    sync::Arc,
};

use thiserror::Error;

/// The rule a key type follows when rendered as a member name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// Base-10 signed or unsigned integer.
    Integer,
    /// The member name is the key itself.
    String,
    /// The key type supplies its own text codec.
    Text,
}

impl Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyKind::Integer => "integer",
            KeyKind::String => "string",
            KeyKind::Text => "text",
        })
    }
}

/// A key could not be turned into a member name, or a member name could not
/// be turned back into a key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid integer {text:?}: {source}")]
    Integer {
        text: String,
        #[source]
        source: ParseIntError,
    },

    #[error("{0}")]
    Message(String),
}

impl KeyError {
    /// Builds an error from anything printable. Meant for [`KeyText`] and
    /// [`FromKeyText`] implementations on custom key types.
    pub fn custom<T: Display>(msg: T) -> Self {
        KeyError::Message(msg.to_string())
    }
}

/// Converts a key to the text used as its JSON member name.
///
/// Implement this, and [`FromKeyText`] if the map should decode too, for
/// custom key types:
///
/// ```
/// use std::borrow::Cow;
/// use orderedmap::{FromKeyText, KeyError, KeyKind, KeyText};
///
/// #[derive(Clone, PartialEq, Eq, Hash)]
/// struct Tag(u32);
///
/// impl KeyText for Tag {
///     const KIND: KeyKind = KeyKind::Text;
///
///     fn encode_key_text(&self) -> Result<Cow<'_, str>, KeyError> {
///         Ok(Cow::Owned(format!("tag-{}", self.0)))
///     }
/// }
///
/// impl FromKeyText for Tag {
///     fn decode_key_text(text: &str) -> Result<Self, KeyError> {
///         let n = text
///             .strip_prefix("tag-")
///             .ok_or_else(|| KeyError::custom("missing tag- prefix"))?;
///         n.parse().map(Tag).map_err(KeyError::custom)
///     }
/// }
/// ```
pub trait KeyText {
    const KIND: KeyKind;

    /// Renders the key as an unquoted member name.
    fn encode_key_text(&self) -> Result<Cow<'_, str>, KeyError>;
}

/// Builds a key back from the text of its JSON member name.
pub trait FromKeyText: KeyText + Sized {
    /// Parses a key from an unquoted member name.
    fn decode_key_text(text: &str) -> Result<Self, KeyError>;
}

macro_rules! integer_key_text {
    ($($ty:ty)*) => {
        $(
            impl KeyText for $ty {
                const KIND: KeyKind = KeyKind::Integer;

                fn encode_key_text(&self) -> Result<Cow<'_, str>, KeyError> {
                    let mut buf = itoa::Buffer::new();
                    Ok(Cow::Owned(buf.format(*self).to_owned()))
                }
            }

            impl FromKeyText for $ty {
                fn decode_key_text(text: &str) -> Result<Self, KeyError> {
                    text.parse().map_err(|source| KeyError::Integer {
                        text: text.to_owned(),
                        source,
                    })
                }
            }
        )*
    };
}

integer_key_text! {
    i8 i16 i32 i64 i128 isize
    u8 u16 u32 u64 u128 usize
}

impl KeyText for String {
    const KIND: KeyKind = KeyKind::String;

    fn encode_key_text(&self) -> Result<Cow<'_, str>, KeyError> {
        Ok(Cow::Borrowed(self.as_str()))
    }
}

impl FromKeyText for String {
    fn decode_key_text(text: &str) -> Result<Self, KeyError> {
        Ok(text.to_owned())
    }
}

macro_rules! str_pointer_key_text {
    ($($ty:ty)*) => {
        $(
            impl KeyText for $ty {
                const KIND: KeyKind = KeyKind::String;

                fn encode_key_text(&self) -> Result<Cow<'_, str>, KeyError> {
                    Ok(Cow::Borrowed(&**self))
                }
            }

            impl FromKeyText for $ty {
                fn decode_key_text(text: &str) -> Result<Self, KeyError> {
                    Ok(<$ty>::from(text))
                }
            }
        )*
    };
}

str_pointer_key_text! {
    Box<str> Rc<str> Arc<str>
}

impl<'a> KeyText for &'a str {
    const KIND: KeyKind = KeyKind::String;

    fn encode_key_text(&self) -> Result<Cow<'_, str>, KeyError> {
        Ok(Cow::Borrowed(*self))
    }
}

impl<'a> KeyText for Cow<'a, str> {
    const KIND: KeyKind = KeyKind::String;

    fn encode_key_text(&self) -> Result<Cow<'_, str>, KeyError> {
        Ok(Cow::Borrowed(&**self))
    }
}

impl FromKeyText for Cow<'static, str> {
    fn decode_key_text(text: &str) -> Result<Self, KeyError> {
        Ok(Cow::Owned(text.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::{FromKeyText, KeyError, KeyKind, KeyText};
    use std::{borrow::Cow, sync::Arc};

    #[test]
    fn test_integer_keys_render_base_ten() {
        assert_eq!("0", 0u8.encode_key_text().unwrap());
        assert_eq!("-42", (-42i32).encode_key_text().unwrap());
        assert_eq!("18446744073709551615", u64::MAX.encode_key_text().unwrap());
        assert_eq!(
            "-170141183460469231731687303715884105728",
            i128::MIN.encode_key_text().unwrap()
        );
        assert_eq!(KeyKind::Integer, <i64 as KeyText>::KIND);
    }

    #[test]
    fn test_integer_keys_parse_base_ten() {
        assert_eq!(28, i64::decode_key_text("28").unwrap());
        assert_eq!(-7, i64::decode_key_text("-7").unwrap());
        assert_eq!(255, u8::decode_key_text("255").unwrap());
    }

    #[test]
    fn test_integer_keys_reject_garbage_and_overflow() {
        assert!(matches!(
            i64::decode_key_text("twelve"),
            Err(KeyError::Integer { .. })
        ));
        assert!(matches!(u8::decode_key_text("256"), Err(KeyError::Integer { .. })));
        assert!(matches!(u32::decode_key_text("-1"), Err(KeyError::Integer { .. })));
        assert!(matches!(i32::decode_key_text(""), Err(KeyError::Integer { .. })));
        assert!(matches!(i32::decode_key_text(" 1"), Err(KeyError::Integer { .. })));
    }

    #[test]
    fn test_string_keys_are_verbatim() {
        let key = String::from("a \"quoted\" key");
        assert!(matches!(key.encode_key_text(), Ok(Cow::Borrowed(_))));
        assert_eq!("a \"quoted\" key", key.encode_key_text().unwrap());
        assert_eq!("", String::decode_key_text("").unwrap());

        let shared = <Arc<str>>::decode_key_text("shared").unwrap();
        assert_eq!("shared", &*shared);
        assert_eq!(KeyKind::String, <Box<str> as KeyText>::KIND);
    }

    #[test]
    fn test_borrowed_string_keys_encode() {
        assert!(matches!("borrowed".encode_key_text(), Ok(Cow::Borrowed("borrowed"))));
        assert_eq!(KeyKind::String, <&str as KeyText>::KIND);

        let owned: Cow<'_, str> = Cow::Owned(String::from("owned"));
        assert!(matches!(owned.encode_key_text(), Ok(Cow::Borrowed("owned"))));

        let decoded = <Cow<'static, str>>::decode_key_text("back").unwrap();
        assert_eq!("back", decoded);
    }

    #[test]
    fn test_error_messages() {
        let err = u8::decode_key_text("300").unwrap_err();
        assert_eq!(
            "invalid integer \"300\": number too large to fit in target type",
            err.to_string()
        );
        assert_eq!("too short", KeyError::custom("too short").to_string());
    }
}
