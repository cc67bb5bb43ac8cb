// SPDX-License-Identifier: MIT

//! Small inline-allocated ids used for ephemeral runtime objects (worker
//! slots, scheduler tasks, session handles). Content-addressed ids (run and
//! status ids) are *not* built on this type — see [`crate::context`] — since
//! they are derived from a hash rather than randomly generated.

use std::borrow::Borrow;
use std::fmt;

/// Inline fixed-capacity string buffer used as storage for generated ids.
///
/// Ids produced by [`define_id!`] are short (a one- or two-byte prefix plus
/// a 19-character nanoid), so storing them inline avoids a heap allocation
/// per id without reaching for a crate dependency just for that.
#[derive(Clone, Copy)]
pub struct IdBuf {
    len: u8,
    buf: [u8; Self::MAX_LEN],
}

impl IdBuf {
    pub const MAX_LEN: usize = 23;

    pub fn new(s: &str) -> Self {
        assert!(
            s.len() <= Self::MAX_LEN,
            "id {s:?} exceeds IdBuf::MAX_LEN ({})",
            Self::MAX_LEN
        );
        let mut buf = [0u8; Self::MAX_LEN];
        buf[..s.len()].copy_from_slice(s.as_bytes());
        Self {
            len: s.len() as u8,
            buf,
        }
    }

    pub fn as_str(&self) -> &str {
        // Safety argument: `buf` is only ever populated from a valid `&str`
        // in `new`, so the live prefix is always valid UTF-8.
        std::str::from_utf8(&self.buf[..self.len as usize]).unwrap_or_default()
    }
}

impl fmt::Debug for IdBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for IdBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for IdBuf {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for IdBuf {}

impl std::hash::Hash for IdBuf {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Borrow<str> for IdBuf {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl serde::Serialize for IdBuf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for IdBuf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(IdBuf::new(&s))
    }
}

/// Returns the last `n` characters of `s`, or the whole string if shorter.
pub fn short(s: &str, n: usize) -> &str {
    let char_count = s.chars().count();
    if char_count <= n {
        s
    } else {
        let skip = char_count - n;
        let byte_offset = s
            .char_indices()
            .nth(skip)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        &s[byte_offset..]
    }
}

/// Defines a newtype id wrapper backed by [`IdBuf`], with a short constant
/// prefix and a random suffix minted via `nanoid`.
#[macro_export]
macro_rules! define_id {
    ($name:ident, $prefix:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name($crate::id::IdBuf);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new() -> Self {
                Self(::$crate::id::IdBuf::new(&format!(
                    "{}{}",
                    Self::PREFIX,
                    nanoid::nanoid!(19)
                )))
            }

            pub fn from_string(s: impl AsRef<str>) -> Self {
                Self(::$crate::id::IdBuf::new(s.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// The id with its fixed prefix stripped.
            pub fn suffix(&self) -> &str {
                self.as_str()
                    .strip_prefix(Self::PREFIX)
                    .unwrap_or(self.as_str())
            }

            pub fn short(&self, n: usize) -> &str {
                $crate::id::short(self.as_str(), n)
            }

            pub fn is_empty(&self) -> bool {
                self.as_str().is_empty()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.as_str())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl From<&String> for $name {
            fn from(s: &String) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.as_str() == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                self.as_str()
            }
        }
    };
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
