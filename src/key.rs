use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;
use core::hash::BuildHasher;
use core::hash::Hash;

/// A key that can be stored in a [`HashMap`](crate::HashMap).
///
/// Keys supply a canonical textual representation, used by [`CharSum`] to
/// derive hash codes, and an equality test through [`Eq`]. Two equal keys
/// must write the same text.
pub trait TableKey: Eq {
    /// Writes the canonical textual representation of the key.
    fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Returns `true` for the null key, which every map operation rejects
    /// with [`Error::NullKey`](crate::Error::NullKey).
    fn is_null(&self) -> bool {
        false
    }
}

impl TableKey for str {
    fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str(self)
    }
}

impl TableKey for String {
    fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str(self)
    }
}

impl TableKey for char {
    fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_char(*self)
    }
}

macro_rules! display_keys {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TableKey for $ty {
                fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result {
                    write!(out, "{}", self)
                }
            }
        )*
    };
}

display_keys!(
    bool, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize
);

impl<T: TableKey + ?Sized> TableKey for &T {
    fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        (**self).write_text(out)
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}

impl<T: TableKey + ?Sized> TableKey for Box<T> {
    fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        (**self).write_text(out)
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}

/// `None` is the null key. It writes no text.
impl<T: TableKey> TableKey for Option<T> {
    fn write_text(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        match self {
            Some(key) => key.write_text(out),
            None => Ok(()),
        }
    }

    fn is_null(&self) -> bool {
        match self {
            Some(key) => key.is_null(),
            None => true,
        }
    }
}

/// Computes the hash code of a key.
///
/// The table only relies on equal keys producing equal hash codes. Collisions
/// are resolved by chaining, so any function works, however weak.
pub trait KeyHasher<K: ?Sized> {
    /// Returns the hash code of `key`.
    fn hash_key(&self, key: &K) -> u64;
}

/// The character-sum hash: adds up the Unicode scalar values of the key's
/// canonical text.
///
/// Any two keys whose texts are permutations of each other collide, e.g.
/// `"GI"` and `"FJ"` both hash to 144.
///
/// # Examples
///
/// ```rust
/// use chain_hash::key::CharSum;
/// use chain_hash::key::KeyHasher;
///
/// assert_eq!(CharSum.hash_key("GI"), 144);
/// assert_eq!(CharSum.hash_key("FJ"), 144);
/// assert_eq!(CharSum.hash_key(&12u32), u64::from('1') + u64::from('2'));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharSum;

struct TextSum(u64);

impl fmt::Write for TextSum {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            self.0 = self.0.wrapping_add(u64::from(c));
        }
        Ok(())
    }
}

impl<K: TableKey + ?Sized> KeyHasher<K> for CharSum {
    fn hash_key(&self, key: &K) -> u64 {
        let mut sum = TextSum(0);
        // TextSum never fails. A key whose formatting stops early hashes the
        // text written up to that point.
        let _ = key.write_text(&mut sum);
        sum.0
    }
}

/// Adapts a [`BuildHasher`] into a [`KeyHasher`] for keys implementing
/// [`Hash`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Hashed<S>(pub S);

impl<K, S> KeyHasher<K> for Hashed<S>
where
    K: Hash + ?Sized,
    S: BuildHasher,
{
    fn hash_key(&self, key: &K) -> u64 {
        self.0.hash_one(key)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// A randomly seeded, high-quality key hasher backed by `foldhash`.
        pub type DefaultHashBuilder = Hashed<foldhash::fast::RandomState>;
    } else if #[cfg(feature = "std")] {
        /// A randomly seeded, high-quality key hasher backed by the standard
        /// library's SipHash.
        pub type DefaultHashBuilder = Hashed<std::hash::RandomState>;
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone, Default)]
    struct SipBuilder;

    impl BuildHasher for SipBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(7, 11)
        }
    }

    #[test]
    fn char_sum_adds_code_points() {
        assert_eq!(CharSum.hash_key("A"), 65);
        assert_eq!(CharSum.hash_key("AB"), 131);
        assert_eq!(CharSum.hash_key(""), 0);
        assert_eq!(CharSum.hash_key("é"), 0xE9);
    }

    #[test]
    fn char_sum_anagrams_collide() {
        assert_eq!(CharSum.hash_key("GI"), 144);
        assert_eq!(CharSum.hash_key("FJ"), 144);
        assert_eq!(CharSum.hash_key("listen"), CharSum.hash_key("silent"));
    }

    #[test]
    fn char_sum_uses_display_text_for_numbers() {
        assert_eq!(CharSum.hash_key(&7u8), u64::from('7'));
        assert_eq!(CharSum.hash_key(&-1i32), u64::from('-') + u64::from('1'));
        assert_eq!(CharSum.hash_key(&12u64), CharSum.hash_key(&21u64));
        assert_eq!(CharSum.hash_key(&true), CharSum.hash_key("true"));
    }

    #[test]
    fn string_and_str_hash_alike() {
        let owned = "hello".to_string();
        assert_eq!(CharSum.hash_key(&owned), CharSum.hash_key("hello"));
        assert_eq!(CharSum.hash_key(&&owned), CharSum.hash_key("hello"));
        assert_eq!(
            CharSum.hash_key(&Box::<str>::from("hello")),
            CharSum.hash_key("hello")
        );
    }

    #[test]
    fn option_none_is_null() {
        assert!(None::<String>.is_null());
        assert!(!Some("a".to_string()).is_null());
        assert!(Some(None::<u32>).is_null());
        assert!(!"a".is_null());
        assert_eq!(CharSum.hash_key(&Some("GI")), 144);
    }

    #[test]
    fn hashed_is_deterministic_per_builder() {
        let hasher = Hashed(SipBuilder);
        assert_eq!(hasher.hash_key("GI"), hasher.hash_key("GI"));
        assert_ne!(hasher.hash_key("GI"), hasher.hash_key("FJ"));
    }
}
