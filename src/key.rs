//! Canonical keys for argument sequences.
//!
//! Every argument type a memoized computation accepts implements [`ArgKey`],
//! which maps an argument value to a key that is equal for equal arguments
//! and distinct for arguments that differ in value, type or order.
//!
//! - Integers, `bool`, `char` and strings are their own keys.
//! - Floats are keyed by their bit pattern after folding `-0.0` into `0.0`.
//!   `NaN` is rejected with [`KeyError::NotANumber`], naming the position of
//!   the offending argument.
//! - Tuples key positionally, so `("x", "y")` and `("y", "x")` differ.
//!   `()` is the key of a computation without arguments.
//! - Sequences key element-wise, preserving order and length.
//!
//! Dynamically typed arguments go through [`Value`][crate::value::Value].

use std::fmt::Debug;
use std::hash::Hash;

use crate::config::MemoConfig;
use crate::error::KeyError;

/// Conversion of an argument sequence into its canonical cache key.
pub trait ArgKey {
    /// The canonical key type.
    type Key: Hash + Eq + Clone + Debug;

    /// Builds the canonical key, failing if the arguments have none.
    fn arg_key(&self, config: &MemoConfig) -> Result<Self::Key, KeyError>;
}

/// Canonical bit pattern of an `f64`.
pub(crate) fn canonical_f64(x: f64) -> Result<u64, KeyError> {
    if x.is_nan() {
        Err(KeyError::NotANumber { position: 0 })
    } else if x == 0.0 {
        Ok(0f64.to_bits())
    } else {
        Ok(x.to_bits())
    }
}

pub(crate) fn canonical_f32(x: f32) -> Result<u32, KeyError> {
    if x.is_nan() {
        Err(KeyError::NotANumber { position: 0 })
    } else if x == 0.0 {
        Ok(0f32.to_bits())
    } else {
        Ok(x.to_bits())
    }
}

macro_rules! impl_arg_key_identity {
    ($($t:ty),* $(,)?) => {
        $(
            impl ArgKey for $t {
                type Key = $t;

                #[inline]
                fn arg_key(&self, _config: &MemoConfig) -> Result<Self::Key, KeyError> {
                    Ok(self.clone())
                }
            }
        )*
    };
}

impl_arg_key_identity!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char, String, (),
);

impl ArgKey for str {
    type Key = String;

    fn arg_key(&self, _config: &MemoConfig) -> Result<Self::Key, KeyError> {
        Ok(self.to_owned())
    }
}

impl ArgKey for f64 {
    type Key = u64;

    fn arg_key(&self, _config: &MemoConfig) -> Result<Self::Key, KeyError> {
        canonical_f64(*self)
    }
}

impl ArgKey for f32 {
    type Key = u32;

    fn arg_key(&self, _config: &MemoConfig) -> Result<Self::Key, KeyError> {
        canonical_f32(*self)
    }
}

impl<T: ArgKey + ?Sized> ArgKey for &T {
    type Key = T::Key;

    fn arg_key(&self, config: &MemoConfig) -> Result<Self::Key, KeyError> {
        (**self).arg_key(config)
    }
}

impl<T: ArgKey + ?Sized> ArgKey for Box<T> {
    type Key = T::Key;

    fn arg_key(&self, config: &MemoConfig) -> Result<Self::Key, KeyError> {
        (**self).arg_key(config)
    }
}

impl<T: ArgKey> ArgKey for Option<T> {
    type Key = Option<T::Key>;

    fn arg_key(&self, config: &MemoConfig) -> Result<Self::Key, KeyError> {
        self.as_ref().map(|x| x.arg_key(config)).transpose()
    }
}

impl<T: ArgKey> ArgKey for [T] {
    type Key = Vec<T::Key>;

    fn arg_key(&self, config: &MemoConfig) -> Result<Self::Key, KeyError> {
        self.iter()
            .enumerate()
            .map(|(i, x)| x.arg_key(config).map_err(|e| e.at(i)))
            .collect()
    }
}

impl<T: ArgKey> ArgKey for Vec<T> {
    type Key = Vec<T::Key>;

    fn arg_key(&self, config: &MemoConfig) -> Result<Self::Key, KeyError> {
        self.as_slice().arg_key(config)
    }
}

impl<T: ArgKey, const N: usize> ArgKey for [T; N] {
    type Key = Vec<T::Key>;

    fn arg_key(&self, config: &MemoConfig) -> Result<Self::Key, KeyError> {
        self.as_slice().arg_key(config)
    }
}

macro_rules! impl_arg_key_tuple {
    ($($name:ident),+) => {
        impl<$($name: ArgKey),+> ArgKey for ($($name,)+) {
            type Key = ($($name::Key,)+);

            #[allow(non_snake_case, unused_assignments)]
            fn arg_key(&self, config: &MemoConfig) -> Result<Self::Key, KeyError> {
                let ($($name,)+) = self;
                let mut position = 0;
                Ok(($(
                    {
                        let key = $name.arg_key(config).map_err(|e| e.at(position))?;
                        position += 1;
                        key
                    },
                )+))
            }
        }
    };
}

impl_arg_key_tuple!(A);
impl_arg_key_tuple!(A, B);
impl_arg_key_tuple!(A, B, C);
impl_arg_key_tuple!(A, B, C, D);
impl_arg_key_tuple!(A, B, C, D, E);
impl_arg_key_tuple!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;

    fn key<T: ArgKey + ?Sized>(x: &T) -> Result<T::Key, KeyError> {
        x.arg_key(&MemoConfig::default())
    }

    #[test]
    fn test_identity_keys() {
        assert_eq!(key(&5u64), Ok(5));
        assert_eq!(key(&'a'), Ok('a'));
        assert_eq!(key("abc"), Ok("abc".to_string()));
        assert_eq!(key(&"abc"), key(&"abc".to_string()));
        assert_eq!(key(&()), Ok(()));
    }

    #[test]
    fn test_tuple_order() {
        assert_ne!(key(&("x", "y")), key(&("y", "x")));
        assert_eq!(key(&("x", "y")), key(&("x", "y")));
        assert_eq!(key(&(1, 2.5, "z")), Ok((1, 2.5f64.to_bits(), "z".to_string())));
    }

    #[test]
    fn test_sequence_keys() {
        assert_ne!(key(&vec![1, 2]), key(&vec![2, 1]));
        assert_ne!(key(&vec![1, 2]), key(&vec![1, 2, 0]));
        assert_eq!(key(&[1, 2, 3]), key(&vec![1, 2, 3]));
        assert_ne!(key(&Some(0)), key(&None::<i32>));
    }

    #[test]
    fn test_float_canonicalization() {
        assert_eq!(key(&0.0f64), key(&-0.0f64));
        assert_eq!(key(&0.0f32), key(&-0.0f32));
        assert_ne!(key(&1.0f64), key(&-1.0f64));
        assert_eq!(key(&f64::NAN), Err(KeyError::NotANumber { position: 0 }));
        assert_eq!(key(&f32::NAN), Err(KeyError::NotANumber { position: 0 }));
        assert!(key(&f64::INFINITY).is_ok());
    }

    #[test]
    fn test_nan_inside_composite() {
        assert_eq!(key(&(1, f64::NAN)), Err(KeyError::NotANumber { position: 1 }));
        assert_eq!(key(&(f64::NAN, 1, 2)), Err(KeyError::NotANumber { position: 0 }));
        assert_eq!(key(&("a", 2, 3.5, f32::NAN)), Err(KeyError::NotANumber { position: 3 }));
        assert_eq!(key(&vec![1.0, 2.0, f64::NAN]), Err(KeyError::NotANumber { position: 2 }));
        assert_eq!(key(&Some(f64::NAN)), Err(KeyError::NotANumber { position: 0 }));
    }
}
