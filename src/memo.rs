//! Single-threaded memoizer.
//!
//! [`Memo`] wraps a pure computation and caches its results by the canonical
//! key of the arguments (see [`ArgKey`]). The computation runs at most once
//! per distinct key over the lifetime of the wrapper. The cache starts empty,
//! only grows, and is dropped together with the wrapper.
//!
//! Interior mutability lets every operation take `&self`. The cache is not
//! borrowed while the computation runs, so a computation may call back into
//! the same `Memo` (for example through an `Rc`) for other arguments.
//!
//! # Infallible computations
//!
//! ```
//! use std::cell::Cell;
//! use memo_rs::memo::Memo;
//!
//! let calls = Cell::new(0);
//! let square = Memo::new(|n: &u64| {
//!     calls.set(calls.get() + 1);
//!     n * n
//! });
//!
//! assert_eq!(square.call(5), Ok(25));
//! assert_eq!(square.call(5), Ok(25));
//! assert_eq!(calls.get(), 1);
//! ```
//!
//! # Fallible computations
//!
//! Failures propagate and are not cached:
//!
//! ```
//! use memo_rs::error::MemoError;
//! use memo_rs::memo::Memo;
//!
//! let sqrt = Memo::fallible(|x: &f64| if *x < 0.0 { Err("negative") } else { Ok(x.sqrt()) });
//!
//! assert_eq!(sqrt.try_call(4.0).unwrap(), 2.0);
//! assert!(matches!(sqrt.try_call(-1.0), Err(MemoError::Computation("negative"))));
//! assert!(matches!(sqrt.try_call(f64::NAN), Err(MemoError::InvalidArgument(_))));
//! assert_eq!(sqrt.len(), 1);
//! ```

use std::cell::RefCell;
use std::fmt::Debug;
use std::marker::PhantomData;

use log::debug;

use crate::cache::{Cache, CacheStats};
use crate::config::MemoConfig;
use crate::error::{KeyError, MemoError};
use crate::key::ArgKey;

/// Memoizing wrapper around a computation taking `&A` and producing `R`.
pub struct Memo<A: ArgKey, R, F> {
    func: F,
    cache: RefCell<Cache<A::Key, R>>,
    config: MemoConfig,
    _phantom: PhantomData<fn(&A)>,
}

impl<A: ArgKey, R, F> Memo<A, R, F> {
    fn build(func: F, config: MemoConfig) -> Self {
        Self {
            func,
            cache: RefCell::new(Cache::new(config.capacity_bits)),
            config,
            _phantom: PhantomData,
        }
    }

    pub fn config(&self) -> &MemoConfig {
        &self.config
    }

    /// Number of calls served from the cache.
    pub fn hits(&self) -> usize {
        self.cache.borrow().hits()
    }

    /// Number of calls that ran the computation.
    pub fn misses(&self) -> usize {
        self.cache.borrow().misses()
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    /// Returns whether a result for `args` is cached.
    pub fn contains(&self, args: &A) -> Result<bool, KeyError> {
        let key = args.arg_key(&self.config)?;
        Ok(self.cache.borrow().contains_key(&key))
    }

    /// Returns the cached result for `args` without computing it.
    pub fn peek(&self, args: &A) -> Result<Option<R>, KeyError>
    where
        R: Clone,
    {
        let key = args.arg_key(&self.config)?;
        Ok(self.cache.borrow().peek(&key).cloned())
    }

    /// Consumes the wrapper, dropping the cache, and returns the computation.
    pub fn into_inner(self) -> F {
        self.func
    }

    fn lookup(&self, key: &A::Key) -> Option<R>
    where
        R: Clone,
    {
        let mut cache = self.cache.borrow_mut();
        match cache.get(key) {
            Some(res) => {
                debug!("call({:?}) => cached", key);
                Some(res.clone())
            }
            None => {
                debug!("call({:?}) => computing...", key);
                None
            }
        }
    }

    fn store(&self, key: A::Key, res: R) -> R
    where
        R: Clone,
    {
        self.cache.borrow_mut().insert(key, res).clone()
    }
}

impl<A: ArgKey, R: Clone, F> Memo<A, R, F> {
    /// Wraps an infallible computation.
    pub fn new(func: F) -> Self
    where
        F: Fn(&A) -> R,
    {
        Self::build(func, MemoConfig::default())
    }

    /// Wraps an infallible computation with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity_bits` exceeds 31.
    pub fn with_config(func: F, config: MemoConfig) -> Self
    where
        F: Fn(&A) -> R,
    {
        Self::build(func, config)
    }

    /// Wraps a fallible computation. Only successful results are cached.
    pub fn fallible<E>(func: F) -> Self
    where
        F: Fn(&A) -> Result<R, E>,
    {
        Self::build(func, MemoConfig::default())
    }

    /// Wraps a fallible computation with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity_bits` exceeds 31.
    pub fn fallible_with_config<E>(func: F, config: MemoConfig) -> Self
    where
        F: Fn(&A) -> Result<R, E>,
    {
        Self::build(func, config)
    }

    /// Returns the result for `args`, computing it on the first call only.
    pub fn call(&self, args: A) -> Result<R, KeyError>
    where
        F: Fn(&A) -> R,
    {
        let key = args.arg_key(&self.config)?;
        if let Some(res) = self.lookup(&key) {
            return Ok(res);
        }
        let res = (self.func)(&args);
        Ok(self.store(key, res))
    }

    /// Returns the result for `args`, computing it until it first succeeds.
    pub fn try_call<E>(&self, args: A) -> Result<R, MemoError<E>>
    where
        F: Fn(&A) -> Result<R, E>,
    {
        let key = args.arg_key(&self.config)?;
        if let Some(res) = self.lookup(&key) {
            return Ok(res);
        }
        match (self.func)(&args) {
            Ok(res) => Ok(self.store(key, res)),
            Err(e) => {
                debug!("call({:?}) => failed, not cached", key);
                Err(MemoError::Computation(e))
            }
        }
    }
}

impl<A: ArgKey, R, F> Debug for Memo<A, R, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("Memo")
            .field("entries", &stats.entries)
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish()
    }
}

/// Wraps `func` in a [`Memo`] with the default configuration.
pub fn memoize<A, R, F>(func: F) -> Memo<A, R, F>
where
    A: ArgKey,
    R: Clone,
    F: Fn(&A) -> R,
{
    Memo::new(func)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use test_log::test;

    use super::*;
    use crate::value::{Args, Value};

    #[test]
    fn test_square() {
        let calls = Cell::new(0);
        let square = Memo::new(|n: &i64| {
            calls.set(calls.get() + 1);
            n * n
        });

        assert_eq!(square.call(5), Ok(25));
        assert_eq!(calls.get(), 1);
        assert_eq!(square.call(5), Ok(25));
        assert_eq!(calls.get(), 1);
        assert_eq!(square.call(6), Ok(36));
        assert_eq!(calls.get(), 2);

        assert_eq!(
            square.stats(),
            CacheStats {
                hits: 1,
                misses: 2,
                entries: 2,
            }
        );
    }

    #[test]
    fn test_failure_is_not_cached() {
        let calls = Cell::new(0);
        let checked = Memo::fallible(|n: &i32| {
            calls.set(calls.get() + 1);
            if *n < 0 {
                Err(format!("negative input: {}", n))
            } else {
                Ok(*n * 2)
            }
        });

        let err = checked.try_call(-1).unwrap_err();
        assert_eq!(err.into_computation(), Some("negative input: -1".to_string()));
        assert_eq!(calls.get(), 1);

        assert!(checked.try_call(-1).is_err());
        assert_eq!(calls.get(), 2);
        assert!(checked.is_empty());

        assert_eq!(checked.try_call(3).unwrap(), 6);
        assert_eq!(checked.try_call(3).unwrap(), 6);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_invalid_argument_skips_computation() {
        let calls = Cell::new(0);
        let half = Memo::new(|x: &f64| {
            calls.set(calls.get() + 1);
            x / 2.0
        });

        assert_eq!(half.call(f64::NAN), Err(KeyError::NotANumber { position: 0 }));
        assert_eq!(calls.get(), 0);
        assert_eq!(half.misses(), 0);

        assert_eq!(half.call(-0.0), Ok(-0.0));
        assert_eq!(half.call(0.0), Ok(-0.0));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_argument_order() {
        let concat = Memo::new(|(a, b): &(&'static str, &'static str)| format!("{}{}", a, b));

        assert_eq!(concat.call(("x", "y")).unwrap(), "xy");
        assert_eq!(concat.call(("y", "x")).unwrap(), "yx");
        assert_eq!(concat.len(), 2);
        assert_eq!(concat.misses(), 2);
    }

    #[test]
    fn test_zero_arguments() {
        let calls = Cell::new(0);
        let heavy = Memo::new(|_: &()| {
            calls.set(calls.get() + 1);
            vec!["testData"; 7000]
        });

        assert_eq!(heavy.call(()).unwrap()[999], "testData");
        assert_eq!(heavy.call(()).unwrap().len(), 7000);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_dynamic_types_are_distinct() {
        let calls = Cell::new(0);
        let show = Memo::new(|args: &Args| {
            calls.set(calls.get() + 1);
            args.iter().map(Value::type_name).collect::<Vec<_>>().join(",")
        });

        assert_eq!(show.call(crate::args![1]).unwrap(), "int");
        assert_eq!(show.call(crate::args!["1"]).unwrap(), "str");
        assert_eq!(show.call(crate::args![1.0]).unwrap(), "float");
        assert_eq!(show.call(crate::args![1]).unwrap(), "int");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_peek_and_contains() {
        let inc = Memo::new(|n: &u32| n + 1);

        assert_eq!(inc.contains(&1), Ok(false));
        assert_eq!(inc.peek(&1), Ok(None));
        inc.call(1).unwrap();
        assert_eq!(inc.contains(&1), Ok(true));
        assert_eq!(inc.peek(&1), Ok(Some(2)));
        assert_eq!(inc.hits(), 0);
        assert_eq!(inc.misses(), 1);
    }

    #[test]
    fn test_reentrant_recursion() {
        type Fib = Memo<u64, u64, Box<dyn Fn(&u64) -> u64>>;

        let slot: Rc<Cell<Option<&'static Fib>>> = Rc::new(Cell::new(None));
        let calls = Rc::new(Cell::new(0));
        let fib: &'static Fib = {
            let slot = Rc::clone(&slot);
            let calls = Rc::clone(&calls);
            let func: Box<dyn Fn(&u64) -> u64> = Box::new(move |n: &u64| {
                calls.set(calls.get() + 1);
                if *n < 2 {
                    return *n;
                }
                let fib = slot.get().unwrap();
                fib.call(n - 1).unwrap() + fib.call(n - 2).unwrap()
            });
            Box::leak(Box::new(Fib::new(func)))
        };
        slot.set(Some(fib));

        assert_eq!(fib.call(50), Ok(12586269025));
        assert_eq!(calls.get(), 51);
        assert_eq!(fib.len(), 51);
    }

    #[test]
    fn test_panic_leaves_key_absent() {
        let calls = Cell::new(0);
        let flaky = Memo::new(|n: &u32| {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                panic!("first attempt fails");
            }
            n + 1
        });

        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| flaky.call(0)));
        assert!(res.is_err());
        assert_eq!(flaky.contains(&0), Ok(false));
        assert!(flaky.is_empty());

        assert_eq!(flaky.call(0), Ok(1));
        assert_eq!(flaky.call(0), Ok(1));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    #[should_panic(expected = "Bits should be in the range 0..=31")]
    fn test_capacity_bits_limit() {
        let config = MemoConfig {
            capacity_bits: 32,
            ..MemoConfig::default()
        };
        let _ = Memo::with_config(|n: &u64| *n, config);
    }

    #[test]
    fn test_memoize_and_debug() {
        let len = memoize(|s: &String| s.len());
        assert_eq!(len.call("abc".to_string()), Ok(3));
        assert_eq!(format!("{:?}", len), "Memo { entries: 1, hits: 0, misses: 1 }");

        let func = len.into_inner();
        assert_eq!(func(&"abcd".to_string()), 4);
    }
}
