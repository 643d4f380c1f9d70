use std::cell::Cell;
use std::marker;
use std::thread::LocalKey;

/// Declares a thread-local slot holding a reference for the duration of a
/// closure.
///
/// Unlike the `scoped-tls` crate, reading the slot with
/// [`ScopedLocalKey::map`] returns `None` when no value is set rather than
/// panicking.
macro_rules! scoped_thread_local {
    ($(#[$attrs:meta])* $vis:vis static $name:ident: $ty:ty) => (
        $(#[$attrs])*
        $vis static $name: $crate::macros::scoped_thread_local::ScopedLocalKey<$ty>
            = unsafe {
                ::std::thread_local!(static SLOT: ::std::cell::Cell<*const ()> = const {
                    ::std::cell::Cell::new(::std::ptr::null())
                });
                $crate::macros::scoped_thread_local::ScopedLocalKey::new(&SLOT)
            };
    )
}
pub(crate) use scoped_thread_local;

/// A thread-local slot holding a reference to a `T`.
pub(crate) struct ScopedLocalKey<T> {
    inner: &'static LocalKey<Cell<*const ()>>,
    _marker: marker::PhantomData<T>,
}

unsafe impl<T> Sync for ScopedLocalKey<T> {}

impl<T> ScopedLocalKey<T> {
    #[doc(hidden)]
    /// # Safety
    ///
    /// Should only be called through the `scoped_thread_local` macro.
    pub(crate) const unsafe fn new(inner: &'static LocalKey<Cell<*const ()>>) -> Self {
        Self {
            inner,
            _marker: marker::PhantomData,
        }
    }

    /// Sets the slot to the provided reference while the closure runs.
    ///
    /// The previous value is restored on exit, including on unwinding.
    pub(crate) fn set<F, R>(&'static self, t: &T, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        struct Restore {
            key: &'static LocalKey<Cell<*const ()>>,
            val: *const (),
        }

        impl Drop for Restore {
            fn drop(&mut self) {
                self.key.with(|c| c.set(self.val));
            }
        }

        let prev = self.inner.with(|c| c.replace(t as *const T as *const ()));
        let _restore = Restore {
            key: self.inner,
            val: prev,
        };

        f()
    }

    /// Applies a closure to the referenced value, or returns `None` if the
    /// slot is empty.
    pub(crate) fn map<F, R>(&'static self, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        let val = self.inner.with(|c| c.get());
        if val.is_null() {
            return None;
        }

        // Safety: a non-null pointer was set by `set`, whose borrow outlives
        // the closure it runs.
        Some(f(unsafe { &*(val as *const T) }))
    }
}
