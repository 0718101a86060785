#![forbid(unsafe_code)]

//! Prop comparison.
//!
//! Value props compare with `PartialEq`; callbacks compare by reference
//! identity. [`Callback`] deliberately has no `PartialEq`, so the two notions
//! cannot be mixed up at a call site.

use std::fmt;
use std::rc::Rc;

/// Equality used by memoized components to decide whether props changed.
pub trait Prop {
    fn prop_eq(&self, other: &Self) -> bool;
}

macro_rules! value_props {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Prop for $ty {
                #[inline]
                fn prop_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

value_props!(
    (), bool, char, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, String, &'static str,
);

impl<T: Prop> Prop for Option<T> {
    fn prop_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.prop_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}

// A component's full prop list: changed if any one field changed.
macro_rules! tuple_props {
    ($(($($name:ident . $idx:tt),+)),* $(,)?) => {
        $(
            impl<$($name: Prop),+> Prop for ($($name,)+) {
                #[inline]
                fn prop_eq(&self, other: &Self) -> bool {
                    $(self.$idx.prop_eq(&other.$idx))&&+
                }
            }
        )*
    };
}

tuple_props!((A.0, B.1), (A.0, B.1, C.2));

/// A handler reference passed as a prop.
pub struct Callback<M> {
    inner: Rc<dyn Fn() -> M>,
}

impl<M> Callback<M> {
    /// Wrap a closure. Every call creates a new identity.
    pub fn new(f: impl Fn() -> M + 'static) -> Self {
        Self { inner: Rc::new(f) }
    }

    /// Invoke the handler.
    pub fn call(&self) -> M {
        (self.inner)()
    }

    /// Reference identity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<M> Clone for Callback<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M> Prop for Callback<M> {
    #[inline]
    fn prop_eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<M> fmt::Debug for Callback<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.inner).cast::<()>())
    }
}
