//! Closure-mediated accessor storage
//!
//! The value lives with some external owner and is reached through a getter
//! and an optional setter. Closures own what they capture; use
//! [`StoredValue::bind`] to reach shared state without keeping it alive.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use expose_types::{NativeType, TypeDescriptor};

use super::Typed;

type Getter<T> = Box<dyn Fn() -> T>;
type Setter<T> = Box<dyn Fn(T) -> bool>;

/// Accessor backed by getter/setter closures.
pub struct StoredValue<T: NativeType> {
    descriptor: Rc<TypeDescriptor<T>>,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
}

impl<T: NativeType> StoredValue<T> {
    /// Create a read/write accessor
    pub fn new<G, S>(getter: G, setter: S) -> Self
    where
        G: Fn() -> T + 'static,
        S: Fn(T) + 'static,
    {
        Self::checked(getter, move |value| {
            setter(value);
            true
        })
    }

    /// Create a read/write accessor whose setter may reject values
    pub fn checked<G, S>(getter: G, setter: S) -> Self
    where
        G: Fn() -> T + 'static,
        S: Fn(T) -> bool + 'static,
    {
        Self {
            descriptor: Rc::new(TypeDescriptor::new()),
            getter: Box::new(getter),
            setter: Some(Box::new(setter)),
        }
    }

    /// Create an accessor without a setter
    pub fn read_only<G>(getter: G) -> Self
    where
        G: Fn() -> T + 'static,
    {
        Self {
            descriptor: Rc::new(TypeDescriptor::new()),
            getter: Box::new(getter),
            setter: None,
        }
    }

    /// Bind to a field of shared state.
    ///
    /// Holds a weak link: once `state` is dropped, or while it is mutably
    /// borrowed elsewhere, reads yield the default value and writes fail.
    pub fn bind<S, G, W>(state: &Rc<RefCell<S>>, get: G, set: W) -> Self
    where
        S: 'static,
        G: Fn(&S) -> T + 'static,
        W: Fn(&mut S, T) + 'static,
    {
        let link = Rc::downgrade(state);
        let write_link = link.clone();
        Self::checked(
            move || read_state(&link, &get),
            move |value| write_state(&write_link, |s| set(s, value)),
        )
    }

    /// Bind read-only to a field of shared state
    pub fn bind_read_only<S, G>(state: &Rc<RefCell<S>>, get: G) -> Self
    where
        S: 'static,
        G: Fn(&S) -> T + 'static,
    {
        let link = Rc::downgrade(state);
        Self::read_only(move || read_state(&link, &get))
    }

    /// Use a shared descriptor (usually from a `TypeContext`)
    pub fn with_descriptor(mut self, descriptor: Rc<TypeDescriptor<T>>) -> Self {
        self.descriptor = descriptor;
        self
    }
}

fn read_state<S, T: NativeType>(link: &Weak<RefCell<S>>, get: &impl Fn(&S) -> T) -> T {
    let Some(state) = link.upgrade() else {
        return T::default_value();
    };
    let value = match state.try_borrow() {
        Ok(state) => get(&*state),
        Err(_) => T::default_value(),
    };
    value
}

fn write_state<S>(link: &Weak<RefCell<S>>, set: impl FnOnce(&mut S)) -> bool {
    let Some(state) = link.upgrade() else {
        log::debug!("write to dropped state ignored");
        return false;
    };
    let written = match state.try_borrow_mut() {
        Ok(mut state) => {
            set(&mut *state);
            true
        }
        Err(_) => false,
    };
    written
}

impl<T: NativeType> Typed for StoredValue<T> {
    type Value = T;

    fn descriptor(&self) -> &TypeDescriptor<T> {
        &self.descriptor
    }

    fn value(&self) -> T {
        (self.getter)()
    }

    fn set_value(&mut self, value: T) -> bool {
        match &self.setter {
            Some(setter) => setter(value),
            None => false,
        }
    }

    fn writable(&self) -> bool {
        self.setter.is_some()
    }
}

impl<T: NativeType> fmt::Debug for StoredValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredValue")
            .field("type", &T::type_name())
            .field("read_only", &self.setter.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::AbstractTyped;
    use std::cell::Cell;

    #[derive(Default)]
    struct Settings {
        volume: u8,
        title: String,
    }

    #[test]
    fn test_getter_and_setter_closures() {
        let cell = Rc::new(Cell::new(5i32));
        let (r, w) = (cell.clone(), cell.clone());
        let mut acc = StoredValue::new(move || r.get(), move |v| w.set(v));

        assert_eq!(acc.to_i64(), 5);
        assert!(acc.from_f64(-8.6));
        assert_eq!(cell.get(), -8);
    }

    #[test]
    fn test_checked_setter_rejects() {
        let cell = Rc::new(Cell::new(1u32));
        let (r, w) = (cell.clone(), cell.clone());
        let mut acc = StoredValue::checked(
            move || r.get(),
            move |v| {
                if v > 10 {
                    return false;
                }
                w.set(v);
                true
            },
        );

        assert!(acc.from_u64(7));
        assert!(!acc.from_u64(11));
        assert_eq!(cell.get(), 7);
    }

    #[test]
    fn test_read_only_rejects_every_write() {
        let mut acc = StoredValue::read_only(|| 3.5f64);
        assert!(acc.is_read_only());
        assert!(!acc.from_f64(1.0));
        assert!(!acc.from_string("2"));
        assert!(!acc.from_bool(true));
        assert_eq!(acc.to_f64(), 3.5);
    }

    #[test]
    fn test_bind_to_shared_state() {
        let state = Rc::new(RefCell::new(Settings::default()));
        let mut volume = StoredValue::bind(&state, |s: &Settings| s.volume, |s: &mut Settings, v| s.volume = v);
        let title = StoredValue::bind_read_only(&state, |s: &Settings| s.title.clone());

        assert!(volume.from_i64(300));
        assert_eq!(state.borrow().volume, 255);

        state.borrow_mut().title = "main".to_string();
        assert_eq!(AbstractTyped::to_string(&title), "main");
        assert!(title.is_read_only());
    }

    #[test]
    fn test_bind_after_state_dropped() {
        let state = Rc::new(RefCell::new(Settings { volume: 9, ..Default::default() }));
        let mut volume = StoredValue::bind(&state, |s: &Settings| s.volume, |s: &mut Settings, v| s.volume = v);
        drop(state);

        assert_eq!(volume.to_u64(), 0);
        assert!(!volume.from_u64(1));
    }
}
