//! Array-composite accessor storage
//!
//! `StoredArray` reaches a fixed-size array through whole-array closures and
//! optional per-index closures added with the `with_element_*` builders. It
//! exposes one `ArrayElement` sub-accessor per index, created on first use;
//! every element reads and writes through the same storage as the parent.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use expose_types::{NativeType, TypeDescriptor};

use super::{AbstractTyped, Typed};

type ArrayGetter<E, const N: usize> = Rc<dyn Fn() -> [E; N]>;
type ArraySetter<E, const N: usize> = Rc<dyn Fn([E; N]) -> bool>;
type ElementGetter<E> = Rc<dyn Fn(usize) -> E>;
type ElementSetter<E> = Rc<dyn Fn(usize, E) -> bool>;

/// Closures shared by an array accessor and its elements.
struct ArrayAccess<E, const N: usize> {
    get: ArrayGetter<E, N>,
    set: Option<ArraySetter<E, N>>,
    get_element: Option<ElementGetter<E>>,
    set_element: Option<ElementSetter<E>>,
}

impl<E, const N: usize> Clone for ArrayAccess<E, N> {
    fn clone(&self) -> Self {
        Self {
            get: self.get.clone(),
            set: self.set.clone(),
            get_element: self.get_element.clone(),
            set_element: self.set_element.clone(),
        }
    }
}

impl<E: NativeType, const N: usize> ArrayAccess<E, N> {
    fn writable(&self) -> bool {
        self.set.is_some() || self.set_element.is_some()
    }

    fn read(&self) -> [E; N] {
        (self.get)()
    }

    fn write(&self, value: [E; N]) -> bool {
        match &self.set {
            Some(set) => set(value),
            None => false,
        }
    }

    fn read_element(&self, index: usize) -> E {
        if let Some(get_element) = &self.get_element {
            return get_element(index);
        }
        self.read()
            .get(index)
            .cloned()
            .unwrap_or_else(E::default_value)
    }

    fn write_element(&self, index: usize, value: E) -> bool {
        if index >= N {
            return false;
        }
        if let Some(set_element) = &self.set_element {
            return set_element(index, value);
        }
        let mut whole = self.read();
        whole[index] = value;
        self.write(whole)
    }
}

/// Accessor over a fixed-size array with per-element sub-accessors.
pub struct StoredArray<E: NativeType, const N: usize> {
    descriptor: Rc<TypeDescriptor<[E; N]>>,
    element_descriptor: Rc<TypeDescriptor<E>>,
    access: Rc<ArrayAccess<E, N>>,
    elements: OnceCell<Vec<ArrayElement<E, N>>>,
}

impl<E: NativeType, const N: usize> StoredArray<E, N> {
    /// Create from whole-array getter and setter
    pub fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn() -> [E; N] + 'static,
        S: Fn([E; N]) + 'static,
    {
        Self::checked(get, move |value| {
            set(value);
            true
        })
    }

    /// Create from a whole-array getter and a setter that may reject values
    pub fn checked<G, S>(get: G, set: S) -> Self
    where
        G: Fn() -> [E; N] + 'static,
        S: Fn([E; N]) -> bool + 'static,
    {
        Self::from_access(ArrayAccess {
            get: Rc::new(get),
            set: Some(Rc::new(set)),
            get_element: None,
            set_element: None,
        })
    }

    /// Create from a whole-array getter only
    pub fn read_only<G>(get: G) -> Self
    where
        G: Fn() -> [E; N] + 'static,
    {
        Self::from_access(ArrayAccess {
            get: Rc::new(get),
            set: None,
            get_element: None,
            set_element: None,
        })
    }

    /// Create from whole-array and per-element closures.
    ///
    /// Element reads and writes use the per-element closures; whole-array
    /// access uses the others.
    pub fn with_element_access<G, S, GE, SE>(get: G, set: S, get_element: GE, set_element: SE) -> Self
    where
        G: Fn() -> [E; N] + 'static,
        S: Fn([E; N]) + 'static,
        GE: Fn(usize) -> E + 'static,
        SE: Fn(usize, E) + 'static,
    {
        Self::new(get, set)
            .with_element_getter(get_element)
            .with_element_setter(set_element)
    }

    /// Read single elements through `get_element`
    pub fn with_element_getter<GE>(self, get_element: GE) -> Self
    where
        GE: Fn(usize) -> E + 'static,
    {
        self.modify(|access| access.get_element = Some(Rc::new(get_element)))
    }

    /// Write single elements through `set_element`
    pub fn with_element_setter<SE>(self, set_element: SE) -> Self
    where
        SE: Fn(usize, E) + 'static,
    {
        self.with_checked_element_setter(move |index, value| {
            set_element(index, value);
            true
        })
    }

    /// Write single elements through `set_element`, which may reject values.
    ///
    /// Elements become writable even when the whole array is read-only.
    pub fn with_checked_element_setter<SE>(self, set_element: SE) -> Self
    where
        SE: Fn(usize, E) -> bool + 'static,
    {
        self.modify(|access| access.set_element = Some(Rc::new(set_element)))
    }

    fn modify(mut self, f: impl FnOnce(&mut ArrayAccess<E, N>)) -> Self {
        let mut access = (*self.access).clone();
        f(&mut access);
        self.access = Rc::new(access);
        self.elements = OnceCell::new();
        self
    }

    fn from_access(access: ArrayAccess<E, N>) -> Self {
        Self {
            descriptor: Rc::new(TypeDescriptor::new()),
            element_descriptor: Rc::new(TypeDescriptor::new()),
            access: Rc::new(access),
            elements: OnceCell::new(),
        }
    }

    /// Use shared descriptors (usually from a `TypeContext`).
    ///
    /// Must be called before any element is accessed.
    pub fn with_descriptors(
        mut self,
        descriptor: Rc<TypeDescriptor<[E; N]>>,
        element_descriptor: Rc<TypeDescriptor<E>>,
    ) -> Self {
        self.descriptor = descriptor;
        self.element_descriptor = element_descriptor;
        self.elements = OnceCell::new();
        self
    }

    /// Typed element accessor at `index`
    pub fn element(&self, index: usize) -> Option<&ArrayElement<E, N>> {
        self.elements().get(index)
    }

    /// Mutable typed element accessor at `index`
    pub fn element_mut(&mut self, index: usize) -> Option<&mut ArrayElement<E, N>> {
        self.elements();
        self.elements.get_mut()?.get_mut(index)
    }

    fn elements(&self) -> &Vec<ArrayElement<E, N>> {
        self.elements.get_or_init(|| {
            (0..N)
                .map(|index| ArrayElement {
                    descriptor: self.element_descriptor.clone(),
                    access: self.access.clone(),
                    index,
                })
                .collect()
        })
    }
}

impl<E: NativeType, const N: usize> Typed for StoredArray<E, N> {
    type Value = [E; N];

    fn descriptor(&self) -> &TypeDescriptor<[E; N]> {
        &self.descriptor
    }

    fn value(&self) -> [E; N] {
        self.access.read()
    }

    fn set_value(&mut self, value: [E; N]) -> bool {
        self.access.write(value)
    }

    fn writable(&self) -> bool {
        self.access.set.is_some()
    }

    fn composite(&self) -> bool {
        true
    }

    fn sub_count(&self) -> usize {
        N
    }

    fn sub(&self, index: usize) -> Option<&dyn AbstractTyped> {
        self.element(index).map(|e| e as &dyn AbstractTyped)
    }

    fn sub_mut(&mut self, index: usize) -> Option<&mut dyn AbstractTyped> {
        self.element_mut(index).map(|e| e as &mut dyn AbstractTyped)
    }
}

impl<E: NativeType, const N: usize> fmt::Debug for StoredArray<E, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredArray")
            .field("type", &<[E; N]>::type_name())
            .field("read_only", &self.access.set.is_none())
            .finish()
    }
}

/// Sub-accessor for one element of a [`StoredArray`].
pub struct ArrayElement<E: NativeType, const N: usize> {
    descriptor: Rc<TypeDescriptor<E>>,
    access: Rc<ArrayAccess<E, N>>,
    index: usize,
}

impl<E: NativeType, const N: usize> ArrayElement<E, N> {
    /// Position within the parent array
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<E: NativeType, const N: usize> Typed for ArrayElement<E, N> {
    type Value = E;

    fn descriptor(&self) -> &TypeDescriptor<E> {
        &self.descriptor
    }

    fn value(&self) -> E {
        self.access.read_element(self.index)
    }

    fn set_value(&mut self, value: E) -> bool {
        self.access.write_element(self.index, value)
    }

    fn writable(&self) -> bool {
        self.access.writable()
    }
}

impl<E: NativeType, const N: usize> fmt::Debug for ArrayElement<E, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayElement")
            .field("type", &E::type_name())
            .field("index", &self.index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Variant;
    use std::cell::{Cell, RefCell};

    fn shared_array() -> (Rc<RefCell<[i32; 3]>>, StoredArray<i32, 3>) {
        let storage = Rc::new(RefCell::new([0; 3]));
        let (r, w) = (storage.clone(), storage.clone());
        let acc = StoredArray::new(move || *r.borrow(), move |v| *w.borrow_mut() = v);
        (storage, acc)
    }

    #[test]
    fn test_elements_follow_whole_array() {
        let (_storage, mut acc) = shared_array();
        assert!(acc.is_composite());
        assert_eq!(acc.num_sub_values(), 3);
        assert!(acc.from_string("(101, 102, 103)"));

        let read: Vec<i64> = (0..3)
            .map(|i| acc.sub_value(i).map(|e| e.to_i64()).unwrap_or_default())
            .collect();
        assert_eq!(read, vec![101, 102, 103]);
        assert!(acc.sub_value(3).is_none());
    }

    #[test]
    fn test_element_write_changes_one_index() {
        let (storage, mut acc) = shared_array();
        let whole: Variant = vec![Variant::from(1), Variant::from(2), Variant::from(3)].into();
        assert!(acc.from_variant(&whole));

        let element = acc.sub_value_mut(1).unwrap();
        assert_eq!(element.type_name(), "i32");
        assert!(element.from_i64(20));

        assert_eq!(*storage.borrow(), [1, 20, 3]);
        assert_eq!(AbstractTyped::to_string(&acc), "(1, 20, 3)");
    }

    #[test]
    fn test_per_element_closures_preferred() {
        let storage = Rc::new(RefCell::new([false; 2]));
        let whole_writes = Rc::new(Cell::new(0));
        let (r, w, re, we) = (storage.clone(), storage.clone(), storage.clone(), storage.clone());
        let counter = whole_writes.clone();

        let mut acc = StoredArray::with_element_access(
            move || *r.borrow(),
            move |v| {
                counter.set(counter.get() + 1);
                *w.borrow_mut() = v;
            },
            move |i| re.borrow()[i],
            move |i, v| we.borrow_mut()[i] = v,
        );

        assert!(acc.element_mut(0).unwrap().from_string("true"));
        assert_eq!(*storage.borrow(), [true, false]);
        assert_eq!(whole_writes.get(), 0);
    }

    #[test]
    fn test_read_only_array_with_element_getter() {
        let reads = Rc::new(Cell::new(0));
        let counter = reads.clone();
        let acc = StoredArray::read_only(|| [10u16, 20, 30]).with_element_getter(move |i| {
            counter.set(counter.get() + 1);
            (i as u16 + 1) * 100
        });

        assert!(acc.is_read_only());
        assert_eq!(acc.sub_value(2).unwrap().to_u64(), 300);
        assert_eq!(reads.get(), 1);
        assert!(acc.sub_value(2).unwrap().is_read_only());
        assert_eq!(AbstractTyped::to_string(&acc), "(10, 20, 30)");
    }

    #[test]
    fn test_checked_element_setter_rejects() {
        let storage = Rc::new(RefCell::new([0i32; 3]));
        let (r, w) = (storage.clone(), storage.clone());
        let mut acc = StoredArray::read_only(move || *r.borrow()).with_checked_element_setter(move |i, v| {
            if i == 2 {
                return false;
            }
            w.borrow_mut()[i] = v;
            true
        });

        assert!(acc.is_read_only());
        assert!(!acc.from_string("(1, 2, 3)"));
        assert!(!acc.sub_value(0).unwrap().is_read_only());
        assert!(acc.sub_value_mut(0).unwrap().from_i64(7));
        assert!(!acc.sub_value_mut(2).unwrap().from_i64(9));
        assert_eq!(*storage.borrow(), [7, 0, 0]);
    }

    #[test]
    fn test_checked_whole_array_setter() {
        let storage = Rc::new(RefCell::new([1i32, 2]));
        let (r, w) = (storage.clone(), storage.clone());
        let mut acc = StoredArray::checked(
            move || *r.borrow(),
            move |v: [i32; 2]| {
                if v[0] > v[1] {
                    return false;
                }
                *w.borrow_mut() = v;
                true
            },
        );

        assert!(!acc.from_string("(5, 4)"));
        assert!(!acc.sub_value_mut(0).unwrap().from_i64(3));
        assert!(acc.sub_value_mut(1).unwrap().from_i64(3));
        assert_eq!(*storage.borrow(), [1, 3]);
    }

    #[test]
    fn test_read_only_array() {
        let mut acc = StoredArray::read_only(|| [1u8, 2]);
        assert!(acc.is_read_only());
        assert!(!acc.from_string("(3, 4)"));
        assert!(!acc.sub_value_mut(0).unwrap().from_u64(9));
        assert_eq!(acc.sub_value(0).unwrap().to_u64(), 1);
    }
}
