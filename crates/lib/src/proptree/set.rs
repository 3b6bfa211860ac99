//! Ordered, named property arrays and the sets that own them.
//!
//! A [`PropertySet`] is the unit the form engine binds views to: a mapping
//! from array name to an ordered [`PropertyArray`] of values, where each
//! value is a scalar or a nested set behind a shared handle. The engine is
//! the only mutator of the tree within this subsystem; all cardinality math
//! is derived from the arrays' current sizes, never cached.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use super::{
    hooks::{PropertyEvent, PropertyEventKind, PropertyHook, PropertyHookCollection},
    value::Value,
};

/// Shared handle to a [`PropertySet`].
///
/// The engine is single-threaded; handles are `Rc<RefCell<..>>` so that a
/// view stays bound to its data location while the surrounding array is
/// reordered around it.
pub type PropertySetHandle = Rc<RefCell<PropertySet>>;

/// An ordered array of values under one name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyArray {
    name: String,
    values: Vec<Value>,
}

impl PropertyArray {
    /// Creates an empty array with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// The array's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values in order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The value at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// A handle to the nested set at `index`, if that entry is a set.
    pub fn get_set(&self, index: usize) -> Option<PropertySetHandle> {
        self.values.get(index).and_then(Value::as_set)
    }

    fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    fn insert(&mut self, index: usize, value: Value) {
        let index = index.min(self.values.len());
        self.values.insert(index, value);
    }

    /// Removes and returns the value at `index`. Out-of-range removal is a
    /// tolerated no-op.
    fn remove(&mut self, index: usize) -> Option<Value> {
        if index < self.values.len() {
            Some(self.values.remove(index))
        } else {
            None
        }
    }

    fn move_value(&mut self, from: usize, to: usize) -> bool {
        if from >= self.values.len() || to >= self.values.len() {
            return false;
        }
        let value = self.values.remove(from);
        self.values.insert(to, value);
        true
    }

    fn set(&mut self, index: usize, value: Value) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn deep_clone(&self) -> PropertyArray {
        PropertyArray {
            name: self.name.clone(),
            values: self.values.iter().map(Value::deep_clone).collect(),
        }
    }
}

/// A set of named, ordered property arrays.
///
/// # Examples
///
/// ```
/// use formwork::proptree::PropertySet;
///
/// let mut set = PropertySet::new();
/// set.set_string("title", "hello");
/// assert_eq!(set.string("title").as_deref(), Some("hello"));
///
/// let nested = set.add_set("items");
/// nested.borrow_mut().set_string("text", "first");
/// assert_eq!(set.array_len("items"), 1);
/// ```
#[derive(Debug, Default)]
pub struct PropertySet {
    arrays: Vec<PropertyArray>,
    hooks: PropertyHookCollection,
}

impl PropertySet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set behind a fresh handle.
    pub fn new_handle() -> PropertySetHandle {
        Self::into_handle(Self::new())
    }

    /// Wraps a set in a shared handle.
    pub fn into_handle(set: PropertySet) -> PropertySetHandle {
        Rc::new(RefCell::new(set))
    }

    /// Registers a change-notification hook on this set.
    pub fn add_hook(&mut self, hook: Arc<dyn PropertyHook>) {
        self.hooks.add_hook(hook);
    }

    fn emit(&self, kind: PropertyEventKind, array: &str, index: usize) {
        if !self.hooks.has_hooks() {
            return;
        }
        let event = PropertyEvent {
            kind,
            array: array.to_string(),
            index,
        };
        // Hook failures never roll back the mutation.
        let _ = self.hooks.execute(&event);
    }

    /// The names of all arrays, in insertion order.
    pub fn array_names(&self) -> Vec<&str> {
        self.arrays.iter().map(|a| a.name.as_str()).collect()
    }

    /// The array with the given name.
    pub fn array(&self, name: &str) -> Option<&PropertyArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    fn array_mut(&mut self, name: &str) -> Option<&mut PropertyArray> {
        self.arrays.iter_mut().find(|a| a.name == name)
    }

    fn array_or_create(&mut self, name: &str) -> &mut PropertyArray {
        if let Some(pos) = self.arrays.iter().position(|a| a.name == name) {
            return &mut self.arrays[pos];
        }
        self.arrays.push(PropertyArray::new(name));
        self.arrays.last_mut().expect("array pushed above")
    }

    /// The size of the named array; zero when the array does not exist.
    pub fn array_len(&self, name: &str) -> usize {
        self.array(name).map_or(0, PropertyArray::len)
    }

    /// Whether this set holds no values at all.
    pub fn is_empty(&self) -> bool {
        self.arrays.iter().all(PropertyArray::is_empty)
    }

    /// Whether this set holds no values outside the ignored array names.
    pub fn is_empty_ignoring(&self, ignored: &[&str]) -> bool {
        self.arrays
            .iter()
            .filter(|a| !ignored.contains(&a.name.as_str()))
            .all(PropertyArray::is_empty)
    }

    /// Removes the named array entirely. Missing arrays are a no-op.
    pub fn remove_array(&mut self, name: &str) -> Option<PropertyArray> {
        let pos = self.arrays.iter().position(|a| a.name == name)?;
        let removed = self.arrays.remove(pos);
        self.emit(PropertyEventKind::Removed, name, 0);
        Some(removed)
    }

    /// Re-attaches a previously removed array, replacing any existing one.
    pub fn restore_array(&mut self, array: PropertyArray) {
        let name = array.name.clone();
        if let Some(pos) = self.arrays.iter().position(|a| a.name == name) {
            self.arrays[pos] = array;
        } else {
            self.arrays.push(array);
        }
        self.emit(PropertyEventKind::Added, &name, 0);
    }

    /// Appends a value to the named array, creating the array if needed.
    pub fn add_value(&mut self, name: &str, value: impl Into<Value>) -> usize {
        let array = self.array_or_create(name);
        array.push(value.into());
        let index = array.len() - 1;
        self.emit(PropertyEventKind::Added, name, index);
        index
    }

    /// Inserts a value at `index` in the named array (clamped to the tail).
    pub fn insert_value(&mut self, name: &str, index: usize, value: impl Into<Value>) {
        self.array_or_create(name).insert(index, value.into());
        self.emit(PropertyEventKind::Added, name, index);
    }

    /// Replaces the value at `index`; false when the slot does not exist.
    pub fn set_value(&mut self, name: &str, index: usize, value: impl Into<Value>) -> bool {
        let replaced = self
            .array_mut(name)
            .is_some_and(|a| a.set(index, value.into()));
        if replaced {
            self.emit(PropertyEventKind::Changed, name, index);
        }
        replaced
    }

    /// Removes the value at `index`. Out-of-range or missing-array removal is
    /// a tolerated no-op returning `None`.
    pub fn remove_value(&mut self, name: &str, index: usize) -> Option<Value> {
        let removed = self.array_mut(name)?.remove(index);
        if removed.is_some() {
            self.emit(PropertyEventKind::Removed, name, index);
        }
        removed
    }

    /// Moves the value at `from` to `to` within the named array.
    pub fn move_value(&mut self, name: &str, from: usize, to: usize) -> bool {
        let moved = self.array_mut(name).is_some_and(|a| a.move_value(from, to));
        if moved {
            self.emit(PropertyEventKind::Changed, name, to);
        }
        moved
    }

    /// The value at `index` of the named array.
    pub fn value(&self, name: &str, index: usize) -> Option<Value> {
        self.array(name).and_then(|a| a.get(index)).cloned()
    }

    /// Appends a fresh nested set to the named array and returns its handle.
    pub fn add_set(&mut self, name: &str) -> PropertySetHandle {
        let handle = PropertySet::new_handle();
        self.add_value(name, Value::Set(handle.clone()));
        handle
    }

    /// Inserts a fresh nested set at `index` and returns its handle.
    pub fn insert_set(&mut self, name: &str, index: usize) -> PropertySetHandle {
        let handle = PropertySet::new_handle();
        self.insert_value(name, index, Value::Set(handle.clone()));
        handle
    }

    /// A handle to the nested set at `index` of the named array.
    pub fn get_set(&self, name: &str, index: usize) -> Option<PropertySetHandle> {
        self.array(name).and_then(|a| a.get_set(index))
    }

    /// Sets the scalar property (the first entry of the named array),
    /// creating the slot when absent.
    pub fn set_string(&mut self, name: &str, value: impl Into<String>) {
        let value = Value::String(value.into());
        if self.array_len(name) == 0 {
            self.add_value(name, value);
        } else {
            self.set_value(name, 0, value);
        }
    }

    /// The scalar string property (the first entry of the named array).
    pub fn string(&self, name: &str) -> Option<String> {
        self.value(name, 0)
            .and_then(|v| v.as_string().map(str::to_string))
    }

    /// The number of non-blank values in the named array.
    pub fn filled_count(&self, name: &str) -> usize {
        self.array(name)
            .map_or(0, |a| a.values().iter().filter(|v| !v.is_blank()).count())
    }

    /// Deep copy of all arrays. Hooks are not carried over.
    pub fn deep_clone(&self) -> PropertySet {
        PropertySet {
            arrays: self.arrays.iter().map(PropertyArray::deep_clone).collect(),
            hooks: PropertyHookCollection::new(),
        }
    }
}

impl PartialEq for PropertySet {
    fn eq(&self, other: &Self) -> bool {
        self.arrays == other.arrays
    }
}
