//! Observable values for state the rendering layer binds to.
//!
//! A [`Property`] stores a value and notifies listeners when it changes. The new
//! value is stored before any listener runs and no borrow is held while they
//! run, so a listener may read (or even set) the property it observes.

use std::cell::RefCell;
use std::rc::Rc;

type Listener<T> = Rc<dyn Fn(&T)>;

pub struct Property<T> {
    value: RefCell<T>,
    listeners: RefCell<Vec<Listener<T>>>,
}

impl<T: Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Property").field(&self.value.borrow()).finish()
    }
}

impl<T> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Register a listener called with the new value after every change.
    pub fn on_changed(&self, listener: impl Fn(&T) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }
}

impl<T: Clone + PartialEq> Property<T> {
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Store `value`. Returns `true` and notifies listeners if it differs from the old one.
    pub fn set(&self, value: T) -> bool {
        let changed = self.store(value);
        if changed {
            self.notify();
        }
        changed
    }

    /// Store `value` without notifying. Returns `true` if it differs from the old one.
    ///
    /// Pair with [`notify`](Self::notify) to publish several related values
    /// only once all of them are written.
    pub fn store(&self, value: T) -> bool {
        let mut current = self.value.borrow_mut();
        if *current == value {
            return false;
        }
        *current = value;
        true
    }

    /// Call every listener with the current value.
    pub fn notify(&self) {
        let value = self.get();
        let listeners: Vec<Listener<T>> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_listeners_fire_only_on_change() {
        let prop = Property::new(1);
        let calls = Rc::new(RefCell::new(Vec::new()));
        prop.on_changed({
            let calls = calls.clone();
            move |v| calls.borrow_mut().push(*v)
        });

        assert!(prop.set(2));
        assert!(!prop.set(2));
        assert!(prop.set(3));
        assert_eq!(*calls.borrow(), vec![2, 3]);
        assert_eq!(prop.get(), 3);
    }

    #[test]
    fn test_listener_can_read_property() {
        let prop = Rc::new(Property::new(false));
        let seen = Rc::new(Cell::new(false));
        prop.on_changed({
            let prop = Rc::downgrade(&prop);
            let seen = seen.clone();
            move |_| {
                if let Some(prop) = prop.upgrade() {
                    seen.set(prop.get());
                }
            }
        });

        prop.set(true);
        assert!(seen.get());
    }

    #[test]
    fn test_store_defers_notification() {
        let a = Property::new(0);
        let b = Rc::new(Property::new(0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        a.on_changed({
            let b = Rc::downgrade(&b);
            let seen = seen.clone();
            move |v| {
                if let Some(b) = b.upgrade() {
                    seen.borrow_mut().push((*v, b.get()));
                }
            }
        });

        assert!(a.store(1));
        assert!(b.store(2));
        assert!(!a.store(1));
        assert!(seen.borrow().is_empty());

        a.notify();
        assert_eq!(*seen.borrow(), vec![(1, 2)]);
    }
}
