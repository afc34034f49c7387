/// A per-element flag that survives repeated visits by the page observer.
pub trait BindingMark {
    fn is_bound(&self, marker: &str) -> bool;
    fn mark_bound(&self, marker: &str);
}

/// Runs `attach` the first time `element` is seen and marks it, so listeners
/// never stack. Returns whether `attach` ran.
pub fn bind_once<E, F>(element: &E, marker: &str, attach: F) -> bool
where
    E: BindingMark,
    F: FnOnce(&E),
{
    if element.is_bound(marker) {
        return false;
    }
    element.mark_bound(marker);
    attach(element);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakeElement {
        attributes: RefCell<HashSet<String>>,
        listeners: Cell<u32>,
    }

    impl BindingMark for FakeElement {
        fn is_bound(&self, marker: &str) -> bool {
            self.attributes.borrow().contains(marker)
        }

        fn mark_bound(&self, marker: &str) {
            self.attributes.borrow_mut().insert(marker.to_string());
        }
    }

    #[test]
    fn second_bind_is_a_no_op() {
        let element = FakeElement::default();
        let attach = |el: &FakeElement| el.listeners.set(el.listeners.get() + 2);
        assert!(bind_once(&element, "data-bound", attach));
        assert!(!bind_once(&element, "data-bound", attach));
        assert_eq!(element.listeners.get(), 2);
    }

    #[test]
    fn markers_are_independent() {
        let element = FakeElement::default();
        assert!(bind_once(&element, "data-a", |_| {}));
        assert!(bind_once(&element, "data-b", |_| {}));
    }
}
