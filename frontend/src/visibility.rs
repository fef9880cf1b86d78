use std::cell::RefCell;
use std::collections::BTreeSet;

use web_sys::Element;

use crate::config::PageConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Anything carrying a CSS class list.
pub trait ClassToggle {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;
}

impl ClassToggle for Element {
    fn add_class(&self, class: &str) {
        if let Err(err) = self.class_list().add_1(class) {
            log::error!("could not add class {}: {:?}", class, err);
        }
    }

    fn remove_class(&self, class: &str) {
        if let Err(err) = self.class_list().remove_1(class) {
            log::error!("could not remove class {}: {:?}", class, err);
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.class_list().contains(class)
    }
}

/// Detached class list, for code that has no DOM to talk to.
#[derive(Debug, Default)]
pub struct ClassSet(RefCell<BTreeSet<String>>);

impl ClassSet {
    pub fn new(classes: &[&str]) -> Self {
        ClassSet(RefCell::new(classes.iter().map(|c| c.to_string()).collect()))
    }
}

impl ClassToggle for ClassSet {
    fn add_class(&self, class: &str) {
        self.0.borrow_mut().insert(class.to_owned());
    }

    fn remove_class(&self, class: &str) {
        self.0.borrow_mut().remove(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.borrow().contains(class)
    }
}

#[derive(Clone, Debug)]
pub struct Toggler {
    hidden_class: String,
    visible_class: String,
}

impl Toggler {
    pub fn new(config: &PageConfig) -> Self {
        Toggler {
            hidden_class: config.hidden_class.clone(),
            visible_class: config.visible_class.clone(),
        }
    }

    pub fn hide<E: ClassToggle + ?Sized>(&self, element: &E) {
        element.add_class(&self.hidden_class);
        element.remove_class(&self.visible_class);
    }

    pub fn show<E: ClassToggle + ?Sized>(&self, element: &E) {
        element.add_class(&self.visible_class);
        element.remove_class(&self.hidden_class);
    }

    pub fn set<E: ClassToggle + ?Sized>(&self, element: &E, visibility: Visibility) {
        match visibility {
            Visibility::Visible => self.show(element),
            Visibility::Hidden => self.hide(element),
        }
    }

    /// Hides `from` and shows `to`.
    pub fn swap<A, B>(&self, from: &A, to: &B)
    where
        A: ClassToggle + ?Sized,
        B: ClassToggle + ?Sized,
    {
        self.hide(from);
        self.show(to);
    }

    /// `None` when the element carries neither or both classes.
    pub fn visibility<E: ClassToggle + ?Sized>(&self, element: &E) -> Option<Visibility> {
        match (
            element.has_class(&self.visible_class),
            element.has_class(&self.hidden_class),
        ) {
            (true, false) => Some(Visibility::Visible),
            (false, true) => Some(Visibility::Hidden),
            _ => None,
        }
    }
}
