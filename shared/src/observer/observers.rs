use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{ClassSubscription, HostType, InstanceId, StateValue, Subscription};

type LocalSelector = Box<dyn Fn(&StateValue) -> StateValue>;
type LocalPredicate = Box<dyn Fn(&StateValue, &StateValue) -> bool>;

enum Listener {
    Instance(RefCell<Box<dyn FnMut(&StateValue, &StateValue)>>),
    Class(ClassSubscription),
}

struct ListenerRecord {
    key: u64,
    selector: Option<LocalSelector>,
    predicate: Option<LocalPredicate>,
    listener: Listener,
    connected: Cell<bool>,
}

impl ListenerRecord {
    fn select(&self, state: &StateValue) -> StateValue {
        match (&self.selector, &self.listener) {
            (Some(selector), _) => selector(state),
            (None, Listener::Class(subscription)) => (subscription.selector)(state),
            (None, Listener::Instance(_)) => state.clone(),
        }
    }

    fn accepts(&self, selected: &StateValue, previous_selected: &StateValue) -> bool {
        match (&self.predicate, &self.listener) {
            (Some(predicate), _) => predicate(selected, previous_selected),
            (None, Listener::Class(subscription)) => subscription
                .predicate
                .as_ref()
                .map_or(true, |predicate| predicate(selected, previous_selected)),
            (None, Listener::Instance(_)) => true,
        }
    }

    fn fire(&self, id: &InstanceId, state: &StateValue, previous: &StateValue) {
        if !self.connected.get() {
            return;
        }

        let selected = self.select(state);
        let previous_selected = self.select(previous);
        if selected == previous_selected {
            return;
        }
        if !self.accepts(&selected, &previous_selected) {
            return;
        }

        match &self.listener {
            Listener::Instance(listener) => {
                let mut listener = listener.borrow_mut();
                (&mut *listener)(&selected, &previous_selected);
            }
            Listener::Class(subscription) => {
                (subscription.listener)(id, &selected, &previous_selected);
            }
        }
    }
}

#[derive(Default)]
pub(crate) struct ListenerList {
    records: Vec<Rc<ListenerRecord>>,
    next_key: u64,
}

impl ListenerList {
    fn push(&mut self, build: impl FnOnce(u64) -> ListenerRecord) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        self.records.push(Rc::new(build(key)));
        key
    }

    pub(crate) fn remove(&mut self, key: u64) {
        if let Some(index) = self.records.iter().position(|record| record.key == key) {
            let record = self.records.remove(index);
            record.connected.set(false);
        }
    }

    pub(crate) fn contains(&self, key: u64) -> bool {
        self.records.iter().any(|record| record.key == key)
    }
}

/// Ordered listener records watching one instance's state.
///
/// Listeners run synchronously, in subscription order. A listener only runs
/// when its selected value changed, and when its predicate (if any) accepts
/// the new and old selected values.
pub struct Observers {
    host_type: HostType,
    list: Rc<RefCell<ListenerList>>,
}

impl Observers {
    pub fn new(host_type: HostType) -> Self {
        Self {
            host_type,
            list: Rc::new(RefCell::new(ListenerList::default())),
        }
    }

    pub fn subscribe<S, L>(&self, selector: S, listener: L) -> Subscription
    where
        S: Fn(&StateValue) -> StateValue + 'static,
        L: FnMut(&StateValue, &StateValue) + 'static,
    {
        self.push(Some(Box::new(selector)), None, listener)
    }

    pub fn subscribe_if<S, P, L>(&self, selector: S, predicate: P, listener: L) -> Subscription
    where
        S: Fn(&StateValue) -> StateValue + 'static,
        P: Fn(&StateValue, &StateValue) -> bool + 'static,
        L: FnMut(&StateValue, &StateValue) + 'static,
    {
        self.push(Some(Box::new(selector)), Some(Box::new(predicate)), listener)
    }

    fn push<L>(
        &self,
        selector: Option<LocalSelector>,
        predicate: Option<LocalPredicate>,
        listener: L,
    ) -> Subscription
    where
        L: FnMut(&StateValue, &StateValue) + 'static,
    {
        let key = self.list.borrow_mut().push(|key| ListenerRecord {
            key,
            selector,
            predicate,
            listener: Listener::Instance(RefCell::new(Box::new(listener))),
            connected: Cell::new(true),
        });
        Subscription::new(key, self.host_type, Rc::downgrade(&self.list))
    }

    /// Attaches a class-level subscription if its side includes this host
    pub fn attach_class(&self, subscription: &ClassSubscription) -> Option<Subscription> {
        if !subscription.side.includes(self.host_type) {
            return None;
        }
        let key = self.list.borrow_mut().push(|key| ListenerRecord {
            key,
            selector: None,
            predicate: None,
            listener: Listener::Class(subscription.clone()),
            connected: Cell::new(true),
        });
        Some(Subscription::new(
            key,
            self.host_type,
            Rc::downgrade(&self.list),
        ))
    }

    pub fn notify(&self, id: &InstanceId, state: &StateValue, previous: &StateValue) {
        // listeners may disconnect themselves or each other while running
        let records: Vec<Rc<ListenerRecord>> = self.list.borrow().records.clone();
        for record in records {
            record.fire(id, state, previous);
        }
    }

    /// Disconnects every listener
    pub fn clear(&self) {
        let mut list = self.list.borrow_mut();
        for record in list.records.drain(..) {
            record.connected.set(false);
        }
    }

    pub fn len(&self) -> usize {
        self.list.borrow().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }
}
