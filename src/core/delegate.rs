//! Delegate
//!
//! A multicast callback list. `trigger` snapshots the subscribers and drops
//! one-shot ones from the live list before calling anybody, so callbacks may
//! freely register or unregister during dispatch: the pass in flight always
//! runs exactly the snapshot.
//!
//! Callbacks receive the stage, which is how a sensor listener on one node
//! gets to move another.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Stage;
use crate::error::Result;

/// A subscriber. Identity is the `Rc` allocation, so keep a clone around to
/// unregister later.
pub type Callback<A> = Rc<dyn Fn(&mut Stage, &A) -> Result<()>>;

struct Subscriber<A> {
    callback: Callback<A>,
    oneshot: bool,
}

impl<A> Clone for Subscriber<A> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
            oneshot: self.oneshot,
        }
    }
}

pub struct Delegate<A> {
    subscribers: RefCell<Vec<Subscriber<A>>>,
}

impl<A> Default for Delegate<A> {
    fn default() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
        }
    }
}

impl<A> fmt::Debug for Delegate<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("subscribers", &self.len())
            .finish()
    }
}

fn same<A>(a: &Callback<A>, b: &Callback<A>) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

impl<A> Delegate<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a closure as a callback ready to register.
    pub fn callback(f: impl Fn(&mut Stage, &A) -> Result<()> + 'static) -> Callback<A> {
        Rc::new(f)
    }

    /// Adds a subscriber. A `oneshot` subscriber is dropped on its first trigger.
    /// Registering the same callback twice makes it fire twice.
    pub fn register(&self, callback: Callback<A>, oneshot: bool) {
        self.subscribers
            .borrow_mut()
            .push(Subscriber { callback, oneshot });
    }

    /// Removes the first registration of `callback`. No-op if absent.
    pub fn unregister(&self, callback: &Callback<A>) {
        let mut subscribers = self.subscribers.borrow_mut();
        if let Some(i) = subscribers.iter().position(|s| same(&s.callback, callback)) {
            subscribers.remove(i);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls every current subscriber in registration order. Stops at the
    /// first error.
    pub fn trigger(&self, stage: &mut Stage, args: &A) -> Result<()> {
        let snapshot = {
            let mut subscribers = self.subscribers.borrow_mut();
            let snapshot = subscribers.clone();
            subscribers.retain(|s| !s.oneshot);
            snapshot
        };

        for subscriber in snapshot {
            (subscriber.callback)(stage, args)?;
        }
        Ok(())
    }
}
