//! Leaf Manager
//!
//! An ordered, named container. Executants keep their children in one and
//! their behaviors in another. Two ways to change it:
//! - Immediate `set`/`remove`/`clear`, each reporting the change to an
//!   `on_operate` observer *before* it lands, with the outgoing and incoming
//!   leaf side by side
//! - Deferred `bid`, which only queues a `Command`; `act` replays the queue in
//!   FIFO order. Executants act once per frame in the stand phase, so nothing
//!   a behavior bids during update or stay disturbs the frame in flight.
//!
//! Leaves keep insertion order. Replacing a leaf under an existing name keeps
//! its position.

use std::fmt;
use std::rc::Rc;

use crate::core::AntId;
use crate::error::{Error, Result};

/// Names usable as leaf keys.
pub trait LeafName: Clone + PartialEq + fmt::Display {
    /// The `n`th automatic name, used when `set` is called without one.
    fn nth(n: u32) -> Self;
}

/// Leaves are matched by identity, not by value.
pub trait Leaf {
    fn same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Leaf for Rc<T> {
    fn same(&self, other: &Self) -> bool {
        Rc::as_ptr(self).cast::<()>() == Rc::as_ptr(other).cast::<()>()
    }
}

impl<T: ?Sized> Leaf for Box<T> {
    fn same(&self, other: &Self) -> bool {
        std::ptr::eq(
            (self.as_ref() as *const T).cast::<()>(),
            (other.as_ref() as *const T).cast::<()>(),
        )
    }
}

impl Leaf for AntId {
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

/// Selects a leaf by name or by identity.
#[derive(Debug, Clone)]
pub enum Pick<K, V> {
    Name(K),
    Leaf(V),
}

/// A queued change, replayed by `act`.
#[derive(Debug, Clone)]
pub enum Command<K, V> {
    /// Store `leaf` under `name`, or under the first vacant automatic name.
    Set { leaf: V, name: Option<K> },
    /// Take a leaf out.
    Remove(Pick<K, V>),
    /// Destroy a leaf. Containers whose leaves have no teardown of their own
    /// treat this as `Remove`; the stage destroys executants for real.
    Destroy(Pick<K, V>),
}

/// Observer that ignores every operation.
pub fn unobserved<K, V>(_: &K, _: Option<&V>, _: Option<&V>) {}

#[derive(Debug)]
pub struct LeafManager<K, V> {
    leaves: Vec<(K, V)>,
    commands: Vec<Command<K, V>>,
}

impl<K, V> Default for LeafManager<K, V> {
    fn default() -> Self {
        Self {
            leaves: Vec::new(),
            commands: Vec::new(),
        }
    }
}

impl<K: LeafName, V: Leaf> LeafManager<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &K) -> Option<usize> {
        self.leaves.iter().position(|(k, _)| k == name)
    }

    pub fn get(&self, name: &K) -> Option<&V> {
        self.position(name).map(|i| &self.leaves[i].1)
    }

    pub fn get_mut(&mut self, name: &K) -> Option<&mut V> {
        self.position(name).map(move |i| &mut self.leaves[i].1)
    }

    pub fn contains(&self, name: &K) -> bool {
        self.position(name).is_some()
    }

    /// Name under which `leaf` is stored.
    pub fn index(&self, leaf: &V) -> Option<K> {
        self.leaves
            .iter()
            .find(|(_, v)| v.same(leaf))
            .map(|(k, _)| k.clone())
    }

    /// Lowest automatic name not in use.
    pub fn vacant(&self) -> K {
        let mut n = 0;
        loop {
            let name = K::nth(n);
            if !self.contains(&name) {
                return name;
            }
            n += 1;
        }
    }

    /// Stores `leaf` under `name` (or the first vacant automatic name) and
    /// returns the name used. `None` removes whatever was there.
    ///
    /// `on_operate` sees the name, the outgoing leaf and the incoming leaf
    /// before the container changes.
    pub fn set(
        &mut self,
        leaf: Option<V>,
        name: Option<K>,
        mut on_operate: impl FnMut(&K, Option<&V>, Option<&V>),
    ) -> K {
        let name = name.unwrap_or_else(|| self.vacant());
        let at = self.position(&name);

        on_operate(&name, at.map(|i| &self.leaves[i].1), leaf.as_ref());

        match (at, leaf) {
            (Some(i), Some(leaf)) => self.leaves[i].1 = leaf,
            (Some(i), None) => {
                self.leaves.remove(i);
            }
            (None, Some(leaf)) => self.leaves.push((name.clone(), leaf)),
            (None, None) => {}
        }
        name
    }

    /// Removes the leaf under `name`. No-op if there is none.
    pub fn remove(&mut self, name: &K, on_operate: impl FnMut(&K, Option<&V>, Option<&V>)) {
        if self.contains(name) {
            self.set(None, Some(name.clone()), on_operate);
        }
    }

    /// Removes `leaf` wherever it is stored. No-op if it is not here.
    pub fn remove_leaf(&mut self, leaf: &V, on_operate: impl FnMut(&K, Option<&V>, Option<&V>)) {
        if let Some(name) = self.index(leaf) {
            self.set(None, Some(name), on_operate);
        }
    }

    /// Resolves a pick to the name it currently refers to.
    pub fn resolve(&self, pick: &Pick<K, V>) -> Option<K> {
        match pick {
            Pick::Name(name) => self.contains(name).then(|| name.clone()),
            Pick::Leaf(leaf) => self.index(leaf),
        }
    }

    /// Removes every leaf, one notification each, in order.
    pub fn clear(&mut self, mut on_operate: impl FnMut(&K, Option<&V>, Option<&V>)) {
        let names: Vec<K> = self.names().cloned().collect();
        for name in names {
            self.remove(&name, &mut on_operate);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.leaves.iter().map(|(k, v)| (k, v))
    }

    pub fn names(&self) -> impl Iterator<Item = &K> {
        self.leaves.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.leaves.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.leaves.iter_mut().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Queues a command for the next `act`.
    pub fn bid(&mut self, command: Command<K, V>) {
        self.commands.push(command);
    }

    /// Number of queued commands.
    pub fn pending(&self) -> usize {
        self.commands.len()
    }

    /// Leaf of the first queued `Set` targeting `name`.
    pub fn pending_set(&self, name: &K) -> Option<&V> {
        self.commands.iter().find_map(|command| match command {
            Command::Set { leaf, name: Some(n) } if n == name => Some(leaf),
            _ => None,
        })
    }

    /// Hands the queue over to a caller that replays it itself.
    pub fn take_commands(&mut self) -> Vec<Command<K, V>> {
        std::mem::take(&mut self.commands)
    }

    /// Replays queued commands in order. Commands bid while acting wait for
    /// the next call.
    pub fn act(&mut self, mut on_operate: impl FnMut(&K, Option<&V>, Option<&V>)) {
        for command in self.take_commands() {
            match command {
                Command::Set { leaf, name } => {
                    self.set(Some(leaf), name, &mut on_operate);
                }
                Command::Remove(pick) | Command::Destroy(pick) => {
                    if let Some(name) = self.resolve(&pick) {
                        self.remove(&name, &mut on_operate);
                    }
                }
            }
        }
    }

    /// Finds `name` among the leaves, then among queued sets, then asks
    /// `make` for one and stores it. Fails when all three come up empty.
    pub fn need(
        &mut self,
        name: &K,
        make: impl FnOnce(&K) -> Option<V>,
        on_operate: impl FnMut(&K, Option<&V>, Option<&V>),
    ) -> Result<&V> {
        if let Some(i) = self.position(name) {
            return Ok(&self.leaves[i].1);
        }
        if self.pending_set(name).is_some() {
            return self.pending_set(name).ok_or_else(|| Error::missing(name));
        }

        let leaf = make(name).ok_or_else(|| Error::missing(name))?;
        self.set(Some(leaf), Some(name.clone()), on_operate);
        self.get(name).ok_or_else(|| Error::missing(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain string-or-number names for exercising the container alone.
    #[derive(Debug, Clone, PartialEq)]
    enum Key {
        N(u32),
        S(&'static str),
    }

    impl fmt::Display for Key {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Key::N(n) => write!(f, "{n}"),
                Key::S(s) => f.write_str(s),
            }
        }
    }

    impl LeafName for Key {
        fn nth(n: u32) -> Self {
            Key::N(n)
        }
    }

    type Leaves = LeafManager<Key, Rc<&'static str>>;

    fn leaf(text: &'static str) -> Rc<&'static str> {
        Rc::new(text)
    }

    #[test]
    fn test_auto_names_fill_lowest_gap() {
        let mut leaves = Leaves::new();
        let a = leaves.set(Some(leaf("a")), None, unobserved);
        let b = leaves.set(Some(leaf("b")), None, unobserved);
        assert_eq!((a, b.clone()), (Key::N(0), Key::N(1)));

        leaves.remove(&Key::N(0), unobserved);
        let c = leaves.set(Some(leaf("c")), None, unobserved);
        assert_eq!(c, Key::N(0));
        assert_eq!(leaves.vacant(), Key::N(2));
    }

    #[test]
    fn test_set_notifies_before_change() {
        let mut leaves = Leaves::new();
        let first = leaf("first");
        leaves.set(Some(first.clone()), Some(Key::S("x")), unobserved);

        let mut seen = Vec::new();
        let second = leaf("second");
        leaves.set(Some(second.clone()), Some(Key::S("x")), |name, before, after| {
            seen.push((name.clone(), before.map(|v| **v), after.map(|v| **v)));
        });
        assert_eq!(seen, vec![(Key::S("x"), Some("first"), Some("second"))]);
        assert!(leaves.get(&Key::S("x")).is_some_and(|v| v.same(&second)));

        seen.clear();
        leaves.remove_leaf(&second, |name, before, after| {
            seen.push((name.clone(), before.map(|v| **v), after.map(|v| **v)));
        });
        assert_eq!(seen, vec![(Key::S("x"), Some("second"), None)]);
        assert!(leaves.is_empty());
    }

    #[test]
    fn test_replace_keeps_order() {
        let mut leaves = Leaves::new();
        leaves.set(Some(leaf("a")), Some(Key::S("a")), unobserved);
        leaves.set(Some(leaf("b")), Some(Key::S("b")), unobserved);
        leaves.set(Some(leaf("a2")), Some(Key::S("a")), unobserved);
        let order: Vec<&str> = leaves.values().map(|v| **v).collect();
        assert_eq!(order, vec!["a2", "b"]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut leaves = Leaves::new();
        let mut calls = 0;
        leaves.remove(&Key::S("nope"), |_, _, _| calls += 1);
        leaves.remove_leaf(&leaf("stranger"), |_, _, _| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_identity_not_equality() {
        let mut leaves = Leaves::new();
        leaves.set(Some(leaf("same")), Some(Key::S("a")), unobserved);
        assert_eq!(leaves.index(&leaf("same")), None);
    }

    #[test]
    fn test_bid_waits_for_act() {
        let mut leaves = Leaves::new();
        let child = leaf("child");
        leaves.set(Some(child.clone()), Some(Key::S("c")), unobserved);

        leaves.bid(Command::Remove(Pick::Leaf(child.clone())));
        leaves.bid(Command::Set { leaf: leaf("late"), name: None });
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves.pending(), 2);

        let mut ops = Vec::new();
        leaves.act(|name, _, after| ops.push((name.clone(), after.is_some())));
        assert_eq!(ops, vec![(Key::S("c"), false), (Key::N(0), true)]);
        assert_eq!(leaves.pending(), 0);
        assert!(leaves.index(&child).is_none());
    }

    #[test]
    fn test_clear_notifies_each() {
        let mut leaves = Leaves::new();
        leaves.set(Some(leaf("a")), None, unobserved);
        leaves.set(Some(leaf("b")), None, unobserved);
        let mut removed = 0;
        leaves.clear(|_, before, after| {
            assert!(before.is_some() && after.is_none());
            removed += 1;
        });
        assert_eq!(removed, 2);
        assert!(leaves.is_empty());
    }

    #[test]
    fn test_need_uses_factory_and_persists() {
        let mut leaves = Leaves::new();
        let made = leaves
            .need(&Key::S("x"), |_| Some(leaf("made")), unobserved)
            .map(|v| **v);
        assert_eq!(made.ok(), Some("made"));
        assert_eq!(leaves.get(&Key::S("x")).map(|v| **v), Some("made"));
    }

    #[test]
    fn test_need_sees_pending_set() {
        let mut leaves = Leaves::new();
        let queued = leaf("queued");
        leaves.bid(Command::Set { leaf: queued.clone(), name: Some(Key::S("x")) });

        let found = leaves.need(&Key::S("x"), |_| None, unobserved).map(|v| v.same(&queued));
        assert!(matches!(found, Ok(true)));
        // still queued, not yet stored
        assert!(leaves.get(&Key::S("x")).is_none());
    }

    #[test]
    fn test_need_without_factory_fails() {
        let mut leaves = Leaves::new();
        let err = leaves.need(&Key::S("missing"), |_| None, unobserved);
        assert!(matches!(err, Err(Error::MissingLeaf { ref name }) if name == "missing"));
    }
}
