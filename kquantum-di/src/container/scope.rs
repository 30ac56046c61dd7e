//! Scope instances: memoization slots and lifecycle

use super::{
    Container,
    binding::{ArcService, Binding, Provider, Registry},
    resolution::{self, ResolutionGuard},
};
use crate::{Key, ScopeTag, error::Error};
use std::{
    collections::HashMap,
    mem,
    sync::{
        Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak,
        atomic::{AtomicU8, Ordering},
    },
    thread::{self, ThreadId},
};

/// Lifecycle state of a scope instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ScopeState {
    /// The scope is being wired to its parent
    Created = 0,
    /// The scope resolves services
    Active = 1,
    /// The scope was closed and released its instances
    Destroyed = 2,
}

impl From<u8> for ScopeState {
    #[inline]
    fn from(value: u8) -> Self {
        match value {
            0 => ScopeState::Created,
            1 => ScopeState::Active,
            _ => ScopeState::Destroyed,
        }
    }
}

type CloseListener = Box<dyn FnOnce() + Send>;

pub(crate) enum SlotState {
    Vacant,
    Constructing(ThreadId),
    Ready(ArcService),
    Failed(Error),
    Released,
}

/// Memoization cell of one binding in one scope instance.
///
/// The lock is held only to read or change the state, never while a factory runs.
pub(crate) struct Slot {
    state: Mutex<SlotState>,
    filled: Condvar,
}

impl Slot {
    fn new(state: SlotState) -> Self {
        Self {
            state: Mutex::new(state),
            filled: Condvar::new(),
        }
    }

    #[inline]
    fn id(&self) -> usize {
        self as *const Self as usize
    }

    /// Returns the memoized instance, or `None` once the current thread
    /// has claimed the slot and must construct it.
    ///
    /// Blocks while another thread constructs it.
    fn acquire(&self, key: Key, tag: &ScopeTag) -> Result<Option<ArcService>, Error> {
        let current = thread::current().id();
        let mut state = lock(&self.state);
        loop {
            match &*state {
                SlotState::Ready(instance) => return Ok(Some(instance.clone())),
                SlotState::Failed(err) => return Err(err.clone()),
                SlotState::Released => return Err(Error::ScopeClosed(tag.clone())),
                SlotState::Vacant => {
                    *state = SlotState::Constructing(current);
                    return Ok(None);
                },
                SlotState::Constructing(owner) => {
                    resolution::wait_for(self.id(), key, *owner)?;
                    state = self.filled
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                    resolution::stop_waiting();
                },
            }
        }
    }

    fn fill(&self, value: SlotState) {
        let mut state = lock(&self.state);
        *state = value;
        resolution::release_waiters(self.id());
        drop(state);
        self.filled.notify_all();
    }

    /// Drops the memoized instance unless a construction is in flight
    fn release(&self) {
        let mut state = lock(&self.state);
        if matches!(*state, SlotState::Constructing(_)) {
            return;
        }
        *state = SlotState::Released;
        resolution::release_waiters(self.id());
        drop(state);
        self.filled.notify_all();
    }
}

/// A slot claimed for construction; reset to vacant if the factory unwinds
struct Claim<'a> {
    slot: &'a Slot,
    filled: bool,
}

impl Claim<'_> {
    fn fill(mut self, value: SlotState) {
        self.filled = true;
        self.slot.fill(value);
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.filled {
            self.slot.fill(SlotState::Vacant);
        }
    }
}

/// A binding visible from a scope level.
///
/// Memoized bindings carry a slot.
pub(crate) struct Entry {
    binding: usize,
    slot: Option<Slot>,
}

pub(crate) struct ScopeInner {
    pub(super) tag: ScopeTag,
    pub(super) registry: Arc<Registry>,
    pub(super) parent: Option<Container>,
    entries: HashMap<Key, Entry>,
    state: AtomicU8,
    /// Memoized instances in creation order, for disposal.
    ///
    /// Held while the state moves to `Destroyed`, so every instance is either
    /// recorded here before shutdown or disposed by its constructor.
    created: Mutex<Vec<(usize, ArcService)>>,
    children: Mutex<Vec<Weak<ScopeInner>>>,
    listeners: Mutex<Vec<CloseListener>>,
}

#[inline]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScopeInner {
    /// Creates a scope instance in the [`ScopeState::Created`] state
    pub(super) fn new(tag: ScopeTag, registry: Arc<Registry>, parent: Option<Container>) -> Self {
        let mut created = Vec::new();
        let entries = registry
            .bindings_of(&tag)
            .map(|(key, &idx)| {
                let binding = &registry.bindings[idx];
                let slot = match &binding.provider {
                    Provider::Instance(instance) => {
                        created.push((idx, instance.clone()));
                        Some(Slot::new(SlotState::Ready(instance.clone())))
                    },
                    Provider::Factory(_) if binding.is_memoized() => Some(Slot::new(SlotState::Vacant)),
                    Provider::Factory(_) => None,
                };
                (*key, Entry { binding: idx, slot })
            })
            .collect();

        Self {
            tag,
            registry,
            parent,
            entries,
            state: AtomicU8::new(ScopeState::Created as u8),
            created: Mutex::new(created),
            children: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    #[inline]
    pub(super) fn id(&self) -> usize {
        self as *const Self as usize
    }

    #[inline]
    pub(super) fn state(&self) -> ScopeState {
        self.state.load(Ordering::Acquire).into()
    }

    #[inline]
    pub(super) fn activate(&self) {
        let _ = self.state.compare_exchange(
            ScopeState::Created as u8,
            ScopeState::Active as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    #[inline]
    pub(super) fn ensure_active(&self) -> Result<(), Error> {
        match self.state() {
            ScopeState::Destroyed => Err(Error::ScopeClosed(self.tag.clone())),
            _ => Ok(()),
        }
    }

    #[inline]
    pub(super) fn entry(&self, key: &Key) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub(super) fn add_child(&self, child: &Arc<ScopeInner>) {
        let mut children = lock(&self.children);
        children.retain(|c| c.strong_count() > 0);
        children.push(Arc::downgrade(child));
    }

    pub(super) fn add_listener(&self, listener: CloseListener) -> Result<(), Error> {
        self.ensure_active()?;
        lock(&self.listeners).push(listener);
        Ok(())
    }

    /// Resolves the binding of `entry`, which must belong to this scope instance
    pub(super) fn resolve_entry(&self, owner: &Container, entry: &Entry) -> Result<ArcService, Error> {
        let binding = &self.registry.bindings[entry.binding];
        let _guard = ResolutionGuard::enter(self.id(), binding.key)?;

        let Some(slot) = &entry.slot else {
            return self.construct(owner, binding);
        };

        if let Some(instance) = slot.acquire(binding.key, &self.tag)? {
            return Ok(instance);
        }

        let claim = Claim { slot, filled: false };
        let result = self.construct(owner, binding);

        let mut created = lock(&self.created);
        if self.state() == ScopeState::Destroyed {
            drop(created);
            claim.fill(SlotState::Released);
            if let (Ok(instance), Some(dispose)) = (&result, &binding.disposer) {
                dispose(instance);
            }
            return Err(Error::ScopeClosed(self.tag.clone()));
        }

        match result {
            Ok(instance) => {
                created.push((entry.binding, instance.clone()));
                claim.fill(SlotState::Ready(instance.clone()));
                Ok(instance)
            },
            Err(err) => {
                drop(created);
                claim.fill(SlotState::Failed(err.clone()));
                Err(err)
            },
        }
    }

    fn construct(&self, owner: &Container, binding: &Binding) -> Result<ArcService, Error> {
        match &binding.provider {
            Provider::Instance(instance) => Ok(instance.clone()),
            Provider::Factory(factory) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(service = binding.key.name(), scope = %self.tag, "constructing service");

                let result = factory(owner);

                #[cfg(feature = "tracing")]
                if let Err(err) = &result {
                    tracing::warn!(service = binding.key.name(), scope = %self.tag, "failed to construct service: {err}");
                }

                result
            },
        }
    }

    /// Moves the scope to [`ScopeState::Destroyed`]: closes live children, disposes memoized
    /// instances in reverse creation order, runs close listeners and releases the instances.
    pub(super) fn shutdown(&self) {
        let created = {
            let mut created = lock(&self.created);
            let previous = self.state.swap(ScopeState::Destroyed as u8, Ordering::AcqRel);
            if ScopeState::from(previous) == ScopeState::Destroyed {
                return;
            }
            mem::take(&mut *created)
        };

        let children = mem::take(&mut *lock(&self.children));
        for child in children.iter().rev() {
            if let Some(child) = child.upgrade() {
                child.shutdown();
            }
        }

        for (idx, instance) in created.iter().rev() {
            if let Some(dispose) = &self.registry.bindings[*idx].disposer {
                dispose(instance);
            }
        }

        let listeners = mem::take(&mut *lock(&self.listeners));
        for listener in listeners.into_iter().rev() {
            listener();
        }

        // a slot under construction is released by its constructor
        for slot in self.entries.values().filter_map(|e| e.slot.as_ref()) {
            slot.release();
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(scope = %self.tag, released = created.len(), "scope closed");
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.shutdown();
    }
}
