//! Runtime cycle detection
//!
//! Each thread keeps a stack of the bindings it is constructing. Threads blocked
//! on a slot another thread is constructing are recorded in a wait-for list, so a
//! cycle spanning several threads fails instead of blocking forever.

use super::scope::lock;
use crate::{Key, error::{Error, Name}};
use std::{
    cell::RefCell,
    sync::Mutex,
    thread::{self, ThreadId},
};

thread_local! {
    /// Bindings currently under construction on this thread, as `(scope id, key)`
    static IN_PROGRESS: RefCell<Vec<(usize, Key)>> = const { RefCell::new(Vec::new()) };
}

/// A thread blocked until `owner` finishes constructing `key` in `slot`
#[derive(Debug, Clone, Copy)]
struct Waiting {
    thread: ThreadId,
    owner: ThreadId,
    slot: usize,
    key: Key,
}

static WAITING: Mutex<Vec<Waiting>> = Mutex::new(Vec::new());

/// Records that the current thread is about to wait for `owner` to construct `key`.
///
/// Fails with [`Error::Cycle`] if `owner` is, directly or through other threads,
/// waiting for the current thread.
pub(crate) fn wait_for(slot: usize, key: Key, owner: ThreadId) -> Result<(), Error> {
    let current = thread::current().id();
    let mut waiting = lock(&WAITING);

    let mut chain = vec![Name::Borrowed(key.name())];
    let mut next = owner;
    while next != current {
        let Some(edge) = waiting.iter().find(|w| w.thread == next) else {
            break;
        };
        chain.push(Name::Borrowed(edge.key.name()));
        next = edge.owner;
        if chain.len() > waiting.len() + 1 {
            break;
        }
    }
    if next == current {
        chain.push(Name::Borrowed(key.name()));
        return Err(Error::Cycle(chain));
    }

    waiting.retain(|w| w.thread != current);
    waiting.push(Waiting { thread: current, owner, slot, key });
    Ok(())
}

/// Removes the wait-for record of the current thread
pub(crate) fn stop_waiting() {
    let current = thread::current().id();
    lock(&WAITING).retain(|w| w.thread != current);
}

/// Removes the records of every thread waiting on `slot`, once it is filled
pub(crate) fn release_waiters(slot: usize) {
    lock(&WAITING).retain(|w| w.slot != slot);
}

/// Marks a binding as being resolved for as long as the guard lives
#[derive(Debug)]
pub(crate) struct ResolutionGuard(());

impl ResolutionGuard {
    /// Pushes `(scope_id, key)` onto the stack, or fails with [`Error::Cycle`]
    /// if it is already there.
    pub(crate) fn enter(scope_id: usize, key: Key) -> Result<Self, Error> {
        IN_PROGRESS.with_borrow_mut(|stack| {
            if let Some(pos) = stack.iter().position(|entry| *entry == (scope_id, key)) {
                let chain = stack[pos..]
                    .iter()
                    .map(|(_, key)| Name::Borrowed(key.name()))
                    .chain(std::iter::once(Name::Borrowed(key.name())))
                    .collect();
                return Err(Error::Cycle(chain));
            }
            stack.push((scope_id, key));
            Ok(Self(()))
        })
    }
}

impl Drop for ResolutionGuard {
    #[inline]
    fn drop(&mut self) {
        IN_PROGRESS.with_borrow_mut(|stack| {
            stack.pop();
        });
    }
}
