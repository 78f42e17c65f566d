use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;

use crate::event::Event;
use crate::fault::contain;

type Handler = Rc<dyn Fn(&mut dyn Any) -> Result<()>>;

#[derive(Clone)]
struct Listener {
    priority: i32,
    handler: Handler,
}

/// Synchronous, typed publish/subscribe bus.
///
/// Listeners are keyed by the exact event type and kept sorted by
/// descending priority, ties in registration order. Each list is an
/// immutable snapshot: [`listen`](EventBus::listen) swaps in a new list,
/// so a handler may register listeners while a publish is iterating
/// without disturbing it.
///
/// The bus is a cheap handle; clones share the same listener table.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Rc<RefCell<HashMap<TypeId, Rc<[Listener]>>>>,
}

impl EventBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of type `T`.
    ///
    /// Higher priorities run first. A listener added during a publish of
    /// the same type takes effect from the next publish.
    pub fn listen<T, F>(&self, priority: i32, handler: F)
    where
        T: Event,
        F: Fn(&mut T) -> Result<()> + 'static,
    {
        let handler: Handler = Rc::new(move |event: &mut dyn Any| match event.downcast_mut::<T>()
        {
            Some(event) => handler(event),
            None => Ok(()),
        });

        let mut table = self.listeners.borrow_mut();
        let mut list = table
            .get(&TypeId::of::<T>())
            .map(|current| current.to_vec())
            .unwrap_or_default();
        let at = list
            .iter()
            .position(|l| l.priority < priority)
            .unwrap_or(list.len());
        list.insert(at, Listener { priority, handler });
        table.insert(TypeId::of::<T>(), Rc::from(list));

        tracing::trace!(event = type_name::<T>(), priority, "listener registered");
    }

    /// Dispatch `event` to every listener of its type.
    ///
    /// The cancellation flag is checked before each listener; once set,
    /// the remaining listeners are skipped. A listener that errors or
    /// panics is logged and dispatch continues with the next one.
    pub fn publish<T: Event>(&self, event: &mut T) {
        let Some(listeners) = self.snapshot(TypeId::of::<T>()) else {
            return;
        };

        for listener in listeners.iter() {
            if event.is_cancelled() {
                tracing::trace!(event = type_name::<T>(), "dispatch stopped by cancellation");
                break;
            }

            let target: &mut dyn Any = &mut *event;
            if let Err(fault) = contain(|| (listener.handler)(target)) {
                tracing::error!(
                    event = type_name::<T>(),
                    priority = listener.priority,
                    error = %fault,
                    "event listener failed"
                );
            }
        }
    }

    /// Number of listeners currently registered for `T`.
    pub fn listener_count<T: Event>(&self) -> usize {
        self.snapshot(TypeId::of::<T>())
            .map_or(0, |listeners| listeners.len())
    }

    /// Drop every listener of every type.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    fn snapshot(&self, id: TypeId) -> Option<Rc<[Listener]>> {
        self.listeners.borrow().get(&id).cloned()
    }
}
