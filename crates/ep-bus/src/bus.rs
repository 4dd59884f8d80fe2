//! `MessageBus` — synchronous, single-threaded, breadth-first delivery.
//!
//! The engine publishes notifications after commit and then calls
//! [`MessageBus::deliver_all`], which hands each queued notification to its
//! subscribers in registration order.  Handlers cannot publish
//! notifications, so one FIFO pass empties the queue; whatever requests the
//! handlers emit wait in the [`RequestQueue`] for the next resolve phase.

use std::collections::VecDeque;

use tracing::trace;

use ep_core::{SimClock, SimRng};
use ep_world::WorldState;

use crate::{
    BusError, BusResult, Envelope, Module, ModuleContext, ModuleId, ModuleKind, ModuleRegistry,
    Notification, Request, Topic, TopicPattern,
};

// ── RequestQueue ──────────────────────────────────────────────────────────────

/// Requests waiting for the next resolve phase, stamped in publish order.
#[derive(Default, Debug)]
pub struct RequestQueue {
    next_seq: u64,
    items:    Vec<Envelope>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: ModuleId, kind: ModuleKind, request: Request) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.items.push(Envelope { seq, source, kind, request });
    }

    /// Remove and return everything queued so far, in publish order.
    pub fn take(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Envelope] {
        &self.items
    }
}

// ── MessageBus ────────────────────────────────────────────────────────────────

pub struct MessageBus {
    /// Subscribers per topic (indexed by `Topic::index`), registration order.
    routes:   Vec<Vec<ModuleId>>,
    pending:  VecDeque<Notification>,
    requests: RequestQueue,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self {
            routes:   vec![Vec::new(); Topic::ALL.len()],
            pending:  VecDeque::new(),
            requests: RequestQueue::new(),
        }
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `module` to `registry` and subscribe it to every pattern it
    /// declares.  Nothing is registered if any pattern is invalid.
    pub fn register(&mut self, registry: &mut ModuleRegistry, module: Box<dyn Module>) -> BusResult<ModuleId> {
        if registry.find(module.name()).is_some() {
            return Err(BusError::DuplicateModule(module.name().to_owned()));
        }
        let patterns = module
            .subscriptions()
            .into_iter()
            .map(TopicPattern::parse)
            .collect::<BusResult<Vec<_>>>()?;
        let id = registry.push(module);
        for pattern in &patterns {
            self.subscribe_pattern(pattern, id);
        }
        Ok(id)
    }

    /// Subscribe an already registered module to one more pattern.
    pub fn subscribe(&mut self, pattern: &str, module: ModuleId) -> BusResult<()> {
        let pattern = TopicPattern::parse(pattern)?;
        self.subscribe_pattern(&pattern, module);
        Ok(())
    }

    fn subscribe_pattern(&mut self, pattern: &TopicPattern, module: ModuleId) {
        for topic in pattern.topics() {
            let subs = &mut self.routes[topic.index()];
            if !subs.contains(&module) {
                subs.push(module);
            }
        }
    }

    pub fn subscribers(&self, topic: Topic) -> &[ModuleId] {
        &self.routes[topic.index()]
    }

    /// Queue a notification.  A topic with no subscribers is dropped here.
    pub fn publish(&mut self, notification: Notification) {
        if self.routes[notification.topic().index()].is_empty() {
            return;
        }
        self.pending.push_back(notification);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn requests(&self) -> &RequestQueue {
        &self.requests
    }

    pub fn requests_mut(&mut self) -> &mut RequestQueue {
        &mut self.requests
    }

    /// Deliver every queued notification.  Returns the number of handler
    /// invocations.
    ///
    /// # Errors
    ///
    /// The first handler error, wrapped with the module name and topic.
    /// Remaining notifications are discarded.
    pub fn deliver_all(
        &mut self,
        registry: &mut ModuleRegistry,
        clock: &SimClock,
        world: &WorldState,
        rng: &mut SimRng,
    ) -> BusResult<usize> {
        let mut calls = 0usize;
        while let Some(msg) = self.pending.pop_front() {
            let topic = msg.topic();
            for &id in &self.routes[topic.index()] {
                let Some(entry) = registry.entry_mut(id) else { continue };
                let mut ctx = ModuleContext::new(clock, world, rng, id, entry.kind, entry.enabled, &mut self.requests);
                trace!(topic = topic.as_str(), module = entry.module.name(), "deliver");
                if let Err(source) = entry.module.handle(&msg, &mut ctx) {
                    self.pending.clear();
                    return Err(BusError::Handler {
                        module: entry.module.name().to_owned(),
                        topic,
                        source,
                    });
                }
                calls += 1;
            }
        }
        Ok(calls)
    }

    /// Give every module one look at the requests queued so far.  Returns
    /// the number of requests the reviewers added.
    ///
    /// # Errors
    ///
    /// The first reviewer error, wrapped with the module name.
    pub fn review_all(
        &mut self,
        registry: &mut ModuleRegistry,
        clock: &SimClock,
        world: &WorldState,
        rng: &mut SimRng,
    ) -> BusResult<usize> {
        let queued = self.requests.as_slice().to_vec();
        let before = self.requests.len();
        for entry in registry.iter_mut() {
            let mut ctx = ModuleContext::new(clock, world, rng, entry.id, entry.kind, entry.enabled, &mut self.requests);
            if let Err(source) = entry.module.review(&queued, &mut ctx) {
                return Err(BusError::Review { module: entry.module.name().to_owned(), source });
            }
        }
        let added = self.requests.len() - before;
        if added > 0 {
            trace!(queued = queued.len(), added, "review");
        }
        Ok(added)
    }
}
