// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js `timers` module: setTimeout, setInterval, setImmediate, etc.
//!
//! The functions only register timers in a [`TimerQueue`]; an event loop
//! drains the queue and dispatches callbacks.
//!
//! A pending timer keeps its callback and arguments alive until it is
//! cancelled or drained. The embedder that owns the event loop must drain
//! [`TimerQueue::global`] regularly; nothing in this crate dispatches timers.

use crate::error::{NodeError, Result};
use crate::namespace::Namespace;
use crate::value::Value;
use dashmap::DashMap;
use quill_macros::exports;
use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicU64, Ordering};

static GLOBAL_QUEUE: OnceLock<Arc<TimerQueue>> = OnceLock::new();

/// Largest delay Node.js accepts; longer delays are clamped to 1ms
const TIMEOUT_MAX: f64 = 2_147_483_647.0;

/// Kind of scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// setTimeout
    Timeout,
    /// setInterval
    Interval,
    /// setImmediate
    Immediate,
}

/// A timer waiting to be dispatched
#[derive(Debug, Clone)]
pub struct PendingTimer {
    /// The timer ID
    pub id: u64,
    /// Kind of timer
    pub kind: TimerKind,
    /// Delay in milliseconds
    pub delay_ms: f64,
    /// The callback function
    pub callback: Value,
    /// Extra arguments passed to the callback
    pub args: Vec<Value>,
}

/// Registered timers, keyed by ID
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: AtomicU64,
    pending: DashMap<u64, PendingTimer>,
}

impl TimerQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a timer and return its ID
    pub fn schedule(&self, kind: TimerKind, delay_ms: f64, callback: Value, args: Vec<Value>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.pending.insert(
            id,
            PendingTimer {
                id,
                kind,
                delay_ms,
                callback,
                args,
            },
        );
        id
    }

    /// Cancel a timer; returns true if it was pending
    pub fn cancel(&self, id: u64) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Remove and return every pending timer, ordered by ID
    pub fn drain(&self) -> Vec<PendingTimer> {
        let ids: Vec<u64> = self.pending.iter().map(|e| *e.key()).collect();
        let mut timers: Vec<PendingTimer> = ids
            .into_iter()
            .filter_map(|id| self.pending.remove(&id).map(|(_, t)| t))
            .collect();
        timers.sort_by_key(|t| t.id);
        timers
    }

    /// The process-wide queue shared by every `node:timers` namespace.
    ///
    /// Grows until drained; see the module docs.
    pub fn global() -> Arc<TimerQueue> {
        Arc::clone(GLOBAL_QUEUE.get_or_init(|| Arc::new(TimerQueue::new())))
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if no timers are pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Create the timers module exports over the process-wide queue
pub fn create_module() -> Namespace {
    create_module_with(TimerQueue::global())
}

/// Create the timers module exports over `queue`
pub fn create_module_with(queue: Arc<TimerQueue>) -> Namespace {
    exports! {
        "setTimeout" => scheduler("setTimeout", TimerKind::Timeout, Arc::clone(&queue)),
        "clearTimeout" => canceller("clearTimeout", Arc::clone(&queue)),
        "setInterval" => scheduler("setInterval", TimerKind::Interval, Arc::clone(&queue)),
        "clearInterval" => canceller("clearInterval", Arc::clone(&queue)),
        "setImmediate" => scheduler("setImmediate", TimerKind::Immediate, Arc::clone(&queue)),
        "clearImmediate" => canceller("clearImmediate", queue),
    }
}

fn scheduler(name: &'static str, kind: TimerKind, queue: Arc<TimerQueue>) -> Value {
    Value::function(name, move |args| {
        let callback = match args.first() {
            Some(cb @ Value::Function(_)) => cb.clone(),
            other => {
                return Err(NodeError::type_error(format!(
                    "The \"callback\" argument must be of type function. Received {}",
                    other.map(Value::type_of).unwrap_or("undefined")
                )));
            }
        };

        let (delay_ms, rest) = match kind {
            TimerKind::Immediate => (0.0, args.get(1..).unwrap_or_default()),
            _ => (
                clamp_delay(args.get(1)),
                args.get(2..).unwrap_or_default(),
            ),
        };

        let id = queue.schedule(kind, delay_ms, callback, rest.to_vec());
        Ok(Value::Number(id as f64))
    })
}

fn canceller(name: &'static str, queue: Arc<TimerQueue>) -> Value {
    Value::function(name, move |args| {
        let cancelled = match args.first() {
            Some(Value::Number(id)) if *id >= 1.0 => queue.cancel(*id as u64),
            _ => false,
        };
        Ok(Value::Boolean(cancelled))
    })
}

fn clamp_delay(delay: Option<&Value>) -> f64 {
    match delay {
        Some(Value::Number(ms)) if *ms >= 1.0 && *ms <= TIMEOUT_MAX => ms.trunc(),
        _ => 1.0,
    }
}
