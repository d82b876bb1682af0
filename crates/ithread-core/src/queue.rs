//! Two-lock FIFO queue with a permanent sentinel node
//!
//! Singly linked queue safe for many producers and many consumers.
//! Producers serialize on the tail mutex, consumers on the head mutex;
//! the two mutexes are never held at the same time, so a push and a pop
//! proceed in parallel whenever the queue holds two or more items.
//!
//! The list always ends in one empty sentinel node. `push` stores the
//! payload into the current sentinel, links a fresh empty sentinel after
//! it, and publishes the new tail; "empty" is exactly "head == tail".
//! Consumers learn the current tail from an atomic snapshot published by
//! `push`, so the empty predicate never touches the tail mutex.
//!
//! `close()` is the shutdown half of the contract: pushes are rejected
//! afterwards, pops drain what is left and then report `QueueClosed`.

use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::cancel::{interruptible_wait, InterruptFlag};
use crate::error::{TaskError, TaskResult};

struct Node<T> {
    /// Some on every node below the sentinel, None on the sentinel
    data: Option<T>,
    /// Null only on the sentinel
    next: *mut Node<T>,
}

impl<T> Node<T> {
    fn sentinel() -> *mut Node<T> {
        Box::into_raw(Box::new(Node {
            data: None,
            next: ptr::null_mut(),
        }))
    }
}

/// MPMC FIFO queue with separate head and tail locks
pub struct TwoLockQueue<T> {
    /// Oldest node; equals the sentinel when the queue is empty
    head: Mutex<*mut Node<T>>,
    /// The sentinel; only `push` follows this pointer
    tail: Mutex<*mut Node<T>>,
    /// Tail published after each push; lets consumers evaluate
    /// "head == tail" without acquiring the tail mutex
    tail_hint: AtomicPtr<Node<T>>,
    /// Signalled once per push and broadcast on close; always paired
    /// with the head mutex
    ready: Arc<Condvar>,
    closed: AtomicBool,
    /// Diagnostic item count, maintained inside the critical sections
    len: AtomicUsize,
}

// Safety: nodes are only reached through the head/tail mutexes (or the
// tail_hint snapshot for pointer comparison), and payloads move across
// threads as whole values.
unsafe impl<T: Send> Send for TwoLockQueue<T> {}
unsafe impl<T: Send> Sync for TwoLockQueue<T> {}

impl<T> TwoLockQueue<T> {
    /// Create an empty queue holding only the sentinel
    pub fn new() -> Self {
        let sentinel = Node::sentinel();
        TwoLockQueue {
            head: Mutex::new(sentinel),
            tail: Mutex::new(sentinel),
            tail_hint: AtomicPtr::new(sentinel),
            ready: Arc::new(Condvar::new()),
            closed: AtomicBool::new(false),
            len: AtomicUsize::new(0),
        }
    }

    /// Append an item and wake one waiting consumer
    ///
    /// Blocks only for the tail lock hold time. Fails with `QueueClosed`
    /// once `close()` has run.
    pub fn push(&self, item: T) -> TaskResult<()> {
        {
            let mut tail = self.tail.lock().expect("queue tail mutex poisoned");
            if self.closed.load(Ordering::Relaxed) {
                return Err(TaskError::QueueClosed);
            }
            let new_tail = Node::sentinel();
            // Safety: *tail is the sentinel and only push, under this
            // lock, ever writes to it.
            unsafe {
                (**tail).data = Some(item);
                (**tail).next = new_tail;
            }
            *tail = new_tail;
            self.len.fetch_add(1, Ordering::Relaxed);
            // Publish after the node is fully written; consumers acquire
            // through this load before touching the node.
            self.tail_hint.store(new_tail, Ordering::Release);
        }
        self.ready.notify_one();
        Ok(())
    }

    /// Remove and return the oldest item, blocking until one arrives
    ///
    /// Returns `Err(QueueClosed)` once the queue is closed and drained,
    /// never before remaining items are handed out.
    pub fn wait_and_pop(&self) -> TaskResult<T> {
        let mut head = self.head.lock().expect("queue head mutex poisoned");
        loop {
            if *head != self.tail_hint.load(Ordering::Acquire) {
                return Ok(self.detach_head(&mut head));
            }
            if self.closed.load(Ordering::Relaxed) {
                return Err(TaskError::QueueClosed);
            }
            head = self
                .ready
                .wait(head)
                .expect("queue head mutex poisoned");
        }
    }

    /// `wait_and_pop` with an interruption point
    ///
    /// Registers `flag` against the queue's condvar while blocked; a
    /// concurrent `flag.set()` makes the call return `Err(Cancelled)`
    /// promptly instead of waiting for an item.
    pub fn wait_and_pop_interruptible(&self, flag: &InterruptFlag) -> TaskResult<T> {
        let mut head = self.head.lock().expect("queue head mutex poisoned");
        loop {
            if *head != self.tail_hint.load(Ordering::Acquire) {
                return Ok(self.detach_head(&mut head));
            }
            if self.closed.load(Ordering::Relaxed) {
                return Err(TaskError::QueueClosed);
            }
            head = interruptible_wait(flag, &self.ready, head)?;
        }
    }

    /// Remove and return the oldest item if one is present
    pub fn try_pop(&self) -> Option<T> {
        let mut head = self.head.lock().expect("queue head mutex poisoned");
        if *head == self.tail_hint.load(Ordering::Acquire) {
            return None;
        }
        Some(self.detach_head(&mut head))
    }

    /// Snapshot emptiness check
    ///
    /// Not atomic with respect to concurrent push/pop; diagnostics only.
    pub fn is_empty(&self) -> bool {
        let head = self.head.lock().expect("queue head mutex poisoned");
        *head == self.tail_hint.load(Ordering::Acquire)
    }

    /// Snapshot item count; diagnostics only
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Has `close()` run?
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    /// Stop the queue: reject further pushes and wake every waiter
    ///
    /// Consumers drain remaining items before seeing `QueueClosed`.
    /// Idempotent. The flag flips under the tail lock (so no push can
    /// race past it) and the wakeup is fenced by the head lock (so no
    /// consumer can sleep through it).
    pub fn close(&self) {
        {
            let _tail = self.tail.lock().expect("queue tail mutex poisoned");
            self.closed.store(true, Ordering::SeqCst);
        }
        {
            // Empty critical section: any consumer between its predicate
            // check and its wait still holds this mutex.
            let _head = self.head.lock().expect("queue head mutex poisoned");
        }
        self.ready.notify_all();
    }

    /// Detach the head node and return its payload; head must differ
    /// from the published tail
    fn detach_head(&self, head: &mut MutexGuard<'_, *mut Node<T>>) -> T {
        let old = **head;
        // Safety: old != tail, so some push finished writing data and
        // next into this node (Acquire on tail_hint orders that) and no
        // push will ever touch it again; we hold the head lock, so no
        // other consumer can reach it.
        let mut node = unsafe {
            **head = (*old).next;
            Box::from_raw(old)
        };
        self.len.fetch_sub(1, Ordering::Relaxed);
        node.data
            .take()
            .expect("queue invariant violated: empty node below the sentinel")
    }
}

impl<T> Default for TwoLockQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for TwoLockQueue<T> {
    fn drop(&mut self) {
        // Exclusive access: walk the list and free every node, dropping
        // any payloads still queued.
        let mut cur = *self.head.get_mut().expect("queue head mutex poisoned");
        while !cur.is_null() {
            // Safety: each node was allocated by Box::into_raw and is
            // reachable exactly once from this walk.
            let node = unsafe { Box::from_raw(cur) };
            cur = node.next;
        }
    }
}
