// SPDX-License-Identifier: Apache-2.0

//! Parse stack storage.
//!
//! The parser never recurses: it records every open container as a [`Frame`] on a
//! [`FrameStack`]. Three storage strategies are provided:
//!
//! * [`FixedStack`] over a caller supplied slice, for zero-allocation parsing when the
//!   maximum nesting depth is known up front,
//! * [`VecStack`] (feature `alloc`), growing by doubling,
//! * [`AllocatorStack`], delegating every (re)allocation to a caller [`StackAllocator`].

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Number of frames requested when a growable stack first needs memory.
pub const INITIAL_CAPACITY: usize = 16;

/// Marker for one open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Frame {
    #[default]
    Array = 1,
    Object = 2,
}

/// The stack could not provide room for another frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoStack;

/// Storage for the parser's nesting state.
///
/// Depth tracking belongs to the implementation: `depth()` must equal the number of
/// successful pushes minus successful pops since the last `prepare()`.
pub trait FrameStack {
    /// Called once before a parse starts. Resets the depth to zero.
    fn prepare(&mut self) -> Result<(), NoStack>;
    /// Pushes a frame, failing without side effects when no room can be made.
    fn push(&mut self, frame: Frame) -> Result<(), NoStack>;
    /// Pops the top frame, `None` when empty.
    fn pop(&mut self) -> Option<Frame>;
    /// Returns the top frame without removing it.
    fn top(&self) -> Option<Frame>;
    /// Current nesting depth.
    fn depth(&self) -> usize;
    /// Called exactly once when a parse ends, successfully or not.
    fn release(&mut self) {}
}

impl<S: FrameStack + ?Sized> FrameStack for &mut S {
    fn prepare(&mut self) -> Result<(), NoStack> {
        (**self).prepare()
    }
    fn push(&mut self, frame: Frame) -> Result<(), NoStack> {
        (**self).push(frame)
    }
    fn pop(&mut self) -> Option<Frame> {
        (**self).pop()
    }
    fn top(&self) -> Option<Frame> {
        (**self).top()
    }
    fn depth(&self) -> usize {
        (**self).depth()
    }
    fn release(&mut self) {
        (**self).release()
    }
}

/// Fixed-capacity stack over caller memory. Never allocates.
///
/// ```
/// use ejson::{Frame, FixedStack, FrameStack};
/// let mut slots = [Frame::default(); 2];
/// let mut stack = FixedStack::new(&mut slots);
/// stack.prepare().unwrap();
/// stack.push(Frame::Object).unwrap();
/// stack.push(Frame::Array).unwrap();
/// assert!(stack.push(Frame::Array).is_err());
/// ```
#[derive(Debug)]
pub struct FixedStack<'a> {
    slots: &'a mut [Frame],
    depth: usize,
}

impl<'a> FixedStack<'a> {
    pub fn new(slots: &'a mut [Frame]) -> Self {
        Self { slots, depth: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl FrameStack for FixedStack<'_> {
    fn prepare(&mut self) -> Result<(), NoStack> {
        self.depth = 0;
        Ok(())
    }

    fn push(&mut self, frame: Frame) -> Result<(), NoStack> {
        let slot = self.slots.get_mut(self.depth).ok_or(NoStack)?;
        *slot = frame;
        self.depth += 1;
        Ok(())
    }

    fn pop(&mut self) -> Option<Frame> {
        let top = self.top()?;
        self.depth -= 1;
        Some(top)
    }

    fn top(&self) -> Option<Frame> {
        self.depth
            .checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .copied()
    }

    fn depth(&self) -> usize {
        self.depth
    }
}

/// Heap-backed stack with amortized doubling growth.
#[cfg(feature = "alloc")]
#[derive(Debug, Default)]
pub struct VecStack {
    frames: Vec<Frame>,
}

#[cfg(feature = "alloc")]
impl VecStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(&self) -> usize {
        self.frames.capacity()
    }
}

#[cfg(feature = "alloc")]
impl FrameStack for VecStack {
    fn prepare(&mut self) -> Result<(), NoStack> {
        self.frames.clear();
        Ok(())
    }

    fn push(&mut self, frame: Frame) -> Result<(), NoStack> {
        if self.frames.len() == self.frames.capacity() {
            let additional = self.frames.capacity().max(INITIAL_CAPACITY);
            self.frames
                .try_reserve_exact(additional)
                .map_err(|_| NoStack)?;
        }
        self.frames.push(frame);
        Ok(())
    }

    fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    fn top(&self) -> Option<Frame> {
        self.frames.last().copied()
    }

    fn depth(&self) -> usize {
        self.frames.len()
    }

    fn release(&mut self) {
        self.frames = Vec::new();
    }
}

/// Caller supplied memory strategy, the counterpart of `realloc`/`free` hooks.
pub trait StackAllocator {
    /// Memory handed out by this allocator.
    type Buffer: AsRef<[Frame]> + AsMut<[Frame]>;

    /// Replaces `buffer` with one holding at least `min_capacity` frames, keeping the
    /// existing frames in place. `buffer` is `None` on the first call. Returning
    /// `false` refuses the request and must leave `buffer` untouched.
    fn realloc(&mut self, buffer: &mut Option<Self::Buffer>, min_capacity: usize) -> bool;

    /// Releases a buffer previously produced by `realloc`.
    fn dealloc(&mut self, buffer: Self::Buffer);
}

/// Stack whose memory comes exclusively from a [`StackAllocator`].
///
/// `realloc` is called during `prepare` for the initial capacity and again whenever
/// the stack is full; `dealloc` is called once from `release`.
pub struct AllocatorStack<A: StackAllocator> {
    allocator: A,
    buffer: Option<A::Buffer>,
    depth: usize,
}

impl<A: StackAllocator> AllocatorStack<A> {
    pub fn new(allocator: A) -> Self {
        Self {
            allocator,
            buffer: None,
            depth: 0,
        }
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Returns the allocator, releasing any buffer still held.
    pub fn into_allocator(mut self) -> A {
        self.release();
        self.allocator
    }

    fn capacity(&self) -> usize {
        self.buffer.as_ref().map_or(0, |b| b.as_ref().len())
    }

    fn grow(&mut self, min_capacity: usize) -> Result<(), NoStack> {
        if !self.allocator.realloc(&mut self.buffer, min_capacity) {
            return Err(NoStack);
        }
        if self.capacity() < min_capacity {
            log::debug!(
                "allocator returned {} frames, {} requested",
                self.capacity(),
                min_capacity
            );
            return Err(NoStack);
        }
        Ok(())
    }
}

impl<A: StackAllocator> FrameStack for AllocatorStack<A> {
    fn prepare(&mut self) -> Result<(), NoStack> {
        self.depth = 0;
        if self.capacity() == 0 {
            self.grow(INITIAL_CAPACITY)?;
        }
        Ok(())
    }

    fn push(&mut self, frame: Frame) -> Result<(), NoStack> {
        let capacity = self.capacity();
        if self.depth == capacity {
            self.grow(capacity.saturating_mul(2).max(INITIAL_CAPACITY))?;
        }
        let depth = self.depth;
        let slot = self
            .buffer
            .as_mut()
            .and_then(|b| b.as_mut().get_mut(depth))
            .ok_or(NoStack)?;
        *slot = frame;
        self.depth += 1;
        Ok(())
    }

    fn pop(&mut self) -> Option<Frame> {
        let top = self.top()?;
        self.depth -= 1;
        Some(top)
    }

    fn top(&self) -> Option<Frame> {
        let index = self.depth.checked_sub(1)?;
        self.buffer.as_ref()?.as_ref().get(index).copied()
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn release(&mut self) {
        self.depth = 0;
        if let Some(buffer) = self.buffer.take() {
            self.allocator.dealloc(buffer);
        }
    }
}
