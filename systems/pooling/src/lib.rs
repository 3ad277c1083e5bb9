#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Free-list object pools for short-lived simulation entities.
//!
//! A pooled value is owned either by the pool or by the caller. [`Pool::acquire`]
//! moves a value out and [`Pool::release`] consumes it, so a value can never be
//! live and pooled at once, nor released twice.

use ring_defence_core::{Bullet, Effect};

/// Values that can be recycled through a [`Pool`].
pub trait Poolable {
    /// Constructs a value in its neutral state.
    fn fresh() -> Self;

    /// Returns the value to its neutral state before it re-enters the pool.
    fn reset(&mut self);
}

impl Poolable for Bullet {
    fn fresh() -> Self {
        Bullet::default()
    }

    fn reset(&mut self) {
        let mut struck = std::mem::take(&mut self.struck);
        struck.clear();
        *self = Bullet {
            struck,
            ..Bullet::default()
        };
    }
}

impl Poolable for Effect {
    fn fresh() -> Self {
        Effect::default()
    }

    fn reset(&mut self) {
        *self = Effect::default();
    }
}

/// Counters describing how effectively a pool recycles values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PoolStats {
    /// Values constructed because the free list was empty.
    pub created: u64,
    /// Values handed out from the free list.
    pub reused: u64,
    /// Released values dropped because the free list was full.
    pub discarded: u64,
    /// Values currently waiting in the free list.
    pub available: usize,
}

impl PoolStats {
    /// Fraction of acquisitions served from the free list.
    #[must_use]
    pub fn reuse_rate(&self) -> f64 {
        let total = self.created + self.reused;
        if total == 0 {
            0.0
        } else {
            self.reused as f64 / total as f64
        }
    }
}

/// Free-list pool handing out values by move.
#[derive(Debug)]
pub struct Pool<T> {
    free_list: Vec<T>,
    retain_limit: Option<usize>,
    created: u64,
    reused: u64,
    discarded: u64,
}

/// Pool of bullets shared by towers and enemies.
pub type BulletPool = Pool<Bullet>;

/// Pool of visual effects.
pub type EffectPool = Pool<Effect>;

impl<T: Poolable> Pool<T> {
    /// Creates an empty pool without a retention bound.
    #[must_use]
    pub fn new() -> Self {
        Self {
            free_list: Vec::new(),
            retain_limit: None,
            created: 0,
            reused: 0,
            discarded: 0,
        }
    }

    /// Creates an empty pool that keeps at most `limit` idle values.
    #[must_use]
    pub fn with_retain_limit(limit: usize) -> Self {
        Self {
            retain_limit: Some(limit),
            ..Self::new()
        }
    }

    /// Fills the free list up to `count` idle values.
    pub fn prewarm(&mut self, count: usize) {
        let target = self.retain_limit.map_or(count, |limit| count.min(limit));
        self.free_list.reserve(target.saturating_sub(self.free_list.len()));
        while self.free_list.len() < target {
            self.free_list.push(T::fresh());
        }
    }

    /// Moves a value out of the pool, constructing one if none are idle.
    pub fn acquire(&mut self) -> T {
        match self.free_list.pop() {
            Some(value) => {
                self.reused += 1;
                value
            }
            None => {
                self.created += 1;
                T::fresh()
            }
        }
    }

    /// Resets `value` and returns it to the free list.
    pub fn release(&mut self, mut value: T) {
        if self
            .retain_limit
            .is_some_and(|limit| self.free_list.len() >= limit)
        {
            self.discarded += 1;
            return;
        }
        value.reset();
        self.free_list.push(value);
    }

    /// Number of idle values.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free_list.len()
    }

    /// Snapshot of the pool counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created,
            reused: self.reused,
            discarded: self.discarded,
            available: self.free_list.len(),
        }
    }

    /// Fraction of acquisitions served from the free list.
    #[must_use]
    pub fn reuse_rate(&self) -> f64 {
        self.stats().reuse_rate()
    }
}

impl<T: Poolable> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}
