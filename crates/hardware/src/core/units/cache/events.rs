//! Cache Event Notification.
//!
//! Each cache level reports what happened to every request it handles by firing a
//! [`CacheEvent`] at its observer, synchronously and in line with the access. This is
//! the only channel through which drivers and statistics see per-level behaviour.
//!
//! Observers can be:
//! - any `FnMut(CacheEvent)` closure,
//! - an [`EventHooks`] bundle of optional per-kind callbacks taking the address,
//! - a user type implementing [`CacheObserver`].

use std::fmt;

/// Something a cache level did while servicing a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheEvent {
    /// A read found its block resident.
    ReadHit(u32),
    /// A read did not find its block; the block was pulled from below.
    ReadMiss(u32),
    /// A write found its block resident and marked it dirty.
    WriteHit(u32),
    /// A write did not find its block and was forwarded below.
    WriteMiss(u32),
    /// The level above serviced the request; this level was not accessed.
    NoAction(u32),
    /// A line was replaced; carries the base address of the evicted block.
    Eviction(u32),
}

impl CacheEvent {
    /// Address carried by the event.
    pub const fn addr(self) -> u32 {
        match self {
            Self::ReadHit(addr)
            | Self::ReadMiss(addr)
            | Self::WriteHit(addr)
            | Self::WriteMiss(addr)
            | Self::NoAction(addr)
            | Self::Eviction(addr) => addr,
        }
    }

    /// Classification this event gives the access, `None` for evictions.
    pub const fn state(self) -> Option<AccessState> {
        match self {
            Self::ReadHit(_) => Some(AccessState::ReadHit),
            Self::ReadMiss(_) => Some(AccessState::ReadMiss),
            Self::WriteHit(_) => Some(AccessState::WriteHit),
            Self::WriteMiss(_) => Some(AccessState::WriteMiss),
            Self::NoAction(_) => Some(AccessState::NoAction),
            Self::Eviction(_) => None,
        }
    }
}

/// Per-level classification of one trace access.
///
/// The numeric codes are the ones written to trace output files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum AccessState {
    /// Level not accessed.
    #[default]
    NoAction = 0,
    /// Read hit.
    ReadHit = 1,
    /// Read miss.
    ReadMiss = 2,
    /// Write hit.
    WriteHit = 3,
    /// Write miss.
    WriteMiss = 4,
}

impl AccessState {
    /// Numeric output code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Returns `true` for read and write hits.
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::ReadHit | Self::WriteHit)
    }

    /// Returns `true` for read and write misses.
    pub const fn is_miss(self) -> bool {
        matches!(self, Self::ReadMiss | Self::WriteMiss)
    }
}

impl fmt::Display for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Receiver of cache events.
pub trait CacheObserver {
    /// Called once for every event, in the order the level produces them.
    fn on_event(&mut self, event: CacheEvent);
}

impl<F: FnMut(CacheEvent)> CacheObserver for F {
    fn on_event(&mut self, event: CacheEvent) {
        self(event);
    }
}

type Hook = Box<dyn FnMut(u32)>;

/// Optional callbacks, one per event kind.
///
/// Kinds without a registered callback are ignored.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use cachesim_core::core::units::cache::{CacheEvent, CacheObserver, EventHooks};
///
/// let misses = Rc::new(Cell::new(0));
/// let seen = Rc::clone(&misses);
/// let mut hooks = EventHooks::new().on_read_miss(move |_| seen.set(seen.get() + 1));
///
/// hooks.on_event(CacheEvent::ReadMiss(0x40));
/// hooks.on_event(CacheEvent::ReadHit(0x40));
/// assert_eq!(misses.get(), 1);
/// ```
#[derive(Default)]
pub struct EventHooks {
    read_hit: Option<Hook>,
    read_miss: Option<Hook>,
    write_hit: Option<Hook>,
    write_miss: Option<Hook>,
    no_action: Option<Hook>,
    eviction: Option<Hook>,
}

impl EventHooks {
    /// Creates a bundle with no callbacks registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read-hit callback.
    #[must_use]
    pub fn on_read_hit(mut self, hook: impl FnMut(u32) + 'static) -> Self {
        self.read_hit = Some(Box::new(hook));
        self
    }

    /// Sets the read-miss callback.
    #[must_use]
    pub fn on_read_miss(mut self, hook: impl FnMut(u32) + 'static) -> Self {
        self.read_miss = Some(Box::new(hook));
        self
    }

    /// Sets the write-hit callback.
    #[must_use]
    pub fn on_write_hit(mut self, hook: impl FnMut(u32) + 'static) -> Self {
        self.write_hit = Some(Box::new(hook));
        self
    }

    /// Sets the write-miss callback.
    #[must_use]
    pub fn on_write_miss(mut self, hook: impl FnMut(u32) + 'static) -> Self {
        self.write_miss = Some(Box::new(hook));
        self
    }

    /// Sets the no-action callback.
    #[must_use]
    pub fn on_no_action(mut self, hook: impl FnMut(u32) + 'static) -> Self {
        self.no_action = Some(Box::new(hook));
        self
    }

    /// Sets the eviction callback; it receives the evicted block's base address.
    #[must_use]
    pub fn on_eviction(mut self, hook: impl FnMut(u32) + 'static) -> Self {
        self.eviction = Some(Box::new(hook));
        self
    }
}

impl CacheObserver for EventHooks {
    fn on_event(&mut self, event: CacheEvent) {
        let hook = match event {
            CacheEvent::ReadHit(_) => &mut self.read_hit,
            CacheEvent::ReadMiss(_) => &mut self.read_miss,
            CacheEvent::WriteHit(_) => &mut self.write_hit,
            CacheEvent::WriteMiss(_) => &mut self.write_miss,
            CacheEvent::NoAction(_) => &mut self.no_action,
            CacheEvent::Eviction(_) => &mut self.eviction,
        };
        if let Some(hook) = hook {
            hook(event.addr());
        }
    }
}

impl fmt::Debug for EventHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHooks")
            .field("read_hit", &self.read_hit.is_some())
            .field("read_miss", &self.read_miss.is_some())
            .field("write_hit", &self.write_hit.is_some())
            .field("write_miss", &self.write_miss.is_some())
            .field("no_action", &self.no_action.is_some())
            .field("eviction", &self.eviction.is_some())
            .finish()
    }
}
