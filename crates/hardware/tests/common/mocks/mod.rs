//! Mock implementations of simulator traits.


pub use observer::MockObserver;
