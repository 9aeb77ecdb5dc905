//! Round-robin proxy selection.
//!
//! A [`Dispatcher`] owns a fixed pool of proxies and a [`Ticker`]. Each
//! selection advances the ticker and asks the candidate for one unit of
//! capacity, moving on to the next candidate until one accepts.

mod policy;
mod round_robin;
mod ticker;

pub use policy::SpinPolicy;
pub use round_robin::Dispatcher;
pub use ticker::Ticker;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The pool was built without any proxies.
    #[error("Proxy pool is empty")]
    EmptyPool,

    /// No proxy had capacity before the spin limit was reached.
    #[error("No proxy capacity after {attempts} attempts ({waited_ms} ms)")]
    CapacityExhausted { attempts: u64, waited_ms: u64 },
}
