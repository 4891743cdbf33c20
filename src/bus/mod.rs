//! Event distribution: responsibility and boundaries
//!
//! This module owns the two distribution points of the toolkit:
//! - [`Topic`]: filtered, synchronous fan-out on the caller's thread.
//! - [`Spool`]: unfiltered fan-out on a bounded worker pool, fire-and-forget.
//!
//! Both share the same subscriber bookkeeping ([`HandlerSet`]) and expose the
//! same capabilities ([`Publisher`], [`Subscriber`]). Handlers never see the
//! distribution strategy; they only receive `Arc<Event>` values.

mod capability;
mod handler_set;
mod spool;
mod topic;

pub use capability::{handler_fn, FnHandler, PublishSubscriber, Publisher, Subscriber};
pub use handler_set::HandlerSet;
pub use spool::{DispatchFailure, OverflowPolicy, Spool, SpoolConfig, SpoolStats};
pub use topic::{Filter, FromWindow, KeyEvents, Topic};
