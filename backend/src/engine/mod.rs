//! The filtered analytics aggregation and forecasting engine.
//!
//! Pure, synchronous, stateless: handlers compile one predicate per request
//! and fan it out across the aggregate functions; nothing in here performs
//! I/O or mutates the ticket snapshot.

pub mod aggregate;
pub mod filter;
pub mod forecast;
pub mod histogram;
pub mod overdue;
pub mod predicate;
