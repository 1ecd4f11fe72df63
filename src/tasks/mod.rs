//! Background Tasks Module
//!
//! Optional tokio tasks that keep a shared [`MemoryCache`](crate::MemoryCache)
//! tidy: a periodic expired-entry sweep and a memory-pressure listener.

mod pressure;
mod sweep;

pub use pressure::{spawn_pressure_task, MemoryPressure};
pub use sweep::spawn_sweep_task;
