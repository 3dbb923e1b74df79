mod channels;
mod worker;

pub use channels::{Channels, WorkerCommand, WorkerEvent};
pub use worker::{collision_alert, Worker};
