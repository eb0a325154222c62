pub mod event;
pub mod intent;
pub mod session;
pub mod snapshot;
