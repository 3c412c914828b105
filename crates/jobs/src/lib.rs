pub mod reload_loop;

pub use reload_loop::{LoopEvent, ReloadHandle, ReloadLoop};
