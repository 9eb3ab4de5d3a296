pub mod gate;

pub use gate::{CommandGate, VagrantCommand};
