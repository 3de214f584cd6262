//! Running emulator bookkeeping.
//!
//! The registry is owned by whatever manages emulator processes; the hosting
//! side only reads it through [`EmulatorLookup`].

mod functions;
mod registry;

pub use functions::FunctionsEmulator;
pub use registry::{EmulatorInfo, EmulatorLookup, EmulatorRegistry, Emulators};
