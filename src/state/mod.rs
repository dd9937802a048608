//! State emission module
//!
//! Stages STATE checkpoints and re-emits them to standard output once all
//! preceding records are durably flushed and uploaded.

mod emitter;

pub use emitter::StateEmitter;
