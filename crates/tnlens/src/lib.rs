//! tnlens command-line front end.
//!
//! The binary works on screen captures: JSON files holding one terminal
//! frame each (text rows, color/attribute/graphic planes, editable-field
//! descriptors). Captures are scanned into a semantic model by
//! `tnlens-core`; this crate only parses arguments, loads captures, and
//! presents results.

#![deny(clippy::all)]

pub mod capture;
pub mod commands;
pub mod handlers;
pub mod presenter;
pub mod telemetry;
