//! Wrappers around the external IL2CPP inspector and FlatBuffers schema dumper
//!
//! Neither binary format is parsed here. Each wrapper checks its inputs when
//! constructed, builds the tool's argument vector and runs it to completion.
//! A failing tool run is logged and reported as a [`DumpOutcome`]; it never
//! surfaces as an error.

pub mod process;
pub mod il2cpp_inspector;
pub mod fbs;

pub use fbs::{FbsDumpRequest, FbsDumper};
pub use il2cpp_inspector::{Il2CppInspectorDumper, InspectorOutput};
pub use process::{DumpOutcome, ToolCommand};
