//! Virtual file layer for interrupt reporting.
//!
//! Only generated files live here: procfs entries backed by the interrupt
//! core, read through [`seq_file::SeqFile`].

pub mod procfs;
pub mod seq_file;
