//! Composable read adapters for archived data.
//!
//! Reading a compressed entry out of a pack is a chain of three layers: a
//! private handle on the pack's backing file, a [`BoundedReader`] carving
//! out the entry's compressed payload, and an [`InflateReader`] turning
//! that payload back into the original bytes. Each layer implements
//! [`std::io::Read`], so the chain composes by construction and a consumer
//! holding the outermost reader never sees the layering.
//!
//! [`TextReader`] adds a line-oriented interface on top of any byte reader.

pub mod bounded;
pub mod inflate;
pub mod text;

pub use bounded::BoundedReader;
pub use inflate::InflateReader;
pub use text::TextReader;
