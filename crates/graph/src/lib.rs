//! In-process provenance graph of a single page load.
//!
//! As a page loads and executes, host instrumentation reports every
//! structural and behavioral event worth auditing: DOM node creation,
//! insertion, removal, attribute mutation, script execution, calls into
//! browser APIs, and network requests. Each event becomes a typed node
//! or edge in one append-only graph, serialized later as GraphML or
//! JSON for offline analysis.
//!
//! - **Identity**: one monotonic counter shared by nodes and edges, so
//!   any item id encodes creation order across the whole history.
//! - **Ownership**: [`PageGraph`] owns both arenas; cross-references are
//!   arena handles ([`NodeId`], [`EdgeId`]), never pointers.
//! - **Attribution**: every edge runs from the acting node, the parser
//!   by default or the innermost executing script.
//! - **Failure**: a registration call that contradicts recorded history
//!   returns [`ProtocolViolation`] and changes nothing.

#![deny(unsafe_code)]

pub mod edge;
pub mod error;
pub mod graph;
pub mod graphml;
pub mod node;
pub mod snapshot;
pub mod types;

pub use edge::{Edge, EdgeKind};
pub use error::{ExportError, ProtocolViolation};
pub use graph::{GraphItem, PageGraph};
pub use graphml::{AttrDomain, AttrKey, AttrValue, AttrValueType};
pub use node::{Node, NodeKind};
pub use snapshot::{EdgeRecord, GraphSnapshot, NodeRecord};
pub use types::{DomNodeId, EdgeId, GraphItemId, NodeId, RequestKind, ScriptId};
