use crate::types::{DomNodeId, GraphItemId, ScriptId};
use thiserror::Error;

/// A registration call that contradicts what the graph already knows.
///
/// Every violation is detected before any mutation, so a returned error
/// means the graph is exactly as it was before the call. The recorded
/// history is suspect after a violation; callers should stop feeding
/// events into the graph and report it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("DOM node {0} is already registered")]
    DuplicateDomNode(DomNodeId),

    #[error("DOM node {0} is not a registered element")]
    NotAnElement(DomNodeId),

    #[error("DOM node {0} is not a registered text node")]
    NotAText(DomNodeId),

    #[error("DOM node {0} is not registered in this graph")]
    UnknownDomNode(DomNodeId),

    #[error("DOM node {0} is registered as both an element and a text node")]
    AmbiguousDomNode(DomNodeId),

    #[error("document root is already held by item {0}")]
    RootAlreadySet(GraphItemId),

    #[error("script {0} reported finished but no script is executing")]
    NoActingScript(ScriptId),

    #[error("script {stopped} reported finished while script {acting} is acting")]
    MismatchedScriptStop { stopped: ScriptId, acting: ScriptId },
}

/// Failure while writing an export document.
///
/// Unlike [`ProtocolViolation`] this says nothing about the recorded
/// history; the graph stays usable and the export can be retried.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write export document: {0}")]
    Io(#[from] std::io::Error),
}
