//! A scripted page load: the event stream a host would deliver while
//! parsing a small page that pulls in one analytics script.

use pagegraph::{DomNodeId, PageGraph, ProtocolViolation, RequestKind, ScriptId};

pub const DOCUMENT: DomNodeId = DomNodeId(1);
pub const HTML: DomNodeId = DomNodeId(2);
pub const HEAD: DomNodeId = DomNodeId(3);
pub const BODY: DomNodeId = DomNodeId(4);
pub const TITLE: DomNodeId = DomNodeId(5);
pub const TITLE_TEXT: DomNodeId = DomNodeId(6);
pub const SCRIPT_TAG: DomNodeId = DomNodeId(7);
pub const TRACKING_PIXEL: DomNodeId = DomNodeId(8);

pub const ANALYTICS: ScriptId = ScriptId(1);

/// The parser builds the document shell.
pub fn parse_document_shell(graph: &mut PageGraph) -> Result<(), ProtocolViolation> {
    graph.register_element_created(HTML, "html")?;
    graph.register_element_inserted(HTML, DOCUMENT, None)?;

    graph.register_element_created(HEAD, "head")?;
    graph.register_element_inserted(HEAD, HTML, None)?;
    graph.register_element_created(TITLE, "title")?;
    graph.register_element_inserted(TITLE, HEAD, None)?;
    graph.register_text_created(TITLE_TEXT, "Example storefront")?;
    graph.register_text_inserted(TITLE_TEXT, TITLE, None)?;

    graph.register_element_created(BODY, "body")?;
    graph.register_element_inserted(BODY, HTML, None)?;
    graph.register_attribute_set(BODY, "class", "storefront")?;

    graph.register_element_created(SCRIPT_TAG, "script")?;
    graph.register_attribute_set(SCRIPT_TAG, "src", "https://cdn.example/analytics.js")?;
    graph.register_element_inserted(SCRIPT_TAG, BODY, None)?;
    graph.register_request_issued("https://cdn.example/analytics.js", RequestKind::Script);
    Ok(())
}

/// The fetched analytics script runs: reads storage, plants a pixel,
/// phones home.
pub fn run_analytics_script(graph: &mut PageGraph) -> Result<(), ProtocolViolation> {
    graph.register_script_exec_start(ANALYTICS);

    graph.register_api_called("Document.cookie", &[]);
    graph.register_api_called(
        "Storage.setItem",
        &["visitor_id".to_owned(), "v-1f2e3d".to_owned()],
    );

    graph.register_element_created(TRACKING_PIXEL, "img")?;
    graph.register_attribute_set(
        TRACKING_PIXEL,
        "src",
        "https://tracker.example/pixel?uid=v-1f2e3d",
    )?;
    graph.register_element_inserted(TRACKING_PIXEL, BODY, Some(SCRIPT_TAG))?;
    graph.register_request_issued(
        "https://tracker.example/pixel?uid=v-1f2e3d",
        RequestKind::Image,
    );

    graph.register_script_exec_stop(ANALYTICS)?;
    Ok(())
}

/// Later the page tidies itself up: the pixel is pulled back out.
pub fn cleanup(graph: &mut PageGraph) -> Result<(), ProtocolViolation> {
    graph.register_attribute_delete(SCRIPT_TAG, "src")?;
    graph.register_element_removed(TRACKING_PIXEL)?;
    graph.register_element_deleted(TRACKING_PIXEL)?;
    Ok(())
}
