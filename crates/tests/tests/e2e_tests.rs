#[path = "e2e/page_load.rs"]
mod page_load;

#[path = "e2e/script_attribution.rs"]
mod script_attribution;

#[path = "e2e/export_document.rs"]
mod export_document;
