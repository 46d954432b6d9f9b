//! Archive extraction worker.
//!
//! Extraction runs on its own named thread. The thread takes ownership of
//! the archive buffer, and the extracted buffers are moved back in the single
//! response message; nothing is shared across the boundary.

use std::thread;

use tokio::sync::oneshot;
use xsys_shared::{GAME_FORMAT, names};

use crate::archive::{ArchiveEntry, ArchiveExtractor};
use crate::error::{LoadError, Result};

/// The one message a worker sends back.
#[derive(Debug)]
pub(crate) enum WorkerResponse {
    Extracted(Vec<ArchiveEntry>),
    Failed(String),
}

/// Extracts `archive` on a worker thread and waits for its response.
pub(crate) async fn extract(
    archive: Vec<u8>,
    extractor: Box<dyn ArchiveExtractor>,
) -> Result<Vec<ArchiveEntry>> {
    let (tx, rx) = oneshot::channel();

    thread::Builder::new()
        .name("archive-extract".into())
        .spawn(move || {
            tracing::debug!(format = extractor.format(), bytes = archive.len(), "Extraction worker started");
            let response = run(extractor.as_ref(), &archive);
            // Receiver only goes away if the load itself was dropped
            let _ = tx.send(response);
        })?;

    match rx.await {
        Ok(WorkerResponse::Extracted(entries)) => Ok(entries),
        Ok(WorkerResponse::Failed(message)) => Err(LoadError::ExtractionFailed(message)),
        Err(_) => Err(LoadError::ExtractionFailed(
            "extraction worker exited without a response".to_string(),
        )),
    }
}

fn run(extractor: &dyn ArchiveExtractor, archive: &[u8]) -> WorkerResponse {
    let names = match extractor.list_entries(archive) {
        Ok(names) => names,
        Err(e) => return WorkerResponse::Failed(message(e)),
    };

    let has_data = names.iter().any(|name| {
        names::extension_lower(name).is_some_and(|ext| GAME_FORMAT.is_data_ext(&ext))
    });
    if !has_data {
        return WorkerResponse::Failed("no game data".to_string());
    }

    match extractor.extract_all(archive) {
        Ok(entries) => WorkerResponse::Extracted(entries),
        Err(e) => WorkerResponse::Failed(message(e)),
    }
}

fn message(err: LoadError) -> String {
    match err {
        LoadError::ExtractionFailed(message) => message,
        other => other.to_string(),
    }
}
