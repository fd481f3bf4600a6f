//! Mesh asset transfer with progress reporting and cancellation.
//!
//! Transfers run off the main schedule (an XHR on wasm, an I/O task natively)
//! and push `FetchEvent`s into a shared queue that the loader drains each
//! frame. Every transfer carries a `CancelToken`; once cancelled its events are
//! discarded and the transfer is stopped at the next opportunity.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("{0}")]
    Transport(String),
    #[error("response is not valid UTF-8 text")]
    InvalidText,
    #[error("load cancelled")]
    Cancelled,
}

/// Raw transfer events, tagged with the load generation by `FetchSink`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    Progress { loaded: u64, total: Option<u64> },
    Completed(String),
    Failed(FetchError),
}

pub type FetchQueue = Arc<Mutex<Vec<(u64, FetchEvent)>>>;

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Where a transfer reports to. Cheap to clone into callbacks.
#[derive(Debug, Clone)]
pub struct FetchSink {
    generation: u64,
    queue: FetchQueue,
    cancel: CancelToken,
}

impl FetchSink {
    pub fn new(generation: u64, queue: FetchQueue, cancel: CancelToken) -> Self {
        Self {
            generation,
            queue,
            cancel,
        }
    }

    pub fn push(&self, event: FetchEvent) {
        if self.cancel.is_cancelled() {
            return;
        }
        if let Ok(mut queue) = self.queue.lock() {
            queue.push((self.generation, event));
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Starts a mesh transfer. Implementations must not block the caller.
pub trait MeshFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str, sink: FetchSink);
}

/// HTTP `GET` transfer of the OBJ text.
#[derive(Debug, Default)]
pub struct HttpMeshFetcher;

#[cfg(not(target_arch = "wasm32"))]
impl MeshFetcher for HttpMeshFetcher {
    fn fetch(&self, url: &str, sink: FetchSink) {
        use bevy::tasks::IoTaskPool;

        let url = url.to_string();
        IoTaskPool::get()
            .spawn(async move {
                match native::fetch_text(&url, &sink) {
                    Ok(text) => sink.push(FetchEvent::Completed(text)),
                    Err(FetchError::Cancelled) => {}
                    Err(err) => sink.push(FetchEvent::Failed(err)),
                }
            })
            .detach();
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io::Read;

    use super::{FetchError, FetchEvent, FetchSink};

    const CHUNK_SIZE: usize = 16 * 1024;

    /// Blocking transfer. Reports progress per chunk and stops between
    /// chunks once cancelled.
    pub fn fetch_text(url: &str, sink: &FetchSink) -> Result<String, FetchError> {
        let response = ureq::get(url).call().map_err(|err| match err {
            ureq::Error::Status(code, _) => FetchError::Status(code),
            other => FetchError::Transport(other.to_string()),
        })?;

        let total = response
            .header("Content-Length")
            .and_then(|value| value.parse::<u64>().ok());

        let mut reader = response.into_reader();
        let mut body = Vec::new();
        let mut chunk = [0u8; CHUNK_SIZE];
        let mut loaded = 0u64;

        loop {
            if sink.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            let read = reader
                .read(&mut chunk)
                .map_err(|err| FetchError::Transport(err.to_string()))?;
            if read == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..read]);
            loaded += read as u64;
            sink.push(FetchEvent::Progress { loaded, total });
        }

        String::from_utf8(body).map_err(|_| FetchError::InvalidText)
    }
}

#[cfg(target_arch = "wasm32")]
impl MeshFetcher for HttpMeshFetcher {
    fn fetch(&self, url: &str, sink: FetchSink) {
        if let Err(err) = wasm::start_request(url, sink.clone()) {
            sink.push(FetchEvent::Failed(FetchError::Transport(format!("{:?}", err))));
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{ProgressEvent, XmlHttpRequest};

    use super::{FetchError, FetchEvent, FetchSink};

    /// Issue an XHR whose callbacks feed the sink. Progress callbacks abort
    /// the request once the sink is cancelled.
    pub fn start_request(url: &str, sink: FetchSink) -> Result<(), JsValue> {
        let xhr = XmlHttpRequest::new()?;
        xhr.open_with_async("GET", url, true)?;

        let progress_sink = sink.clone();
        let progress_xhr = xhr.clone();
        let on_progress = Closure::wrap(Box::new(move |event: ProgressEvent| {
            if progress_sink.is_cancelled() {
                let _ = progress_xhr.abort();
                return;
            }
            let total = event
                .length_computable()
                .then(|| event.total() as u64);
            progress_sink.push(FetchEvent::Progress {
                loaded: event.loaded() as u64,
                total,
            });
        }) as Box<dyn FnMut(ProgressEvent)>);

        let load_sink = sink.clone();
        let load_xhr = xhr.clone();
        let on_load = Closure::wrap(Box::new(move |_event: ProgressEvent| {
            let status = load_xhr.status().unwrap_or(0);
            let event = if (200..300).contains(&status) {
                match load_xhr.response_text() {
                    Ok(Some(text)) => FetchEvent::Completed(text),
                    _ => FetchEvent::Failed(FetchError::InvalidText),
                }
            } else {
                FetchEvent::Failed(FetchError::Status(status))
            };
            load_sink.push(event);
        }) as Box<dyn FnMut(ProgressEvent)>);

        let error_sink = sink;
        let on_error = Closure::wrap(Box::new(move |_event: ProgressEvent| {
            error_sink.push(FetchEvent::Failed(FetchError::Transport(
                "network error while fetching model".to_string(),
            )));
        }) as Box<dyn FnMut(ProgressEvent)>);

        xhr.set_onprogress(Some(on_progress.as_ref().unchecked_ref()));
        xhr.set_onload(Some(on_load.as_ref().unchecked_ref()));
        xhr.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        xhr.send()?;

        // Callbacks live as long as the request; hand them to JS.
        on_progress.forget();
        on_load.forget();
        on_error.forget();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_tags_events_with_generation() {
        let queue = FetchQueue::default();
        let sink = FetchSink::new(7, queue.clone(), CancelToken::default());

        sink.push(FetchEvent::Progress {
            loaded: 10,
            total: Some(20),
        });

        let events = queue.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, 7);
    }

    #[test]
    fn cancelled_sink_drops_events() {
        let queue = FetchQueue::default();
        let token = CancelToken::default();
        let sink = FetchSink::new(1, queue.clone(), token.clone());

        token.cancel();
        sink.push(FetchEvent::Completed("v 0 0 0".to_string()));

        assert!(sink.is_cancelled());
        assert!(queue.lock().unwrap().is_empty());
    }
}
