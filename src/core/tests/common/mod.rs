//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

use pageable_core::collection::{CollectionEvent, EventFilter, EventKind, Subscription};
use pageable_core::error::{ErrorCode, PageableError, Result};
use pageable_core::pagination::{FullCache, PageableCollection};
use pageable_core::transport::{FetchRequest, FetchResponse, Transport};

enum Reply {
    Ok { body: Value, link: Option<String> },
    Fail(ErrorCode),
}

/// In-memory transport answering requests from a queue of scripted replies.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a successful reply with `body`.
    pub fn reply(&self, body: Value) -> &Self {
        self.replies.lock().push_back(Reply::Ok { body, link: None });
        self
    }

    /// Queue a successful reply carrying a `Link` header.
    pub fn reply_with_link(&self, body: Value, link: &str) -> &Self {
        self.replies.lock().push_back(Reply::Ok {
            body,
            link: Some(link.to_string()),
        });
        self
    }

    /// Queue a failure.
    pub fn fail(&self, code: ErrorCode) -> &Self {
        self.replies.lock().push_back(Reply::Fail(code));
        self
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        self.requests.lock().push(request.clone());
        let reply = self.replies.lock().pop_front();

        match reply {
            Some(Reply::Ok { body, link }) => {
                let mut response = FetchResponse::new(request.url.clone(), body);
                if let Some(link) = link {
                    response.insert_header("Link", link);
                }
                Ok(response)
            }
            Some(Reply::Fail(ErrorCode::HttpStatus)) => {
                Err(PageableError::http_status(request.url.clone(), 500))
            }
            Some(Reply::Fail(code)) => Err(PageableError::new(code, "scripted failure")),
            None => Err(PageableError::transport(
                request.url.clone(),
                "no scripted reply left",
            )),
        }
    }
}

/// Records the kinds of every event a collection emits.
pub struct EventLog {
    kinds: Arc<Mutex<Vec<EventKind>>>,
    _subscription: Subscription,
}

impl EventLog {
    pub fn visible(collection: &PageableCollection<Value>) -> Self {
        let kinds = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&kinds);
        let subscription = collection.subscribe(EventFilter::All, move |event| {
            sink.lock().push(event.kind());
        });
        Self {
            kinds,
            _subscription: subscription,
        }
    }

    pub fn full(cache: &FullCache<Value>) -> Self {
        let kinds = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&kinds);
        let subscription = cache.subscribe(EventFilter::All, move |event: &CollectionEvent<Value>| {
            sink.lock().push(event.kind());
        });
        Self {
            kinds,
            _subscription: subscription,
        }
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.kinds.lock().clone()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.kinds.lock().iter().filter(|k| **k == kind).count()
    }

    pub fn clear(&self) {
        self.kinds.lock().clear();
    }
}

/// `[{"id": a}, {"id": b}, ...]`
pub fn ids(values: &[i64]) -> Value {
    Value::Array(values.iter().map(|id| serde_json::json!({ "id": id })).collect())
}
