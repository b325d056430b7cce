use std::{cell::RefCell, collections::VecDeque};

use async_trait::async_trait;

use crate::sync::{Request, Response, SyncError, SyncResult, Transport};

/// Transport that answers from a queue of canned replies and records what
/// was sent. Used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<SyncResult<Response>>>,
    requests: RefCell<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and body
    pub fn reply(&self, status: u16, body: impl Into<String>) {
        self.replies
            .borrow_mut()
            .push_back(Ok(Response::new(status, body)));
    }

    /// Queues a network failure
    pub fn fail(&self, message: impl Into<String>) {
        self.replies
            .borrow_mut()
            .push_back(Err(SyncError::Network(message.into())));
    }

    /// Every request sent so far, oldest first
    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn pending_replies(&self) -> usize {
        self.replies.borrow().len()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> SyncResult<Response> {
        self.requests.borrow_mut().push(request);
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::Network("no scripted reply".to_string())))
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_then_runs_dry() {
        let transport = ScriptedTransport::new();
        transport.reply(200, "first");
        transport.fail("down");

        assert_eq!(
            transport.send(Request::get("/a")).await.unwrap().body,
            "first"
        );
        assert!(matches!(
            transport.send(Request::get("/b")).await,
            Err(SyncError::Network(msg)) if msg == "down"
        ));
        assert!(transport.send(Request::get("/c")).await.is_err());

        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/a", "/b", "/c"]);
        assert_eq!(transport.pending_replies(), 0);
    }
}
