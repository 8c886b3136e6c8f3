//! Transport spy that records every request.

use std::collections::VecDeque;

use wdm_common::{Datastore, NetconfTransport, RpcReply, WdmResult};

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Get(String),
    GetConfig(Datastore, String),
    EditConfig(Datastore, String),
    Dispatch(String),
}

impl TransportCall {
    /// The document that was sent.
    pub fn document(&self) -> &str {
        match self {
            TransportCall::Get(doc)
            | TransportCall::GetConfig(_, doc)
            | TransportCall::EditConfig(_, doc)
            | TransportCall::Dispatch(doc) => doc,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(
            self,
            TransportCall::EditConfig(..) | TransportCall::Dispatch(_)
        )
    }
}

/// Records calls and answers from a script, `<ok/>` once the script runs
/// out.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: Vec<TransportCall>,
    replies: VecDeque<WdmResult<RpcReply>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next call.
    pub fn push_reply(&mut self, reply: WdmResult<RpcReply>) -> &mut Self {
        self.replies.push_back(reply);
        self
    }

    /// Queues a raw reply document.
    pub fn push_raw(&mut self, raw: impl Into<String>) -> &mut Self {
        self.push_reply(Ok(RpcReply::new(raw)))
    }

    pub fn calls(&self) -> &[TransportCall] {
        &self.calls
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    pub fn writes(&self) -> impl Iterator<Item = &TransportCall> {
        self.calls.iter().filter(|c| c.is_write())
    }

    fn record(&mut self, call: TransportCall) -> WdmResult<RpcReply> {
        self.calls.push(call);
        self.replies
            .pop_front()
            .unwrap_or_else(|| Ok(RpcReply::ok()))
    }
}

impl NetconfTransport for RecordingTransport {
    fn get(&mut self, filter: &str) -> WdmResult<RpcReply> {
        self.record(TransportCall::Get(filter.to_string()))
    }

    fn get_config(&mut self, source: Datastore, filter: &str) -> WdmResult<RpcReply> {
        self.record(TransportCall::GetConfig(source, filter.to_string()))
    }

    fn edit_config(&mut self, target: Datastore, config: &str) -> WdmResult<RpcReply> {
        self.record(TransportCall::EditConfig(target, config.to_string()))
    }

    fn dispatch(&mut self, rpc: &str) -> WdmResult<RpcReply> {
        self.record(TransportCall::Dispatch(rpc.to_string()))
    }
}
