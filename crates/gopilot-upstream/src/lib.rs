pub mod client;
pub mod resolver;

pub use client::{
    BUFFERED_CHAT_TIMEOUT, CallMode, PREDICT_TIMEOUT, TOOL_TIMEOUT, UpstreamClient,
    UpstreamRequest, UpstreamResponse, UpstreamResponseBody, WreqUpstreamClient,
};
pub use resolver::{
    AuthMode, UpstreamStyle, UpstreamTarget, resolve_predict_target, resolve_target,
    resolve_toolbox_url,
};
