//! Provider trait and the streaming adapters behind it

pub mod anthropic;
pub mod openai;

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt, stream};
use reqwest::{RequestBuilder, Response, StatusCode};
use stride_config::{LlmConfig, LlmProviderType};

pub use self::anthropic::AnthropicProvider;
pub use self::openai::OpenAiProvider;
use crate::convert::StreamAccumulator;
use crate::error::LlmError;
use crate::types::{ChatOptions, Message, ProviderChunk};

/// Normalized chunk stream returned by [`Provider::stream_chat`]
///
/// Yields any number of `text_delta` chunks followed by exactly one `done`,
/// or ends early with a single error.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ProviderChunk, LlmError>> + Send>>;

/// Streaming chat backend
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Open one streaming call
    ///
    /// Connection and HTTP status failures surface here; failures after the
    /// first byte surface as an error item on the stream.
    async fn stream_chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChunkStream, LlmError>;
}

/// Build the adapter selected by configuration
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn Provider>, LlmError> {
    let provider: Arc<dyn Provider> = match config.provider {
        LlmProviderType::Anthropic => Arc::new(AnthropicProvider::new(config)?),
        LlmProviderType::Openai => Arc::new(OpenAiProvider::new(config)?),
    };

    tracing::info!(provider = provider.name(), "model provider configured");
    Ok(provider)
}

/// Send a request and turn non-success statuses into typed errors
pub(crate) async fn send_checked(builder: RequestBuilder, provider: &str) -> Result<Response, LlmError> {
    let response = builder.send().await.map_err(|e| {
        tracing::error!(provider, error = %e, "upstream request failed");
        LlmError::Upstream(e.to_string())
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    tracing::warn!(provider, status = %status, "upstream returned error");

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            Err(LlmError::RateLimited { retry_after })
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(LlmError::Unauthorized),
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(LlmError::Upstream(format!("provider returned {status}: {body}")))
        }
    }
}

/// SSE `data` payloads of a streaming response
pub(crate) fn sse_data(response: Response) -> impl Stream<Item = Result<String, LlmError>> + Send {
    response.bytes_stream().eventsource().map(|result| {
        result
            .map(|event| event.data)
            .map_err(|e| LlmError::Streaming(e.to_string()))
    })
}

type NormalizeState<S, A> = Option<(Pin<Box<S>>, A)>;

/// Drive an accumulator over raw SSE payloads
///
/// Stops reading as soon as the vendor signals the end. A stream that ends
/// without the vendor's terminal marker still gets its `done` chunk.
pub(crate) fn normalize<S, A>(frames: S, accumulator: A) -> ChunkStream
where
    S: Stream<Item = Result<String, LlmError>> + Send + 'static,
    A: StreamAccumulator,
{
    let initial: NormalizeState<S, A> = Some((Box::pin(frames), accumulator));

    let batches = stream::unfold(initial, |state| async move {
        let (mut frames, mut acc) = state?;

        loop {
            let data = match frames.next().await {
                Some(Ok(data)) => data,
                Some(Err(e)) => return Some((vec![Err(e)], None)),
                None => {
                    tracing::debug!("provider stream closed without an end marker");
                    return Some((vec![Ok(ProviderChunk::Done(acc.finish()))], None));
                }
            };

            let data = data.trim();
            if data.is_empty() {
                continue;
            }

            let mut chunks = match acc.push(data) {
                Ok(chunks) => chunks,
                Err(e) => return Some((vec![Err(e)], None)),
            };

            if acc.is_finished() {
                chunks.push(ProviderChunk::Done(acc.finish()));
                return Some((chunks.into_iter().map(Ok).collect(), None));
            }
            if !chunks.is_empty() {
                return Some((chunks.into_iter().map(Ok).collect(), Some((frames, acc))));
            }
        }
    });

    Box::pin(batches.flat_map(stream::iter))
}
