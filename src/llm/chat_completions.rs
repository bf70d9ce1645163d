//! OpenAI Chat Completions API driver.
//!
//! Implements [`LlmDriver`] for `/v1/chat/completions` with `stream: true`,
//! which Ollama and hosted OpenAI-compatible providers both serve.

use futures::StreamExt;

use crate::normalized::NormalizedEvent;

use super::{EventStream, LlmDriver, LlmRequest, LlmSettings};

/// Driver for the OpenAI Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsDriver {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for ChatCompletionsDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsDriver")
            .field("base_url", &self.settings.base_url)
            .field("model", &self.settings.model)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionsDriver {
    /// Create a new Chat Completions driver with the given settings.
    pub fn new(settings: LlmSettings) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            settings,
        })
    }

    /// Full URL of the completions endpoint.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl LlmDriver for ChatCompletionsDriver {
    async fn stream(&self, req: LlmRequest) -> anyhow::Result<EventStream> {
        let body = serde_json::json!({
            "model": self.settings.model,
            "stream": true,
            "messages": req.messages,
        });

        let mut rb = self.http.post(self.url()).json(&body);
        if let Some(k) = &self.settings.api_key {
            rb = rb.bearer_auth(k);
        }

        let resp = rb.send().await?.error_for_status()?;
        let byte_stream = resp.bytes_stream();

        let out = async_stream::try_stream! {
            let mut buf = Vec::<u8>::new();

            futures::pin_mut!(byte_stream);
            while let Some(chunk) = byte_stream.next().await {
                let chunk = chunk?;
                buf.extend_from_slice(&chunk);

                while let Some((pos, len)) = find_frame_end(&buf) {
                    let frame = buf.drain(..pos + len).collect::<Vec<_>>();
                    for event in parse_frame(&frame)? {
                        yield event;
                    }
                }
            }

            // Final frame without a trailing blank line.
            for event in parse_frame(&buf)? {
                yield event;
            }
        };

        Ok(Box::pin(out))
    }
}

/// Events carried by one SSE frame.
fn parse_frame(frame: &[u8]) -> anyhow::Result<Vec<NormalizedEvent>> {
    let text = String::from_utf8_lossy(frame);
    let mut events = Vec::new();
    for line in text.lines() {
        if let Some(event) = parse_data_line(line)? {
            events.push(event);
        }
    }
    Ok(events)
}

/// Translate one SSE line into an event, skipping comments and empty deltas.
fn parse_data_line(line: &str) -> anyhow::Result<Option<NormalizedEvent>> {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();

    if data == "[DONE]" {
        return Ok(Some(NormalizedEvent::Done));
    }

    let v: serde_json::Value = serde_json::from_str(data)?;

    if let Some(err) = v.get("error") {
        let message = err
            .get("message")
            .and_then(|x| x.as_str())
            .unwrap_or("unknown error")
            .to_string();
        let code = err.get("code").map(|c| match c.as_str() {
            Some(s) => s.to_string(),
            None => c.to_string(),
        });
        return Ok(Some(NormalizedEvent::Error { message, code }));
    }

    let text = v["choices"][0]["delta"]
        .get("content")
        .and_then(|x| x.as_str())
        .filter(|s| !s.is_empty());

    Ok(text.map(|s| NormalizedEvent::MessageDelta {
        text: s.to_string(),
    }))
}

/// Position and length of the first frame separator (`\n\n` or `\r\n\r\n`).
fn find_frame_end(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|p| (p, 2));
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| (p, 4));
    [lf, crlf].into_iter().flatten().min_by_key(|(pos, _)| *pos)
}
