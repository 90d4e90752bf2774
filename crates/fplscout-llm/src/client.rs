// Streaming client for the Anthropic Messages API.
//
// A request is sent with `stream: true`; each SSE payload is decoded into a
// typed `StreamPayload`, folded into a `Transcript`, and surfaced to the
// caller as `LlmEvent`s over an mpsc channel.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use fplscout_core::config::Config;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// What the caller sees while a response streams in.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmEvent {
    Token(String),
    Complete {
        full_text: String,
        input_tokens: u32,
        output_tokens: u32,
    },
    Error(String),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: Option<u32>,
    #[serde(default)]
    output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StartedMessage {
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct TextDelta {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// One SSE data payload, discriminated by its `type` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamPayload {
    MessageStart { message: StartedMessage },
    ContentBlockDelta { delta: TextDelta },
    MessageDelta {
        #[serde(default)]
        usage: Usage,
    },
    MessageStop,
    Error { error: ApiError },
    #[serde(other)]
    Other,
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Accumulated state of one streamed response.
#[derive(Debug, Default)]
struct Transcript {
    text: String,
    input_tokens: u32,
    output_tokens: u32,
}

/// What the stream loop should do after a payload.
#[derive(Debug, PartialEq)]
enum Step {
    Continue,
    Emit(String),
    Finish,
    Fail(String),
}

impl Transcript {
    fn apply(&mut self, payload: StreamPayload) -> Step {
        match payload {
            StreamPayload::MessageStart { message } => {
                self.input_tokens = message.usage.input_tokens.unwrap_or(0);
                Step::Continue
            }
            StreamPayload::ContentBlockDelta { delta } => match delta.text {
                Some(text) if !text.is_empty() => {
                    self.text.push_str(&text);
                    Step::Emit(text)
                }
                _ => Step::Continue,
            },
            StreamPayload::MessageDelta { usage } => {
                if let Some(n) = usage.output_tokens {
                    self.output_tokens = n;
                }
                Step::Continue
            }
            StreamPayload::MessageStop => Step::Finish,
            StreamPayload::Error { error } => Step::Fail(error.message),
            StreamPayload::Other => Step::Continue,
        }
    }

    fn into_event(self) -> LlmEvent {
        LlmEvent::Complete {
            full_text: self.text,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
        }
    }
}

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// Stream one completion over `tx`.
    ///
    /// Problems with the request or the stream are delivered as a final
    /// `LlmEvent::Error`; the returned `Result` only fails on programmer
    /// error. Stops early if the receiver goes away.
    pub async fn stream_message(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        temperature: f32,
        tx: mpsc::Sender<LlmEvent>,
    ) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            let _ = tx.send(LlmEvent::Error("API key not configured".into())).await;
            return Ok(());
        }

        let body = MessageRequest {
            model: &self.model,
            max_tokens,
            temperature,
            stream: true,
            system,
            messages: [UserMessage {
                role: "user",
                content: user_content,
            }],
        };
        let builder = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);

        let mut source = match builder.eventsource() {
            Ok(source) => source,
            Err(e) => {
                let _ = tx
                    .send(LlmEvent::Error(format!("could not open stream: {e}")))
                    .await;
                return Ok(());
            }
        };

        let mut transcript = Transcript::default();
        while let Some(event) = source.next().await {
            let message = match event {
                Ok(Event::Open) => {
                    debug!(model = %self.model, "stream opened");
                    continue;
                }
                Ok(Event::Message(message)) => message,
                Err(err) => {
                    warn!(error = %err, "stream failed");
                    source.close();
                    let _ = tx.send(LlmEvent::Error(describe_stream_error(&err))).await;
                    return Ok(());
                }
            };

            let payload = match serde_json::from_str::<StreamPayload>(&message.data) {
                Ok(payload) => payload,
                Err(e) => {
                    debug!(event = %message.event, error = %e, "skipping undecodable payload");
                    continue;
                }
            };

            match transcript.apply(payload) {
                Step::Continue => {}
                Step::Emit(text) => {
                    if tx.send(LlmEvent::Token(text)).await.is_err() {
                        source.close();
                        return Ok(());
                    }
                }
                Step::Finish => {
                    source.close();
                    debug!(
                        input_tokens = transcript.input_tokens,
                        output_tokens = transcript.output_tokens,
                        "stream complete"
                    );
                    let _ = tx.send(transcript.into_event()).await;
                    return Ok(());
                }
                Step::Fail(reason) => {
                    source.close();
                    warn!(%reason, "API reported an error mid-stream");
                    let _ = tx.send(LlmEvent::Error(reason)).await;
                    return Ok(());
                }
            }
        }

        // Stream closed without message_stop: keep whatever arrived.
        let last = if transcript.text.is_empty() {
            LlmEvent::Error("stream ended before any content arrived".into())
        } else {
            transcript.into_event()
        };
        let _ = tx.send(last).await;
        Ok(())
    }
}

fn describe_stream_error(err: &reqwest_eventsource::Error) -> String {
    use reqwest_eventsource::Error;
    match err {
        Error::InvalidStatusCode(status, _) => format!("API returned status {status}"),
        Error::Transport(e) => format!("network error: {e}"),
        other => format!("stream error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// LlmClient
// ---------------------------------------------------------------------------

/// The configured LLM, or `Disabled` when no API key is available.
pub enum LlmClient {
    Active(ClaudeClient),
    Disabled,
}

impl LlmClient {
    pub fn from_config(config: &Config) -> Self {
        config
            .credentials
            .anthropic_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(|key| {
                LlmClient::Active(ClaudeClient::new(key.to_string(), config.llm.model.clone()))
            })
            .unwrap_or(LlmClient::Disabled)
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, LlmClient::Active(_))
    }

    pub async fn stream_message(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        temperature: f32,
        tx: mpsc::Sender<LlmEvent>,
    ) -> anyhow::Result<()> {
        let LlmClient::Active(client) = self else {
            let _ = tx.send(LlmEvent::Error("LLM not configured".into())).await;
            return Ok(());
        };
        client
            .stream_message(system, user_content, max_tokens, temperature, tx)
            .await
    }

    /// Run one request to completion and return the full response text.
    pub async fn complete(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> anyhow::Result<String> {
        let (tx, rx) = mpsc::channel(256);
        let (sent, collected) = tokio::join!(
            self.stream_message(system, user_content, max_tokens, temperature, tx),
            collect_completion(rx),
        );
        sent?;
        collected
    }
}

/// Drain a stream of events into the final text.
async fn collect_completion(mut rx: mpsc::Receiver<LlmEvent>) -> anyhow::Result<String> {
    let mut partial = String::new();
    while let Some(event) = rx.recv().await {
        match event {
            LlmEvent::Token(text) => partial.push_str(&text),
            LlmEvent::Complete {
                full_text,
                input_tokens,
                output_tokens,
            } => {
                debug!(input_tokens, output_tokens, "completion collected");
                return Ok(full_text);
            }
            LlmEvent::Error(message) => anyhow::bail!("LLM request failed: {message}"),
        }
    }
    if partial.is_empty() {
        anyhow::bail!("LLM stream closed without a response");
    }
    Ok(partial)
}
