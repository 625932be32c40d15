//! Text classification client
//!
//! One POST per dispatched final transcript, carrying the fixed rule list
//! mapping movement intents to the canonical command labels. The response
//! may arrive in two shapes — a flat `output_text` field or a nested list of
//! content blocks — and extraction tries them in that order.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::providers::KeyResolver;
use crate::{Error, Result};

/// Max response-body bytes attached to a request error
const ERROR_BODY_LIMIT: usize = 200;

/// Classification rule list sent as the system instruction
const SYSTEM_RULES: &str = "\
Eres un clasificador de comandos de movimiento para un robot.
Tu salida DEBE ser exactamente UNA de las siguientes opciones (sin comillas, sin puntos, sin explicación):
- avanzar
- retroceder
- detener
- vuelta derecha
- vuelta izquierda
- 90° derecha
- 90° izquierda
- 360° derecha
- 360° izquierda
- Orden no reconocida

Reglas:
1) Si el texto implica moverse hacia adelante: \"avanzar\".
2) Si implica atrás: \"retroceder\".
3) Si implica parar: \"detener\".
4) \"vuelta derecha\" o \"vuelta izquierda\" para giros suaves (sin grados).
5) Si menciona 90 grados a derecha/izquierda usa \"90° derecha\" / \"90° izquierda\".
6) Si menciona giro completo 360 a derecha/izquierda usa \"360° derecha\" / \"360° izquierda\".
7) Si hay ambigüedad o no es comando de movimiento, responde \"Orden no reconocida\".";

/// Maps free-form utterance text to one raw command label
#[async_trait]
pub trait CommandClassifier: Send + Sync {
    /// Classify a final transcript, returning the raw label text
    ///
    /// An empty return is valid — the validator coerces it downstream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Credential`] when no API key can be obtained and
    /// [`Error::Classification`] on transport failures or non-2xx answers.
    async fn classify(&self, text: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    model: &'a str,
    input: [InputMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Classifier response body — both known shapes in one struct
#[derive(Debug, Default, Deserialize)]
pub struct ClassifyResponse {
    /// Flat text field (shape a)
    #[serde(default)]
    output_text: Option<String>,
    /// Nested content blocks (shape b)
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<String>,
}

impl ClassifyResponse {
    /// Extract the answer text: the flat field first, then the first
    /// non-empty text found walking the content blocks in order.
    #[must_use]
    pub fn output_text(&self) -> String {
        if let Some(text) = &self.output_text {
            return text.clone();
        }

        for item in &self.output {
            for part in &item.content {
                if let Some(text) = &part.text {
                    if !text.trim().is_empty() {
                        return text.clone();
                    }
                }
            }
        }

        String::new()
    }
}

/// HTTP classifier client
pub struct ClassifierClient {
    client: reqwest::Client,
    url: String,
    model: String,
    keys: Arc<KeyResolver>,
}

impl ClassifierClient {
    #[must_use]
    pub fn new(url: String, model: String, keys: Arc<KeyResolver>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            model,
            keys,
        }
    }
}

#[async_trait]
impl CommandClassifier for ClassifierClient {
    async fn classify(&self, text: &str) -> Result<String> {
        // Lazy key resolution; a failure here disables only this attempt
        let api_key = self.keys.resolve().await?;

        tracing::debug!(model = %self.model, "sending classification request");

        let body = ClassifyRequest {
            model: &self.model,
            input: [
                InputMessage {
                    role: "system",
                    content: SYSTEM_RULES,
                },
                InputMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Classification(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(Error::Classification(format!("HTTP {status}: {body}")));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| Error::Classification(format!("invalid response: {e}")))?;

        let raw = parsed.output_text().trim().to_string();
        tracing::debug!(raw = %raw, "classification response");
        Ok(raw)
    }
}
