use super::Translator;
use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::time::Duration;

/// Client for the unofficial `translate_a/single` endpoint.
///
/// One blocking request per translation unit; no batching and no retry. A
/// failed request surfaces as an error and the caller decides whether to keep
/// the original text.
pub struct GoogleTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
    source_lang: String,
    target_lang: String,
}

impl GoogleTranslator {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.translate.timeout_seconds))
            .build()
            .with_context(|| "building http client")?;
        Ok(Self {
            client,
            endpoint: cfg.translate.endpoint.clone(),
            source_lang: cfg.translate.source_lang.clone(),
            target_lang: cfg.translate.target_lang.clone(),
        })
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_lang.as_str()),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .with_context(|| "sending translation request")?
            .error_for_status()
            .with_context(|| "translation endpoint returned an error status")?
            .json::<Value>()
            .with_context(|| "decoding translation response")?;

        // Response shape: [[["<translated>", "<original>", ...], ...], ...]
        let segments = resp
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("unexpected translation response shape"))?;

        let mut out = String::new();
        for seg in segments {
            if let Some(s) = seg.get(0).and_then(Value::as_str) {
                out.push_str(s);
            }
        }

        if out.is_empty() {
            return Err(anyhow!("translation response contained no text"));
        }
        Ok(out)
    }
}
