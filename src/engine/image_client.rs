//! Fire-and-forget image generation.
//!
//! The turn engine dispatches an image request after a successful apply and
//! immediately moves on: generation runs on its own worker thread and its
//! outcome is reported over an mpsc channel to whoever is rendering. An
//! image failure can never affect game state.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::config::ImageConfig;

/// The external image collaborator.
#[cfg_attr(test, mockall::automock)]
pub trait ImageClient {
    fn request_image(&self, prompt: &str);
}

/// Asynchronous completion report for one image request.
#[derive(Debug, Clone)]
pub enum ImageEvent {
    Ready { prompt: String, url: String },
    Failed { prompt: String, reason: String },
}

/// HTTP image collaborator: one worker thread per request, results pushed
/// to the event channel supplied at construction.
pub struct HttpImageClient {
    base_url: String,
    timeout: Duration,
    events: Sender<ImageEvent>,
}

impl HttpImageClient {
    pub fn new(config: &ImageConfig, events: Sender<ImageEvent>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            events,
        }
    }
}

impl ImageClient for HttpImageClient {
    fn request_image(&self, prompt: &str) {
        let base_url = self.base_url.clone();
        let timeout = self.timeout;
        let events = self.events.clone();
        let prompt = prompt.to_string();

        thread::spawn(move || {
            let event = match generate(&base_url, &prompt, timeout) {
                Ok(url) => ImageEvent::Ready {
                    prompt: prompt.clone(),
                    url,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "image generation failed");
                    ImageEvent::Failed {
                        prompt: prompt.clone(),
                        reason: e.to_string(),
                    }
                }
            };
            // Receiver may already be gone; the engine does not care.
            let _ = events.send(event);
        });
    }
}

fn generate(base_url: &str, prompt: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
    let resp: serde_json::Value = client
        .post(format!("{base_url}/v1/images/generations"))
        .json(&serde_json::json!({ "prompt": prompt, "n": 1 }))
        .send()?
        .error_for_status()?
        .json()?;

    resp["data"][0]["url"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("image response carried no url"))
}
