use anyhow::Result;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

use crate::config::Config;
use crate::model::Reply;
use crate::providers;

pub type ModelGatewayFuture<'a> = Pin<Box<dyn Future<Output = Result<Reply>> + 'a>>;

/// One prompt in, one reply out. Transport and API failures come back as `Err`
/// so the caller decides how to present them.
pub trait ModelGateway {
    fn send_prompt<'a>(&'a self, prompt: &'a str) -> ModelGatewayFuture<'a>;
}

pub struct GeminiGateway<'a> {
    client: &'a Client,
    cfg: &'a Config,
}

impl<'a> GeminiGateway<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }
}

impl ModelGateway for GeminiGateway<'_> {
    fn send_prompt<'b>(&'b self, prompt: &'b str) -> ModelGatewayFuture<'b> {
        Box::pin(async move {
            let reply = providers::gemini::generate(self.client, self.cfg, prompt).await?;
            debug!(usable = reply.is_usable(), "gemini turn completed");
            Ok(reply)
        })
    }
}
