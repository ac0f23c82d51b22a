//! Gemini REST client implementing the provider gateway.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::future::try_join_all;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use shorts_models::{MediaHandle, ScriptPackage, Thumbnail, ThumbnailVariant};

use crate::config::GeminiConfig;
use crate::credential::ApiKeyStore;
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::ProviderGateway;
use crate::poll::{Sleeper, TokioSleeper};
use crate::prompts;
use crate::types::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig, Operation,
    PredictLongRunningRequest, ScriptPayload, SpeechConfig, Tool, VideoInstance, VideoParameters,
};
use crate::wav;

/// Gemini API client.
pub struct GeminiClient {
    config: GeminiConfig,
    keys: Arc<ApiKeyStore>,
    sleeper: Arc<dyn Sleeper>,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client that polls with the tokio timer.
    pub fn new(config: GeminiConfig, keys: Arc<ApiKeyStore>) -> GatewayResult<Self> {
        Self::with_sleeper(config, keys, Arc::new(TokioSleeper))
    }

    /// Create a client with a custom sleeper for the video poll loop.
    pub fn with_sleeper(
        config: GeminiConfig,
        keys: Arc<ApiKeyStore>,
        sleeper: Arc<dyn Sleeper>,
    ) -> GatewayResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            config,
            keys,
            sleeper,
            client,
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Shared key store (replaced when the user selects a new credential).
    pub fn keys(&self) -> &Arc<ApiKeyStore> {
        &self.keys
    }

    /// POST a JSON body and return the raw response text.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        key: &str,
        body: &B,
    ) -> GatewayResult<String> {
        let response = self
            .client
            .post(url)
            .query(&[("key", key)])
            .json(body)
            .send()
            .await?;

        Ok(check_status(response).await?.text().await?)
    }

    async fn get_json(&self, url: &str, key: &str) -> GatewayResult<String> {
        let response = self.client.get(url).query(&[("key", key)]).send().await?;
        Ok(check_status(response).await?.text().await?)
    }

    async fn generate_thumbnail(
        &self,
        key: &str,
        title: &str,
        variant: &ThumbnailVariant,
    ) -> GatewayResult<Option<Thumbnail>> {
        let request = GenerateContentRequest::text(prompts::thumbnail_prompt(title, variant))
            .with_config(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: "9:16".to_string(),
                    image_size: "1K".to_string(),
                }),
                ..Default::default()
            });

        let url = self.config.model_url(&self.config.image_model, "generateContent");
        let body = self.post_json(&url, key, &request).await?;
        let response: GenerateContentResponse = decode_provider(&body, "image")?;

        match response.first_inline_data() {
            Some(inline) => {
                debug!("Thumbnail variant {} generated", variant.label);
                Ok(Some(Thumbnail {
                    variant: variant.label.clone(),
                    image: MediaHandle::data_uri(
                        inline.mime_type.clone().unwrap_or_else(|| "image/png".to_string()),
                        inline.data.clone(),
                    ),
                }))
            }
            None => {
                warn!("Thumbnail variant {} returned no image", variant.label);
                Ok(None)
            }
        }
    }

    /// Poll a long-running operation until it reports completion.
    async fn wait_for_operation(&self, key: &str, mut operation: Operation) -> GatewayResult<Operation> {
        let policy = self.config.poll;
        let mut attempts = 0u32;

        while !operation.done {
            if attempts >= policy.max_attempts {
                warn!(
                    "Video operation {} not done after {} status checks",
                    operation.name, attempts
                );
                return Err(GatewayError::PollTimeout { attempts });
            }

            self.sleeper.sleep(policy.interval).await;
            attempts += 1;

            let url = self.config.operation_url(&operation.name);
            let body = self.get_json(&url, key).await?;
            operation = decode_provider(&body, "operation")?;
            debug!(
                "Video operation {} status check {}: done={}",
                operation.name, attempts, operation.done
            );
        }

        Ok(operation)
    }

    /// Fetch the finished video with the request's key and write it to the media dir.
    async fn download_video(&self, key: &str, uri: &str) -> GatewayResult<PathBuf> {
        let mut url = Url::parse(uri)
            .map_err(|e| GatewayError::provider(format!("Invalid video delivery URI: {}", e)))?;
        url.query_pairs_mut().append_pair("key", key);

        let response = self.client.get(url).send().await?;
        let bytes = check_status(response).await?.bytes().await?;
        if bytes.is_empty() {
            return Err(GatewayError::empty_response("Video download returned no data"));
        }

        tokio::fs::create_dir_all(&self.config.media_dir).await?;
        let path = self.config.media_dir.join(format!("{}.mp4", Uuid::new_v4()));
        tokio::fs::write(&path, &bytes).await?;

        info!("Downloaded video ({} bytes) to {}", bytes.len(), path.display());
        Ok(path)
    }
}

#[async_trait]
impl ProviderGateway for GeminiClient {
    async fn generate_script(&self, topic: &str) -> GatewayResult<ScriptPackage> {
        let key = self.keys.get().await?;
        info!("Generating script for topic '{}' with {}", topic, self.config.script_model);

        let request = GenerateContentRequest::text(prompts::script_prompt(topic))
            .with_tool(Tool::google_search())
            .with_config(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(prompts::script_response_schema()),
                ..Default::default()
            });

        let url = self.config.model_url(&self.config.script_model, "generateContent");
        let body = self.post_json(&url, &key, &request).await?;

        let mut response: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::parse(format!("Failed to parse script generation response: {}", e))
        })?;
        let text = response
            .text()
            .ok_or_else(|| GatewayError::parse("No content in script generation response"))?;
        let grounding_sources = response.take_grounding_sources();

        let package = ScriptPayload::from_model_text(&text)?.into_package(grounding_sources)?;
        info!(
            "Script generated: title='{}', keywords={}, sources={}, confidence={:.2}",
            package.title,
            package.seo_keywords.len(),
            package.grounding_sources.len(),
            package.confidence
        );
        Ok(package)
    }

    async fn generate_thumbnails(
        &self,
        title: &str,
        variants: &[ThumbnailVariant],
    ) -> GatewayResult<Vec<Thumbnail>> {
        let key = self.keys.get().await?;
        info!("Generating {} thumbnail variants for '{}'", variants.len(), title);

        let requests = variants
            .iter()
            .map(|variant| self.generate_thumbnail(&key, title, variant));
        let thumbnails: Vec<Thumbnail> = try_join_all(requests).await?.into_iter().flatten().collect();

        Ok(thumbnails)
    }

    async fn generate_video(&self, script: &str) -> GatewayResult<MediaHandle> {
        let key = self.keys.get().await?;
        info!("Submitting video generation with {}", self.config.video_model);

        let request = PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: prompts::video_prompt(script),
            }],
            parameters: VideoParameters::default(),
        };

        let url = self.config.model_url(&self.config.video_model, "predictLongRunning");
        let body = self.post_json(&url, &key, &request).await?;
        let operation: Operation = decode_provider(&body, "operation")?;
        info!("Video operation started: {}", operation.name);

        let operation = self.wait_for_operation(&key, operation).await?;
        if let Some(error) = &operation.error {
            return Err(GatewayError::from_operation_error(error));
        }

        let uri = operation
            .video_uri()
            .ok_or_else(|| GatewayError::empty_response("Video generation finished without a video"))?
            .to_string();

        let path = self.download_video(&key, &uri).await?;
        Ok(MediaHandle::file("video/mp4", path))
    }

    async fn generate_voiceover(&self, script: &str) -> GatewayResult<MediaHandle> {
        let key = self.keys.get().await?;
        info!("Generating voice-over with voice {}", self.config.tts_voice);

        let request = GenerateContentRequest::text(prompts::voiceover_prompt(script)).with_config(
            GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig::prebuilt(self.config.tts_voice.clone())),
                ..Default::default()
            },
        );

        let url = self.config.model_url(&self.config.tts_model, "generateContent");
        let body = self.post_json(&url, &key, &request).await?;
        let response: GenerateContentResponse = decode_provider(&body, "speech")?;

        let inline = response
            .first_inline_data()
            .ok_or_else(|| GatewayError::empty_response("Voiceover failed"))?;
        let mime_type = inline.mime_type.as_deref().unwrap_or("audio/L16");

        if !is_raw_pcm(mime_type) {
            return Ok(MediaHandle::data_uri(mime_type, inline.data.clone()));
        }

        let pcm = BASE64
            .decode(inline.data.as_bytes())
            .map_err(|e| GatewayError::empty_response(format!("Voiceover audio is not valid base64: {}", e)))?;
        if pcm.is_empty() {
            return Err(GatewayError::empty_response("Voiceover failed"));
        }

        let sample_rate = wav::sample_rate_from_mime(mime_type).unwrap_or(wav::DEFAULT_SAMPLE_RATE);
        let audio = wav::pcm16_to_wav(&pcm, sample_rate, 1);
        debug!("Voice-over wrapped as WAV ({} bytes at {} Hz)", audio.len(), sample_rate);

        Ok(MediaHandle::data_uri("audio/wav", BASE64.encode(audio)))
    }
}

/// Turn non-success responses into classified gateway errors.
async fn check_status(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let error = GatewayError::from_http_status(status.as_u16(), &body);
    warn!("Gemini API returned {}: {}", status, error);
    Err(error)
}

fn decode_provider<T: DeserializeOwned>(body: &str, what: &str) -> GatewayResult<T> {
    serde_json::from_str(body)
        .map_err(|e| GatewayError::provider(format!("Unreadable {} response: {}", what, e)))
}

fn is_raw_pcm(mime_type: &str) -> bool {
    let base = mime_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    matches!(base.as_str(), "audio/l16" | "audio/pcm")
}
