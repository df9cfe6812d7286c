use async_trait::async_trait;
use common::{CatalogEntry, ResourceEntry, ScoringRequest};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{
    EndGameRequest, FoodItemsResponse, GameApi, GameResult, LeaderboardEntry, ResourcesResponse,
    ScoreUpdate, StartGameRequest, StartedGame, UpdateGameRequest,
};
use crate::config::SessionConfig;
use crate::error::ApiError;

/// [`GameApi`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpGameApi {
    client: Client,
    base_url: Url,
}

impl HttpGameApi {
    /// `base_url` must end in `/`; endpoints are joined relative to it.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: base_url.to_string(),
                source,
            })?;
        Ok(HttpGameApi { client, base_url })
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self, ApiError> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.send(path, self.client.get(url)).await
    }

    async fn post<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.send(path, self.client.post(url).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<T, ApiError> {
        let transport = |source| ApiError::Transport {
            endpoint: path.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        debug!(endpoint = path, status = status.as_u16(), "Backend responded");

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl GameApi for HttpGameApi {
    async fn start_game(&self, player_id: &str) -> Result<StartedGame, ApiError> {
        let body = StartGameRequest {
            player_id: player_id.to_string(),
        };
        self.post("game/start/", &body).await
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, ApiError> {
        let response: FoodItemsResponse = self.get("game/food-items/").await?;
        Ok(response.food_items)
    }

    async fn fetch_resources(&self) -> Result<Vec<ResourceEntry>, ApiError> {
        let response: ResourcesResponse = self.get("game/resources/").await?;
        Ok(response.resources)
    }

    async fn submit_score(&self, game_id: &str, request: ScoringRequest) -> Result<ScoreUpdate, ApiError> {
        self.post("game/update/", &UpdateGameRequest::new(game_id, &request))
            .await
    }

    async fn end_game(&self, game_id: &str) -> Result<GameResult, ApiError> {
        let body = EndGameRequest {
            game_id: game_id.to_string(),
        };
        self.post("game/end/", &body).await
    }

    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        self.get("game/leaderboard/").await
    }
}
