//! Remote persistence strategy.
//!
//! CRUD goes over JSON HTTP with bearer authentication; the live
//! subscription is a WebSocket stream on which the server pushes the
//! full collection as a JSON array after every change.

use futures::future::BoxFuture;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::error::GatewayError;
use crate::models::Entity;

use super::{CancelGuard, CollectionEvent, EntityGateway, Subscription};

/// Response from a create call.
#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

/// Gateway backed by a sync server.
///
/// One instance serves every entity type; collection paths are derived
/// from [`Entity::COLLECTION`].
#[derive(Debug, Clone)]
pub struct RemoteGateway {
    server_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl RemoteGateway {
    pub fn new(server_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Builds an HTTP URL for a given path, converting ws(s) schemes
    /// to http(s) if the configured URL uses them.
    fn http_url(&self, path: &str) -> String {
        let base_url = if self.server_url.starts_with("ws://") {
            self.server_url.replace("ws://", "http://")
        } else if self.server_url.starts_with("wss://") {
            self.server_url.replace("wss://", "https://")
        } else if !self.server_url.starts_with("http://")
            && !self.server_url.starts_with("https://")
        {
            format!("http://{}", self.server_url)
        } else {
            self.server_url.clone()
        };

        format!("{}{}", base_url.trim_end_matches('/'), path)
    }

    /// Builds the WebSocket URL for a watch path.
    fn ws_url(&self, path: &str) -> String {
        let base_url = if self.server_url.starts_with("http://") {
            self.server_url.replace("http://", "ws://")
        } else if self.server_url.starts_with("https://") {
            self.server_url.replace("https://", "wss://")
        } else if !self.server_url.starts_with("ws://") && !self.server_url.starts_with("wss://") {
            format!("ws://{}", self.server_url)
        } else {
            self.server_url.clone()
        };

        format!(
            "{}{}?key={}",
            base_url.trim_end_matches('/'),
            path,
            self.api_key
        )
    }

    fn collection_path<E: Entity>(user_id: &str) -> String {
        format!("/users/{}/{}", user_id, E::COLLECTION.replace(' ', "-"))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(GatewayError::Status(response.status().as_u16()))
        }
    }
}

impl<E: Entity> EntityGateway<E> for RemoteGateway {
    fn create<'a>(
        &'a self,
        user_id: &'a str,
        draft: E::Draft,
    ) -> BoxFuture<'a, Result<String, GatewayError>> {
        Box::pin(async move {
            let url = self.http_url(&Self::collection_path::<E>(user_id));
            let response = self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&draft)
                .send()
                .await
                .map_err(|e| GatewayError::Connection(e.to_string()))?;
            let created: CreatedResponse = Self::check_status(response)
                .await?
                .json()
                .await
                .map_err(|e| GatewayError::Decode(e.to_string()))?;
            Ok(created.id)
        })
    }

    fn get_all<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Vec<E>, GatewayError>> {
        Box::pin(async move {
            let url = self.http_url(&Self::collection_path::<E>(user_id));
            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| GatewayError::Connection(e.to_string()))?;
            Self::check_status(response)
                .await?
                .json()
                .await
                .map_err(|e| GatewayError::Decode(e.to_string()))
        })
    }

    fn update<'a>(
        &'a self,
        user_id: &'a str,
        id: &'a str,
        patch: E::Patch,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            let url = format!(
                "{}/{}",
                self.http_url(&Self::collection_path::<E>(user_id)),
                id
            );
            let response = self
                .http
                .patch(&url)
                .bearer_auth(&self.api_key)
                .json(&patch)
                .send()
                .await
                .map_err(|e| GatewayError::Connection(e.to_string()))?;
            Self::check_status(response).await?;
            Ok(())
        })
    }

    fn delete<'a>(
        &'a self,
        user_id: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            let url = format!(
                "{}/{}",
                self.http_url(&Self::collection_path::<E>(user_id)),
                id
            );
            let response = self
                .http
                .delete(&url)
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| GatewayError::Connection(e.to_string()))?;
            Self::check_status(response).await?;
            Ok(())
        })
    }

    fn subscribe<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, Result<Subscription<E>, GatewayError>> {
        Box::pin(async move {
            let url = self.ws_url(&format!("{}/watch", Self::collection_path::<E>(user_id)));
            let (ws_stream, _) = connect_async(&url)
                .await
                .map_err(|e| GatewayError::Connection(e.to_string()))?;

            let (mut sender, mut receiver) = ws_stream.split();
            let (tx, rx) = mpsc::unbounded_channel();
            let (cancel_tx, mut cancel_rx) = watch::channel(false);

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = cancel_rx.changed() => {
                            let _ = sender.send(Message::Close(None)).await;
                            break;
                        }
                        msg = receiver.next() => match msg {
                            Some(Ok(Message::Text(text))) => {
                                match serde_json::from_str::<Vec<E>>(text.as_str()) {
                                    Ok(items) => {
                                        if tx.send(CollectionEvent::Snapshot(items)).is_err() {
                                            break;
                                        }
                                    }
                                    Err(e) => {
                                        tracing::warn!("Bad snapshot payload: {}", e);
                                        let _ = tx.send(CollectionEvent::Lost(
                                            GatewayError::Decode(e.to_string()),
                                        ));
                                        break;
                                    }
                                }
                            }
                            Some(Ok(Message::Ping(data))) => {
                                let _ = sender.send(Message::Pong(data)).await;
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                let _ = tx.send(CollectionEvent::Lost(GatewayError::WebSocket(
                                    "connection closed".to_string(),
                                )));
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                let _ = tx.send(CollectionEvent::Lost(GatewayError::WebSocket(
                                    e.to_string(),
                                )));
                                break;
                            }
                        }
                    }
                }
            });

            let cancel = CancelGuard::new(move || {
                let _ = cancel_tx.send(true);
            });

            Ok(Subscription::new(rx, cancel))
        })
    }
}
