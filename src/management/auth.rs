use std::path::PathBuf;

use chrono::Utc;

use crate::{config, spotify, types::Token};

/// Seconds before the actual expiry at which a token is treated as expired.
const EXPIRY_MARGIN: u64 = 240;

pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    pub async fn load() -> Result<Self, String> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(&path, json)
            .await
            .map_err(|e| e.to_string())
    }

    /// Returns an access token, refreshing and persisting it first when it
    /// is about to expire. A failed refresh keeps the current token.
    pub async fn get_valid_token(&mut self) -> String {
        if is_expired(&self.token, Utc::now().timestamp() as u64) {
            if let Ok(mut new_token) = spotify::auth::refresh_token(&self.token.refresh_token).await
            {
                // Spotify may omit the refresh token when it is not rotated.
                if new_token.refresh_token.is_empty() {
                    new_token.refresh_token = self.token.refresh_token.clone();
                }
                self.token = new_token;
                let _ = self.persist().await;
            }
        }

        self.token.access_token.clone()
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }
}

pub fn is_expired(token: &Token, now: u64) -> bool {
    now + EXPIRY_MARGIN >= token.obtained_at + token.expires_in
}
