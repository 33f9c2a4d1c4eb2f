use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{
    spotify::auth::exchange_code_pkce,
    types::{PkceToken, Token},
    warning,
};

/// Handles the redirect from Spotify's authorization server.
///
/// The shared state is only locked to read the verifier and to store the
/// token, never across the code exchange.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<PkceToken>>>>,
) -> Html<&'static str> {
    if let Some(error) = params.get("error") {
        warning!("Authorization was denied: {}", error);
        return Html("<h4>Authorization denied.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let Some(verifier) = code_verifier(&shared_state).await else {
        return Html("<h4>Missing PKCE code verifier.</h4>");
    };

    match exchange_code_pkce(code, &verifier).await {
        Ok(token) => {
            if !store_token(&shared_state, token).await {
                return Html("<h4>Missing PKCE code verifier.</h4>");
            }
            Html("<h2>Authentication successful.</h2><p>You can close this browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}

/// Copies the PKCE verifier out of the shared state.
pub async fn code_verifier(shared_state: &Mutex<Option<PkceToken>>) -> Option<String> {
    let state = shared_state.lock().await;
    state.as_ref().map(|pkce| pkce.code_verifier.clone())
}

/// Stores `token` next to the verifier. Returns `false` when the auth flow
/// state is gone.
pub async fn store_token(shared_state: &Mutex<Option<PkceToken>>, token: Token) -> bool {
    let mut state = shared_state.lock().await;
    match state.as_mut() {
        Some(pkce) => {
            pkce.token = Some(token);
            true
        }
        None => false,
    }
}
