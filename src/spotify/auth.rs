use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    config, error,
    management::TokenManager,
    server::start_api_server,
    spotify::{self, SpotifyError},
    success,
    types::{PkceToken, Token},
    utils, warning,
};

const AUTH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    scope: Option<String>,
    expires_in: Option<u64>,
}

impl From<TokenResponse> for Token {
    fn from(res: TokenResponse) -> Self {
        Token {
            access_token: res.access_token,
            refresh_token: res.refresh_token.unwrap_or_default(),
            scope: res.scope.unwrap_or_default(),
            expires_in: res.expires_in.unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        }
    }
}

/// Runs the OAuth 2.0 PKCE flow with Spotify and stores the resulting token.
///
/// # Arguments
///
/// * `shared_state` - State shared with the `/callback` handler. The flow
///   puts the PKCE code verifier in here, the handler adds the token once
///   the authorization code was exchanged.
///
/// # Authentication Flow
///
/// 1. **PKCE Setup**: Generates a 128 character code verifier and its SHA256
///    code challenge
/// 2. **Server Start**: Spawns the local callback server on `SERVER_ADDRESS`
/// 3. **Browser Launch**: Opens the authorization URL with the configured
///    scope in the default browser
/// 4. **Token Wait**: Polls `shared_state` once per second for up to 60
///    seconds
/// 5. **Token Persistence**: Saves the token to the local cache
///
/// # Error Handling
///
/// - A browser that cannot be opened results in a warning with the URL to
///   open manually
/// - A timeout or a token that cannot be saved terminates the program with
///   an error
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tokio::sync::Mutex;
///
/// let shared_state = Arc::new(Mutex::new(None));
/// auth(shared_state).await;
/// ```
pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    let auth_url = format!(
        "{spotify_auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&scope={scope}",
        spotify_auth_url = &config::spotify_apiauth_url(),
        client_id = &config::spotify_client_id(),
        redirect_uri = &config::spotify_redirect_uri(),
        code_challenge = code_challenge,
        scope = &config::spotify_scope().replace(' ', "%20")
    );

    // The verifier has to be in place before the callback can be hit.
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            token: None,
        });
    }

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    match wait_for_token(shared_state).await {
        Some(t) => {
            let token_manager = TokenManager::new(t);
            if let Err(e) = token_manager.persist().await {
                error!("Failed to save token to cache: {}", e);
            }

            success!("Authentication successful!");
        }
        None => {
            error!("Authentication failed or timed out.");
        }
    }
}

/// Polls `shared_state` once per second until the callback handler has
/// stored a token, giving up after [`AUTH_TIMEOUT`].
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < AUTH_TIMEOUT {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges a refresh token for a new access token.
///
/// # Arguments
///
/// * `refresh_token` - Refresh token of the cached token
///
/// # Returns
///
/// The new [`Token`], stamped with the current time as `obtained_at`.
/// Spotify does not always rotate the refresh token, in which case the
/// returned `refresh_token` is empty and the caller keeps the old one.
///
/// # Errors
///
/// Returns a [`SpotifyError`] when the request fails, the refresh token was
/// revoked, or the response cannot be parsed.
///
/// # Example
///
/// ```
/// let token = refresh_token("AQC...refresh_token").await?;
/// println!("New access token expires in {} seconds", token.expires_in);
/// ```
pub async fn refresh_token(refresh_token: &str) -> Result<Token, SpotifyError> {
    let client_id = config::spotify_client_id();

    let client = Client::new();
    let request = client.post(config::spotify_apitoken_url()).form(&[
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", client_id.as_str()),
    ]);

    let res = spotify::send(request).await?;
    let json = res.json::<TokenResponse>().await?;
    Ok(json.into())
}

/// Exchanges the authorization code from the OAuth callback, together with
/// the PKCE verifier generated at the start of the flow, for a token.
///
/// # Arguments
///
/// * `code` - Authorization code from the `code` query parameter
/// * `verifier` - PKCE code verifier whose challenge was sent with the
///   authorization request
///
/// # Errors
///
/// Returns a [`SpotifyError`] when the request fails or Spotify rejects the
/// code, for example because it was already used or the verifier does not
/// match.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Token, SpotifyError> {
    let client_id = config::spotify_client_id();
    let redirect_uri = config::spotify_redirect_uri();

    let client = Client::new();
    let request = client.post(config::spotify_apitoken_url()).form(&[
        ("grant_type", "authorization_code"),
        ("client_id", client_id.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("redirect_uri", redirect_uri.as_str()),
    ]);

    let res = spotify::send(request).await?;
    let json = res.json::<TokenResponse>().await?;
    Ok(json.into())
}
