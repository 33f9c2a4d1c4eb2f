use mixtape::api::{code_verifier, store_token};
use mixtape::types::{PkceToken, Token};
use tokio::sync::Mutex;

// Helper function to create a test token
fn create_test_token() -> Token {
    Token {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        scope: "playlist-read-private".to_string(),
        expires_in: 3600,
        obtained_at: 1_000,
    }
}

fn pending_state() -> Mutex<Option<PkceToken>> {
    Mutex::new(Some(PkceToken {
        code_verifier: "verifier".to_string(),
        token: None,
    }))
}

#[tokio::test]
async fn test_code_verifier_releases_lock() {
    let state = pending_state();

    assert_eq!(code_verifier(&state).await.as_deref(), Some("verifier"));

    // The token poller must be able to lock the state during the exchange
    let guard = state.try_lock();
    assert!(guard.is_ok());
    assert!(guard.unwrap().as_ref().unwrap().token.is_none());
}

#[tokio::test]
async fn test_code_verifier_missing_state() {
    let state: Mutex<Option<PkceToken>> = Mutex::new(None);
    assert!(code_verifier(&state).await.is_none());
}

#[tokio::test]
async fn test_store_token() {
    let state = pending_state();

    assert!(store_token(&state, create_test_token()).await);

    let guard = state.try_lock().unwrap();
    let pkce = guard.as_ref().unwrap();
    assert_eq!(pkce.code_verifier, "verifier");
    assert_eq!(pkce.token.as_ref().unwrap().access_token, "access");
}

#[tokio::test]
async fn test_store_token_missing_state() {
    let state: Mutex<Option<PkceToken>> = Mutex::new(None);

    assert!(!store_token(&state, create_test_token()).await);
    assert!(state.try_lock().unwrap().is_none());
}
