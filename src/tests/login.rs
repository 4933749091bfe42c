use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_login() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;
    assert!(access_token.len() > 10);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let mut app = helper::setup_test_app().await;

    let (status_code, access_token, error) =
        helper::maybe_login(&mut app, helper::USERNAME, "notsosecret").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(None, access_token);
    assert_eq!(Some("Invalid credentials".to_string()), error);
}

#[tokio::test]
async fn test_login_unknown_username() {
    let mut app = helper::setup_test_app().await;

    let (status_code, _, error) =
        helper::maybe_login(&mut app, "nobody", helper::PASSWORD).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Invalid credentials".to_string()), error);
}

#[tokio::test]
async fn test_bad_tokens() {
    let mut app = helper::setup_test_app().await;

    // no token at all
    let (status_code, _, error) = helper::dashboard(&mut app, None, None).await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert_eq!(Some("Unauthorized".to_string()), error);

    // garbage token
    let (status_code, _, _) =
        helper::dashboard(&mut app, Some("Bearer not-a-token"), None).await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
}
