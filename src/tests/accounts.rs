use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_sign_up() {
    let mut app = helper::setup_test_app().await;

    // generated password, shown once
    let (status_code, account, _) = helper::maybe_sign_up(&mut app, "  newbie  ", None).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let account = account.unwrap();
    assert_eq!("newbie", account.username);
    assert_eq!(None, account.name);
    assert!(!account.is_public);

    let password = account.password.unwrap();
    helper::login_with_password(&mut app, "newbie", &password).await;

    // chosen password, never shown
    let (status_code, account, _) =
        helper::maybe_sign_up(&mut app, "chooser", Some("chosen-secret")).await;
    assert_eq!(StatusCode::CREATED, status_code);
    assert_eq!(None, account.unwrap().password);
    helper::login_with_password(&mut app, "chooser", "chosen-secret").await;
}

#[tokio::test]
async fn test_sign_up_refused() {
    let mut app = helper::setup_test_app().await;

    let (status_code, _, error) = helper::maybe_sign_up(&mut app, helper::USERNAME, None).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Account already exists".to_string()), error);

    let (status_code, _, error) = helper::maybe_sign_up(&mut app, "   ", None).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Username can not be empty".to_string()), error);
}

#[tokio::test]
async fn test_update_account() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let (status_code, account, _) =
        helper::maybe_update_account(&mut app, &access_token, " Some Name ", Some(true)).await;
    assert_eq!(StatusCode::OK, status_code);
    let account = account.unwrap();
    assert_eq!(Some("Some Name".to_string()), account.name);
    assert!(account.is_public);

    // visibility is left alone when not provided
    let (status_code, account, _) =
        helper::maybe_update_account(&mut app, &access_token, "Other Name", None).await;
    assert_eq!(StatusCode::OK, status_code);
    let account = account.unwrap();
    assert_eq!(Some("Other Name".to_string()), account.name);
    assert!(account.is_public);

    let (_, dashboard, _) = helper::dashboard(&mut app, Some(access_token.as_str()), None).await;
    let (account, _) = dashboard.unwrap();
    assert_eq!(Some("Other Name".to_string()), account.name);
}

#[tokio::test]
async fn test_update_account_name_length() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let (status_code, _, error) =
        helper::maybe_update_account(&mut app, &access_token, "a", None).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Name must be at least 2 characters".to_string()), error);

    // whitespace does not count
    let (status_code, _, _) =
        helper::maybe_update_account(&mut app, &access_token, "  a  ", None).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);

    let (status_code, _, error) =
        helper::maybe_update_account(&mut app, &access_token, &"a".repeat(256), None).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        Some("Name can not be longer than 255 characters".to_string()),
        error
    );

    let (status_code, _, _) =
        helper::maybe_update_account(&mut app, &access_token, &"a".repeat(255), None).await;
    assert_eq!(StatusCode::OK, status_code);
}

#[tokio::test]
async fn test_delete_account() {
    let mut app = helper::setup_test_app().await;

    let (_, access_token) = helper::sign_up_and_login(&mut app, "leaving").await;

    let url = "https://www.example.com/";
    helper::create_link(&mut app, &access_token, "leaving-soon", url).await;

    let (status_code, body) = helper::maybe_delete_account(&mut app, &access_token).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("OK", body);

    // links are gone with the account
    let (status_code, _, _) = helper::root(&mut app, "leaving-soon").await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);

    // and so is the session
    let (status_code, _, _) = helper::dashboard(&mut app, Some(access_token.as_str()), None).await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);

    // other accounts are still around
    helper::login(&mut app).await;
}
