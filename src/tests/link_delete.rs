use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_link_delete() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let url = "https://www.example.com/";
    let link = helper::create_link(&mut app, &access_token, "short-lived", url).await;
    helper::create_link(&mut app, &access_token, "long-lived", url).await;

    // a delete answers with a literal OK
    let (status_code, body) =
        helper::maybe_delete_link(&mut app, Some(access_token.as_str()), &link.id).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("OK", body);

    let (status_code, _, _) = helper::root(&mut app, "short-lived").await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);

    assert_eq!(
        vec!["long-lived".to_string()],
        helper::dashboard_slugs(&mut app, &access_token, "none").await
    );

    // the slug is free again
    let (status_code, _, _) =
        helper::maybe_create_link(&mut app, Some(access_token.as_str()), Some("short-lived"), url)
            .await;
    assert_eq!(StatusCode::CREATED, status_code);

    // gone is gone
    let (status_code, body) =
        helper::maybe_delete_link(&mut app, Some(access_token.as_str()), &link.id).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!("Link not found", body);
}

#[tokio::test]
async fn test_link_delete_refused() {
    let mut app = helper::setup_test_app().await;

    let access_token = helper::login(&mut app).await;

    let url = "https://www.example.com/";
    let link = helper::create_link(&mut app, &access_token, "kept", url).await;

    // no session
    let (status_code, body) = helper::maybe_delete_link(&mut app, None, &link.id).await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert_ne!("OK", body);

    // not the owner
    let (_, other_access_token) = helper::sign_up_and_login(&mut app, "someone-else").await;
    let (status_code, body) =
        helper::maybe_delete_link(&mut app, Some(other_access_token.as_str()), &link.id).await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert_eq!("Unauthorized", body);

    // invalid identifier
    let request_id = "not-a-uuid";
    let request = axum::http::Request::builder()
        .method(axum::http::Method::DELETE)
        .uri(format!("/api/{request_id}"))
        .header(axum::http::header::AUTHORIZATION, &access_token)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::Service::call(&mut app, request).await.unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    let (status_code, _, _) = helper::root(&mut app, "kept").await;
    assert_eq!(StatusCode::TEMPORARY_REDIRECT, status_code);
}
