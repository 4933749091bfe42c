use tokio::net::TcpListener;

use crate::client::ApiClient;
use crate::client::ClientError;
use crate::client::LinkApi;
use crate::client::LinkChanges;
use crate::client::NewLink;
use crate::dashboard::CreateForm;
use crate::dashboard::LinkTable;
use crate::dashboard::Modal;
use crate::dashboard::UiContext;
use crate::ordering::SortOrder;
use crate::tests::helper;

/// Serve the app on a random local port, returns its base URL
async fn serve_test_app() -> String {
    let app = helper::setup_test_app().await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{address}/")
}

async fn logged_in_client(base_url: &str) -> ApiClient {
    let mut client = ApiClient::new(base_url).unwrap();
    assert!(!client.is_authenticated());

    client
        .login(helper::USERNAME, helper::PASSWORD)
        .await
        .unwrap();
    assert!(client.is_authenticated());

    client
}

#[tokio::test]
async fn test_client_links() {
    let base_url = serve_test_app().await;
    let client = logged_in_client(&base_url).await;

    let created = client
        .create_link(&NewLink {
            url: "https://www.example.com/".to_string(),
            slug: Some("via-client".to_string()),
        })
        .await
        .unwrap();
    assert_eq!("via-client", created.slug);

    let updated = client
        .update_link(
            created.id,
            &LinkChanges {
                is_public: Some(true),
                ..LinkChanges::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.is_public);
    assert_eq!(created.slug, updated.slug);

    let dashboard = client.dashboard(SortOrder::None).await.unwrap();
    assert_eq!(helper::USERNAME, dashboard.user.username);
    assert_eq!(vec![updated], dashboard.links);

    assert_eq!("OK", client.delete_link(created.id).await.unwrap());
    assert!(client.dashboard(SortOrder::None).await.unwrap().links.is_empty());
}

#[tokio::test]
async fn test_client_rejections() {
    let base_url = serve_test_app().await;

    let mut client = ApiClient::new(&base_url).unwrap();
    let err = client
        .login(helper::USERNAME, "notsosecret")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Rejected { .. }));
    assert_eq!("Invalid credentials", err.to_string());

    let err = client.dashboard(SortOrder::None).await.unwrap_err();
    assert_eq!("Unauthorized", err.to_string());

    // a server that is not there
    let client = ApiClient::new("http://127.0.0.1:1/").unwrap();
    let err = client.delete_link(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ClientError::Request(_)));
}

#[tokio::test]
async fn test_dashboard_against_service() {
    let base_url = serve_test_app().await;
    let client = logged_in_client(&base_url).await;
    let context = UiContext::new(base_url.parse().unwrap());

    // create through the front page form
    let mut form = CreateForm::new();
    form.url = "https://www.example.com/".to_string();

    for slug in ["ab", "a", "abc"] {
        form.slug = slug.to_string();
        form.submit(&client, &context).await.unwrap();

        assert_eq!(None, form.error());
        assert_eq!(Some(format!("{base_url}{slug}").as_str()), form.result());
    }

    // taken slugs come back as an error
    form.slug = "a".to_string();
    form.submit(&client, &context).await.unwrap();
    assert_eq!(None, form.result());
    assert_eq!(Some("Slug already exists"), form.error());

    let dashboard = client.dashboard(SortOrder::None).await.unwrap();
    let mut table = LinkTable::owned(dashboard.links);

    table.sort_by_slug();
    let slugs = table
        .visible()
        .into_iter()
        .map(|record| record.slug)
        .collect::<Vec<_>>();
    assert_eq!(vec!["a", "ab", "abc"], slugs);

    // rename, then fail to take a taken slug
    let record = table.visible()[0].clone();
    assert!(table.open_edit(&record));

    let renamed = LinkChanges {
        slug: Some("aaaa".to_string()),
        ..LinkChanges::default()
    };
    assert!(table.submit_edit(&client, renamed).await);
    assert_eq!(None, table.modal());

    let record = table.visible()[0].clone();
    assert_eq!("ab", record.slug);
    table.open_edit(&record);

    let taken = LinkChanges {
        slug: Some("abc".to_string()),
        ..LinkChanges::default()
    };
    assert!(!table.submit_edit(&client, taken).await);
    assert_eq!(Some(Modal::Edit), table.modal());
    assert_eq!(Some("Slug already exists"), table.error());
    assert_eq!("ab", table.visible()[0].slug);

    assert!(table.dismiss_modal());

    // delete after confirmation
    table.open_delete(&record);
    assert!(table.confirm_delete(&client).await);
    assert_eq!(2, table.records().len());

    let dashboard = client.dashboard(SortOrder::SlugLength).await.unwrap();
    let slugs = dashboard
        .links
        .into_iter()
        .map(|record| record.slug)
        .collect::<Vec<_>>();
    assert_eq!(vec!["abc", "aaaa"], slugs);
}
