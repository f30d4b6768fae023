mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::TestServer;

/// signup A, add Bob, list; signup B, list empty; B deletes A's contact; A still has it
#[tokio::test]
async fn users_never_see_each_others_contacts() -> Result<()> {
    let server = TestServer::spawn().await?;

    let t1 = server.token_for("a@x.com", "pw1").await?;
    let c1 = server.add_contact(&t1, "Bob", "555").await?;
    assert_eq!(server.list_contacts(&t1, None).await?, vec![c1.clone()]);

    let t2 = server.token_for("b@x.com", "pw2").await?;
    assert!(server.list_contacts(&t2, None).await?.is_empty());
    assert!(server.list_contacts(&t2, Some("bob")).await?.is_empty());

    let c1_id = c1["id"].as_str().unwrap_or_default();
    let (status, body) = server.delete_contact(&t2, c1_id).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["msg"], "Deleted");

    assert_eq!(server.list_contacts(&t1, None).await?, vec![c1]);
    Ok(())
}

#[tokio::test]
async fn foreign_update_looks_like_missing_id() -> Result<()> {
    let server = TestServer::spawn().await?;

    let t1 = server.token_for("a@x.com", "pw1").await?;
    let t2 = server.token_for("b@x.com", "pw2").await?;
    let c1 = server.add_contact(&t1, "Bob", "555").await?;
    let c1_id = c1["id"].as_str().unwrap_or_default();

    let foreign = server.update_contact(&t2, c1_id, json!({ "name": "Eve" })).await?;
    let missing = server
        .update_contact(&t2, "00000000-0000-4000-8000-000000000000", json!({ "name": "Eve" }))
        .await?;
    assert_eq!(foreign, missing);
    assert_eq!(foreign.0, StatusCode::OK);
    assert!(foreign.1["data"].is_null());

    let untouched = server.list_contacts(&t1, None).await?;
    assert_eq!(untouched[0]["name"], "Bob");
    Ok(())
}
