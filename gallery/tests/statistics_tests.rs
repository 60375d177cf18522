mod common;

use chrono::{Duration, Utc};
use common::*;

use http::StatusCode;

#[tokio::test]
async fn test_statistics_of_empty_gallery() {
    let setup = TestSetup::new();

    let response = setup
        .send_get_request("/Home/Statistics")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let html = response_text(response).await;
    assert!(html.contains(r#"<strong id="total-images">0</strong>"#));
    assert!(html.contains(r#"<strong id="total-disk-space">0 B</strong>"#));
    assert!(html.contains(r#"<strong id="average-image-size">0 B</strong>"#));
    assert!(html.contains(r#"<strong id="total-likes">0</strong>"#));
}

#[tokio::test]
async fn test_statistics_totals() {
    let setup = TestSetup::new();
    let now = Utc::now();
    setup.image_store.insert("a.png", 100, Some(now));
    setup.image_store.insert("b.png", 200, Some(now));
    setup
        .image_store
        .insert("c.png", 300, Some(now - Duration::days(45)));
    setup.like("a.png", 2).await;
    setup.like("c.png", 5).await;

    let response = setup
        .send_get_request("/Home/Statistics")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let html = response_text(response).await;
    assert!(html.contains(r#"<strong id="total-images">3</strong>"#));
    assert!(html.contains(r#"<strong id="total-disk-space">600 B</strong>"#));
    assert!(html.contains(r#"<strong id="average-image-size">200 B</strong>"#));
    assert!(html.contains(r#"<strong id="total-likes">7</strong>"#));

    let today = now.date_naive().format("%Y-%m-%d").to_string();
    assert!(html.contains(&format!(r#"data-date="{today}" data-count="2""#)));
    assert_eq!(html.matches(r#"class="bar""#).count(), 30);
}

#[tokio::test]
async fn test_statistics_fail_when_image_store_fails() {
    let setup = TestSetup::new();
    setup.image_store.set_failing(true);

    let response = setup
        .send_get_request("/Home/Statistics")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
