// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated profile endpoint tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

use cliptube_api::config::Config;
use cliptube_api::db::UserStore;
use cliptube_api::middleware::auth::Principal;
use cliptube_api::models::User;

mod common;

fn ann_user() -> User {
    User {
        google_sub: "g1".to_string(),
        username: "a".to_string(),
        first_name: "Ann".to_string(),
        last_name: "Lee".to_string(),
        handle: "@AnnLee0042".to_string(),
        email: "a@x.com".to_string(),
        verified: true,
        active: true,
        profile_picture: None,
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

fn ann_principal() -> Principal {
    Principal {
        google_sub: "g1".to_string(),
        email: "a@x.com".to_string(),
        handle: "@AnnLee0042".to_string(),
    }
}

#[tokio::test]
async fn test_me_requires_auth() {
    let (app, _, _) = common::create_test_app_with_config(Config::test_default());

    let response = app
        .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_the_stored_profile() {
    let (app, state, db) = common::create_test_app_with_config(Config::test_default());
    db.create(ann_user()).await.unwrap();

    let access = state.token_issuer.issue_access_token(&ann_principal()).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::COOKIE, format!("access_token={access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["google_sub"], "g1");
    assert_eq!(body["username"], "a");
    assert_eq!(body["handle"], "@AnnLee0042");
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["verified"], true);
}

#[tokio::test]
async fn test_me_with_no_record_is_unauthorized() {
    let (app, state, _) = common::create_test_app_with_config(Config::test_default());

    // Valid token, but nothing in the store behind it
    let access = state.token_issuer.issue_access_token(&ann_principal()).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::COOKIE, format!("access_token={access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
