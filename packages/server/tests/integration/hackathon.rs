use serde_json::json;

use crate::common::{TestApp, active_window, future_window, past_window, routes};

fn hackathon_body(title: &str, start: &str, end: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": "Build something in a weekend.",
        "prize": 500,
        "start_datetime": start,
        "end_datetime": end,
        "image": "hackathons/cover.png",
    })
}

mod hackathon_creation {
    use super::*;

    #[tokio::test]
    async fn host_can_create_a_hackathon() {
        let app = TestApp::spawn().await;
        let token = app.create_host("host@example.com").await;
        let (start, end) = future_window();

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &hackathon_body("Spring Jam", &start, &end),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["title"], "Spring Jam");
        assert_eq!(res.body["prize"], 500);
        assert_eq!(res.body["is_active"], false);
        assert_eq!(res.body["host"]["username"], "host");
        assert!(res.body["winner"].is_null());
        assert!(res.body["description"].is_string());
    }

    #[tokio::test]
    async fn admin_can_create_a_hackathon() {
        let app = TestApp::spawn().await;
        let token = app.create_admin("admin@example.com").await;
        let (start, end) = future_window();

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &hackathon_body("Admin Jam", &start, &end),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn ordinary_user_cannot_create_a_hackathon() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("user@example.com", "pass1234")
            .await;
        let (start, end) = future_window();

        let res = app
            .post_with_token(routes::HACKATHONS, &hackathon_body("Nope", &start, &end), &token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn anonymous_caller_cannot_create_a_hackathon() {
        let app = TestApp::spawn().await;
        let (start, end) = future_window();

        let res = app
            .post_without_token(routes::HACKATHONS, &hackathon_body("Nope", &start, &end))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn end_before_start_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_host("host@example.com").await;
        let (start, end) = future_window();

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &hackathon_body("Backwards", &end, &start),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(
            res.body["message"],
            "end_datetime: End datetime must be after start datetime."
        );
    }

    #[tokio::test]
    async fn equal_start_and_end_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_host("host@example.com").await;
        let (start, _) = future_window();

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &hackathon_body("Instant", &start, &start),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn negative_prize_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_host("host@example.com").await;
        let (start, end) = future_window();
        let mut body = hackathon_body("Broke", &start, &end);
        body["prize"] = json!(-1);

        let res = app.post_with_token(routes::HACKATHONS, &body, &token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_host("host@example.com").await;
        let (start, end) = future_window();
        let mut body = hackathon_body("Lost", &start, &end);
        body["category"] = json!(uuid::Uuid::now_v7());

        let res = app.post_with_token(routes::HACKATHONS, &body, &token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "category: Category not found.");
    }
}

mod hackathon_reading {
    use super::*;

    #[tokio::test]
    async fn anyone_can_read_a_hackathon() {
        let app = TestApp::spawn().await;
        let token = app.create_host("host@example.com").await;
        let id = app.create_hackathon(&token, "Open Jam", active_window()).await;

        let res = app.get_without_token(&routes::hackathon(&id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], id.as_str());
        assert_eq!(res.body["is_active"], true);
    }

    #[tokio::test]
    async fn unknown_hackathon_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .get_without_token(&routes::hackathon(&uuid::Uuid::now_v7().to_string()))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::hackathon("not-a-uuid")).await;

        assert_eq!(res.status, 404);
    }
}

mod hackathon_listing {
    use super::*;

    async fn titles(app: &TestApp, query: &str) -> Vec<String> {
        let res = app
            .get_without_token(&format!("{}{}", routes::HACKATHONS, query))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| h["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn lists_are_ordered_by_start_and_paginated() {
        let app = TestApp::spawn().await;
        let token = app.create_host("host@example.com").await;
        app.create_hackathon(&token, "Future", future_window()).await;
        app.create_hackathon(&token, "Past", past_window()).await;
        app.create_hackathon(&token, "Active", active_window()).await;

        assert_eq!(titles(&app, "").await, vec!["Past", "Active", "Future"]);
        assert_eq!(
            titles(&app, "?ordering=-start_datetime").await,
            vec!["Future", "Active", "Past"]
        );

        let res = app
            .get_without_token(&format!("{}?page=2&page_size=2", routes::HACKATHONS))
            .await;
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["total_pages"], 2);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn status_filter_selects_active_and_past() {
        let app = TestApp::spawn().await;
        let token = app.create_host("host@example.com").await;
        app.create_hackathon(&token, "Future", future_window()).await;
        app.create_hackathon(&token, "Past", past_window()).await;
        app.create_hackathon(&token, "Active", active_window()).await;

        assert_eq!(titles(&app, "?hackathon_status=active").await, vec!["Active"]);
        assert_eq!(titles(&app, "?hackathon_status=past").await, vec!["Past"]);
        assert_eq!(titles(&app, "?hackathon_status=whatever").await.len(), 3);
    }

    #[tokio::test]
    async fn search_matches_title_and_description_case_insensitively() {
        let app = TestApp::spawn().await;
        let token = app.create_host("host@example.com").await;
        app.create_hackathon(&token, "Rust Rally", future_window()).await;
        app.create_hackathon(&token, "Go Gala", future_window()).await;

        assert_eq!(titles(&app, "?search=rust").await, vec!["Rust Rally"]);
        assert_eq!(titles(&app, "?search=WEEKEND").await.len(), 2);
        assert!(titles(&app, "?search=100%25").await.is_empty());
    }

    #[tokio::test]
    async fn category_filter_uses_the_slug() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin@example.com").await;
        let category = app
            .post_with_token(routes::CATEGORIES, &json!({"title": "Machine Learning"}), &admin)
            .await;
        assert_eq!(category.status, 201, "{}", category.text);

        let (start, end) = future_window();
        let mut body = hackathon_body("ML Jam", &start, &end);
        body["category"] = category.body["id"].clone();
        let res = app.post_with_token(routes::HACKATHONS, &body, &admin).await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["category"]["slug"], "machine-learning");
        app.create_hackathon(&admin, "Other Jam", future_window()).await;

        assert_eq!(
            titles(&app, "?category=machine-learning").await,
            vec!["ML Jam"]
        );
    }

    #[tokio::test]
    async fn invalid_ordering_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .get_without_token(&format!("{}?ordering=title", routes::HACKATHONS))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn winner_filter_matches_the_winners_username() {
        let app = TestApp::spawn().await;
        let host = app.create_host("host@example.com").await;
        let user = app
            .create_authenticated_user("winner@example.com", "pass1234")
            .await;
        let won = app.create_hackathon(&host, "Won", past_window()).await;
        app.create_hackathon(&host, "Unclaimed", past_window()).await;
        let participant = app.join_hackathon(&won, &host, &user).await;

        let res = app
            .patch_with_token(&routes::hackathon(&won), &json!({"winner": participant}), &host)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        assert_eq!(titles(&app, "?winner=winner").await, vec!["Won"]);
        assert!(titles(&app, "?winner=nobody").await.is_empty());
    }
}

mod hackathon_update {
    use super::*;

    #[tokio::test]
    async fn host_can_update_their_hackathon() {
        let app = TestApp::spawn().await;
        let token = app.create_host("host@example.com").await;
        let id = app.create_hackathon(&token, "Draft", future_window()).await;

        let res = app
            .patch_with_token(
                &routes::hackathon(&id),
                &json!({"title": "Final", "prize": 2000}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "Final");
        assert_eq!(res.body["prize"], 2000);
    }

    #[tokio::test]
    async fn other_host_cannot_update_the_hackathon() {
        let app = TestApp::spawn().await;
        let owner = app.create_host("owner@example.com").await;
        let other = app.create_host("other@example.com").await;
        let id = app.create_hackathon(&owner, "Mine", future_window()).await;

        let res = app
            .patch_with_token(&routes::hackathon(&id), &json!({"title": "Yours"}), &other)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn ordinary_user_cannot_update_the_hackathon() {
        let app = TestApp::spawn().await;
        let owner = app.create_host("owner@example.com").await;
        let user = app
            .create_authenticated_user("user@example.com", "pass1234")
            .await;
        let id = app.create_hackathon(&owner, "Mine", future_window()).await;

        let res = app
            .patch_with_token(&routes::hackathon(&id), &json!({"title": "Yours"}), &user)
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn anonymous_caller_cannot_update_the_hackathon() {
        let app = TestApp::spawn().await;
        let owner = app.create_host("owner@example.com").await;
        let id = app.create_hackathon(&owner, "Mine", future_window()).await;

        let res = app
            .patch_without_token(&routes::hackathon(&id), &json!({"title": "Yours"}))
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn admin_can_update_any_hackathon() {
        let app = TestApp::spawn().await;
        let owner = app.create_host("owner@example.com").await;
        let admin = app.create_admin("admin@example.com").await;
        let id = app.create_hackathon(&owner, "Mine", future_window()).await;

        let res = app
            .patch_with_token(&routes::hackathon(&id), &json!({"title": "Moderated"}), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "Moderated");
    }

    #[tokio::test]
    async fn empty_patch_returns_the_hackathon_unchanged() {
        let app = TestApp::spawn().await;
        let token = app.create_host("host@example.com").await;
        let id = app.create_hackathon(&token, "Same", future_window()).await;

        let res = app
            .patch_with_token(&routes::hackathon(&id), &json!({}), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Same");
    }

    #[tokio::test]
    async fn partial_window_update_is_checked_against_stored_values() {
        let app = TestApp::spawn().await;
        let token = app.create_host("host@example.com").await;
        let id = app.create_hackathon(&token, "Window", future_window()).await;
        let (_, past_end) = past_window();

        let res = app
            .patch_with_token(
                &routes::hackathon(&id),
                &json!({"end_datetime": past_end}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(
            res.body["message"],
            "end_datetime: End datetime must be after start datetime."
        );
    }
}

mod winner_assignment {
    use super::*;

    #[tokio::test]
    async fn winner_cannot_be_set_while_hackathon_is_active() {
        let app = TestApp::spawn().await;
        let host = app.create_host("host@example.com").await;
        let user = app
            .create_authenticated_user("user@example.com", "pass1234")
            .await;
        let id = app.create_hackathon(&host, "Live", active_window()).await;
        let participant = app.join_hackathon(&id, &host, &user).await;

        let res = app
            .patch_with_token(&routes::hackathon(&id), &json!({"winner": participant}), &host)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(
            res.body["message"],
            "winner: Cannot set winner while hackathon is active."
        );

        let after = app.get_without_token(&routes::hackathon(&id)).await;
        assert!(after.body["winner"].is_null());
    }

    #[tokio::test]
    async fn winner_can_be_set_once_the_hackathon_has_ended() {
        let app = TestApp::spawn().await;
        let host = app.create_host("host@example.com").await;
        let user = app
            .create_authenticated_user("user@example.com", "pass1234")
            .await;
        let id = app.create_hackathon(&host, "Done", past_window()).await;
        let participant = app.join_hackathon(&id, &host, &user).await;

        let res = app
            .patch_with_token(&routes::hackathon(&id), &json!({"winner": participant}), &host)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["winner"]["participant_id"], participant.as_str());
        assert_eq!(res.body["winner"]["username"], "user");
    }

    #[tokio::test]
    async fn winner_can_be_set_before_the_hackathon_starts() {
        let app = TestApp::spawn().await;
        let host = app.create_host("host@example.com").await;
        let user = app
            .create_authenticated_user("user@example.com", "pass1234")
            .await;
        let id = app.create_hackathon(&host, "Soon", future_window()).await;
        let participant = app.join_hackathon(&id, &host, &user).await;

        let res = app
            .patch_with_token(&routes::hackathon(&id), &json!({"winner": participant}), &host)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn winner_must_participate_in_the_same_hackathon() {
        let app = TestApp::spawn().await;
        let host = app.create_host("host@example.com").await;
        let user = app
            .create_authenticated_user("user@example.com", "pass1234")
            .await;
        let first = app.create_hackathon(&host, "First", past_window()).await;
        let second = app.create_hackathon(&host, "Second", past_window()).await;
        let foreign = app.join_hackathon(&second, &host, &user).await;

        let res = app
            .patch_with_token(&routes::hackathon(&first), &json!({"winner": foreign}), &host)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(
            res.body["message"],
            "winner: Selected participant is not a participant of this hackathon."
        );
    }

    #[tokio::test]
    async fn winner_can_be_cleared_with_null() {
        let app = TestApp::spawn().await;
        let host = app.create_host("host@example.com").await;
        let user = app
            .create_authenticated_user("user@example.com", "pass1234")
            .await;
        let id = app.create_hackathon(&host, "Done", past_window()).await;
        let participant = app.join_hackathon(&id, &host, &user).await;
        let set = app
            .patch_with_token(&routes::hackathon(&id), &json!({"winner": participant}), &host)
            .await;
        assert_eq!(set.status, 200, "{}", set.text);

        let res = app
            .patch_with_token(&routes::hackathon(&id), &json!({"winner": null}), &host)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["winner"].is_null());
    }
}

mod hackathon_deletion {
    use super::*;

    #[tokio::test]
    async fn host_can_delete_and_participation_goes_with_it() {
        let app = TestApp::spawn().await;
        let host = app.create_host("host@example.com").await;
        let user = app
            .create_authenticated_user("user@example.com", "pass1234")
            .await;
        let id = app.create_hackathon(&host, "Gone", future_window()).await;
        app.join_hackathon(&id, &host, &user).await;

        let res = app.delete_with_token(&routes::hackathon(&id), &host).await;
        assert_eq!(res.status, 204);

        let res = app.get_without_token(&routes::hackathon(&id)).await;
        assert_eq!(res.status, 404);

        let mine = app.get_with_token(routes::MY_PARTICIPATIONS, &user).await;
        assert_eq!(mine.body["pagination"]["total"], 0);
        let requests = app.get_with_token(routes::MY_REQUESTS, &user).await;
        assert_eq!(requests.body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn other_user_cannot_delete_the_hackathon() {
        let app = TestApp::spawn().await;
        let host = app.create_host("host@example.com").await;
        let other = app.create_host("other@example.com").await;
        let id = app.create_hackathon(&host, "Stays", future_window()).await;

        let res = app.delete_with_token(&routes::hackathon(&id), &other).await;

        assert_eq!(res.status, 403);
    }
}

mod user_hackathons {
    use super::*;

    #[tokio::test]
    async fn lists_hackathons_hosted_by_a_user() {
        let app = TestApp::spawn().await;
        let host = app.create_host("host@example.com").await;
        let other = app.create_host("other@example.com").await;
        app.create_hackathon(&host, "Mine", future_window()).await;
        app.create_hackathon(&other, "Theirs", future_window()).await;
        let host_id = app.user_id(&host).await;

        let res = app
            .get_without_token(&routes::user_hackathons(&host_id))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["pagination"]["total"], 1);
        assert_eq!(res.body["data"][0]["title"], "Mine");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .get_without_token(&routes::user_hackathons(&uuid::Uuid::now_v7().to_string()))
            .await;

        assert_eq!(res.status, 404);
    }
}
