mod helpers;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::helpers::{call, make_test_app};

    const ALICE: i64 = 1;
    const BOB: i64 = 2;
    const CAROL: i64 = 3;

    async fn create_room(app: &axum::Router, user: i64) -> String {
        let (status, json) = call(app, "POST", "/api/rooms/create", Some(user), None).await;
        assert_eq!(status, StatusCode::CREATED);
        json["data"]["code"].as_str().unwrap().to_string()
    }

    async fn join(app: &axum::Router, user: i64, code: &str) -> (StatusCode, Value) {
        call(app, "POST", "/api/rooms/join", Some(user), Some(json!({ "code": code }))).await
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _) = make_test_app().await;
        let (status, json) = call(&app, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], "OK");
    }

    #[tokio::test]
    async fn room_routes_require_a_token() {
        let (app, _) = make_test_app().await;
        let (status, json) = call(&app, "POST", "/api/rooms/create", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn create_room_makes_creator_host_and_only_member() {
        let (app, _) = make_test_app().await;
        let (status, json) = call(&app, "POST", "/api/rooms/create", Some(ALICE), None).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Room created successfully");
        let code = json["data"]["code"].as_str().unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_eq!(json["data"]["createdBy"], ALICE);
        assert_eq!(json["data"]["participants"], json!([ALICE]));
    }

    #[tokio::test]
    async fn join_accepts_lowercase_codes_and_is_idempotent() {
        let (app, _) = make_test_app().await;
        let code = create_room(&app, ALICE).await;

        let (status, json) = join(&app, BOB, &format!("  {}  ", code.to_lowercase())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Joined room successfully");
        assert_eq!(json["data"]["code"], code.as_str());
        assert_eq!(json["data"]["participants"], json!([ALICE, BOB]));

        let (status, json) = join(&app, BOB, &code).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "You are already in this room");
        assert_eq!(json["data"]["participants"], json!([ALICE, BOB]));
    }

    #[tokio::test]
    async fn join_rejects_blank_and_unknown_codes() {
        let (app, _) = make_test_app().await;

        let (status, json) = join(&app, BOB, "   ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Room code is required");

        let (status, _) = call(&app, "POST", "/api/rooms/join", Some(BOB), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = join(&app, BOB, "NOPE00").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Room not found");
    }

    #[tokio::test]
    async fn host_leaving_hands_over_to_earliest_member() {
        let (app, _) = make_test_app().await;
        let code = create_room(&app, ALICE).await;
        join(&app, BOB, &code).await;
        join(&app, CAROL, &code).await;

        let (status, json) =
            call(&app, "POST", &format!("/api/rooms/leave/{code}"), Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["newHost"], BOB);

        let (_, room) = call(&app, "GET", &format!("/api/rooms/{code}"), Some(BOB), None).await;
        assert_eq!(room["data"]["hostId"], BOB);
        assert_eq!(room["data"]["participants"], json!([BOB, CAROL]));

        let (status, json) =
            call(&app, "POST", &format!("/api/rooms/leave/{code}"), Some(CAROL), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["newHost"], Value::Null);
    }

    #[tokio::test]
    async fn leave_by_non_member_is_rejected() {
        let (app, _) = make_test_app().await;
        let code = create_room(&app, ALICE).await;

        let (status, json) =
            call(&app, "POST", &format!("/api/rooms/leave/{code}"), Some(BOB), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);

        let (status, _) =
            call(&app, "POST", "/api/rooms/leave/ZZZZZZ", Some(BOB), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn only_the_host_starts_and_only_once() {
        let (app, _) = make_test_app().await;
        let code = create_room(&app, ALICE).await;
        join(&app, BOB, &code).await;
        let start = format!("/api/rooms/start/{code}");

        let (status, _) = call(&app, "POST", &start, Some(BOB), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, json) = call(&app, "POST", &start, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["assignedProblemId"], 1);

        let (status, json) = call(&app, "POST", &start, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Battle already started");

        let (status, _) = call(&app, "POST", "/api/rooms/start/ZZZZZZ", Some(ALICE), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn joiner_of_an_emptied_room_becomes_host_and_can_start() {
        let (app, _) = make_test_app().await;
        let code = create_room(&app, ALICE).await;
        let (status, _) =
            call(&app, "POST", &format!("/api/rooms/leave/{code}"), Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = join(&app, BOB, &code).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["participants"], json!([BOB]));

        let (_, room) = call(&app, "GET", &format!("/api/rooms/{code}"), Some(BOB), None).await;
        assert_eq!(room["data"]["hostId"], BOB);

        let (status, _) =
            call(&app, "POST", &format!("/api/rooms/start/{code}"), Some(BOB), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn handover_then_new_host_starts_with_stable_problem() {
        let (app, _) = make_test_app().await;
        let code = create_room(&app, ALICE).await;
        join(&app, BOB, &code).await;
        call(&app, "POST", &format!("/api/rooms/leave/{code}"), Some(ALICE), None).await;

        let (status, started) =
            call(&app, "POST", &format!("/api/rooms/start/{code}"), Some(BOB), None).await;
        assert_eq!(status, StatusCode::OK);
        let problem_id = started["data"]["assignedProblemId"].clone();

        for _ in 0..2 {
            let (status, room) =
                call(&app, "GET", &format!("/api/rooms/{code}"), Some(BOB), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(room["data"]["battleStarted"], true);
            assert_eq!(room["data"]["assignedProblemId"], problem_id);
            assert!(room["data"]["battleStartedAt"].is_string());
            assert!(room["data"]["battleEndsAt"].is_string());
        }
    }

    #[tokio::test]
    async fn get_room_reports_scores_and_404s_unknown_codes() {
        let (app, _) = make_test_app().await;
        let code = create_room(&app, ALICE).await;

        let (status, room) = call(&app, "GET", &format!("/api/rooms/{code}"), Some(CAROL), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(room["data"]["battleStarted"], false);
        assert_eq!(room["data"]["assignedProblemId"], Value::Null);
        assert_eq!(room["data"]["members"][0]["userId"], ALICE);
        assert_eq!(room["data"]["members"][0]["score"], 0);

        let (status, _) = call(&app, "GET", "/api/rooms/ZZZZZZ", Some(CAROL), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn my_rooms_lists_hosted_and_joined_rooms() {
        let (app, _) = make_test_app().await;
        let hosted = create_room(&app, ALICE).await;
        let joined = create_room(&app, BOB).await;
        let _other = create_room(&app, CAROL).await;
        join(&app, ALICE, &joined).await;

        let (status, json) = call(&app, "GET", "/api/rooms/user/my-rooms", Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        let rooms = json["data"].as_array().unwrap();
        let codes: Vec<&str> = rooms.iter().map(|r| r["code"].as_str().unwrap()).collect();
        assert_eq!(codes, vec![hosted.as_str(), joined.as_str()]);
        assert_eq!(rooms[1]["createdBy"], BOB);
        assert_eq!(rooms[1]["participantCount"], 2);
    }

    #[tokio::test]
    async fn scoreboard_starts_at_zero_in_join_order() {
        let (app, _) = make_test_app().await;
        let code = create_room(&app, ALICE).await;
        join(&app, BOB, &code).await;

        let (status, json) =
            call(&app, "GET", &format!("/api/rooms/{code}/scoreboard"), Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["data"],
            json!([
                { "rank": 1, "userId": ALICE, "score": 0 },
                { "rank": 2, "userId": BOB, "score": 0 }
            ])
        );
    }
}
