mod helpers;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use axum::{Router, http::StatusCode};
    use serde_json::json;

    use crate::helpers::{call, connect_ws, make_test_app, next_event, spawn_server};

    const HOST: i64 = 21;
    const PLAYER: i64 = 22;
    const OUTSIDER: i64 = 23;

    async fn create_room(app: &Router) -> String {
        let (_, created) = call(app, "POST", "/api/rooms/create", Some(HOST), None).await;
        created["data"]["code"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn room_topic_streams_membership_and_battle_events() {
        let (app, _) = make_test_app().await;
        let addr = spawn_server(app.clone()).await;
        let code = create_room(&app).await;

        let mut ws = connect_ws(&addr, &format!("rooms/{code}"), HOST).await.unwrap();

        call(&app, "POST", "/api/rooms/join", Some(PLAYER), Some(json!({ "code": code }))).await;
        let joined = next_event(&mut ws).await;
        assert_eq!(joined["event"], "room.updated");
        assert_eq!(joined["topic"], format!("room:{code}"));
        assert_eq!(joined["payload"]["participants"], json!([HOST, PLAYER]));

        let (status, _) =
            call(&app, "POST", &format!("/api/rooms/start/{code}"), Some(HOST), None).await;
        assert_eq!(status, StatusCode::OK);

        let started = next_event(&mut ws).await;
        assert_eq!(started["event"], "battle.started");
        assert_eq!(started["payload"], json!({ "assignedProblemId": 1 }));

        let updated = next_event(&mut ws).await;
        assert_eq!(updated["event"], "room.updated");
        assert_eq!(updated["payload"]["battleStarted"], true);
    }

    #[tokio::test]
    async fn host_transfer_is_announced() {
        let (app, _) = make_test_app().await;
        let addr = spawn_server(app.clone()).await;
        let code = create_room(&app).await;
        call(&app, "POST", "/api/rooms/join", Some(PLAYER), Some(json!({ "code": code }))).await;

        let mut ws = connect_ws(&addr, &format!("rooms/{code}"), PLAYER).await.unwrap();
        call(&app, "POST", &format!("/api/rooms/leave/{code}"), Some(HOST), None).await;

        let updated = next_event(&mut ws).await;
        assert_eq!(updated["event"], "room.updated");
        assert_eq!(updated["payload"]["hostId"], PLAYER);

        let transferred = next_event(&mut ws).await;
        assert_eq!(transferred["event"], "room.host_transferred");
        assert_eq!(transferred["payload"], json!({ "newHost": PLAYER }));
    }

    #[tokio::test]
    async fn submission_progress_is_private_and_ordered() {
        let (app, _) = make_test_app().await;
        let addr = spawn_server(app.clone()).await;
        let code = create_room(&app).await;
        call(&app, "POST", &format!("/api/rooms/start/{code}"), Some(HOST), None).await;

        let mut ws = connect_ws(&addr, &format!("rooms/{code}/submissions"), HOST)
            .await
            .unwrap();

        let solution = "def solution(n):\n    return n * 2\n";
        let (status, _) = call(
            &app,
            "POST",
            &format!("/api/rooms/{code}/submit"),
            Some(HOST),
            Some(json!({ "code": solution })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Three pending entries, then running/passed per case, then the verdict.
        for i in 0..3 {
            let ev = next_event(&mut ws).await;
            assert_eq!(ev["event"], "submission.entry");
            assert_eq!(ev["payload"]["index"], i);
            assert_eq!(ev["payload"]["entry"]["status"], "pending");
        }
        for i in 0..3 {
            let running = next_event(&mut ws).await;
            assert_eq!(running["payload"]["index"], i);
            assert_eq!(running["payload"]["entry"]["status"], "running");
            let settled = next_event(&mut ws).await;
            assert_eq!(settled["payload"]["index"], i);
            assert_eq!(settled["payload"]["entry"]["status"], "passed");
        }
        let done = next_event(&mut ws).await;
        assert_eq!(done["event"], "submission.completed");
        assert_eq!(done["payload"]["report"]["allPassed"], true);
    }

    #[tokio::test]
    async fn non_members_cannot_subscribe() {
        let (app, _) = make_test_app().await;
        let addr = spawn_server(app.clone()).await;
        let code = create_room(&app).await;

        assert!(connect_ws(&addr, &format!("rooms/{code}"), OUTSIDER).await.is_err());
        assert!(connect_ws(&addr, "rooms/ZZZZZZ", HOST).await.is_err());
    }
}
