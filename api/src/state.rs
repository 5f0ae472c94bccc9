use std::sync::Arc;
use std::time::Duration;

use code_runner::Sandbox;
use marker::{AttemptRegistry, EvaluationDriver};
use sea_orm::DatabaseConnection;
use services::RoomService;
use util::config;
use util::problem_bank::ProblemBank;
use util::ws::WebSocketManager;

/// Shared handles for every request: the room store, the WebSocket hub, the
/// sandbox client, the problem catalog and the in-flight submission registry.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    ws: WebSocketManager,
    rooms: RoomService,
    sandbox: Arc<dyn Sandbox>,
    problems: Arc<ProblemBank>,
    attempts: AttemptRegistry,
    step_delay: Duration,
}

impl AppState {
    pub fn new(db: DatabaseConnection, sandbox: Arc<dyn Sandbox>, problems: ProblemBank) -> Self {
        Self {
            rooms: RoomService::new(db.clone()),
            db,
            ws: WebSocketManager::new(),
            sandbox,
            problems: Arc::new(problems),
            attempts: AttemptRegistry::new(),
            step_delay: Duration::from_millis(config::evaluation_step_delay_ms()),
        }
    }

    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn ws(&self) -> &WebSocketManager {
        &self.ws
    }

    pub fn ws_clone(&self) -> WebSocketManager {
        self.ws.clone()
    }

    pub fn rooms(&self) -> &RoomService {
        &self.rooms
    }

    pub fn problems(&self) -> &ProblemBank {
        &self.problems
    }

    pub fn attempts(&self) -> &AttemptRegistry {
        &self.attempts
    }

    pub fn driver(&self) -> EvaluationDriver {
        EvaluationDriver::new(self.sandbox.clone()).with_step_delay(self.step_delay)
    }
}
