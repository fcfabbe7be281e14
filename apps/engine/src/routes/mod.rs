pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::attendance::handlers as attendance;
use crate::conversation::handlers as conversation;
use crate::payroll::handlers as payroll;
use crate::performance::handlers as performance;
use crate::resume::handlers as resume;
use crate::screening::handlers as screening;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening
        .route("/api/v1/recruitment/screen", post(screening::handle_screen))
        .route(
            "/api/v1/recruitment/converse",
            post(conversation::handle_converse),
        )
        .route("/api/v1/candidates/rank", post(screening::handle_rank))
        .route("/api/v1/skills/gap", post(screening::handle_skill_gap))
        // Resumes
        .route("/api/v1/resumes/analyze", post(resume::handle_analyze))
        .route("/api/v1/resumes/improve", post(resume::handle_improve))
        // Attendance
        .route(
            "/api/v1/attendance/anomalies",
            post(attendance::handle_anomalies),
        )
        // Performance and payroll
        .route(
            "/api/v1/performance/insights",
            post(performance::handle_insights),
        )
        .route("/api/v1/payroll/forecast", post(payroll::handle_forecast))
        // Recruiter chat
        .route(
            "/api/v1/chat/sessions",
            get(conversation::handle_list_sessions).post(conversation::handle_create_session),
        )
        .route(
            "/api/v1/chat/sessions/:id",
            get(conversation::handle_get_session).delete(conversation::handle_delete_session),
        )
        .route(
            "/api/v1/chat/sessions/:id/message",
            post(conversation::handle_send_message),
        )
        .with_state(state)
}
