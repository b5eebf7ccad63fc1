use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{auth, category, hackathon, me, participant, participation_request, user};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/hackathons", hackathon_routes())
        .nest("/me", me_routes())
        .nest("/users", user_routes())
        .nest("/categories", category_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
}

fn hackathon_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(hackathon::list_hackathons, hackathon::create_hackathon))
        .routes(routes!(
            hackathon::get_hackathon,
            hackathon::update_hackathon,
            hackathon::delete_hackathon
        ))
        .nest("/{id}/participants", participant_routes())
        .nest("/{id}/requests", request_routes())
}

fn participant_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(participant::list_participants))
        .routes(routes!(
            participant::get_participant,
            participant::remove_participant
        ))
}

fn request_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            participation_request::list_requests,
            participation_request::create_request
        ))
        .routes(routes!(
            participation_request::get_request,
            participation_request::update_request,
            participation_request::delete_request
        ))
}

fn me_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(me::get_me, me::update_me, me::delete_me))
        .routes(routes!(me::list_my_requests))
        .routes(routes!(me::get_my_request, me::delete_my_request))
        .routes(routes!(me::list_my_participations))
        .routes(routes!(
            me::get_my_participation,
            me::delete_my_participation
        ))
        .routes(routes!(me::list_hosted_hackathons))
        .routes(routes!(me::list_participated_hackathons))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(user::list_user_hackathons))
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        category::list_categories,
        category::create_category
    ))
}
