use utoipa::OpenApi;

use crate::api::rest::dto::{
    CreateMatchReq, MatchDto, ProfileDto, ProfileUpdateReq, SendMessageReq,
};
use crate::api::rest::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Amora API",
        description = "Profiles, matches and chat for the Amora dating backend"
    ),
    paths(
        handlers::welcome,
        handlers::get_profile,
        handlers::update_profile,
        handlers::search,
        handlers::list_matches,
        handlers::create_match,
        handlers::settings,
        handlers::send_message
    ),
    components(schemas(
        ProfileDto,
        ProfileUpdateReq,
        MatchDto,
        CreateMatchReq,
        SendMessageReq,
        modkit::Problem,
        modkit::ValidationError
    )),
    tags(
        (name = "general", description = "Static pages"),
        (name = "profile", description = "Member profile"),
        (name = "matches", description = "Pairings between members"),
        (name = "chat", description = "Message intents")
    )
)]
pub struct ApiDoc;
