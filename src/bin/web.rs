//! Single binary web server exposing the bracket engine as a JSON API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! ROSTER_CSV imports teams at startup; TOURNAMENT_NAME names the default tournament.

use actix_web::{
    get, post, put,
    http::StatusCode,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use gsl_tournament_web::{
    auto_generate_groups, available_teams, build_group_bracket, build_knockout_bracket,
    config::Config, get_rules, promote_qualifier, record_result, roster, shuffle_seats,
    update_rules, ErrorKind, GroupId, MatchId, MemoryStore, Pool, Rank, Store, Team, TeamId,
    Tournament, TournamentError, TournamentId,
};
use serde::Deserialize;
use std::fs::File;

struct AppState {
    store: MemoryStore,
    default_tournament: TournamentId,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
}

#[derive(Deserialize)]
struct CreateTeamBody {
    #[serde(default)]
    name: String,
    pool: Pool,
    player_1: String,
    player_2: String,
}

#[derive(Deserialize)]
struct PoolQuery {
    pool: Option<Pool>,
}

#[derive(Deserialize)]
struct AvailableQuery {
    pool: Pool,
}

#[derive(Deserialize)]
struct CreateGroupBody {
    name: String,
    pool: Pool,
    team_ids: Vec<TeamId>,
    /// Randomize seats before building M1/M2.
    #[serde(default)]
    shuffle: bool,
}

#[derive(Deserialize)]
struct AutoGroupsBody {
    pool: Pool,
    name_prefix: Option<String>,
}

#[derive(Deserialize)]
struct RecordResultBody {
    winner_id: TeamId,
    score: Option<String>,
    video_url: Option<String>,
}

#[derive(Deserialize)]
struct PromoteBody {
    rank: u8,
    team_id: TeamId,
}

#[derive(Deserialize)]
struct RulesBody {
    content: String,
}

#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

#[derive(Deserialize)]
struct GroupPath {
    id: GroupId,
}

/// Map a rejected operation to a status code by its kind.
fn error_response(e: &TournamentError) -> HttpResponse {
    let status = match e.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::NotReady => StatusCode::PRECONDITION_FAILED,
        ErrorKind::Conflict => StatusCode::CONFLICT,
    };
    HttpResponse::build(status).json(serde_json::json!({ "error": e.to_string(), "kind": e.kind() }))
}

fn respond<T: serde::Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "gsl-tournament-web",
    })
}

/// The tournament created at startup.
#[get("/api/tournament")]
async fn api_default_tournament(state: Data<AppState>) -> HttpResponse {
    respond(state.store.get_tournament(state.default_tournament))
}

#[post("/api/tournaments")]
async fn api_create_tournament(state: Data<AppState>, body: Json<CreateTournamentBody>) -> HttpResponse {
    let name = body.name.trim();
    if name.is_empty() {
        return error_response(&TournamentError::InvalidInput("Tournament name is required".into()));
    }
    let tournament = Tournament::new(name);
    respond(state.store.insert_tournament(&tournament).map(|()| tournament))
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: Data<AppState>, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.store.get_tournament(path.id))
}

#[get("/api/tournaments/{id}/rules")]
async fn api_get_rules(state: Data<AppState>, path: Path<TournamentPath>) -> HttpResponse {
    respond(get_rules(&state.store, path.id))
}

#[put("/api/tournaments/{id}/rules")]
async fn api_update_rules(
    state: Data<AppState>,
    path: Path<TournamentPath>,
    body: Json<RulesBody>,
) -> HttpResponse {
    respond(update_rules(&state.store, path.id, &body.content))
}

#[post("/api/teams")]
async fn api_create_team(state: Data<AppState>, body: Json<CreateTeamBody>) -> HttpResponse {
    let body = body.into_inner();
    if body.player_1.trim().is_empty() || body.player_2.trim().is_empty() {
        return error_response(&TournamentError::InvalidInput("A team needs two players".into()));
    }
    let team = Team::new(body.name, body.pool, body.player_1, body.player_2);
    respond(state.store.insert_team(&team).map(|()| team))
}

#[get("/api/teams")]
async fn api_list_teams(state: Data<AppState>, query: Query<PoolQuery>) -> HttpResponse {
    respond(state.store.list_teams(query.pool))
}

/// Teams of a pool not yet placed in any group.
#[get("/api/teams/available")]
async fn api_available_teams(state: Data<AppState>, query: Query<AvailableQuery>) -> HttpResponse {
    respond(available_teams(&state.store, query.pool))
}

#[post("/api/tournaments/{id}/groups")]
async fn api_create_group(
    state: Data<AppState>,
    path: Path<TournamentPath>,
    body: Json<CreateGroupBody>,
) -> HttpResponse {
    let mut team_ids = body.team_ids.clone();
    if body.shuffle {
        shuffle_seats(&mut team_ids, &mut rand::thread_rng());
    }
    respond(build_group_bracket(&state.store, path.id, &body.name, body.pool, &team_ids))
}

#[post("/api/tournaments/{id}/groups/auto")]
async fn api_auto_groups(
    state: Data<AppState>,
    path: Path<TournamentPath>,
    body: Json<AutoGroupsBody>,
) -> HttpResponse {
    respond(auto_generate_groups(
        &state.store,
        path.id,
        body.pool,
        body.name_prefix.as_deref(),
        &mut rand::thread_rng(),
    ))
}

/// All groups (knockout included) with their matches.
#[get("/api/tournaments/{id}/bracket")]
async fn api_bracket(state: Data<AppState>, path: Path<TournamentPath>) -> HttpResponse {
    respond(
        state
            .store
            .get_tournament(path.id)
            .and_then(|_| state.store.list_groups_by_tournament(path.id)),
    )
}

#[post("/api/tournaments/{id}/knockout")]
async fn api_generate_knockout(state: Data<AppState>, path: Path<TournamentPath>) -> HttpResponse {
    respond(build_knockout_bracket(&state.store, path.id))
}

#[get("/api/matches/{id}")]
async fn api_get_match(state: Data<AppState>, path: Path<MatchPath>) -> HttpResponse {
    respond(state.store.get_match(path.id))
}

/// Record (or correct) a result. Propagation problems come back as `warnings`, not errors.
#[post("/api/matches/{id}/result")]
async fn api_record_result(
    state: Data<AppState>,
    path: Path<MatchPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    let body = body.into_inner();
    respond(record_result(
        &state.store,
        path.id,
        body.winner_id,
        body.score,
        body.video_url,
    ))
}

/// Manually place a group qualifier into the knockout bracket.
#[post("/api/groups/{id}/promote")]
async fn api_promote(state: Data<AppState>, path: Path<GroupPath>, body: Json<PromoteBody>) -> HttpResponse {
    let Some(rank) = Rank::from_number(body.rank) else {
        return error_response(&TournamentError::InvalidInput("rank must be 1 or 2".into()));
    };
    respond(promote_qualifier(&state.store, path.id, rank, body.team_id))
}

fn load_roster(store: &MemoryStore, config: &Config) {
    let Some(path) = &config.roster_csv else {
        return;
    };
    let result = File::open(path)
        .map_err(|e| TournamentError::InvalidInput(format!("cannot open {}: {e}", path.display())))
        .and_then(|file| roster::import_teams(store, file));
    if let Err(e) = result {
        log::error!("Roster import from {} failed: {}", path.display(), e);
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let store = MemoryStore::new();
    let tournament = Tournament::new(config.tournament_name.clone());
    if let Err(e) = store.insert_tournament(&tournament) {
        log::error!("Could not create default tournament: {e}");
    }
    load_roster(&store, &config);
    log::info!("Default tournament '{}' ({})", tournament.name, tournament.id);

    let state = Data::new(AppState {
        store,
        default_tournament: tournament.id,
    });

    log::info!("Starting server at http://{}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_default_tournament)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_get_rules)
            .service(api_update_rules)
            .service(api_create_team)
            .service(api_available_teams)
            .service(api_list_teams)
            .service(api_create_group)
            .service(api_auto_groups)
            .service(api_bracket)
            .service(api_generate_knockout)
            .service(api_get_match)
            .service(api_record_result)
            .service(api_promote)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
