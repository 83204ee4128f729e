use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::election::Election;
use crate::error::VoteError;

/// Shared service state. Votes and registrations take the write lock;
/// reads share it.
pub struct AppState {
    pub election: RwLock<Election>,
}

impl AppState {
    pub fn new(election: Election) -> Self {
        AppState {
            election: RwLock::new(election),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub voter_id: i64,
    pub candidate: String,
}

#[derive(Debug, Deserialize)]
pub struct VoterRequest {
    pub voter_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CandidateRequest {
    pub name: String,
}

fn error_response(err: &VoteError) -> HttpResponse {
    if !err.is_rejection() {
        error!("request failed: {}", err);
    }
    let body = json!({ "error": err.to_string() });
    match err {
        VoteError::InvalidVoterId(_) => HttpResponse::BadRequest().json(body),
        VoteError::DuplicateVote(_) => HttpResponse::Conflict().json(body),
        VoteError::UnknownCandidate(_) => HttpResponse::NotFound().json(body),
        VoteError::IntegrityViolation(_) => HttpResponse::ServiceUnavailable().json(body),
        VoteError::Load(_) | VoteError::Persistence { .. } => HttpResponse::InternalServerError().json(body),
    }
}

async fn handle_vote(data: web::Data<AppState>, vote: web::Json<VoteRequest>) -> impl Responder {
    let mut election = data.election.write().await;
    match election.cast_vote(vote.voter_id, &vote.candidate) {
        Ok(block) => HttpResponse::Ok().json(block),
        Err(err) => error_response(&err),
    }
}

async fn register_voter(data: web::Data<AppState>, req: web::Json<VoterRequest>) -> impl Responder {
    let mut election = data.election.write().await;
    match election.register_voter(req.voter_id) {
        Ok(()) => HttpResponse::Ok().json(json!({ "voter_id": req.voter_id })),
        Err(err) => error_response(&err),
    }
}

async fn register_candidate(data: web::Data<AppState>, req: web::Json<CandidateRequest>) -> impl Responder {
    let req = req.into_inner();
    let mut election = data.election.write().await;
    match election.register_candidate(req.name.clone()) {
        Ok(()) => HttpResponse::Ok().json(json!({ "name": req.name })),
        Err(err) => error_response(&err),
    }
}

async fn get_results(data: web::Data<AppState>) -> impl Responder {
    let election = data.election.read().await;
    HttpResponse::Ok().json(election.results())
}

async fn get_ledger(data: web::Data<AppState>) -> impl Responder {
    let election = data.election.read().await;
    HttpResponse::Ok().json(election.ledger_snapshot())
}

async fn get_history(data: web::Data<AppState>) -> impl Responder {
    let election = data.election.read().await;
    HttpResponse::Ok().json(election.history())
}

async fn verify(data: web::Data<AppState>) -> impl Responder {
    let election = data.election.read().await;
    match election.verify_integrity() {
        Ok(()) => HttpResponse::Ok().json(json!({ "intact": true })),
        Err(violation) => HttpResponse::Ok().json(json!({
            "intact": false,
            "index": violation.index,
            "reason": violation.reason,
        })),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/vote", web::post().to(handle_vote))
        .route("/voters", web::post().to(register_voter))
        .route("/candidates", web::post().to(register_candidate))
        .route("/results", web::get().to(get_results))
        .route("/ledger", web::get().to(get_ledger))
        .route("/getHistory", web::get().to(get_history))
        .route("/verify", web::get().to(verify));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    use crate::ledger::Ledger;
    use crate::models::Vote;
    use crate::store::MemoryStore;

    fn register_defaults(election: &mut Election) {
        for id in 1..=10 {
            election.register_voter(id).unwrap();
        }
        election.register_candidate("Candidate A").unwrap();
        election.register_candidate("Candidate B").unwrap();
    }

    fn vote_request(voter_id: i64, candidate: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/vote")
            .set_json(json!({ "voter_id": voter_id, "candidate": candidate }))
    }

    fn state() -> web::Data<AppState> {
        let mut election = Election::new();
        register_defaults(&mut election);
        web::Data::new(AppState::new(election))
    }

    #[actix_web::test]
    async fn vote_errors_map_to_status_codes() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let cases = [
            (1, "Candidate A", StatusCode::OK),
            (1, "Candidate B", StatusCode::CONFLICT),
            (11, "Candidate B", StatusCode::BAD_REQUEST),
            (2, "Candidate C", StatusCode::NOT_FOUND),
        ];
        for (voter_id, candidate, expected) in cases {
            let resp = test::call_service(&app, vote_request(voter_id, candidate).to_request()).await;
            assert_eq!(resp.status(), expected, "voter {} for {}", voter_id, candidate);
        }
    }

    #[actix_web::test]
    async fn results_history_and_verify() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        for (voter_id, candidate) in [(1, "Candidate A"), (2, "Candidate B"), (3, "Candidate B")] {
            let req = vote_request(voter_id, candidate).to_request();
            assert!(test::call_service(&app, req).await.status().is_success());
        }

        let results: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/results").to_request()).await;
        assert_eq!(results["tally"]["Candidate A"], 1);
        assert_eq!(results["tally"]["Candidate B"], 2);
        assert_eq!(results["outcome"]["kind"], "winner");
        assert_eq!(results["outcome"]["candidate"], "Candidate B");

        let history: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/getHistory").to_request()).await;
        assert_eq!(history.as_array().map(Vec::len), Some(3));

        let ledger: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/ledger").to_request()).await;
        assert_eq!(ledger.as_array().map(Vec::len), Some(4));

        let verify: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/verify").to_request()).await;
        assert_eq!(verify["intact"], true);
    }

    #[actix_web::test]
    async fn registration_routes() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/candidates")
            .set_json(json!({ "name": "Candidate C" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/voters")
            .set_json(json!({ "voter_id": 11 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/voters")
            .set_json(json!({ "voter_id": 0 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/vote")
            .set_json(json!({ "voter_id": 11, "candidate": "Candidate C" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn tampered_chain_fails_verify_and_halts_votes() {
        let mut ledger = Ledger::new();
        ledger.append(Vote::new(1, "Candidate A"));
        ledger.append(Vote::new(2, "Candidate B"));
        let mut blocks = ledger.blocks().to_vec();
        blocks[2].votes[0].candidate = "Candidate B".to_string();

        let mut election = Election::with_store(Box::new(MemoryStore::with_blocks(blocks)), 1).unwrap();
        register_defaults(&mut election);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(election)))
                .configure(configure),
        )
        .await;

        let verify: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/verify").to_request()).await;
        assert_eq!(verify["intact"], false);
        assert_eq!(verify["index"], 2);

        let resp = test::call_service(&app, vote_request(3, "Candidate A").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        // Reads still serve the chain for audit.
        let ledger: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/ledger").to_request()).await;
        assert_eq!(ledger.as_array().map(Vec::len), Some(3));
    }

    #[actix_web::test]
    async fn failed_save_is_a_server_error() {
        let mut store = MemoryStore::new();
        store.fail_next(2);
        let mut election = Election::with_store(Box::new(store), 2).unwrap();
        register_defaults(&mut election);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(election)))
                .configure(configure),
        )
        .await;

        let resp = test::call_service(&app, vote_request(1, "Candidate A").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("after 2 attempt(s)"));

        let ledger: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/ledger").to_request()).await;
        assert_eq!(ledger.as_array().map(Vec::len), Some(1));

        let resp = test::call_service(&app, vote_request(1, "Candidate A").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
