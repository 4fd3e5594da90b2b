mod api;
mod config;
mod db;
mod error;
mod funnel;
mod models;
mod runner;
mod scoring;
mod session;
mod styles;
mod tasks;

use std::time::Duration;

use log::{error, info};
use tokio::sync::mpsc;

use api::QuizApi;
use config::Config;
use db::Database;
use funnel::Funnel;
use runner::TerminalView;

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::load();

    // Initialize the local result store
    let database = match Database::new(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize result store: {}", e);
            return;
        }
    };

    let api = match QuizApi::new(&config.api_base_url) {
        Ok(api) => api,
        Err(e) => {
            error!("Failed to build backend client: {}", e);
            return;
        }
    };

    // Fetch the quiz configuration up front; nothing works without it
    let quiz = match api.load_quiz(&config.quiz_id).await {
        Ok(quiz) => quiz,
        Err(e) => {
            error!("Could not load quiz '{}': {}", config.quiz_id, e);
            eprintln!("The quiz backend did not answer. Check QUIZ_API_URL and try again.");
            return;
        }
    };
    info!(
        "Quiz '{}' loaded with {} questions",
        quiz.title,
        quiz.questions.len()
    );
    println!("{}", quiz.title);
    if let Some(description) = &quiz.description {
        println!("{}", description);
    }

    let participant = runner::ask_participant(
        config.participant_name.clone(),
        config.participant_email.clone(),
    );

    let (events_tx, events_rx) = mpsc::channel(32);
    let view = TerminalView::new();
    view.spawn_input_thread(events_tx.clone());

    let mut funnel = match Funnel::new(
        quiz,
        database,
        api,
        view,
        events_rx,
        events_tx,
        participant,
        Duration::from_millis(config.auto_advance_ms),
    ) {
        Ok(funnel) => funnel,
        Err(e) => {
            error!("Could not start the session: {}", e);
            return;
        }
    };

    match funnel.run(config.start_at_result).await {
        Ok(Some(result)) => info!(
            "Session ended, primary style {}",
            result.primary_style.category
        ),
        Ok(None) => info!("Session ended without a computed result"),
        Err(e) => error!("Session failed: {}", e),
    }
}
