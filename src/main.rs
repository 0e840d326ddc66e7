use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use zero_hunger::config::{Settings, StoreBackend};
use zero_hunger::core::FoodMatcher;
use zero_hunger::error::{json_error_handler, query_error_handler};
use zero_hunger::routes::{self, AppState};
use zero_hunger::services::{
    fixtures, ConversationStore, DocumentStore, FirestoreClient, FoodRepository, GeminiClient,
    GenerationOptions, MemoryStore, TextCompletion,
};

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn DocumentStore>> {
    match settings.store.backend {
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            fixtures::seed(&store, &settings.collections).await;
            info!("Using in-memory store");
            Ok(Arc::new(store))
        }
        StoreBackend::Firestore => {
            let project_id = settings.store.project_id.clone().ok_or_else(|| {
                error!("store.project_id (or GOOGLE_CLOUD_PROJECT) is required for the firestore backend");
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "missing Firestore project id")
            })?;

            let client = FirestoreClient::new(
                settings.store.endpoint.clone(),
                project_id.clone(),
                settings.store.database_id.clone(),
                settings.store.access_token.clone(),
                Duration::from_secs(settings.store.timeout_secs),
            )
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

            info!("Using Firestore project {}", project_id);
            Ok(Arc::new(client))
        }
    }
}

fn build_gemini(settings: &Settings, model: &str, json_output: bool) -> std::io::Result<GeminiClient> {
    let gemini = &settings.gemini;
    let options = GenerationOptions {
        temperature: gemini.temperature,
        top_k: gemini.top_k,
        top_p: gemini.top_p,
        max_output_tokens: gemini.max_output_tokens,
        json_output,
    };

    GeminiClient::new(
        gemini.endpoint.clone(),
        gemini.api_key.clone(),
        model.to_string(),
        options,
        Duration::from_secs(gemini.timeout_secs),
    )
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_tracing(&settings.logging.level, &settings.logging.format);

    info!("Starting Zero Hunger service...");

    let store = build_store(&settings).await?;
    let repository = Arc::new(FoodRepository::new(store, settings.collections.clone()));

    if settings.gemini.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; matching and chat requests will fail");
    }

    let match_model: Arc<dyn TextCompletion> =
        Arc::new(build_gemini(&settings, &settings.gemini.match_model, true)?);
    let assistant: Arc<dyn TextCompletion> =
        Arc::new(build_gemini(&settings, &settings.gemini.chat_model, false)?);

    info!(
        "Gemini clients initialized (match: {}, chat: {})",
        settings.gemini.match_model, settings.gemini.chat_model
    );

    let conversations = Arc::new(ConversationStore::new(
        settings.chat.max_sessions,
        settings.chat.session_ttl_secs,
    ));

    let development = settings.server.is_development();

    // Build application state
    let app_state = AppState {
        repository,
        matcher: Arc::new(FoodMatcher::new(match_model)),
        assistant,
        conversations,
        nearby_radius_km: settings.nearby.default_radius_km,
        expose_error_details: development,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!(
        "Starting HTTP server on {}:{} ({:?})",
        host, port, settings.server.environment
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
            .configure(|cfg| {
                if development {
                    routes::configure_dev_routes(cfg);
                }
            })
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
