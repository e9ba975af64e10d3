//! Servidor web Axum para similaridade, aumento de documentos anotados e treino
//! com progresso em tempo real via WebSocket.

mod config;
mod render;

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use nlptools_core::{
    comparison::{self, SimilarityOptions},
    generators::{
        company::CapitalStyle,
        date::{DateRange, Formality},
        names::{NameKind, MAX_NAMES},
        Generator,
    },
    load_training_corpus, train_streaming, Error, TaggedDocument, TaggedEntity, TrainingConfig,
    TrainingEvent, TrainingExample,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Estado compartilhado da aplicação
struct AppState {
    config: ServerConfig,
}

/// Erros das rotas, serializados como `{"error": "..."}`.
enum ApiError {
    /// Entrada rejeitada pela biblioteca → 400.
    Core(Error),
    /// Falha ao renderizar um template → 500.
    Template(askama::Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::Core(e)
    }
}

impl From<askama::Error> for ApiError {
    fn from(e: askama::Error) -> Self {
        Self::Template(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Core(e) => {
                warn!(error = %e, "requisição rejeitada");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            Self::Template(e) => {
                warn!(error = %e, "falha ao renderizar template");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    let addr = config.addr.clone();
    let state = Arc::new(AppState { config });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/similarity", post(similarity_handler))
        .route("/augment", post(augment_handler))
        .route("/render", post(render_handler))
        .route("/generate/:field", get(generate_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("servidor nlptools iniciado em http://{addr}");
    axum::serve(listener, app).await
}

/// Retorna a página principal HTML
async fn index_handler() -> ApiResult<Html<String>> {
    Ok(Html(render::index()?))
}

#[derive(Deserialize)]
struct SimilarityRequest {
    a: String,
    b: String,
    #[serde(flatten)]
    options: SimilarityOptions,
    /// Quando presente, procura `a` dentro destes tokens.
    #[serde(default)]
    tokens: Option<Vec<String>>,
}

#[derive(Serialize)]
struct SimilarityResponse {
    ratio: f64,
    quick_ratio: f64,
    token_set_ratio: f64,
    word_similar: bool,
    sentence_similar: bool,
    contained: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched_token: Option<String>,
}

async fn similarity_handler(Json(req): Json<SimilarityRequest>) -> Json<SimilarityResponse> {
    let SimilarityOptions { threshold, mode } = req.options;
    let matched_token = req.tokens.as_deref().and_then(|tokens| {
        comparison::find_similar_word(&req.a, tokens, threshold, mode).map(str::to_string)
    });

    Json(SimilarityResponse {
        ratio: comparison::ratio(&req.a, &req.b),
        quick_ratio: comparison::quick_ratio(&req.a, &req.b),
        token_set_ratio: comparison::token_set_ratio(&req.a, &req.b),
        word_similar: comparison::word_similarity(&req.a, &req.b, threshold, mode),
        sentence_similar: comparison::sentence_similarity(&req.a, &req.b, threshold, mode),
        contained: comparison::sentence_contained_in(&req.a, &req.b, threshold),
        matched_token,
    })
}

#[derive(Serialize)]
struct AugmentResponse {
    /// Documento com o texto reescrito.
    document: TaggedDocument,
    /// Spans reindexados, ainda com `text`/`new_text` originais.
    reindexed: Vec<TaggedEntity>,
    training_example: TrainingExample,
}

/// Aplica os `new_text` de um registro anotado e devolve o documento aumentado.
async fn augment_handler(Json(record): Json<serde_json::Value>) -> ApiResult<Json<AugmentResponse>> {
    let mut doc = TaggedDocument::from_value(record)?;
    let document = doc.augment()?;
    let reindexed = doc.index_augmentation()?.to_vec();
    let training_example = document.training_example();
    info!(doc_id = %document.doc_id, entities = reindexed.len(), "documento aumentado");

    Ok(Json(AugmentResponse {
        document,
        reindexed,
        training_example,
    }))
}

/// Renderiza as entidades de um registro anotado em HTML.
async fn render_handler(Json(record): Json<serde_json::Value>) -> ApiResult<Html<String>> {
    let doc = TaggedDocument::from_value(record)?;
    Ok(Html(render::entities(&doc)?))
}

#[derive(Debug, Default, Deserialize)]
struct GenerateQuery {
    seed: Option<u64>,
    n: Option<usize>,
    formality: Option<String>,
    include_year: Option<bool>,
    from_year: Option<i32>,
    to_year: Option<i32>,
    kind: Option<String>,
    style: Option<String>,
    legal: Option<bool>,
}

#[derive(Serialize)]
struct GenerateResponse {
    field: String,
    seed: Option<u64>,
    values: Vec<String>,
}

/// Maior `n` aceito por requisição; pedidos maiores são limitados.
const MAX_GENERATE: usize = MAX_NAMES;

const GENERATE_FIELDS: &str =
    "date, names, dni, cuit, address, capital, contribution, duration, validity, company_type";

/// Gera `n` valores sintéticos para um campo. Com `seed`, a resposta é reprodutível.
async fn generate_handler(
    Path(field): Path<String>,
    Query(q): Query<GenerateQuery>,
) -> ApiResult<Json<GenerateResponse>> {
    let n = match q.n.unwrap_or(1) {
        n if n > MAX_GENERATE => {
            warn!(requested = n, max = MAX_GENERATE, "quantidade grande demais, limitando");
            MAX_GENERATE
        }
        n => n,
    };
    let mut generator = Generator::new(q.seed);
    let g = &mut generator;

    let values = match field.as_str() {
        "date" => {
            let formality: Formality = q.formality.as_deref().unwrap_or("random").parse()?;
            let range = match (q.from_year, q.to_year) {
                (Some(from), Some(to)) => DateRange::from_ymd(from, 1, 1, to, 12, 31)?,
                _ => DateRange::default(),
            };
            let include_year = q.include_year.unwrap_or(true);
            let mut values = Vec::with_capacity(n);
            for _ in 0..n {
                let date = g.date(range)?;
                values.push(g.format_date(date, formality, include_year));
            }
            values
        }
        "names" => {
            let kind: NameKind = q.kind.as_deref().unwrap_or("any").parse()?;
            g.names(n, kind)?
        }
        "address" => g.addresses(n, q.legal.unwrap_or(false))?,
        "dni" => repeat(g, n, |g| g.id_number(false)),
        "cuit" => repeat(g, n, |g| g.id_number(true)),
        "capital" => {
            let style: CapitalStyle = q.style.as_deref().unwrap_or("any").parse()?;
            repeat(g, n, |g| g.capital_phrase(style))
        }
        "contribution" => repeat(g, n, Generator::contribution_amount),
        "duration" => repeat(g, n, Generator::company_duration_phrase),
        "validity" => repeat(g, n, Generator::company_validity_phrase),
        "company_type" => repeat(g, n, Generator::company_type_phrase),
        other => {
            return Err(Error::UnknownOption {
                option: "field",
                value: other.to_string(),
                expected: GENERATE_FIELDS,
            }
            .into())
        }
    };

    Ok(Json(GenerateResponse {
        field,
        seed: q.seed,
        values,
    }))
}

fn repeat(g: &mut Generator, n: usize, mut f: impl FnMut(&mut Generator) -> String) -> Vec<String> {
    (0..n).map(|_| f(g)).collect()
}

/// Mensagem WebSocket recebida do cliente
#[derive(Deserialize)]
struct TrainRequest {
    /// Exemplos inline; sem eles, carrega `corpus` do diretório de dados.
    #[serde(default)]
    examples: Option<Vec<TrainingExample>>,
    #[serde(default)]
    corpus: Option<String>,
    #[serde(default)]
    config: TrainingConfig,
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe um pedido de treino e transmite os eventos de cada época
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let req = match serde_json::from_str::<TrainRequest>(&text) {
                    Ok(req) => req,
                    Err(e) => {
                        let event = TrainingEvent::Error {
                            message: format!("pedido de treino inválido: {e}"),
                        };
                        if send_event(&mut socket, &event).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };

                let examples = match req.examples {
                    Some(examples) => examples,
                    None => {
                        let corpus = req.corpus.as_deref().unwrap_or("estatutos");
                        match load_training_corpus(corpus, &state.config.data_dir) {
                            Ok(examples) => examples,
                            Err(e) => {
                                let event = TrainingEvent::Error { message: e.to_string() };
                                if send_event(&mut socket, &event).await.is_err() {
                                    return;
                                }
                                continue;
                            }
                        }
                    }
                };

                info!(examples = examples.len(), epochs = req.config.epochs, "treino via WebSocket");

                // O treino é síncrono: roda em spawn_blocking e os eventos saem de um
                // std::mpsc, repassados ao runtime por um canal tokio
                let (tx_std, rx_std) = std::sync::mpsc::channel::<TrainingEvent>();
                let (tx_async, mut rx_async) = tokio::sync::mpsc::unbounded_channel::<TrainingEvent>();
                let config = req.config;

                tokio::task::spawn_blocking(move || {
                    if let Err(e) = train_streaming(&examples, &config, tx_std) {
                        warn!(error = %e, "treino falhou");
                    }
                });
                tokio::task::spawn_blocking(move || {
                    for event in rx_std {
                        if tx_async.send(event).is_err() {
                            break;
                        }
                    }
                });

                while let Some(event) = rx_async.recv().await {
                    if send_event(&mut socket, &event).await.is_err() {
                        return; // cliente desconectou
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &TrainingEvent) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json)).await,
        Err(e) => {
            warn!(error = %e, "evento não serializável");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn generate(field: &str, query: GenerateQuery) -> Option<GenerateResponse> {
        match generate_handler(Path(field.to_string()), Query(query)).await {
            Ok(Json(response)) => Some(response),
            Err(_) => None,
        }
    }

    #[tokio::test]
    async fn test_generate_clamps_huge_counts() {
        for field in ["date", "dni", "contribution"] {
            let query = GenerateQuery {
                n: Some(usize::MAX / 4),
                seed: Some(1),
                ..GenerateQuery::default()
            };
            let response = generate(field, query).await.unwrap();
            assert_eq!(response.values.len(), MAX_GENERATE, "{field}");
        }
    }

    #[tokio::test]
    async fn test_generate_is_reproducible_with_seed() {
        let query = || GenerateQuery {
            n: Some(3),
            seed: Some(42),
            ..GenerateQuery::default()
        };
        let a = generate("cuit", query()).await.unwrap();
        let b = generate("cuit", query()).await.unwrap();
        assert_eq!(a.values, b.values);
        assert_eq!(a.values.len(), 3);
    }

    #[tokio::test]
    async fn test_generate_rejects_unknown_field() {
        assert!(generate("telefono", GenerateQuery::default()).await.is_none());
    }
}
