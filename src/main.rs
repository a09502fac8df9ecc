//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod docs;
mod handlers;
mod models;
mod services;
mod storage;

use crate::config::AppState;
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Lida com o Result retornado por AppState::new().
    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // As rotas do formulário de PTs: emissão, tabela, devolução e export.
    let pt_routes = Router::new()
        .route("/"
               ,post(handlers::pt::emitir_pt)
               .get(handlers::pt::listar_pts)
        )
        .route("/pendentes"
               ,get(handlers::pt::listar_pendentes)
        )
        .route("/devolucao"
               ,post(handlers::pt::devolver_pt)
        )
        .route("/export"
               ,get(handlers::pt::exportar_historico)
        );

    // Combina tudo no router principal. O Swagger UI em /docs é a
    // superfície interativa do operador.
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/pts", pt_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
