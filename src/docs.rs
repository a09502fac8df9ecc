// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- PTs ---
        handlers::pt::listar_pts,
        handlers::pt::emitir_pt,
        handlers::pt::listar_pendentes,
        handlers::pt::devolver_pt,

        // --- Histórico ---
        handlers::pt::exportar_historico,
    ),
    components(
        schemas(
            // --- Models ---
            models::pt::TipoPermissao,
            models::pt::StatusDevolucao,
            models::pt::Pt,
            models::pt::PtComStatus,
            models::pt::UltimaPtEmitida,
            models::pt::ListaPtsResponse,
            models::pt::PendentesResponse,
            models::pt::EmitirPtResponse,
            models::pt::DevolverPtResponse,

            // --- Payloads ---
            handlers::pt::EmitirPtPayload,
            handlers::pt::DevolverPtPayload,
        )
    ),
    tags(
        (name = "PTs", description = "Emissão e Devolução de Permissões de Trabalho (PT/PTT)"),
        (name = "Histórico", description = "Exportação do histórico em CSV")
    )
)]
pub struct ApiDoc;
