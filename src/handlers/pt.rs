// src/handlers/pt.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    // Importa os models de resposta para o Swagger
    models::pt::{
        DevolverPtResponse, EmitirPtResponse, ListaPtsResponse, PendentesResponse, TipoPermissao,
    },
};

// =============================================================================
//  1. EMISSÃO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmitirPtPayload {
    #[schema(example = "PT")]
    pub tipo: TipoPermissao,

    #[validate(length(min = 1, message = "O setor é obrigatório."))]
    #[schema(example = "Manutenção")]
    pub setor: String,

    #[validate(length(min = 1, message = "O solicitante é obrigatório."))]
    #[schema(example = "João da Silva")]
    pub solicitante: String,

    // Campo opcional do formulário; ausente vira string vazia.
    #[serde(default)]
    #[schema(example = "Troca de válvula na linha de vapor")]
    pub descricao_servico: String,
}

// POST /api/pts
#[utoipa::path(
    post,
    path = "/api/pts",
    tag = "PTs",
    request_body = EmitirPtPayload,
    responses(
        (status = 201, description = "PT/PTT emitida", body = EmitirPtResponse),
        (status = 400, description = "Setor ou solicitante em branco")
    )
)]
pub async fn emitir_pt(
    State(app_state): State<AppState>,
    Json(payload): Json<EmitirPtPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let resposta = app_state
        .pt_service
        .emitir(
            payload.tipo,
            &payload.setor,
            &payload.solicitante,
            &payload.descricao_servico,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(resposta)))
}

// GET /api/pts
#[utoipa::path(
    get,
    path = "/api/pts",
    tag = "PTs",
    responses(
        (status = 200, description = "Tabela completa com status derivado", body = ListaPtsResponse)
    )
)]
pub async fn listar_pts(
    State(app_state): State<AppState>,
) -> Result<Json<ListaPtsResponse>, AppError> {
    let resposta = app_state.pt_service.listar().await?;
    Ok(Json(resposta))
}

// =============================================================================
//  2. DEVOLUÇÃO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DevolverPtPayload {
    #[validate(length(min = 1, message = "A numeração é obrigatória."))]
    #[schema(example = "061-2025")]
    pub numeracao: String,

    #[validate(length(min = 1, message = "O recebedor é obrigatório."))]
    #[schema(example = "M. Silva")]
    pub recebedor: String,

    #[validate(length(min = 1, message = "A data de devolução é obrigatória."))]
    #[schema(example = "2025-06-01")]
    pub data_devolucao: String,

    #[validate(length(min = 1, message = "O TST responsável pela liberação é obrigatório."))]
    #[schema(example = "A. Souza")]
    pub tst_resp_liberacao: String,
}

// GET /api/pts/pendentes
#[utoipa::path(
    get,
    path = "/api/pts/pendentes",
    tag = "PTs",
    responses(
        (status = 200, description = "Numerações pendentes de devolução", body = PendentesResponse)
    )
)]
pub async fn listar_pendentes(
    State(app_state): State<AppState>,
) -> Result<Json<PendentesResponse>, AppError> {
    let resposta = app_state.pt_service.pendentes().await?;
    Ok(Json(resposta))
}

// POST /api/pts/devolucao
#[utoipa::path(
    post,
    path = "/api/pts/devolucao",
    tag = "PTs",
    request_body = DevolverPtPayload,
    responses(
        (status = 200, description = "Devolução registrada", body = DevolverPtResponse),
        (status = 400, description = "Campo obrigatório em branco"),
        (status = 404, description = "Numeração não encontrada"),
        (status = 409, description = "PT/PTT já devolvida")
    )
)]
pub async fn devolver_pt(
    State(app_state): State<AppState>,
    Json(payload): Json<DevolverPtPayload>,
) -> Result<Json<DevolverPtResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let resposta = app_state
        .pt_service
        .devolver(
            &payload.numeracao,
            &payload.recebedor,
            &payload.data_devolucao,
            &payload.tst_resp_liberacao,
        )
        .await?;

    Ok(Json(resposta))
}

// =============================================================================
//  3. HISTÓRICO
// =============================================================================

// GET /api/pts/export
#[utoipa::path(
    get,
    path = "/api/pts/export",
    tag = "Histórico",
    responses(
        (status = 200, description = "Histórico completo em CSV", content_type = "text/csv")
    )
)]
pub async fn exportar_historico(
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    let csv_bytes = app_state.pt_service.exportar().await?;

    // Configura os headers para o navegador baixar o CSV com o nome fixo
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"historico_pts.csv\"",
        ),
    ];

    Ok((headers, csv_bytes).into_response())
}
