use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("PT/PTT {0} não encontrada")]
    PtNotFound(String),

    #[error("PT/PTT {0} já foi devolvida")]
    PtAlreadyReturned(String),

    // Falha de I/O no arquivo de dados (leitura ou gravação).
    #[error("Erro de acesso ao arquivo de dados: {0}")]
    StorageError(#[from] std::io::Error),

    // Arquivo presente mas impossível de interpretar (CSV quebrado, UTF-8
    // inválido). Nunca vira leitura parcial.
    #[error("Erro ao interpretar o arquivo de dados: {0}")]
    CsvError(#[from] csv::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::PtNotFound(numeracao) => {
                let body = Json(json!({
                    "error": format!("PT/PTT {} não encontrada.", numeracao)
                }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::PtAlreadyReturned(numeracao) => {
                let body = Json(json!({
                    "error": format!("PT/PTT {} já consta como devolvida.", numeracao)
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            // Todos os outros erros (StorageError, CsvError, InternalServerError)
            // viram 500. O `tracing` loga a mensagem detalhada que `thiserror`
            // nos deu; o operador recebe só o aviso genérico.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
