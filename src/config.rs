// src/config.rs

use std::env;

use crate::{services::PtService, storage::PtRepository};

const ARQUIVO_DADOS_PADRAO: &str = "pts_data.csv";

#[derive(Clone)]
pub struct AppState {
    pub pt_service: PtService,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, quem chama
    // decide derrubar a aplicação.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let data_file =
            env::var("PTS_DATA_FILE").unwrap_or_else(|_| ARQUIVO_DADOS_PADRAO.to_string());

        let pt_repo = PtRepository::new(&data_file);

        // Leitura de validação na subida: arquivo ausente é tabela vazia,
        // arquivo corrompido impede o boot em vez de falhar na primeira
        // operação do operador.
        let pts = pt_repo.load().await?;
        tracing::info!(
            "✅ Arquivo de dados '{}' carregado com sucesso ({} registros).",
            data_file,
            pts.len()
        );

        // --- Monta o gráfico de dependências ---
        let pt_service = PtService::new(pt_repo);

        Ok(Self { pt_service })
    }
}
