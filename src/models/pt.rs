// src/models/pt.rs

use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

// --- Enums ---

// Os dois tipos fixos de permissão que o formulário oferece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TipoPermissao {
    Pt,
    Ptt,
}

impl TipoPermissao {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pt => "PT",
            Self::Ptt => "PTT",
        }
    }
}

impl std::fmt::Display for TipoPermissao {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Status derivado da coluna "Devolvida". Nunca é persistido no arquivo;
// é recalculado a cada leitura.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum StatusDevolucao {
    #[serde(rename = "Devolvida")]
    Devolvida,
    #[serde(rename = "Não devolvida")]
    NaoDevolvida,
}

impl StatusDevolucao {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Devolvida => "Devolvida",
            Self::NaoDevolvida => "Não devolvida",
        }
    }
}

// --- Registro persistido ---

/// Uma linha do arquivo de dados. Todos os campos são texto, exatamente como
/// no CSV; datas são strings já formatadas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pt {
    #[schema(example = "061-2025")]
    pub numeracao: String,

    #[schema(example = "PT")]
    pub tipo: String,

    #[schema(example = "Manutenção")]
    pub setor: String,

    #[schema(example = "João da Silva")]
    pub solicitante: String,

    #[schema(example = "Troca de válvula na linha de vapor")]
    pub descricao_servico: String,

    #[schema(example = "2025-06-01")]
    pub data_emissao: String,

    #[schema(example = "Não")]
    pub devolvida: String,

    #[schema(example = "")]
    pub data_devolucao: String,

    #[schema(example = "")]
    pub recebedor: String,

    #[schema(example = "")]
    pub tst_resp_liberacao: String,

    #[schema(example = "2025-06-01 08:15:00")]
    pub ultima_atualizacao: String,
}

impl Pt {
    /// Uma PT conta como devolvida quando a coluna "Devolvida" contém o token
    /// "sim", ignorando caixa e espaços ao redor. Qualquer outro valor
    /// (inclusive vazio) conta como pendente.
    pub fn esta_devolvida(&self) -> bool {
        self.devolvida.trim().eq_ignore_ascii_case("sim")
    }

    pub fn status(&self) -> StatusDevolucao {
        if self.esta_devolvida() {
            StatusDevolucao::Devolvida
        } else {
            StatusDevolucao::NaoDevolvida
        }
    }

    /// Valores do registro na ordem canônica das colunas persistidas
    /// (a mesma de `storage::pt_repo::COLUNAS_OBRIGATORIAS`).
    pub fn campos(&self) -> [&str; 11] {
        [
            &self.numeracao,
            &self.tipo,
            &self.setor,
            &self.solicitante,
            &self.descricao_servico,
            &self.data_emissao,
            &self.devolvida,
            &self.data_devolucao,
            &self.recebedor,
            &self.tst_resp_liberacao,
            &self.ultima_atualizacao,
        ]
    }
}

// --- Modelos de resposta da API ---

// Registro + status derivado, como a tabela exibida ao operador.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PtComStatus {
    #[serde(flatten)]
    pub pt: Pt,
    pub status: StatusDevolucao,
}

// Dados do aviso "🔔 Última PT emitida" mostrado acima da tabela.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UltimaPtEmitida {
    #[schema(example = "061-2025")]
    pub numeracao: String,
    #[schema(example = "2025-06-01")]
    pub data_emissao: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListaPtsResponse {
    pub ultima_emitida: Option<UltimaPtEmitida>,
    pub pts: Vec<PtComStatus>,
}

// Domínio do seletor de devolução: somente numerações pendentes. Quando não
// há nenhuma, `mensagem` leva o aviso informativo no lugar de um seletor vazio.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendentesResponse {
    #[schema(example = json!(["061-2025", "062-2025"]))]
    pub pendentes: Vec<String>,
    #[schema(example = "Nenhuma PT/PTT pendente para devolução.")]
    pub mensagem: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmitirPtResponse {
    #[schema(example = "✅ PT/PTT 061-2025 emitida com sucesso!")]
    pub mensagem: String,
    pub pt: Pt,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DevolverPtResponse {
    #[schema(example = "✅ PT/PTT 061-2025 devolvida com sucesso!")]
    pub mensagem: String,
    pub pt: Pt,
}
