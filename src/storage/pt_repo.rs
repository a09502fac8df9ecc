// src/storage/pt_repo.rs

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{common::error::AppError, models::pt::Pt};

/// Colunas obrigatórias do arquivo de dados, na ordem canônica de gravação.
/// A ordem precisa bater com `Pt::campos()`.
pub const COLUNAS_OBRIGATORIAS: [&str; 11] = [
    "Numeração",
    "Tipo",
    "Setor",
    "Solicitante",
    "Descrição do Serviço",
    "Data Emissão",
    "Devolvida",
    "Data Devolução",
    "Recebedor",
    "TST Resp. Liberação em área",
    "Última Atualização",
];

// O repositório de PTs. O arquivo inteiro é lido e regravado a cada operação;
// sem lock — assume um único operador.
#[derive(Clone)]
pub struct PtRepository {
    data_file: PathBuf,
}

impl PtRepository {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Carrega a tabela inteira do disco, já normalizada para o conjunto
    /// canônico de colunas. Arquivo ausente vira tabela vazia; arquivo
    /// existente mas ilegível é erro (nada de leitura parcial).
    pub async fn load(&self) -> Result<Vec<Pt>, AppError> {
        let bytes = match tokio::fs::read(&self.data_file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::StorageError(e)),
        };
        Self::parse(&bytes)
    }

    /// Regrava o arquivo inteiro com a tabela recebida.
    pub async fn save(&self, pts: &[Pt]) -> Result<(), AppError> {
        let bytes = Self::csv_bytes(pts)?;
        tokio::fs::write(&self.data_file, bytes).await?;
        Ok(())
    }

    /// Serializa a tabela no mesmo formato do arquivo persistido (cabeçalho
    /// canônico, sem a coluna de status derivado). É o buffer oferecido no
    /// download do histórico.
    pub fn csv_bytes(pts: &[Pt]) -> Result<Vec<u8>, AppError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(COLUNAS_OBRIGATORIAS)?;
        for pt in pts {
            writer.write_record(pt.campos())?;
        }
        writer
            .into_inner()
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))
    }

    fn parse(bytes: &[u8]) -> Result<Vec<Pt>, AppError> {
        // flexible: linhas com menos células que o cabeçalho entram com os
        // campos faltantes vazios, em vez de derrubar a leitura inteira.
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
        let cabecalho = reader.headers()?.clone();

        // Posição de cada coluna obrigatória no arquivo lido. Coluna ausente
        // fica como None e é preenchida com vazio; colunas extras são
        // descartadas — a tabela carregada tem exatamente o conjunto canônico.
        let indices: Vec<Option<usize>> = COLUNAS_OBRIGATORIAS
            .iter()
            .map(|col| cabecalho.iter().position(|c| c == *col))
            .collect();

        let mut pts = Vec::new();
        for registro in reader.records() {
            let registro = registro?;
            let campo = |i: usize| -> String {
                indices[i]
                    .and_then(|idx| registro.get(idx))
                    .unwrap_or("")
                    .to_string()
            };
            pts.push(Pt {
                numeracao: campo(0),
                tipo: campo(1),
                setor: campo(2),
                solicitante: campo(3),
                descricao_servico: campo(4),
                data_emissao: campo(5),
                devolvida: campo(6),
                data_devolucao: campo(7),
                recebedor: campo(8),
                tst_resp_liberacao: campo(9),
                ultima_atualizacao: campo(10),
            });
        }
        Ok(pts)
    }
}
