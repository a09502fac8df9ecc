// src/services/pt_service.rs

use chrono::Local;

use crate::{
    common::error::AppError,
    models::pt::{
        DevolverPtResponse, EmitirPtResponse, ListaPtsResponse, PendentesResponse, Pt,
        PtComStatus, TipoPermissao, UltimaPtEmitida,
    },
    storage::PtRepository,
};

/// Numeração usada quando a tabela ainda está vazia. O sufixo de ano das
/// numerações seguintes vem DAQUI, não da data corrente: PTs emitidas depois
/// da virada do ano continuam com "-2025" até a semente ser trocada.
/// Comportamento herdado do sistema original, mantido de propósito.
pub const NUMERACAO_SEMENTE: &str = "061-2025";

#[derive(Clone)]
pub struct PtService {
    pt_repo: PtRepository,
}

impl PtService {
    pub fn new(pt_repo: PtRepository) -> Self {
        Self { pt_repo }
    }

    /// Próxima numeração sequencial: maior prefixo numérico existente + 1,
    /// com zero à esquerda até 3 dígitos e o ano da semente como sufixo.
    /// Numerações vazias são ignoradas; prefixos não numéricos são pulados
    /// com um aviso no log.
    pub fn proxima_numeracao(pts: &[Pt]) -> String {
        let ano = NUMERACAO_SEMENTE
            .split_once('-')
            .map(|(_, ano)| ano)
            .unwrap_or("2025");

        let maior = pts
            .iter()
            .map(|pt| pt.numeracao.as_str())
            .filter(|numeracao| !numeracao.is_empty())
            .filter_map(|numeracao| {
                let prefixo = numeracao.split('-').next().unwrap_or(numeracao);
                match prefixo.trim().parse::<u32>() {
                    Ok(n) => Some(n),
                    Err(_) => {
                        tracing::warn!(
                            "Numeração '{}' com prefixo não numérico ignorada ao gerar a próxima.",
                            numeracao
                        );
                        None
                    }
                }
            })
            .max();

        match maior {
            Some(n) => format!("{:03}-{}", n + 1, ano),
            None => NUMERACAO_SEMENTE.to_string(),
        }
    }

    /// Tabela completa com o status derivado por linha, mais o aviso de
    /// última PT emitida (a última linha do arquivo, quando existe).
    pub async fn listar(&self) -> Result<ListaPtsResponse, AppError> {
        let pts = self.pt_repo.load().await?;

        let ultima_emitida = pts.last().map(|pt| UltimaPtEmitida {
            numeracao: pt.numeracao.clone(),
            data_emissao: pt.data_emissao.clone(),
        });

        let pts = pts
            .into_iter()
            .map(|pt| {
                let status = pt.status();
                PtComStatus { pt, status }
            })
            .collect();

        Ok(ListaPtsResponse { ultima_emitida, pts })
    }

    /// Domínio do seletor de devolução: as numerações cujo status derivado é
    /// pendente. Tabela sem pendências devolve a mensagem informativa no
    /// lugar de um seletor vazio.
    pub async fn pendentes(&self) -> Result<PendentesResponse, AppError> {
        let pts = self.pt_repo.load().await?;

        let pendentes: Vec<String> = pts
            .iter()
            .filter(|pt| !pt.esta_devolvida())
            .map(|pt| pt.numeracao.clone())
            .collect();

        let mensagem = pendentes
            .is_empty()
            .then(|| "Nenhuma PT/PTT pendente para devolução.".to_string());

        Ok(PendentesResponse { pendentes, mensagem })
    }

    /// LÓGICA DE NEGÓCIO: emite uma nova PT/PTT.
    pub async fn emitir(
        &self,
        tipo: TipoPermissao,
        setor: &str,
        solicitante: &str,
        descricao_servico: &str,
    ) -> Result<EmitirPtResponse, AppError> {
        // 1. Carrega a tabela inteira e aloca a próxima numeração
        let mut pts = self.pt_repo.load().await?;
        let numeracao = Self::proxima_numeracao(&pts);

        // 2. Monta o registro novo: datas carimbadas agora, devolução zerada
        let agora = Local::now();
        let nova_pt = Pt {
            numeracao: numeracao.clone(),
            tipo: tipo.as_str().to_string(),
            setor: setor.to_string(),
            solicitante: solicitante.to_string(),
            descricao_servico: descricao_servico.to_string(),
            data_emissao: agora.format("%Y-%m-%d").to_string(),
            devolvida: "Não".to_string(),
            data_devolucao: String::new(),
            recebedor: String::new(),
            tst_resp_liberacao: String::new(),
            ultima_atualizacao: agora.format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        // 3. Anexa e regrava o arquivo inteiro
        pts.push(nova_pt.clone());
        self.pt_repo.save(&pts).await?;

        tracing::info!("PT/PTT {} emitida ({}).", numeracao, nova_pt.tipo);

        Ok(EmitirPtResponse {
            mensagem: format!("✅ PT/PTT {} emitida com sucesso!", numeracao),
            pt: nova_pt,
        })
    }

    /// LÓGICA DE NEGÓCIO: registra a devolução de uma PT/PTT pendente.
    /// Preenche devolvida + data + recebedor + responsável numa única
    /// gravação. "Última Atualização" fica como estava (só a emissão
    /// carimba essa coluna — comportamento herdado, mantido).
    pub async fn devolver(
        &self,
        numeracao: &str,
        recebedor: &str,
        data_devolucao: &str,
        tst_resp_liberacao: &str,
    ) -> Result<DevolverPtResponse, AppError> {
        // 1. Carrega a tabela e localiza o registro pela numeração exata
        let mut pts = self.pt_repo.load().await?;
        let pt = pts
            .iter_mut()
            .find(|pt| pt.numeracao == numeracao)
            .ok_or_else(|| AppError::PtNotFound(numeracao.to_string()))?;

        // 2. Só registros pendentes entram no seletor; reforça aqui também
        if pt.esta_devolvida() {
            return Err(AppError::PtAlreadyReturned(numeracao.to_string()));
        }

        // 3. Os quatro campos de devolução mudam juntos, nada mais
        pt.devolvida = "Sim".to_string();
        pt.data_devolucao = data_devolucao.to_string();
        pt.recebedor = recebedor.to_string();
        pt.tst_resp_liberacao = tst_resp_liberacao.to_string();
        let pt = pt.clone();

        // 4. Regrava o arquivo inteiro
        self.pt_repo.save(&pts).await?;

        tracing::info!("PT/PTT {} devolvida para {}.", numeracao, recebedor);

        Ok(DevolverPtResponse {
            mensagem: format!("✅ PT/PTT {} devolvida com sucesso!", numeracao),
            pt,
        })
    }

    /// Histórico completo serializado no formato do arquivo persistido.
    /// Somente leitura; é o buffer oferecido no botão de download.
    pub async fn exportar(&self) -> Result<Vec<u8>, AppError> {
        let pts = self.pt_repo.load().await?;
        PtRepository::csv_bytes(&pts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn servico_de_teste() -> (TempDir, PtService) {
        let dir = TempDir::new().unwrap();
        let repo = PtRepository::new(dir.path().join("pts_data.csv"));
        (dir, PtService::new(repo))
    }

    fn pt_com_numeracao(numeracao: &str) -> Pt {
        Pt {
            numeracao: numeracao.to_string(),
            tipo: "PT".to_string(),
            setor: "Manutenção".to_string(),
            solicitante: "J. Doe".to_string(),
            descricao_servico: String::new(),
            data_emissao: "2025-06-01".to_string(),
            devolvida: "Não".to_string(),
            data_devolucao: String::new(),
            recebedor: String::new(),
            tst_resp_liberacao: String::new(),
            ultima_atualizacao: "2025-06-01 08:15:00".to_string(),
        }
    }

    #[test]
    fn numeracao_em_tabela_vazia_retorna_a_semente() {
        assert_eq!(PtService::proxima_numeracao(&[]), "061-2025");
    }

    #[test]
    fn numeracao_incrementa_o_maior_prefixo_existente() {
        let pts = vec![
            pt_com_numeracao("061-2025"),
            pt_com_numeracao("062-2025"),
            pt_com_numeracao("065-2025"),
        ];
        assert_eq!(PtService::proxima_numeracao(&pts), "066-2025");
    }

    #[test]
    fn numeracao_mantem_o_ano_da_semente_mesmo_com_outro_ano_na_tabela() {
        let pts = vec![pt_com_numeracao("099-2024")];
        assert_eq!(PtService::proxima_numeracao(&pts), "100-2025");
    }

    #[test]
    fn numeracao_pula_prefixos_nao_numericos_e_valores_vazios() {
        let pts = vec![
            pt_com_numeracao("abc-2025"),
            pt_com_numeracao(""),
            pt_com_numeracao("064-2025"),
        ];
        assert_eq!(PtService::proxima_numeracao(&pts), "065-2025");
    }

    #[test]
    fn numeracao_sem_nenhum_prefixo_valido_volta_para_a_semente() {
        let pts = vec![pt_com_numeracao("abc-2025"), pt_com_numeracao("")];
        assert_eq!(PtService::proxima_numeracao(&pts), "061-2025");
    }

    #[tokio::test]
    async fn emitir_em_tabela_vazia_grava_a_primeira_pt() {
        let (_dir, servico) = servico_de_teste();

        let resposta = servico
            .emitir(TipoPermissao::Pt, "Maintenance", "J. Doe", "")
            .await
            .unwrap();

        assert_eq!(resposta.pt.numeracao, "061-2025");
        assert_eq!(resposta.mensagem, "✅ PT/PTT 061-2025 emitida com sucesso!");

        let pts = servico.pt_repo.load().await.unwrap();
        assert_eq!(pts.len(), 1);
        let pt = &pts[0];
        assert_eq!(pt.numeracao, "061-2025");
        assert_eq!(pt.tipo, "PT");
        assert_eq!(pt.setor, "Maintenance");
        assert_eq!(pt.solicitante, "J. Doe");
        assert_eq!(pt.devolvida, "Não");
        assert_eq!(pt.data_devolucao, "");
        assert_eq!(pt.recebedor, "");
        assert_eq!(pt.tst_resp_liberacao, "");
        assert_eq!(pt.data_emissao, Local::now().format("%Y-%m-%d").to_string());
        assert!(pt.ultima_atualizacao.starts_with(&pt.data_emissao));
    }

    #[tokio::test]
    async fn emitir_duas_vezes_gera_numeracoes_sequenciais() {
        let (_dir, servico) = servico_de_teste();

        let primeira = servico
            .emitir(TipoPermissao::Pt, "Elétrica", "A. Lima", "")
            .await
            .unwrap();
        let segunda = servico
            .emitir(TipoPermissao::Ptt, "Caldeiraria", "M. Souza", "Solda")
            .await
            .unwrap();

        assert_eq!(primeira.pt.numeracao, "061-2025");
        assert_eq!(segunda.pt.numeracao, "062-2025");
        assert_eq!(segunda.pt.tipo, "PTT");
    }

    #[tokio::test]
    async fn devolver_preenche_so_os_campos_de_devolucao() {
        let (_dir, servico) = servico_de_teste();
        let outra = pt_com_numeracao("061-2025");
        let pendente = pt_com_numeracao("062-2025");
        servico
            .pt_repo
            .save(&[outra.clone(), pendente.clone()])
            .await
            .unwrap();

        let resposta = servico
            .devolver("062-2025", "M. Silva", "2025-06-01", "A. Souza")
            .await
            .unwrap();
        assert_eq!(resposta.mensagem, "✅ PT/PTT 062-2025 devolvida com sucesso!");

        let pts = servico.pt_repo.load().await.unwrap();
        assert_eq!(pts.len(), 2);

        // O outro registro fica intocado.
        assert_eq!(pts[0], outra);

        let devolvida = &pts[1];
        assert_eq!(devolvida.devolvida, "Sim");
        assert_eq!(devolvida.data_devolucao, "2025-06-01");
        assert_eq!(devolvida.recebedor, "M. Silva");
        assert_eq!(devolvida.tst_resp_liberacao, "A. Souza");

        // "Última Atualização" não é recarimbada na devolução.
        assert_eq!(devolvida.ultima_atualizacao, pendente.ultima_atualizacao);
        assert_eq!(devolvida.data_emissao, pendente.data_emissao);
        assert_eq!(devolvida.setor, pendente.setor);
    }

    #[tokio::test]
    async fn devolver_numeracao_inexistente_nao_grava_nada() {
        let (_dir, servico) = servico_de_teste();
        servico
            .pt_repo
            .save(&[pt_com_numeracao("061-2025")])
            .await
            .unwrap();
        let antes = std::fs::read(servico.pt_repo.data_file()).unwrap();

        let resultado = servico
            .devolver("099-2025", "M. Silva", "2025-06-01", "A. Souza")
            .await;

        assert!(matches!(resultado, Err(AppError::PtNotFound(n)) if n == "099-2025"));
        let depois = std::fs::read(servico.pt_repo.data_file()).unwrap();
        assert_eq!(antes, depois);
    }

    #[tokio::test]
    async fn devolver_pt_ja_devolvida_e_rejeitada() {
        let (_dir, servico) = servico_de_teste();
        let mut pt = pt_com_numeracao("061-2025");
        pt.devolvida = "Sim".to_string();
        servico.pt_repo.save(&[pt]).await.unwrap();

        let resultado = servico
            .devolver("061-2025", "M. Silva", "2025-06-01", "A. Souza")
            .await;

        assert!(matches!(
            resultado,
            Err(AppError::PtAlreadyReturned(n)) if n == "061-2025"
        ));
    }

    #[tokio::test]
    async fn pendentes_exclui_as_ja_devolvidas() {
        let (_dir, servico) = servico_de_teste();
        let mut devolvida = pt_com_numeracao("061-2025");
        devolvida.devolvida = " Sim ".to_string();
        servico
            .pt_repo
            .save(&[devolvida, pt_com_numeracao("062-2025")])
            .await
            .unwrap();

        let resposta = servico.pendentes().await.unwrap();
        assert_eq!(resposta.pendentes, vec!["062-2025".to_string()]);
        assert!(resposta.mensagem.is_none());
    }

    #[tokio::test]
    async fn pendentes_sem_nenhuma_traz_a_mensagem_informativa() {
        let (_dir, servico) = servico_de_teste();

        let resposta = servico.pendentes().await.unwrap();
        assert!(resposta.pendentes.is_empty());
        assert_eq!(
            resposta.mensagem.as_deref(),
            Some("Nenhuma PT/PTT pendente para devolução.")
        );
    }

    #[tokio::test]
    async fn listar_deriva_o_status_e_aponta_a_ultima_emitida() {
        let (_dir, servico) = servico_de_teste();
        let mut devolvida = pt_com_numeracao("061-2025");
        devolvida.devolvida = "Sim".to_string();
        let mut pendente = pt_com_numeracao("062-2025");
        pendente.data_emissao = "2025-06-02".to_string();
        servico.pt_repo.save(&[devolvida, pendente]).await.unwrap();

        let resposta = servico.listar().await.unwrap();
        assert_eq!(resposta.pts.len(), 2);
        assert_eq!(resposta.pts[0].status.as_str(), "Devolvida");
        assert_eq!(resposta.pts[1].status.as_str(), "Não devolvida");

        let ultima = resposta.ultima_emitida.unwrap();
        assert_eq!(ultima.numeracao, "062-2025");
        assert_eq!(ultima.data_emissao, "2025-06-02");
    }

    #[tokio::test]
    async fn listar_tabela_vazia_nao_tem_ultima_emitida() {
        let (_dir, servico) = servico_de_teste();

        let resposta = servico.listar().await.unwrap();
        assert!(resposta.pts.is_empty());
        assert!(resposta.ultima_emitida.is_none());
    }

    #[tokio::test]
    async fn exportar_reproduz_a_tabela_persistida() {
        let (_dir, servico) = servico_de_teste();
        let pts = vec![pt_com_numeracao("061-2025"), pt_com_numeracao("062-2025")];
        servico.pt_repo.save(&pts).await.unwrap();

        let bytes = servico.exportar().await.unwrap();
        let gravado = std::fs::read(servico.pt_repo.data_file()).unwrap();
        assert_eq!(bytes, gravado);
    }

    #[tokio::test]
    async fn exportar_tabela_vazia_traz_so_o_cabecalho() {
        let (_dir, servico) = servico_de_teste();

        let bytes = servico.exportar().await.unwrap();
        let texto = String::from_utf8(bytes).unwrap();
        assert_eq!(
            texto.trim_end(),
            crate::storage::pt_repo::COLUNAS_OBRIGATORIAS.join(",")
        );
    }
}
