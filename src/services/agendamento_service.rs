// src/services/agendamento_service.rs

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use chrono::{NaiveDateTime, Utc};

use crate::{
    api::{AgendamentoRepository, ContaRepository},
    common::error::AppError,
    middleware::auth::{decodificar_claims, CredentialProvider},
    models::agendamento::{Agendamento, EdicaoAdmin, EmpresaResumo, TransicaoPayload},
    services::ciclo_vida,
};

/// Resultado de uma escrita aceita pelo backend.
///
/// O PATCH já foi aplicado nos dois casos. `RecargaFalhou` carrega a cópia
/// local com o status enviado, para que a tela não volte a oferecer a ação
/// que acabou de ser feita.
#[derive(Debug)]
pub enum Escrita {
    Confirmada(Agendamento),
    RecargaFalhou { agendamento: Agendamento, erro: AppError },
}

impl Escrita {
    pub fn agendamento(&self) -> &Agendamento {
        match self {
            Escrita::Confirmada(agendamento) | Escrita::RecargaFalhou { agendamento, .. } => agendamento,
        }
    }

    pub fn into_agendamento(self) -> Agendamento {
        match self {
            Escrita::Confirmada(agendamento) | Escrita::RecargaFalhou { agendamento, .. } => agendamento,
        }
    }

    pub fn recarregado(&self) -> bool {
        matches!(self, Escrita::Confirmada(_))
    }
}

// Guarda de "uma transição por vez" para cada agendamento.
// O id sai do conjunto quando o guard é descartado, com sucesso ou erro.
#[derive(Clone, Default)]
struct EmAndamento(Arc<Mutex<HashSet<i64>>>);

struct GuardaTransicao {
    ids: Arc<Mutex<HashSet<i64>>>,
    id: i64,
}

impl EmAndamento {
    fn adquirir(&self, id: i64) -> Result<GuardaTransicao, AppError> {
        let mut ids = self
            .0
            .lock()
            .map_err(|_| anyhow::anyhow!("Conjunto de transições em andamento corrompido"))?;

        if !ids.insert(id) {
            tracing::warn!("⏳ Transição duplicada ignorada para o agendamento #{}", id);
            return Err(AppError::TransicaoEmAndamento(id));
        }

        Ok(GuardaTransicao {
            ids: self.0.clone(),
            id,
        })
    }

    fn contem(&self, id: i64) -> bool {
        self.0.lock().map(|ids| ids.contains(&id)).unwrap_or(false)
    }
}

impl Drop for GuardaTransicao {
    fn drop(&mut self) {
        if let Ok(mut ids) = self.ids.lock() {
            ids.remove(&self.id);
        }
    }
}

#[derive(Clone)]
pub struct AgendamentoService {
    repo: AgendamentoRepository,
    conta_repo: ContaRepository,
    em_andamento: EmAndamento,
}

impl AgendamentoService {
    pub fn new(repo: AgendamentoRepository, conta_repo: ContaRepository) -> Self {
        Self {
            repo,
            conta_repo,
            em_andamento: EmAndamento::default(),
        }
    }

    // --- LEITURA ---

    pub async fn buscar(&self, id: i64) -> Result<Agendamento, AppError> {
        self.repo.find_by_id(id).await
    }

    pub async fn listar_por_empresa(&self, empresa_id: i64) -> Result<Vec<Agendamento>, AppError> {
        self.repo.list_by_empresa(empresa_id).await
    }

    pub async fn listar_por_usuario(&self, usuario_id: i64) -> Result<Vec<Agendamento>, AppError> {
        self.repo.list_by_usuario(usuario_id).await
    }

    /// Há uma transição enviada e ainda sem resposta para este id?
    pub fn em_andamento(&self, id: i64) -> bool {
        self.em_andamento.contem(id)
    }

    // --- TRANSIÇÕES ---

    pub async fn aprovar(
        &self,
        agendamento: &Agendamento,
        quando: Option<NaiveDateTime>,
    ) -> Result<Escrita, AppError> {
        let payload = self.validar(agendamento, |s| ciclo_vida::payload_aprovacao(s, quando))?;
        self.enviar_transicao(agendamento, &payload).await
    }

    pub async fn rejeitar(
        &self,
        agendamento: &Agendamento,
        justificativa: &str,
    ) -> Result<Escrita, AppError> {
        let payload = self.validar(agendamento, |s| ciclo_vida::payload_rejeicao(s, justificativa))?;
        self.enviar_transicao(agendamento, &payload).await
    }

    /// Marca como concluída. O backend credita os pontos ao solicitante.
    pub async fn concluir(&self, agendamento: &Agendamento) -> Result<Escrita, AppError> {
        let payload = self.validar(agendamento, ciclo_vida::payload_conclusao)?;
        self.enviar_transicao(agendamento, &payload).await
    }

    pub async fn cancelar(&self, agendamento: &Agendamento) -> Result<Escrita, AppError> {
        let payload = self.validar(agendamento, ciclo_vida::payload_cancelamento)?;
        self.enviar_transicao(agendamento, &payload).await
    }

    /// Edição direta do administrador: sem pré-condição local.
    pub async fn editar_como_admin(
        &self,
        agendamento: &Agendamento,
        edicao: &EdicaoAdmin,
    ) -> Result<Escrita, AppError> {
        let id = agendamento.id;
        tracing::info!("🛠️ Edição administrativa do agendamento #{} para {}", id, edicao.status);
        let _guarda = self.em_andamento.adquirir(id)?;
        self.repo.update_status(id, edicao).await?;

        let mut local = agendamento.clone();
        local.status = edicao.status.as_str().to_string();
        local.data_agendada = edicao.data_agendada;
        local.justificativa_rejeicao = edicao.justificativa_rejeicao.clone();
        Ok(self.recarregar_ou_manter(local).await)
    }

    /// Exclusão administrativa; não passa pelo ciclo de vida.
    pub async fn excluir(&self, id: i64) -> Result<(), AppError> {
        let _guarda = self.em_andamento.adquirir(id)?;
        self.repo.delete(id).await?;
        tracing::info!("🗑️ Agendamento #{} excluído", id);
        Ok(())
    }

    /// Leitura feita logo depois de toda escrita bem-sucedida.
    /// Não há push do servidor: o estado exibido só muda por aqui.
    pub async fn recarregar_apos_escrita(&self, id: i64) -> Result<Agendamento, AppError> {
        self.repo.find_by_id(id).await
    }

    fn validar<F>(&self, agendamento: &Agendamento, montar: F) -> Result<TransicaoPayload, AppError>
    where
        F: FnOnce(&str) -> Result<TransicaoPayload, AppError>,
    {
        montar(agendamento.status.as_str()).inspect_err(|e| {
            tracing::warn!(
                "🚫 Transição recusada localmente para o agendamento #{}: {}",
                agendamento.id,
                e
            );
        })
    }

    async fn enviar_transicao(
        &self,
        agendamento: &Agendamento,
        payload: &TransicaoPayload,
    ) -> Result<Escrita, AppError> {
        let id = agendamento.id;
        let _guarda = self.em_andamento.adquirir(id)?;

        if let Err(e) = self.repo.update_status(id, payload).await {
            match &e {
                AppError::Remote { status, .. } => {
                    tracing::warn!("⚠️ Backend recusou a transição de #{} ({}): {}", id, status, e)
                }
                _ => tracing::error!("🔥 Falha ao enviar transição de #{}: {}", id, e),
            }
            return Err(e);
        }

        tracing::info!("✅ Agendamento #{} atualizado para {}", id, payload.status);

        let mut local = agendamento.clone();
        local.status = payload.status.as_str().to_string();
        if let Some(quando) = payload.data_agendada {
            local.data_agendada = Some(quando.with_timezone(&Utc));
        }
        if let Some(justificativa) = &payload.justificativa_rejeicao {
            local.justificativa_rejeicao = Some(justificativa.clone());
        }
        Ok(self.recarregar_ou_manter(local).await)
    }

    // A escrita já foi aceita: uma falha aqui não pode virar erro da transição.
    async fn recarregar_ou_manter(&self, local: Agendamento) -> Escrita {
        match self.recarregar_apos_escrita(local.id).await {
            Ok(agendamento) => Escrita::Confirmada(agendamento),
            Err(erro) => {
                tracing::warn!(
                    "🔄 Agendamento #{} atualizado, mas a releitura falhou: {}",
                    local.id,
                    erro
                );
                Escrita::RecargaFalhou { agendamento: local, erro }
            }
        }
    }

    // --- OPERADOR ---

    /// Descobre a empresa operada pelo usuário logado.
    ///
    /// Usa `/usuarios/me`; se falhar, cai para o `id` do JWT. Depois procura
    /// em `/empresas` a que tem `usuarioId` igual.
    pub async fn resolver_empresa_do_operador(&self) -> Result<EmpresaResumo, AppError> {
        let usuario_id = match self.conta_repo.find_me().await {
            Ok(usuario) => usuario.id,
            Err(e) => {
                tracing::warn!("/usuarios/me indisponível ({}), lendo o id do token", e);
                let token = self
                    .conta_repo
                    .client()
                    .credentials()
                    .bearer_token()
                    .ok_or(AppError::InvalidToken)?;
                decodificar_claims(&token)?.id
            }
        };

        self.conta_repo
            .list_empresas()
            .await?
            .into_iter()
            .find(|empresa| {
                empresa.usuario_id.as_ref().and_then(|u| u.as_i64()) == Some(usuario_id)
            })
            .ok_or(AppError::EmpresaNaoEncontrada(usuario_id))
    }
}
