// src/api/agendamento_repo.rs

use serde::Serialize;

use crate::{
    api::client::ApiClient,
    common::error::AppError,
    models::agendamento::Agendamento,
};

/// Acesso aos endpoints de agendamentos da API REST.
#[derive(Clone)]
pub struct AgendamentoRepository {
    client: ApiClient,
}

impl AgendamentoRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    // GET /agendamentos/:id
    pub async fn find_by_id(&self, id: i64) -> Result<Agendamento, AppError> {
        self.client.get(&format!("/agendamentos/{}", id)).await
    }

    // GET /empresas/:id/agendamentos
    pub async fn list_by_empresa(&self, empresa_id: i64) -> Result<Vec<Agendamento>, AppError> {
        self.client
            .get_lista(&format!("/empresas/{}/agendamentos", empresa_id))
            .await
    }

    // GET /usuarios/:id/agendamentos
    pub async fn list_by_usuario(&self, usuario_id: i64) -> Result<Vec<Agendamento>, AppError> {
        self.client
            .get_lista(&format!("/usuarios/{}/agendamentos", usuario_id))
            .await
    }

    // PATCH /agendamentos/:id/status
    pub async fn update_status<B>(&self, id: i64, body: &B) -> Result<(), AppError>
    where
        B: Serialize + ?Sized,
    {
        self.client
            .patch(&format!("/agendamentos/{}/status", id), body)
            .await
    }

    // DELETE /agendamentos/:id (admin; fora do ciclo de vida)
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.client.delete(&format!("/agendamentos/{}", id)).await
    }
}
