// src/api/conta_repo.rs

use crate::{
    api::client::ApiClient,
    common::error::AppError,
    models::agendamento::{EmpresaResumo, UsuarioResumo},
};

/// Dados da conta logada e das empresas, usados só para descobrir
/// qual lista de agendamentos o operador enxerga.
#[derive(Clone)]
pub struct ContaRepository {
    client: ApiClient,
}

impl ContaRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    // GET /usuarios/me
    pub async fn find_me(&self) -> Result<UsuarioResumo, AppError> {
        self.client.get("/usuarios/me").await
    }

    // GET /empresas
    pub async fn list_empresas(&self) -> Result<Vec<EmpresaResumo>, AppError> {
        self.client.get_lista("/empresas").await
    }
}
