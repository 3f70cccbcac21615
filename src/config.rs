// src/config.rs

use std::{env, sync::Arc, sync::Once, time::Duration};

use tracing_subscriber::EnvFilter;

use crate::{
    api::{AgendamentoRepository, ApiClient, ContaRepository},
    common::error::AppError,
    middleware::auth::{CredentialProvider, TokenFixo},
    services::agendamento_service::AgendamentoService,
};

pub const API_URL_PADRAO: &str = "http://localhost:3333";

static TRACING: Once = Once::new();

/// Inicializa o logger (uma vez só, pode ser chamado de vários lugares).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init();
    });
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub api_token: Option<String>,
    pub http_timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: API_URL_PADRAO.to_string(),
            api_token: None,
            http_timeout: None,
        }
    }
}

impl AppConfig {
    /// Lê `ECOTRASH_API_URL`, `ECOTRASH_API_TOKEN` e `ECOTRASH_HTTP_TIMEOUT_SECS`.
    /// O arquivo `.env` é opcional.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_url = env::var("ECOTRASH_API_URL").unwrap_or_else(|_| API_URL_PADRAO.to_string());
        let api_token = env::var("ECOTRASH_API_TOKEN").ok().filter(|t| !t.is_empty());

        let http_timeout = match env::var("ECOTRASH_HTTP_TIMEOUT_SECS") {
            Ok(valor) => {
                let secs: u64 = valor.parse().map_err(|_| {
                    anyhow::anyhow!("ECOTRASH_HTTP_TIMEOUT_SECS deve ser um inteiro, veio '{}'", valor)
                })?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            api_url,
            api_token,
            http_timeout,
        })
    }

    /// Credencial padrão: o token da configuração (ou nenhum).
    pub fn credenciais(&self) -> Arc<dyn CredentialProvider> {
        Arc::new(TokenFixo(self.api_token.clone()))
    }
}

// O estado compartilhado que a interface usa para falar com o backend
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub agendamento_service: AgendamentoService,
}

impl AppState {
    pub fn new(config: AppConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self, AppError> {
        if !config.api_url.starts_with("http://") && !config.api_url.starts_with("https://") {
            return Err(AppError::Configuracao(format!(
                "URL da API inválida: {}",
                config.api_url
            )));
        }

        // --- Monta o gráfico de dependências ---
        let client = ApiClient::new(&config.api_url, credentials, config.http_timeout)?;
        let agendamento_repo = AgendamentoRepository::new(client.clone());
        let conta_repo = ContaRepository::new(client);
        let agendamento_service = AgendamentoService::new(agendamento_repo, conta_repo);

        tracing::info!("✅ Cliente da API EcoTrash configurado para {}", config.api_url);

        Ok(Self {
            config,
            agendamento_service,
        })
    }

    /// Carrega tudo do ambiente, com a credencial fixa da configuração,
    /// e liga o logger.
    pub fn from_env() -> anyhow::Result<Self> {
        init_tracing();
        let config = AppConfig::from_env()?;
        let credentials = config.credenciais();
        Ok(Self::new(config, credentials)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_sem_esquema_e_recusada() {
        let config = AppConfig {
            api_url: "localhost:3333".to_string(),
            ..AppConfig::default()
        };
        let credentials = config.credenciais();
        assert!(matches!(
            AppState::new(config, credentials),
            Err(AppError::Configuracao(_))
        ));
    }

    #[test]
    fn padrao_aponta_para_backend_local() {
        let config = AppConfig::default();
        assert_eq!(config.api_url, API_URL_PADRAO);
        assert!(config.credenciais().bearer_token().is_none());
    }
}
