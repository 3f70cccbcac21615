// src/api/client.rs

use std::{sync::Arc, time::Duration};

use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    common::error::AppError,
    middleware::auth::{aplicar_bearer, CredentialProvider},
};

// Envelope padrão das respostas de sucesso: { "data": ... }
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

// Corpo de erro do backend: { "message": "..." }
#[derive(Debug, Deserialize)]
struct CorpoErro {
    message: Option<String>,
}

/// Cliente HTTP base da API do EcoTrash. Clonar é barato.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Option<Duration>,
    ) -> Result<Self, AppError> {
        // Sem timeout próprio: fica o padrão do transporte, a menos que configurado.
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &dyn CredentialProvider {
        self.credentials.as_ref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        aplicar_bearer(self.http.request(method, url), self.credentials.as_ref())
    }

    /// GET que devolve `data` obrigatório.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.request(Method::GET, path).send().await?;
        let envelope: Envelope<T> = Self::ler_corpo(response).await?;
        envelope
            .data
            .ok_or_else(|| AppError::NaoEncontrado(path.to_string()))
    }

    /// GET de lista. `data` ausente ou que não seja um array vira lista vazia.
    /// Um elemento malformado é descartado sem derrubar os outros.
    pub async fn get_lista<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, AppError> {
        let response = self.request(Method::GET, path).send().await?;
        let envelope: Envelope<serde_json::Value> = Self::ler_corpo(response).await?;

        let elementos = match envelope.data {
            Some(serde_json::Value::Array(elementos)) => elementos,
            _ => return Ok(Vec::new()),
        };

        let total = elementos.len();
        let itens: Vec<T> = elementos
            .into_iter()
            .enumerate()
            .filter_map(|(i, elemento)| match serde_json::from_value(elemento) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!("⚠️ Elemento {} de {} ignorado: {}", i, path, e);
                    None
                }
            })
            .collect();

        if itens.len() < total {
            tracing::warn!("{} de {} elementos de {} descartados", total - itens.len(), total, path);
        }
        Ok(itens)
    }

    /// PATCH com corpo JSON. O corpo da resposta é descartado; quem chama
    /// recarrega o recurso.
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let response = self.request(Method::PATCH, path).json(body).send().await?;
        Self::verificar_status(response).await.map(|_| ())
    }

    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        let response = self.request(Method::DELETE, path).send().await?;
        Self::verificar_status(response).await.map(|_| ())
    }

    async fn ler_corpo<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
        let response = Self::verificar_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::RespostaInvalida(e.to_string()))
    }

    // Converte respostas não-2xx em AppError::Remote, preservando a `message`.
    async fn verificar_status(response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let texto = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<CorpoErro>(&texto)
            .ok()
            .and_then(|corpo| corpo.message);

        tracing::debug!("Resposta de erro {} do backend: {}", status, texto);

        Err(AppError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}
