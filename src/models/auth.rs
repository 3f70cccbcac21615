// src/models/auth.rs

use serde::{Deserialize, Serialize};

// Estrutura de dados ("claims") dentro do JWT emitido pelo backend.
// O cliente só lê; a assinatura é responsabilidade do servidor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: i64, // ID do usuário
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_usuario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>, // Expiration time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>, // Issued At
}
