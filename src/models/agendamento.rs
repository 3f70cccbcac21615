// src/models/agendamento.rs

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use validator::Validate;

// --- Enums ---

/// Status conhecidos de um pedido de coleta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusAgendamento {
    Solicitado,
    Agendada,
    Confirmada,
    Rejeitada,
    Cancelado,
    Concluido,
}

impl StatusAgendamento {
    pub const TODOS: [StatusAgendamento; 6] = [
        StatusAgendamento::Solicitado,
        StatusAgendamento::Agendada,
        StatusAgendamento::Confirmada,
        StatusAgendamento::Rejeitada,
        StatusAgendamento::Cancelado,
        StatusAgendamento::Concluido,
    ];

    /// Única normalização do status vindo do backend.
    ///
    /// Comparação exata sem diferenciar maiúsculas de minúsculas, aceitando o
    /// sinônimo legado `PENDENTE` para `SOLICITADO`. Qualquer outro valor
    /// devolve `None` e o pedido fica sem nenhuma ação disponível.
    pub fn normalizar(bruto: &str) -> Option<Self> {
        match bruto.to_uppercase().as_str() {
            "SOLICITADO" | "PENDENTE" => Some(Self::Solicitado),
            "AGENDADA" => Some(Self::Agendada),
            "CONFIRMADA" => Some(Self::Confirmada),
            "REJEITADA" => Some(Self::Rejeitada),
            "CANCELADO" => Some(Self::Cancelado),
            "CONCLUIDO" => Some(Self::Concluido),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solicitado => "SOLICITADO",
            Self::Agendada => "AGENDADA",
            Self::Confirmada => "CONFIRMADA",
            Self::Rejeitada => "REJEITADA",
            Self::Cancelado => "CANCELADO",
            Self::Concluido => "CONCLUIDO",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejeitada | Self::Cancelado | Self::Concluido)
    }

    /// `CONFIRMADA` ou depois (onde a data agendada tem significado).
    pub fn ja_confirmado(&self) -> bool {
        matches!(self, Self::Confirmada | Self::Concluido)
    }
}

impl fmt::Display for StatusAgendamento {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Campo que o backend manda ora como texto, ora como número
/// (`"numero": "120"` ou `"numero": 120`). Reexibido do jeito que veio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextoOuNumero {
    Texto(String),
    Numero(serde_json::Number),
}

impl TextoOuNumero {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TextoOuNumero::Texto(t) => t.trim().parse().ok(),
            TextoOuNumero::Numero(n) => n.as_i64(),
        }
    }
}

impl fmt::Display for TextoOuNumero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextoOuNumero::Texto(t) => f.write_str(t),
            TextoOuNumero::Numero(n) => write!(f, "{}", n),
        }
    }
}

// --- Structs de leitura (somente leitura do ponto de vista do cliente) ---
//
// Todas guardam em `extras` as chaves que não declaram, para que reexibir
// o recurso devolva exatamente o que o servidor mandou.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solicitante {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaResponsavel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome_fantasia: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub razao_social: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl EmpresaResponsavel {
    pub fn nome_exibicao(&self) -> Option<&str> {
        self.nome_fantasia.as_deref().or(self.razao_social.as_deref())
    }
}

/// Endereço copiado no momento da criação do pedido. Nunca muda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnderecoColeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logradouro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero: Option<TextoOuNumero>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bairro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cep: Option<TextoOuNumero>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipoResiduoResumo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAgendamento {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub tipo_residuo_id: i64,
    pub quantidade: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_residuo: Option<TipoResiduoResumo>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

/// Pedido de coleta ("agendamento") como devolvido por `GET /agendamentos/:id`.
///
/// `status` guarda a string exatamente como veio do servidor, para que
/// reexibir o recurso não altere nada; a interpretação passa sempre por
/// [`Agendamento::situacao`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agendamento {
    pub id: i64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solicitante: Option<Solicitante>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empresa_responsavel: Option<EmpresaResponsavel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endereco_coleta: Option<EnderecoColeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_agendada: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justificativa_rejeicao: Option<String>,
    #[serde(default)]
    pub itens: Vec<ItemAgendamento>,
    // O backend às vezes manda em snake_case.
    #[serde(default, alias = "data_solicitacao", skip_serializing_if = "Option::is_none")]
    pub data_solicitacao: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observacoes_usuario: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl Agendamento {
    pub fn situacao(&self) -> Option<StatusAgendamento> {
        StatusAgendamento::normalizar(&self.status)
    }

    /// Data agendada, somente quando o status já é `CONFIRMADA` ou posterior.
    pub fn data_agendada_vigente(&self) -> Option<DateTime<Utc>> {
        match self.situacao() {
            Some(s) if s.ja_confirmado() => self.data_agendada,
            _ => None,
        }
    }

    /// Justificativa, somente quando o status é `REJEITADA`.
    pub fn justificativa_vigente(&self) -> Option<&str> {
        match self.situacao() {
            Some(StatusAgendamento::Rejeitada) => self.justificativa_rejeicao.as_deref(),
            _ => None,
        }
    }
}

// --- Payloads de transição ---

/// Corpo de `PATCH /agendamentos/:id/status` para as ações do operador.
/// Campos opcionais ausentes não são enviados.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransicaoPayload {
    pub status: StatusAgendamento,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_agendada: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justificativa_rejeicao: Option<String>,
}

impl TransicaoPayload {
    pub fn simples(status: StatusAgendamento) -> Self {
        Self {
            status,
            data_agendada: None,
            justificativa_rejeicao: None,
        }
    }
}

#[derive(Debug, Validate)]
pub struct RejeicaoPayload {
    #[validate(length(min = 1, message = "Informe a justificativa para rejeitar."))]
    pub justificativa: String,
}

/// Edição direta feita pelo administrador: qualquer status de destino,
/// sem pré-condição. Os opcionais vão como `null` quando ausentes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdicaoAdmin {
    pub status: StatusAgendamento,
    pub data_agendada: Option<DateTime<Utc>>,
    pub justificativa_rejeicao: Option<String>,
}

// --- Conta / empresa (resolução do operador logado) ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioResumo {
    pub id: i64,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tipo_usuario: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaResumo {
    pub id: i64,
    #[serde(default)]
    pub usuario_id: Option<TextoOuNumero>,
    #[serde(default)]
    pub nome_fantasia: Option<String>,
    #[serde(default)]
    pub razao_social: Option<String>,
}
