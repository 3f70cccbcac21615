// src/common/error.rs

use thiserror::Error;

// Mensagens genéricas exibidas ao operador quando o backend não devolve uma.
pub const FALHA_ATUALIZAR_STATUS: &str = "Falha ao atualizar status.";
pub const FALHA_CARREGAR_AGENDAMENTO: &str = "Falha ao carregar agendamento.";
pub const FALHA_CARREGAR_LISTA: &str = "Falha ao carregar agendamentos.";
pub const FALHA_EXCLUIR: &str = "Erro ao excluir agendamento.";
pub const AGENDAMENTO_NAO_ENCONTRADO: &str = "Agendamento não encontrado.";
pub const EMPRESA_NAO_ENCONTRADA: &str = "Nenhuma empresa vinculada a este usuário.";

/// Classe do erro, usada para decidir como ele aparece no aviso do painel.
/// Nenhuma delas é fatal para a sessão.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoriaErro {
    /// Recusado localmente, antes de qualquer chamada de rede.
    Validacao,
    /// Falha de transporte ou resposta ilegível.
    Transporte,
    /// Regra de negócio recusada pelo backend.
    Remoto,
    /// Configuração ou credenciais.
    Sessao,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Ação '{acao}' indisponível para o status '{status}'.")]
    AcaoIndisponivel { acao: &'static str, status: String },

    #[error("Data ou hora inválida: {0}")]
    DataHoraInvalida(String),

    #[error("Já existe uma atualização em andamento para o agendamento #{0}.")]
    TransicaoEmAndamento(i64),

    // O backend respondeu com erro. `message` é repassada sem alteração.
    #[error("Erro remoto ({status}): {}", .message.as_deref().unwrap_or("sem mensagem"))]
    Remote { status: u16, message: Option<String> },

    #[error("Erro de transporte: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Resposta inválida do servidor: {0}")]
    RespostaInvalida(String),

    // O caminho fica só no log; o operador vê AGENDAMENTO_NAO_ENCONTRADO.
    #[error("Recurso não encontrado: {0}")]
    NaoEncontrado(String),

    #[error("Nenhuma empresa vinculada ao usuário #{0}")]
    EmpresaNaoEncontrada(i64),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Configuração inválida: {0}")]
    Configuracao(String),

    #[error("Erro interno: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn categoria(&self) -> CategoriaErro {
        match self {
            AppError::ValidationError(_)
            | AppError::AcaoIndisponivel { .. }
            | AppError::DataHoraInvalida(_)
            | AppError::TransicaoEmAndamento(_) => CategoriaErro::Validacao,
            AppError::Remote { .. }
            | AppError::NaoEncontrado(_)
            | AppError::EmpresaNaoEncontrada(_) => CategoriaErro::Remoto,
            AppError::Transport(_)
            | AppError::RespostaInvalida(_)
            | AppError::InternalServerError(_) => CategoriaErro::Transporte,
            AppError::InvalidToken | AppError::JwtError(_) | AppError::Configuracao(_) => {
                CategoriaErro::Sessao
            }
        }
    }

    /// Texto do aviso exibido ao operador.
    ///
    /// Erros remotos com `message` devolvem a mensagem do backend sem nenhuma
    /// alteração. Falhas de transporte (e erros remotos sem corpo) caem no
    /// `fallback` genérico da operação.
    pub fn mensagem_operador(&self, fallback: &str) -> String {
        match self {
            AppError::Remote { message: Some(m), .. } => m.clone(),
            AppError::Remote { message: None, .. }
            | AppError::Transport(_)
            | AppError::RespostaInvalida(_)
            | AppError::InternalServerError(_) => fallback.to_string(),
            AppError::NaoEncontrado(_) => AGENDAMENTO_NAO_ENCONTRADO.to_string(),
            AppError::EmpresaNaoEncontrada(_) => EMPRESA_NAO_ENCONTRADA.to_string(),
            AppError::ValidationError(errors) => {
                // Primeira mensagem declarada nos campos; os detalhes vão para o log.
                errors
                    .field_errors()
                    .values()
                    .flat_map(|errs| errs.iter())
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "Um ou mais campos são inválidos.".to_string())
            }
            outro => outro.to_string(),
        }
    }
}
