// src/services/ciclo_vida.rs
//
// Regras de transição do pedido de coleta do lado do cliente.
// Tudo aqui é puro: decide quais ações aparecem e monta o payload do PATCH.
// Quem garante a transição de verdade é o backend.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use validator::Validate;

use crate::{
    common::error::AppError,
    models::agendamento::{RejeicaoPayload, StatusAgendamento, TransicaoPayload},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acao {
    Aprovar,
    Rejeitar,
    Concluir,
    Cancelar,
}

impl Acao {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acao::Aprovar => "aprovar",
            Acao::Rejeitar => "rejeitar",
            Acao::Concluir => "concluir",
            Acao::Cancelar => "cancelar",
        }
    }

    pub fn status_destino(&self) -> StatusAgendamento {
        match self {
            Acao::Aprovar => StatusAgendamento::Confirmada,
            Acao::Rejeitar => StatusAgendamento::Rejeitada,
            Acao::Concluir => StatusAgendamento::Concluido,
            Acao::Cancelar => StatusAgendamento::Cancelado,
        }
    }
}

/// Conjunto de ações que o operador pode ver para um status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcoesDisponiveis {
    pub aprovar: bool,
    pub rejeitar: bool,
    pub concluir: bool,
    pub cancelar: bool,
}

impl AcoesDisponiveis {
    pub fn nenhuma() -> Self {
        Self::default()
    }

    pub fn permite(&self, acao: Acao) -> bool {
        match acao {
            Acao::Aprovar => self.aprovar,
            Acao::Rejeitar => self.rejeitar,
            Acao::Concluir => self.concluir,
            Acao::Cancelar => self.cancelar,
        }
    }

    pub fn alguma(&self) -> bool {
        self.aprovar || self.rejeitar || self.concluir || self.cancelar
    }
}

/// Calcula as ações a partir apenas do status bruto.
/// Status não reconhecido esconde tudo.
pub fn acoes_disponiveis(status_bruto: &str) -> AcoesDisponiveis {
    let Some(status) = StatusAgendamento::normalizar(status_bruto) else {
        return AcoesDisponiveis::nenhuma();
    };

    let solicitado = status == StatusAgendamento::Solicitado;
    let em_aberto = !status.is_terminal();

    AcoesDisponiveis {
        aprovar: solicitado,
        rejeitar: solicitado,
        concluir: em_aberto,
        cancelar: em_aberto,
    }
}

/// Recusa localmente a ação quando ela não seria oferecida.
pub fn exigir_acao(acao: Acao, status_bruto: &str) -> Result<(), AppError> {
    if acoes_disponiveis(status_bruto).permite(acao) {
        Ok(())
    } else {
        Err(AppError::AcaoIndisponivel {
            acao: acao.as_str(),
            status: status_bruto.to_string(),
        })
    }
}

/// Junta data e hora no fuso local (`2025-06-01` + `14:30` -> `2025-06-01T14:30:00`).
pub fn combinar_data_hora(data: NaiveDate, hora: NaiveTime) -> Result<DateTime<Local>, AppError> {
    let ingenua = data.and_time(hora);
    // Horário inexistente no fuso local (início do horário de verão) é recusado;
    // horário ambíguo fica com a primeira ocorrência.
    Local
        .from_local_datetime(&ingenua)
        .earliest()
        .ok_or_else(|| AppError::DataHoraInvalida(ingenua.to_string()))
}

/// Lê os campos de data (`AAAA-MM-DD`) e hora (`HH:MM`) do formulário de aprovação.
///
/// Só agenda quando os dois estão preenchidos; com um deles vazio a aprovação
/// segue sem data.
pub fn ler_data_hora(data: &str, hora: &str) -> Result<Option<NaiveDateTime>, AppError> {
    let (data, hora) = (data.trim(), hora.trim());
    if data.is_empty() || hora.is_empty() {
        return Ok(None);
    }

    let dia = NaiveDate::parse_from_str(data, "%Y-%m-%d")
        .map_err(|_| AppError::DataHoraInvalida(data.to_string()))?;
    let horario = NaiveTime::parse_from_str(hora, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(hora, "%H:%M:%S"))
        .map_err(|_| AppError::DataHoraInvalida(hora.to_string()))?;

    Ok(Some(dia.and_time(horario)))
}

pub fn payload_aprovacao(
    status_bruto: &str,
    quando: Option<NaiveDateTime>,
) -> Result<TransicaoPayload, AppError> {
    exigir_acao(Acao::Aprovar, status_bruto)?;

    let data_agendada = match quando {
        Some(q) => Some(combinar_data_hora(q.date(), q.time())?),
        None => None,
    };

    Ok(TransicaoPayload {
        status: StatusAgendamento::Confirmada,
        data_agendada,
        justificativa_rejeicao: None,
    })
}

pub fn payload_rejeicao(status_bruto: &str, justificativa: &str) -> Result<TransicaoPayload, AppError> {
    exigir_acao(Acao::Rejeitar, status_bruto)?;

    let rejeicao = RejeicaoPayload {
        justificativa: justificativa.trim().to_string(),
    };
    rejeicao.validate()?;

    Ok(TransicaoPayload {
        status: StatusAgendamento::Rejeitada,
        data_agendada: None,
        justificativa_rejeicao: Some(rejeicao.justificativa),
    })
}

pub fn payload_conclusao(status_bruto: &str) -> Result<TransicaoPayload, AppError> {
    exigir_acao(Acao::Concluir, status_bruto)?;
    Ok(TransicaoPayload::simples(StatusAgendamento::Concluido))
}

pub fn payload_cancelamento(status_bruto: &str) -> Result<TransicaoPayload, AppError> {
    exigir_acao(Acao::Cancelar, status_bruto)?;
    Ok(TransicaoPayload::simples(StatusAgendamento::Cancelado))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERMINAIS: [&str; 3] = ["REJEITADA", "CANCELADO", "CONCLUIDO"];

    #[test]
    fn terminais_nao_oferecem_aprovar_nem_rejeitar() {
        for status in TERMINAIS {
            for variante in [status.to_string(), status.to_lowercase()] {
                let acoes = acoes_disponiveis(&variante);
                assert!(!acoes.aprovar, "{variante}");
                assert!(!acoes.rejeitar, "{variante}");
                assert!(!acoes.concluir, "{variante}");
                assert!(!acoes.cancelar, "{variante}");
            }
        }
    }

    #[test]
    fn nao_terminais_oferecem_concluir() {
        for status in ["SOLICITADO", "PENDENTE", "AGENDADA", "CONFIRMADA", "confirmada"] {
            let acoes = acoes_disponiveis(status);
            assert!(acoes.concluir, "{status}");
            assert!(acoes.cancelar, "{status}");
        }
    }

    #[test]
    fn pendente_equivale_a_solicitado() {
        assert_eq!(acoes_disponiveis("PENDENTE"), acoes_disponiveis("SOLICITADO"));
        assert_eq!(acoes_disponiveis("pendente"), acoes_disponiveis("Solicitado"));
        assert!(acoes_disponiveis("PENDENTE").aprovar);
    }

    #[test]
    fn aprovar_e_rejeitar_so_em_solicitado() {
        for status in ["AGENDADA", "CONFIRMADA"] {
            let acoes = acoes_disponiveis(status);
            assert!(!acoes.aprovar);
            assert!(!acoes.rejeitar);
        }
    }

    #[test]
    fn status_desconhecido_esconde_tudo() {
        for status in ["APROVADA", "EM_ROTA", "", "CONCLUÍDA"] {
            assert!(!acoes_disponiveis(status).alguma(), "{status}");
        }
        assert!(matches!(
            payload_conclusao("EM_ROTA"),
            Err(AppError::AcaoIndisponivel { acao: "concluir", .. })
        ));
    }

    #[test]
    fn aprovacao_combina_data_e_hora_no_fuso_local() {
        let quando = ler_data_hora("2025-06-01", "14:30").unwrap();
        let payload = payload_aprovacao("SOLICITADO", quando).unwrap();

        assert_eq!(payload.status, StatusAgendamento::Confirmada);
        let esperado = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(payload.data_agendada.unwrap().naive_local(), esperado);
    }

    #[test]
    fn aprovacao_sem_data_completa_nao_agenda() {
        assert_eq!(ler_data_hora("2025-06-01", "").unwrap(), None);
        assert_eq!(ler_data_hora("", "14:30").unwrap(), None);

        let payload = payload_aprovacao("pendente", None).unwrap();
        assert_eq!(payload.data_agendada, None);
    }

    #[test]
    fn data_malformada_e_recusada() {
        assert!(matches!(ler_data_hora("01/06/2025", "14:30"), Err(AppError::DataHoraInvalida(_))));
        assert!(matches!(ler_data_hora("2025-06-01", "25:00"), Err(AppError::DataHoraInvalida(_))));
    }

    #[test]
    fn rejeicao_exige_justificativa() {
        assert!(matches!(payload_rejeicao("SOLICITADO", ""), Err(AppError::ValidationError(_))));
        assert!(matches!(payload_rejeicao("SOLICITADO", "   "), Err(AppError::ValidationError(_))));

        let payload = payload_rejeicao("SOLICITADO", " Material fora da lista ").unwrap();
        assert_eq!(payload.status, StatusAgendamento::Rejeitada);
        assert_eq!(payload.justificativa_rejeicao.as_deref(), Some("Material fora da lista"));
    }

    #[test]
    fn rejeicao_em_status_terminal_e_indisponivel() {
        assert!(matches!(
            payload_rejeicao("CONCLUIDO", "motivo"),
            Err(AppError::AcaoIndisponivel { acao: "rejeitar", .. })
        ));
    }
}
