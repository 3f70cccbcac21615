// src/services/painel.rs
//
// Estado exibido ao operador. A regra é a mesma nos dois painéis:
// sucesso troca o que está na tela pelo que o servidor devolveu,
// falha mantém a tela como estava e só mostra o aviso. Se a escrita passou
// mas a releitura não, a tela mostra o status enviado com um alerta.

use chrono::NaiveDateTime;

use crate::{
    common::error::{
        AppError, FALHA_ATUALIZAR_STATUS, FALHA_CARREGAR_AGENDAMENTO, FALHA_CARREGAR_LISTA,
        FALHA_EXCLUIR,
    },
    models::agendamento::{Agendamento, EdicaoAdmin, StatusAgendamento},
    services::{
        agendamento_service::{AgendamentoService, Escrita},
        ciclo_vida::{acoes_disponiveis, AcoesDisponiveis},
    },
};

pub const STATUS_ATUALIZADO: &str = "Status atualizado com sucesso.";
pub const AGENDAMENTO_EXCLUIDO: &str = "Agendamento excluído.";
pub const STATUS_ATUALIZADO_SEM_RECARGA: &str =
    "Status atualizado com sucesso, mas não foi possível recarregar os dados.";

/// Aviso (banner) exibido após uma operação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aviso {
    Sucesso(String),
    /// A operação foi aplicada, mas o que está na tela pode estar defasado.
    Alerta(String),
    Erro(String),
}

impl Aviso {
    pub fn texto(&self) -> &str {
        match self {
            Aviso::Sucesso(t) | Aviso::Alerta(t) | Aviso::Erro(t) => t,
        }
    }

    pub fn is_erro(&self) -> bool {
        matches!(self, Aviso::Erro(_))
    }
}

/// Comando disparado por um botão do operador.
#[derive(Debug, Clone)]
pub enum Comando {
    Aprovar { quando: Option<NaiveDateTime> },
    Rejeitar { justificativa: String },
    Concluir,
    Cancelar,
    EditarComoAdmin(EdicaoAdmin),
}

async fn despachar(
    service: &AgendamentoService,
    agendamento: &Agendamento,
    comando: Comando,
) -> Result<Escrita, AppError> {
    match comando {
        Comando::Aprovar { quando } => service.aprovar(agendamento, quando).await,
        Comando::Rejeitar { justificativa } => service.rejeitar(agendamento, &justificativa).await,
        Comando::Concluir => service.concluir(agendamento).await,
        Comando::Cancelar => service.cancelar(agendamento).await,
        Comando::EditarComoAdmin(edicao) => service.editar_como_admin(agendamento, &edicao).await,
    }
}

// =============================================================================
//  DETALHE
// =============================================================================

pub struct PainelDetalhe {
    service: AgendamentoService,
    agendamento: Option<Agendamento>,
    aviso: Option<Aviso>,
    enviando: bool,
    desatualizado: bool,
}

impl PainelDetalhe {
    pub fn new(service: AgendamentoService) -> Self {
        Self {
            service,
            agendamento: None,
            aviso: None,
            enviando: false,
            desatualizado: false,
        }
    }

    pub async fn carregar(&mut self, id: i64) {
        self.aviso = None;
        match self.service.buscar(id).await {
            Ok(agendamento) => {
                self.agendamento = Some(agendamento);
                self.desatualizado = false;
            }
            Err(e) => self.aviso = Some(Aviso::Erro(e.mensagem_operador(FALHA_CARREGAR_AGENDAMENTO))),
        }
    }

    pub fn agendamento(&self) -> Option<&Agendamento> {
        self.agendamento.as_ref()
    }

    pub fn aviso(&self) -> Option<&Aviso> {
        self.aviso.as_ref()
    }

    /// Os botões ficam desabilitados enquanto isto for `true`.
    pub fn enviando(&self) -> bool {
        self.enviando
    }

    /// `true` quando o que está na tela é a cópia local de uma escrita
    /// aceita cuja releitura falhou. `carregar` limpa.
    pub fn desatualizado(&self) -> bool {
        self.desatualizado
    }

    pub fn acoes(&self) -> AcoesDisponiveis {
        match (&self.agendamento, self.enviando) {
            (Some(ag), false) => acoes_disponiveis(&ag.status),
            _ => AcoesDisponiveis::nenhuma(),
        }
    }

    pub async fn executar(&mut self, comando: Comando) {
        let Some(atual) = self.agendamento.clone() else {
            return;
        };

        self.enviando = true;
        self.aviso = None;

        match despachar(&self.service, &atual, comando).await {
            Ok(escrita) => {
                self.desatualizado = !escrita.recarregado();
                self.aviso = Some(if self.desatualizado {
                    Aviso::Alerta(STATUS_ATUALIZADO_SEM_RECARGA.to_string())
                } else {
                    Aviso::Sucesso(STATUS_ATUALIZADO.to_string())
                });
                self.agendamento = Some(escrita.into_agendamento());
            }
            Err(e) => {
                self.aviso = Some(Aviso::Erro(e.mensagem_operador(FALHA_ATUALIZAR_STATUS)));
            }
        }

        self.enviando = false;
    }
}

// =============================================================================
//  LISTA
// =============================================================================

/// Dono da lista: a empresa responsável ou o solicitante.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escopo {
    Empresa(i64),
    Usuario(i64),
}

pub struct PainelLista {
    service: AgendamentoService,
    escopo: Escopo,
    itens: Vec<Agendamento>,
    aviso: Option<Aviso>,
    enviando_id: Option<i64>,
}

impl PainelLista {
    pub fn new(service: AgendamentoService, escopo: Escopo) -> Self {
        Self {
            service,
            escopo,
            itens: Vec::new(),
            aviso: None,
            enviando_id: None,
        }
    }

    pub fn itens(&self) -> &[Agendamento] {
        &self.itens
    }

    pub fn aviso(&self) -> Option<&Aviso> {
        self.aviso.as_ref()
    }

    pub fn enviando_id(&self) -> Option<i64> {
        self.enviando_id
    }

    pub fn acoes(&self, id: i64) -> AcoesDisponiveis {
        if self.enviando_id == Some(id) {
            return AcoesDisponiveis::nenhuma();
        }
        self.itens
            .iter()
            .find(|a| a.id == id)
            .map(|a| acoes_disponiveis(&a.status))
            .unwrap_or_default()
    }

    async fn buscar_lista(&self) -> Result<Vec<Agendamento>, AppError> {
        match self.escopo {
            Escopo::Empresa(id) => self.service.listar_por_empresa(id).await,
            Escopo::Usuario(id) => self.service.listar_por_usuario(id).await,
        }
    }

    pub async fn recarregar(&mut self) {
        match self.buscar_lista().await {
            Ok(itens) => self.itens = itens,
            Err(e) => self.aviso = Some(Aviso::Erro(e.mensagem_operador(FALHA_CARREGAR_LISTA))),
        }
    }

    /// Executa o comando sobre um item e, se der certo, recarrega a lista inteira.
    pub async fn executar(&mut self, id: i64, comando: Comando) {
        let Some(atual) = self.itens.iter().find(|a| a.id == id).cloned() else {
            return;
        };

        self.enviando_id = Some(id);
        self.aviso = None;

        match despachar(&self.service, &atual, comando).await {
            Ok(escrita) => {
                let mut recarregado = escrita.recarregado();
                if let Some(item) = self.itens.iter_mut().find(|a| a.id == id) {
                    *item = escrita.into_agendamento();
                }

                match self.buscar_lista().await {
                    Ok(itens) => self.itens = itens,
                    Err(e) => {
                        tracing::warn!("🔄 Lista não recarregada após atualizar #{}: {}", id, e);
                        recarregado = false;
                    }
                }

                self.aviso = Some(if recarregado {
                    Aviso::Sucesso(STATUS_ATUALIZADO.to_string())
                } else {
                    Aviso::Alerta(STATUS_ATUALIZADO_SEM_RECARGA.to_string())
                });
            }
            Err(e) => {
                self.aviso = Some(Aviso::Erro(e.mensagem_operador(FALHA_ATUALIZAR_STATUS)));
            }
        }

        self.enviando_id = None;
    }

    pub async fn excluir(&mut self, id: i64) {
        self.enviando_id = Some(id);
        self.aviso = None;

        match self.service.excluir(id).await {
            Ok(()) => {
                self.aviso = Some(Aviso::Sucesso(AGENDAMENTO_EXCLUIDO.to_string()));
                self.recarregar().await;
            }
            Err(e) => self.aviso = Some(Aviso::Erro(e.mensagem_operador(FALHA_EXCLUIR))),
        }

        self.enviando_id = None;
    }

    // --- Agrupamentos da tela de coletas ---

    /// Pedidos reconhecidos que ainda não chegaram a um status terminal.
    pub fn em_aberto(&self) -> Vec<&Agendamento> {
        self.filtrar(|s| !s.is_terminal())
    }

    pub fn pendentes(&self) -> Vec<&Agendamento> {
        self.filtrar(|s| s == StatusAgendamento::Solicitado)
    }

    pub fn concluidos(&self) -> Vec<&Agendamento> {
        self.filtrar(|s| s == StatusAgendamento::Concluido)
    }

    /// Já decididos pela empresa: confirmados ou rejeitados.
    pub fn processadas(&self) -> Vec<&Agendamento> {
        self.filtrar(|s| matches!(s, StatusAgendamento::Confirmada | StatusAgendamento::Rejeitada))
    }

    fn filtrar<F>(&self, criterio: F) -> Vec<&Agendamento>
    where
        F: Fn(StatusAgendamento) -> bool,
    {
        self.itens
            .iter()
            .filter(|a| a.situacao().is_some_and(&criterio))
            .collect()
    }
}
