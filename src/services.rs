pub mod agendamento_service;
pub use agendamento_service::{AgendamentoService, Escrita};
pub mod ciclo_vida;
pub mod painel;
