pub mod agendamento;
pub mod auth;
