pub mod client;
pub use client::ApiClient;
pub mod agendamento_repo;
pub use agendamento_repo::AgendamentoRepository;
pub mod conta_repo;
pub use conta_repo::ContaRepository;
