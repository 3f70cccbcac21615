//! Cliente do ciclo de vida dos pedidos de coleta ("agendamentos") do EcoTrash.
//!
//! As regras de quais ações o operador vê ficam em [`services::ciclo_vida`];
//! a API REST fica em [`api`]; os painéis de detalhe e de lista em
//! [`services::painel`].

pub mod api;
pub mod common;
pub mod config;
pub mod middleware;
pub mod models;
pub mod services;

pub use common::error::AppError;
pub use config::{AppConfig, AppState};
