// Backend falso da API EcoTrash para os testes de integração.
#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};

use ecotrash_coletas::{
    middleware::auth::{CredentialProvider, TokenFixo},
    AppConfig, AppState,
};

#[derive(Default)]
pub struct Backend {
    pub agendamentos: Mutex<BTreeMap<i64, Value>>,
    pub empresas: Mutex<Vec<Value>>,
    pub me: Mutex<Option<Value>>,
    pub requisicoes: AtomicUsize,
    pub patches: Mutex<Vec<(i64, Value)>>,
    pub autorizacoes: Mutex<Vec<Option<String>>>,
    // (status HTTP, corpo) devolvido por todo PATCH enquanto estiver definido
    pub falha_patch: Mutex<Option<(u16, Value)>>,
    pub atraso_patch: Mutex<Option<Duration>>,
    // Leituras (detalhe e listas) respondem 502 depois que algum PATCH chegou
    pub leitura_falha_apos_patch: AtomicBool,
}

impl Backend {
    pub fn inserir(&self, agendamento: Value) {
        let id = agendamento["id"].as_i64().expect("agendamento sem id");
        self.agendamentos.lock().unwrap().insert(id, agendamento);
    }

    pub fn requisicoes(&self) -> usize {
        self.requisicoes.load(Ordering::SeqCst)
    }

    pub fn falhar_patch(&self, status: u16, corpo: Value) {
        *self.falha_patch.lock().unwrap() = Some((status, corpo));
    }

    pub fn falhar_leituras_apos_patch(&self) {
        self.leitura_falha_apos_patch.store(true, Ordering::SeqCst);
    }

    fn leitura_indisponivel(&self) -> Option<Response> {
        let ativo = self.leitura_falha_apos_patch.load(Ordering::SeqCst)
            && !self.patches.lock().unwrap().is_empty();
        ativo.then(|| {
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "message": "Serviço temporariamente indisponível." })),
            )
                .into_response()
        })
    }

    pub fn status_de(&self, id: i64) -> String {
        self.agendamentos.lock().unwrap()[&id]["status"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub fn ultimo_patch(&self) -> Option<(i64, Value)> {
        self.patches.lock().unwrap().last().cloned()
    }
}

type Shared = Arc<Backend>;

fn nao_encontrado() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Agendamento não encontrado." })),
    )
        .into_response()
}

async fn contar(State(backend): State<Shared>, request: Request, next: Next) -> Response {
    backend.requisicoes.fetch_add(1, Ordering::SeqCst);
    let auth = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    backend.autorizacoes.lock().unwrap().push(auth);
    next.run(request).await
}

async fn get_agendamento(State(backend): State<Shared>, Path(id): Path<i64>) -> Response {
    if let Some(falha) = backend.leitura_indisponivel() {
        return falha;
    }
    match backend.agendamentos.lock().unwrap().get(&id) {
        Some(ag) => Json(json!({ "data": ag })).into_response(),
        None => nao_encontrado(),
    }
}

async fn delete_agendamento(State(backend): State<Shared>, Path(id): Path<i64>) -> Response {
    match backend.agendamentos.lock().unwrap().remove(&id) {
        Some(_) => Json(json!({ "data": null })).into_response(),
        None => nao_encontrado(),
    }
}

async fn patch_status(
    State(backend): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    backend.patches.lock().unwrap().push((id, body.clone()));

    let atraso = *backend.atraso_patch.lock().unwrap();
    if let Some(atraso) = atraso {
        tokio::time::sleep(atraso).await;
    }

    let falha = backend.falha_patch.lock().unwrap().clone();
    if let Some((status, corpo)) = falha {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, Json(corpo)).into_response();
    }

    let mut agendamentos = backend.agendamentos.lock().unwrap();
    let Some(ag) = agendamentos.get_mut(&id) else {
        return nao_encontrado();
    };
    for campo in ["status", "dataAgendada", "justificativaRejeicao"] {
        if let Some(valor) = body.get(campo) {
            ag[campo] = valor.clone();
        }
    }
    Json(json!({ "data": ag.clone() })).into_response()
}

fn filtrar(backend: &Backend, dono: &str, id: i64) -> Vec<Value> {
    backend
        .agendamentos
        .lock()
        .unwrap()
        .values()
        .filter(|ag| ag[dono]["id"].as_i64() == Some(id))
        .cloned()
        .collect()
}

async fn list_por_empresa(State(backend): State<Shared>, Path(id): Path<i64>) -> Response {
    if let Some(falha) = backend.leitura_indisponivel() {
        return falha;
    }
    Json(json!({ "data": filtrar(&backend, "empresaResponsavel", id) })).into_response()
}

async fn list_por_usuario(State(backend): State<Shared>, Path(id): Path<i64>) -> Response {
    if let Some(falha) = backend.leitura_indisponivel() {
        return falha;
    }
    Json(json!({ "data": filtrar(&backend, "solicitante", id) })).into_response()
}

async fn get_me(State(backend): State<Shared>) -> Response {
    match backend.me.lock().unwrap().clone() {
        Some(me) => Json(json!({ "data": me })).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Não autenticado." })),
        )
            .into_response(),
    }
}

async fn list_empresas(State(backend): State<Shared>) -> Json<Value> {
    let empresas = backend.empresas.lock().unwrap().clone();
    Json(json!({ "data": empresas }))
}

pub async fn iniciar_backend() -> (Shared, SocketAddr) {
    let backend: Shared = Arc::new(Backend::default());

    let app = Router::new()
        .route(
            "/agendamentos/{id}",
            get(get_agendamento).delete(delete_agendamento),
        )
        .route("/agendamentos/{id}/status", patch(patch_status))
        .route("/empresas", get(list_empresas))
        .route("/empresas/{id}/agendamentos", get(list_por_empresa))
        .route("/usuarios/me", get(get_me))
        .route("/usuarios/{id}/agendamentos", get(list_por_usuario))
        .layer(middleware::from_fn_with_state(backend.clone(), contar))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("servidor falso");
    });

    (backend, addr)
}

pub fn estado_para(addr: SocketAddr, token: Option<&str>) -> AppState {
    let config = AppConfig {
        api_url: format!("http://{}/", addr),
        api_token: token.map(str::to_string),
        http_timeout: Some(Duration::from_secs(5)),
    };
    let credentials: Arc<dyn CredentialProvider> = Arc::new(TokenFixo(config.api_token.clone()));
    AppState::new(config, credentials).expect("estado")
}

pub fn agendamento_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "status": status,
        "solicitante": { "id": 10, "nome": "Maria Souza", "email": "maria@exemplo.com" },
        "empresaResponsavel": { "id": 3, "nomeFantasia": "Recicla Já" },
        "enderecoColeta": {
            "logradouro": "Rua das Flores",
            "numero": "120",
            "bairro": "Centro",
            "cidade": "Campinas",
            "estado": "SP",
            "cep": "13010-000"
        },
        "itens": [
            { "id": 1, "tipoResiduoId": 4, "quantidade": 2, "tipoResiduo": { "id": 4, "nome": "Monitor" } },
            { "id": 2, "tipoResiduoId": 7, "quantidade": 1 }
        ],
        "dataSolicitacao": "2025-05-20T13:00:00Z"
    })
}
