use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Identity & Session ---

/// SessionRecord
///
/// The persisted snapshot of the identity claims the last login produced. `claims` is kept
/// opaque: only the claims accessor knows which entries carry the email and the roles.
/// `raw` is the exact serialized form stored under the `usuario` key. `loaded_at` is when
/// this process built the record from a login or a store read; it is not persisted and does
/// not take part in equality.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionRecord {
    #[schema(value_type = Object)]
    pub claims: Map<String, Value>,
    pub raw: String,
    pub loaded_at: DateTime<Utc>,
}

impl PartialEq for SessionRecord {
    fn eq(&self, other: &Self) -> bool {
        self.claims == other.claims && self.raw == other.raw
    }
}

impl SessionRecord {
    /// Builds a record from decoded claims, serializing them into `raw`.
    pub fn from_claims(claims: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let raw = serde_json::to_string(&claims)?;
        Ok(Self {
            claims,
            raw,
            loaded_at: Utc::now(),
        })
    }

    /// Rebuilds a record from its stored serialized form.
    pub fn from_raw(raw: &str) -> Result<Self, serde_json::Error> {
        let claims: Map<String, Value> = serde_json::from_str(raw)?;
        Ok(Self {
            claims,
            raw: raw.to_string(),
            loaded_at: Utc::now(),
        })
    }
}

/// SessionSummary
///
/// What the dashboard needs to know about the active identity (GET /session/me).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct SessionSummary {
    pub email: Option<String>,
    pub role: Option<String>,
    pub roles: Vec<String>,
}

// --- Branch Directory Payloads ---

/// BranchRef
///
/// The nested branch ("sucursal") reference inside an employee record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct BranchRef {
    pub id: i64,
    #[serde(default)]
    pub nombre: Option<String>,
}

/// Empleado
///
/// Employee record returned by `GET /empleado/findByEmail`. Only the fields the gate reads
/// are modelled; everything else in the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct Empleado {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub sucursal: Option<BranchRef>,
}

impl Empleado {
    pub fn branch_id(&self) -> Option<i64> {
        self.sucursal.as_ref().map(|s| s.id)
    }
}

// --- Navigation ---

/// RedirectReason
///
/// Why a navigation was sent elsewhere.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RedirectReason {
    NoSession,
    RoleNotPermitted,
    UnknownRoute,
}

/// BlockAction
///
/// The one thing acknowledging a blocking error is allowed to do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BlockAction {
    Logout,
}

/// GuardDecision
///
/// The declarative outcome of one guarded navigation. The dashboard renders the view,
/// follows the redirect, or shows a modal whose confirmation triggers `on_acknowledge`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum GuardDecision {
    Render {
        view: String,
    },
    Redirect {
        to: String,
        reason: RedirectReason,
    },
    Block {
        title: String,
        message: String,
        on_acknowledge: BlockAction,
    },
}

impl GuardDecision {
    pub fn is_render(&self) -> bool {
        matches!(self, GuardDecision::Render { .. })
    }

    pub fn is_block(&self) -> bool {
        matches!(self, GuardDecision::Block { .. })
    }
}

/// NavigationResponse
///
/// Decision for a navigation plus the generation it was committed under.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct NavigationResponse {
    pub generation: u64,
    pub path: String,
    pub decision: GuardDecision,
}

/// LogoutResponse
///
/// Where the dashboard goes once the session has been cleared.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct LogoutResponse {
    pub redirect: String,
    pub federated_logout_url: Option<String>,
}

/// MenuEntry
///
/// One sidebar entry visible to the active role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[ts(export)]
pub struct MenuEntry {
    pub label: String,
    pub path: String,
}

// --- Catalogue shapes used by the client-side filters ---

/// Categoria
///
/// Category with its nested sub-categories. Sub-categories are listed both nested and at
/// top level in the API response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Categoria {
    pub id: i64,
    pub denominacion: String,
    #[serde(default)]
    pub es_insumo: bool,
    #[serde(default)]
    pub sub_categorias: Vec<Categoria>,
}

/// Producto
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Producto {
    pub id: i64,
    pub denominacion: String,
    #[serde(default)]
    pub descripcion: String,
}

/// Promocion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Promocion {
    pub id: i64,
    pub denominacion: String,
}
