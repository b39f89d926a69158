//! Record model and payload validation.
//!
//! # Responsibilities
//! - Turn a raw JSON payload into a validated `NewRecord`
//! - Report precisely which field constraint failed
//! - Carry optional and unknown fields through verbatim

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::store::error::ValidationError;

/// Category rendered for records received without one.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Largest accepted `|valor|`. Sums over any realistic store stay finite.
pub const MAX_VALOR: f64 = 1e15;

/// A validated record that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub id: i64,
    pub nome: String,
    pub valor: f64,
    /// `None` when the producer sent no category.
    pub categoria: Option<String>,
    /// Every other field (`fornecedor`, `estoque`, `descricao`, ...).
    pub extra: Map<String, Value>,
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: i64,
    pub nome: String,
    pub valor: f64,
    #[serde(serialize_with = "serialize_categoria")]
    pub categoria: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub received_at: DateTime<Utc>,
}

impl Record {
    pub(crate) fn stamp(new: NewRecord, received_at: DateTime<Utc>) -> Self {
        Self {
            id: new.id,
            nome: new.nome,
            valor: new.valor,
            categoria: new.categoria,
            extra: new.extra,
            received_at,
        }
    }

    /// Exact, case-sensitive category match. Uncategorized records never match.
    pub fn in_category(&self, categoria: &str) -> bool {
        self.categoria.as_deref() == Some(categoria)
    }

    /// Look up a pass-through field such as `fornecedor` or `estoque`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

fn serialize_categoria<S: Serializer>(
    categoria: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(categoria.as_deref().unwrap_or(UNCATEGORIZED))
}

impl NewRecord {
    /// Validate a producer payload (the object nested under `data`).
    pub fn from_payload(payload: Value) -> Result<Self, ValidationError> {
        let Value::Object(mut fields) = payload else {
            return Err(ValidationError::NotAnObject);
        };

        let id = parse_id(fields.remove("id"))?;
        let nome = parse_nome(fields.remove("nome"))?;
        let valor = parse_valor(fields.remove("valor"))?;
        let categoria = parse_categoria(fields.remove("categoria"))?;

        // Assigned by the store.
        fields.remove("received_at");

        Ok(Self {
            id,
            nome,
            valor,
            categoria,
            extra: fields,
        })
    }
}

fn parse_id(value: Option<Value>) -> Result<i64, ValidationError> {
    let not_an_integer = |found: String| ValidationError::NotAnInteger { field: "id", found };
    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingField("id")),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| not_an_integer(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| not_an_integer(describe(&Value::String(s)))),
        Some(other) => Err(not_an_integer(describe(&other))),
    }
}

fn parse_nome(value: Option<Value>) -> Result<String, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingField("nome")),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::EmptyField("nome")),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ValidationError::NotText {
            field: "nome",
            found: describe(&other),
        }),
    }
}

fn parse_valor(value: Option<Value>) -> Result<f64, ValidationError> {
    let not_a_number = |found: String| ValidationError::NotANumber { field: "valor", found };
    let parsed = match value {
        None | Some(Value::Null) => return Err(ValidationError::MissingField("valor")),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| not_a_number(n.to_string()))?,
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => return Err(not_a_number(describe(&Value::String(s)))),
        },
        Some(other) => return Err(not_a_number(describe(&other))),
    };

    // "NaN" and "inf" parse as f64 but cannot be rendered as JSON numbers.
    if !parsed.is_finite() {
        return Err(not_a_number(parsed.to_string()));
    }
    if parsed.abs() > MAX_VALOR {
        return Err(ValidationError::OutOfRange {
            field: "valor",
            limit: MAX_VALOR,
            found: parsed,
        });
    }
    Ok(parsed)
}

fn parse_categoria(value: Option<Value>) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(ValidationError::NotText {
            field: "categoria",
            found: describe(&other),
        }),
    }
}

/// Short human description of an offending value for diagnostics.
fn describe(value: &Value) -> String {
    const MAX_CHARS: usize = 40;
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > MAX_CHARS => {
            let head: String = s.chars().take(MAX_CHARS).collect();
            format!("\"{head}...\"")
        }
        Value::String(s) => format!("\"{s}\""),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}
