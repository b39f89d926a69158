//! Aggregates over stored records.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::store::record::Record;

/// Store-wide aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub total_registros: usize,
    /// Distinct non-empty categories; uncategorized records do not count.
    pub total_categorias: usize,
    /// `valor_total / total_registros`, or 0 for an empty store.
    pub valor_medio: f64,
    pub valor_total: f64,
}

impl Statistics {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut total_registros = 0usize;
        let mut valor_total = 0.0f64;
        let mut categorias = HashSet::new();

        for record in records {
            total_registros += 1;
            valor_total += record.valor;
            if let Some(categoria) = record.categoria.as_deref() {
                categorias.insert(categoria);
            }
        }

        let valor_medio = if total_registros == 0 {
            0.0
        } else {
            valor_total / total_registros as f64
        };

        Self {
            total_registros,
            total_categorias: categorias.len(),
            valor_medio,
            valor_total,
        }
    }
}

/// Records of one category plus the sum of their `valor`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategorySlice {
    pub records: Vec<Record>,
    pub valor_total: f64,
}

impl CategorySlice {
    pub fn new(records: Vec<Record>) -> Self {
        let valor_total = records.iter().map(|r| r.valor).sum();
        Self { records, valor_total }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }
}
