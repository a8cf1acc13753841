use std::collections::BTreeMap;

use serde::Serialize;

use dbapi_api::{CatalogEntry, RoutineKind};

/// Discoverability page served at `/`.
#[derive(Debug, PartialEq, Serialize)]
pub struct Index {
    pub namespaces_count: usize,
    pub schemas: Vec<String>,
    pub namespaces: Vec<Namespace>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Namespace {
    pub name: String,
    pub functions: Vec<Endpoint>,
    pub views: Vec<Endpoint>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Endpoint {
    pub name: String,
    pub uri: String,
    pub args: String,
}

/// Group catalog entries by schema, schemas sorted by name. Entries keep
/// catalog order within their schema.
pub fn build_index(entries: Vec<CatalogEntry>) -> Index {
    let mut namespaces: BTreeMap<String, Namespace> = BTreeMap::new();
    for entry in entries {
        let endpoint = Endpoint {
            uri: entry.uri(),
            name: entry.name,
            args: entry.args,
        };
        let namespace = namespaces.entry(entry.schema.clone()).or_insert_with(|| Namespace {
            name: entry.schema,
            functions: Vec::new(),
            views: Vec::new(),
        });
        match entry.kind {
            RoutineKind::Function => namespace.functions.push(endpoint),
            RoutineKind::View => namespace.views.push(endpoint),
        }
    }

    Index {
        namespaces_count: namespaces.len(),
        schemas: namespaces.keys().cloned().collect(),
        namespaces: namespaces.into_values().collect(),
    }
}
