//! End-to-end tests against a live service over HTTP.

use record_ingest_sdk::{ClientError, IngestClient};
use serde_json::json;

mod common;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[tokio::test]
async fn test_reference_scenario() {
    let service = common::start_service().await;
    let client = IngestClient::new(&service.url());

    client
        .send(json!({
            "id": 1001,
            "nome": "Smartphone Galaxy S23",
            "valor": 2999.99,
            "categoria": "Eletrônicos",
            "fornecedor": "Samsung",
            "estoque": 15
        }))
        .await
        .unwrap();
    client
        .send(json!({
            "id": 1002,
            "nome": "Notebook Dell Inspiron",
            "valor": 4599.99,
            "categoria": "Informática"
        }))
        .await
        .unwrap();

    let all = client.list().await.unwrap();
    assert_eq!(all.count, 2);
    let ids: Vec<i64> = all.data.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1002, 1001]);

    let slice = client.by_category("Eletrônicos").await.unwrap();
    assert_eq!(slice.count, 1);
    assert_eq!(slice.data[0].id, 1001);
    assert!(approx(slice.valor_total, 2999.99));

    let stats = client.statistics().await.unwrap();
    assert_eq!(stats.total_registros, 2);
    assert_eq!(stats.total_categorias, 2);
    assert!(approx(stats.valor_total, 7599.98));
    assert!(approx(stats.valor_medio, 3799.99));

    let err = client.get(99999).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let err = client.search("").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_extra_fields_round_trip() {
    let service = common::start_service().await;
    let client = IngestClient::new(&service.url());

    let stored = client
        .send(json!({
            "id": 7,
            "nome": "Mouse Logitech",
            "valor": 149.9,
            "fornecedor": "Logitech",
            "estoque": 40,
            "descricao": "sem fio"
        }))
        .await
        .unwrap();
    assert_eq!(stored.categoria, "uncategorized");
    assert_eq!(stored.extra["fornecedor"], "Logitech");
    assert_eq!(stored.extra["estoque"], 40);

    let fetched = client.get(7).await.unwrap();
    assert_eq!(fetched, stored);
}

#[tokio::test]
async fn test_duplicate_id_replaces_record() {
    let service = common::start_service().await;
    let client = IngestClient::new(&service.url());

    client
        .send(json!({"id": 1, "nome": "Teclado", "valor": 100, "categoria": "Periféricos"}))
        .await
        .unwrap();
    client
        .send(json!({"id": 2, "nome": "Monitor", "valor": 900}))
        .await
        .unwrap();
    client
        .send(json!({"id": 1, "nome": "Teclado Mecânico", "valor": 350}))
        .await
        .unwrap();

    let all = client.list().await.unwrap();
    assert_eq!(all.count, 2);
    assert_eq!(all.data[0].id, 1);
    assert_eq!(all.data[0].nome, "Teclado Mecânico");
    assert_eq!(all.data[0].categoria, "uncategorized");

    let stats = client.statistics().await.unwrap();
    assert_eq!(stats.total_registros, 2);
    assert_eq!(stats.total_categorias, 0);
    assert!(approx(stats.valor_total, 1250.0));
    assert_eq!(service.store.len(), 2);
}

#[tokio::test]
async fn test_invalid_records_are_rejected() {
    let service = common::start_service().await;
    let client = IngestClient::new(&service.url());

    let cases = [
        json!({"nome": "Produto sem ID", "valor": 10}),
        json!({"id": 3, "valor": 10}),
        json!({"id": 3, "nome": "Cabo"}),
        json!({"id": 3, "nome": "Cabo", "valor": "valor_invalido"}),
        json!({"id": 3, "nome": "   ", "valor": 10}),
        json!("not an object"),
    ];
    for case in cases {
        match client.send(case.clone()).await {
            Err(ClientError::Api { status, error }) => {
                assert_eq!(status, 400, "case {case}");
                assert!(!error.is_empty());
            }
            other => panic!("expected 400 for {case}, got {other:?}"),
        }
    }

    assert!(client.list().await.unwrap().data.is_empty());
}

#[tokio::test]
async fn test_numeric_strings_are_accepted() {
    let service = common::start_service().await;
    let client = IngestClient::new(&service.url());

    let stored = client
        .send(json!({"id": "42", "nome": "Fone", "valor": "79.90"}))
        .await
        .unwrap();
    assert_eq!(stored.id, 42);
    assert!(approx(stored.valor, 79.9));
}

#[tokio::test]
async fn test_missing_envelope_and_malformed_json() {
    let service = common::start_service().await;
    let http = reqwest::Client::new();
    let url = format!("{}/api/receive", service.url());

    let res = http
        .post(&url)
        .json(&json!({"id": 1, "nome": "x", "valor": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].is_string());

    let res = http
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    assert!(service.store.is_empty());
}

#[tokio::test]
async fn test_search_and_category_queries() {
    let service = common::start_service().await;
    let client = IngestClient::new(&service.url());

    for (id, nome, categoria) in [
        (1, "Smartphone Galaxy", "Eletrônicos"),
        (2, "Smartwatch", "Eletrônicos"),
        (3, "Notebook", "Informática"),
    ] {
        client
            .send(json!({"id": id, "nome": nome, "valor": 10, "categoria": categoria}))
            .await
            .unwrap();
    }

    let found = client.search("SMART").await.unwrap();
    let ids: Vec<i64> = found.data.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2, 1]);

    assert_eq!(client.search("tablet").await.unwrap().count, 0);

    let latest = client.latest_in_category("Eletrônicos").await.unwrap();
    assert_eq!(latest.id, 2);

    let err = client.latest_in_category("Games").await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let empty = client.by_category("Games").await.unwrap();
    assert_eq!(empty.count, 0);
    assert_eq!(empty.valor_total, 0.0);

    assert_eq!(client.by_category("eletrônicos").await.unwrap().count, 0);
}

#[tokio::test]
async fn test_time_window_queries() {
    let service = common::start_service().await;
    let client = IngestClient::new(&service.url());

    let stored = client
        .send(json!({"id": 10, "nome": "Cadeira", "valor": 500}))
        .await
        .unwrap();

    let recent = client.recent().await.unwrap();
    assert_eq!(recent.count, 1);

    let period = client
        .period(&stored.received_at, &stored.received_at)
        .await
        .unwrap();
    assert_eq!(period.count, 1);

    let period = client
        .period("2000-01-01T00:00:00Z", "2000-01-02T00:00:00Z")
        .await
        .unwrap();
    assert_eq!(period.count, 0);

    let err = client
        .period("2000-01-02T00:00:00Z", "2000-01-01T00:00:00Z")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    let err = client.period("ontem", "hoje").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let service = common::start_service().await;
    let client = IngestClient::new(&service.url());

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));

    let res = reqwest::get(format!("{}/api/desconhecida", service.url()))
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_categories_with_reserved_characters() {
    let service = common::start_service().await;
    let client = IngestClient::new(&service.url());

    let categories = ["Cama/Mesa", "C#", "Promo 50%", "A?b=c"];
    for (id, categoria) in categories.iter().enumerate() {
        client
            .send(json!({"id": id, "nome": "Item", "valor": 5, "categoria": categoria}))
            .await
            .unwrap();
    }

    for (id, categoria) in categories.iter().enumerate() {
        let listing = client.by_category(categoria).await.unwrap();
        assert_eq!(listing.count, 1, "category {categoria:?}");
        assert_eq!(listing.data[0].categoria, *categoria);

        let latest = client.latest_in_category(categoria).await.unwrap();
        assert_eq!(latest.id, id as i64);
    }
}

#[tokio::test]
async fn test_oversized_valor_is_rejected() {
    let service = common::start_service().await;
    let client = IngestClient::new(&service.url());

    let err = client
        .send(json!({"id": 1, "nome": "Imóvel", "valor": 1.0e308, "categoria": "A"}))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    for id in [1, 2] {
        client
            .send(json!({"id": id, "nome": "Imóvel", "valor": 1.0e15, "categoria": "A"}))
            .await
            .unwrap();
    }

    let stats = client.statistics().await.unwrap();
    assert!(approx(stats.valor_total, 2.0e15));
    assert!(approx(stats.valor_medio, 1.0e15));
    assert!(approx(client.by_category("A").await.unwrap().valor_total, 2.0e15));
}
