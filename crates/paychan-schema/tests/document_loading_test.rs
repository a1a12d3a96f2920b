//! Integration tests for API document loading
//!
//! Documents are written to temporary files and loaded the way an
//! uploaded document would be.

use paychan_ir::Value;
use paychan_schema::{ApiDocument, DocumentKind, Error, FieldCatalog, load_value};
use std::io::Write;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const SWAGGER_YAML: &str = r"
swagger: '2.0'
info:
  title: Pay API
paths:
  /gateway.do:
    post:
      summary: Unified gateway
      description: All trade methods share one endpoint
    get:
      summary: Health check
definitions:
  TradePayRequest:
    required: [out_trade_no, total_amount, subject]
    properties:
      out_trade_no:
        type: string
      total_amount:
        type: number
      subject:
        type: string
  TradeRefundRequest:
    properties:
      out_trade_no:
        type: string
        description: Refunded order
      refund_amount:
        type: number
";

#[test]
fn test_load_swagger_yaml_file() -> anyhow::Result<()> {
    let file = write_temp(".yml", SWAGGER_YAML);
    let doc = ApiDocument::load_from_file(file.path())?;
    assert_eq!(doc.kind(), DocumentKind::Swagger);

    let fields = doc.fields();
    let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "out_trade_no",
            "subject",
            "total_amount",
            "out_trade_no",
            "refund_amount"
        ]
    );

    // The refund schema comes last, so its definition wins in the catalog
    let catalog: FieldCatalog = fields.into_iter().collect();
    assert_eq!(catalog.len(), 4);
    let out_trade_no = catalog.get("out_trade_no").unwrap();
    assert_eq!(out_trade_no.source, "definitions.TradeRefundRequest");
    assert!(!out_trade_no.required);
    assert!(catalog.get("subject").unwrap().required);
    Ok(())
}

#[test]
fn test_endpoints_from_file() -> anyhow::Result<()> {
    let file = write_temp(".yaml", SWAGGER_YAML);
    let endpoints = ApiDocument::load_from_file(file.path())?.endpoints();
    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints[0].method, "GET");
    assert_eq!(endpoints[1].method, "POST");
    assert_eq!(endpoints[1].description, "All trade methods share one endpoint");
    assert!(endpoints[1].parameters.is_empty());
    Ok(())
}

#[test]
fn test_load_openapi_json_file() -> anyhow::Result<()> {
    let file = write_temp(
        ".json",
        r#"{"openapi": "3.1.0", "components": {"schemas": {"Notify": {"properties": {"notify_id": {}}}}}}"#,
    );
    let doc = ApiDocument::load_from_file(file.path())?;
    assert_eq!(doc.kind(), DocumentKind::OpenApi);
    assert_eq!(doc.fields()[0].field_type, "string");
    assert!(doc.endpoints().is_empty());
    Ok(())
}

#[test]
fn test_load_errors() {
    let missing = std::path::Path::new("/nonexistent/api.json");
    assert!(matches!(ApiDocument::load_from_file(missing), Err(Error::Io(_))));

    let broken = write_temp(".yaml", "swagger: [unclosed");
    assert!(matches!(
        ApiDocument::load_from_file(broken.path()),
        Err(Error::InvalidFormat(_))
    ));

    let unsupported = write_temp(".json", r#"{"openapi": "2.0"}"#);
    assert!(matches!(
        ApiDocument::load_from_file(unsupported.path()),
        Err(Error::UnsupportedFormat(_))
    ));
}

#[test]
fn test_load_value_by_extension() -> anyhow::Result<()> {
    let yaml = write_temp(".yaml", "amount: 12\nitems: [a, b]\n");
    let value = load_value(yaml.path())?;
    assert_eq!(value.get("amount"), Some(&Value::Integer(12)));
    assert_eq!(value.get("items").and_then(Value::as_array).map(<[Value]>::len), Some(2));

    let json = write_temp(".json", r#"{"amount": 12.5}"#);
    assert_eq!(load_value(json.path())?.get("amount"), Some(&Value::Decimal(12.5)));
    Ok(())
}
