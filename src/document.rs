//! Payload of the "create document" API call.
//!
//! Field names mirror the JSON keys the API expects, which mix snake_case and
//! camelCase.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub description: Option<Description>,
    pub doc_id: Option<String>,
    pub doc_status: Option<String>,
    pub doc_type: Option<String>,
    #[serde(rename = "importRequest")]
    pub import_request: bool,
    pub owner_inn: Option<String>,
    pub participant_inn: Option<String>,
    pub producer_inn: Option<String>,
    pub production_date: Option<String>,
    pub production_type: Option<String>,
    #[serde(default)]
    pub products: Vec<Product>,
    pub reg_date: Option<String>,
    pub reg_number: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(rename = "participantInn")]
    pub participant_inn: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub certificate_document: Option<String>,
    pub certificate_document_date: Option<String>,
    pub certificate_document_number: Option<String>,
    pub owner_inn: Option<String>,
    pub producer_inn: Option<String>,
    pub production_date: Option<String>,
    pub tnved_code: Option<String>,
    pub uit_code: Option<String>,
    pub uitu_code: Option<String>,
}

impl Document {
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Sample introduction-of-goods document used by the demo binary.
    pub fn sample() -> Self {
        let inn = Some("1234567890".to_string());
        let date = Some("2020-01-23".to_string());

        Self {
            description: Some(Description {
                participant_inn: inn.clone(),
            }),
            doc_id: Some("12345".into()),
            doc_status: Some("NEW".into()),
            doc_type: Some("LP_INTRODUCE_GOODS".into()),
            import_request: true,
            owner_inn: inn.clone(),
            participant_inn: inn.clone(),
            producer_inn: inn.clone(),
            production_date: date.clone(),
            production_type: Some("TYPE_A".into()),
            products: vec![Product {
                certificate_document: Some("CERT12345".into()),
                certificate_document_date: date.clone(),
                certificate_document_number: Some("CERT_NUM".into()),
                owner_inn: inn.clone(),
                producer_inn: inn,
                production_date: date.clone(),
                tnved_code: Some("TNVED1234".into()),
                uit_code: Some("UITCODE1234".into()),
                uitu_code: Some("UITUCODE1234".into()),
            }],
            reg_date: date,
            reg_number: Some("REG12345".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_serializes_with_api_keys() {
        let json: Value = serde_json::from_slice(&Document::sample().to_json().unwrap()).unwrap();

        assert_eq!(json["importRequest"], Value::Bool(true));
        assert_eq!(json["description"]["participantInn"], "1234567890");
        assert_eq!(json["doc_type"], "LP_INTRODUCE_GOODS");
        assert_eq!(json["reg_number"], "REG12345");
        assert_eq!(json["products"][0]["tnved_code"], "TNVED1234");
        assert_eq!(json["products"][0]["uitu_code"], "UITUCODE1234");
        assert!(json.get("import_request").is_none());
    }

    #[test]
    fn test_unset_fields_serialize_as_null() {
        let json: Value = serde_json::from_slice(&Document::default().to_json().unwrap()).unwrap();

        assert_eq!(json["doc_id"], Value::Null);
        assert_eq!(json["description"], Value::Null);
        assert_eq!(json["importRequest"], Value::Bool(false));
        assert_eq!(json["products"], Value::Array(vec![]));
    }

    #[test]
    fn test_missing_products_default_to_empty() {
        let doc: Document = serde_json::from_str(r#"{"importRequest": false, "doc_id": "1"}"#).unwrap();

        assert!(doc.products.is_empty());
        assert_eq!(doc.doc_id.as_deref(), Some("1"));
    }
}
