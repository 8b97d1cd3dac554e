//! Wire types for the property-records provider's report API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Requests ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthRequest<'a> {
    pub client_id: &'a str,
    pub client_secret_key: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Filter<'a> {
    #[serde(rename = "FilterName")]
    pub name: &'a str,
    #[serde(rename = "FilterOperator")]
    pub operator: &'a str,
    #[serde(rename = "FilterValues")]
    pub values: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchRequestBody<'a> {
    pub product_names: Vec<&'a str>,
    pub search_type: &'a str,
    pub search_request: SearchRequest<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchRequest<'a> {
    pub reference_id: &'a str,
    pub product_name: &'a str,
    pub max_return: &'a str,
    pub filters: Vec<Filter<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetailRequestBody<'a> {
    pub product_names: Vec<&'a str>,
    pub search_type: &'a str,
    pub property_id: &'a str,
}

// --- Responses ---

/// Error payload; the provider reports an empty result set as a 400 with a
/// well-known message.
#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "LitePropertyList", default)]
    pub lite_property_list: Vec<LiteProperty>,
}

#[derive(Debug, Deserialize)]
pub struct LiteProperty {
    #[serde(rename = "PropertyId", default)]
    pub property_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ReportResponse {
    #[serde(rename = "Reports", default)]
    pub reports: Vec<Report>,
}

#[derive(Debug, Deserialize)]
pub struct Report {
    #[serde(rename = "Data", default)]
    pub data: ReportData,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportData {
    #[serde(rename = "SubjectProperty", default)]
    pub subject_property: SubjectProperty,
    #[serde(rename = "OwnerInformation", default)]
    pub owner_information: OwnerInformation,
    #[serde(rename = "OwnerTransferInformation", default)]
    pub owner_transfer_information: OwnerTransferInformation,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubjectProperty {
    #[serde(rename = "PropertyId", default)]
    pub property_id: Option<Value>,
    #[serde(rename = "SitusAddress", default)]
    pub situs_address: SitusAddress,
}

#[derive(Debug, Default, Deserialize)]
pub struct SitusAddress {
    #[serde(rename = "StreetAddress", default)]
    pub street_address: Option<String>,
    #[serde(rename = "County", default)]
    pub county: Option<String>,
    #[serde(rename = "State", default)]
    pub state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OwnerInformation {
    #[serde(rename = "OwnerNames", default)]
    pub owner_names: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OwnerTransferInformation {
    #[serde(rename = "SellerName", default)]
    pub seller_name: Option<String>,
    #[serde(rename = "SaleDate", default)]
    pub sale_date: Option<String>,
}

/// Property ids arrive as either JSON numbers or strings depending on the
/// endpoint; normalize to a string id.
pub(crate) fn normalize_property_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() && s != "N/A" => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lite_property_list_with_mixed_id_types() {
        let body = r#"{"LitePropertyList":[{"PropertyId":123456},{"PropertyId":"789012"},{"Apn":"no-id"}]}"#;
        let resp: SearchResponse = serde_json::from_str(body).unwrap();
        let ids: Vec<String> = resp
            .lite_property_list
            .iter()
            .filter_map(|p| p.property_id.as_ref().and_then(normalize_property_id))
            .collect();
        assert_eq!(ids, vec!["123456", "789012"]);
    }

    #[test]
    fn parses_no_match_message() {
        let msg: ApiMessage =
            serde_json::from_str(r#"{"Message":"No matching property found."}"#).unwrap();
        assert_eq!(msg.message.as_deref(), Some("No matching property found."));
    }

    #[test]
    fn parses_detail_report() {
        let body = r#"{
            "Reports": [{
                "Data": {
                    "SubjectProperty": {
                        "PropertyId": 42,
                        "SitusAddress": {"StreetAddress": "12 Oak St", "County": "Hennepin", "State": "MN"}
                    },
                    "OwnerInformation": {"OwnerNames": "DOE JANE"},
                    "OwnerTransferInformation": {"SellerName": "SMITH JOHN", "SaleDate": "2026-03-15"}
                }
            }]
        }"#;
        let resp: ReportResponse = serde_json::from_str(body).unwrap();
        let data = &resp.reports[0].data;
        assert_eq!(
            data.subject_property
                .property_id
                .as_ref()
                .and_then(normalize_property_id)
                .as_deref(),
            Some("42")
        );
        assert_eq!(data.owner_information.owner_names.as_deref(), Some("DOE JANE"));
        assert_eq!(
            data.owner_transfer_information.sale_date.as_deref(),
            Some("2026-03-15")
        );
    }

    #[test]
    fn placeholder_ids_are_dropped() {
        assert_eq!(normalize_property_id(&Value::String("N/A".into())), None);
        assert_eq!(normalize_property_id(&Value::String(String::new())), None);
        assert_eq!(normalize_property_id(&Value::Null), None);
    }
}
