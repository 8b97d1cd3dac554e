use serde::Deserialize;

/// Envelope for the contacts listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ContactsResponse {
    #[serde(default)]
    pub data: Vec<CrmContact>,
}

#[derive(Debug, Deserialize)]
pub struct CrmContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_contacts_envelope() {
        let body = r#"{"data":[{"name":"Jane Doe","email":"jane@example.com"},{"email":"orphan@example.com"}]}"#;
        let resp: ContactsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.data.len(), 2);
        assert_eq!(resp.data[0].name, "Jane Doe");
        assert_eq!(resp.data[1].name, "");
    }

    #[test]
    fn missing_data_field_is_empty() {
        let resp: ContactsResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.data.is_empty());
    }
}
