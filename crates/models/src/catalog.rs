use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Contents of one `qa_<category>.json` blob.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CatalogDocument {
    #[serde(default)]
    pub qa_pairs: Vec<QaPair>,
}

/// Category names double as blob keys, so keep them to a safe alphabet.
pub fn is_valid_category(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
