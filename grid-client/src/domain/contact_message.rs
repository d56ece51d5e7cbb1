use super::Value;

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NewContactMessage {
    pub customer_name: String,
    pub customer_contact: String,
    pub message: String,
}

impl NewContactMessage {
    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("customer_name", self.customer_name.clone().into()),
            ("customer_contact", self.customer_contact.clone().into()),
            ("message", self.message.clone().into()),
        ]
    }
}

/// A contact-center message. `response` stays empty until an operator
/// answers it.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ContactMessage {
    pub id: i64,
    pub customer_name: String,
    pub customer_contact: String,
    pub message: String,
    pub response: Option<String>,
}

impl ContactMessage {
    pub fn is_answered(&self) -> bool {
        self.response.as_deref().is_some_and(|r| !r.is_empty())
    }
}
