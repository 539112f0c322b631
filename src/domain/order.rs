use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::errors::DomainError;

/// A numeric amount exactly as the caller sent it.
///
/// Integers stay integers and floats stay floats, so `300` renders as `300`
/// while `300.0` renders as `300.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Number);

impl Amount {
    #[cfg(test)]
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self)
    }

    /// Thousands-grouped rendering with `,` separators, e.g. `1,234,567.5`.
    pub fn grouped(&self) -> String {
        let plain = self.to_string();
        let (sign, unsigned) = match plain.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", plain.as_str()),
        };
        let (int_part, rest) = match unsigned.find(|c: char| !c.is_ascii_digit()) {
            Some(idx) => unsigned.split_at(idx),
            None => (unsigned, ""),
        };
        format!("{sign}{}{rest}", group_thousands(int_part))
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self(Number::from(0))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(Number::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.0.is_f64() {
            return write!(f, "{}", self.0);
        }
        match self.0.as_f64() {
            Some(v) if v.fract() == 0.0 && v.abs() < 1e16 => write!(f, "{v:.1}"),
            Some(v) => write!(f, "{v}"),
            None => write!(f, "{}", self.0),
        }
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One row of the order. The caller's `total` is trusted as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: Amount,
    pub price: Amount,
    pub total: Amount,
}

/// Name, email and phone must all be non-empty. The email format is not checked.
fn validate_contact(name: &str, email: &str, phone: &str) -> Result<(), DomainError> {
    if name.is_empty() || email.is_empty() || phone.is_empty() {
        return Err(DomainError::MissingRequiredFields);
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct OrderSubmission {
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    comment: String,
    items: Vec<LineItem>,
    total_amount: Amount,
}

impl OrderSubmission {
    /// Fails with [`DomainError::MissingRequiredFields`] when the name, email
    /// or phone is empty. Nothing else is checked.
    pub fn new(
        customer_name: String,
        customer_email: String,
        customer_phone: String,
        comment: String,
        items: Vec<LineItem>,
        total_amount: Amount,
    ) -> Result<Self, DomainError> {
        validate_contact(&customer_name, &customer_email, &customer_phone)?;
        Ok(Self {
            customer_name,
            customer_email,
            customer_phone,
            comment,
            items,
            total_amount,
        })
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    pub fn customer_phone(&self) -> &str {
        &self.customer_phone
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total_amount(&self) -> &Amount {
        &self.total_amount
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderId(String);

impl OrderId {
    pub fn at(moment: &NaiveDateTime) -> Self {
        Self(format!("ORD-{}", moment.format("%Y%m%d-%H%M%S")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub mail_sent: bool,
}
