//! Merchant defaults for the processor's payment envelope.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantConfig {
    /// Callback the processor posts the outcome to.
    pub post_link: String,
    /// Callback for failed payments, if the merchant has a separate one.
    pub failure_post_link: Option<String>,
    /// Ask the processor to tokenize the card for later use.
    pub card_save: bool,
    /// Cardholder name used when the request carries none.
    pub default_cardholder_name: String,
    /// Prefix of the payment description, followed by `#<order_id>`.
    pub description_prefix: String,
}

impl MerchantConfig {
    pub fn describe_order(&self, order_id: i64) -> String {
        format!("{} #{}", self.description_prefix, order_id)
    }
}
