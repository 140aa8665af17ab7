//! Payments: processed transactions and the payment-sheet secret

use serde::{Deserialize, Serialize};

use crate::models::Transaction;
use crate::store::Collection;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentData {
    /// Ordered as the server / processing order returned them
    pub history: Collection<Transaction>,
    pub current: Option<Transaction>,
    /// Secret for the hosted payment sheet
    pub client_secret: Option<String>,
}

impl PaymentData {
    /// A processed payment becomes current and is appended once to the history
    pub fn record_transaction(&mut self, transaction: Transaction) {
        self.current = Some(transaction.clone());
        self.history.append(transaction);
    }
}
