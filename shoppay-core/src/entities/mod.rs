pub mod payment;

pub use payment::{
    DeletePayment, GetPaymentById, ListPayments, PaymentInsert, PaymentRecord, SearchPayments,
    UpdatePayment,
};
