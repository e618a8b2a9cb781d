use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use shoppay_sdk::objects::PaymentRecordResponse;
use sqlx::{Postgres, QueryBuilder};

const SELECT_PAYMENTS: &str =
    "SELECT id, user_id, order_id, amount, payment_date, status FROM payments_shop";

/// A processed payment attempt as stored in `payments_shop`.
///
/// Holds no card data and no processor credentials.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PaymentRecord {
    pub id: i64,
    pub user_id: i64,
    pub order_id: i64,
    pub amount: Decimal,
    pub payment_date: time::OffsetDateTime,
    pub status: String,
}

impl From<PaymentRecord> for PaymentRecordResponse {
    fn from(record: PaymentRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            order_id: record.order_id,
            amount: record.amount,
            payment_date: record.payment_date,
            status: record.status,
        }
    }
}

/// Data for inserting a new payment record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInsert {
    pub user_id: i64,
    pub order_id: i64,
    pub amount: Decimal,
    pub payment_date: time::OffsetDateTime,
    pub status: String,
}

impl Processor<PaymentInsert> for DatabaseProcessor {
    type Output = PaymentRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:PaymentInsert")]
    async fn process(&self, insert: PaymentInsert) -> Result<PaymentRecord, sqlx::Error> {
        let record = sqlx::query_as::<_, PaymentRecord>(
            r#"
            INSERT INTO payments_shop (user_id, order_id, amount, payment_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, order_id, amount, payment_date, status
            "#,
        )
        .bind(insert.user_id)
        .bind(insert.order_id)
        .bind(insert.amount)
        .bind(insert.payment_date)
        .bind(insert.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }
}

#[derive(Debug, Clone, Copy)]
/// List every payment record, oldest first.
pub struct ListPayments;

impl Processor<ListPayments> for DatabaseProcessor {
    type Output = Vec<PaymentRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListPayments")]
    async fn process(&self, _query: ListPayments) -> Result<Vec<PaymentRecord>, sqlx::Error> {
        sqlx::query_as::<_, PaymentRecord>(&format!("{SELECT_PAYMENTS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetPaymentById {
    pub id: i64,
}

impl Processor<GetPaymentById> for DatabaseProcessor {
    type Output = Option<PaymentRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPaymentById")]
    async fn process(&self, query: GetPaymentById) -> Result<Option<PaymentRecord>, sqlx::Error> {
        sqlx::query_as::<_, PaymentRecord>(&format!("{SELECT_PAYMENTS} WHERE id = $1"))
            .bind(query.id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[derive(Debug, Clone)]
/// Overwrite the editable fields of a record.
///
/// `payment_date` is kept as recorded. Returns `None` if no row has `id`.
pub struct UpdatePayment {
    pub id: i64,
    pub user_id: i64,
    pub order_id: i64,
    pub amount: Decimal,
    pub status: String,
}

impl Processor<UpdatePayment> for DatabaseProcessor {
    type Output = Option<PaymentRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdatePayment")]
    async fn process(&self, cmd: UpdatePayment) -> Result<Option<PaymentRecord>, sqlx::Error> {
        sqlx::query_as::<_, PaymentRecord>(
            r#"
            UPDATE payments_shop
            SET user_id = $2, order_id = $3, amount = $4, status = $5
            WHERE id = $1
            RETURNING id, user_id, order_id, amount, payment_date, status
            "#,
        )
        .bind(cmd.id)
        .bind(cmd.user_id)
        .bind(cmd.order_id)
        .bind(cmd.amount)
        .bind(cmd.status)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Copy)]
/// Delete a record. Returns the number of rows removed.
pub struct DeletePayment {
    pub id: i64,
}

impl Processor<DeletePayment> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeletePayment")]
    async fn process(&self, cmd: DeletePayment) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payments_shop WHERE id = $1")
            .bind(cmd.id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Filter records by user, order and status.
///
/// Present filters are combined with `AND`; absent filters match everything.
pub struct SearchPayments {
    pub user_id: Option<i64>,
    pub order_id: Option<i64>,
    pub status: Option<String>,
}

impl SearchPayments {
    /// Build a search, dropping zero ids and empty statuses.
    pub fn new(user_id: Option<i64>, order_id: Option<i64>, status: Option<&str>) -> Self {
        Self {
            user_id: user_id.filter(|id| *id != 0),
            order_id: order_id.filter(|id| *id != 0),
            status: status.filter(|s| !s.is_empty()).map(str::to_owned),
        }
    }

    fn query_builder(&self) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(SELECT_PAYMENTS);
        let mut separator = " WHERE ";

        if let Some(user_id) = self.user_id {
            query.push(separator).push("user_id = ").push_bind(user_id);
            separator = " AND ";
        }
        if let Some(order_id) = self.order_id {
            query.push(separator).push("order_id = ").push_bind(order_id);
            separator = " AND ";
        }
        if let Some(status) = self.status.clone() {
            query.push(separator).push("status = ").push_bind(status);
        }

        query.push(" ORDER BY id");
        query
    }
}

impl Processor<SearchPayments> for DatabaseProcessor {
    type Output = Vec<PaymentRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:SearchPayments")]
    async fn process(&self, query: SearchPayments) -> Result<Vec<PaymentRecord>, sqlx::Error> {
        let mut builder = query.query_builder();
        builder
            .build_query_as::<PaymentRecord>()
            .fetch_all(&self.pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_without_filters_selects_everything() {
        let search = SearchPayments::new(Some(0), None, Some(""));
        assert_eq!(search, SearchPayments::default());
        assert_eq!(
            search.query_builder().sql(),
            format!("{SELECT_PAYMENTS} ORDER BY id")
        );
    }

    #[test]
    fn test_search_filters_compose_with_and() {
        let search = SearchPayments::new(Some(1), Some(2), Some("successful"));
        assert_eq!(
            search.query_builder().sql(),
            format!(
                "{SELECT_PAYMENTS} WHERE user_id = $1 AND order_id = $2 AND status = $3 ORDER BY id"
            )
        );

        let search = SearchPayments::new(None, Some(2), None);
        assert_eq!(
            search.query_builder().sql(),
            format!("{SELECT_PAYMENTS} WHERE order_id = $1 ORDER BY id")
        );
    }

    #[test]
    fn test_search_status_is_bound_not_inlined() {
        let search = SearchPayments::new(None, None, Some("successful' OR '1'='1"));
        let sql = search.query_builder().sql().to_string();
        assert_eq!(sql, format!("{SELECT_PAYMENTS} WHERE status = $1 ORDER BY id"));
        assert!(!sql.contains("successful"));
    }
}
