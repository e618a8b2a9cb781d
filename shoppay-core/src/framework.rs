use sqlx::PgPool;

/// Runs store commands against the shared connection pool.
///
/// Commands are plain structs; each one gets a
/// `kanau::processor::Processor` impl for this type.
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

impl DatabaseProcessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
