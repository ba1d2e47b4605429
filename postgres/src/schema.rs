//! Table definitions.
//!
//! Statements are idempotent so they can run on every start.

use sqlx::PgPool;

/// DDL applied by [`run_migrations`], in order.
pub const MIGRATIONS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS talents (
        id BIGINT PRIMARY KEY,
        agency_id BIGINT,
        profile_url TEXT NOT NULL,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS orders (
        id BIGSERIAL PRIMARY KEY,
        hash_id UUID NOT NULL UNIQUE,
        talent_id BIGINT NOT NULL,
        video_is_for TEXT NOT NULL,
        is_from TEXT NOT NULL DEFAULT '',
        is_to TEXT NOT NULL,
        instruction TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL,
        is_public BOOLEAN NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        expiration_datetime TIMESTAMPTZ NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS charges (
        id BIGSERIAL PRIMARY KEY,
        order_id BIGINT NOT NULL UNIQUE REFERENCES orders(id) ON DELETE CASCADE,
        amount_paid NUMERIC(7, 2) NOT NULL,
        payment_date TIMESTAMPTZ NOT NULL,
        payment_method TEXT NOT NULL,
        status TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS credit_cards (
        id BIGSERIAL PRIMARY KEY,
        charge_id BIGINT NOT NULL UNIQUE REFERENCES charges(id) ON DELETE CASCADE,
        fullname TEXT NOT NULL,
        birthdate DATE NOT NULL,
        tax_document VARCHAR(11) NOT NULL,
        phone_number VARCHAR(9) NOT NULL,
        area_code VARCHAR(2) NOT NULL,
        credit_card_hash TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS buyers (
        id BIGSERIAL PRIMARY KEY,
        charge_id BIGINT NOT NULL UNIQUE REFERENCES charges(id) ON DELETE CASCADE,
        fullname TEXT NOT NULL,
        birthdate DATE NOT NULL,
        tax_document VARCHAR(11) NOT NULL,
        phone_number VARCHAR(9) NOT NULL,
        area_code VARCHAR(2) NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS shoutouts (
        id BIGSERIAL PRIMARY KEY,
        hash_id UUID NOT NULL UNIQUE,
        order_id BIGINT NOT NULL UNIQUE REFERENCES orders(id) ON DELETE CASCADE,
        talent_id BIGINT NOT NULL,
        video_file TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS talent_profits (
        id BIGSERIAL PRIMARY KEY,
        talent_id BIGINT NOT NULL,
        order_id BIGINT NOT NULL UNIQUE REFERENCES orders(id) ON DELETE CASCADE,
        shoutout_price NUMERIC(7, 2) NOT NULL,
        profit_percentage NUMERIC(3, 2) NOT NULL,
        profit NUMERIC(7, 2) NOT NULL,
        paid BOOLEAN NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS agency_profits (
        id BIGSERIAL PRIMARY KEY,
        agency_id BIGINT NOT NULL,
        order_id BIGINT NOT NULL UNIQUE REFERENCES orders(id) ON DELETE CASCADE,
        shoutout_price NUMERIC(7, 2) NOT NULL,
        profit_percentage NUMERIC(3, 2) NOT NULL,
        profit NUMERIC(7, 2) NOT NULL,
        paid BOOLEAN NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS wirecard_transactions (
        id BIGSERIAL PRIMARY KEY,
        order_id BIGINT NOT NULL UNIQUE REFERENCES orders(id) ON DELETE CASCADE,
        wirecard_order_hash TEXT NOT NULL,
        wirecard_payment_hash TEXT NOT NULL UNIQUE,
        payment_event_last_timestamp TIMESTAMPTZ
    )
    ",
    // A single-row table: the primary key can only ever be TRUE.
    r"
    CREATE TABLE IF NOT EXISTS default_talent_profit_percentages (
        singleton BOOLEAN PRIMARY KEY DEFAULT TRUE CHECK (singleton),
        value NUMERIC(3, 2) NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS custom_talent_profit_percentages (
        talent_id BIGINT PRIMARY KEY,
        value NUMERIC(3, 2) NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS agency_profit_percentages (
        agency_id BIGINT PRIMARY KEY,
        value NUMERIC(3, 2) NOT NULL
    )
    ",
];

/// Applies [`MIGRATIONS`] in one transaction.
///
/// # Errors
///
/// The first failing statement's error.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in MIGRATIONS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    tracing::debug!(statements = MIGRATIONS.len(), "schema up to date");
    Ok(())
}
