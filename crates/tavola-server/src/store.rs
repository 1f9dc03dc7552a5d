//! SQLite persistence for users, products, orders, reservations, and
//! contact messages.
//!
//! Emails are stored lower-cased so lookups are case-insensitive. Order line
//! items live in a JSON document column; everything else is a plain column.
//! Timestamps are Unix seconds.

use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use tavola_core::{
    AuthProvider, ContactMessage, Order, OrderItem, OrderStatus, Product, Reservation,
    ReservationStatus, TvError, TvResult, User, UserRole,
};

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

fn db_err(err: sqlx::Error) -> TvError {
    TvError::Storage(err.to_string())
}

fn corrupt(what: &str, value: &str) -> TvError {
    TvError::Storage(format!("corrupt {what} value in database: {value}"))
}

fn parse_uuid(row: &SqliteRow, column: &str) -> TvResult<Uuid> {
    let raw: String = row.get(column);
    Uuid::parse_str(&raw).map_err(|_| corrupt(column, &raw))
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub available: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub date: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Store {
    /// Open the database and ensure the schema exists.
    pub async fn connect(url: &str) -> TvResult<Self> {
        // In-memory databases are per-connection; keep the pool at one
        // connection so tests see a single database.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(db_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id            TEXT PRIMARY KEY,
                email         TEXT NOT NULL UNIQUE,
                name          TEXT NOT NULL,
                password_hash TEXT,
                role          TEXT NOT NULL,
                provider      TEXT NOT NULL,
                created_at    INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS products (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT NOT NULL,
                price_cents INTEGER NOT NULL,
                category    TEXT NOT NULL,
                image_url   TEXT,
                available   INTEGER NOT NULL,
                created_at  INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS orders (
                id            TEXT PRIMARY KEY,
                customer_name TEXT NOT NULL,
                email         TEXT NOT NULL,
                items         TEXT NOT NULL,
                total_cents   INTEGER NOT NULL,
                status        TEXT NOT NULL,
                created_at    INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS reservations (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                email      TEXT NOT NULL,
                phone      TEXT NOT NULL,
                date       TEXT NOT NULL,
                time       TEXT NOT NULL,
                party_size INTEGER NOT NULL,
                notes      TEXT,
                status     TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS contacts (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                email      TEXT NOT NULL,
                subject    TEXT NOT NULL,
                message    TEXT NOT NULL,
                read       INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await
        .map_err(db_err)?;

        Ok(Self { pool })
    }

    // --- Users ---

    pub async fn insert_user(&self, user: &User) -> TvResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, role, provider, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(user.email.to_lowercase())
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.provider.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                TvError::Duplicate(format!("account {}", user.email))
            }
            other => db_err(other),
        })?;
        Ok(())
    }

    pub async fn find_user_by_email(&self, email: &str) -> TvResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|row| user_from_row(&row)).transpose()
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> TvResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|row| user_from_row(&row)).transpose()
    }

    pub async fn update_user_password(&self, id: Uuid, password_hash: &str) -> TvResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(TvError::UserNotFound(id));
        }
        Ok(())
    }

    pub async fn admin_exists(&self) -> TvResult<bool> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM users WHERE role = 'admin'")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        let count: i64 = row.get("n");
        Ok(count > 0)
    }

    // --- Products ---

    pub async fn insert_product(&self, product: &Product) -> TvResult<()> {
        sqlx::query(
            "INSERT INTO products (id, name, description, price_cents, category, image_url, available, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(product.id.to_string())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.available)
        .bind(product.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    pub async fn get_product(&self, id: Uuid) -> TvResult<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|row| product_from_row(&row)).transpose()
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> TvResult<Vec<Product>> {
        let mut sql = String::from("SELECT * FROM products WHERE 1=1");
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if filter.available.is_some() {
            sql.push_str(" AND available = ?");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        if let Some(ref category) = filter.category {
            query = query.bind(category);
        }
        if let Some(available) = filter.available {
            query = query.bind(available);
        }
        query = query.bind(filter.limit.max(1)).bind(filter.offset.max(0));

        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;
        rows.iter().map(product_from_row).collect()
    }

    pub async fn update_product(&self, product: &Product) -> TvResult<()> {
        let result = sqlx::query(
            "UPDATE products
             SET name = ?, description = ?, price_cents = ?, category = ?, image_url = ?, available = ?
             WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.available)
        .bind(product.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(TvError::NotFound(format!("product {}", product.id)));
        }
        Ok(())
    }

    pub async fn delete_product(&self, id: Uuid) -> TvResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(TvError::NotFound(format!("product {id}")));
        }
        Ok(())
    }

    // --- Orders ---

    pub async fn insert_order(&self, order: &Order) -> TvResult<()> {
        sqlx::query(
            "INSERT INTO orders (id, customer_name, email, items, total_cents, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(order.id.to_string())
        .bind(&order.customer_name)
        .bind(order.email.to_lowercase())
        .bind(serde_json::to_string(&order.items)?)
        .bind(order.total_cents)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    pub async fn get_order(&self, id: Uuid) -> TvResult<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|row| order_from_row(&row)).transpose()
    }

    pub async fn list_orders_by_email(&self, email: &str) -> TvResult<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT * FROM orders WHERE email = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(email.to_lowercase())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(order_from_row).collect()
    }

    pub async fn list_orders(&self, filter: &OrderFilter) -> TvResult<Vec<Order>> {
        let mut sql = String::from("SELECT * FROM orders WHERE 1=1");
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }
        query = query.bind(filter.limit.max(1)).bind(filter.offset.max(0));

        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;
        rows.iter().map(order_from_row).collect()
    }

    pub async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> TvResult<()> {
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(TvError::NotFound(format!("order {id}")));
        }
        Ok(())
    }

    // --- Reservations ---

    pub async fn insert_reservation(&self, reservation: &Reservation) -> TvResult<()> {
        sqlx::query(
            "INSERT INTO reservations (id, name, email, phone, date, time, party_size, notes, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(reservation.id.to_string())
        .bind(&reservation.name)
        .bind(reservation.email.to_lowercase())
        .bind(&reservation.phone)
        .bind(&reservation.date)
        .bind(&reservation.time)
        .bind(i64::from(reservation.party_size))
        .bind(&reservation.notes)
        .bind(reservation.status.as_str())
        .bind(reservation.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    pub async fn get_reservation(&self, id: Uuid) -> TvResult<Option<Reservation>> {
        let row = sqlx::query("SELECT * FROM reservations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|row| reservation_from_row(&row)).transpose()
    }

    pub async fn list_reservations(&self, filter: &ReservationFilter) -> TvResult<Vec<Reservation>> {
        let mut sql = String::from("SELECT * FROM reservations WHERE 1=1");
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if filter.date.is_some() {
            sql.push_str(" AND date = ?");
        }
        sql.push_str(" ORDER BY date ASC, time ASC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }
        if let Some(ref date) = filter.date {
            query = query.bind(date);
        }
        query = query.bind(filter.limit.max(1)).bind(filter.offset.max(0));

        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;
        rows.iter().map(reservation_from_row).collect()
    }

    pub async fn update_reservation_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> TvResult<()> {
        let result = sqlx::query("UPDATE reservations SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(TvError::NotFound(format!("reservation {id}")));
        }
        Ok(())
    }

    // --- Contact messages ---

    pub async fn insert_contact(&self, contact: &ContactMessage) -> TvResult<()> {
        sqlx::query(
            "INSERT INTO contacts (id, name, email, subject, message, read, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(contact.id.to_string())
        .bind(&contact.name)
        .bind(contact.email.to_lowercase())
        .bind(&contact.subject)
        .bind(&contact.message)
        .bind(contact.read)
        .bind(contact.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    pub async fn list_contacts(&self, limit: i64, offset: i64) -> TvResult<Vec<ContactMessage>> {
        let rows = sqlx::query(
            "SELECT * FROM contacts ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit.max(1))
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(contact_from_row).collect()
    }

    pub async fn mark_contact_read(&self, id: Uuid) -> TvResult<()> {
        let result = sqlx::query("UPDATE contacts SET read = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(TvError::NotFound(format!("contact message {id}")));
        }
        Ok(())
    }

    pub async fn delete_contact(&self, id: Uuid) -> TvResult<()> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(TvError::NotFound(format!("contact message {id}")));
        }
        Ok(())
    }
}

// --- Row mapping ---

fn user_from_row(row: &SqliteRow) -> TvResult<User> {
    let role_raw: String = row.get("role");
    let provider_raw: String = row.get("provider");
    Ok(User {
        id: parse_uuid(row, "id")?,
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        role: UserRole::parse(&role_raw).ok_or_else(|| corrupt("role", &role_raw))?,
        provider: AuthProvider::parse(&provider_raw)
            .ok_or_else(|| corrupt("provider", &provider_raw))?,
        created_at: row.get("created_at"),
    })
}

fn product_from_row(row: &SqliteRow) -> TvResult<Product> {
    Ok(Product {
        id: parse_uuid(row, "id")?,
        name: row.get("name"),
        description: row.get("description"),
        price_cents: row.get("price_cents"),
        category: row.get("category"),
        image_url: row.get("image_url"),
        available: row.get("available"),
        created_at: row.get("created_at"),
    })
}

fn order_from_row(row: &SqliteRow) -> TvResult<Order> {
    let status_raw: String = row.get("status");
    let items_raw: String = row.get("items");
    let items: Vec<OrderItem> = serde_json::from_str(&items_raw)?;
    Ok(Order {
        id: parse_uuid(row, "id")?,
        customer_name: row.get("customer_name"),
        email: row.get("email"),
        items,
        total_cents: row.get("total_cents"),
        status: OrderStatus::parse(&status_raw).ok_or_else(|| corrupt("status", &status_raw))?,
        created_at: row.get("created_at"),
    })
}

fn reservation_from_row(row: &SqliteRow) -> TvResult<Reservation> {
    let status_raw: String = row.get("status");
    let party_size: i64 = row.get("party_size");
    Ok(Reservation {
        id: parse_uuid(row, "id")?,
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        date: row.get("date"),
        time: row.get("time"),
        party_size: party_size.max(0) as u32,
        notes: row.get("notes"),
        status: ReservationStatus::parse(&status_raw)
            .ok_or_else(|| corrupt("status", &status_raw))?,
        created_at: row.get("created_at"),
    })
}

fn contact_from_row(row: &SqliteRow) -> TvResult<ContactMessage> {
    Ok(ContactMessage {
        id: parse_uuid(row, "id")?,
        name: row.get("name"),
        email: row.get("email"),
        subject: row.get("subject"),
        message: row.get("message"),
        read: row.get("read"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> Store {
        Store::connect("sqlite::memory:").await.expect("store")
    }

    fn sample_user(email: &str, role: UserRole) -> User {
        User {
            id: Uuid::now_v7(),
            email: email.into(),
            name: "Sample".into(),
            password_hash: Some("hash".into()),
            role,
            provider: AuthProvider::Local,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    fn sample_product(name: &str, category: &str, available: bool) -> Product {
        Product {
            id: Uuid::now_v7(),
            name: name.into(),
            description: "tasty".into(),
            price_cents: 1250,
            category: category.into(),
            image_url: None,
            available,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    #[tokio::test]
    async fn user_lookup_is_case_insensitive() {
        let store = test_store().await;
        let user = sample_user("Dana@Example.COM", UserRole::Customer);
        store.insert_user(&user).await.unwrap();

        let found = store
            .find_user_by_email("dana@example.com")
            .await
            .unwrap()
            .expect("user");
        assert_eq!(found.id, user.id);
        assert_eq!(found.email, "dana@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = test_store().await;
        store
            .insert_user(&sample_user("a@example.com", UserRole::Customer))
            .await
            .unwrap();
        let err = store
            .insert_user(&sample_user("A@example.com", UserRole::Customer))
            .await
            .unwrap_err();
        assert!(matches!(err, TvError::Duplicate(_)));
    }

    #[tokio::test]
    async fn admin_exists_reflects_roles() {
        let store = test_store().await;
        assert!(!store.admin_exists().await.unwrap());
        store
            .insert_user(&sample_user("boss@example.com", UserRole::Admin))
            .await
            .unwrap();
        assert!(store.admin_exists().await.unwrap());
    }

    #[tokio::test]
    async fn password_update_requires_existing_user() {
        let store = test_store().await;
        let user = sample_user("a@example.com", UserRole::Customer);
        store.insert_user(&user).await.unwrap();

        store.update_user_password(user.id, "new-hash").await.unwrap();
        let found = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.password_hash.as_deref(), Some("new-hash"));

        let err = store
            .update_user_password(Uuid::now_v7(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, TvError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn product_filters_and_pagination() {
        let store = test_store().await;
        store
            .insert_product(&sample_product("Margherita", "pizza", true))
            .await
            .unwrap();
        store
            .insert_product(&sample_product("Diavola", "pizza", false))
            .await
            .unwrap();
        store
            .insert_product(&sample_product("Tiramisu", "dessert", true))
            .await
            .unwrap();

        let pizzas = store
            .list_products(&ProductFilter {
                category: Some("pizza".into()),
                limit: 50,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pizzas.len(), 2);

        let available = store
            .list_products(&ProductFilter {
                available: Some(true),
                limit: 50,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(available.len(), 2);

        let page = store
            .list_products(&ProductFilter {
                limit: 2,
                offset: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn product_update_and_delete() {
        let store = test_store().await;
        let mut product = sample_product("Margherita", "pizza", true);
        store.insert_product(&product).await.unwrap();

        product.price_cents = 1450;
        product.available = false;
        store.update_product(&product).await.unwrap();

        let found = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(found.price_cents, 1450);
        assert!(!found.available);

        store.delete_product(product.id).await.unwrap();
        assert!(store.get_product(product.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_product(product.id).await.unwrap_err(),
            TvError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn order_items_roundtrip_through_json() {
        let store = test_store().await;
        let items = vec![
            OrderItem {
                product_id: Uuid::now_v7(),
                name: "Margherita".into(),
                unit_price_cents: 1250,
                quantity: 2,
            },
            OrderItem {
                product_id: Uuid::now_v7(),
                name: "Tiramisu".into(),
                unit_price_cents: 650,
                quantity: 1,
            },
        ];
        let order = Order {
            id: Uuid::now_v7(),
            customer_name: "Dana".into(),
            email: "dana@example.com".into(),
            total_cents: Order::computed_total(&items),
            items,
            status: OrderStatus::Pending,
            created_at: chrono::Utc::now().timestamp(),
        };
        store.insert_order(&order).await.unwrap();

        let found = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(found.items.len(), 2);
        assert_eq!(found.total_cents, 3150);
        assert_eq!(found.items[0].quantity, 2);

        let mine = store.list_orders_by_email("DANA@example.com").await.unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn order_status_filter_and_update() {
        let store = test_store().await;
        let order = Order {
            id: Uuid::now_v7(),
            customer_name: "Dana".into(),
            email: "dana@example.com".into(),
            items: Vec::new(),
            total_cents: 0,
            status: OrderStatus::Pending,
            created_at: chrono::Utc::now().timestamp(),
        };
        store.insert_order(&order).await.unwrap();

        store
            .update_order_status(order.id, OrderStatus::Confirmed)
            .await
            .unwrap();

        let confirmed = store
            .list_orders(&OrderFilter {
                status: Some(OrderStatus::Confirmed),
                limit: 50,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(confirmed.len(), 1);

        let pending = store
            .list_orders(&OrderFilter {
                status: Some(OrderStatus::Pending),
                limit: 50,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn reservation_filters_by_date_and_status() {
        let store = test_store().await;
        for (date, status) in [
            ("2026-09-01", ReservationStatus::Pending),
            ("2026-09-01", ReservationStatus::Confirmed),
            ("2026-09-02", ReservationStatus::Pending),
        ] {
            store
                .insert_reservation(&Reservation {
                    id: Uuid::now_v7(),
                    name: "Dana".into(),
                    email: "dana@example.com".into(),
                    phone: "555-0100".into(),
                    date: date.into(),
                    time: "19:30".into(),
                    party_size: 4,
                    notes: None,
                    status,
                    created_at: chrono::Utc::now().timestamp(),
                })
                .await
                .unwrap();
        }

        let first_of_september = store
            .list_reservations(&ReservationFilter {
                date: Some("2026-09-01".into()),
                limit: 50,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(first_of_september.len(), 2);

        let pending = store
            .list_reservations(&ReservationFilter {
                status: Some(ReservationStatus::Pending),
                limit: 50,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
    }

    #[tokio::test]
    async fn contact_read_flag_and_delete() {
        let store = test_store().await;
        let contact = ContactMessage {
            id: Uuid::now_v7(),
            name: "Dana".into(),
            email: "dana@example.com".into(),
            subject: "Catering".into(),
            message: "Do you cater weddings?".into(),
            read: false,
            created_at: chrono::Utc::now().timestamp(),
        };
        store.insert_contact(&contact).await.unwrap();

        store.mark_contact_read(contact.id).await.unwrap();
        let listed = store.list_contacts(50, 0).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].read);

        store.delete_contact(contact.id).await.unwrap();
        assert!(store.list_contacts(50, 0).await.unwrap().is_empty());
    }
}
