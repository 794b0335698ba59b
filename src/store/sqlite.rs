use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::Rng;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, ffi, params};

use super::DataStore;
use super::schema::SCHEMA;
use super::seed;
use crate::error::{Error, Result};
use crate::types::*;

const USER_COLUMNS: &str = "id, name, password, access_level";
const PROFILE_COLUMNS: &str =
    "user_id, bio, birthday, gender, marital_status, location, page_preference";
const CODE_COLUMNS: &str = "id, code, expiration, used, user_id";
const TOKEN_COLUMNS: &str =
    "id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at";
const STORE_COLUMNS: &str = "id, name, description, address, city, state, zip_code, country, \
                             category, open_date, close_date, user_id";
const ROLE_COLUMNS: &str = "id, name, description, role_level, user_id";
const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, gender, employment_date, \
                                termination_date, salary, store_employee_role_id, user_id";
const SHIFT_COLUMNS: &str = "store_id, store_employee_id, start_date, end_date, user_id";
const CHAT_COLUMNS: &str = "id, nickname, message, timestamp";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        register_functions(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database, mostly useful in tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        register_functions(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// `casefold(text)`: Unicode lowercase for search. SQLite's `lower()` only folds ASCII.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )?;
    Ok(())
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn parse_opt_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.as_deref().map(parse_datetime)
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn format_opt_datetime(dt: Option<&DateTime<Utc>>) -> Option<String> {
    dt.map(format_datetime)
}

/// Translates constraint failures into conflict / invalid-reference errors.
fn classify(err: rusqlite::Error, conflict: &str, reference: &str) -> Error {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return Error::InvalidReference(reference.to_string());
                }
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return Error::Conflict(conflict.to_string());
                }
                _ => {}
            }
        }
    }
    Error::from(err)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        password: row.get(2)?,
        access_level: row.get(3)?,
    })
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        user_id: row.get(0)?,
        bio: row.get(1)?,
        birthday: parse_opt_datetime(row.get(2)?),
        gender: row.get(3)?,
        marital_status: row.get(4)?,
        location: row.get(5)?,
        page_preference: row.get(6)?,
    })
}

fn code_from_row(row: &Row<'_>) -> rusqlite::Result<ConfirmationCode> {
    Ok(ConfirmationCode {
        id: row.get(0)?,
        code: row.get(1)?,
        expiration: parse_opt_datetime(row.get(2)?),
        used: row.get(3)?,
        user_id: row.get(4)?,
    })
}

fn token_from_row(row: &Row<'_>) -> rusqlite::Result<Token> {
    Ok(Token {
        id: row.get(0)?,
        token_hash: row.get(1)?,
        token_lookup: row.get(2)?,
        user_id: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        expires_at: parse_opt_datetime(row.get(5)?),
        last_used_at: parse_opt_datetime(row.get(6)?),
    })
}

fn store_from_row(row: &Row<'_>) -> rusqlite::Result<Store> {
    Ok(Store {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        address: row.get(3)?,
        city: row.get(4)?,
        state: row.get(5)?,
        zip_code: row.get(6)?,
        country: row.get(7)?,
        category: row.get(8)?,
        open_date: parse_opt_datetime(row.get(9)?),
        close_date: parse_opt_datetime(row.get(10)?),
        user_id: row.get(11)?,
    })
}

fn role_from_row(row: &Row<'_>) -> rusqlite::Result<StoreEmployeeRole> {
    Ok(StoreEmployeeRole {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        role_level: row.get(3)?,
        user_id: row.get(4)?,
    })
}

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<StoreEmployee> {
    Ok(StoreEmployee {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        gender: row.get(3)?,
        employment_date: parse_opt_datetime(row.get(4)?),
        termination_date: parse_opt_datetime(row.get(5)?),
        salary: row.get(6)?,
        store_employee_role_id: row.get(7)?,
        user_id: row.get(8)?,
    })
}

fn shift_from_row(row: &Row<'_>) -> rusqlite::Result<StoreShift> {
    Ok(StoreShift {
        store_id: row.get(0)?,
        store_employee_id: row.get(1)?,
        start_date: parse_opt_datetime(row.get(2)?),
        end_date: parse_opt_datetime(row.get(3)?),
        user_id: row.get(4)?,
    })
}

fn chat_from_row(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.get(0)?,
        nickname: row.get(1)?,
        message: row.get(2)?,
        timestamp: parse_opt_datetime(row.get(3)?),
    })
}

fn query_one<T, P>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Option<T>>
where
    P: rusqlite::Params,
{
    conn.query_row(sql, params, map)
        .optional()
        .map_err(Error::from)
}

fn query_all<T, P>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>>
where
    P: rusqlite::Params,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

fn collect_ids(conn: &Connection, sql: &str) -> Result<Vec<i64>> {
    query_all(conn, sql, [], |row| row.get(0))
}

fn insert_profile(conn: &Connection, profile: &UserProfile) -> rusqlite::Result<usize> {
    conn.execute(
        &format!("INSERT INTO user_profiles ({PROFILE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
        params![
            profile.user_id,
            profile.bio,
            format_opt_datetime(profile.birthday.as_ref()),
            profile.gender,
            profile.marital_status,
            profile.location,
            profile.page_preference,
        ],
    )
}

fn insert_store(conn: &Connection, store: &Store) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO stores (name, description, address, city, state, zip_code, country,
                             category, open_date, close_date, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            store.name,
            store.description,
            store.address,
            store.city,
            store.state,
            store.zip_code,
            store.country,
            store.category,
            format_opt_datetime(store.open_date.as_ref()),
            format_opt_datetime(store.close_date.as_ref()),
            store.user_id,
        ],
    )
}

fn insert_role(conn: &Connection, role: &StoreEmployeeRole) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO store_employee_roles (name, description, role_level, user_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![role.name, role.description, role.role_level, role.user_id],
    )
}

fn insert_employee(conn: &Connection, employee: &StoreEmployee) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO store_employees (first_name, last_name, gender, employment_date,
                                      termination_date, salary, store_employee_role_id, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            employee.first_name,
            employee.last_name,
            employee.gender,
            format_opt_datetime(employee.employment_date.as_ref()),
            format_opt_datetime(employee.termination_date.as_ref()),
            employee.salary,
            employee.store_employee_role_id,
            employee.user_id,
        ],
    )
}

fn insert_chat_message(conn: &Connection, message: &ChatMessage) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO chat_messages (nickname, message, timestamp) VALUES (?1, ?2, ?3)",
        params![
            message.nickname,
            message.message,
            format_opt_datetime(message.timestamp.as_ref()),
        ],
    )
}

fn seed_users<R: Rng>(conn: &Connection, rng: &mut R, count: u32) -> Result<u64> {
    let mut insert_user = conn.prepare(
        "INSERT OR IGNORE INTO users (name, password, access_level) VALUES (?1, NULL, ?2)",
    )?;

    let mut inserted = 0;
    for _ in 0..count {
        // Name collisions are skipped rather than failing the batch
        if insert_user.execute(params![seed::user_name(rng), AccessLevel::Regular])? == 0 {
            continue;
        }
        let profile = seed::user_profile(rng, conn.last_insert_rowid());
        insert_profile(conn, &profile)?;
        inserted += 1;
    }
    Ok(inserted)
}

fn seed_shifts<R: Rng>(
    conn: &Connection,
    rng: &mut R,
    count: u32,
    owner_id: Option<i64>,
) -> Result<u64> {
    let store_ids = collect_ids(conn, "SELECT id FROM stores")?;
    let employee_ids = collect_ids(conn, "SELECT id FROM store_employees")?;

    if store_ids.is_empty() || employee_ids.is_empty() {
        return Err(Error::BadRequest(
            "Generating store shifts requires at least one store and one store employee"
                .to_string(),
        ));
    }

    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM store_shifts", [], |r| r.get(0))?;
    let capacity = (store_ids.len() as u64 * employee_ids.len() as u64)
        .saturating_sub(existing.max(0) as u64);
    let wanted = u64::from(count).min(capacity);
    let max_attempts = wanted.saturating_mul(8).saturating_add(64);

    let mut stmt = conn.prepare(&format!(
        "INSERT OR IGNORE INTO store_shifts ({SHIFT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"
    ))?;

    let mut inserted = 0;
    let mut attempts = 0;
    while inserted < wanted && attempts < max_attempts {
        attempts += 1;
        let store_id = store_ids[rng.gen_range(0..store_ids.len())];
        let employee_id = employee_ids[rng.gen_range(0..employee_ids.len())];
        let (start, end) = seed::shift_window(rng);

        // Taken pairs are ignored by the composite key
        inserted += stmt.execute(params![
            store_id,
            employee_id,
            format_datetime(&start),
            format_datetime(&end),
            owner_id,
        ])? as u64;
    }
    Ok(inserted)
}

impl DataStore for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User, profile: &UserProfile) -> Result<i64> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO users (name, password, access_level) VALUES (?1, ?2, ?3)",
            params![user.name, user.password, user.access_level],
        )
        .map_err(|e| classify(e, "User name already exists", "Invalid user reference"))?;

        let id = tx.last_insert_rowid();
        let profile = UserProfile {
            user_id: id,
            ..profile.clone()
        };
        insert_profile(&tx, &profile)?;

        tx.commit()?;
        Ok(id)
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        query_one(
            &self.conn(),
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
    }

    fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        query_one(
            &self.conn(),
            &format!("SELECT {USER_COLUMNS} FROM users WHERE name = ?1"),
            params![name],
            user_from_row,
        )
    }

    fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>> {
        query_all(
            &self.conn(),
            &format!("SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ?2 OFFSET ?1"),
            params![offset, limit],
            user_from_row,
        )
    }

    fn search_users(&self, query: &str, limit: i64) -> Result<Vec<User>> {
        query_all(
            &self.conn(),
            &format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE instr(casefold(name), casefold(?1)) > 0 ORDER BY id LIMIT ?2"
            ),
            params![query, limit],
            user_from_row,
        )
    }

    fn update_user_with_profile(&self, user: &User, profile: Option<&UserProfile>) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx
            .execute(
                "UPDATE users SET name = ?1, password = ?2, access_level = ?3 WHERE id = ?4",
                params![user.name, user.password, user.access_level, user.id],
            )
            .map_err(|e| classify(e, "User name already exists", "Invalid user reference"))?;
        if rows == 0 {
            return Err(Error::NotFound);
        }

        if let Some(profile) = profile {
            let rows = tx.execute(
                "UPDATE user_profiles SET bio = ?1, birthday = ?2, gender = ?3, marital_status = ?4,
                                          location = ?5, page_preference = ?6
                 WHERE user_id = ?7",
                params![
                    profile.bio,
                    format_opt_datetime(profile.birthday.as_ref()),
                    profile.gender,
                    profile.marital_status,
                    profile.location,
                    profile.page_preference,
                    user.id,
                ],
            )?;
            if rows == 0 {
                // Profile row missing; recreate it
                insert_profile(
                    &tx,
                    &UserProfile {
                        user_id: user.id,
                        ..profile.clone()
                    },
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn has_admin_user(&self) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM users WHERE access_level = ?1",
            params![AccessLevel::Admin],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Profile operations

    fn get_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        query_one(
            &self.conn(),
            &format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = ?1"),
            params![user_id],
            profile_from_row,
        )
    }

    fn set_all_page_preferences(&self, value: i64) -> Result<u64> {
        let rows = self.conn().execute(
            "UPDATE user_profiles SET page_preference = ?1",
            params![value],
        )?;
        Ok(rows as u64)
    }

    // Confirmation code operations

    fn create_confirmation_code(&self, code: &ConfirmationCode) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO confirmation_codes (code, expiration, used, user_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                code.code,
                format_opt_datetime(code.expiration.as_ref()),
                code.used,
                code.user_id,
            ],
        )
        .map_err(|e| classify(e, "Confirmation code already exists", "User not found"))?;
        Ok(conn.last_insert_rowid())
    }

    fn get_confirmation_code(&self, code: &str) -> Result<Option<ConfirmationCode>> {
        query_one(
            &self.conn(),
            &format!("SELECT {CODE_COLUMNS} FROM confirmation_codes WHERE code = ?1"),
            params![code],
            code_from_row,
        )
    }

    fn list_user_confirmation_codes(&self, user_id: i64) -> Result<Vec<ConfirmationCode>> {
        query_all(
            &self.conn(),
            &format!("SELECT {CODE_COLUMNS} FROM confirmation_codes WHERE user_id = ?1 ORDER BY id"),
            params![user_id],
            code_from_row,
        )
    }

    fn confirm_user(&self, code_id: i64, user_id: i64) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE confirmation_codes SET used = 1 WHERE id = ?1 AND user_id = ?2 AND used = 0",
            params![code_id, user_id],
        )?;
        if rows == 0 {
            return Err(Error::Conflict(
                "Confirmation code has already been used".to_string(),
            ));
        }

        tx.execute(
            "UPDATE users SET access_level = ?1 WHERE id = ?2 AND access_level = ?3",
            params![AccessLevel::Regular, user_id, AccessLevel::Unconfirmed],
        )?;

        tx.commit()?;
        Ok(())
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.user_id,
                format_datetime(&token.created_at),
                format_opt_datetime(token.expires_at.as_ref()),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) => match classify(e, "token lookup collision", "User not found") {
                Error::Conflict(_) => Err(Error::TokenLookupCollision),
                other => Err(other),
            },
        }
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        query_one(
            &self.conn(),
            &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE token_lookup = ?1"),
            params![lookup],
            token_from_row,
        )
    }

    fn list_user_tokens(&self, user_id: i64) -> Result<Vec<Token>> {
        query_all(
            &self.conn(),
            &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE user_id = ?1 ORDER BY created_at"),
            params![user_id],
            token_from_row,
        )
    }

    fn delete_token(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tokens WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    // Store operations

    fn create_store(&self, store: &Store) -> Result<i64> {
        let conn = self.conn();
        insert_store(&conn, store)
            .map_err(|e| classify(e, "Store already exists", "Owning user not found"))?;
        Ok(conn.last_insert_rowid())
    }

    fn get_store(&self, id: i64) -> Result<Option<Store>> {
        query_one(
            &self.conn(),
            &format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = ?1"),
            params![id],
            store_from_row,
        )
    }

    fn list_stores(&self, offset: i64, limit: i64) -> Result<Vec<Store>> {
        query_all(
            &self.conn(),
            &format!("SELECT {STORE_COLUMNS} FROM stores ORDER BY id LIMIT ?2 OFFSET ?1"),
            params![offset, limit],
            store_from_row,
        )
    }

    fn search_stores(&self, query: &str, limit: i64) -> Result<Vec<Store>> {
        query_all(
            &self.conn(),
            &format!(
                "SELECT {STORE_COLUMNS} FROM stores
                 WHERE instr(casefold(name), casefold(?1)) > 0 ORDER BY id LIMIT ?2"
            ),
            params![query, limit],
            store_from_row,
        )
    }

    fn update_store(&self, store: &Store) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE stores SET name = ?1, description = ?2, address = ?3, city = ?4,
                                   state = ?5, zip_code = ?6, country = ?7, category = ?8,
                                   open_date = ?9, close_date = ?10, user_id = ?11
                 WHERE id = ?12",
                params![
                    store.name,
                    store.description,
                    store.address,
                    store.city,
                    store.state,
                    store.zip_code,
                    store.country,
                    store.category,
                    format_opt_datetime(store.open_date.as_ref()),
                    format_opt_datetime(store.close_date.as_ref()),
                    store.user_id,
                    store.id,
                ],
            )
            .map_err(|e| classify(e, "Store already exists", "Owning user not found"))?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_store(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM stores WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Store employee role operations

    fn create_role(&self, role: &StoreEmployeeRole) -> Result<i64> {
        let conn = self.conn();
        insert_role(&conn, role)
            .map_err(|e| classify(e, "Role already exists", "Owning user not found"))?;
        Ok(conn.last_insert_rowid())
    }

    fn get_role(&self, id: i64) -> Result<Option<StoreEmployeeRole>> {
        query_one(
            &self.conn(),
            &format!("SELECT {ROLE_COLUMNS} FROM store_employee_roles WHERE id = ?1"),
            params![id],
            role_from_row,
        )
    }

    fn list_roles(&self, offset: i64, limit: i64) -> Result<Vec<StoreEmployeeRole>> {
        query_all(
            &self.conn(),
            &format!(
                "SELECT {ROLE_COLUMNS} FROM store_employee_roles ORDER BY id LIMIT ?2 OFFSET ?1"
            ),
            params![offset, limit],
            role_from_row,
        )
    }

    fn search_roles(&self, query: &str, limit: i64) -> Result<Vec<StoreEmployeeRole>> {
        query_all(
            &self.conn(),
            &format!(
                "SELECT {ROLE_COLUMNS} FROM store_employee_roles
                 WHERE instr(casefold(name), casefold(?1)) > 0 ORDER BY id LIMIT ?2"
            ),
            params![query, limit],
            role_from_row,
        )
    }

    fn update_role(&self, role: &StoreEmployeeRole) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE store_employee_roles
                 SET name = ?1, description = ?2, role_level = ?3, user_id = ?4
                 WHERE id = ?5",
                params![role.name, role.description, role.role_level, role.user_id, role.id],
            )
            .map_err(|e| classify(e, "Role already exists", "Owning user not found"))?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_role(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM store_employee_roles WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn list_role_employees(&self, role_id: i64) -> Result<Vec<StoreEmployee>> {
        query_all(
            &self.conn(),
            &format!(
                "SELECT {EMPLOYEE_COLUMNS} FROM store_employees
                 WHERE store_employee_role_id = ?1 ORDER BY id"
            ),
            params![role_id],
            employee_from_row,
        )
    }

    // Store employee operations

    fn create_employee(&self, employee: &StoreEmployee) -> Result<i64> {
        let conn = self.conn();
        insert_employee(&conn, employee).map_err(|e| {
            classify(
                e,
                "Store employee already exists",
                "Store employee role or owning user not found",
            )
        })?;
        Ok(conn.last_insert_rowid())
    }

    fn get_employee(&self, id: i64) -> Result<Option<StoreEmployee>> {
        query_one(
            &self.conn(),
            &format!("SELECT {EMPLOYEE_COLUMNS} FROM store_employees WHERE id = ?1"),
            params![id],
            employee_from_row,
        )
    }

    fn list_employees(&self, offset: i64, limit: i64) -> Result<Vec<StoreEmployee>> {
        query_all(
            &self.conn(),
            &format!(
                "SELECT {EMPLOYEE_COLUMNS} FROM store_employees ORDER BY id LIMIT ?2 OFFSET ?1"
            ),
            params![offset, limit],
            employee_from_row,
        )
    }

    fn search_employees(&self, query: &str, limit: i64) -> Result<Vec<StoreEmployee>> {
        query_all(
            &self.conn(),
            &format!(
                "SELECT {EMPLOYEE_COLUMNS} FROM store_employees
                 WHERE instr(casefold(first_name || ' ' || last_name), casefold(?1)) > 0
                 ORDER BY id LIMIT ?2"
            ),
            params![query, limit],
            employee_from_row,
        )
    }

    fn filter_employees_by_salary(
        &self,
        min_salary: f64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<StoreEmployee>> {
        query_all(
            &self.conn(),
            &format!(
                "SELECT {EMPLOYEE_COLUMNS} FROM store_employees
                 WHERE salary > ?1 ORDER BY id LIMIT ?3 OFFSET ?2"
            ),
            params![min_salary, offset, limit],
            employee_from_row,
        )
    }

    fn update_employee(&self, employee: &StoreEmployee) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE store_employees
                 SET first_name = ?1, last_name = ?2, gender = ?3, employment_date = ?4,
                     termination_date = ?5, salary = ?6, store_employee_role_id = ?7, user_id = ?8
                 WHERE id = ?9",
                params![
                    employee.first_name,
                    employee.last_name,
                    employee.gender,
                    format_opt_datetime(employee.employment_date.as_ref()),
                    format_opt_datetime(employee.termination_date.as_ref()),
                    employee.salary,
                    employee.store_employee_role_id,
                    employee.user_id,
                    employee.id,
                ],
            )
            .map_err(|e| {
                classify(
                    e,
                    "Store employee already exists",
                    "Store employee role or owning user not found",
                )
            })?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_employee(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM store_employees WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Store shift operations

    fn create_shift(&self, shift: &StoreShift) -> Result<()> {
        self.conn()
            .execute(
                &format!("INSERT INTO store_shifts ({SHIFT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                params![
                    shift.store_id,
                    shift.store_employee_id,
                    format_opt_datetime(shift.start_date.as_ref()),
                    format_opt_datetime(shift.end_date.as_ref()),
                    shift.user_id,
                ],
            )
            .map_err(|e| {
                classify(
                    e,
                    "A shift already exists for this store and employee",
                    "Store or store employee not found",
                )
            })?;
        Ok(())
    }

    fn get_shift(&self, store_id: i64, employee_id: i64) -> Result<Option<StoreShift>> {
        query_one(
            &self.conn(),
            &format!(
                "SELECT {SHIFT_COLUMNS} FROM store_shifts
                 WHERE store_id = ?1 AND store_employee_id = ?2"
            ),
            params![store_id, employee_id],
            shift_from_row,
        )
    }

    fn list_shifts(&self, offset: i64, limit: i64) -> Result<Vec<StoreShift>> {
        query_all(
            &self.conn(),
            &format!(
                "SELECT {SHIFT_COLUMNS} FROM store_shifts
                 ORDER BY store_id, store_employee_id LIMIT ?2 OFFSET ?1"
            ),
            params![offset, limit],
            shift_from_row,
        )
    }

    fn search_shifts(&self, query: &str, limit: i64) -> Result<Vec<StoreShift>> {
        query_all(
            &self.conn(),
            "SELECT sh.store_id, sh.store_employee_id, sh.start_date, sh.end_date, sh.user_id
             FROM store_shifts sh
             JOIN stores s ON s.id = sh.store_id
             JOIN store_employees e ON e.id = sh.store_employee_id
             WHERE instr(casefold(s.name), casefold(?1)) > 0
                OR instr(casefold(e.first_name || ' ' || e.last_name), casefold(?1)) > 0
             ORDER BY sh.store_id, sh.store_employee_id LIMIT ?2",
            params![query, limit],
            shift_from_row,
        )
    }

    fn list_store_shifts(&self, store_id: i64) -> Result<Vec<StoreShift>> {
        query_all(
            &self.conn(),
            &format!(
                "SELECT {SHIFT_COLUMNS} FROM store_shifts
                 WHERE store_id = ?1 ORDER BY store_employee_id"
            ),
            params![store_id],
            shift_from_row,
        )
    }

    fn list_employee_shifts(&self, employee_id: i64) -> Result<Vec<StoreShift>> {
        query_all(
            &self.conn(),
            &format!(
                "SELECT {SHIFT_COLUMNS} FROM store_shifts
                 WHERE store_employee_id = ?1 ORDER BY store_id"
            ),
            params![employee_id],
            shift_from_row,
        )
    }

    fn update_shift(&self, shift: &StoreShift) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE store_shifts SET start_date = ?1, end_date = ?2, user_id = ?3
                 WHERE store_id = ?4 AND store_employee_id = ?5",
                params![
                    format_opt_datetime(shift.start_date.as_ref()),
                    format_opt_datetime(shift.end_date.as_ref()),
                    shift.user_id,
                    shift.store_id,
                    shift.store_employee_id,
                ],
            )
            .map_err(|e| classify(e, "Shift already exists", "Owning user not found"))?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_shift(&self, store_id: i64, employee_id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM store_shifts WHERE store_id = ?1 AND store_employee_id = ?2",
            params![store_id, employee_id],
        )?;
        Ok(rows > 0)
    }

    // Chat message operations

    fn create_chat_message(&self, message: &ChatMessage) -> Result<i64> {
        let conn = self.conn();
        insert_chat_message(&conn, message)?;
        Ok(conn.last_insert_rowid())
    }

    fn get_chat_message(&self, id: i64) -> Result<Option<ChatMessage>> {
        query_one(
            &self.conn(),
            &format!("SELECT {CHAT_COLUMNS} FROM chat_messages WHERE id = ?1"),
            params![id],
            chat_from_row,
        )
    }

    fn list_chat_messages(&self, offset: i64, limit: i64) -> Result<Vec<ChatMessage>> {
        query_all(
            &self.conn(),
            &format!("SELECT {CHAT_COLUMNS} FROM chat_messages ORDER BY id LIMIT ?2 OFFSET ?1"),
            params![offset, limit],
            chat_from_row,
        )
    }

    fn search_chat_messages(&self, query: &str, limit: i64) -> Result<Vec<ChatMessage>> {
        query_all(
            &self.conn(),
            &format!(
                "SELECT {CHAT_COLUMNS} FROM chat_messages
                 WHERE instr(casefold(nickname), casefold(?1)) > 0
                    OR instr(casefold(message), casefold(?1)) > 0
                 ORDER BY id LIMIT ?2"
            ),
            params![query, limit],
            chat_from_row,
        )
    }

    fn update_chat_message(&self, message: &ChatMessage) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE chat_messages SET nickname = ?1, message = ?2, timestamp = ?3 WHERE id = ?4",
            params![
                message.nickname,
                message.message,
                format_opt_datetime(message.timestamp.as_ref()),
                message.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_chat_message(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM chat_messages WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Reports

    fn store_salary_report(&self, offset: i64, limit: i64) -> Result<Vec<StoreSalaryReport>> {
        query_all(
            &self.conn(),
            "SELECT s.id, s.name, AVG(e.salary) AS average_salary
             FROM stores s
             JOIN store_shifts sh ON sh.store_id = s.id
             JOIN store_employees e ON e.id = sh.store_employee_id
             GROUP BY s.id, s.name
             ORDER BY average_salary DESC, s.id
             LIMIT ?2 OFFSET ?1",
            params![offset, limit],
            |row| {
                Ok(StoreSalaryReport {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    average_salary: row.get(2)?,
                })
            },
        )
    }

    fn store_headcount_report(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<StoreHeadcountReport>> {
        query_all(
            &self.conn(),
            "SELECT s.id, s.name, COUNT(DISTINCT sh.store_employee_id) AS headcount
             FROM stores s
             JOIN store_shifts sh ON sh.store_id = s.id
             GROUP BY s.id, s.name
             ORDER BY headcount DESC, s.id
             LIMIT ?2 OFFSET ?1",
            params![offset, limit],
            |row| {
                Ok(StoreHeadcountReport {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    headcount: row.get(2)?,
                })
            },
        )
    }

    // Bulk operations

    fn seed(&self, target: BulkTarget, count: u32, owner_id: Option<i64>) -> Result<u64> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let mut rng = rand::thread_rng();

        let inserted = match target {
            BulkTarget::Users => seed_users(&tx, &mut rng, count)?,
            BulkTarget::Stores => {
                for _ in 0..count {
                    insert_store(&tx, &seed::store(&mut rng, owner_id))?;
                }
                u64::from(count)
            }
            BulkTarget::StoreEmployeeRoles => {
                for _ in 0..count {
                    insert_role(&tx, &seed::store_employee_role(&mut rng, owner_id))?;
                }
                u64::from(count)
            }
            BulkTarget::StoreEmployees => {
                let role_ids = collect_ids(&tx, "SELECT id FROM store_employee_roles")?;
                for _ in 0..count {
                    insert_employee(&tx, &seed::store_employee(&mut rng, &role_ids, owner_id))?;
                }
                u64::from(count)
            }
            BulkTarget::StoreShifts => seed_shifts(&tx, &mut rng, count, owner_id)?,
            BulkTarget::ChatMessages => {
                for _ in 0..count {
                    insert_chat_message(&tx, &seed::chat_message(&mut rng))?;
                }
                u64::from(count)
            }
        };

        tx.commit()?;
        Ok(inserted)
    }

    fn purge(&self, target: BulkTarget, count: u32) -> Result<u64> {
        let conn = self.conn();
        let rows = match target {
            // Administrator accounts are never purged in bulk
            BulkTarget::Users => conn.execute(
                "DELETE FROM users WHERE id IN (
                     SELECT id FROM users WHERE access_level != ?2 ORDER BY id LIMIT ?1)",
                params![count, AccessLevel::Admin],
            )?,
            BulkTarget::Stores => conn.execute(
                "DELETE FROM stores WHERE id IN (SELECT id FROM stores ORDER BY id LIMIT ?1)",
                params![count],
            )?,
            BulkTarget::StoreEmployeeRoles => conn.execute(
                "DELETE FROM store_employee_roles WHERE id IN (
                     SELECT id FROM store_employee_roles ORDER BY id LIMIT ?1)",
                params![count],
            )?,
            BulkTarget::StoreEmployees => conn.execute(
                "DELETE FROM store_employees WHERE id IN (
                     SELECT id FROM store_employees ORDER BY id LIMIT ?1)",
                params![count],
            )?,
            BulkTarget::StoreShifts => conn.execute(
                "DELETE FROM store_shifts WHERE rowid IN (
                     SELECT rowid FROM store_shifts
                     ORDER BY store_id, store_employee_id LIMIT ?1)",
                params![count],
            )?,
            BulkTarget::ChatMessages => conn.execute(
                "DELETE FROM chat_messages WHERE id IN (
                     SELECT id FROM chat_messages ORDER BY id LIMIT ?1)",
                params![count],
            )?,
        };
        Ok(rows as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        store
    }

    fn add_user(store: &SqliteStore, name: Option<&str>) -> i64 {
        let user = User {
            id: 0,
            name: name.map(str::to_string),
            password: None,
            access_level: AccessLevel::Regular,
        };
        store.create_user(&user, &UserProfile::new(0)).unwrap()
    }

    fn new_store(name: &str, owner: Option<i64>) -> Store {
        Store {
            id: 0,
            name: name.to_string(),
            description: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            category: Category::Retail,
            open_date: None,
            close_date: None,
            user_id: owner,
        }
    }

    fn new_role(name: &str) -> StoreEmployeeRole {
        StoreEmployeeRole {
            id: 0,
            name: name.to_string(),
            description: None,
            role_level: 1,
            user_id: None,
        }
    }

    fn new_employee(first: &str, role: Option<i64>, salary: f64) -> StoreEmployee {
        StoreEmployee {
            id: 0,
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            gender: Gender::Other,
            employment_date: None,
            termination_date: None,
            salary,
            store_employee_role_id: role,
            user_id: None,
        }
    }

    fn new_shift(store_id: i64, employee_id: i64) -> StoreShift {
        StoreShift {
            store_id,
            store_employee_id: employee_id,
            start_date: Some(Utc::now()),
            end_date: Some(Utc::now()),
            user_id: None,
        }
    }

    fn count(store: &SqliteStore, table: &str) -> i64 {
        store
            .conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_initialize_creates_tables() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for table in [
            "users",
            "user_profiles",
            "confirmation_codes",
            "tokens",
            "stores",
            "store_employee_roles",
            "store_employees",
            "store_shifts",
            "chat_messages",
        ] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let store = open_store();
        store.initialize().unwrap();
    }

    #[test]
    fn test_user_name_unique_when_present() {
        let store = open_store();
        add_user(&store, Some("alice"));

        let dup = User {
            id: 0,
            name: Some("alice".to_string()),
            password: None,
            access_level: AccessLevel::Regular,
        };
        let result = store.create_user(&dup, &UserProfile::new(0));
        assert!(matches!(result, Err(Error::Conflict(_))));

        // Nameless users never collide
        add_user(&store, None);
        add_user(&store, None);
        assert_eq!(count(&store, "users"), 3);
        assert_eq!(count(&store, "user_profiles"), 3);
    }

    #[test]
    fn test_rename_to_taken_name_conflicts() {
        let store = open_store();
        add_user(&store, Some("alice"));
        let bob = add_user(&store, Some("bob"));

        let mut user = store.get_user(bob).unwrap().unwrap();
        user.name = Some("alice".to_string());
        assert!(matches!(
            store.update_user_with_profile(&user, None),
            Err(Error::Conflict(_))
        ));
    }

    #[test]
    fn test_update_user_with_profile_is_atomic() {
        let store = open_store();
        add_user(&store, Some("alice"));
        let bob = add_user(&store, Some("bob"));

        let mut user = store.get_user(bob).unwrap().unwrap();
        let mut profile = store.get_user_profile(bob).unwrap().unwrap();
        profile.bio = Some("likes shelves".to_string());
        profile.page_preference = 30;
        store.update_user_with_profile(&user, Some(&profile)).unwrap();
        assert_eq!(store.get_user_profile(bob).unwrap().unwrap(), profile);

        // A failing user update leaves the profile untouched
        user.name = Some("alice".to_string());
        let mut changed = profile.clone();
        changed.bio = Some("renamed".to_string());
        assert!(store.update_user_with_profile(&user, Some(&changed)).is_err());
        assert_eq!(store.get_user_profile(bob).unwrap().unwrap(), profile);
        assert_eq!(store.get_user(bob).unwrap().unwrap().name.as_deref(), Some("bob"));
    }

    #[test]
    fn test_update_missing_user_is_not_found() {
        let store = open_store();
        let ghost = User {
            id: 42,
            name: None,
            password: None,
            access_level: AccessLevel::Regular,
        };
        assert!(matches!(
            store.update_user_with_profile(&ghost, None),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_delete_user_cascades_to_profile_codes_and_tokens() {
        let store = open_store();
        let user_id = add_user(&store, Some("carol"));
        let other_id = add_user(&store, Some("dave"));

        for code in ["one", "two"] {
            store
                .create_confirmation_code(&ConfirmationCode {
                    id: 0,
                    code: Some(code.to_string()),
                    expiration: None,
                    used: false,
                    user_id,
                })
                .unwrap();
        }
        store
            .create_token(&Token {
                id: "token-1".to_string(),
                token_hash: "hash".to_string(),
                token_lookup: "lookup01".to_string(),
                user_id,
                created_at: Utc::now(),
                expires_at: None,
                last_used_at: None,
            })
            .unwrap();

        assert!(store.delete_user(user_id).unwrap());

        assert!(store.get_user_profile(user_id).unwrap().is_none());
        assert!(store.list_user_confirmation_codes(user_id).unwrap().is_empty());
        assert!(store.get_token_by_lookup("lookup01").unwrap().is_none());
        assert_eq!(count(&store, "user_profiles"), 1);
        assert!(store.get_user_profile(other_id).unwrap().is_some());
    }

    #[test]
    fn test_delete_user_nulls_owned_rows() {
        let store = open_store();
        let owner = add_user(&store, Some("erin"));
        let store_id = store.create_store(&new_store("Acme", Some(owner))).unwrap();

        store.delete_user(owner).unwrap();

        let acme = store.get_store(store_id).unwrap().unwrap();
        assert_eq!(acme.user_id, None);
    }

    #[test]
    fn test_confirmation_code_unique_and_confirm() {
        let store = open_store();
        let user = User {
            id: 0,
            name: Some("frank".to_string()),
            password: None,
            access_level: AccessLevel::Unconfirmed,
        };
        let user_id = store.create_user(&user, &UserProfile::new(0)).unwrap();

        let code = ConfirmationCode {
            id: 0,
            code: Some("abc".to_string()),
            expiration: None,
            used: false,
            user_id,
        };
        let code_id = store.create_confirmation_code(&code).unwrap();
        assert!(matches!(
            store.create_confirmation_code(&code),
            Err(Error::Conflict(_))
        ));

        store.confirm_user(code_id, user_id).unwrap();
        let confirmed = store.get_user(user_id).unwrap().unwrap();
        assert_eq!(confirmed.access_level, AccessLevel::Regular);
        assert!(store.get_confirmation_code("abc").unwrap().unwrap().used);

        assert!(matches!(
            store.confirm_user(code_id, user_id),
            Err(Error::Conflict(_))
        ));
    }

    #[test]
    fn test_confirmation_code_requires_user() {
        let store = open_store();
        let result = store.create_confirmation_code(&ConfirmationCode {
            id: 0,
            code: None,
            expiration: None,
            used: false,
            user_id: 999,
        });
        assert!(matches!(result, Err(Error::InvalidReference(_))));
    }

    #[test]
    fn test_delete_store_cascades_shifts_but_keeps_employee() {
        let store = open_store();
        let acme = store.create_store(&new_store("Acme", None)).unwrap();
        let other = store.create_store(&new_store("Other", None)).unwrap();
        let jo = store.create_employee(&new_employee("Jo", None, 100.0)).unwrap();

        store.create_shift(&new_shift(acme, jo)).unwrap();
        store.create_shift(&new_shift(other, jo)).unwrap();

        assert!(store.delete_store(acme).unwrap());

        assert!(store.get_shift(acme, jo).unwrap().is_none());
        assert!(store.get_shift(other, jo).unwrap().is_some());
        assert!(store.get_employee(jo).unwrap().is_some());
    }

    #[test]
    fn test_delete_employee_cascades_shifts() {
        let store = open_store();
        let acme = store.create_store(&new_store("Acme", None)).unwrap();
        let jo = store.create_employee(&new_employee("Jo", None, 100.0)).unwrap();
        store.create_shift(&new_shift(acme, jo)).unwrap();

        assert!(store.delete_employee(jo).unwrap());

        assert_eq!(count(&store, "store_shifts"), 0);
        assert!(store.get_store(acme).unwrap().is_some());
    }

    #[test]
    fn test_delete_role_nulls_employee_reference() {
        let store = open_store();
        let role = store.create_role(&new_role("Cashier")).unwrap();
        let a = store.create_employee(&new_employee("Ann", Some(role), 1.0)).unwrap();
        let b = store.create_employee(&new_employee("Ben", Some(role), 1.0)).unwrap();
        assert_eq!(store.list_role_employees(role).unwrap().len(), 2);

        assert!(store.delete_role(role).unwrap());

        for id in [a, b] {
            let employee = store.get_employee(id).unwrap().unwrap();
            assert_eq!(employee.store_employee_role_id, None);
        }
    }

    #[test]
    fn test_shift_requires_existing_store_and_employee() {
        let store = open_store();
        let acme = store.create_store(&new_store("Acme", None)).unwrap();
        let jo = store.create_employee(&new_employee("Jo", None, 1.0)).unwrap();

        assert!(matches!(
            store.create_shift(&new_shift(acme, 404)),
            Err(Error::InvalidReference(_))
        ));
        assert!(matches!(
            store.create_shift(&new_shift(404, jo)),
            Err(Error::InvalidReference(_))
        ));
    }

    #[test]
    fn test_shift_pair_is_unique() {
        let store = open_store();
        let acme = store.create_store(&new_store("Acme", None)).unwrap();
        let jo = store.create_employee(&new_employee("Jo", None, 1.0)).unwrap();

        store.create_shift(&new_shift(acme, jo)).unwrap();
        assert!(matches!(
            store.create_shift(&new_shift(acme, jo)),
            Err(Error::Conflict(_))
        ));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let store = open_store();
        store.create_store(&new_store("Golden Market", None)).unwrap();
        store.create_store(&new_store("Blue Depot", None)).unwrap();
        store.create_store(&new_store("The Market Hall", None)).unwrap();

        let found = store.search_stores("MARKET", 20).unwrap();
        let names: Vec<_> = found.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Golden Market", "The Market Hall"]);

        store.create_employee(&new_employee("Johanna", None, 1.0)).unwrap();
        assert_eq!(store.search_employees("hanna d", 20).unwrap().len(), 1);
        assert_eq!(store.search_employees("doe", 20).unwrap().len(), 1);
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let store = open_store();
        store.create_store(&new_store("ÉLENA Boutique", None)).unwrap();
        store.create_store(&new_store("Straße Markt", None)).unwrap();

        assert_eq!(store.search_stores("élena", 20).unwrap().len(), 1);
        assert_eq!(store.search_stores("Élena", 20).unwrap().len(), 1);
        assert_eq!(store.search_stores("STRASSE", 20).unwrap().len(), 0);
        assert_eq!(store.search_stores("STRAẞE", 20).unwrap().len(), 1);
    }

    #[test]
    fn test_paging_orders_by_id() {
        let store = open_store();
        for i in 0..5 {
            store.create_role(&new_role(&format!("role-{i}"))).unwrap();
        }
        let page = store.list_roles(2, 2).unwrap();
        let names: Vec<_> = page.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["role-2", "role-3"]);
    }

    #[test]
    fn test_reports() {
        let store = open_store();
        let a = store.create_store(&new_store("A", None)).unwrap();
        let b = store.create_store(&new_store("B", None)).unwrap();
        store.create_store(&new_store("Empty", None)).unwrap();
        let e1 = store.create_employee(&new_employee("One", None, 100.0)).unwrap();
        let e2 = store.create_employee(&new_employee("Two", None, 300.0)).unwrap();

        store.create_shift(&new_shift(a, e1)).unwrap();
        store.create_shift(&new_shift(a, e2)).unwrap();
        store.create_shift(&new_shift(b, e2)).unwrap();

        let salary = store.store_salary_report(0, 10).unwrap();
        assert_eq!(salary.len(), 2);
        assert_eq!(salary[0].name, "B");
        assert!((salary[0].average_salary - 300.0).abs() < f64::EPSILON);
        assert!((salary[1].average_salary - 200.0).abs() < f64::EPSILON);

        let headcount = store.store_headcount_report(0, 10).unwrap();
        assert_eq!(headcount[0].name, "A");
        assert_eq!(headcount[0].headcount, 2);
        assert_eq!(headcount[1].headcount, 1);
    }

    #[test]
    fn test_filter_employees_by_salary() {
        let store = open_store();
        store.create_employee(&new_employee("Low", None, 10.0)).unwrap();
        store.create_employee(&new_employee("Mid", None, 50.0)).unwrap();
        store.create_employee(&new_employee("High", None, 90.0)).unwrap();

        let rich = store.filter_employees_by_salary(50.0, 0, 10).unwrap();
        assert_eq!(rich.len(), 1);
        assert_eq!(rich[0].first_name, "High");
    }

    #[test]
    fn test_page_preference_broadcast() {
        let store = open_store();
        let a = add_user(&store, Some("a"));
        add_user(&store, Some("b"));
        add_user(&store, None);

        assert_eq!(store.get_user_profile(a).unwrap().unwrap().page_preference, 5);
        assert_eq!(store.set_all_page_preferences(25).unwrap(), 3);
        assert_eq!(store.get_user_profile(a).unwrap().unwrap().page_preference, 25);
    }

    #[test]
    fn test_seed_and_purge() {
        let store = open_store();
        let owner = add_user(&store, Some("admin"));

        assert_eq!(store.seed(BulkTarget::StoreEmployeeRoles, 3, Some(owner)).unwrap(), 3);
        assert_eq!(store.seed(BulkTarget::StoreEmployees, 10, Some(owner)).unwrap(), 10);
        assert_eq!(store.seed(BulkTarget::Stores, 4, Some(owner)).unwrap(), 4);
        assert_eq!(store.seed(BulkTarget::ChatMessages, 5, None).unwrap(), 5);

        // 4 stores x 10 employees leaves room for every requested shift
        let shifts = store.seed(BulkTarget::StoreShifts, 20, Some(owner)).unwrap();
        assert!(shifts > 0 && shifts <= 20);
        assert_eq!(count(&store, "store_shifts"), shifts as i64);

        let first_two: Vec<i64> = store.list_stores(0, 2).unwrap().iter().map(|s| s.id).collect();
        assert_eq!(store.purge(BulkTarget::Stores, 2).unwrap(), 2);
        for id in first_two {
            assert!(store.get_store(id).unwrap().is_none());
            assert!(store.list_store_shifts(id).unwrap().is_empty());
        }
        assert_eq!(count(&store, "stores"), 2);

        assert_eq!(store.purge(BulkTarget::ChatMessages, 100).unwrap(), 5);
    }

    #[test]
    fn test_seed_shifts_without_stores_fails() {
        let store = open_store();
        store.seed(BulkTarget::StoreEmployees, 2, None).unwrap();
        assert!(matches!(
            store.seed(BulkTarget::StoreShifts, 1, None),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn test_seed_shifts_capped_by_free_pairs() {
        let store = open_store();
        store.seed(BulkTarget::Stores, 1, None).unwrap();
        store.seed(BulkTarget::StoreEmployees, 2, None).unwrap();
        let inserted = store.seed(BulkTarget::StoreShifts, 50, None).unwrap();
        assert!(inserted <= 2);
    }

    #[test]
    fn test_purge_users_keeps_admins() {
        let store = open_store();
        let admin = User {
            id: 0,
            name: Some("root".to_string()),
            password: None,
            access_level: AccessLevel::Admin,
        };
        let admin_id = store.create_user(&admin, &UserProfile::new(0)).unwrap();
        assert!(store.has_admin_user().unwrap());

        assert_eq!(store.seed(BulkTarget::Users, 5, None).unwrap(), 5);
        assert_eq!(count(&store, "user_profiles"), 6);

        assert_eq!(store.purge(BulkTarget::Users, 100).unwrap(), 5);
        assert!(store.get_user(admin_id).unwrap().is_some());
        assert_eq!(count(&store, "user_profiles"), 1);
    }

    #[test]
    fn test_token_lookup_collision() {
        let store = open_store();
        let user_id = add_user(&store, Some("gina"));

        let token1 = Token {
            id: "token-1".to_string(),
            token_hash: "hash1".to_string(),
            token_lookup: "lookup12".to_string(),
            user_id,
            created_at: Utc::now(),
            expires_at: None,
            last_used_at: None,
        };
        store.create_token(&token1).unwrap();

        let token2 = Token {
            id: "token-2".to_string(),
            token_lookup: "lookup12".to_string(), // Same lookup
            ..token1.clone()
        };

        let result = store.create_token(&token2);
        assert!(matches!(result, Err(Error::TokenLookupCollision)));
    }
}
