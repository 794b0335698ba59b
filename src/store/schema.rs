pub const SCHEMA: &str = r#"
-- Accounts. name is unique only when present.
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    password TEXT,
    access_level INTEGER NOT NULL DEFAULT 0
);

-- Exactly one profile per user, removed with it
CREATE TABLE IF NOT EXISTS user_profiles (
    user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    bio TEXT,
    birthday TEXT,
    gender INTEGER NOT NULL DEFAULT 0,
    marital_status INTEGER NOT NULL DEFAULT 0,
    location TEXT,
    page_preference INTEGER NOT NULL DEFAULT 5
);

CREATE TABLE IF NOT EXISTS confirmation_codes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT,
    expiration TEXT,
    used INTEGER NOT NULL DEFAULT 0,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
);

-- Tokens are auth credentials bound to a user
CREATE TABLE IF NOT EXISTS tokens (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,        -- lookup segment of the raw token
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,                   -- NULL = never
    last_used_at TEXT
);

CREATE TABLE IF NOT EXISTS stores (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    address TEXT,
    city TEXT,
    state TEXT,
    zip_code TEXT,
    country TEXT,
    category INTEGER NOT NULL DEFAULT 0,
    open_date TEXT,
    close_date TEXT,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS store_employee_roles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    role_level INTEGER NOT NULL DEFAULT 0,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS store_employees (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    gender INTEGER NOT NULL DEFAULT 0,
    employment_date TEXT,
    termination_date TEXT,
    salary REAL NOT NULL DEFAULT 0,
    store_employee_role_id INTEGER REFERENCES store_employee_roles(id) ON DELETE SET NULL,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL
);

-- One shift per (store, employee) pair
CREATE TABLE IF NOT EXISTS store_shifts (
    store_id INTEGER NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
    store_employee_id INTEGER NOT NULL REFERENCES store_employees(id) ON DELETE CASCADE,
    start_date TEXT,
    end_date TEXT,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    PRIMARY KEY (store_id, store_employee_id)
);

-- Chat messages are independent of every other table
CREATE TABLE IF NOT EXISTS chat_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nickname TEXT NOT NULL,
    message TEXT NOT NULL,
    timestamp TEXT
);

-- Filtered unique indexes
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_name ON users(name) WHERE name IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_confirmation_codes_code ON confirmation_codes(code) WHERE code IS NOT NULL;

-- Foreign key indexes
CREATE INDEX IF NOT EXISTS idx_confirmation_codes_user ON confirmation_codes(user_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_lookup ON tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_tokens_user ON tokens(user_id);
CREATE INDEX IF NOT EXISTS idx_stores_user ON stores(user_id);
CREATE INDEX IF NOT EXISTS idx_store_employee_roles_user ON store_employee_roles(user_id);
CREATE INDEX IF NOT EXISTS idx_store_employees_role ON store_employees(store_employee_role_id);
CREATE INDEX IF NOT EXISTS idx_store_employees_user ON store_employees(user_id);
CREATE INDEX IF NOT EXISTS idx_store_shifts_store ON store_shifts(store_id);
CREATE INDEX IF NOT EXISTS idx_store_shifts_employee ON store_shifts(store_employee_id);
CREATE INDEX IF NOT EXISTS idx_store_shifts_user ON store_shifts(user_id);
"#;
