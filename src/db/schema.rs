pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS branches (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    address TEXT,
    email TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS customers (
    id TEXT PRIMARY KEY,
    branch_id TEXT NOT NULL,
    name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    address TEXT,
    company TEXT,
    customer_type TEXT NOT NULL DEFAULT 'individual',
    notes TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS buildings (
    id TEXT PRIMARY KEY,
    branch_id TEXT NOT NULL,
    customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    address TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    roof_type TEXT,
    roof_size_m2 REAL,
    building_type TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reports (
    id TEXT PRIMARY KEY,
    branch_id TEXT NOT NULL,
    created_by TEXT NOT NULL,
    customer_name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'draft',
    inspection_date TEXT NOT NULL,
    document TEXT NOT NULL,
    created_at TEXT NOT NULL,
    last_edited TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS offers (
    id TEXT PRIMARY KEY,
    report_id TEXT NOT NULL UNIQUE REFERENCES reports(id) ON DELETE CASCADE,
    branch_id TEXT NOT NULL,
    customer_name TEXT NOT NULL,
    customer_email TEXT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    labor_cost REAL NOT NULL DEFAULT 0,
    material_cost REAL NOT NULL DEFAULT 0,
    travel_cost REAL NOT NULL DEFAULT 0,
    overhead_cost REAL NOT NULL DEFAULT 0,
    actions_cost REAL NOT NULL DEFAULT 0,
    subtotal REAL NOT NULL,
    vat_rate REAL NOT NULL,
    vat_amount REAL NOT NULL,
    total_amount REAL NOT NULL,
    currency TEXT NOT NULL,
    valid_until TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL,
    responded_at TEXT
);

CREATE TABLE IF NOT EXISTS notification_preferences (
    user_id TEXT PRIMARY KEY,
    email_enabled INTEGER NOT NULL DEFAULT 1,
    report_completed INTEGER NOT NULL DEFAULT 1,
    offer_updates INTEGER NOT NULL DEFAULT 1,
    weekly_summary INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS mail_queue (
    id TEXT PRIMARY KEY,
    branch_id TEXT NOT NULL,
    recipient TEXT NOT NULL,
    template TEXT NOT NULL,
    payload TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_customers_branch ON customers(branch_id);
CREATE INDEX IF NOT EXISTS idx_buildings_customer ON buildings(branch_id, customer_id);
CREATE INDEX IF NOT EXISTS idx_reports_branch_status ON reports(branch_id, status);
CREATE INDEX IF NOT EXISTS idx_mail_queue_status ON mail_queue(status);
";
