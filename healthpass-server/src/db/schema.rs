//! Table definitions
//!
//! Join tables carry their own id and no uniqueness constraint; duplicate
//! membership rows are tolerated everywhere.

/// Tables in creation order; cleaning walks it backwards
pub const TABLES: &[&str] = &[
    "users",
    "roles",
    "permissions",
    "user_roles",
    "permission_roles",
    "forms",
];

pub const CREATE_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        phone         TEXT    NOT NULL DEFAULT '' UNIQUE,
        password      TEXT    NOT NULL,
        is_superuser  BOOLEAN NOT NULL DEFAULT 0,
        create_at     INTEGER NOT NULL,
        update_at     INTEGER NOT NULL,
        is_active     BOOLEAN NOT NULL DEFAULT 1,
        name          TEXT    NOT NULL,
        sex           INTEGER,
        address       TEXT    NOT NULL DEFAULT '',
        nation        INTEGER,
        birthday      INTEGER,
        user_identity INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS roles (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        name      TEXT    NOT NULL UNIQUE,
        parent_id INTEGER NOT NULL DEFAULT 0,
        grand_id  TEXT    NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS permissions (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT    NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS user_roles (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        role_id INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_user_roles_user ON user_roles (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_user_roles_role ON user_roles (role_id)",
    "CREATE TABLE IF NOT EXISTS permission_roles (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        permission_id INTEGER NOT NULL,
        role_id       INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_permission_roles_role ON permission_roles (role_id)",
    "CREATE TABLE IF NOT EXISTS forms (
        id                                 INTEGER PRIMARY KEY AUTOINCREMENT,
        name                               TEXT    NOT NULL,
        sex                                INTEGER NOT NULL,
        phone                              TEXT    NOT NULL,
        id_card                            TEXT    NOT NULL,
        org_name                           TEXT    NOT NULL,
        car_id                             TEXT    NOT NULL,
        reason                             TEXT    NOT NULL,
        guarantor                          TEXT    NOT NULL,
        guarantor_phone                    TEXT    NOT NULL,
        health_code_status                 INTEGER NOT NULL DEFAULT 0,
        is_been_epidemic_area_in_two_weeks BOOLEAN NOT NULL DEFAULT 0,
        is_cough                           BOOLEAN NOT NULL DEFAULT 0,
        in_time_applied                    INTEGER NOT NULL,
        out_time_applied                   INTEGER NOT NULL,
        in_time_real                       INTEGER NOT NULL,
        out_time_real                      INTEGER NOT NULL
    )",
];
