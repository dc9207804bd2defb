//! SQL schema for the jobgate SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS organizations (
    organization_id TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    email           TEXT NOT NULL COLLATE NOCASE,   -- stored lowercased
    password_hash   TEXT NOT NULL,                  -- argon2 PHC string
    logo            TEXT NOT NULL,
    location        TEXT NOT NULL DEFAULT '',
    website         TEXT NOT NULL DEFAULT '',
    about           TEXT NOT NULL DEFAULT '',
    created_at      TEXT NOT NULL,
    UNIQUE (email)
);

-- Keyed by the identity provider's subject id. Both the webhook path and
-- the lazy reconciliation path converge on this primary key.
CREATE TABLE IF NOT EXISTS individuals (
    individual_id TEXT PRIMARY KEY,
    email         TEXT NOT NULL,
    email_state   TEXT NOT NULL CHECK (email_state IN ('resolved', 'placeholder')),
    name          TEXT NOT NULL,
    avatar        TEXT NOT NULL,
    resume        TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS openings (
    opening_id      TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL REFERENCES organizations(organization_id),
    title           TEXT NOT NULL,
    description     TEXT NOT NULL,
    location        TEXT NOT NULL,
    category        TEXT NOT NULL,
    level           TEXT NOT NULL,
    salary          INTEGER NOT NULL CHECK (salary >= 0),
    visible         INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL
);

-- No foreign key on individual_id: a provider deletion removes the principal
-- while the owning organization keeps its application history.
CREATE TABLE IF NOT EXISTS applications (
    application_id  TEXT PRIMARY KEY,
    opening_id      TEXT NOT NULL REFERENCES openings(opening_id) ON DELETE CASCADE,
    organization_id TEXT NOT NULL,
    individual_id   TEXT NOT NULL,
    applicant_name  TEXT NOT NULL,
    applicant_email TEXT NOT NULL,
    resume          TEXT NOT NULL,
    cover_letter    TEXT NOT NULL DEFAULT '',
    status          TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'accepted', 'rejected')),
    created_at      TEXT NOT NULL,
    UNIQUE (opening_id, individual_id)
);

CREATE INDEX IF NOT EXISTS individuals_email_idx       ON individuals(email);
CREATE INDEX IF NOT EXISTS openings_organization_idx   ON openings(organization_id);
CREATE INDEX IF NOT EXISTS applications_organization_idx ON applications(organization_id);
CREATE INDEX IF NOT EXISTS applications_individual_idx ON applications(individual_id);

PRAGMA user_version = 1;
";
